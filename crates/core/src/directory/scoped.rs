//! Session-scoped operations.
//!
//! These resolve the caller's salon from the session itself: owners by the
//! salon's `owner_email`, staff through their own staff record. A salon id
//! is never taken from the caller, which is what keeps one tenant's rows
//! invisible to another.

use tracing::warn;

use super::error::{AuthError, DirectoryError, Entity};
use super::models::{AuthAccount, Salon, SalonStatistics, Session, StaffMember, StaffUpdate};
use super::TenantDirectory;
use crate::types::{Role, SalonId, StaffId};

impl TenantDirectory {
    /// The account behind a session, provided it still exists unchanged.
    fn live_account(&self, session: &Session) -> Result<&AuthAccount, DirectoryError> {
        self.accounts
            .get(&session.account_id)
            .filter(|account| account.email == session.email && account.role == session.role)
            .ok_or_else(|| {
                warn!(account = %session.account_id, "Stale session used");
                AuthError::StaleSession.into()
            })
    }

    fn salon_id_for(&self, session: &Session) -> Result<SalonId, DirectoryError> {
        let account = self.live_account(session)?;
        match account.role {
            Role::Owner => self
                .salons
                .values()
                .find(|salon| salon.owner_email == account.email)
                .map(|salon| salon.id.clone())
                .ok_or_else(|| DirectoryError::not_found(Entity::Salon, &account.email)),
            Role::Staff => self
                .staff
                .get(&StaffId::new(account.id.as_str()))
                .map(|member| member.salon_id.clone())
                .ok_or_else(|| DirectoryError::not_found(Entity::Staff, &account.email)),
            Role::SuperAdmin => Err(DirectoryError::not_found(Entity::Salon, &account.email)),
        }
    }

    fn owner_salon_for(
        &self,
        session: &Session,
        action: &'static str,
    ) -> Result<SalonId, DirectoryError> {
        let account = self.live_account(session)?;
        if account.role != Role::Owner {
            warn!(account = %account.id, role = %account.role, action, "Forbidden");
            return Err(AuthError::Forbidden {
                role: account.role,
                action,
            }
            .into());
        }
        self.salon_id_for(session)
    }

    /// A staff id that belongs to `salon`. Other tenants' rows read as absent.
    fn staff_in_salon(&self, staff_id: &StaffId, salon: &SalonId) -> Result<(), DirectoryError> {
        self.staff
            .get(staff_id)
            .filter(|member| &member.salon_id == salon)
            .map(|_| ())
            .ok_or_else(|| DirectoryError::not_found(Entity::Staff, staff_id))
    }

    /// The session holder's salon.
    ///
    /// # Errors
    ///
    /// `StaleSession` if the account is gone, `NotFound` for super admins
    /// and for owners without a salon.
    pub fn my_salon(&self, session: &Session) -> Result<&Salon, DirectoryError> {
        let salon_id = self.salon_id_for(session)?;
        self.get_salon(&salon_id)
    }

    /// Staff of the session holder's salon.
    ///
    /// # Errors
    ///
    /// Same as [`my_salon`](Self::my_salon).
    pub fn my_staff(&self, session: &Session) -> Result<Vec<&StaffMember>, DirectoryError> {
        let salon_id = self.salon_id_for(session)?;
        Ok(self.list_staff(&salon_id))
    }

    /// The session holder's own staff record.
    ///
    /// # Errors
    ///
    /// `StaleSession` if the account is gone, `NotFound` for accounts that
    /// are not staff.
    pub fn my_profile(&self, session: &Session) -> Result<&StaffMember, DirectoryError> {
        let account = self.live_account(session)?;
        self.find_staff_by_email(account.email.as_str())
    }

    /// Statistics for the session holder's salon.
    ///
    /// # Errors
    ///
    /// Same as [`my_salon`](Self::my_salon).
    pub fn my_statistics(&self, session: &Session) -> Result<SalonStatistics, DirectoryError> {
        let salon_id = self.salon_id_for(session)?;
        Ok(self.statistics(&salon_id))
    }

    /// Salons the session may read: every salon for super admins, the own
    /// salon otherwise.
    ///
    /// # Errors
    ///
    /// Same as [`my_salon`](Self::my_salon) for non-admin sessions.
    pub fn visible_salons(&self, session: &Session) -> Result<Vec<&Salon>, DirectoryError> {
        let account = self.live_account(session)?;
        if account.role == Role::SuperAdmin {
            return Ok(self.salons().collect());
        }
        Ok(vec![self.my_salon(session)?])
    }

    /// Owner-only [`create_staff`](Self::create_staff) into the owner's salon.
    ///
    /// # Errors
    ///
    /// `Forbidden` for non-owner sessions, then everything `create_staff`
    /// returns.
    pub fn create_staff_for(
        &mut self,
        session: &Session,
        full_name: &str,
        email: &str,
        specialty: &str,
    ) -> Result<StaffMember, DirectoryError> {
        let salon_id = self.owner_salon_for(session, "create staff")?;
        self.create_staff(&salon_id, full_name, email, specialty)
    }

    /// Owner-only [`update_staff`](Self::update_staff) limited to the
    /// owner's salon.
    ///
    /// # Errors
    ///
    /// `Forbidden` for non-owner sessions, `NotFound` for staff outside the
    /// owner's salon.
    pub fn update_staff_for(
        &mut self,
        session: &Session,
        staff_id: &StaffId,
        update: StaffUpdate,
    ) -> Result<StaffMember, DirectoryError> {
        let salon_id = self.owner_salon_for(session, "update staff")?;
        self.staff_in_salon(staff_id, &salon_id)?;
        self.update_staff(staff_id, update)
    }

    /// Owner-only [`delete_staff`](Self::delete_staff) limited to the
    /// owner's salon.
    ///
    /// # Errors
    ///
    /// `Forbidden` for non-owner sessions, `NotFound` for staff outside the
    /// owner's salon.
    pub fn delete_staff_for(
        &mut self,
        session: &Session,
        staff_id: &StaffId,
    ) -> Result<StaffMember, DirectoryError> {
        let salon_id = self.owner_salon_for(session, "delete staff")?;
        self.staff_in_salon(staff_id, &salon_id)?;
        self.delete_staff(staff_id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::directory::{SeedData, ValidationError};
    use crate::types::StaffStatus;

    const TWO_SALONS: &str = r"
salons:
  - id: salon-a
    name: Alpha Cuts
    owner_email: alice@alpha.com
  - id: salon-b
    name: Bravo Barbers
    owner_email: bob@bravo.com
accounts:
  - id: owner-a
    email: alice@alpha.com
    password: alpha-pass
    role: owner
  - id: owner-b
    email: bob@bravo.com
    password: bravo-pass
    role: owner
  - id: admin-1
    email: root@platform.io
    password: root-pass
    role: super_admin
staff:
  - id: staff-a1
    full_name: Ann Shears
    email: ann@alpha.com
    password: ann-pass
    specialty: Haircut
    salon_id: salon-a
  - id: staff-b1
    full_name: Ben Blade
    email: ben@bravo.com
    password: ben-pass
    specialty: Shave
    status: inactive
    salon_id: salon-b
";

    fn two_salons() -> TenantDirectory {
        TenantDirectory::from_seed(SeedData::from_yaml(TWO_SALONS).unwrap()).unwrap()
    }

    #[test]
    fn test_owner_sees_only_own_salon() {
        let dir = two_salons();
        let alice = dir.authenticate("alice@alpha.com", "alpha-pass").unwrap();

        assert_eq!(dir.my_salon(&alice).unwrap().name, "Alpha Cuts");
        let staff = dir.my_staff(&alice).unwrap();
        assert_eq!(staff.len(), 1);
        assert_eq!(staff.first().unwrap().full_name, "Ann Shears");
        assert_eq!(dir.visible_salons(&alice).unwrap().len(), 1);
    }

    #[test]
    fn test_staff_resolve_salon_through_profile() {
        let dir = two_salons();
        let ben = dir.authenticate("ben@bravo.com", "ben-pass").unwrap();

        assert_eq!(dir.my_profile(&ben).unwrap().status, StaffStatus::Inactive);
        assert_eq!(dir.my_salon(&ben).unwrap().id, SalonId::new("salon-b"));
        assert_eq!(dir.my_statistics(&ben).unwrap().inactive_staff, 1);
    }

    #[test]
    fn test_owner_has_no_profile() {
        let dir = two_salons();
        let alice = dir.authenticate("alice@alpha.com", "alpha-pass").unwrap();
        assert!(dir.my_profile(&alice).unwrap_err().is_not_found());
    }

    #[test]
    fn test_super_admin_sees_all_salons_but_owns_none() {
        let dir = two_salons();
        let root = dir.authenticate("root@platform.io", "root-pass").unwrap();
        assert_eq!(dir.visible_salons(&root).unwrap().len(), 2);
        assert!(dir.my_salon(&root).unwrap_err().is_not_found());
    }

    #[test]
    fn test_cross_tenant_mutations_are_not_found() {
        let mut dir = two_salons();
        let alice = dir.authenticate("alice@alpha.com", "alpha-pass").unwrap();
        let ben = StaffId::new("staff-b1");

        assert!(
            dir.update_staff_for(&alice, &ben, StaffUpdate::Status(StaffStatus::Active))
                .unwrap_err()
                .is_not_found()
        );
        assert!(dir.delete_staff_for(&alice, &ben).unwrap_err().is_not_found());
        assert_eq!(dir.get_staff(&ben).unwrap().status, StaffStatus::Inactive);
    }

    #[test]
    fn test_staff_cannot_mutate() {
        let mut dir = two_salons();
        let ann = dir.authenticate("ann@alpha.com", "ann-pass").unwrap();

        let err = dir
            .create_staff_for(&ann, "New Hire", "new@alpha.com", "Fade")
            .unwrap_err();
        assert_eq!(
            err,
            DirectoryError::from(AuthError::Forbidden {
                role: Role::Staff,
                action: "create staff",
            })
        );
        assert!(matches!(
            dir.delete_staff_for(&ann, &StaffId::new("staff-a1")),
            Err(DirectoryError::Auth(AuthError::Forbidden { .. }))
        ));
    }

    #[test]
    fn test_owner_crud_in_own_salon() {
        let mut dir = two_salons();
        let alice = dir.authenticate("alice@alpha.com", "alpha-pass").unwrap();

        let hire = dir
            .create_staff_for(&alice, "New Hire", "new@alpha.com", "Fade")
            .unwrap();
        assert_eq!(hire.salon_id, SalonId::new("salon-a"));

        let updated = dir
            .update_staff_for(&alice, &hire.id, StaffUpdate::parse("specialty", "Beard").unwrap())
            .unwrap();
        assert_eq!(updated.specialty, "Beard");

        assert!(matches!(
            dir.create_staff_for(&alice, "Dup", "ben@bravo.com", "x"),
            Err(DirectoryError::Validation(ValidationError::DuplicateEmail(_)))
        ));

        dir.delete_staff_for(&alice, &hire.id).unwrap();
        assert_eq!(dir.my_staff(&alice).unwrap().len(), 1);
    }

    #[test]
    fn test_deleted_staff_session_goes_stale() {
        let mut dir = two_salons();
        let ann = dir.authenticate("ann@alpha.com", "ann-pass").unwrap();
        dir.delete_staff(&StaffId::new("staff-a1")).unwrap();

        assert_eq!(
            dir.my_profile(&ann).unwrap_err(),
            DirectoryError::from(AuthError::StaleSession)
        );
    }
}
