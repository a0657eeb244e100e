//! In-memory multi-tenant directory.
//!
//! [`TenantDirectory`] stands in for the hosted backend's `salons`, `staff`
//! and auth tables so client-side business rules can be exercised without a
//! live platform. It owns three keyed collections plus an email index and
//! exposes only the operations below; there is no global state, so any
//! number of directories can coexist.
//!
//! Tenant isolation is enforced by query predicates alone. The raw
//! operations (`list_staff`, `create_staff`, ...) trust the caller to pass
//! the right salon id; the session-scoped operations (`my_staff`,
//! `create_staff_for`, ...) derive the salon from the session and never
//! accept one from the caller.
//!
//! # Example
//!
//! ```
//! use barberdesk_core::directory::{StaffUpdate, TenantDirectory};
//!
//! let mut dir = TenantDirectory::with_fixture();
//! let owner = dir.authenticate("owner@barbershop.com", "password123").unwrap();
//! let salon = dir.my_salon(&owner).unwrap().id.clone();
//!
//! let sam = dir
//!     .create_staff(&salon, "Sam Fade", "sam@barbershop.com", "Coloring")
//!     .unwrap();
//! assert_eq!(dir.statistics(&salon).unique_specialties, 2);
//!
//! dir.update_staff(&sam.id, StaffUpdate::parse("status", "inactive").unwrap())
//!     .unwrap();
//! assert_eq!(dir.statistics(&salon).inactive_staff, 1);
//!
//! dir.delete_staff(&sam.id).unwrap();
//! assert!(dir.authenticate("sam@barbershop.com", sam.password.expose()).is_err());
//! ```

mod error;
mod models;
mod scoped;
mod seed;
mod shared;
mod table;

use std::collections::HashMap;

use chrono::Utc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub use error::{AuthError, DirectoryError, Entity, ValidationError};
pub use models::{
    AccountSummary, AuthAccount, DirectoryCounts, DirectorySnapshot, SalonStatistics, Salon,
    Session, StaffMember, StaffUpdate,
};
pub use seed::{SeedAccount, SeedData, SeedError, SeedSalon, SeedStaff};
pub use shared::SharedDirectory;

use crate::types::{AccountId, Email, Password, Role, SalonId, StaffId, StaffStatus};
use table::Table;

/// The in-memory tenant directory.
#[derive(Debug, Clone, Default)]
pub struct TenantDirectory {
    salons: Table<SalonId, Salon>,
    accounts: Table<AccountId, AuthAccount>,
    staff: Table<StaffId, StaffMember>,
    emails: HashMap<Email, AccountId>,
}

impl TenantDirectory {
    /// An empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Authentication
    // ------------------------------------------------------------------

    /// Log in with an exact email/password match.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] if no account matches. A malformed
    /// email is reported the same way.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Session, DirectoryError> {
        let Some(account) = self.credential_match(email, password) else {
            warn!(email, "Login rejected");
            return Err(AuthError::InvalidCredentials.into());
        };

        debug!(account = %account.id, role = %account.role, "Login accepted");
        Ok(issue_session(account))
    }

    /// Log in, additionally requiring the account to have `role`.
    ///
    /// # Errors
    ///
    /// [`AuthError::InvalidCredentials`] if the credentials do not match or
    /// the account has a different role.
    pub fn authenticate_as(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Session, DirectoryError> {
        let session = self.authenticate(email, password)?;
        if session.role != role {
            warn!(email, expected = %role, actual = %session.role, "Login rejected: role mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }
        Ok(session)
    }

    fn credential_match(&self, email: &str, password: &str) -> Option<&AuthAccount> {
        let email = Email::parse(email).ok()?;
        let id = self.emails.get(&email)?;
        self.accounts
            .get(id)
            .filter(|account| account.password.matches(password))
    }

    // ------------------------------------------------------------------
    // Lookups
    // ------------------------------------------------------------------

    /// Find an auth account by email.
    ///
    /// # Errors
    ///
    /// `NotFound` if no account uses the email.
    pub fn find_account(&self, email: &str) -> Result<&AuthAccount, DirectoryError> {
        Email::parse(email)
            .ok()
            .and_then(|email| self.emails.get(&email))
            .and_then(|id| self.accounts.get(id))
            .ok_or_else(|| DirectoryError::not_found(Entity::Account, email))
    }

    /// Find a salon by id.
    ///
    /// # Errors
    ///
    /// `NotFound` if the id is unknown.
    pub fn get_salon(&self, salon_id: &SalonId) -> Result<&Salon, DirectoryError> {
        self.salons
            .get(salon_id)
            .ok_or_else(|| DirectoryError::not_found(Entity::Salon, salon_id))
    }

    /// The first salon owned by `owner_email`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the email owns no salon.
    pub fn get_salon_for_owner(&self, owner_email: &str) -> Result<&Salon, DirectoryError> {
        Email::parse(owner_email)
            .ok()
            .and_then(|email| self.salons.values().find(|s| s.owner_email == email))
            .ok_or_else(|| DirectoryError::not_found(Entity::Salon, owner_email))
    }

    /// Find a staff member by id.
    ///
    /// # Errors
    ///
    /// `NotFound` if the id is unknown.
    pub fn get_staff(&self, staff_id: &StaffId) -> Result<&StaffMember, DirectoryError> {
        self.staff
            .get(staff_id)
            .ok_or_else(|| DirectoryError::not_found(Entity::Staff, staff_id))
    }

    /// Find a staff member by email.
    ///
    /// # Errors
    ///
    /// `NotFound` if no staff member uses the email.
    pub fn find_staff_by_email(&self, email: &str) -> Result<&StaffMember, DirectoryError> {
        Email::parse(email)
            .ok()
            .and_then(|email| self.staff.values().find(|s| s.email == email))
            .ok_or_else(|| DirectoryError::not_found(Entity::Staff, email))
    }

    /// All staff of a salon, in insertion order. Unknown salons have none.
    #[must_use]
    pub fn list_staff(&self, salon_id: &SalonId) -> Vec<&StaffMember> {
        self.staff_in(salon_id.clone()).collect()
    }

    /// Staff statistics for a salon. Unknown salons yield all zeros.
    #[must_use]
    pub fn statistics(&self, salon_id: &SalonId) -> SalonStatistics {
        SalonStatistics::collect(self.staff_in(salon_id.clone()))
    }

    fn staff_in(&self, salon_id: SalonId) -> impl Iterator<Item = &StaffMember> {
        self.staff.values().filter(move |s| s.salon_id == salon_id)
    }

    /// All salons, in insertion order.
    pub fn salons(&self) -> impl Iterator<Item = &Salon> {
        self.salons.values()
    }

    // ------------------------------------------------------------------
    // Staff mutations
    // ------------------------------------------------------------------

    /// Create a staff member and its paired staff login.
    ///
    /// The id and password are generated. The new member starts `active`.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the salon does not exist
    /// - [`ValidationError::EmptyName`] if `full_name` is blank
    /// - [`ValidationError::InvalidEmail`] if `email` is malformed
    /// - [`ValidationError::DuplicateEmail`] if any account already uses
    ///   `email` or a salon names it as owner
    ///
    /// The directory is unchanged on error.
    #[instrument(skip(self), fields(salon = %salon_id))]
    pub fn create_staff(
        &mut self,
        salon_id: &SalonId,
        full_name: &str,
        email: &str,
        specialty: &str,
    ) -> Result<StaffMember, DirectoryError> {
        if !self.salons.contains(salon_id) {
            return Err(DirectoryError::not_found(Entity::Salon, salon_id));
        }

        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err(ValidationError::EmptyName.into());
        }

        let email = Email::parse(email).map_err(|source| ValidationError::InvalidEmail {
            input: email.to_owned(),
            source,
        })?;
        if self.email_in_use(&email) {
            warn!(%email, "Staff creation rejected: email in use");
            return Err(ValidationError::DuplicateEmail(email).into());
        }

        let id = self.fresh_staff_id();
        let password = Password::generate();
        let created_at = Utc::now();

        let member = StaffMember {
            id: id.clone(),
            full_name: full_name.to_owned(),
            email: email.clone(),
            password: password.clone(),
            specialty: specialty.trim().to_owned(),
            status: StaffStatus::Active,
            salon_id: salon_id.clone(),
            avatar_url: None,
            created_at,
        };
        let account = AuthAccount {
            id: id.account_id(),
            email,
            password,
            role: Role::Staff,
            created_at,
        };

        self.insert_account(account);
        self.staff.insert(id.clone(), member.clone());

        info!(staff = %id, email = %member.email, "Staff member created");
        Ok(member)
    }

    /// Taken by an account or reserved as a salon's owner email.
    fn email_in_use(&self, email: &Email) -> bool {
        self.emails.contains_key(email) || self.salons.values().any(|s| &s.owner_email == email)
    }

    /// Apply a single-field update.
    ///
    /// # Errors
    ///
    /// `NotFound` if the staff id is unknown.
    #[instrument(skip(self), fields(staff = %staff_id))]
    pub fn update_staff(
        &mut self,
        staff_id: &StaffId,
        update: StaffUpdate,
    ) -> Result<StaffMember, DirectoryError> {
        let member = self
            .staff
            .get_mut(staff_id)
            .ok_or_else(|| DirectoryError::not_found(Entity::Staff, staff_id))?;

        update.apply(member);
        info!(specialty = %member.specialty, status = %member.status, "Staff member updated");
        Ok(member.clone())
    }

    /// Update by field name, e.g. `("status", "inactive")`.
    ///
    /// # Errors
    ///
    /// Validation errors from [`StaffUpdate::parse`] (checked first), then
    /// `NotFound` if the staff id is unknown.
    pub fn update_staff_field(
        &mut self,
        staff_id: &StaffId,
        field: &str,
        value: &str,
    ) -> Result<StaffMember, DirectoryError> {
        let update = StaffUpdate::parse(field, value)?;
        self.update_staff(staff_id, update)
    }

    /// Delete a staff member together with its login. Returns the removed
    /// staff record.
    ///
    /// # Errors
    ///
    /// `NotFound` if the staff id is unknown.
    #[instrument(skip(self), fields(staff = %staff_id))]
    pub fn delete_staff(&mut self, staff_id: &StaffId) -> Result<StaffMember, DirectoryError> {
        let member = self
            .staff
            .remove(staff_id)
            .ok_or_else(|| DirectoryError::not_found(Entity::Staff, staff_id))?;

        if let Some(account) = self.accounts.remove(&member.id.account_id()) {
            self.emails.remove(&account.email);
        }

        info!(email = %member.email, "Staff member deleted");
        Ok(member)
    }

    fn fresh_staff_id(&self) -> StaffId {
        loop {
            let id = StaffId::generate();
            if !self.staff.contains(&id) && !self.accounts.contains(&id.account_id()) {
                return id;
            }
        }
    }

    // Callers check id and email uniqueness first.
    fn insert_account(&mut self, account: AuthAccount) {
        self.emails.insert(account.email.clone(), account.id.clone());
        self.accounts.insert(account.id.clone(), account);
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    #[must_use]
    pub fn counts(&self) -> DirectoryCounts {
        DirectoryCounts {
            salons: self.salons.len(),
            auth_accounts: self.accounts.len(),
            staff_members: self.staff.len(),
        }
    }

    /// Copy of the whole directory for dumps.
    #[must_use]
    pub fn snapshot(&self) -> DirectorySnapshot {
        DirectorySnapshot {
            counts: self.counts(),
            salons: self.salons.values().cloned().collect(),
            accounts: self
                .accounts
                .values()
                .map(|a| AccountSummary {
                    id: a.id.clone(),
                    email: a.email.clone(),
                    role: a.role,
                })
                .collect(),
            staff: self.staff.values().cloned().collect(),
        }
    }
}

fn issue_session(account: &AuthAccount) -> Session {
    Session {
        account_id: account.id.clone(),
        email: account.email.clone(),
        role: account.role,
        token: format!("token_{}_{}", account.id, Uuid::new_v4().simple()),
        created_at: Utc::now(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn salon_001() -> SalonId {
        SalonId::new("salon-001")
    }

    #[test]
    fn test_authenticate_owner() {
        let dir = TenantDirectory::with_fixture();
        let session = dir
            .authenticate("owner@barbershop.com", "password123")
            .unwrap();
        assert_eq!(session.account_id, AccountId::new("owner-001"));
        assert_eq!(session.role, Role::Owner);
        assert!(session.token.starts_with("token_owner-001_"));
    }

    #[test]
    fn test_authenticate_is_case_insensitive_on_email_only() {
        let dir = TenantDirectory::with_fixture();
        assert!(dir.authenticate("OWNER@barbershop.com", "password123").is_ok());
        assert_eq!(
            dir.authenticate("owner@barbershop.com", "PASSWORD123"),
            Err(DirectoryError::from(AuthError::InvalidCredentials))
        );
    }

    #[test]
    fn test_authenticate_rejects_unknown_and_malformed() {
        let dir = TenantDirectory::with_fixture();
        assert!(dir.authenticate("ghost@barbershop.com", "password123").is_err());
        assert!(dir.authenticate("not-an-email", "password123").is_err());
        assert!(dir.authenticate("", "").is_err());
    }

    #[test]
    fn test_authenticate_as_checks_role() {
        let dir = TenantDirectory::with_fixture();
        assert!(
            dir.authenticate_as("john@barbershop.com", "john123456", Role::Staff)
                .is_ok()
        );
        assert_eq!(
            dir.authenticate_as("john@barbershop.com", "john123456", Role::Owner),
            Err(DirectoryError::from(AuthError::InvalidCredentials))
        );
    }

    #[test]
    fn test_lookups() {
        let dir = TenantDirectory::with_fixture();
        assert_eq!(
            dir.get_salon_for_owner("owner@barbershop.com").unwrap().name,
            "Main Barber Shop"
        );
        assert!(dir.get_salon_for_owner("john@barbershop.com").is_err());
        assert_eq!(
            dir.find_account("owner@barbershop.com").unwrap().role,
            Role::Owner
        );
        assert_eq!(
            dir.find_staff_by_email("john@barbershop.com").unwrap().full_name,
            "John Doe"
        );
        assert!(dir.get_salon(&SalonId::new("salon-999")).unwrap_err().is_not_found());
    }

    #[test]
    fn test_create_staff_pairs_account() {
        let mut dir = TenantDirectory::with_fixture();
        let member = dir
            .create_staff(&salon_001(), " Test Barber ", "Test@BarberShop.com", "Haircut & Shave")
            .unwrap();

        assert_eq!(member.full_name, "Test Barber");
        assert_eq!(member.email.as_str(), "test@barbershop.com");
        assert_eq!(member.status, StaffStatus::Active);
        assert!(member.avatar_url.is_none());

        let account = dir.find_account("test@barbershop.com").unwrap();
        assert_eq!(account.id, member.id.account_id());
        assert_eq!(account.role, Role::Staff);

        let session = dir
            .authenticate("test@barbershop.com", member.password.expose())
            .unwrap();
        assert_eq!(session.role, Role::Staff);
    }

    #[test]
    fn test_create_staff_rejections_leave_directory_unchanged() {
        let mut dir = TenantDirectory::with_fixture();
        let before = dir.counts();

        assert!(
            dir.create_staff(&SalonId::new("salon-999"), "A", "a@shop.com", "x")
                .unwrap_err()
                .is_not_found()
        );
        assert_eq!(
            dir.create_staff(&salon_001(), "   ", "a@shop.com", "x")
                .unwrap_err(),
            DirectoryError::from(ValidationError::EmptyName)
        );
        assert!(matches!(
            dir.create_staff(&salon_001(), "A", "a-at-shop.com", "x"),
            Err(DirectoryError::Validation(ValidationError::InvalidEmail { .. }))
        ));
        // The owner's email is taken by an account, not a staff member.
        assert!(matches!(
            dir.create_staff(&salon_001(), "A", "owner@barbershop.com", "x"),
            Err(DirectoryError::Validation(ValidationError::DuplicateEmail(_)))
        ));

        assert_eq!(dir.counts(), before);
    }

    #[test]
    fn test_create_staff_rejects_owner_email_without_account() {
        let mut seed = seed::SeedData::fixture();
        seed.accounts.clear();
        seed.staff.clear();
        let mut dir = TenantDirectory::from_seed(seed).unwrap();

        assert!(matches!(
            dir.create_staff(&salon_001(), "A", "Owner@Barbershop.com", "x"),
            Err(DirectoryError::Validation(ValidationError::DuplicateEmail(_)))
        ));
        assert!(dir.get_salon_for_owner("owner@barbershop.com").is_ok());
        assert_eq!(dir.counts().staff_members, 0);
    }

    #[test]
    fn test_update_staff() {
        let mut dir = TenantDirectory::with_fixture();
        let john = StaffId::new("staff-001");

        let updated = dir
            .update_staff_field(&john, "specialty", "Coloring & Treatments")
            .unwrap();
        assert_eq!(updated.specialty, "Coloring & Treatments");

        let updated = dir.update_staff_field(&john, "status", "inactive").unwrap();
        assert_eq!(updated.status, StaffStatus::Inactive);
        assert_eq!(dir.get_staff(&john).unwrap().status, StaffStatus::Inactive);

        assert_eq!(
            dir.update_staff_field(&john, "status", "fired").unwrap_err(),
            DirectoryError::from(ValidationError::InvalidStatus("fired".to_owned()))
        );
        assert_eq!(dir.get_staff(&john).unwrap().status, StaffStatus::Inactive);

        assert!(
            dir.update_staff(&StaffId::new("staff-404"), StaffUpdate::Status(StaffStatus::Active))
                .unwrap_err()
                .is_not_found()
        );
    }

    #[test]
    fn test_delete_staff_removes_login() {
        let mut dir = TenantDirectory::with_fixture();
        let john = StaffId::new("staff-001");

        let removed = dir.delete_staff(&john).unwrap();
        assert_eq!(removed.full_name, "John Doe");
        assert!(dir.list_staff(&salon_001()).is_empty());
        assert!(dir.find_account("john@barbershop.com").is_err());
        assert!(dir.authenticate("john@barbershop.com", "john123456").is_err());
        assert!(dir.delete_staff(&john).unwrap_err().is_not_found());

        // The email is free again.
        assert!(
            dir.create_staff(&salon_001(), "John Doe", "john@barbershop.com", "Haircut")
                .is_ok()
        );
    }

    #[test]
    fn test_list_staff_keeps_insertion_order() {
        let mut dir = TenantDirectory::with_fixture();
        let a = dir.create_staff(&salon_001(), "A", "a@shop.com", "x").unwrap();
        let b = dir.create_staff(&salon_001(), "B", "b@shop.com", "y").unwrap();

        let ids: Vec<_> = dir.list_staff(&salon_001()).iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids, vec![StaffId::new("staff-001"), a.id, b.id]);
    }

    #[test]
    fn test_snapshot_counts() {
        let dir = TenantDirectory::with_fixture();
        let snapshot = dir.snapshot();
        assert_eq!(
            snapshot.counts,
            DirectoryCounts {
                salons: 1,
                auth_accounts: 2,
                staff_members: 1,
            }
        );
        assert_eq!(snapshot.accounts.len(), 2);
        assert_eq!(snapshot.salons.len(), 1);
    }
}
