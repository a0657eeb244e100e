//! Thread-safe handle for parallel test drivers.

use std::sync::{Arc, Mutex};

use super::error::DirectoryError;
use super::models::{SalonStatistics, Session, StaffMember, StaffUpdate};
use super::TenantDirectory;
use crate::types::{SalonId, StaffId};

/// A [`TenantDirectory`] behind one coarse mutex.
///
/// Each call holds the lock for the whole operation, so every operation is
/// atomic with respect to other threads. Clones share the same directory.
#[derive(Debug, Clone, Default)]
pub struct SharedDirectory {
    inner: Arc<Mutex<TenantDirectory>>,
}

impl SharedDirectory {
    #[must_use]
    pub fn new(directory: TenantDirectory) -> Self {
        Self {
            inner: Arc::new(Mutex::new(directory)),
        }
    }

    /// Run a read-only closure under the lock.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::Poisoned`] if another thread panicked mid-operation.
    pub fn with<R>(&self, f: impl FnOnce(&TenantDirectory) -> R) -> Result<R, DirectoryError> {
        let guard = self.inner.lock().map_err(|_| DirectoryError::Poisoned)?;
        Ok(f(&guard))
    }

    /// Run a mutating closure under the lock.
    ///
    /// # Errors
    ///
    /// [`DirectoryError::Poisoned`] if another thread panicked mid-operation.
    pub fn with_mut<R>(
        &self,
        f: impl FnOnce(&mut TenantDirectory) -> R,
    ) -> Result<R, DirectoryError> {
        let mut guard = self.inner.lock().map_err(|_| DirectoryError::Poisoned)?;
        Ok(f(&mut guard))
    }

    /// See [`TenantDirectory::authenticate`].
    ///
    /// # Errors
    ///
    /// As the wrapped operation, or `Poisoned`.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Session, DirectoryError> {
        self.with(|dir| dir.authenticate(email, password))?
    }

    /// Owned copy of [`TenantDirectory::list_staff`].
    ///
    /// # Errors
    ///
    /// `Poisoned` only.
    pub fn list_staff(&self, salon_id: &SalonId) -> Result<Vec<StaffMember>, DirectoryError> {
        self.with(|dir| dir.list_staff(salon_id).into_iter().cloned().collect())
    }

    /// See [`TenantDirectory::create_staff`].
    ///
    /// # Errors
    ///
    /// As the wrapped operation, or `Poisoned`.
    pub fn create_staff(
        &self,
        salon_id: &SalonId,
        full_name: &str,
        email: &str,
        specialty: &str,
    ) -> Result<StaffMember, DirectoryError> {
        self.with_mut(|dir| dir.create_staff(salon_id, full_name, email, specialty))?
    }

    /// See [`TenantDirectory::update_staff`].
    ///
    /// # Errors
    ///
    /// As the wrapped operation, or `Poisoned`.
    pub fn update_staff(
        &self,
        staff_id: &StaffId,
        update: StaffUpdate,
    ) -> Result<StaffMember, DirectoryError> {
        self.with_mut(|dir| dir.update_staff(staff_id, update))?
    }

    /// See [`TenantDirectory::delete_staff`].
    ///
    /// # Errors
    ///
    /// As the wrapped operation, or `Poisoned`.
    pub fn delete_staff(&self, staff_id: &StaffId) -> Result<StaffMember, DirectoryError> {
        self.with_mut(|dir| dir.delete_staff(staff_id))?
    }

    /// See [`TenantDirectory::statistics`].
    ///
    /// # Errors
    ///
    /// `Poisoned` only.
    pub fn statistics(&self, salon_id: &SalonId) -> Result<SalonStatistics, DirectoryError> {
        self.with(|dir| dir.statistics(salon_id))
    }
}

impl From<TenantDirectory> for SharedDirectory {
    fn from(directory: TenantDirectory) -> Self {
        Self::new(directory)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_parallel_creates_are_all_applied() {
        let shared = SharedDirectory::new(TenantDirectory::with_fixture());
        let salon = SalonId::new("salon-001");

        thread::scope(|scope| {
            for worker in 0..8 {
                let shared = shared.clone();
                let salon = salon.clone();
                scope.spawn(move || {
                    for n in 0..10 {
                        shared
                            .create_staff(
                                &salon,
                                &format!("Barber {worker}-{n}"),
                                &format!("barber-{worker}-{n}@barbershop.com"),
                                "Haircut",
                            )
                            .unwrap();
                    }
                });
            }
        });

        assert_eq!(shared.list_staff(&salon).unwrap().len(), 81);
        let counts = shared.with(TenantDirectory::counts).unwrap();
        assert_eq!(counts.auth_accounts, 82);
    }

    #[test]
    fn test_racing_duplicate_email_admits_exactly_one() {
        let shared = SharedDirectory::new(TenantDirectory::with_fixture());
        let salon = SalonId::new("salon-001");

        let successes = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    let shared = shared.clone();
                    let salon = salon.clone();
                    scope.spawn(move || {
                        shared
                            .create_staff(&salon, "Twin", "twin@barbershop.com", "Shave")
                            .is_ok()
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .filter(|ok| *ok)
                .count()
        });

        assert_eq!(successes, 1);
        assert_eq!(shared.statistics(&salon).unwrap().total_staff, 2);
    }

    #[test]
    fn test_clones_share_state() {
        let a = SharedDirectory::from(TenantDirectory::with_fixture());
        let b = a.clone();
        b.delete_staff(&StaffId::new("staff-001")).unwrap();
        assert!(a.authenticate("john@barbershop.com", "john123456").is_err());
    }

    #[test]
    fn test_panic_under_lock_poisons_every_call() {
        let shared = SharedDirectory::new(TenantDirectory::with_fixture());

        thread::scope(|scope| {
            let shared = shared.clone();
            let handle = scope.spawn(move || {
                let _: Result<(), _> = shared.with(|_| panic!("reader crashed"));
            });
            assert!(handle.join().is_err());
        });

        assert!(matches!(
            shared.statistics(&SalonId::new("salon-001")),
            Err(DirectoryError::Poisoned)
        ));
        assert!(matches!(shared.with_mut(|_| ()), Err(DirectoryError::Poisoned)));
        assert!(matches!(
            shared.authenticate("owner@barbershop.com", "password123"),
            Err(DirectoryError::Poisoned)
        ));
    }
}
