//! Seed data for a fresh directory.
//!
//! A seed is either the built-in fixture (the salon, owner and staff member
//! every test script assumes) or a YAML document of the same shape:
//!
//! ```yaml
//! salons:
//!   - id: salon-001
//!     name: Main Barber Shop
//!     owner_email: owner@barbershop.com
//!     created_at: 2026-01-01T00:00:00Z   # optional, defaults to now
//! accounts:                               # owners and super admins only
//!   - id: owner-001
//!     email: owner@barbershop.com
//!     password: password123
//!     role: owner
//! staff:                                  # logins are derived from these
//!   - id: staff-001
//!     full_name: John Doe
//!     email: john@barbershop.com
//!     password: john123456
//!     specialty: Haircut
//!     status: active                      # optional, defaults to active
//!     salon_id: salon-001
//! ```

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::error::Entity;
use super::models::{AuthAccount, Salon, StaffMember};
use super::TenantDirectory;
use crate::types::{AccountId, Email, Password, Role, SalonId, StaffId, StaffStatus};

/// 2026-01-01T00:00:00Z
const FIXTURE_SALON_CREATED: i64 = 1_767_225_600;
/// 2026-01-15T00:00:00Z
const FIXTURE_STAFF_CREATED: i64 = 1_768_435_200;

/// Seed rejected before any row was inserted.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to parse seed YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Duplicate {entity} id: {id}")]
    DuplicateId { entity: Entity, id: String },

    #[error("Duplicate email: {0}")]
    DuplicateEmail(Email),

    #[error("Owner {0} already has a salon")]
    DuplicateOwner(Email),

    #[error("Staff {staff} references unknown salon {salon}")]
    UnknownSalon { staff: StaffId, salon: SalonId },

    #[error("Account {0} has role staff; staff logins come from the staff list")]
    StaffAccount(AccountId),

    #[error("Staff {0} has an empty full name")]
    EmptyName(StaffId),
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedSalon {
    pub id: SalonId,
    pub name: String,
    pub owner_email: Email,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedAccount {
    pub id: AccountId,
    pub email: Email,
    pub password: String,
    pub role: Role,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedStaff {
    pub id: StaffId,
    pub full_name: String,
    pub email: Email,
    pub password: String,
    #[serde(default)]
    pub specialty: String,
    #[serde(default)]
    pub status: StaffStatus,
    pub salon_id: SalonId,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// Rows to load into a new directory.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedData {
    #[serde(default)]
    pub salons: Vec<SeedSalon>,
    #[serde(default)]
    pub accounts: Vec<SeedAccount>,
    #[serde(default)]
    pub staff: Vec<SeedStaff>,
}

impl SeedData {
    /// Parse a YAML seed document.
    ///
    /// # Errors
    ///
    /// [`SeedError::Yaml`] on malformed YAML, unknown roles or statuses, and
    /// invalid emails.
    pub fn from_yaml(yaml: &str) -> Result<Self, SeedError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// The fixed fixture: "Main Barber Shop" owned by
    /// `owner@barbershop.com` / `password123`, with one active staff member
    /// John Doe (`john@barbershop.com` / `john123456`, Haircut).
    #[must_use]
    pub fn fixture() -> Self {
        let salon_created = DateTime::from_timestamp(FIXTURE_SALON_CREATED, 0).unwrap_or_default();
        let staff_created = DateTime::from_timestamp(FIXTURE_STAFF_CREATED, 0).unwrap_or_default();
        let owner_email = fixture_email("owner@barbershop.com");

        Self {
            salons: vec![SeedSalon {
                id: SalonId::new("salon-001"),
                name: "Main Barber Shop".to_owned(),
                owner_email: owner_email.clone(),
                created_at: salon_created,
            }],
            accounts: vec![SeedAccount {
                id: AccountId::new("owner-001"),
                email: owner_email,
                password: "password123".to_owned(),
                role: Role::Owner,
                created_at: salon_created,
            }],
            staff: vec![SeedStaff {
                id: StaffId::new("staff-001"),
                full_name: "John Doe".to_owned(),
                email: fixture_email("john@barbershop.com"),
                password: "john123456".to_owned(),
                specialty: "Haircut".to_owned(),
                status: StaffStatus::Active,
                salon_id: SalonId::new("salon-001"),
                avatar_url: None,
                created_at: staff_created,
            }],
        }
    }

    /// Check every directory invariant without building anything.
    ///
    /// # Errors
    ///
    /// The first violated invariant.
    pub fn validate(&self) -> Result<(), SeedError> {
        let mut salon_ids = HashSet::new();
        let mut owners = HashSet::new();
        for salon in &self.salons {
            if !salon_ids.insert(&salon.id) {
                return Err(SeedError::DuplicateId {
                    entity: Entity::Salon,
                    id: salon.id.to_string(),
                });
            }
            if !owners.insert(&salon.owner_email) {
                return Err(SeedError::DuplicateOwner(salon.owner_email.clone()));
            }
        }

        let mut account_ids = HashSet::new();
        let mut emails = HashSet::new();
        for account in &self.accounts {
            if account.role == Role::Staff {
                return Err(SeedError::StaffAccount(account.id.clone()));
            }
            if !account_ids.insert(account.id.as_str()) {
                return Err(SeedError::DuplicateId {
                    entity: Entity::Account,
                    id: account.id.to_string(),
                });
            }
            if !emails.insert(&account.email) {
                return Err(SeedError::DuplicateEmail(account.email.clone()));
            }
        }

        // Staff ids share the account id space.
        for member in &self.staff {
            if !account_ids.insert(member.id.as_str()) {
                return Err(SeedError::DuplicateId {
                    entity: Entity::Staff,
                    id: member.id.to_string(),
                });
            }
            // Owner emails are reserved even without an owner account.
            if !emails.insert(&member.email) || owners.contains(&&member.email) {
                return Err(SeedError::DuplicateEmail(member.email.clone()));
            }
            if member.full_name.trim().is_empty() {
                return Err(SeedError::EmptyName(member.id.clone()));
            }
            if !salon_ids.contains(&member.salon_id) {
                return Err(SeedError::UnknownSalon {
                    staff: member.id.clone(),
                    salon: member.salon_id.clone(),
                });
            }
        }

        Ok(())
    }
}

fn fixture_email(raw: &str) -> Email {
    Email::from_normalized(raw)
}

impl TenantDirectory {
    /// Build a directory from a seed after validating it.
    ///
    /// # Errors
    ///
    /// The first invariant the seed violates; nothing is built in that case.
    pub fn from_seed(seed: SeedData) -> Result<Self, SeedError> {
        seed.validate()?;
        Ok(Self::load(seed))
    }

    /// A directory holding [`SeedData::fixture`].
    #[must_use]
    pub fn with_fixture() -> Self {
        let seed = SeedData::fixture();
        debug_assert!(seed.validate().is_ok());
        Self::load(seed)
    }

    fn load(seed: SeedData) -> Self {
        let mut directory = Self::new();

        for salon in seed.salons {
            directory.salons.insert(
                salon.id.clone(),
                Salon {
                    id: salon.id,
                    name: salon.name,
                    owner_email: salon.owner_email,
                    created_at: salon.created_at,
                },
            );
        }

        for account in seed.accounts {
            directory.insert_account(AuthAccount {
                id: account.id,
                email: account.email,
                password: Password::new(account.password),
                role: account.role,
                created_at: account.created_at,
            });
        }

        for member in seed.staff {
            let password = Password::new(member.password);
            directory.insert_account(AuthAccount {
                id: member.id.account_id(),
                email: member.email.clone(),
                password: password.clone(),
                role: Role::Staff,
                created_at: member.created_at,
            });
            directory.staff.insert(
                member.id.clone(),
                StaffMember {
                    id: member.id,
                    full_name: member.full_name.trim().to_owned(),
                    email: member.email,
                    password,
                    specialty: member.specialty,
                    status: member.status,
                    salon_id: member.salon_id,
                    avatar_url: member.avatar_url,
                    created_at: member.created_at,
                },
            );
        }

        let counts = directory.counts();
        info!(
            salons = counts.salons,
            accounts = counts.auth_accounts,
            staff = counts.staff_members,
            "Directory seeded"
        );
        directory
    }
}
