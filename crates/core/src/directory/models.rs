//! Directory entities and query results.
//!
//! Field names follow the platform's REST rows so the CLI can print them as
//! JSON that looks like what `/rest/v1/<table>` returns. Passwords never
//! serialize.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::ValidationError;
use crate::types::{AccountId, Email, Password, Role, SalonId, StaffId, StaffStatus};

/// A tenant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Salon {
    pub id: SalonId,
    pub name: String,
    pub owner_email: Email,
    pub created_at: DateTime<Utc>,
}

/// A login credential record.
#[derive(Debug, Clone, Serialize)]
pub struct AuthAccount {
    pub id: AccountId,
    pub email: Email,
    #[serde(skip_serializing)]
    pub password: Password,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// An employee of exactly one salon.
#[derive(Debug, Clone, Serialize)]
pub struct StaffMember {
    pub id: StaffId,
    pub full_name: String,
    pub email: Email,
    #[serde(skip_serializing)]
    pub password: Password,
    pub specialty: String,
    pub status: StaffStatus,
    pub salon_id: SalonId,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Proof of a successful login, scoped to one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub account_id: AccountId,
    pub email: Email,
    pub role: Role,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

/// A single-field staff mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaffUpdate {
    Specialty(String),
    Status(StaffStatus),
}

impl StaffUpdate {
    /// Build an update from a field name and raw value.
    ///
    /// # Errors
    ///
    /// [`ValidationError::UnknownField`] for anything but `specialty` or
    /// `status`, and [`ValidationError::InvalidStatus`] for a status other
    /// than `active`/`inactive`.
    pub fn parse(field: &str, value: &str) -> Result<Self, ValidationError> {
        match field.trim() {
            "specialty" => Ok(Self::Specialty(value.trim().to_owned())),
            "status" => value
                .parse()
                .map(Self::Status)
                .map_err(|_| ValidationError::InvalidStatus(value.to_owned())),
            other => Err(ValidationError::UnknownField(other.to_owned())),
        }
    }

    pub(crate) fn apply(self, staff: &mut StaffMember) {
        match self {
            Self::Specialty(specialty) => staff.specialty = specialty,
            Self::Status(status) => staff.status = status,
        }
    }
}

/// Per-salon staff statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SalonStatistics {
    pub total_staff: usize,
    pub active_staff: usize,
    pub inactive_staff: usize,
    /// Distinct specialties, sorted.
    pub specialties: Vec<String>,
    pub unique_specialties: usize,
}

impl SalonStatistics {
    pub(crate) fn collect<'a>(staff: impl IntoIterator<Item = &'a StaffMember>) -> Self {
        let mut total_staff = 0;
        let mut active_staff = 0;
        let mut specialties = BTreeSet::new();

        for member in staff {
            total_staff += 1;
            if member.status.is_active() {
                active_staff += 1;
            }
            specialties.insert(member.specialty.as_str());
        }

        Self {
            total_staff,
            active_staff,
            inactive_staff: total_staff - active_staff,
            unique_specialties: specialties.len(),
            specialties: specialties.into_iter().map(str::to_owned).collect(),
        }
    }
}

/// Row counts per collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DirectoryCounts {
    pub salons: usize,
    pub auth_accounts: usize,
    pub staff_members: usize,
}

/// Account summary for directory dumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountSummary {
    pub id: AccountId,
    pub email: Email,
    pub role: Role,
}

/// Full directory state, in insertion order.
#[derive(Debug, Clone, Serialize)]
pub struct DirectorySnapshot {
    pub counts: DirectoryCounts,
    pub salons: Vec<Salon>,
    pub accounts: Vec<AccountSummary>,
    pub staff: Vec<StaffMember>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn member(specialty: &str, status: StaffStatus) -> StaffMember {
        StaffMember {
            id: StaffId::generate(),
            full_name: "Test Barber".to_owned(),
            email: Email::parse("test@barbershop.com").unwrap(),
            password: Password::new("secret"),
            specialty: specialty.to_owned(),
            status,
            salon_id: SalonId::new("salon-001"),
            avatar_url: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_update_parse() {
        assert_eq!(
            StaffUpdate::parse("specialty", " Beard Trim "),
            Ok(StaffUpdate::Specialty("Beard Trim".to_owned()))
        );
        assert_eq!(
            StaffUpdate::parse("status", "inactive"),
            Ok(StaffUpdate::Status(StaffStatus::Inactive))
        );
        assert_eq!(
            StaffUpdate::parse("status", "retired"),
            Err(ValidationError::InvalidStatus("retired".to_owned()))
        );
        assert_eq!(
            StaffUpdate::parse("email", "x@y.z"),
            Err(ValidationError::UnknownField("email".to_owned()))
        );
    }

    #[test]
    fn test_statistics_partition_and_dedupe() {
        let staff = [
            member("Haircut", StaffStatus::Active),
            member("Haircut", StaffStatus::Inactive),
            member("Coloring", StaffStatus::Active),
        ];
        let stats = SalonStatistics::collect(&staff);
        assert_eq!(stats.total_staff, 3);
        assert_eq!(stats.active_staff, 2);
        assert_eq!(stats.inactive_staff, 1);
        assert_eq!(stats.unique_specialties, 2);
        assert_eq!(stats.specialties, vec!["Coloring", "Haircut"]);
    }

    #[test]
    fn test_statistics_empty() {
        let stats = SalonStatistics::collect(&[]);
        assert_eq!(stats.total_staff, 0);
        assert_eq!(stats.unique_specialties, 0);
        assert!(stats.specialties.is_empty());
    }

    #[test]
    fn test_staff_json_omits_password() {
        let json = serde_json::to_value(member("Haircut", StaffStatus::Active)).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["status"], "active");
        assert_eq!(json["salon_id"], "salon-001");
    }
}
