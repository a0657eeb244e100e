//! Role and status enums for directory entities.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Returned when a string is not a known [`StaffStatus`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid staff status: {0} (expected active or inactive)")]
pub struct ParseStatusError(pub String);

/// Returned when a string is not a known [`Role`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid role: {0} (expected owner, staff or super_admin)")]
pub struct ParseRoleError(pub String);

/// Employment status of a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StaffStatus {
    #[default]
    Active,
    Inactive,
}

impl StaffStatus {
    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }

    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for StaffStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StaffStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            other => Err(ParseStatusError(other.to_owned())),
        }
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Administers one salon's staff and services.
    Owner,
    /// Employee scoped to one salon.
    Staff,
    /// Cross-tenant read access for platform verification.
    SuperAdmin,
}

impl Role {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Staff => "staff",
            Self::SuperAdmin => "super_admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "owner" => Ok(Self::Owner),
            "staff" => Ok(Self::Staff),
            "super_admin" => Ok(Self::SuperAdmin),
            other => Err(ParseRoleError(other.to_owned())),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_is_case_sensitive() {
        assert_eq!("active".parse::<StaffStatus>(), Ok(StaffStatus::Active));
        assert_eq!(" inactive ".parse::<StaffStatus>(), Ok(StaffStatus::Inactive));
        assert!("Active".parse::<StaffStatus>().is_err());
        assert!("on-leave".parse::<StaffStatus>().is_err());
    }

    #[test]
    fn test_role_roundtrips_through_display() {
        for role in [Role::Owner, Role::Staff, Role::SuperAdmin] {
            assert_eq!(role.to_string().parse::<Role>(), Ok(role));
        }
    }

    #[test]
    fn test_role_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Role::SuperAdmin).unwrap(),
            "\"super_admin\""
        );
    }
}
