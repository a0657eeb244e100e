//! Directory error taxonomy.
//!
//! Every directory operation returns these as values. Test drivers decide
//! whether a given error is the expected outcome of a negative check.

use thiserror::Error;

use crate::types::{Email, EmailError, Role};

/// Which entity a lookup missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Salon,
    Account,
    Staff,
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Salon => write!(f, "salon"),
            Self::Account => write!(f, "account"),
            Self::Staff => write!(f, "staff member"),
        }
    }
}

/// Input rejected before any state changed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Another auth account already uses this email.
    #[error("email already in use: {0}")]
    DuplicateEmail(Email),

    /// Status value outside `active`/`inactive`.
    #[error("invalid status: {0:?} (expected active or inactive)")]
    InvalidStatus(String),

    /// Malformed email address.
    #[error("invalid email {input:?}: {source}")]
    InvalidEmail {
        input: String,
        #[source]
        source: EmailError,
    },

    /// Staff full name is blank.
    #[error("full name cannot be empty")]
    EmptyName,

    /// Update targeted a field that cannot be changed.
    #[error("unknown staff field: {0:?} (expected specialty or status)")]
    UnknownField(String),
}

/// Credential or permission failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No account matches the email/password pair (or role, when gated).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The session's role may not perform the action.
    #[error("{role} accounts cannot {action}")]
    Forbidden { role: Role, action: &'static str },

    /// The session's account has since been deleted.
    #[error("session account no longer exists")]
    StaleSession,
}

/// Errors returned by [`TenantDirectory`](super::TenantDirectory) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// Lookup miss.
    #[error("{entity} not found: {key}")]
    NotFound { entity: Entity, key: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    /// A thread panicked while holding the shared directory lock.
    #[error("directory lock poisoned")]
    Poisoned,
}

impl DirectoryError {
    pub(crate) fn not_found(entity: Entity, key: impl std::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
