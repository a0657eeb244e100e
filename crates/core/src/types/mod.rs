//! Core types for Barberdesk.
//!
//! Type-safe wrappers for the directory's ids, emails, passwords, roles
//! and statuses.

pub mod email;
pub mod id;
pub mod password;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use password::Password;
pub use status::*;
