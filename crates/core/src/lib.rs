//! Barberdesk Core - domain types and the in-memory tenant directory.
//!
//! This crate is shared by every Barberdesk component:
//! - `cli` - Flow runner, interactive console and directory inspection
//! - `integration-tests` - Scenario tests against the public API
//!
//! # Architecture
//!
//! The core crate performs no I/O: no HTTP clients, no database access, no
//! terminal handling. The directory is a plain in-process object that test
//! drivers own (or share through [`directory::SharedDirectory`]).
//!
//! # Modules
//!
//! - [`types`] - Newtype ids, normalized emails, secret passwords, roles and statuses
//! - [`directory`] - The multi-tenant salon/staff/account directory

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod directory;
pub mod types;

pub use directory::{DirectoryError, SharedDirectory, TenantDirectory};
pub use types::*;
