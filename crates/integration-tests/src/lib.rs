//! Integration tests for Barberdesk.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p barberdesk-integration-tests
//! ```
//!
//! Everything runs in-process against fresh directories, so tests need no
//! services and can run in parallel.
//!
//! # Test Categories
//!
//! - `directory_properties` - Invariants of the raw directory operations
//! - `tenant_isolation` - Session-scoped access across two salons
//! - `cli_commands` - Flow runner, console and inspection commands

use barberdesk_core::TenantDirectory;
use barberdesk_core::directory::{SeedData, Session};
use uuid::Uuid;

/// Two tenants, a super admin and one staff member per salon.
pub const TWO_SALONS: &str = r"
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
  - id: root
    email: root@platform.io
    password: root-pass
    role: super_admin
staff:
  - id: staff-a1
    full_name: Ann Archer
    email: ann@alpha.com
    password: ann-pass
    specialty: Haircut
    salon_id: salon-a
  - id: staff-b1
    full_name: Ben Baker
    email: ben@bravo.com
    password: ben-pass
    specialty: Shave
    status: inactive
    salon_id: salon-b
";

/// A directory built from [`TWO_SALONS`].
///
/// # Panics
///
/// If the embedded seed is invalid.
#[must_use]
#[allow(clippy::expect_used)]
pub fn two_salons() -> TenantDirectory {
    let seed = SeedData::from_yaml(TWO_SALONS).expect("embedded seed parses");
    TenantDirectory::from_seed(seed).expect("embedded seed is valid")
}

/// Log in, panicking on failure.
///
/// # Panics
///
/// If the credentials are rejected.
#[must_use]
#[allow(clippy::expect_used)]
pub fn login(dir: &TenantDirectory, email: &str, password: &str) -> Session {
    dir.authenticate(email, password)
        .expect("test credentials are valid")
}

/// An email address no other test uses.
#[must_use]
pub fn unique_email(domain: &str) -> String {
    format!("test-{}@{domain}", Uuid::new_v4().simple())
}
