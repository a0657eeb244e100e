//! Read-only directory inspection.
//!
//! # Usage
//!
//! ```bash
//! # Everything in the directory (passwords are never printed)
//! bd-cli dump
//! bd-cli dump --json
//!
//! # Statistics for one owner's salon
//! bd-cli stats --owner owner@barbershop.com
//! ```

use std::io::Write;

use barberdesk_core::TenantDirectory;
use barberdesk_core::directory::{DirectorySnapshot, SalonStatistics};

use super::write_json;
use crate::error::CliError;

/// Print the whole directory.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn dump(dir: &TenantDirectory, json: bool, out: &mut impl Write) -> Result<(), CliError> {
    let snapshot = dir.snapshot();
    if json {
        return write_json(out, &snapshot);
    }
    write_snapshot(&snapshot, out)?;
    Ok(())
}

pub(crate) fn write_snapshot(
    snapshot: &DirectorySnapshot,
    out: &mut impl Write,
) -> std::io::Result<()> {
    let counts = snapshot.counts;
    writeln!(out, "Salons ({}):", counts.salons)?;
    for salon in &snapshot.salons {
        writeln!(out, "  {}  {}  owner {}", salon.id, salon.name, salon.owner_email)?;
    }

    writeln!(out, "Accounts ({}):", counts.auth_accounts)?;
    for account in &snapshot.accounts {
        writeln!(out, "  {}  {}  {}", account.id, account.email, account.role)?;
    }

    writeln!(out, "Staff ({}):", counts.staff_members)?;
    for member in &snapshot.staff {
        writeln!(
            out,
            "  {}  {} <{}>  {}  {}  salon {}",
            member.id,
            member.full_name,
            member.email,
            member.specialty,
            member.status,
            member.salon_id
        )?;
    }
    Ok(())
}

/// Print statistics for the salon owned by `owner_email`.
///
/// # Errors
///
/// `NotFound` if the email owns no salon, or an I/O error.
pub fn stats(
    dir: &TenantDirectory,
    owner_email: &str,
    json: bool,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let salon = dir.get_salon_for_owner(owner_email)?;
    let stats = dir.statistics(&salon.id);
    if json {
        return write_json(out, &stats);
    }
    writeln!(out, "{} ({})", salon.name, salon.id)?;
    write_statistics(&stats, out)?;
    Ok(())
}

pub(crate) fn write_statistics(
    stats: &SalonStatistics,
    out: &mut impl Write,
) -> std::io::Result<()> {
    writeln!(out, "  Total staff:    {}", stats.total_staff)?;
    writeln!(out, "  Active:         {}", stats.active_staff)?;
    writeln!(out, "  Inactive:       {}", stats.inactive_staff)?;
    writeln!(
        out,
        "  Specialties ({}): {}",
        stats.unique_specialties,
        stats.specialties.join(", ")
    )
}
