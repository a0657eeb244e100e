//! Scripted end-to-end flow against a directory.
//!
//! Walks the owner and staff journeys in order: owner login, salon lookup,
//! staff listing, staff creation, staff login, profile update, lookups,
//! statistics and (optionally) cleanup. Negative checks ride along: a
//! duplicate email, a wrong password and an invalid status must all be
//! rejected.
//!
//! A failed prerequisite aborts the run; the remaining steps are reported
//! as skipped.
//!
//! # Usage
//!
//! ```bash
//! bd-cli flow
//! bd-cli flow --keep-staff --json
//! ```

use std::fmt;

use barberdesk_core::directory::{
    AuthError, DirectoryCounts, DirectoryError, Session, StaffMember, StaffUpdate,
    ValidationError,
};
use barberdesk_core::{Role, TenantDirectory};
use serde::Serialize;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Inputs for a flow run.
#[derive(Debug, Clone)]
pub struct FlowOptions {
    pub owner_email: String,
    pub owner_password: String,
    /// Specialty given to the staff member the flow creates.
    pub specialty: String,
    /// Specialty the staff member is updated to.
    pub updated_specialty: String,
    /// Delete the created staff member at the end.
    pub cleanup: bool,
}

impl Default for FlowOptions {
    fn default() -> Self {
        Self {
            owner_email: "owner@barbershop.com".to_owned(),
            owner_password: "password123".to_owned(),
            specialty: "Haircut & Shave".to_owned(),
            updated_specialty: "Coloring & Treatments".to_owned(),
            cleanup: true,
        }
    }
}

/// Outcome of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    /// Passed with something worth a look (e.g. an empty staff list).
    Warning,
    Failed,
    Skipped,
}

impl StepStatus {
    const fn tag(self) -> &'static str {
        match self {
            Self::Passed => "PASS",
            Self::Warning => "WARN",
            Self::Failed => "FAIL",
            Self::Skipped => "SKIP",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepResult {
    pub name: &'static str,
    pub status: StepStatus,
    pub detail: String,
}

/// Everything a flow run did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FlowReport {
    pub steps: Vec<StepResult>,
    /// Set when a prerequisite failed and the run stopped early.
    pub aborted: bool,
    /// Directory row counts once the run ended.
    pub final_counts: Option<DirectoryCounts>,
}

impl FlowReport {
    /// True when no step failed and the run was not aborted.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !self.aborted && !self.steps.iter().any(|s| s.status == StepStatus::Failed)
    }

    #[must_use]
    pub fn count(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }

    #[must_use]
    pub fn step(&self, name: &str) -> Option<&StepResult> {
        self.steps.iter().find(|s| s.name == name)
    }

    fn record(&mut self, name: &'static str, status: StepStatus, detail: String) {
        match status {
            StepStatus::Passed | StepStatus::Skipped => info!(step = name, ?status, "{detail}"),
            StepStatus::Warning => warn!(step = name, "{detail}"),
            StepStatus::Failed => error!(step = name, "{detail}"),
        }
        self.steps.push(StepResult {
            name,
            status,
            detail,
        });
    }

    fn pass(&mut self, name: &'static str, detail: impl Into<String>) {
        self.record(name, StepStatus::Passed, detail.into());
    }

    fn warn(&mut self, name: &'static str, detail: impl Into<String>) {
        self.record(name, StepStatus::Warning, detail.into());
    }

    fn fail(&mut self, name: &'static str, detail: impl Into<String>) {
        self.record(name, StepStatus::Failed, detail.into());
    }

    fn skip(&mut self, name: &'static str, detail: impl Into<String>) {
        self.record(name, StepStatus::Skipped, detail.into());
    }

    /// Record `result`, returning the value on success.
    fn require<T, E: fmt::Display>(
        &mut self,
        name: &'static str,
        result: Result<T, E>,
        detail: impl FnOnce(&T) -> String,
    ) -> Option<T> {
        match result {
            Ok(value) => {
                self.pass(name, detail(&value));
                Some(value)
            }
            Err(e) => {
                self.fail(name, e.to_string());
                None
            }
        }
    }

    /// Record a check that must be rejected with a matching error.
    fn reject<T>(
        &mut self,
        name: &'static str,
        result: Result<T, DirectoryError>,
        expected: impl FnOnce(&DirectoryError) -> bool,
    ) {
        match result {
            Err(e) if expected(&e) => self.pass(name, format!("rejected: {e}")),
            Err(e) => self.fail(name, format!("rejected for the wrong reason: {e}")),
            Ok(_) => self.fail(name, "accepted but should have been rejected"),
        }
    }
}

impl fmt::Display for FlowReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            writeln!(f, "[{}] {}: {}", step.status.tag(), step.name, step.detail)?;
        }
        writeln!(f)?;
        if let Some(counts) = self.final_counts {
            writeln!(
                f,
                "Final state: {} salons, {} accounts, {} staff",
                counts.salons, counts.auth_accounts, counts.staff_members
            )?;
        }
        write!(
            f,
            "{} passed, {} warnings, {} failed, {} skipped",
            self.count(StepStatus::Passed),
            self.count(StepStatus::Warning),
            self.count(StepStatus::Failed),
            self.count(StepStatus::Skipped),
        )?;
        if self.aborted {
            write!(f, " (aborted)")?;
        }
        Ok(())
    }
}

/// Step names in run order.
pub const STEPS: [&str; 16] = [
    "initialize",
    "verify owner account",
    "owner login",
    "fetch salon",
    "list staff",
    "create staff",
    "reject duplicate email",
    "staff login",
    "reject wrong password",
    "update specialty",
    "reject invalid status",
    "find staff by email",
    "staff profile",
    "statistics",
    "delete staff",
    "deleted staff cannot log in",
];

/// Run the flow and report every step.
pub fn run(dir: &mut TenantDirectory, options: &FlowOptions) -> FlowReport {
    let mut report = FlowReport::default();
    if run_steps(dir, options, &mut report).is_none() {
        report.aborted = true;
        for name in STEPS {
            if report.step(name).is_none() {
                report.skip(name, "prerequisite failed");
            }
        }
    }
    let counts = dir.counts();
    report.final_counts = Some(counts);
    info!(
        success = report.is_success(),
        salons = counts.salons,
        accounts = counts.auth_accounts,
        staff = counts.staff_members,
        "Flow finished"
    );
    report
}

fn run_steps(
    dir: &mut TenantDirectory,
    options: &FlowOptions,
    report: &mut FlowReport,
) -> Option<()> {
    let counts = dir.counts();
    if counts.salons == 0 {
        report.fail("initialize", "directory has no salons");
        return None;
    }
    report.pass(
        "initialize",
        format!(
            "{} salons, {} accounts, {} staff",
            counts.salons, counts.auth_accounts, counts.staff_members
        ),
    );

    let account = dir
        .find_account(&options.owner_email)
        .map_err(|e| e.to_string())
        .and_then(|account| match account.role {
            Role::Owner => Ok(account.id.clone()),
            role => Err(format!("{} is a {role} account", account.email)),
        });
    report.require("verify owner account", account, |id| format!("owner account {id}"))?;

    let owner = report.require(
        "owner login",
        dir.authenticate_as(&options.owner_email, &options.owner_password, Role::Owner),
        |s: &Session| format!("logged in as {}", s.email),
    )?;

    let salon = report.require("fetch salon", dir.my_salon(&owner).cloned(), |salon| {
        format!("{} ({})", salon.name, salon.id)
    })?;

    let existing = dir.my_staff(&owner).map(|staff| staff.len());
    let existing = match existing {
        Ok(0) => {
            report.warn("list staff", "salon has no staff yet");
            0
        }
        other => report.require("list staff", other, |n| format!("{n} staff members"))?,
    };

    let suffix: String = Uuid::new_v4().simple().to_string().chars().take(8).collect();
    let domain = salon.owner_email.domain().to_owned();
    let email = format!("test-barber-{suffix}@{domain}");
    let created = report.require(
        "create staff",
        dir.create_staff_for(
            &owner,
            &format!("Test Barber {suffix}"),
            &email,
            &options.specialty,
        ),
        |m: &StaffMember| format!("{} <{}> id {}", m.full_name, m.email, m.id),
    )?;

    report.reject(
        "reject duplicate email",
        dir.create_staff_for(&owner, "Duplicate Barber", &email.to_uppercase(), "Shave"),
        |e| matches!(e, DirectoryError::Validation(ValidationError::DuplicateEmail(_))),
    );

    let password = created.password.expose().to_owned();
    let staff_session = report.require(
        "staff login",
        dir.authenticate_as(&email, &password, Role::Staff),
        |s: &Session| format!("logged in as {}", s.email),
    )?;

    report.reject(
        "reject wrong password",
        dir.authenticate(&email, &format!("{password}-wrong")),
        |e| matches!(e, DirectoryError::Auth(AuthError::InvalidCredentials)),
    );

    let updated = dir
        .update_staff_for(
            &owner,
            &created.id,
            StaffUpdate::Specialty(options.updated_specialty.clone()),
        )
        .map_err(|e| e.to_string())
        .and_then(|m| {
            if m.specialty == options.updated_specialty.trim() {
                Ok(m.specialty)
            } else {
                Err(format!("stored specialty is {:?}", m.specialty))
            }
        });
    report.require("update specialty", updated, |specialty| {
        format!("specialty now {specialty:?}")
    })?;

    report.reject(
        "reject invalid status",
        dir.update_staff_field(&created.id, "status", "on-vacation"),
        |e| matches!(e, DirectoryError::Validation(ValidationError::InvalidStatus(_))),
    );

    let found = dir
        .find_staff_by_email(&email)
        .map_err(|e| e.to_string())
        .and_then(|m| {
            if m.id == created.id {
                Ok(m.id.clone())
            } else {
                Err(format!("email resolved to {}", m.id))
            }
        });
    report.require("find staff by email", found, |id| format!("found {id}"))?;

    let profile = dir
        .my_profile(&staff_session)
        .map_err(|e| e.to_string())
        .and_then(|m| {
            if m.salon_id == salon.id {
                Ok(m.salon_id.clone())
            } else {
                Err(format!("profile points at {}", m.salon_id))
            }
        });
    report.require("staff profile", profile, |salon_id| {
        format!("member of {salon_id}")
    })?;

    let expected = existing + 1;
    let stats = dir
        .my_statistics(&owner)
        .map_err(|e| e.to_string())
        .and_then(|stats| {
            if stats.total_staff == expected {
                Ok(stats)
            } else {
                Err(format!("expected {expected} staff, found {}", stats.total_staff))
            }
        });
    report.require("statistics", stats, |stats| {
        format!(
            "{} total, {} active, specialties {:?}",
            stats.total_staff, stats.active_staff, stats.specialties
        )
    })?;

    if !options.cleanup {
        report.skip("delete staff", format!("kept {}", created.id));
        report.skip("deleted staff cannot log in", "staff member kept");
        return Some(());
    }

    report.require(
        "delete staff",
        dir.delete_staff_for(&owner, &created.id),
        |m: &StaffMember| format!("deleted {}", m.id),
    )?;

    report.reject(
        "deleted staff cannot log in",
        dir.authenticate(&email, &password),
        |e| matches!(e, DirectoryError::Auth(AuthError::InvalidCredentials)),
    );

    Some(())
}
