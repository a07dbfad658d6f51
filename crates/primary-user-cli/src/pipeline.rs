// crates/primary-user-cli/src/pipeline.rs
// ============================================================================
// Module: Run Pipeline
// Description: Ordered execution of one reconciliation run.
// Purpose: Sequence input validation, resolution, telemetry, and reconciliation.
// Dependencies: primary-user-core, thiserror
// ============================================================================

//! ## Overview
//! A run validates its device source before any remote call, resolves the
//! devices, fetches the sign-in window exactly once, and only then reconciles
//! devices one at a time into the report. Input schema errors, a missing
//! group, and a failed telemetry fetch abort the run; everything after that
//! point degrades to per-device report rows.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use primary_user_core::AuditSink;
use primary_user_core::DeviceManagementStore;
use primary_user_core::GroupDirectory;
use primary_user_core::GroupError;
use primary_user_core::InputError;
use primary_user_core::ReconcileConfig;
use primary_user_core::Reconciler;
use primary_user_core::RemoteError;
use primary_user_core::ReportError;
use primary_user_core::ReportSink;
use primary_user_core::RunAuditEvent;
use primary_user_core::RunSummary;
use primary_user_core::SignInIndex;
use primary_user_core::SignInTelemetrySource;
use primary_user_core::UserDirectory;
use primary_user_core::runtime::read_device_input;
use primary_user_core::runtime::resolve_group_members;
use primary_user_core::runtime::resolve_input_rows;
use thiserror::Error;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Where the devices of a run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DeviceSource {
    /// Device-typed members of a directory group.
    Group(String),
    /// Rows of a CSV input file.
    Input(PathBuf),
}

impl DeviceSource {
    /// Returns a label for audit events.
    pub(crate) fn label(&self) -> String {
        match self {
            Self::Group(name) => format!("group:{name}"),
            Self::Input(path) => format!("input:{}", path.display()),
        }
    }
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RunPlan {
    /// Device source.
    pub(crate) source: DeviceSource,
    /// Sign-in window length in days.
    pub(crate) window_days: u32,
    /// Application filter for sign-ins, if any.
    pub(crate) app_filter: Option<String>,
    /// Skip writes.
    pub(crate) dry_run: bool,
    /// Report directory.
    pub(crate) output_dir: PathBuf,
    /// Report file name prefix.
    pub(crate) file_prefix: String,
}

/// Run-aborting failures.
#[derive(Debug, Error)]
pub(crate) enum RunError {
    /// The input file failed validation.
    #[error(transparent)]
    Input(#[from] InputError),
    /// The group could not be resolved.
    #[error(transparent)]
    Group(#[from] GroupError),
    /// The sign-in window could not be fetched.
    #[error("sign-in telemetry fetch failed: {0}")]
    Telemetry(RemoteError),
    /// The report could not be written.
    #[error(transparent)]
    Report(#[from] ReportError),
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Executes a run against the remote collaborators, appending to `report`.
///
/// # Errors
///
/// Returns [`RunError`] on any run-aborting failure; entries appended before
/// the failure remain in the report.
pub(crate) fn execute<C, R>(
    plan: &RunPlan,
    remote: &C,
    report: &mut R,
    audit: &dyn AuditSink,
) -> Result<RunSummary, RunError>
where
    C: UserDirectory + DeviceManagementStore + GroupDirectory + SignInTelemetrySource,
    R: ReportSink + ?Sized,
{
    audit.record_run(&RunAuditEvent::started(plan.source.label(), plan.dry_run));

    let resolved = match &plan.source {
        DeviceSource::Input(path) => {
            let rows = read_device_input(path)?;
            resolve_input_rows(rows, remote)
        }
        DeviceSource::Group(name) => {
            let members = remote.resolve_device_members(name)?;
            resolve_group_members(members, remote)
        }
    };
    audit.record_run(&RunAuditEvent::devices_resolved(resolved.devices.len()));

    let events = remote
        .fetch_window(plan.app_filter.as_deref(), plan.window_days)
        .map_err(RunError::Telemetry)?;
    let index = SignInIndex::build(&events);
    audit.record_run(&RunAuditEvent::signins_loaded(index.event_count()));

    let reconciler = Reconciler::new(
        remote,
        remote,
        ReconcileConfig {
            dry_run: plan.dry_run,
        },
    );
    let summary = reconciler.run(resolved, &index, report, audit)?;
    audit.record_run(&RunAuditEvent::completed(summary));
    Ok(summary)
}
