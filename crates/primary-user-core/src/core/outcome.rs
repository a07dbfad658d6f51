// crates/primary-user-core/src/core/outcome.rs
// ============================================================================
// Module: Reconciliation Outcomes
// Description: Per-device outcome records and run summary counters.
// Purpose: Give every processed device exactly one structured result.
// Dependencies: crate::core::device, serde, thiserror
// ============================================================================

//! ## Overview
//! Every device that enters a run leaves it as exactly one [`ReportEntry`]:
//! either a [`ReconciliationOutcome`] produced by the engine or a
//! [`ResolutionFailure`] produced by the resolution adapter. Entries are
//! immutable once produced and are appended to the report in processing order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use thiserror::Error;

use crate::core::device::DeviceRecord;

// ============================================================================
// SECTION: Target Determination
// ============================================================================

/// Reason a target user could not be determined for a device.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - No write is ever attempted for a device with a target failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetFailure {
    /// The device has no qualifying sign-in events in the window.
    #[error("no sign-in activity")]
    NoSignInActivity,
    /// The most frequent principal does not exist in the directory.
    #[error("principal not found")]
    PrincipalNotFound,
    /// The directory lookup for the principal failed.
    #[error("directory lookup failed")]
    DirectoryLookupFailed,
}

// ============================================================================
// SECTION: Outcome Classification
// ============================================================================

/// Classification of a per-device result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// Primary user was changed.
    Updated,
    /// Primary user differs but the run was a dry run.
    WouldUpdate,
    /// Primary user already matched the target.
    Unchanged,
    /// No qualifying sign-in events.
    NoSignInActivity,
    /// Target principal missing from the directory.
    PrincipalNotFound,
    /// Target principal lookup failed.
    DirectoryLookupFailed,
    /// Reading the current primary user failed.
    ReadFailed,
    /// The update call was rejected.
    WriteFailed,
    /// Device is not present in the management store.
    NotManaged,
    /// Device lookup failed or returned an unusable record.
    ResolutionFailed,
}

impl OutcomeKind {
    /// Failure kinds, in the order the run summary lists them.
    pub const FAILURES: [Self; 7] = [
        Self::NoSignInActivity,
        Self::PrincipalNotFound,
        Self::DirectoryLookupFailed,
        Self::ReadFailed,
        Self::WriteFailed,
        Self::NotManaged,
        Self::ResolutionFailed,
    ];

    /// Returns a stable label for the outcome kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Updated => "updated",
            Self::WouldUpdate => "would_update",
            Self::Unchanged => "unchanged",
            Self::NoSignInActivity => "no_sign_in_activity",
            Self::PrincipalNotFound => "principal_not_found",
            Self::DirectoryLookupFailed => "directory_lookup_failed",
            Self::ReadFailed => "read_failed",
            Self::WriteFailed => "write_failed",
            Self::NotManaged => "not_managed",
            Self::ResolutionFailed => "resolution_failed",
        }
    }

    /// Returns true when the kind represents a failure.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        !matches!(self, Self::Updated | Self::WouldUpdate | Self::Unchanged)
    }
}

impl From<TargetFailure> for OutcomeKind {
    fn from(failure: TargetFailure) -> Self {
        match failure {
            TargetFailure::NoSignInActivity => Self::NoSignInActivity,
            TargetFailure::PrincipalNotFound => Self::PrincipalNotFound,
            TargetFailure::DirectoryLookupFailed => Self::DirectoryLookupFailed,
        }
    }
}

// ============================================================================
// SECTION: Reconciliation Outcome
// ============================================================================

/// Result of reconciling one device.
///
/// # Invariants
/// - `was_modified` is true only for [`OutcomeKind::Updated`].
/// - `target_user` is `Err` only for target-determination failures; write and
///   read failures keep the intended target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationOutcome {
    /// Device the outcome describes.
    pub device: DeviceRecord,
    /// Primary user before reconciliation, `None` when unassigned or unread.
    pub current_primary_user: Option<String>,
    /// Target user, or the reason it could not be determined.
    pub target_user: Result<String, TargetFailure>,
    /// Whether the management store was changed.
    pub was_modified: bool,
    /// Diagnostic or informational message.
    pub message: Option<String>,
    /// Outcome classification.
    pub kind: OutcomeKind,
}

impl ReconciliationOutcome {
    /// Builds an outcome for a device whose target could not be determined.
    #[must_use]
    pub fn target_failed(
        device: DeviceRecord,
        failure: TargetFailure,
        message: Option<String>,
    ) -> Self {
        Self {
            device,
            current_primary_user: None,
            target_user: Err(failure),
            was_modified: false,
            message: Some(message.unwrap_or_else(|| failure.to_string())),
            kind: failure.into(),
        }
    }

    /// Builds an outcome for a device already assigned to its target.
    #[must_use]
    pub fn unchanged(device: DeviceRecord, current: String, target: String) -> Self {
        Self {
            device,
            current_primary_user: Some(current),
            target_user: Ok(target),
            was_modified: false,
            message: Some("already correct".to_string()),
            kind: OutcomeKind::Unchanged,
        }
    }

    /// Builds an outcome for a device whose primary user was changed.
    #[must_use]
    pub fn updated(device: DeviceRecord, current: Option<String>, target: String) -> Self {
        Self {
            device,
            current_primary_user: current,
            target_user: Ok(target),
            was_modified: true,
            message: None,
            kind: OutcomeKind::Updated,
        }
    }

    /// Builds an outcome for a device that would change outside a dry run.
    #[must_use]
    pub fn would_update(device: DeviceRecord, current: Option<String>, target: String) -> Self {
        Self {
            device,
            current_primary_user: current,
            target_user: Ok(target),
            was_modified: false,
            message: Some("would update (dry run)".to_string()),
            kind: OutcomeKind::WouldUpdate,
        }
    }

    /// Builds an outcome for a device whose current assignment could not be read.
    #[must_use]
    pub fn read_failed(device: DeviceRecord, target: String, message: String) -> Self {
        Self {
            device,
            current_primary_user: None,
            target_user: Ok(target),
            was_modified: false,
            message: Some(message),
            kind: OutcomeKind::ReadFailed,
        }
    }

    /// Builds an outcome for a device whose update call was rejected.
    #[must_use]
    pub fn write_failed(
        device: DeviceRecord,
        current: Option<String>,
        target: String,
        message: String,
    ) -> Self {
        Self {
            device,
            current_primary_user: current,
            target_user: Ok(target),
            was_modified: false,
            message: Some(message),
            kind: OutcomeKind::WriteFailed,
        }
    }
}

// ============================================================================
// SECTION: Resolution Failure
// ============================================================================

/// Device entry that could not be resolved to a managed device.
///
/// # Invariants
/// - Never reaches the reconciliation engine.
/// - Exactly one of `management_id` and `directory_id` is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionFailure {
    /// Management identifier supplied by an input row.
    pub management_id: Option<String>,
    /// Directory identifier supplied by a group membership entry.
    pub directory_id: Option<String>,
    /// Display name supplied with the entry.
    pub display_name: String,
    /// Diagnostic message.
    pub message: String,
    /// Outcome classification.
    pub kind: OutcomeKind,
}

impl ResolutionFailure {
    /// Builds a failure for an input row absent from the management store.
    #[must_use]
    pub fn not_managed(management_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            management_id: Some(management_id.into()),
            directory_id: None,
            display_name: display_name.into(),
            message: "not managed".to_string(),
            kind: OutcomeKind::NotManaged,
        }
    }

    /// Builds a failure for an input row whose lookup failed or was unusable.
    #[must_use]
    pub fn lookup_failed(
        management_id: impl Into<String>,
        display_name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            management_id: Some(management_id.into()),
            directory_id: None,
            display_name: display_name.into(),
            message: message.into(),
            kind: OutcomeKind::ResolutionFailed,
        }
    }

    /// Builds a failure for a group member absent from the management store.
    ///
    /// The directory identifier is carried in the message, not in the
    /// management identifier column.
    #[must_use]
    pub fn member_not_managed(
        directory_id: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        let directory_id = directory_id.into();
        Self {
            message: format!("not managed (directory id {directory_id})"),
            management_id: None,
            directory_id: Some(directory_id),
            display_name: display_name.into(),
            kind: OutcomeKind::NotManaged,
        }
    }

    /// Builds a failure for a group member whose lookup failed.
    #[must_use]
    pub fn member_lookup_failed(
        directory_id: impl Into<String>,
        display_name: impl Into<String>,
        message: impl AsRef<str>,
    ) -> Self {
        let directory_id = directory_id.into();
        Self {
            message: format!("{} (directory id {directory_id})", message.as_ref()),
            management_id: None,
            directory_id: Some(directory_id),
            display_name: display_name.into(),
            kind: OutcomeKind::ResolutionFailed,
        }
    }
}

// ============================================================================
// SECTION: Report Entry
// ============================================================================

/// One row of the run report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEntry {
    /// Device reached the reconciliation engine.
    Reconciled(ReconciliationOutcome),
    /// Device was dropped during resolution.
    Unresolved(ResolutionFailure),
}

impl ReportEntry {
    /// Returns the outcome classification of the entry.
    #[must_use]
    pub const fn kind(&self) -> OutcomeKind {
        match self {
            Self::Reconciled(outcome) => outcome.kind,
            Self::Unresolved(failure) => failure.kind,
        }
    }
}

impl From<ReconciliationOutcome> for ReportEntry {
    fn from(outcome: ReconciliationOutcome) -> Self {
        Self::Reconciled(outcome)
    }
}

impl From<ResolutionFailure> for ReportEntry {
    fn from(failure: ResolutionFailure) -> Self {
        Self::Unresolved(failure)
    }
}

// ============================================================================
// SECTION: Run Summary
// ============================================================================

/// Outcome counters for a completed run.
///
/// # Invariants
/// - Every [`OutcomeKind`] has its own counter.
/// - `failed` equals the sum of the failure-kind counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Number of report entries produced.
    pub processed: usize,
    /// Devices whose primary user was changed.
    pub updated: usize,
    /// Devices that would change outside a dry run.
    pub would_update: usize,
    /// Devices already assigned to their target.
    pub unchanged: usize,
    /// Devices with any failure outcome.
    pub failed: usize,
    /// Devices without qualifying sign-ins.
    pub no_sign_in_activity: usize,
    /// Devices whose target principal is missing from the directory.
    pub principal_not_found: usize,
    /// Devices whose target principal lookup failed.
    pub directory_lookup_failed: usize,
    /// Devices whose current primary user could not be read.
    pub read_failed: usize,
    /// Devices whose update was rejected.
    pub write_failed: usize,
    /// Entries absent from the management store.
    pub not_managed: usize,
    /// Entries whose management lookup failed or was unusable.
    pub resolution_failed: usize,
}

impl RunSummary {
    /// Counts one entry of the given kind.
    pub const fn record(&mut self, kind: OutcomeKind) {
        self.processed += 1;
        if kind.is_failure() {
            self.failed += 1;
        }
        match kind {
            OutcomeKind::Updated => self.updated += 1,
            OutcomeKind::WouldUpdate => self.would_update += 1,
            OutcomeKind::Unchanged => self.unchanged += 1,
            OutcomeKind::NoSignInActivity => self.no_sign_in_activity += 1,
            OutcomeKind::PrincipalNotFound => self.principal_not_found += 1,
            OutcomeKind::DirectoryLookupFailed => self.directory_lookup_failed += 1,
            OutcomeKind::ReadFailed => self.read_failed += 1,
            OutcomeKind::WriteFailed => self.write_failed += 1,
            OutcomeKind::NotManaged => self.not_managed += 1,
            OutcomeKind::ResolutionFailed => self.resolution_failed += 1,
        }
    }

    /// Returns the counter for one outcome kind.
    #[must_use]
    pub const fn count(&self, kind: OutcomeKind) -> usize {
        match kind {
            OutcomeKind::Updated => self.updated,
            OutcomeKind::WouldUpdate => self.would_update,
            OutcomeKind::Unchanged => self.unchanged,
            OutcomeKind::NoSignInActivity => self.no_sign_in_activity,
            OutcomeKind::PrincipalNotFound => self.principal_not_found,
            OutcomeKind::DirectoryLookupFailed => self.directory_lookup_failed,
            OutcomeKind::ReadFailed => self.read_failed,
            OutcomeKind::WriteFailed => self.write_failed,
            OutcomeKind::NotManaged => self.not_managed,
            OutcomeKind::ResolutionFailed => self.resolution_failed,
        }
    }

    /// Builds a summary from a sequence of entries.
    #[must_use]
    pub fn from_entries<'a>(entries: impl IntoIterator<Item = &'a ReportEntry>) -> Self {
        let mut summary = Self::default();
        for entry in entries {
            summary.record(entry.kind());
        }
        summary
    }
}
