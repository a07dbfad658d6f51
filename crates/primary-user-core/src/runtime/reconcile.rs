// crates/primary-user-core/src/runtime/reconcile.rs
// ============================================================================
// Module: Reconciliation Engine
// Description: Per-device primary user reconciliation against remote stores.
// Purpose: Converge each device's primary user onto its most frequent signer.
// Dependencies: crate::{audit, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! The [`Reconciler`] drives one device at a time through a fixed sequence:
//! aggregate lookup, directory validation, current assignment read, and at
//! most one write. Every device yields exactly one [`ReconciliationOutcome`];
//! collaborator failures are captured into the outcome and never abort the
//! run.
//!
//! Invariants:
//! - No management call is issued for a device without a target principal or
//!   whose principal is missing from the directory.
//! - No write is issued when the current assignment already matches the
//!   target (case-insensitive), so a repeated run with unchanged inputs
//!   performs zero writes.
//! - The write is attempted at most once per device per run and never retried.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::audit::AuditSink;
use crate::audit::DeviceAuditEvent;
use crate::core::DeviceRecord;
use crate::core::ReconciliationOutcome;
use crate::core::ReportEntry;
use crate::core::RunSummary;
use crate::core::TargetFailure;
use crate::core::principals_match;
use crate::interfaces::DeviceManagementStore;
use crate::interfaces::UserDirectory;
use crate::runtime::aggregate::SignInIndex;
use crate::runtime::report::ReportError;
use crate::runtime::report::ReportSink;
use crate::runtime::resolution::ResolvedDevices;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Reconciliation options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileConfig {
    /// Skip writes and report the change that would have been made.
    pub dry_run: bool,
}

// ============================================================================
// SECTION: Reconciler
// ============================================================================

/// Reconciliation engine bound to its remote collaborators.
pub struct Reconciler<'a, D: ?Sized, M: ?Sized> {
    /// Identity directory used to validate target principals.
    directory: &'a D,
    /// Device-management store read and written per device.
    management: &'a M,
    /// Reconciliation options.
    config: ReconcileConfig,
}

impl<'a, D, M> Reconciler<'a, D, M>
where
    D: UserDirectory + ?Sized,
    M: DeviceManagementStore + ?Sized,
{
    /// Creates a reconciler over the given collaborators.
    #[must_use]
    pub const fn new(directory: &'a D, management: &'a M, config: ReconcileConfig) -> Self {
        Self {
            directory,
            management,
            config,
        }
    }

    /// Reconciles a single device.
    #[must_use]
    pub fn reconcile(&self, device: DeviceRecord, signins: &SignInIndex) -> ReconciliationOutcome {
        let Some(target) = signins.most_frequent_user(&device.directory_id) else {
            return ReconciliationOutcome::target_failed(
                device,
                TargetFailure::NoSignInActivity,
                None,
            );
        };
        let target = target.to_string();

        let user = match self.directory.lookup_by_principal(&target) {
            Ok(Some(user)) => user,
            Ok(None) => {
                return ReconciliationOutcome::target_failed(
                    device,
                    TargetFailure::PrincipalNotFound,
                    Some(format!("principal not found: {target}")),
                );
            }
            Err(err) => {
                return ReconciliationOutcome::target_failed(
                    device,
                    TargetFailure::DirectoryLookupFailed,
                    Some(err.to_string()),
                );
            }
        };

        let current = match self.management.get_primary_user(&device.management_id) {
            Ok(current) => current,
            Err(err) => {
                return ReconciliationOutcome::read_failed(
                    device,
                    target,
                    format!("current primary user unreadable: {err}"),
                );
            }
        };

        if let Some(current) = current.as_deref()
            && principals_match(current, &target)
        {
            let current = current.to_string();
            return ReconciliationOutcome::unchanged(device, current, target);
        }

        if self.config.dry_run {
            return ReconciliationOutcome::would_update(device, current, target);
        }

        match self.management.set_primary_user(&device.management_id, &user.id) {
            Ok(()) => ReconciliationOutcome::updated(device, current, target),
            Err(err) => ReconciliationOutcome::write_failed(device, current, target, err.to_string()),
        }
    }

    /// Processes a resolved device set in order, appending one report entry
    /// per device.
    ///
    /// Resolution failures are appended first, in resolution order, followed
    /// by one outcome per resolved device.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the report cannot be appended to; devices
    /// after the failing entry are not processed.
    pub fn run<R>(
        &self,
        resolved: ResolvedDevices,
        signins: &SignInIndex,
        report: &mut R,
        audit: &dyn AuditSink,
    ) -> Result<RunSummary, ReportError>
    where
        R: ReportSink + ?Sized,
    {
        let mut summary = RunSummary::default();
        for failure in resolved.failures {
            record_entry(ReportEntry::from(failure), report, audit, &mut summary)?;
        }
        for device in resolved.devices {
            let outcome = self.reconcile(device, signins);
            record_entry(ReportEntry::from(outcome), report, audit, &mut summary)?;
        }
        Ok(summary)
    }
}

/// Audits, counts, and appends one entry.
fn record_entry<R>(
    entry: ReportEntry,
    report: &mut R,
    audit: &dyn AuditSink,
    summary: &mut RunSummary,
) -> Result<(), ReportError>
where
    R: ReportSink + ?Sized,
{
    audit.record_device(&DeviceAuditEvent::from_entry(&entry));
    summary.record(entry.kind());
    report.append(entry)
}
