// crates/primary-user-core/src/lib.rs
// ============================================================================
// Module: Primary User Sync Core Library
// Description: Public API surface for primary user reconciliation.
// Purpose: Expose core types, collaborator interfaces, and runtime helpers.
// Dependencies: crate::{audit, core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Primary User Sync core reassigns the primary user of managed devices to
//! the principal that signed in most often over a trailing window. It is
//! backend-agnostic: the user directory, device-management store, group
//! directory, and sign-in telemetry are reached through the traits in
//! [`interfaces`].
//!
//! Invariants:
//! - Devices are processed sequentially and each yields exactly one report entry.
//! - Sign-in telemetry is fetched once per run, before any device is reconciled.
//! - At most one write is issued per device per run, and none when the current
//!   assignment already matches.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use crate::core::*;

pub use audit::AuditSink;
pub use audit::DeviceAuditEvent;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::RunAuditEvent;
pub use audit::RunPhase;
pub use audit::StderrAuditSink;
pub use interfaces::DeviceManagementStore;
pub use interfaces::GroupDirectory;
pub use interfaces::GroupError;
pub use interfaces::RemoteError;
pub use interfaces::SignInTelemetrySource;
pub use interfaces::UserDirectory;
pub use runtime::CsvReportWriter;
pub use runtime::InputError;
pub use runtime::OutcomeReport;
pub use runtime::ReconcileConfig;
pub use runtime::Reconciler;
pub use runtime::ReportError;
pub use runtime::ReportSink;
pub use runtime::ResolvedDevices;
pub use runtime::SignInIndex;
