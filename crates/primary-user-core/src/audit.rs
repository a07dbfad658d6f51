// crates/primary-user-core/src/audit.rs
// ============================================================================
// Module: Run Audit Logging
// Description: Structured audit events for reconciliation runs.
// Purpose: Emit JSON-line run and per-device events without hard dependencies.
// Dependencies: crate::core, serde, serde_json
// ============================================================================

//! ## Overview
//! Audit events trace a run as it happens: run start, telemetry load, one
//! event per device entry, and completion or abort. They complement the CSV
//! report, which is written for operators; audit lines are written for log
//! pipelines. Sinks never fail the run: serialization or write errors are
//! dropped.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::core::OutcomeKind;
use crate::core::ReportEntry;
use crate::core::RunSummary;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Phase of a run reported by a [`RunAuditEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunPhase {
    /// Run accepted its inputs.
    Started,
    /// Sign-in telemetry was fetched and indexed.
    SignInsLoaded,
    /// Device resolution finished.
    DevicesResolved,
    /// Every device produced a report entry.
    Completed,
    /// Run stopped on a fatal error.
    Aborted,
}

/// Run-level audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct RunAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Run phase.
    pub phase: RunPhase,
    /// Device source description (group name or input path).
    pub source: Option<String>,
    /// Count relevant to the phase (events or devices).
    pub count: Option<usize>,
    /// Final outcome counters.
    pub summary: Option<RunSummary>,
    /// Optional message.
    pub message: Option<String>,
}

/// Per-device audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Management identifier; empty for unresolved group members.
    pub device_id: String,
    /// Directory identifier when known.
    pub directory_id: Option<String>,
    /// Device display name.
    pub display_name: String,
    /// Outcome classification.
    pub outcome: OutcomeKind,
    /// Whether the management store was changed.
    pub modified: bool,
    /// Current primary user when known.
    pub current_primary_user: Option<String>,
    /// Target user when determined.
    pub target_user: Option<String>,
    /// Diagnostic message.
    pub message: Option<String>,
}

/// Returns the current time in milliseconds since the epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}

impl RunAuditEvent {
    /// Creates a run event with a consistent timestamp.
    fn new(phase: RunPhase) -> Self {
        Self {
            event: "run",
            timestamp_ms: now_ms(),
            phase,
            source: None,
            count: None,
            summary: None,
            message: None,
        }
    }

    /// Run start event naming the device source.
    #[must_use]
    pub fn started(source: impl Into<String>, dry_run: bool) -> Self {
        let mut event = Self::new(RunPhase::Started);
        event.source = Some(source.into());
        if dry_run {
            event.message = Some("dry run".to_string());
        }
        event
    }

    /// Telemetry load event carrying the number of fetched events.
    #[must_use]
    pub fn signins_loaded(event_count: usize) -> Self {
        let mut event = Self::new(RunPhase::SignInsLoaded);
        event.count = Some(event_count);
        event
    }

    /// Resolution event carrying the number of devices ready to reconcile.
    #[must_use]
    pub fn devices_resolved(device_count: usize) -> Self {
        let mut event = Self::new(RunPhase::DevicesResolved);
        event.count = Some(device_count);
        event
    }

    /// Completion event carrying the outcome counters.
    #[must_use]
    pub fn completed(summary: RunSummary) -> Self {
        let mut event = Self::new(RunPhase::Completed);
        event.count = Some(summary.processed);
        event.summary = Some(summary);
        event
    }

    /// Abort event carrying the fatal error message.
    #[must_use]
    pub fn aborted(message: impl Into<String>) -> Self {
        let mut event = Self::new(RunPhase::Aborted);
        event.message = Some(message.into());
        event
    }
}

impl DeviceAuditEvent {
    /// Creates a device event from a report entry.
    #[must_use]
    pub fn from_entry(entry: &ReportEntry) -> Self {
        let timestamp_ms = now_ms();
        match entry {
            ReportEntry::Reconciled(outcome) => Self {
                event: "device",
                timestamp_ms,
                device_id: outcome.device.management_id.to_string(),
                directory_id: Some(outcome.device.directory_id.to_string()),
                display_name: outcome.device.display_name.clone(),
                outcome: outcome.kind,
                modified: outcome.was_modified,
                current_primary_user: outcome.current_primary_user.clone(),
                target_user: outcome.target_user.as_ref().ok().cloned(),
                message: outcome.message.clone(),
            },
            ReportEntry::Unresolved(failure) => Self {
                event: "device",
                timestamp_ms,
                device_id: failure.management_id.clone().unwrap_or_default(),
                directory_id: failure.directory_id.clone(),
                display_name: failure.display_name.clone(),
                outcome: failure.kind,
                modified: false,
                current_primary_user: None,
                target_user: None,
                message: Some(failure.message.clone()),
            },
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for run and device events.
pub trait AuditSink: Send + Sync {
    /// Record a run-level event.
    fn record_run(&self, event: &RunAuditEvent);

    /// Record a device event.
    fn record_device(&self, event: &DeviceAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record_run(&self, event: &RunAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }

    fn record_device(&self, event: &DeviceAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one serialized event.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(payload) = serde_json::to_string(event)
            && let Ok(mut file) = self.file.lock()
        {
            let _ = writeln!(file, "{payload}");
            let _ = file.flush();
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record_run(&self, event: &RunAuditEvent) {
        self.append(event);
    }

    fn record_device(&self, event: &DeviceAuditEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record_run(&self, _event: &RunAuditEvent) {}

    fn record_device(&self, _event: &DeviceAuditEvent) {}
}

// ============================================================================
// SECTION: Tests
// ============================================================================
