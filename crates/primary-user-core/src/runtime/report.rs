// crates/primary-user-core/src/runtime/report.rs
// ============================================================================
// Module: Outcome Reporter
// Description: Append-only run reports in memory and as CSV.
// Purpose: Preserve the literal per-device trace of a run for audit.
// Dependencies: crate::core, csv, serde, thiserror, time
// ============================================================================

//! ## Overview
//! The report holds one row per report entry in processing order, with no
//! aggregation. [`OutcomeReport`] keeps entries in memory;
//! [`CsvReportWriter`] streams them to a CSV file, writing the header up
//! front so an aborted run still leaves a header-only report behind.
//!
//! Column contract: `ManagedDeviceId,DeviceName,CurrentPrimaryUser,TargetUser,Modified,Message`
//! with `None` for an absent current user, `Failed` for an undetermined target,
//! and `Yes`/`No` for the modification flag.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use csv::WriterBuilder;
use serde::Serialize;
use thiserror::Error;
use time::OffsetDateTime;

use crate::core::ReportEntry;
use crate::core::RunSummary;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Report header, in column order.
pub const REPORT_HEADER: [&str; 6] =
    ["ManagedDeviceId", "DeviceName", "CurrentPrimaryUser", "TargetUser", "Modified", "Message"];
/// Placeholder for an absent current primary user.
pub const NO_PRIMARY_USER: &str = "None";
/// Placeholder for an undetermined target user.
pub const FAILED_TARGET: &str = "Failed";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Report write errors.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The report file could not be created.
    #[error("report create error: {path}: {message}")]
    Create {
        /// Report path.
        path: String,
        /// Underlying error text.
        message: String,
    },
    /// A row could not be written.
    #[error("report write error: {0}")]
    Write(String),
}

// ============================================================================
// SECTION: Report Rows
// ============================================================================

/// Serialized report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// Management identifier, or the raw input identifier for unresolved entries.
    #[serde(rename = "ManagedDeviceId")]
    pub managed_device_id: String,
    /// Device display name.
    #[serde(rename = "DeviceName")]
    pub device_name: String,
    /// Current primary user or [`NO_PRIMARY_USER`].
    #[serde(rename = "CurrentPrimaryUser")]
    pub current_primary_user: String,
    /// Target user or [`FAILED_TARGET`].
    #[serde(rename = "TargetUser")]
    pub target_user: String,
    /// `Yes` or `No`.
    #[serde(rename = "Modified")]
    pub modified: &'static str,
    /// Diagnostic message, empty when none.
    #[serde(rename = "Message")]
    pub message: String,
}

impl From<&ReportEntry> for ReportRow {
    fn from(entry: &ReportEntry) -> Self {
        match entry {
            ReportEntry::Reconciled(outcome) => Self {
                managed_device_id: outcome.device.management_id.to_string(),
                device_name: outcome.device.display_name.clone(),
                current_primary_user: outcome
                    .current_primary_user
                    .clone()
                    .unwrap_or_else(|| NO_PRIMARY_USER.to_string()),
                target_user: outcome
                    .target_user
                    .as_ref()
                    .map_or_else(|_| FAILED_TARGET.to_string(), Clone::clone),
                modified: if outcome.was_modified { "Yes" } else { "No" },
                message: outcome.message.clone().unwrap_or_default(),
            },
            ReportEntry::Unresolved(failure) => Self {
                managed_device_id: failure.management_id.clone().unwrap_or_default(),
                device_name: failure.display_name.clone(),
                current_primary_user: NO_PRIMARY_USER.to_string(),
                target_user: FAILED_TARGET.to_string(),
                modified: "No",
                message: failure.message.clone(),
            },
        }
    }
}

// ============================================================================
// SECTION: Report Sink
// ============================================================================

/// Append-only destination for report entries.
pub trait ReportSink {
    /// Appends one entry after all previously appended entries.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the entry cannot be recorded.
    fn append(&mut self, entry: ReportEntry) -> Result<(), ReportError>;
}

/// In-memory report accumulator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeReport {
    /// Entries in append order.
    entries: Vec<ReportEntry>,
}

impl OutcomeReport {
    /// Creates an empty report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns the entries appended so far.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Returns outcome counters for the appended entries.
    #[must_use]
    pub fn summary(&self) -> RunSummary {
        RunSummary::from_entries(&self.entries)
    }

    /// Consumes the report and returns its entries in append order.
    #[must_use]
    pub fn finalize(self) -> Vec<ReportEntry> {
        self.entries
    }
}

impl ReportSink for OutcomeReport {
    fn append(&mut self, entry: ReportEntry) -> Result<(), ReportError> {
        self.entries.push(entry);
        Ok(())
    }
}

// ============================================================================
// SECTION: CSV Writer
// ============================================================================

/// Streaming CSV report writer.
///
/// # Invariants
/// - The header row is written and flushed on construction.
/// - Each appended row is flushed before `append` returns.
pub struct CsvReportWriter<W: Write> {
    /// Underlying CSV writer.
    writer: csv::Writer<W>,
    /// Rows written after the header.
    rows_written: usize,
}

impl<W: Write> CsvReportWriter<W> {
    /// Wraps a writer and emits the header row.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the header cannot be written.
    pub fn new(inner: W) -> Result<Self, ReportError> {
        let mut writer = WriterBuilder::new().has_headers(false).from_writer(inner);
        writer.write_record(REPORT_HEADER).map_err(|err| ReportError::Write(err.to_string()))?;
        writer.flush().map_err(|err| ReportError::Write(err.to_string()))?;
        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Returns the number of rows written after the header.
    #[must_use]
    pub const fn rows_written(&self) -> usize {
        self.rows_written
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError`] when the final flush fails.
    pub fn finalize(self) -> Result<W, ReportError> {
        self.writer.into_inner().map_err(|err| ReportError::Write(err.error().to_string()))
    }
}

impl<W: Write> ReportSink for CsvReportWriter<W> {
    fn append(&mut self, entry: ReportEntry) -> Result<(), ReportError> {
        let row = ReportRow::from(&entry);
        self.writer.serialize(&row).map_err(|err| ReportError::Write(err.to_string()))?;
        self.writer.flush().map_err(|err| ReportError::Write(err.to_string()))?;
        self.rows_written += 1;
        Ok(())
    }
}

// ============================================================================
// SECTION: Report Files
// ============================================================================

/// Returns the timestamp-derived report file name.
#[must_use]
pub fn report_file_name(prefix: &str, at: OffsetDateTime) -> String {
    format!(
        "{prefix}-{:04}{:02}{:02}-{:02}{:02}{:02}.csv",
        at.year(),
        u8::from(at.month()),
        at.day(),
        at.hour(),
        at.minute(),
        at.second()
    )
}

/// Creates a fresh report file and writes its header.
///
/// The file must not already exist; reports are never appended across runs.
///
/// # Errors
///
/// Returns [`ReportError`] when the file exists or cannot be created.
pub fn create_report_file(
    dir: &Path,
    prefix: &str,
    at: OffsetDateTime,
) -> Result<(PathBuf, CsvReportWriter<File>), ReportError> {
    let path = dir.join(report_file_name(prefix, at));
    let file = OpenOptions::new().write(true).create_new(true).open(&path).map_err(|err| {
        ReportError::Create {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    })?;
    let writer = CsvReportWriter::new(file)?;
    Ok((path, writer))
}
