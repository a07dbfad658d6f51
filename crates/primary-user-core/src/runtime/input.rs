// crates/primary-user-core/src/runtime/input.rs
// ============================================================================
// Module: Device Input Parsing
// Description: Schema-checked parsing of tabular device input files.
// Purpose: Reject malformed input before any device is processed.
// Dependencies: crate::core, csv, thiserror
// ============================================================================

//! ## Overview
//! Input files are CSV with exactly two columns in a fixed order:
//! `DeviceId,DeviceName`. `DeviceId` carries the management-system
//! identifier. Any deviation (missing, extra, renamed, or swapped columns), a
//! blank identifier, or a repeated identifier is a fatal [`InputError`]; the
//! file is validated in full before a single row is returned.
//!
//! Header names must match exactly, without surrounding whitespace. Data
//! fields are trimmed, and identifiers repeat when they differ only in ASCII
//! case.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use csv::StringRecord;
use csv::Trim;
use thiserror::Error;

use crate::core::DeviceInputRow;
use crate::core::ManagementId;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Required input header, in order.
pub const INPUT_HEADER: [&str; 2] = ["DeviceId", "DeviceName"];

/// Byte order mark some spreadsheet tools prepend to CSV exports.
const UTF8_BOM: char = '\u{feff}';

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Input validation errors. All variants are run-aborting.
#[derive(Debug, Error)]
pub enum InputError {
    /// The input could not be read.
    #[error("input io error: {0}")]
    Io(String),
    /// The header does not match [`INPUT_HEADER`].
    #[error("invalid input header: expected \"{expected}\", found \"{found}\"")]
    Header {
        /// Expected header line.
        expected: String,
        /// Header line found in the input.
        found: String,
    },
    /// A data row is malformed.
    #[error("invalid input row {line}: {message}")]
    Row {
        /// One-based line number in the input.
        line: u64,
        /// Problem description.
        message: String,
    },
    /// The same identifier appears on more than one row.
    #[error("duplicate device identifier {id} on lines {first_line} and {line}")]
    Duplicate {
        /// Repeated identifier.
        id: String,
        /// Line of the first occurrence.
        first_line: u64,
        /// Line of the repeat.
        line: u64,
    },
}

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Reads and validates a device input file.
///
/// # Errors
///
/// Returns [`InputError`] when the file cannot be opened or fails validation.
pub fn read_device_input(path: &Path) -> Result<Vec<DeviceInputRow>, InputError> {
    let file = File::open(path)
        .map_err(|err| InputError::Io(format!("{}: {err}", path.display())))?;
    parse_device_input(file)
}

/// Parses and validates device input from a reader.
///
/// # Errors
///
/// Returns [`InputError`] when the header, any row, or identifier uniqueness
/// fails validation.
pub fn parse_device_input<R: Read>(reader: R) -> Result<Vec<DeviceInputRow>, InputError> {
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Fields)
        .from_reader(reader);
    let headers = csv_reader.headers().map_err(|err| InputError::Io(err.to_string()))?.clone();
    validate_header(&headers)?;

    let mut rows = Vec::new();
    let mut first_seen: BTreeMap<String, u64> = BTreeMap::new();
    for record in csv_reader.records() {
        let record = record.map_err(|err| InputError::Io(err.to_string()))?;
        let line = record.position().map_or(0, csv::Position::line);
        if record.len() != INPUT_HEADER.len() {
            return Err(InputError::Row {
                line,
                message: format!(
                    "expected {} fields, found {}",
                    INPUT_HEADER.len(),
                    record.len()
                ),
            });
        }
        let raw_id = record.get(0).unwrap_or_default();
        let management_id = ManagementId::from_raw(raw_id).ok_or_else(|| InputError::Row {
            line,
            message: "device identifier is empty".to_string(),
        })?;
        let key = management_id.as_str().to_ascii_lowercase();
        if let Some(first_line) = first_seen.get(&key) {
            return Err(InputError::Duplicate {
                id: management_id.to_string(),
                first_line: *first_line,
                line,
            });
        }
        first_seen.insert(key, line);
        rows.push(DeviceInputRow {
            management_id,
            display_name: record.get(1).unwrap_or_default().to_string(),
        });
    }
    Ok(rows)
}

/// Checks the header record against [`INPUT_HEADER`].
fn validate_header(headers: &StringRecord) -> Result<(), InputError> {
    let found: Vec<&str> = headers
        .iter()
        .enumerate()
        .map(|(index, field)| if index == 0 { field.trim_start_matches(UTF8_BOM) } else { field })
        .collect();
    if found == INPUT_HEADER {
        return Ok(());
    }
    Err(InputError::Header {
        expected: INPUT_HEADER.join(","),
        found: found.join(","),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
