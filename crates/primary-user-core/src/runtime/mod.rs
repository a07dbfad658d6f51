// crates/primary-user-core/src/runtime/mod.rs
// ============================================================================
// Module: Primary User Sync Runtime
// Description: Aggregation, resolution, reconciliation, and reporting.
// Purpose: Execute a reconciliation run against collaborator interfaces.
// Dependencies: crate::{audit, core, interfaces}, csv, time
// ============================================================================

//! ## Overview
//! Runtime modules implement the run pipeline: input parsing and device
//! resolution produce the working set, the sign-in index is built once from
//! the full telemetry window, and the reconciler emits one report entry per
//! device in processing order.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod aggregate;
pub mod input;
pub mod reconcile;
pub mod report;
pub mod resolution;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use aggregate::SignInIndex;
pub use aggregate::most_frequent_user;
pub use input::INPUT_HEADER;
pub use input::InputError;
pub use input::parse_device_input;
pub use input::read_device_input;
pub use reconcile::ReconcileConfig;
pub use reconcile::Reconciler;
pub use report::CsvReportWriter;
pub use report::OutcomeReport;
pub use report::REPORT_HEADER;
pub use report::ReportError;
pub use report::ReportRow;
pub use report::ReportSink;
pub use report::create_report_file;
pub use report::report_file_name;
pub use resolution::ResolvedDevices;
pub use resolution::resolve_group_members;
pub use resolution::resolve_input_rows;
