// crates/primary-user-core/src/core/mod.rs
// ============================================================================
// Module: Primary User Sync Core Types
// Description: Identifiers, device records, sign-in events, and outcomes.
// Purpose: Provide the data model shared by the runtime and collaborators.
// Dependencies: serde, time
// ============================================================================

//! ## Overview
//! Core types describe the devices in a run, the sign-in telemetry used to
//! choose their primary user, and the per-device outcomes written to the
//! report. All types are immutable once constructed.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod device;
pub mod identifiers;
pub mod outcome;
pub mod signin;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use device::DeviceInputRow;
pub use device::DeviceRecord;
pub use device::DirectoryUser;
pub use device::GroupMember;
pub use device::ManagedDeviceInfo;
pub use identifiers::DirectoryId;
pub use identifiers::ManagementId;
pub use identifiers::UserId;
pub use identifiers::principals_match;
pub use outcome::OutcomeKind;
pub use outcome::ReconciliationOutcome;
pub use outcome::ReportEntry;
pub use outcome::ResolutionFailure;
pub use outcome::RunSummary;
pub use outcome::TargetFailure;
pub use signin::SignInEvent;
