// crates/primary-user-core/src/core/device.rs
// ============================================================================
// Module: Device and Directory Records
// Description: Canonical device records and collaborator-facing snapshots.
// Purpose: Describe the working set of devices and directory lookups.
// Dependencies: crate::core::identifiers, serde
// ============================================================================

//! ## Overview
//! [`DeviceRecord`] is the canonical, immutable description of a device in the
//! working set. It is produced by the resolution adapter from either a group
//! membership pass or tabular input, and carries both identifier namespaces.
//! The remaining types are snapshots returned by collaborators.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;

use crate::core::identifiers::DirectoryId;
use crate::core::identifiers::ManagementId;
use crate::core::identifiers::UserId;

// ============================================================================
// SECTION: Canonical Device Record
// ============================================================================

/// Canonical device record passed to the reconciliation engine.
///
/// # Invariants
/// - `management_id` is non-empty (guaranteed by [`ManagementId`]).
/// - `directory_id` is used only for telemetry correlation.
/// - `display_name` is used only for reporting, never for matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRecord {
    /// Identifier in the device-management system.
    pub management_id: ManagementId,
    /// Identifier in the identity directory.
    pub directory_id: DirectoryId,
    /// Human-readable device name.
    pub display_name: String,
}

impl DeviceRecord {
    /// Creates a device record.
    #[must_use]
    pub fn new(
        management_id: ManagementId,
        directory_id: DirectoryId,
        display_name: impl Into<String>,
    ) -> Self {
        Self {
            management_id,
            directory_id,
            display_name: display_name.into(),
        }
    }
}

// ============================================================================
// SECTION: Collaborator Snapshots
// ============================================================================

/// Managed device snapshot returned by the device-management store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedDeviceInfo {
    /// Identifier in the device-management system.
    pub management_id: ManagementId,
    /// Directory identifier, absent for devices not registered in the directory.
    pub directory_id: Option<DirectoryId>,
    /// Device name as recorded by the management system.
    pub display_name: String,
}

/// Device-typed member of a directory group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupMember {
    /// Directory identifier of the member device.
    pub directory_id: DirectoryId,
    /// Member display name.
    pub display_name: String,
}

/// User resolved from the identity directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    /// Directory object identifier used for write calls.
    pub id: UserId,
    /// Canonical principal name.
    pub principal: String,
}

/// Row parsed from a device input file.
///
/// # Invariants
/// - `management_id` is the management-system identifier declared by the
///   input header contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInputRow {
    /// Identifier in the device-management system.
    pub management_id: ManagementId,
    /// Human-readable name from the input file.
    pub display_name: String,
}
