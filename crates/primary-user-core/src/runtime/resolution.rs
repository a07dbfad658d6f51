// crates/primary-user-core/src/runtime/resolution.rs
// ============================================================================
// Module: Device Resolution Adapter
// Description: Normalizes group members and input rows into device records.
// Purpose: Produce the de-duplicated working set for a reconciliation run.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Devices enter a run either as directory group members (keyed by directory
//! identifier) or as input rows (keyed by management identifier). Both are
//! resolved against the device-management store so every [`DeviceRecord`]
//! carries both identifiers. Resolution is best effort: entries that cannot be
//! resolved become [`ResolutionFailure`] rows and are excluded from
//! reconciliation; they never abort the run.
//!
//! The working set is de-duplicated by management identifier, keeping the
//! first occurrence.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use crate::core::DeviceInputRow;
use crate::core::DeviceRecord;
use crate::core::DirectoryId;
use crate::core::GroupMember;
use crate::core::ManagementId;
use crate::core::ResolutionFailure;
use crate::interfaces::DeviceManagementStore;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Output of a resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedDevices {
    /// Devices ready for reconciliation, unique by management identifier.
    pub devices: Vec<DeviceRecord>,
    /// Entries that could not be resolved, in input order.
    pub failures: Vec<ResolutionFailure>,
}

impl ResolvedDevices {
    /// Returns the total number of report entries the set will produce.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.devices.len() + self.failures.len()
    }

    /// Adds a device unless its management identifier was already seen.
    fn push_device(&mut self, seen: &mut BTreeSet<ManagementId>, device: DeviceRecord) {
        if seen.insert(device.management_id.clone()) {
            self.devices.push(device);
        }
    }
}

// ============================================================================
// SECTION: Group Membership
// ============================================================================

/// Resolves device-typed group members to managed devices.
///
/// Members repeated by directory identifier are processed once.
pub fn resolve_group_members<M>(members: Vec<GroupMember>, management: &M) -> ResolvedDevices
where
    M: DeviceManagementStore + ?Sized,
{
    let mut resolved = ResolvedDevices::default();
    let mut seen_directory: BTreeSet<DirectoryId> = BTreeSet::new();
    let mut seen_management: BTreeSet<ManagementId> = BTreeSet::new();
    for member in members {
        if !seen_directory.insert(member.directory_id.clone()) {
            continue;
        }
        match management.get_by_directory_id(&member.directory_id) {
            Ok(Some(info)) => {
                let display_name = if member.display_name.trim().is_empty() {
                    info.display_name
                } else {
                    member.display_name
                };
                let device = DeviceRecord::new(info.management_id, member.directory_id, display_name);
                resolved.push_device(&mut seen_management, device);
            }
            Ok(None) => resolved.failures.push(ResolutionFailure::member_not_managed(
                member.directory_id.as_str(),
                member.display_name,
            )),
            Err(err) => resolved.failures.push(ResolutionFailure::member_lookup_failed(
                member.directory_id.as_str(),
                member.display_name,
                err.to_string(),
            )),
        }
    }
    resolved
}

// ============================================================================
// SECTION: Input Rows
// ============================================================================

/// Resolves input rows, keyed by management identifier, to managed devices.
///
/// Managed devices without a directory identifier cannot be correlated with
/// sign-in telemetry and are reported as resolution failures.
pub fn resolve_input_rows<M>(rows: Vec<DeviceInputRow>, management: &M) -> ResolvedDevices
where
    M: DeviceManagementStore + ?Sized,
{
    let mut resolved = ResolvedDevices::default();
    let mut seen_management: BTreeSet<ManagementId> = BTreeSet::new();
    for row in rows {
        if seen_management.contains(&row.management_id) {
            continue;
        }
        match management.get_by_management_id(&row.management_id) {
            Ok(Some(info)) => {
                let Some(directory_id) = info.directory_id else {
                    resolved.failures.push(ResolutionFailure::lookup_failed(
                        row.management_id.as_str(),
                        row.display_name,
                        "no directory identifier",
                    ));
                    continue;
                };
                let device = DeviceRecord::new(row.management_id, directory_id, row.display_name);
                resolved.push_device(&mut seen_management, device);
            }
            Ok(None) => resolved.failures.push(ResolutionFailure::not_managed(
                row.management_id.as_str(),
                row.display_name,
            )),
            Err(err) => resolved.failures.push(ResolutionFailure::lookup_failed(
                row.management_id.as_str(),
                row.display_name,
                err.to_string(),
            )),
        }
    }
    resolved
}
