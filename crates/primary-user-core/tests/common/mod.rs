// crates/primary-user-core/tests/common/mod.rs
// =============================================================================
// Module: Core Test Helpers
// Description: Recording fake collaborators and event builders.
// Purpose: Reduce duplication across integration tests for primary-user-core.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use std::cell::Cell;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

use primary_user_core::DeviceManagementStore;
use primary_user_core::DeviceRecord;
use primary_user_core::DirectoryId;
use primary_user_core::DirectoryUser;
use primary_user_core::ManagedDeviceInfo;
use primary_user_core::ManagementId;
use primary_user_core::RemoteError;
use primary_user_core::SignInEvent;
use primary_user_core::UserDirectory;
use primary_user_core::UserId;

// ============================================================================
// SECTION: Builders
// ============================================================================

/// Builds a management identifier, panicking on blank input.
pub fn mid(raw: &str) -> ManagementId {
    ManagementId::from_raw(raw).unwrap()
}

/// Builds a device record whose directory id is `dir-<suffix>`.
pub fn device(suffix: &str) -> DeviceRecord {
    DeviceRecord::new(
        mid(&format!("mgmt-{suffix}")),
        DirectoryId::new(format!("dir-{suffix}")),
        format!("PC-{suffix}"),
    )
}

/// Builds a sign-in event.
pub fn signin(device_id: &str, principal: &str) -> SignInEvent {
    SignInEvent::new(DirectoryId::new(device_id), Some(principal.to_string()))
}

/// Repeats a sign-in event `count` times.
pub fn signins(device_id: &str, principal: &str, count: usize) -> Vec<SignInEvent> {
    (0..count).map(|_| signin(device_id, principal)).collect()
}

/// Returns the directory user id used by [`FakeDirectory`] for a principal.
pub fn user_id_for(principal: &str) -> UserId {
    UserId::new(format!("id:{}", principal.to_ascii_lowercase()))
}

// ============================================================================
// SECTION: Fake Directory
// ============================================================================

/// In-memory user directory that counts lookups.
#[derive(Default)]
pub struct FakeDirectory {
    /// Users keyed by lowercase principal.
    users: BTreeMap<String, DirectoryUser>,
    /// When set, every lookup fails with this message.
    failure: Option<String>,
    /// Number of lookups performed.
    pub lookups: Cell<usize>,
}

impl FakeDirectory {
    /// Creates a directory containing the given principals.
    pub fn with_users(principals: &[&str]) -> Self {
        let users = principals
            .iter()
            .map(|principal| {
                (
                    principal.to_ascii_lowercase(),
                    DirectoryUser {
                        id: user_id_for(principal),
                        principal: (*principal).to_string(),
                    },
                )
            })
            .collect();
        Self {
            users,
            failure: None,
            lookups: Cell::new(0),
        }
    }

    /// Creates a directory whose lookups always fail.
    pub fn failing(message: &str) -> Self {
        Self {
            users: BTreeMap::new(),
            failure: Some(message.to_string()),
            lookups: Cell::new(0),
        }
    }
}

impl UserDirectory for FakeDirectory {
    fn lookup_by_principal(&self, principal: &str) -> Result<Option<DirectoryUser>, RemoteError> {
        self.lookups.set(self.lookups.get() + 1);
        if let Some(message) = &self.failure {
            return Err(RemoteError::Transport(message.clone()));
        }
        Ok(self.users.get(&principal.to_ascii_lowercase()).cloned())
    }
}

// ============================================================================
// SECTION: Fake Management Store
// ============================================================================

/// In-memory device-management store that records every call.
#[derive(Default)]
pub struct FakeManagement {
    /// Managed devices known to the store.
    devices: Vec<ManagedDeviceInfo>,
    /// Current primary user id per management id.
    primary: RefCell<BTreeMap<ManagementId, UserId>>,
    /// Principal spellings per user id; unknown ids read back lowercased.
    principals: BTreeMap<UserId, String>,
    /// Management ids whose writes are rejected.
    reject_writes: BTreeSet<ManagementId>,
    /// Management ids whose reads fail.
    fail_reads: BTreeSet<ManagementId>,
    /// Management ids whose lookups fail.
    fail_lookups: BTreeSet<String>,
    /// Number of primary user reads.
    pub primary_reads: Cell<usize>,
    /// Number of device lookups (either namespace).
    pub device_lookups: Cell<usize>,
    /// Writes issued, in order.
    pub writes: RefCell<Vec<(ManagementId, UserId)>>,
}

impl FakeManagement {
    /// Creates a store managing the given device records.
    pub fn with_devices(devices: &[DeviceRecord]) -> Self {
        let devices = devices
            .iter()
            .map(|device| ManagedDeviceInfo {
                management_id: device.management_id.clone(),
                directory_id: Some(device.directory_id.clone()),
                display_name: device.display_name.clone(),
            })
            .collect();
        Self {
            devices,
            ..Self::default()
        }
    }

    /// Adds a managed device snapshot.
    pub fn add_device(&mut self, info: ManagedDeviceInfo) {
        self.devices.push(info);
    }

    /// Records the current primary user of a device.
    pub fn assign(&mut self, id: &ManagementId, principal: &str) {
        let user_id = user_id_for(principal);
        self.principals.insert(user_id.clone(), principal.to_string());
        self.primary.borrow_mut().insert(id.clone(), user_id);
    }

    /// Rejects writes for the device.
    pub fn reject_writes_for(&mut self, id: &ManagementId) {
        self.reject_writes.insert(id.clone());
    }

    /// Fails primary user reads for the device.
    pub fn fail_reads_for(&mut self, id: &ManagementId) {
        self.fail_reads.insert(id.clone());
    }

    /// Fails device lookups for an identifier in either namespace.
    pub fn fail_lookups_for(&mut self, raw_id: &str) {
        self.fail_lookups.insert(raw_id.to_string());
    }

    /// Returns the number of writes issued.
    pub fn write_count(&self) -> usize {
        self.writes.borrow().len()
    }

    /// Increments the lookup counter and applies configured failures.
    fn lookup(&self, raw_id: &str) -> Result<(), RemoteError> {
        self.device_lookups.set(self.device_lookups.get() + 1);
        if self.fail_lookups.contains(raw_id) {
            return Err(RemoteError::Transport("lookup timed out".to_string()));
        }
        Ok(())
    }
}

impl DeviceManagementStore for FakeManagement {
    fn get_by_management_id(
        &self,
        id: &ManagementId,
    ) -> Result<Option<ManagedDeviceInfo>, RemoteError> {
        self.lookup(id.as_str())?;
        Ok(self.devices.iter().find(|info| &info.management_id == id).cloned())
    }

    fn get_by_directory_id(
        &self,
        id: &DirectoryId,
    ) -> Result<Option<ManagedDeviceInfo>, RemoteError> {
        self.lookup(id.as_str())?;
        Ok(self.devices.iter().find(|info| info.directory_id.as_ref() == Some(id)).cloned())
    }

    fn get_primary_user(&self, id: &ManagementId) -> Result<Option<String>, RemoteError> {
        self.primary_reads.set(self.primary_reads.get() + 1);
        if self.fail_reads.contains(id) {
            return Err(RemoteError::Rejected {
                status: 503,
                message: "service unavailable".to_string(),
            });
        }
        Ok(self.primary.borrow().get(id).map(|user_id| {
            self.principals
                .get(user_id)
                .cloned()
                .unwrap_or_else(|| user_id.as_str().trim_start_matches("id:").to_string())
        }))
    }

    fn set_primary_user(&self, id: &ManagementId, user: &UserId) -> Result<(), RemoteError> {
        self.writes.borrow_mut().push((id.clone(), user.clone()));
        if self.reject_writes.contains(id) {
            return Err(RemoteError::Rejected {
                status: 400,
                message: "primary user is not supported for this device".to_string(),
            });
        }
        self.primary.borrow_mut().insert(id.clone(), user.clone());
        Ok(())
    }
}
