// crates/primary-user-core/src/interfaces/mod.rs
// ============================================================================
// Module: Primary User Sync Interfaces
// Description: Collaborator contracts for directory, management, and telemetry.
// Purpose: Keep the reconciliation core independent of any REST backend.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! The reconciliation core consumes four collaborators: a user directory, a
//! device-management store, a group directory, and a sign-in telemetry
//! source. They are black boxes to the core. Absence is expressed as
//! `Ok(None)`; `Err` is reserved for transport or protocol failures, which the
//! core records per device instead of aborting the run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::DirectoryId;
use crate::core::DirectoryUser;
use crate::core::GroupMember;
use crate::core::ManagedDeviceInfo;
use crate::core::ManagementId;
use crate::core::SignInEvent;
use crate::core::UserId;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors reported by remote collaborators.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
/// - Display text is captured verbatim into report diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The request could not be completed.
    #[error("transport error: {0}")]
    Transport(String),
    /// The remote service rejected the request.
    #[error("request rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Error text reported by the service.
        message: String,
    },
    /// The remote response could not be interpreted.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Errors reported while resolving group membership.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    /// No group with the requested name exists.
    #[error("group not found: {0}")]
    NotFound(String),
    /// The group lookup failed.
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

// ============================================================================
// SECTION: Collaborators
// ============================================================================

/// Identity directory lookups.
pub trait UserDirectory {
    /// Looks up a user by principal name.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the lookup cannot be completed.
    fn lookup_by_principal(&self, principal: &str) -> Result<Option<DirectoryUser>, RemoteError>;
}

/// Device-management store reads and writes.
pub trait DeviceManagementStore {
    /// Fetches a managed device by its management identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the lookup cannot be completed.
    fn get_by_management_id(
        &self,
        id: &ManagementId,
    ) -> Result<Option<ManagedDeviceInfo>, RemoteError>;

    /// Fetches a managed device by its directory identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the lookup cannot be completed.
    fn get_by_directory_id(
        &self,
        id: &DirectoryId,
    ) -> Result<Option<ManagedDeviceInfo>, RemoteError>;

    /// Returns the principal currently recorded as primary user.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the lookup cannot be completed.
    fn get_primary_user(&self, id: &ManagementId) -> Result<Option<String>, RemoteError>;

    /// Sets the primary user of a device. Called at most once per device per run.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the service rejects the change.
    fn set_primary_user(&self, id: &ManagementId, user: &UserId) -> Result<(), RemoteError>;
}

/// Directory group membership resolution.
pub trait GroupDirectory {
    /// Returns the device-typed members of the named group.
    ///
    /// # Errors
    ///
    /// Returns [`GroupError::NotFound`] when the group does not exist.
    fn resolve_device_members(&self, group_name: &str) -> Result<Vec<GroupMember>, GroupError>;
}

/// Bulk sign-in telemetry retrieval.
pub trait SignInTelemetrySource {
    /// Fetches every sign-in event in the trailing window, optionally filtered
    /// by application name.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError`] when the telemetry cannot be fetched.
    fn fetch_window(
        &self,
        app_filter: Option<&str>,
        window_days: u32,
    ) -> Result<Vec<SignInEvent>, RemoteError>;
}
