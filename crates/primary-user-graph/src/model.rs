// crates/primary-user-graph/src/model.rs
// ============================================================================
// Module: Graph Wire Model
// Description: Serde mirrors of the REST resources the collaborators read.
// Purpose: Keep wire field names out of the core domain types.
// Dependencies: primary-user-core, serde, time
// ============================================================================

//! ## Overview
//! Only the fields a run needs are modeled; everything else in a response is
//! ignored. Conversions into core types live next to each resource.

// ============================================================================
// SECTION: Imports
// ============================================================================

use primary_user_core::DirectoryId;
use primary_user_core::DirectoryUser;
use primary_user_core::GroupMember;
use primary_user_core::ManagedDeviceInfo;
use primary_user_core::ManagementId;
use primary_user_core::SignInEvent;
use primary_user_core::UserId;
use serde::Deserialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

// ============================================================================
// SECTION: Collections
// ============================================================================

/// One page of a collection response.
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    /// Absolute URL of the next page, when more items remain.
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

/// Error envelope returned with non-success statuses.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    /// Error detail.
    pub error: ErrorDetail,
}

/// Error detail inside [`ErrorEnvelope`].
#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    #[serde(default)]
    pub code: Option<String>,
    /// Human-readable message.
    #[serde(default)]
    pub message: Option<String>,
}

// ============================================================================
// SECTION: Users
// ============================================================================

/// Directory user resource.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResource {
    /// Object identifier.
    pub id: String,
    /// Principal name.
    #[serde(default)]
    pub user_principal_name: Option<String>,
}

impl UserResource {
    /// Converts to a core user, falling back to the looked-up principal.
    #[must_use]
    pub fn into_directory_user(self, requested: &str) -> DirectoryUser {
        DirectoryUser {
            id: UserId::new(self.id),
            principal: self.user_principal_name.unwrap_or_else(|| requested.to_string()),
        }
    }
}

// ============================================================================
// SECTION: Devices
// ============================================================================

/// Managed device resource.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedDeviceResource {
    /// Management identifier.
    pub id: String,
    /// Directory device identifier.
    #[serde(rename = "azureADDeviceId", default)]
    pub azure_ad_device_id: Option<String>,
    /// Device name.
    #[serde(default)]
    pub device_name: Option<String>,
}

impl ManagedDeviceResource {
    /// Converts to a core snapshot; `None` when the id is blank.
    ///
    /// The service reports unregistered devices with a blank or all-zero
    /// directory identifier; both map to `None`.
    #[must_use]
    pub fn into_info(self) -> Option<ManagedDeviceInfo> {
        let management_id = ManagementId::from_raw(&self.id)?;
        let directory_id = self
            .azure_ad_device_id
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty() && id != NIL_GUID)
            .map(DirectoryId::new);
        Some(ManagedDeviceInfo {
            management_id,
            directory_id,
            display_name: self.device_name.unwrap_or_default(),
        })
    }
}

/// Directory identifier the service reports for unregistered devices.
const NIL_GUID: &str = "00000000-0000-0000-0000-000000000000";

/// Directory group resource.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupResource {
    /// Object identifier.
    pub id: String,
}

/// Device-typed group member resource.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceMemberResource {
    /// Directory device identifier.
    #[serde(default)]
    pub device_id: Option<String>,
    /// Member display name.
    #[serde(default)]
    pub display_name: Option<String>,
}

impl DeviceMemberResource {
    /// Converts to a core member; `None` when the device id is missing.
    #[must_use]
    pub fn into_member(self) -> Option<GroupMember> {
        let device_id = self.device_id.map(|id| id.trim().to_string()).filter(|id| !id.is_empty())?;
        Some(GroupMember {
            directory_id: DirectoryId::new(device_id),
            display_name: self.display_name.unwrap_or_default(),
        })
    }
}

// ============================================================================
// SECTION: Sign-Ins
// ============================================================================

/// Sign-in audit record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInResource {
    /// Principal that signed in.
    #[serde(default)]
    pub user_principal_name: Option<String>,
    /// Sign-in time (RFC 3339).
    #[serde(default)]
    pub created_date_time: Option<String>,
    /// Device the sign-in occurred on.
    #[serde(default)]
    pub device_detail: Option<DeviceDetail>,
}

/// Device detail attached to a sign-in record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDetail {
    /// Directory device identifier.
    #[serde(default)]
    pub device_id: Option<String>,
}

impl SignInResource {
    /// Converts to a core event; `None` when no device is attached.
    ///
    /// Unparseable timestamps are dropped rather than failing the record.
    #[must_use]
    pub fn into_event(self) -> Option<SignInEvent> {
        let device_id = self
            .device_detail
            .and_then(|detail| detail.device_id)
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())?;
        let mut event = SignInEvent::new(DirectoryId::new(device_id), self.user_principal_name);
        event.timestamp = self
            .created_date_time
            .and_then(|raw| OffsetDateTime::parse(&raw, &Rfc3339).ok());
        Some(event)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
