// crates/primary-user-graph/src/collaborators.rs
// ============================================================================
// Module: Graph Collaborators
// Description: Core collaborator traits implemented over the REST API.
// Purpose: Map each collaborator operation onto its resource endpoints.
// Dependencies: primary-user-core, serde_json, time
// ============================================================================

//! ## Overview
//! Each collaborator operation is one resource request, or one paged
//! collection walk, against the client's base URL:
//! - users are looked up by principal name; `404 Not Found` means absent
//! - managed devices are read by management id or filtered by directory id
//! - the primary user is the first named entry of the device's user list and
//!   is replaced by posting a user reference
//! - group members are the device-typed members of the one group whose
//!   display name matches
//! - sign-ins are filtered by window start and optional application
//!
//! String values reach filters only through [`eq_filter`], never by
//! interpolation.

// ============================================================================
// SECTION: Imports
// ============================================================================

use primary_user_core::DeviceManagementStore;
use primary_user_core::DirectoryId;
use primary_user_core::DirectoryUser;
use primary_user_core::GroupDirectory;
use primary_user_core::GroupError;
use primary_user_core::GroupMember;
use primary_user_core::ManagedDeviceInfo;
use primary_user_core::ManagementId;
use primary_user_core::RemoteError;
use primary_user_core::SignInEvent;
use primary_user_core::SignInTelemetrySource;
use primary_user_core::UserDirectory;
use primary_user_core::UserId;
use serde_json::json;
use time::OffsetDateTime;

use crate::client::GraphClient;
use crate::model::DeviceMemberResource;
use crate::model::GroupResource;
use crate::model::ManagedDeviceResource;
use crate::model::Page;
use crate::model::SignInResource;
use crate::model::UserResource;
use crate::odata::eq_filter;
use crate::odata::signin_filter;
use crate::odata::window_start;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Managed device fields read by every device lookup.
const DEVICE_SELECT: &str = "id,azureADDeviceId,deviceName";
/// User fields read by principal lookups and primary user reads.
const USER_SELECT: &str = "id,userPrincipalName";

// ============================================================================
// SECTION: Directory
// ============================================================================

impl UserDirectory for GraphClient {
    fn lookup_by_principal(&self, principal: &str) -> Result<Option<DirectoryUser>, RemoteError> {
        let url = self.endpoint_with_query(&["users", principal], &[("$select", USER_SELECT)])?;
        let user: Option<UserResource> = self.get_optional(url)?;
        Ok(user.map(|user| user.into_directory_user(principal)))
    }
}

impl GroupDirectory for GraphClient {
    fn resolve_device_members(&self, group_name: &str) -> Result<Vec<GroupMember>, GroupError> {
        let filter = eq_filter("displayName", group_name);
        let url = self
            .endpoint_with_query(&["groups"], &[("$filter", filter.as_str()), ("$select", "id")])?;
        let page: Page<GroupResource> = self.get_json(url)?;
        let group = page
            .value
            .into_iter()
            .next()
            .ok_or_else(|| GroupError::NotFound(group_name.to_string()))?;
        let url = self.endpoint_with_query(
            &["groups", group.id.as_str(), "members", "microsoft.graph.device"],
            &[("$select", "deviceId,displayName")],
        )?;
        let members: Vec<DeviceMemberResource> = self.get_collection(url)?;
        Ok(members.into_iter().filter_map(DeviceMemberResource::into_member).collect())
    }
}

// ============================================================================
// SECTION: Device Management
// ============================================================================

impl DeviceManagementStore for GraphClient {
    fn get_by_management_id(
        &self,
        id: &ManagementId,
    ) -> Result<Option<ManagedDeviceInfo>, RemoteError> {
        let url = self.endpoint_with_query(
            &["deviceManagement", "managedDevices", id.as_str()],
            &[("$select", DEVICE_SELECT)],
        )?;
        let device: Option<ManagedDeviceResource> = self.get_optional(url)?;
        Ok(device.and_then(ManagedDeviceResource::into_info))
    }

    fn get_by_directory_id(
        &self,
        id: &DirectoryId,
    ) -> Result<Option<ManagedDeviceInfo>, RemoteError> {
        let filter = eq_filter("azureADDeviceId", id.as_str());
        let url = self.endpoint_with_query(
            &["deviceManagement", "managedDevices"],
            &[("$filter", filter.as_str()), ("$select", DEVICE_SELECT)],
        )?;
        let page: Page<ManagedDeviceResource> = self.get_json(url)?;
        Ok(page.value.into_iter().find_map(ManagedDeviceResource::into_info))
    }

    fn get_primary_user(&self, id: &ManagementId) -> Result<Option<String>, RemoteError> {
        let url = self.endpoint_with_query(
            &["deviceManagement", "managedDevices", id.as_str(), "users"],
            &[("$select", USER_SELECT)],
        )?;
        let page: Page<UserResource> = self.get_json(url)?;
        Ok(page
            .value
            .into_iter()
            .find_map(|user| user.user_principal_name.filter(|name| !name.trim().is_empty())))
    }

    fn set_primary_user(&self, id: &ManagementId, user: &UserId) -> Result<(), RemoteError> {
        let device_segment = format!("managedDevices('{}')", id.as_str().replace('\'', "''"));
        let url = self.endpoint(&["deviceManagement", device_segment.as_str(), "users", "$ref"])?;
        let reference = format!("{}/users/{}", self.base_url(), user.as_str());
        self.post_json(url, &json!({ "@odata.id": reference }))
    }
}

// ============================================================================
// SECTION: Sign-In Telemetry
// ============================================================================

impl SignInTelemetrySource for GraphClient {
    fn fetch_window(
        &self,
        app_filter: Option<&str>,
        window_days: u32,
    ) -> Result<Vec<SignInEvent>, RemoteError> {
        let since = window_start(OffsetDateTime::now_utc(), window_days);
        let filter = signin_filter(since, app_filter);
        let url =
            self.endpoint_with_query(&["auditLogs", "signIns"], &[("$filter", filter.as_str())])?;
        let records: Vec<SignInResource> = self.get_collection(url)?;
        Ok(records.into_iter().filter_map(SignInResource::into_event).collect())
    }
}
