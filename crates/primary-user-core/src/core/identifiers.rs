// crates/primary-user-core/src/core/identifiers.rs
// ============================================================================
// Module: Primary User Sync Identifiers
// Description: Typed identifiers for devices and directory users.
// Purpose: Keep management and directory namespaces from being conflated.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A managed device is known by two unrelated identifiers: the management
//! identifier used for reads and writes against the device-management store,
//! and the directory identifier that sign-in telemetry correlates on. Each
//! namespace gets its own newtype so a value from one can never be passed
//! where the other is expected.
//!
//! Principal names are compared case-insensitively, matching directory
//! service semantics; see [`principals_match`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Device Identifiers
// ============================================================================

/// Identifier of a device in the device-management system.
///
/// # Invariants
/// - Never empty or whitespace-only; enforced by [`ManagementId::from_raw`].
/// - Surrounding whitespace is trimmed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ManagementId(String);

impl ManagementId {
    /// Creates a management identifier (returns `None` if blank).
    #[must_use]
    pub fn from_raw(raw: impl AsRef<str>) -> Option<Self> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() { None } else { Some(Self(trimmed.to_string())) }
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ManagementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier of a device in the identity directory.
///
/// Sign-in telemetry correlates on this value.
///
/// # Invariants
/// - Opaque UTF-8 string; compared byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectoryId(String);

impl DirectoryId {
    /// Creates a new directory device identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DirectoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: User Identifiers
// ============================================================================

/// Object identifier of a user in the identity directory.
///
/// Write calls reference users by this id, never by principal name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a new user identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// SECTION: Principal Helpers
// ============================================================================

/// Returns true when two principal names refer to the same principal.
#[must_use]
pub fn principals_match(left: &str, right: &str) -> bool {
    left.trim().eq_ignore_ascii_case(right.trim())
}

/// Returns the grouping key for a principal name.
pub(crate) fn principal_key(principal: &str) -> String {
    principal.trim().to_ascii_lowercase()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
