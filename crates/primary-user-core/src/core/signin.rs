// crates/primary-user-core/src/core/signin.rs
// ============================================================================
// Module: Sign-In Events
// Description: Immutable sign-in telemetry records.
// Purpose: Carry the raw input of the frequency aggregation.
// Dependencies: crate::core::identifiers, time
// ============================================================================

//! ## Overview
//! A [`SignInEvent`] records one principal authenticating on one device inside
//! the trailing telemetry window. Events are read once per run, aggregated,
//! and then discarded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use time::OffsetDateTime;

use crate::core::identifiers::DirectoryId;

// ============================================================================
// SECTION: Sign-In Event
// ============================================================================

/// Sign-in telemetry record.
///
/// # Invariants
/// - `device_id` is a directory identifier, never a management identifier.
/// - Events with an absent or blank `user_principal` never count toward a
///   device's most frequent user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInEvent {
    /// Directory identifier of the device the sign-in occurred on.
    pub device_id: DirectoryId,
    /// Principal that signed in, when reported.
    pub user_principal: Option<String>,
    /// Sign-in time, when reported.
    pub timestamp: Option<OffsetDateTime>,
}

impl SignInEvent {
    /// Creates a sign-in event without a timestamp.
    #[must_use]
    pub fn new(device_id: DirectoryId, user_principal: Option<String>) -> Self {
        Self {
            device_id,
            user_principal,
            timestamp: None,
        }
    }

    /// Returns the principal when it is present and non-blank.
    #[must_use]
    pub fn qualifying_principal(&self) -> Option<&str> {
        self.user_principal.as_deref().map(str::trim).filter(|principal| !principal.is_empty())
    }
}
