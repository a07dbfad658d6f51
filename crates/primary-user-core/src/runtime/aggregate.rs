// crates/primary-user-core/src/runtime/aggregate.rs
// ============================================================================
// Module: Sign-In Aggregation
// Description: Most-frequent-principal selection over sign-in telemetry.
// Purpose: Turn a flat event set into one target principal per device.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The aggregator groups qualifying sign-in events by device directory
//! identifier and principal, then selects the principal with the most events.
//!
//! Tie-break: when several principals share the highest count, the principal
//! whose first event occurs earliest in the input sequence wins. The index
//! keeps tallies in first-seen order and only replaces the leader on a
//! strictly greater count, so no sort (stable or otherwise) is involved.
//!
//! Principals are grouped case-insensitively. The spelling reported for a
//! group is the spelling of its first-seen event.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::DirectoryId;
use crate::core::SignInEvent;
use crate::core::identifiers::principal_key;

// ============================================================================
// SECTION: Tallies
// ============================================================================

/// Event count for one principal on one device.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PrincipalTally {
    /// Principal spelling of the first-seen event.
    principal: String,
    /// Number of qualifying events.
    count: usize,
}

/// Per-device tallies in first-seen order.
#[derive(Debug, Clone, Default)]
struct DeviceTally {
    /// Position of each principal key within `tallies`.
    positions: BTreeMap<String, usize>,
    /// Tallies ordered by the first occurrence of each principal.
    tallies: Vec<PrincipalTally>,
}

impl DeviceTally {
    /// Counts one event for the principal.
    fn observe(&mut self, principal: &str) {
        let key = principal_key(principal);
        if let Some(position) = self.positions.get(&key) {
            if let Some(tally) = self.tallies.get_mut(*position) {
                tally.count += 1;
            }
            return;
        }
        self.positions.insert(key, self.tallies.len());
        self.tallies.push(PrincipalTally {
            principal: principal.to_string(),
            count: 1,
        });
    }

    /// Returns the leading principal, earliest first-seen winning ties.
    fn leader(&self) -> Option<&str> {
        let mut leader: Option<&PrincipalTally> = None;
        for tally in &self.tallies {
            match leader {
                Some(current) if tally.count <= current.count => {}
                _ => leader = Some(tally),
            }
        }
        leader.map(|tally| tally.principal.as_str())
    }
}

// ============================================================================
// SECTION: Sign-In Index
// ============================================================================

/// Sign-in events pre-indexed by device directory identifier.
///
/// Built once per run in O(events); each device query is then independent of
/// the total event count.
#[derive(Debug, Clone, Default)]
pub struct SignInIndex {
    /// Tallies keyed by device directory identifier.
    devices: BTreeMap<DirectoryId, DeviceTally>,
    /// Total events supplied, qualifying or not.
    event_count: usize,
    /// Events that carried a principal.
    qualifying_count: usize,
}

impl SignInIndex {
    /// Builds the index from the full event set.
    #[must_use]
    pub fn build<'a>(events: impl IntoIterator<Item = &'a SignInEvent>) -> Self {
        let mut index = Self::default();
        for event in events {
            index.event_count += 1;
            let Some(principal) = event.qualifying_principal() else {
                continue;
            };
            index.qualifying_count += 1;
            index.devices.entry(event.device_id.clone()).or_default().observe(principal);
        }
        index
    }

    /// Returns the most frequent principal for a device, if any.
    #[must_use]
    pub fn most_frequent_user(&self, device_id: &DirectoryId) -> Option<&str> {
        self.devices.get(device_id).and_then(DeviceTally::leader)
    }

    /// Returns the number of events the index was built from.
    #[must_use]
    pub const fn event_count(&self) -> usize {
        self.event_count
    }

    /// Returns the number of events that carried a principal.
    #[must_use]
    pub const fn qualifying_count(&self) -> usize {
        self.qualifying_count
    }

    /// Returns the number of devices with at least one qualifying event.
    #[must_use]
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}

/// Returns the most frequent principal for one device in an event sequence.
///
/// Equivalent to building a [`SignInIndex`] and querying it, without indexing
/// unrelated devices.
#[must_use]
pub fn most_frequent_user(events: &[SignInEvent], device_id: &DirectoryId) -> Option<String> {
    let mut tally = DeviceTally::default();
    for event in events.iter().filter(|event| &event.device_id == device_id) {
        if let Some(principal) = event.qualifying_principal() {
            tally.observe(principal);
        }
    }
    tally.leader().map(str::to_string)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
