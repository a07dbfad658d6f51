// crates/primary-user-graph/src/lib.rs
// ============================================================================
// Module: Primary User Sync Graph Library
// Description: REST-backed implementations of the core collaborator traits.
// Purpose: Connect reconciliation runs to the directory and management API.
// Dependencies: primary-user-core, reqwest, serde, time, url
// ============================================================================

//! ## Overview
//! [`GraphClient`] implements every collaborator trait from
//! `primary-user-core` over a single blocking HTTP client: user lookups,
//! managed device reads and primary user writes, group membership, and
//! sign-in telemetry. Requests carry a bearer token, follow no redirects, and
//! read bounded response bodies.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
mod collaborators;
pub mod model;
pub mod odata;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::GraphClient;
pub use client::GraphClientConfig;
pub use client::GraphError;
