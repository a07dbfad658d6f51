// crates/primary-user-config/src/lib.rs
// ============================================================================
// Module: Primary User Sync Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for primary-user-sync.toml semantics.
// Dependencies: serde, toml, url
// ============================================================================

//! ## Overview
//! `primary-user-config` defines the configuration model for Primary User
//! Sync: remote endpoint settings, the sign-in window, report placement, and
//! audit routing. Validation is strict and fail-closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
