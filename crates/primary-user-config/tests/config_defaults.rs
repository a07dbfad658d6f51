//! Default value tests for primary-user-config.
// crates/primary-user-config/tests/config_defaults.rs
// =============================================================================
// Module: Config Default Tests
// Description: Defaults applied for omitted sections and fields.
// Purpose: Pin the documented defaults of primary-user-sync.toml.
// =============================================================================

use primary_user_config::AuditSinkKind;

mod common;

use common::TestResult;
use common::config_from_toml;

#[test]
fn empty_file_yields_documented_defaults() -> TestResult {
    let config = config_from_toml("").map_err(|err| err.to_string())?;
    if config.graph.base_url != "https://graph.microsoft.com/beta" {
        return Err(format!("unexpected base_url {}", config.graph.base_url));
    }
    if config.graph.token_env != "PRIMARY_USER_SYNC_TOKEN" {
        return Err(format!("unexpected token_env {}", config.graph.token_env));
    }
    if config.graph.timeout_ms != 5_000 || config.graph.max_pages != 500 {
        return Err("unexpected graph limits".to_string());
    }
    if config.graph.allow_http {
        return Err("allow_http must default to false".to_string());
    }
    if config.signins.window_days != 30 {
        return Err(format!("unexpected window_days {}", config.signins.window_days));
    }
    if config.signins.app_filter() != Some("Windows Sign In") {
        return Err("unexpected app filter".to_string());
    }
    if config.report.output_dir != "." || config.report.file_prefix != "PrimaryUserSync" {
        return Err("unexpected report defaults".to_string());
    }
    if config.audit.sink != AuditSinkKind::Stderr || config.audit.path.is_some() {
        return Err("unexpected audit defaults".to_string());
    }
    Ok(())
}

#[test]
fn blank_app_filter_disables_filtering() -> TestResult {
    let config = config_from_toml("[signins]\napp_filter = \"\"\n").map_err(|err| err.to_string())?;
    if config.signins.app_filter().is_some() {
        return Err("blank app_filter should disable filtering".to_string());
    }
    Ok(())
}

#[test]
fn partial_section_keeps_other_defaults() -> TestResult {
    let config =
        config_from_toml("[graph]\ntimeout_ms = 2500\n").map_err(|err| err.to_string())?;
    if config.graph.timeout_ms != 2_500 {
        return Err("timeout_ms override ignored".to_string());
    }
    if config.graph.max_response_bytes != 8 * 1024 * 1024 {
        return Err("max_response_bytes default lost".to_string());
    }
    Ok(())
}
