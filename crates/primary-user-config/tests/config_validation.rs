//! Validation and loading tests for primary-user-config.
// crates/primary-user-config/tests/config_validation.rs
// =============================================================================
// Module: Config Validation Tests
// Description: Fail-closed validation of every configuration section.
// Purpose: Ensure invalid settings are rejected before any run starts.
// =============================================================================

use primary_user_config::AuditSinkKind;
use primary_user_config::SyncConfig;
use primary_user_config::validate_window_days;

mod common;

use common::TestResult;
use common::assert_invalid;
use common::config_from_toml;
use common::write_config;

// ============================================================================
// SECTION: Graph
// ============================================================================

#[test]
fn http_base_url_requires_opt_in() -> TestResult {
    assert_invalid(
        config_from_toml("[graph]\nbase_url = \"http://127.0.0.1:9000\"\n"),
        "without allow_http",
    )?;
    config_from_toml("[graph]\nbase_url = \"http://127.0.0.1:9000\"\nallow_http = true\n")
        .map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn unsupported_scheme_is_rejected() -> TestResult {
    assert_invalid(config_from_toml("[graph]\nbase_url = \"ftp://example.com\"\n"), "scheme")
}

#[test]
fn timeout_outside_bounds_is_rejected() -> TestResult {
    assert_invalid(config_from_toml("[graph]\ntimeout_ms = 99\n"), "graph.timeout_ms")?;
    assert_invalid(config_from_toml("[graph]\ntimeout_ms = 120001\n"), "graph.timeout_ms")?;
    config_from_toml("[graph]\ntimeout_ms = 120000\n").map_err(|err| err.to_string())?;
    Ok(())
}

#[test]
fn zero_limits_are_rejected() -> TestResult {
    assert_invalid(config_from_toml("[graph]\nmax_pages = 0\n"), "graph.max_pages")?;
    assert_invalid(
        config_from_toml("[graph]\nmax_response_bytes = 0\n"),
        "graph.max_response_bytes",
    )
}

#[test]
fn blank_token_env_is_rejected() -> TestResult {
    assert_invalid(config_from_toml("[graph]\ntoken_env = \"  \"\n"), "graph.token_env")
}

// ============================================================================
// SECTION: Sign-Ins And Report
// ============================================================================

#[test]
fn window_days_must_fit_retention() -> TestResult {
    assert_invalid(config_from_toml("[signins]\nwindow_days = 0\n"), "window_days")?;
    assert_invalid(config_from_toml("[signins]\nwindow_days = 31\n"), "window_days")?;
    validate_window_days(1).map_err(|err| err.to_string())?;
    validate_window_days(30).map_err(|err| err.to_string())
}

#[test]
fn report_prefix_rejects_path_separators() -> TestResult {
    assert_invalid(config_from_toml("[report]\nfile_prefix = \"../out\"\n"), "file_prefix")?;
    assert_invalid(config_from_toml("[report]\nfile_prefix = \"\"\n"), "file_prefix")
}

#[test]
fn report_output_dir_must_be_non_empty() -> TestResult {
    assert_invalid(config_from_toml("[report]\noutput_dir = \" \"\n"), "report.output_dir")
}

// ============================================================================
// SECTION: Audit
// ============================================================================

#[test]
fn file_sink_requires_path() -> TestResult {
    assert_invalid(config_from_toml("[audit]\nsink = \"file\"\n"), "audit.path")?;
    let config = config_from_toml("[audit]\nsink = \"file\"\npath = \"audit.jsonl\"\n")
        .map_err(|err| err.to_string())?;
    if config.audit.sink != AuditSinkKind::File {
        return Err("file sink not parsed".to_string());
    }
    Ok(())
}

#[test]
fn unknown_sink_is_a_parse_error() -> TestResult {
    assert_invalid(config_from_toml("[audit]\nsink = \"syslog\"\n"), "config parse error")
}

// ============================================================================
// SECTION: Loading
// ============================================================================

#[test]
fn load_reads_explicit_file() -> TestResult {
    let (_dir, path) = write_config(b"[signins]\nwindow_days = 7\n")?;
    let config = SyncConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if config.signins.window_days != 7 {
        return Err("window_days not loaded".to_string());
    }
    if config.source.as_deref() != Some(path.as_path()) {
        return Err("source path not recorded".to_string());
    }
    Ok(())
}

#[test]
fn load_fails_for_missing_explicit_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    assert_invalid(SyncConfig::load(Some(&path)), "config io error")
}

#[test]
fn load_rejects_non_utf8() -> TestResult {
    let (_dir, path) = write_config(&[0xff, 0xfe, 0x00])?;
    assert_invalid(SyncConfig::load(Some(&path)), "utf-8")
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let padding = format!("# {}\n", "x".repeat(1024 * 1024));
    let (_dir, path) = write_config(padding.as_bytes())?;
    assert_invalid(SyncConfig::load(Some(&path)), "size limit")
}

#[test]
fn load_rejects_overlong_path_component() -> TestResult {
    let path = std::path::PathBuf::from(format!("{}.toml", "c".repeat(300)));
    assert_invalid(SyncConfig::load(Some(&path)), "component too long")
}
