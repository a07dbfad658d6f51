// crates/primary-user-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing, plan resolution, and runs.
// Purpose: Ensure overrides, source selection, and abort ordering hold.
// Dependencies: primary-user-cli main helpers
// ============================================================================

//! ## Overview
//! Exercises `resolve_plan`, `summary_line`, and the run pipeline against an
//! in-memory remote so abort points can be checked without a network.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::Cell;
use std::path::Path;
use std::path::PathBuf;

use clap::Parser;
use primary_user_config::SyncConfig;
use primary_user_core::DeviceManagementStore;
use primary_user_core::DirectoryId;
use primary_user_core::DirectoryUser;
use primary_user_core::GroupDirectory;
use primary_user_core::GroupError;
use primary_user_core::GroupMember;
use primary_user_core::ManagedDeviceInfo;
use primary_user_core::ManagementId;
use primary_user_core::NoopAuditSink;
use primary_user_core::OutcomeKind;
use primary_user_core::OutcomeReport;
use primary_user_core::RemoteError;
use primary_user_core::RunSummary;
use primary_user_core::SignInEvent;
use primary_user_core::SignInTelemetrySource;
use primary_user_core::UserDirectory;
use primary_user_core::UserId;

use super::Cli;
use super::Commands;
use super::RunCommand;
use super::read_token;
use super::resolve_plan;
use super::summary_line;
use crate::pipeline::DeviceSource;
use crate::pipeline::RunError;
use crate::pipeline::RunPlan;
use crate::pipeline::execute;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn parse_run(args: &[&str]) -> RunCommand {
    let mut argv = vec!["primary-user-sync", "run"];
    argv.extend_from_slice(args);
    match Cli::try_parse_from(argv).unwrap().command {
        Commands::Run(command) => command,
        other => panic!("unexpected command: {other:?}"),
    }
}

fn group_plan(dry_run: bool) -> RunPlan {
    RunPlan {
        source: DeviceSource::Group("Kiosks".to_string()),
        window_days: 30,
        app_filter: Some("Windows Sign In".to_string()),
        dry_run,
        output_dir: PathBuf::from("."),
        file_prefix: "PrimaryUserSync".to_string(),
    }
}

/// Single-device remote with a scripted group and telemetry.
struct FakeRemote {
    group_exists: bool,
    telemetry_fails: bool,
    telemetry_calls: Cell<usize>,
    writes: Cell<usize>,
}

impl FakeRemote {
    fn new() -> Self {
        Self {
            group_exists: true,
            telemetry_fails: false,
            telemetry_calls: Cell::new(0),
            writes: Cell::new(0),
        }
    }
}

impl UserDirectory for FakeRemote {
    fn lookup_by_principal(&self, principal: &str) -> Result<Option<DirectoryUser>, RemoteError> {
        Ok(Some(DirectoryUser {
            id: UserId::new(format!("id:{principal}")),
            principal: principal.to_string(),
        }))
    }
}

impl GroupDirectory for FakeRemote {
    fn resolve_device_members(&self, group_name: &str) -> Result<Vec<GroupMember>, GroupError> {
        if !self.group_exists {
            return Err(GroupError::NotFound(group_name.to_string()));
        }
        Ok(vec![GroupMember {
            directory_id: DirectoryId::new("dir-1"),
            display_name: "PC-1".to_string(),
        }])
    }
}

impl DeviceManagementStore for FakeRemote {
    fn get_by_management_id(
        &self,
        _id: &ManagementId,
    ) -> Result<Option<ManagedDeviceInfo>, RemoteError> {
        Ok(None)
    }

    fn get_by_directory_id(
        &self,
        id: &DirectoryId,
    ) -> Result<Option<ManagedDeviceInfo>, RemoteError> {
        Ok(Some(ManagedDeviceInfo {
            management_id: ManagementId::from_raw("m-1").unwrap(),
            directory_id: Some(id.clone()),
            display_name: "PC-1".to_string(),
        }))
    }

    fn get_primary_user(&self, _id: &ManagementId) -> Result<Option<String>, RemoteError> {
        Ok(Some("alice@x.com".to_string()))
    }

    fn set_primary_user(&self, _id: &ManagementId, _user: &UserId) -> Result<(), RemoteError> {
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

impl SignInTelemetrySource for FakeRemote {
    fn fetch_window(
        &self,
        _app_filter: Option<&str>,
        _window_days: u32,
    ) -> Result<Vec<SignInEvent>, RemoteError> {
        self.telemetry_calls.set(self.telemetry_calls.get() + 1);
        if self.telemetry_fails {
            return Err(RemoteError::Transport("connection reset".to_string()));
        }
        Ok(vec![SignInEvent::new(DirectoryId::new("dir-1"), Some("bob@x.com".to_string()))])
    }
}

// ============================================================================
// SECTION: Argument Parsing
// ============================================================================

#[test]
fn run_requires_a_device_source() {
    let err = Cli::try_parse_from(["primary-user-sync", "run"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[test]
fn run_rejects_group_and_input_together() {
    let err = Cli::try_parse_from([
        "primary-user-sync",
        "run",
        "--group",
        "Kiosks",
        "--input",
        "devices.csv",
    ])
    .unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
}

#[test]
fn run_parses_overrides() {
    let command = parse_run(&["--input", "devices.csv", "--window-days", "7", "--dry-run"]);
    assert_eq!(command.input, Some(PathBuf::from("devices.csv")));
    assert_eq!(command.window_days, Some(7));
    assert!(command.dry_run);
}

// ============================================================================
// SECTION: Plan Resolution
// ============================================================================

#[test]
fn plan_uses_config_defaults() {
    let command = parse_run(&["--group", " Kiosks "]);
    let plan = resolve_plan(&command, &SyncConfig::default()).unwrap();
    assert_eq!(plan.source, DeviceSource::Group("Kiosks".to_string()));
    assert_eq!(plan.window_days, 30);
    assert_eq!(plan.app_filter.as_deref(), Some("Windows Sign In"));
    assert!(!plan.dry_run);
    assert_eq!(plan.output_dir, PathBuf::from("."));
    assert_eq!(plan.file_prefix, "PrimaryUserSync");
}

#[test]
fn plan_applies_command_line_overrides() {
    let command = parse_run(&[
        "--input",
        "devices.csv",
        "--window-days",
        "3",
        "--app-filter",
        "",
        "--output-dir",
        "reports",
    ]);
    let plan = resolve_plan(&command, &SyncConfig::default()).unwrap();
    assert_eq!(plan.source, DeviceSource::Input(PathBuf::from("devices.csv")));
    assert_eq!(plan.window_days, 3);
    assert_eq!(plan.app_filter, None);
    assert_eq!(plan.output_dir, PathBuf::from("reports"));
}

#[test]
fn plan_rejects_window_outside_retention() {
    let command = parse_run(&["--group", "Kiosks", "--window-days", "31"]);
    assert!(resolve_plan(&command, &SyncConfig::default()).is_err());
    let command = parse_run(&["--group", "Kiosks", "--window-days", "0"]);
    assert!(resolve_plan(&command, &SyncConfig::default()).is_err());
}

#[test]
fn plan_rejects_blank_group() {
    let command = parse_run(&["--group", "  "]);
    let err = resolve_plan(&command, &SyncConfig::default()).unwrap_err();
    assert!(err.to_string().contains("--group"));
}

#[test]
fn missing_token_names_the_variable() {
    let err = read_token("PRIMARY_USER_SYNC_TEST_TOKEN_THAT_IS_NEVER_SET").unwrap_err();
    assert!(err.to_string().contains("PRIMARY_USER_SYNC_TEST_TOKEN_THAT_IS_NEVER_SET"));
}

#[test]
fn summary_line_lists_every_counter() {
    let mut summary = RunSummary::default();
    for kind in [
        OutcomeKind::Updated,
        OutcomeKind::Unchanged,
        OutcomeKind::Unchanged,
        OutcomeKind::NoSignInActivity,
        OutcomeKind::WriteFailed,
        OutcomeKind::NotManaged,
    ] {
        summary.record(kind);
    }
    let line = summary_line(&summary, Path::new("out/report.csv"));
    assert_eq!(
        line,
        "processed=6 updated=1 would_update=0 unchanged=2 failed=3 no_sign_in_activity=1 \
         principal_not_found=0 directory_lookup_failed=0 read_failed=0 write_failed=1 \
         not_managed=1 resolution_failed=0 report=out/report.csv"
    );
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

#[test]
fn group_run_reassigns_and_fetches_telemetry_once() {
    let remote = FakeRemote::new();
    let mut report = OutcomeReport::new();
    let summary = execute(&group_plan(false), &remote, &mut report, &NoopAuditSink).unwrap();
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.updated, 1);
    assert_eq!(remote.telemetry_calls.get(), 1);
    assert_eq!(remote.writes.get(), 1);
    assert_eq!(report.entries()[0].kind(), OutcomeKind::Updated);
}

#[test]
fn dry_run_never_writes() {
    let remote = FakeRemote::new();
    let mut report = OutcomeReport::new();
    let summary = execute(&group_plan(true), &remote, &mut report, &NoopAuditSink).unwrap();
    assert_eq!(summary.would_update, 1);
    assert_eq!(remote.writes.get(), 0);
}

#[test]
fn missing_group_aborts_before_telemetry() {
    let remote = FakeRemote {
        group_exists: false,
        ..FakeRemote::new()
    };
    let mut report = OutcomeReport::new();
    let err = execute(&group_plan(false), &remote, &mut report, &NoopAuditSink).unwrap_err();
    assert!(matches!(err, RunError::Group(GroupError::NotFound(_))));
    assert_eq!(remote.telemetry_calls.get(), 0);
    assert!(report.entries().is_empty());
}

#[test]
fn telemetry_failure_aborts_with_empty_report() {
    let remote = FakeRemote {
        telemetry_fails: true,
        ..FakeRemote::new()
    };
    let mut report = OutcomeReport::new();
    let err = execute(&group_plan(false), &remote, &mut report, &NoopAuditSink).unwrap_err();
    assert_eq!(err.to_string(), "sign-in telemetry fetch failed: transport error: connection reset");
    assert_eq!(remote.writes.get(), 0);
    assert!(report.entries().is_empty());
}

#[test]
fn malformed_input_aborts_before_any_remote_call() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("devices.csv");
    std::fs::write(&path, "Id,Name\nm-1,PC-1\n").unwrap();
    let plan = RunPlan {
        source: DeviceSource::Input(path),
        ..group_plan(false)
    };
    let remote = FakeRemote::new();
    let mut report = OutcomeReport::new();
    let err = execute(&plan, &remote, &mut report, &NoopAuditSink).unwrap_err();
    assert!(matches!(err, RunError::Input(_)));
    assert_eq!(remote.telemetry_calls.get(), 0);
}
