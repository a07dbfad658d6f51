// crates/primary-user-cli/src/main.rs
// ============================================================================
// Module: Primary User Sync CLI Entry Point
// Description: Command dispatcher for reconciliation runs and offline checks.
// Purpose: Wire configuration, remote collaborators, report, and audit sinks.
// Dependencies: clap, primary-user-config, primary-user-core, primary-user-graph, time
// ============================================================================

//! ## Overview
//! `primary-user-sync run` reassigns the primary user of each device in a
//! group or input file to its most frequent signer and writes a CSV report.
//! `input validate` and `config validate` check files offline. Fatal errors
//! go to stderr with a failure exit code; per-device failures are report
//! rows and do not change the exit code.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;
pub(crate) mod pipeline;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::ArgGroup;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use primary_user_config::AuditConfig;
use primary_user_config::AuditSinkKind;
use primary_user_config::GraphConfig;
use primary_user_config::SyncConfig;
use primary_user_config::validate_window_days;
use primary_user_core::AuditSink;
use primary_user_core::FileAuditSink;
use primary_user_core::NoopAuditSink;
use primary_user_core::OutcomeKind;
use primary_user_core::RunAuditEvent;
use primary_user_core::RunSummary;
use primary_user_core::StderrAuditSink;
use primary_user_core::runtime::create_report_file;
use primary_user_core::runtime::read_device_input;
use primary_user_graph::GraphClient;
use primary_user_graph::GraphClientConfig;
use thiserror::Error;
use time::OffsetDateTime;

use crate::pipeline::DeviceSource;
use crate::pipeline::RunPlan;
use crate::pipeline::execute;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "primary-user-sync", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconcile device primary users against recent sign-ins.
    Run(RunCommand),
    /// Device input file utilities.
    Input {
        /// Selected input subcommand.
        #[command(subcommand)]
        command: InputCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["group", "input"])))]
struct RunCommand {
    /// Directory group whose device members are reconciled.
    #[arg(long, value_name = "NAME")]
    group: Option<String>,
    /// CSV input file with a `DeviceId,DeviceName` header.
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,
    /// Optional config file path (defaults to primary-user-sync.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Report directory (overrides `report.output_dir`).
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,
    /// Sign-in window in days (overrides `signins.window_days`).
    #[arg(long, value_name = "DAYS")]
    window_days: Option<u32>,
    /// Sign-in application filter; empty disables (overrides `signins.app_filter`).
    #[arg(long, value_name = "APP")]
    app_filter: Option<String>,
    /// Report intended changes without writing them.
    #[arg(long, action = ArgAction::SetTrue)]
    dry_run: bool,
}

/// Input subcommands.
#[derive(Subcommand, Debug)]
enum InputCommand {
    /// Validate a device input file without contacting any service.
    Validate(InputValidateCommand),
}

/// Arguments for `input validate`.
#[derive(Args, Debug)]
struct InputValidateCommand {
    /// CSV input file to validate.
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a Primary User Sync configuration file.
    Validate(ConfigValidateCommand),
}

/// Arguments for `config validate`.
#[derive(Args, Debug)]
struct ConfigValidateCommand {
    /// Optional config file path (defaults to primary-user-sync.toml or env override).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper carrying a user-facing message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run(command) => command_run(&command),
        Commands::Input {
            command,
        } => command_input(&command),
        Commands::Config {
            command,
        } => command_config(&command),
    }
}

// ============================================================================
// SECTION: Run Command
// ============================================================================

/// Executes the `run` command.
fn command_run(command: &RunCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let plan = resolve_plan(command, &config)?;
    let token = read_token(&config.graph.token_env)?;
    let client = GraphClient::new(graph_client_config(&config.graph), token)
        .map_err(|err| CliError::new(err.to_string()))?;
    let audit = open_audit_sink(&config.audit)?;

    let (report_path, mut writer) =
        create_report_file(&plan.output_dir, &plan.file_prefix, OffsetDateTime::now_utc())
            .map_err(|err| CliError::new(err.to_string()))?;
    let outcome = execute(&plan, &client, &mut writer, audit.as_ref());
    let finalized = writer.finalize();

    match outcome {
        Ok(summary) => {
            finalized.map_err(|err| CliError::new(err.to_string()))?;
            write_stdout_line(&summary_line(&summary, &report_path))
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            audit.record_run(&RunAuditEvent::aborted(err.to_string()));
            Err(CliError::new(format!("run aborted: {err} (report: {})", report_path.display())))
        }
    }
}

/// Combines configuration and command-line overrides into a run plan.
fn resolve_plan(command: &RunCommand, config: &SyncConfig) -> CliResult<RunPlan> {
    let source = match (&command.group, &command.input) {
        (Some(group), None) => {
            let group = group.trim();
            if group.is_empty() {
                return Err(CliError::new("--group must be non-empty".to_string()));
            }
            DeviceSource::Group(group.to_string())
        }
        (None, Some(path)) => DeviceSource::Input(path.clone()),
        _ => {
            return Err(CliError::new(
                "exactly one of --group or --input is required".to_string(),
            ));
        }
    };
    let window_days = command.window_days.unwrap_or(config.signins.window_days);
    validate_window_days(window_days).map_err(|err| CliError::new(err.to_string()))?;
    let app_filter = match &command.app_filter {
        Some(filter) => Some(filter.trim()).filter(|filter| !filter.is_empty()).map(str::to_string),
        None => config.signins.app_filter().map(str::to_string),
    };
    let output_dir = command
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(config.report.output_dir.trim()));
    Ok(RunPlan {
        source,
        window_days,
        app_filter,
        dry_run: command.dry_run,
        output_dir,
        file_prefix: config.report.file_prefix.trim().to_string(),
    })
}

/// Reads the bearer token from the configured environment variable.
fn read_token(var: &str) -> CliResult<String> {
    match std::env::var(var) {
        Ok(token) if !token.trim().is_empty() => Ok(token),
        _ => Err(CliError::new(format!("bearer token not set: export {var}"))),
    }
}

/// Maps configuration onto the Graph client settings.
fn graph_client_config(config: &GraphConfig) -> GraphClientConfig {
    GraphClientConfig {
        base_url: config.base_url.trim().to_string(),
        allow_http: config.allow_http,
        timeout_ms: config.timeout_ms,
        max_response_bytes: config.max_response_bytes,
        max_pages: config.max_pages,
        user_agent: config.user_agent.clone(),
    }
}

/// Opens the configured audit sink.
fn open_audit_sink(config: &AuditConfig) -> CliResult<Box<dyn AuditSink>> {
    match config.sink {
        AuditSinkKind::Stderr => Ok(Box::new(StderrAuditSink)),
        AuditSinkKind::None => Ok(Box::new(NoopAuditSink)),
        AuditSinkKind::File => {
            let path = config.path.as_deref().map(str::trim).unwrap_or_default();
            let sink = FileAuditSink::new(Path::new(path))
                .map_err(|err| CliError::new(format!("audit log open failed: {path}: {err}")))?;
            Ok(Box::new(sink))
        }
    }
}

/// Formats the one-line run summary.
///
/// Failure counters follow the total, one per failure kind.
fn summary_line(summary: &RunSummary, report_path: &Path) -> String {
    let mut line = format!(
        "processed={} updated={} would_update={} unchanged={} failed={}",
        summary.processed, summary.updated, summary.would_update, summary.unchanged, summary.failed
    );
    for kind in OutcomeKind::FAILURES {
        line.push_str(&format!(" {}={}", kind.as_str(), summary.count(kind)));
    }
    line.push_str(&format!(" report={}", report_path.display()));
    line
}

// ============================================================================
// SECTION: Input Commands
// ============================================================================

/// Dispatches input subcommands.
fn command_input(command: &InputCommand) -> CliResult<ExitCode> {
    match command {
        InputCommand::Validate(command) => command_input_validate(command),
    }
}

/// Executes the input validation command.
fn command_input_validate(command: &InputValidateCommand) -> CliResult<ExitCode> {
    let rows = read_device_input(&command.input)
        .map_err(|err| CliError::new(format!("input validation failed: {err}")))?;
    write_stdout_line(&format!("input valid: {} devices", rows.len()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate(command) => command_config_validate(command),
    }
}

/// Executes the config validation command.
fn command_config_validate(command: &ConfigValidateCommand) -> CliResult<ExitCode> {
    let config = load_config(command.config.as_deref())?;
    let source = config
        .source
        .as_ref()
        .map_or_else(|| "built-in defaults".to_string(), |path| path.display().to_string());
    write_stdout_line(&format!("config valid: {source}"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Loads configuration, wrapping failures for display.
fn load_config(path: Option<&Path>) -> CliResult<SyncConfig> {
    SyncConfig::load(path).map_err(|err| CliError::new(format!("config load failed: {err}")))
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write {stream}: {error}")
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
