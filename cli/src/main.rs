//! CLI entrypoint for toolwarden
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::{CommandFactory, FromArgMatches};
use std::collections::BTreeSet;
use std::io::IsTerminal;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use warden_application::{
    AuditDefinitionsUseCase, BaselineProgressNotifier, BatchParams, CaptureRequest, Capturer,
    DispatchActionUseCase, DispatchInput, GenerateBaselineUseCase, NoProgress, ReconcileInput,
    ReconcileToolsUseCase, RunBaselinesUseCase, ToolIndexRepository, baseline_targets,
};
use warden_domain::{
    ActivatedOptions, ConfigIssue, EXIT_DECODE_FAILED, OutputFormat, decode_output,
    shell_exit_code,
};
use warden_infrastructure::{
    ConfigLoader, FileConfig, FsToolStore, JsonToolIndexStore, PathToolDiscovery,
    ProcessCommandRunner, PtyCapturer, expand_targets,
};
use warden_presentation::{
    ActionRegistry, BaselineArgs, CaptureArgs, Cli, Command, ConsoleFormatter, DispatchArgs,
    ProgressReporter, SimpleProgress, formatter_for, parse_assignment,
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let registry = ActionRegistry::builtin();
    let matches = registry.augment(Cli::command()).get_matches();
    let cli = Cli::from_arg_matches(&matches).unwrap_or_else(|e| e.exit());

    let _log_guard = init_logging(cli.verbose, cli.log_file.as_deref())?;

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_deref());
        return Ok(ExitCode::SUCCESS);
    }

    let config = load_config(&cli)?;
    if !config.output.color {
        colored::control::set_override(false);
    }

    info!("Starting toolwarden");

    let code = match (cli.command, registry.parse(&matches)) {
        (Some(Command::Capture(args)), _) => capture(&config, args).await?,
        (Some(Command::Reconcile { json }), _) => reconcile(&config, json)?,
        (Some(Command::Baseline(args)), _) => baseline(&config, args).await?,
        (Some(Command::Tools { json }), _) => tools(&config, json)?,
        (Some(Command::Dispatch(args)), _) => dispatch_command(&config, args).await?,
        (None, Some(action)) => {
            debug!("Action {} -> {}", action.action, action.capability);
            let input = DispatchInput::new(action.capability, Vec::new())
                .with_options(action.options)
                .dry_run(action.dry_run)
                .strict(action.strict);
            dispatch(&config, input, &action.patterns).await?
        }
        (None, None) => {
            registry.augment(Cli::command()).print_help()?;
            2
        }
    };

    Ok(exit_code(code))
}

/// Log to stderr, and additionally to `log_file` when given.
///
/// `RUST_LOG` overrides the level derived from `-v`.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())
            .map_err(|e| anyhow!("failed to load configuration: {}", e))?
    };

    let issues = config.validate();
    if !issues.is_empty() {
        eprint!("{}", ConsoleFormatter::format_config_issues(&issues));
    }
    if ConfigIssue::has_errors(&issues) {
        bail!("invalid configuration");
    }
    Ok(config)
}

fn output_format(config: &FileConfig, json: bool) -> OutputFormat {
    if json {
        OutputFormat::Json
    } else {
        config.output.format.unwrap_or_default()
    }
}

/// Exit status for a tool or sentinel code.
fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(shell_exit_code(code) as u8)
}

fn tool_store(config: &FileConfig) -> Arc<FsToolStore> {
    Arc::new(FsToolStore::new(config.tool_dir_path()))
}

fn discovery(config: &FileConfig) -> Arc<PathToolDiscovery> {
    Arc::new(PathToolDiscovery::new(config.discovery.paths.clone()))
}

async fn capture(config: &FileConfig, args: CaptureArgs) -> Result<i32> {
    let command = shell_words::split(&args.command)
        .with_context(|| format!("cannot parse command line {:?}", args.command))?;
    if command.is_empty() {
        bail!("empty command line");
    }

    let defaults = config.capture_params();
    let timeout = args
        .timeout
        .map(Duration::from_secs)
        .unwrap_or(defaults.timeout);
    let request = CaptureRequest::new(
        command,
        args.rows.unwrap_or(defaults.rows),
        args.cols.unwrap_or(defaults.cols),
        timeout,
    );

    let result = tokio::task::spawn_blocking(move || PtyCapturer::new().capture(&request))
        .await
        .context("capture worker failed")?;

    let text = match decode_output(&result.stdout, args.encoding, args.errors) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("{}", e);
            return Ok(EXIT_DECODE_FAILED);
        }
    };

    match &args.output {
        Some(path) => std::fs::write(path, &text)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => print!("{}", text),
    }

    Ok(result.exit_code)
}

fn reconcile(config: &FileConfig, json: bool) -> Result<i32> {
    let use_case = ReconcileToolsUseCase::new(discovery(config), tool_store(config));
    let output = use_case.execute(&ReconcileInput::new(
        config.whitelist.clone(),
        config.blacklist.clone(),
    ));

    print!(
        "{}",
        formatter_for(output_format(config, json)).format_reconcile(&output)
    );

    match output.ensure_clean() {
        Ok(()) => Ok(0),
        Err(e) => {
            eprintln!("{}", e);
            Ok(1)
        }
    }
}

async fn baseline(config: &FileConfig, args: BaselineArgs) -> Result<i32> {
    let store = tool_store(config);
    let format = output_format(config, args.json);

    let reconciled = ReconcileToolsUseCase::new(discovery(config), store.clone()).execute(
        &ReconcileInput::new(config.whitelist.clone(), config.blacklist.clone()),
    );
    if let Err(e) = reconciled.ensure_clean() {
        print!("{}", formatter_for(format).format_reconcile(&reconciled));
        eprintln!("{}", e);
        return Ok(1);
    }

    let mut targets = baseline_targets(&reconciled.report, &config.whitelist, &config.blacklist);
    if !args.tools.is_empty() {
        let known: BTreeSet<String> = targets.iter().map(|s| s.tool_id()).collect();
        let unknown: Vec<&str> = args
            .tools
            .iter()
            .filter(|id| !known.contains(*id))
            .map(String::as_str)
            .collect();
        if !unknown.is_empty() {
            bail!("not managed: {}", unknown.join(", "));
        }
        targets.retain(|s| args.tools.contains(&s.tool_id()));
    }

    let index_store = JsonToolIndexStore::new(config.index_file_path());
    let mut index = index_store.load()?;

    let params = match args.jobs {
        Some(jobs) => BatchParams::new(jobs),
        None => config.batch_params(),
    };
    // Help is captured through `sh`, which resolves tools on `$PATH`.
    let generator = Arc::new(
        GenerateBaselineUseCase::new(Arc::new(PtyCapturer::new()), store, config.capture_params())
            .with_discovery(Arc::new(PathToolDiscovery::from_env())),
    );
    let use_case = RunBaselinesUseCase::new(generator, params);

    let quiet = args.quiet || format == OutputFormat::Json;
    let progress: Box<dyn BaselineProgressNotifier> = if quiet {
        Box::new(NoProgress)
    } else if std::io::stderr().is_terminal() {
        Box::new(ProgressReporter::new())
    } else {
        Box::new(SimpleProgress)
    };

    let summary = use_case
        .execute_with_progress(targets, &mut index, progress.as_ref())
        .await;

    index_store.save(&index)?;
    print!("{}", formatter_for(format).format_batch(&summary));

    Ok(if summary.is_success() { 0 } else { 1 })
}

fn tools(config: &FileConfig, json: bool) -> Result<i32> {
    let use_case = AuditDefinitionsUseCase::new(
        tool_store(config),
        Arc::new(JsonToolIndexStore::new(config.index_file_path())),
    );
    let report = use_case.execute()?;

    print!(
        "{}",
        formatter_for(output_format(config, json)).format_tools(&report)
    );

    Ok(if report.has_problems() { 1 } else { 0 })
}

async fn dispatch_command(config: &FileConfig, args: DispatchArgs) -> Result<i32> {
    let mut options = ActivatedOptions::new();
    for assignment in &args.set {
        let (key, value) = parse_assignment(assignment)
            .with_context(|| format!("invalid --set {:?}", assignment))?;
        options.insert(key, value);
    }

    let input = DispatchInput::new(args.capability, Vec::new())
        .with_options(options)
        .dry_run(args.dry_run)
        .strict(args.strict);
    dispatch(config, input, &args.files).await
}

async fn dispatch(
    config: &FileConfig,
    mut input: DispatchInput,
    patterns: &[String],
) -> Result<i32> {
    input.files = expand_targets(patterns)?;
    if input.files.is_empty() {
        bail!("no files matched {}", patterns.join(" "));
    }

    let use_case =
        DispatchActionUseCase::new(tool_store(config), Arc::new(ProcessCommandRunner::new()));
    let outcome = use_case.execute(input).await?;

    print!(
        "{}",
        formatter_for(output_format(config, false)).format_dispatch(&outcome)
    );

    Ok(outcome.exit_code())
}
