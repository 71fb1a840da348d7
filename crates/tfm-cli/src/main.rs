//! `tfm`: migrate configuration and state documents between provider generations
//!
//! ```text
//! tfm migrate --config-dir ./infra --state-file ./terraform.tfstate
//! tfm list
//! tfm renames --source-version v4 --target-version v5
//! ```
//!
//! The exit code is non-zero when any document failed fatally or recorded an
//! error diagnostic. Warnings alone do not fail the run.

use anyhow::{bail, Context as _, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use rayon::prelude::*;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tfm_core::{Context, Diagnostics, MigrateConfig, Pipeline};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("tfm")
        .version(tfm_core::VERSION)
        .about("Migrate configuration and state between provider schema generations")
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log per-resource decisions (overridden by RUST_LOG)"),
        )
        .subcommand(
            Command::new("migrate")
                .about("Rewrite configuration files and a state file in place")
                .arg(
                    Arg::new("config-dir")
                        .long("config-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory whose .tf files are migrated"),
                )
                .arg(
                    Arg::new("state-file")
                        .long("state-file")
                        .value_parser(value_parser!(PathBuf))
                        .help("State document to migrate"),
                )
                .args(common_args())
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Report what would change without writing files"),
                )
                .arg(
                    Arg::new("diagnostics-json")
                        .long("diagnostics-json")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write a JSON report of all diagnostics to this path"),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List registered migrators for a version pair")
                .args(common_args()),
        )
        .subcommand(
            Command::new("renames")
                .about("Print resource type renames for a version pair")
                .args(common_args()),
        )
}

fn common_args() -> [Arg; 3] {
    [
        Arg::new("source-version")
            .long("source-version")
            .help("Schema generation the documents are written for [default: v4]"),
        Arg::new("target-version")
            .long("target-version")
            .help("Schema generation to migrate to [default: v5]"),
        Arg::new("settings")
            .long("settings")
            .value_parser(value_parser!(PathBuf))
            .help("TOML settings file; flags override its values"),
    ]
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    init_logging(matches.get_flag("verbose"));

    match run(&matches) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(matches: &ArgMatches) -> Result<ExitCode> {
    match matches.subcommand() {
        Some(("migrate", args)) => migrate(args),
        Some(("list", args)) => {
            let config = load_settings(args)?;
            let registry = tfm_resources::default_registry()?;
            for (key, migrator) in registry.migrators_for(&config.source_version, &config.target_version) {
                println!(
                    "{} ({} -> {}) => {}",
                    key.resource_type,
                    key.source_version,
                    key.target_version,
                    migrator.resource_type()
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Some(("renames", args)) => {
            let config = load_settings(args)?;
            let registry = tfm_resources::default_registry()?;
            for (old, new) in registry.renames(&config.source_version, &config.target_version) {
                println!("{old} -> {new}");
            }
            Ok(ExitCode::SUCCESS)
        }
        _ => bail!("unknown command"),
    }
}

/// Settings file (if any) with version flags applied on top
fn load_settings(args: &ArgMatches) -> Result<MigrateConfig> {
    let mut config = match args.get_one::<PathBuf>("settings") {
        Some(path) => MigrateConfig::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => MigrateConfig::new(),
    };
    if let Some(source) = args.get_one::<String>("source-version") {
        config.source_version.clone_from(source);
    }
    if let Some(target) = args.get_one::<String>("target-version") {
        config.target_version.clone_from(target);
    }
    Ok(config)
}

/// Outcome for one document
#[derive(Debug)]
struct FileReport {
    path: PathBuf,
    changed: bool,
    fatal: Option<String>,
    diagnostics: Diagnostics,
}

impl FileReport {
    fn failed(&self) -> bool {
        self.fatal.is_some() || self.diagnostics.has_errors()
    }
}

fn migrate(args: &ArgMatches) -> Result<ExitCode> {
    let config = load_settings(args)?;
    let config_dir = args.get_one::<PathBuf>("config-dir");
    let state_file = args.get_one::<PathBuf>("state-file");
    if config_dir.is_none() && state_file.is_none() {
        bail!("nothing to migrate: pass --config-dir and/or --state-file");
    }
    let dry_run = args.get_flag("dry-run");
    let registry = Arc::new(tfm_resources::default_registry()?);

    let mut reports = Vec::new();
    if let Some(dir) = config_dir {
        let files = config_files(dir)?;
        let pipeline = Pipeline::config(Arc::clone(&registry), &config);
        let migrated = files
            .par_iter()
            .map(|path| migrate_file(&pipeline, &config, path, dry_run))
            .collect::<Result<Vec<_>>>()?;
        reports.extend(migrated);
    }
    if let Some(path) = state_file {
        let pipeline = Pipeline::state(Arc::clone(&registry));
        reports.push(migrate_file(&pipeline, &config, path, dry_run)?);
    }

    for report in &reports {
        print_report(report, dry_run);
    }
    if let Some(path) = args.get_one::<PathBuf>("diagnostics-json") {
        write_diagnostics(path, &reports)?;
    }

    let failed = reports.iter().filter(|r| r.failed()).count();
    tracing::info!(documents = reports.len(), failed, dry_run, "migration finished");
    Ok(if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// `.tf` files directly inside `dir`, sorted by name
fn config_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("failed to read config directory {}", dir.display()))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("failed to list {}", dir.display()))?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "tf") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn migrate_file(
    pipeline: &Pipeline,
    config: &MigrateConfig,
    path: &Path,
    dry_run: bool,
) -> Result<FileReport> {
    let original =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let mut ctx = Context::new(original.as_str(), config).with_name(path.display().to_string());

    let fatal = pipeline.run(&mut ctx).err().map(|err| err.to_string());
    let changed = ctx.content != original;
    if changed && !dry_run {
        fs::write(path, &ctx.content)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    tracing::debug!(file = %path.display(), changed, fatal = fatal.is_some(), "document processed");

    Ok(FileReport {
        path: path.to_path_buf(),
        changed,
        fatal,
        diagnostics: ctx.diagnostics,
    })
}

fn print_report(report: &FileReport, dry_run: bool) {
    let status = match (&report.fatal, report.changed, dry_run) {
        (Some(_), _, _) => "failed",
        (None, true, true) => "would migrate",
        (None, true, false) => "migrated",
        (None, false, _) => "unchanged",
    };
    println!("{status} {}", report.path.display());
    if let Some(fatal) = &report.fatal {
        eprintln!("  {fatal}");
    }
    for diagnostic in &report.diagnostics {
        eprintln!("  {diagnostic}");
    }
}

fn write_diagnostics(path: &Path, reports: &[FileReport]) -> Result<()> {
    let documents: Vec<_> = reports
        .iter()
        .map(|r| {
            json!({
                "file": r.path.display().to_string(),
                "changed": r.changed,
                "fatal": r.fatal,
                "diagnostics": r.diagnostics,
            })
        })
        .collect();
    let text = serde_json::to_string_pretty(&documents)?;
    fs::write(path, text + "\n")
        .with_context(|| format!("failed to write diagnostics to {}", path.display()))
}
