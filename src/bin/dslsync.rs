//! Command-line host for the component DSL synchronizer.
//!
//! Translates flags (optionally layered over a JSON config file) into a
//! `SyncConfig`, runs one synchronization, and reports what changed. Build
//! failures caused by bad component input exit with status 2; every other
//! error exits with status 1.

use anyhow::{Context, Result, anyhow, bail};
use dslsync::{SyncConfig, SyncError, SyncOverrides, SyncReport};
use std::env;
use std::ffi::OsString;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "DSLSYNC_LOG";

fn main() {
    let args = match CliArgs::parse() {
        Ok(args) => args,
        Err(err) => {
            eprintln!("{err:#}");
            std::process::exit(1);
        }
    };
    init_logging(args.verbose);

    match run(&args) {
        Ok(report) => {
            if args.json {
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(err) => {
                        eprintln!("serializing report: {err}");
                        std::process::exit(1);
                    }
                }
            } else {
                print_summary(&report);
            }
        }
        Err(err) => {
            eprintln!("{err:#}");
            let code = match err.downcast_ref::<SyncError>() {
                Some(sync) => sync.exit_code(),
                None => 1,
            };
            std::process::exit(code);
        }
    }
}

fn run(args: &CliArgs) -> Result<SyncReport> {
    let base_dir = match &args.base_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("resolving current directory")?,
    };
    let overrides = match &args.config_file {
        Some(path) => SyncOverrides::from_file(path)?.merge(args.overrides.clone()),
        None => args.overrides.clone(),
    };
    let config = SyncConfig::resolve(&base_dir, overrides)?;
    tracing::debug!(?config, "resolved configuration");

    Ok(dslsync::run(&config)?)
}

fn init_logging(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_summary(report: &SyncReport) {
    println!(
        "components: {} discovered, {} generated, {} skipped, {} registered",
        report.discovered.len(),
        report.generated.len(),
        report.skipped.len(),
        report.registered.len()
    );
    for artifact in &report.artifacts {
        let label = if artifact.outcome.changed() {
            "written"
        } else {
            "unchanged"
        };
        println!("  {label:<9} {}", artifact.path.display());
    }
    println!(
        "files written: {} (registry flushes: {})",
        report.written(),
        report.registry_writes
    );
}

/// Parsed command-line arguments.
struct CliArgs {
    base_dir: Option<PathBuf>,
    config_file: Option<PathBuf>,
    overrides: SyncOverrides,
    json: bool,
    verbose: bool,
}

impl CliArgs {
    fn parse() -> Result<Self> {
        Self::parse_from(env::args_os().skip(1))
    }

    fn parse_from(args: impl IntoIterator<Item = OsString>) -> Result<Self> {
        let mut args = args.into_iter();
        let mut parsed = CliArgs {
            base_dir: None,
            config_file: None,
            overrides: SyncOverrides::default(),
            json: false,
            verbose: false,
        };

        while let Some(arg_os) = args.next() {
            let arg = arg_os
                .into_string()
                .map_err(|_| anyhow!("argument is not valid UTF-8"))?;
            let overrides = &mut parsed.overrides;
            match arg.as_str() {
                "--build-dir" => set_once(&mut overrides.build_dir, path_value(&mut args, &arg)?, &arg)?,
                "--base-dir" => set_once(&mut parsed.base_dir, path_value(&mut args, &arg)?, &arg)?,
                "--module-root" => {
                    set_once(&mut overrides.module_root, path_value(&mut args, &arg)?, &arg)?
                }
                "--sources-output-dir" => set_once(
                    &mut overrides.sources_output_dir,
                    path_value(&mut args, &arg)?,
                    &arg,
                )?,
                "--resources-output-dir" => set_once(
                    &mut overrides.resources_output_dir,
                    path_value(&mut args, &arg)?,
                    &arg,
                )?,
                "--dependency-document" => set_once(
                    &mut overrides.dependency_document,
                    path_value(&mut args, &arg)?,
                    &arg,
                )?,
                "--metadata-file" => {
                    set_once(&mut overrides.metadata_file, path_value(&mut args, &arg)?, &arg)?
                }
                "--dsl-package" => {
                    set_once(&mut overrides.dsl_package, next_value(&mut args, &arg)?, &arg)?
                }
                "--factories-package" => set_once(
                    &mut overrides.factories_package,
                    next_value(&mut args, &arg)?,
                    &arg,
                )?,
                "--license-header" => {
                    set_once(&mut overrides.license_header, path_value(&mut args, &arg)?, &arg)?
                }
                "--config" => set_once(&mut parsed.config_file, path_value(&mut args, &arg)?, &arg)?,
                "--json" => parsed.json = true,
                "--verbose" | "-v" => parsed.verbose = true,
                "--help" | "-h" => {
                    print!("{}", usage());
                    std::process::exit(0);
                }
                other => bail!("unknown flag: {other}\n\n{}", usage()),
            }
        }

        Ok(parsed)
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T, flag: &str) -> Result<()> {
    if slot.is_some() {
        bail!("{flag} provided multiple times");
    }
    *slot = Some(value);
    Ok(())
}

fn next_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<String> {
    args.next()
        .map(|os| {
            os.into_string()
                .map_err(|_| anyhow!("value for {flag} is not valid UTF-8"))
        })
        .transpose()?
        .ok_or_else(|| anyhow!("missing value for {flag}"))
}

fn path_value(args: &mut impl Iterator<Item = OsString>, flag: &str) -> Result<PathBuf> {
    args.next()
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("missing value for {flag}"))
}

fn usage() -> &'static str {
    "Usage: dslsync [--build-dir DIR] [--base-dir DIR] [--module-root DIR]\n\
\x20              [--sources-output-dir DIR] [--resources-output-dir DIR]\n\
\x20              [--dependency-document POM] [--metadata-file FILE]\n\
\x20              [--dsl-package PKG] [--factories-package PKG]\n\
\x20              [--license-header FILE] [--config FILE.json] [--json] [--verbose]\n\
Regenerates component DSL builder factories, the metadata registry, and the pom\n\
component import section, writing only files whose content changed.\n\
Set DSLSYNC_LOG (e.g. DSLSYNC_LOG=debug) to control logging.\n"
}
