use anyhow::{Context, Result};
use clap::Parser;
use perfguard::cli::{Cli, Command, OutputFormat};
use perfguard::config::DegradationConfig;
use perfguard::pairing::{degradation_between_files, MethodSelector};
use perfguard::profile::Profile;
use perfguard::report;
use perfguard::strategy::StrategyRegistry;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn load_config(path: Option<&Path>) -> Result<DegradationConfig> {
    match path {
        Some(path) => DegradationConfig::from_toml(path)
            .with_context(|| format!("failed to load configuration {}", path.display())),
        None => Ok(DegradationConfig::default()),
    }
}

fn check_profiles(
    baseline: PathBuf,
    target: PathBuf,
    method: &str,
    minor: &str,
    config: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let selector: MethodSelector = method.parse()?;
    let registry = StrategyRegistry::new(&config.thresholds);

    let baseline_profile = Profile::from_json_file(&baseline)?;
    let target_profile = Profile::from_json_file(&target)?;
    let results =
        degradation_between_files(&registry, &baseline_profile, &target_profile, minor, selector)?;

    match format {
        OutputFormat::Text => {
            for info in &results {
                println!("{}", report::format_info(info));
            }
            println!("{}", report::short_summary(&results));
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    // Initialize tracing if --debug flag is set
    init_tracing(args.debug);

    match args.command {
        Command::CheckProfiles {
            baseline,
            target,
            method,
            minor,
            config,
            format,
        } => check_profiles(baseline, target, &method, &minor, config, format),
        Command::Methods => {
            for method in StrategyRegistry::default().supported_methods() {
                println!("{}", method);
            }
            Ok(())
        }
    }
}
