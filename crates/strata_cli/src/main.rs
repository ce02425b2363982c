//! STRATA CLI
//!
//! Assembles a stack from a configuration bundle and prints its manifest,
//! validation findings or creation order.

#![warn(missing_docs)]
#![warn(clippy::all)]

use clap::{Args, Parser, Subcommand, ValueEnum};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, eyre};
use console::style;
use std::path::{Path, PathBuf};
use strata_plan::{
    AssemblyConfig, ConfigBundle, DeploymentScope, Validator, assemble_with, naming, synthesize,
};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "strata=info";

#[derive(Parser)]
#[command(name = "strata")]
#[command(about = "STRATA - ordered resource assembly for cloud stacks", long_about = None)]
struct Cli {
    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    /// Human-readable lines
    Pretty,
    /// One JSON object per event
    Json,
}

#[derive(Debug, Args)]
struct ConfigArgs {
    /// Path to the configuration bundle
    #[arg(short, long, env = "STRATA_CONFIG")]
    config: PathBuf,
    /// Deployment environment, appended to the stack name
    #[arg(short, long)]
    env: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble the stack and write its manifest
    Synth {
        #[command(flatten)]
        config: ConfigArgs,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Assemble the stack and report validation findings
    Validate {
        #[command(flatten)]
        config: ConfigArgs,
        /// Maximum resource count (0 = no limit)
        #[arg(long, default_value_t = 0)]
        max_resources: usize,
    },
    /// Print the creation order
    Order {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn init_logging(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.init(),
    }
}

/// Load the bundle and assemble it into a fresh scope
fn plan(args: &ConfigArgs) -> Result<DeploymentScope> {
    let bundle = ConfigBundle::from_path(&args.config)?;
    let config = AssemblyConfig::from_bundle(&bundle)
        .wrap_err_with(|| format!("invalid configuration in {}", args.config.display()))?;

    let mut scope = DeploymentScope::new(naming::stack_name(&config.app_name, args.env.as_deref()));
    if let Some(env) = &args.env {
        scope = scope.with_environment(env.clone());
    }
    assemble_with(&mut scope, &config)?;
    Ok(scope)
}

fn check(scope: &DeploymentScope, validator: &Validator) -> Result<()> {
    if let Err(findings) = validator.validate(scope) {
        for finding in &findings {
            eprintln!("{} {}", style("✗").red(), finding);
        }
        return Err(eyre!(
            "{} failed validation with {} finding(s)",
            scope.name(),
            findings.len()
        ));
    }
    Ok(())
}

fn synth(args: &ConfigArgs, out: Option<&Path>) -> Result<()> {
    let scope = plan(args)?;
    check(&scope, &Validator::new())?;
    let manifest = synthesize(&scope)?;
    let text = manifest.to_json_pretty()?;

    match out {
        Some(path) => {
            std::fs::write(path, format!("{}\n", text))
                .wrap_err_with(|| format!("cannot write {}", path.display()))?;
            eprintln!(
                "{} {} ({} resources, digest {}) -> {}",
                style("✓").green(),
                manifest.stack,
                manifest.resources.len(),
                &manifest.digest[..16],
                path.display()
            );
        }
        None => println!("{}", text),
    }
    Ok(())
}

fn validate(args: &ConfigArgs, max_resources: usize) -> Result<()> {
    let scope = plan(args)?;
    check(&scope, &Validator::new().with_max_resources(max_resources))?;
    println!(
        "{} {} is valid ({} resources)",
        style("✓").green(),
        scope.name(),
        scope.len()
    );
    Ok(())
}

fn order(args: &ConfigArgs) -> Result<()> {
    let scope = plan(args)?;
    for (position, id) in scope.build_order()?.into_iter().enumerate() {
        let kind = scope.resource(id).map_or("?", |r| r.type_name());
        println!("{:>3}. {} {}", position + 1, id, style(kind).dim());
    }
    Ok(())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(cli.log_format);

    match cli.command {
        Commands::Synth { config, out } => synth(&config, out.as_deref()),
        Commands::Validate {
            config,
            max_resources,
        } => validate(&config, max_resources),
        Commands::Order { config } => order(&config),
    }
}
