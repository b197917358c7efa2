//! odis-compare: structured comparison of ODIS diagnostic snapshots
//!
//! Compares two ODIS protocol XML exports ECU by ECU and reports missing
//! ECUs, records, fields and changed values.

#![allow(clippy::needless_pass_by_value)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use odis_compare::{
    cli,
    config::{
        AppConfig, BehaviorConfig, CompareConfig, CompareInput, ComparisonConfig,
        ComparisonOption, ConfigPreset, OutputConfig, CONFIG_DIR_NAME, CONFIG_FILE_NAMES,
    },
    model::FieldKind,
    pipeline::exit_codes,
    reports::ReportFormat,
};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "odis-compare")]
#[command(version)]
#[command(about = "Compare ODIS diagnostic snapshots ECU by ECU", long_about = None)]
#[command(after_help = "EXIT CODES:
    0  No differences found (or --fail-on-difference not set)
    1  Differences found with --fail-on-difference
    3  Error occurred

EXAMPLES:
    # Compare two snapshots, write JSON and Markdown reports
    odis-compare compare before.xml after.xml

    # Only look at the gateway and the instrument cluster
    odis-compare compare before.xml after.xml -e 0019,0017 -f summary

    # Re-render a stored result without missing-in-first entries
    odis-compare compare --input-json OdisCompare_2024-03-07T14_05_09_1234.json \\
        -c differences,missing-in-second -f markdown")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Disable colored output (also respects `NO_COLOR` env)
    #[arg(long, global = true)]
    no_color: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "ODIS_COMPARE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Arguments for the `compare` subcommand
#[derive(Parser)]
struct CompareArgs {
    /// First (reference) ODIS snapshot
    #[arg(required_unless_present = "input_json", conflicts_with = "input_json")]
    first: Option<PathBuf>,

    /// Second ODIS snapshot
    #[arg(required_unless_present = "input_json", conflicts_with = "input_json")]
    second: Option<PathBuf>,

    /// Reload a stored JSON result instead of comparing snapshots
    #[arg(long, value_name = "RESULT.json")]
    input_json: Option<PathBuf>,

    /// Only compare ECUs whose id contains one of these tokens
    #[arg(short, long, value_delimiter = ',')]
    ecus: Vec<String>,

    /// Reported difference kinds (default: all)
    #[arg(short, long = "comparison-options", value_delimiter = ',', value_enum)]
    comparison_options: Vec<ComparisonOption>,

    /// Fields that never produce a difference (default: display-name,ti-value)
    #[arg(short, long, value_delimiter = ',', value_enum, conflicts_with = "no_bypass")]
    bypass: Vec<FieldKind>,

    /// Compare every field, including display names and typed values
    #[arg(long)]
    no_bypass: bool,

    /// Report formats (default: json,markdown)
    #[arg(short, long = "format", value_delimiter = ',', value_enum)]
    formats: Vec<ReportFormat>,

    /// Output folder or file stem
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write one report per ECU (not applied to JSON)
    #[arg(short, long)]
    split_by_ecu: bool,

    /// Compare ECU pairs on the calling thread only
    #[arg(long)]
    no_parallel: bool,

    /// Exit with code 1 if any difference is found
    #[arg(long)]
    fail_on_difference: bool,

    /// Start from a named configuration preset
    #[arg(long, value_enum)]
    preset: Option<ConfigPreset>,
}

impl CompareArgs {
    fn input(&self) -> Result<CompareInput> {
        if let Some(path) = &self.input_json {
            return Ok(CompareInput::Results(path.clone()));
        }
        match (&self.first, &self.second) {
            (Some(first), Some(second)) => Ok(CompareInput::Snapshots {
                first: first.clone(),
                second: second.clone(),
            }),
            _ => anyhow::bail!("two snapshots or --input-json are required"),
        }
    }

    /// Config values given on the command line; defaults mean "not set".
    fn overrides(&self, global: &Cli) -> AppConfig {
        let defaults = ComparisonConfig::default();
        AppConfig {
            comparison: ComparisonConfig {
                options: self.comparison_options.clone(),
                bypass: if self.no_bypass {
                    Vec::new()
                } else if self.bypass.is_empty() {
                    defaults.bypass
                } else {
                    self.bypass.clone()
                },
                ecus: self.ecus.clone(),
                parallel: !self.no_parallel,
            },
            output: OutputConfig {
                formats: if self.formats.is_empty() {
                    OutputConfig::default().formats
                } else {
                    self.formats.clone()
                },
                path: self.output.clone(),
                split_by_ecu: self.split_by_ecu,
                no_color: global.no_color,
            },
            behavior: BehaviorConfig {
                fail_on_difference: self.fail_on_difference,
                quiet: global.quiet,
            },
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two ODIS snapshots (or reload a stored result)
    Compare(CompareArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Generate JSON Schema for the config file format
    ConfigSchema {
        /// Write schema to file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show, discover, or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Sub-subcommands for the `config` command
#[derive(Subcommand)]
enum ConfigAction {
    /// Print current effective configuration (merged from defaults + file)
    Show,
    /// Print config file search paths and discovered config file
    Path,
    /// Generate an example .odis-compare.yaml in the current directory
    Init,
}

fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(code) => {
            if code != exit_codes::SUCCESS {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_codes::ERROR);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    match &cli.command {
        Commands::Compare(args) => {
            let (mut app, loaded_from) = odis_compare::config::load_or_default(cli.config.as_deref());
            if let Some(path) = &loaded_from {
                tracing::info!("Using config file {}", path.display());
            }
            if let Some(preset) = args.preset {
                tracing::info!("Applying preset '{}': {}", preset, preset.description());
                app.merge(&AppConfig::from_preset(preset));
            }
            app.merge(&args.overrides(&cli));

            cli::run_compare(CompareConfig::new(args.input()?, app))
        }

        Commands::Completions { shell } => {
            generate(*shell, &mut Cli::command(), "odis-compare", &mut io::stdout());
            Ok(exit_codes::SUCCESS)
        }

        Commands::ConfigSchema { output } => {
            let schema = odis_compare::config::generate_json_schema()
                .context("failed to serialize config schema")?;
            match output {
                Some(path) => {
                    std::fs::write(path, &schema)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    eprintln!("Schema written to {}", path.display());
                }
                None => {
                    println!("{schema}");
                }
            }
            Ok(exit_codes::SUCCESS)
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let (config, loaded_from) =
                    odis_compare::config::load_or_default(cli.config.as_deref());
                if let Some(path) = &loaded_from {
                    eprintln!("# Loaded from: {}", path.display());
                } else {
                    eprintln!("# No config file found; showing defaults");
                }
                let yaml = serde_yaml::to_string(&config).context("failed to serialize config")?;
                print!("{yaml}");
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Path => {
                let search_paths: [Option<String>; 3] = [
                    std::env::current_dir()
                        .ok()
                        .map(|p| p.display().to_string()),
                    dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME).display().to_string()),
                    dirs::home_dir().map(|p| p.display().to_string()),
                ];
                eprintln!("Config file search paths (in order):");
                for path in search_paths.into_iter().flatten() {
                    eprintln!("  {path}");
                }
                eprintln!();
                eprintln!("Recognized file names:");
                for name in CONFIG_FILE_NAMES {
                    eprintln!("  {name}");
                }
                eprintln!();
                match odis_compare::config::discover_config_file(cli.config.as_deref()) {
                    Some(path) => eprintln!("Active config file: {}", path.display()),
                    None => eprintln!("No config file found."),
                }
                Ok(exit_codes::SUCCESS)
            }
            ConfigAction::Init => {
                let target = std::env::current_dir()
                    .context("cannot determine current directory")?
                    .join(".odis-compare.yaml");
                if target.exists() {
                    anyhow::bail!(
                        "{} already exists. Remove it first to re-initialize.",
                        target.display()
                    );
                }
                let content = odis_compare::config::generate_full_example_config();
                std::fs::write(&target, content)
                    .with_context(|| format!("failed to write {}", target.display()))?;
                eprintln!("Created {}", target.display());
                Ok(exit_codes::SUCCESS)
            }
        },
    }
}
