use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ticketlens::cli::commands::{config as config_cmd, gaps, patterns, summary};
use ticketlens::config::{BackendKind, Config, ConfigLoader};
use ticketlens::source::RoleScope;

#[derive(Parser)]
#[command(name = "ticketlens")]
#[command(
    version,
    about = "AI-driven ITSM ticket analysis: recurring patterns and knowledge-base gaps"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, help = "Load configuration from this file only")]
    config: Option<PathBuf>,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect recurring issue patterns in recent tickets
    Patterns {
        #[arg(long, help = "Backend override: servicenow, jira, export")]
        backend: Option<BackendKind>,
        #[arg(long, help = "Analyze an export file (implies the export backend)")]
        export: Option<PathBuf>,
        #[arg(long, help = "Age cutoff in months")]
        months_back: Option<u32>,
        #[arg(long, help = "Minimum tickets for a pattern")]
        min_occurrences: Option<usize>,
        #[arg(long, help = "Only tickets mentioning this configuration item")]
        ci: Option<String>,
        #[arg(long, help = "Only tickets involving this user")]
        user: Option<String>,
        #[arg(
            long,
            default_value = "both",
            help = "Which roles the user filter matches: requester, assignee, both, all"
        )]
        role: RoleScope,
        #[arg(long, help = "Skip AI and use basic detection")]
        no_ai: bool,
        #[arg(long, short, help = "Write the report to a .json or .md file")]
        output: Option<PathBuf>,
    },

    /// Find knowledge-base gaps and draft articles to fill them
    Gaps {
        #[arg(long, help = "Backend override: servicenow, jira, export")]
        backend: Option<BackendKind>,
        #[arg(long, help = "Analyze an export file (implies the export backend)")]
        export: Option<PathBuf>,
        #[arg(long, help = "Age cutoff in months")]
        months_back: Option<u32>,
        #[arg(long, help = "Minimum tickets for a gap")]
        min_occurrences: Option<usize>,
        #[arg(long, help = "Skip AI and use basic detection")]
        no_ai: bool,
        #[arg(long, short, help = "Write the report to a .json or .md file")]
        output: Option<PathBuf>,
        #[arg(long, help = "Write one draft article file per gap into this directory")]
        drafts: Option<PathBuf>,
    },

    /// Summarize ticket activity for a configuration item or a user
    Summary {
        #[arg(long, help = "Backend override: servicenow, jira, export")]
        backend: Option<BackendKind>,
        #[arg(long, help = "Analyze an export file (implies the export backend)")]
        export: Option<PathBuf>,
        #[arg(long, help = "Configuration item to summarize")]
        ci: Option<String>,
        #[arg(long, help = "User to summarize")]
        user: Option<String>,
        #[arg(long, help = "Age cutoff in months")]
        months_back: Option<u32>,
        #[arg(long, help = "Skip AI and use the basic summary")]
        no_ai: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(long, help = "Output as JSON instead of TOML")]
        json: bool,
    },
    /// Show configuration file paths
    Path,
    /// Initialize a project configuration file
    Init {
        #[arg(long, short, help = "Overwrite an existing file")]
        force: bool,
    },
}

fn main() -> ExitCode {
    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", console::style("Error:").bold().red());
            ExitCode::FAILURE
        }
    }
}

fn run_cli() -> anyhow::Result<()> {
    let Cli {
        command,
        config: config_path,
        verbose,
        quiet,
    } = Cli::parse();

    let filter = if verbose {
        "debug"
    } else if quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // The config subcommand must work even when the current config file is
    // broken, so loading is deferred to the commands that analyze tickets
    let load_config = || -> anyhow::Result<Config> {
        Ok(match &config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load()?,
        })
    };

    let rt = Runtime::new()?;

    match command {
        Commands::Patterns {
            backend,
            export,
            months_back,
            min_occurrences,
            ci,
            user,
            role,
            no_ai,
            output,
        } => {
            let config = apply_source_overrides(load_config()?, backend, export);
            rt.block_on(patterns::run(
                &config,
                patterns::PatternsOptions {
                    months_back,
                    min_occurrences,
                    ci,
                    user,
                    role,
                    no_ai,
                    output,
                },
            ))?;
        }
        Commands::Gaps {
            backend,
            export,
            months_back,
            min_occurrences,
            no_ai,
            output,
            drafts,
        } => {
            let config = apply_source_overrides(load_config()?, backend, export);
            rt.block_on(gaps::run(
                &config,
                gaps::GapsOptions {
                    months_back,
                    min_occurrences,
                    no_ai,
                    output,
                    drafts_dir: drafts,
                },
            ))?;
        }
        Commands::Summary {
            backend,
            export,
            ci,
            user,
            months_back,
            no_ai,
        } => {
            let config = apply_source_overrides(load_config()?, backend, export);
            rt.block_on(summary::run(
                &config,
                summary::SummaryOptions {
                    ci,
                    user,
                    months_back,
                    no_ai,
                },
            ))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { json } => config_cmd::show(json)?,
            ConfigAction::Path => config_cmd::path(),
            ConfigAction::Init { force } => config_cmd::init(force)?,
        },
    }

    Ok(())
}

/// Apply per-invocation source overrides on top of the loaded config
fn apply_source_overrides(
    mut config: Config,
    backend: Option<BackendKind>,
    export: Option<PathBuf>,
) -> Config {
    if let Some(backend) = backend {
        config.source.backend = backend;
    }
    if let Some(path) = export {
        config.source.backend = BackendKind::Export;
        config.source.export_path = Some(path);
    }
    config
}
