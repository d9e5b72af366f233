//! RwSplit - Read/Write-Splitting Routing Rules
//!
//! Command line front-end for inspecting read/write-splitting configurations
//! and simulating routing decisions.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rwsplit::algorithm::AlgorithmRegistry;
use rwsplit::config::RwSplitConfig;
use rwsplit::error::Result;
use rwsplit::rule::{OperationKind, ReadWriteSplittingRule, RuleChangedEvent};

/// RwSplit - Read/Write-Splitting Routing Rules
#[derive(Parser)]
#[command(name = "rwsplit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "rwsplit.toml")]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "rwsplit.toml")]
        output: PathBuf,
    },

    /// Validate configuration file and build the rule
    Validate,

    /// Resolve routing targets for a logical group
    Route {
        /// Logical group name (defaults to the first configured group)
        #[arg(short, long)]
        group: Option<String>,

        /// Number of operations to route
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        /// Route writes instead of reads
        #[arg(long)]
        write: bool,

        /// Physical data sources to mark disabled before routing
        #[arg(short, long)]
        disable: Vec<String>,
    },

    /// Print the physical to logical data source mapping as JSON
    Mapping,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { output } => {
            init_logging(cli.log_level.as_deref().unwrap_or("info"), "pretty");
            run_init(output)
        }
        Commands::Validate => {
            let config = load_config(&cli.config, cli.log_level.as_deref())?;
            run_validate(&config)
        }
        Commands::Route {
            group,
            count,
            write,
            disable,
        } => {
            let config = load_config(&cli.config, cli.log_level.as_deref())?;
            let kind = if write { OperationKind::Write } else { OperationKind::Read };
            run_route(&config, group.as_deref(), count, kind, &disable)
        }
        Commands::Mapping => {
            let config = load_config(&cli.config, cli.log_level.as_deref())?;
            run_mapping(&config)
        }
    }
}

/// Initialize logging
fn init_logging(level: &str, format: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level.into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if format == "compact" {
        registry
            .with(tracing_subscriber::fmt::layer().compact())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Load configuration and initialize logging from it
fn load_config(path: &Path, log_level: Option<&str>) -> Result<RwSplitConfig> {
    match RwSplitConfig::from_file(path) {
        Ok(config) => {
            init_logging(
                log_level.unwrap_or(&config.logging.level),
                &config.logging.format,
            );
            tracing::debug!("Loaded configuration from {:?}", path);
            Ok(config)
        }
        Err(e) => {
            init_logging(log_level.unwrap_or("info"), "pretty");
            tracing::error!("Failed to load configuration from {:?}: {}", path, e);
            Err(e)
        }
    }
}

fn build_rule(config: &RwSplitConfig) -> Result<ReadWriteSplittingRule> {
    let registry = AlgorithmRegistry::builtin();
    ReadWriteSplittingRule::new(&config.rule, &registry).map_err(|e| {
        tracing::error!("Failed to build read/write-splitting rule: {}", e);
        e
    })
}

/// Write a sample configuration file
fn run_init(output: PathBuf) -> Result<()> {
    if output.exists() {
        tracing::error!("Configuration file {:?} already exists", output);
        return Err(rwsplit::Error::Config(format!(
            "{} already exists",
            output.display()
        )));
    }

    std::fs::write(&output, RwSplitConfig::sample())?;
    println!("Configuration written to {}", output.display());
    Ok(())
}

/// Validate the configuration and print a summary of each group
fn run_validate(config: &RwSplitConfig) -> Result<()> {
    let rule = build_rule(config)?;

    println!("Configuration is valid");
    for group in rule.groups() {
        println!(
            "  {} -> write: {}, reads: [{}], load balancer: {}",
            group.name(),
            group.write_data_source_name(),
            group.read_data_source_names().join(", "),
            group.load_balancer().type_name()
        );
    }
    Ok(())
}

/// Simulate routing a number of operations on one group
fn run_route(
    config: &RwSplitConfig,
    group: Option<&str>,
    count: usize,
    kind: OperationKind,
    disable: &[String],
) -> Result<()> {
    let rule = build_rule(config)?;

    for name in disable {
        if rule.apply_health_event(&RuleChangedEvent::disabled(name.as_str())) == 0 {
            tracing::warn!("Data source {} is not part of any group", name);
        }
    }

    let group = match group {
        Some(name) => name.to_string(),
        None => rule.single_group().name().to_string(),
    };

    for i in 0..count {
        let target = rule.route(&group, kind)?;
        println!("{:>4}  {} {} -> {}", i + 1, group, kind, target);
    }
    Ok(())
}

/// Print which logical groups reference each physical data source
fn run_mapping(config: &RwSplitConfig) -> Result<()> {
    let rule = build_rule(config)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&rule.physical_to_logical_mapping())?
    );
    Ok(())
}
