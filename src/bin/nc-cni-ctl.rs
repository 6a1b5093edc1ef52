use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use nc_cni::config::load_flat_conf;
use nc_cni::{
    InterfaceOutcome, NcConfig, NcError, NetworkContainerManager, NetworkContainerRequest,
    PodSandbox,
};

/// Drive the CNI plugin for network container interfaces
#[derive(Parser)]
#[clap(name = "nc-cni-ctl", author, version, about)]
struct Cli {
    /// JSON configuration file
    #[clap(long)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[clap(short, long)]
    verbose: bool,

    /// Subcommand to execute
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Update the interface of an existing network container
    Update {
        /// Network container request (JSON)
        #[clap(long)]
        request: PathBuf,

        /// Pod sandbox container ID
        #[clap(long, default_value = "")]
        sandbox_id: String,

        /// Pod network namespace path
        #[clap(long, default_value = "")]
        netns: String,
    },

    /// Print the flattened network configuration
    Flatten {
        /// Network configuration list, defaults to the configured one
        #[clap(long)]
        conflist: Option<PathBuf>,
    },

    /// Delete the interface of a network container (a no-op on this platform)
    Delete {
        /// Network container ID
        #[clap(long)]
        id: String,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<NcConfig> {
    let config = match path {
        Some(path) => NcConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => NcConfig::default(),
    };
    config.apply_env().context("Invalid environment override")
}

fn report_plugin_error(err: &NcError) {
    if let NcError::Plugin(plugin_err) = err {
        match serde_json::to_string(plugin_err) {
            Ok(json) => eprintln!("{}", json),
            Err(e) => error!("Failed to encode plugin error: {}", e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set default subscriber")?;

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Update { request, sandbox_id, netns } => {
            let content = fs::read(&request)
                .with_context(|| format!("Failed to read request {}", request.display()))?;
            let request: NetworkContainerRequest = serde_json::from_slice(&content)
                .context("Failed to parse network container request")?;
            let sandbox = PodSandbox::new(sandbox_id, netns);
            let manager = NetworkContainerManager::new(config);

            let result = tokio::task::spawn_blocking(move || {
                manager.create_or_update_interface(&request, &sandbox)
            })
            .await
            .context("Plugin worker failed")?;

            match result {
                Ok(InterfaceOutcome::Updated) => println!("Interface updated"),
                Ok(InterfaceOutcome::Skipped(reason)) => println!("Skipped: {:?}", reason),
                Err(err) => {
                    report_plugin_error(&err);
                    return Err(err.into());
                }
            }
        }

        Commands::Flatten { conflist } => {
            let path = conflist.unwrap_or_else(|| config.conflist_path.clone());
            let flat = load_flat_conf(&path)
                .with_context(|| format!("Failed to flatten {}", path.display()))?;
            println!("{}", String::from_utf8_lossy(&flat));
        }

        Commands::Delete { id } => {
            let manager = NetworkContainerManager::new(config);
            manager.delete_interface(&id)?;
            println!("Nothing to delete for {}: interface removal is a no-op", id);
        }
    }

    Ok(())
}
