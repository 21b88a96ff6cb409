use anyhow::{Context, Result};
use clap::Parser;
use flows::bootstrap::SandboxNetwork;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod script;

#[derive(Parser, Debug)]
#[command(name = "sandbox-init")]
#[command(about = "Starts an in-memory ticket network and runs a script of ticket operations")]
struct Cli {
    /// Path to the config file (default: config/config.toml)
    #[arg(long)]
    config_file: Option<PathBuf>,

    /// Script of operations to run once the nodes are up
    #[arg(long)]
    script: Option<PathBuf>,

    /// Stop at the first failing step
    #[arg(long)]
    fail_fast: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config_file {
        Some(path) => config::read_config(path)?,
        None => config::read_config_from_toml()?,
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .with_context(|| format!("invalid log level '{}'", config.logging.level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting sandbox-init");
    let network = SandboxNetwork::new();
    let mut nodes = BTreeMap::new();
    for node in &config.nodes {
        let running = network
            .start_with_policy(&node.name, node.responder.clone())
            .await?;
        // Responder outcomes are logged; nothing here reads them.
        running.discard_responder_outcomes().await;
        nodes.insert(node.name.clone(), running);
    }
    info!(nodes = ?nodes.keys().collect::<Vec<_>>(), "Network is up");

    match &cli.script {
        Some(path) => {
            let script = script::read_script(path)?;
            info!(steps = script.steps.len(), script = %path.display(), "Running script");
            let report = script::run_script(&nodes, &script, cli.fail_fast).await?;
            info!(
                succeeded = report.succeeded,
                failed = report.failed,
                "Script finished"
            );
        }
        None => {
            info!("No script given. Press Ctrl+C to stop.");
            tokio::signal::ctrl_c().await?;
            info!("Shutting down...");
        }
    }
    Ok(())
}
