use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use reelvault::config::{self, Config};
use reelvault::server;
use reelvault::storage::{LocalMediaStore, MediaStore};

mod cli;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config::load_config(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => serve(config, host, port).await,
        Commands::CheckConfig => check_config(&config),
        Commands::CheckTools => check_tools(),
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "reelvault=debug,reelvault_db=debug,reelvault_av=debug,tower_http=debug"
    } else {
        "reelvault=info,tower_http=info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn serve(mut config: Config, host: Option<String>, port: Option<u16>) -> anyhow::Result<()> {
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    std::fs::create_dir_all(&config.storage.data_dir).with_context(|| {
        format!(
            "failed to create data directory {}",
            config.storage.data_dir.display()
        )
    })?;

    let store: Arc<dyn MediaStore> = Arc::new(LocalMediaStore::new(&config.storage.data_dir)?);

    let db_path = config.db_path();
    let db_path = db_path
        .to_str()
        .context("database path is not valid UTF-8")?;
    let db = reelvault_db::pool::init_pool(db_path)?;

    server::start_server(config, db, store).await
}

fn check_config(config: &Config) -> anyhow::Result<()> {
    println!("configuration OK");
    println!("  listen:    {}:{}", config.server.host, config.server.port);
    println!("  data dir:  {}", config.storage.data_dir.display());
    println!(
        "  max file:  {} MiB",
        config.upload.max_file_size_bytes / (1024 * 1024)
    );
    println!("  session ttl: {}s", config.upload.session_ttl_secs);
    Ok(())
}

fn check_tools() -> anyhow::Result<()> {
    let tools = reelvault_av::check_tools();
    let mut missing = false;

    for tool in &tools {
        if tool.available {
            println!(
                "{}: {} ({})",
                tool.name,
                tool.version.as_deref().unwrap_or("unknown version"),
                tool.path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default()
            );
        } else {
            println!("{}: NOT FOUND", tool.name);
            missing = true;
        }
    }

    if missing {
        anyhow::bail!("required media tools are missing");
    }
    Ok(())
}
