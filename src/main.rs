use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use chad::application::errors::BotError;
use chad::application::messaging::CommandExecutor;
use chad::application::services::CommandService;
use chad::domain::traits::{Bot, CommandStore};
use chad::infrastructure::adapters::ConsoleAdapter;
use chad::infrastructure::config::Config;
use chad::infrastructure::database::SqliteCommandStore;
use chad::infrastructure::storage::MemoryCommandStore;

#[derive(Parser)]
#[command(name = "chad")]
#[command(about = "A chat command bot", long_about = None)]
struct Cli {
    /// Config file path
    config: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {}: {}", cli.config.display(), e);
            std::process::exit(1);
        }
    };

    // RUST_LOG wins over the config file
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(filter)
        .init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to start runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(run_bot(cli.config, config)) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run_bot(config_path: PathBuf, config: Config) -> Result<(), BotError> {
    tracing::info!("Starting {}", config.bot.name);

    let store: Arc<dyn CommandStore> = match &config.bot.database_file {
        Some(path) => {
            tracing::info!("Using command database {}", path.display());
            Arc::new(SqliteCommandStore::open(path)?)
        }
        None => {
            tracing::warn!("No database-file configured, added commands won't survive a restart");
            Arc::new(MemoryCommandStore::new())
        }
    };

    let service = CommandService::with_config_file(config_path, config.clone(), store);
    service.reload()?;
    let registry = service.registry();
    tracing::info!("Commands: {}", registry.names().join(", "));

    let executor = CommandExecutor::new(registry);

    if config.console.enabled {
        let bot = ConsoleAdapter::new(&config.bot.name, config.console.sender(), executor);
        let info = bot.bot_info();
        tracing::info!("Listening on {} as {}", info.id, info.name);
        bot.start().await?;
    } else {
        tracing::info!("No listener enabled, waiting for Ctrl-C");
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| BotError::Internal(format!("signal: {}", e)))?;
    }

    // privileged commands only hold a weak reference to the service
    drop(service);
    Ok(())
}
