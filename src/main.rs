mod api;
mod gateway;
mod seed;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vitae_core::config::{self, shellexpand, Config};
use vitae_memory::Store;
use vitae_providers::{openrouter::has_usable_key, ProviderChain};

use crate::gateway::Gateway;

#[derive(Parser)]
#[command(
    name = "vitae",
    version,
    about = "Vitae: a portfolio agent that answers questions about your work"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml", env = "VITAE_CONFIG")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API.
    Serve,
    /// Show configured providers and store health.
    Status,
    /// Ask one question on behalf of a user and print the answer.
    Ask {
        /// Profile owner the agent speaks for.
        #[arg(short, long)]
        user: i64,
        /// The visitor's message.
        #[arg(trailing_var_arg = true, required = true)]
        message: Vec<String>,
    },
    /// Load a profile TOML file into the store.
    Seed {
        #[arg(short, long)]
        user: i64,
        #[arg(short, long)]
        file: String,
    },
}

/// Log to stderr and to `{data_dir}/logs/vitae.log`. `RUST_LOG` wins over the
/// configured level.
fn init_logging(cfg: &Config) -> anyhow::Result<WorkerGuard> {
    let logs_dir = Path::new(&shellexpand(&cfg.vitae.data_dir)).join("logs");
    std::fs::create_dir_all(&logs_dir)
        .with_context(|| format!("failed to create {}", logs_dir.display()))?;

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(&logs_dir, "vitae.log"));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.vitae.log_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    Ok(guard)
}

fn build_gateway(cfg: &Config, store: Store) -> anyhow::Result<Gateway> {
    let chain = ProviderChain::from_config(&cfg.provider)?;
    let store = Arc::new(store);
    Ok(Gateway::new(store.clone(), store, Arc::new(chain)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load(&cli.config)?;
    let _log_guard = init_logging(&cfg)?;

    match cli.command {
        Commands::Serve => {
            let store = Store::new(&cfg.memory).await?;
            let gateway = build_gateway(&cfg, store)?;
            tracing::info!(
                "{} starting, provider chain: {}",
                cfg.vitae.name,
                gateway.stage_names().join(" -> ")
            );
            api::serve(&cfg.api, gateway).await?;
        }
        Commands::Status => {
            println!("{} status", cfg.vitae.name);
            println!("  config:  {}", cli.config);
            println!("  db:      {}", shellexpand(&cfg.memory.db_path));

            let chain = ProviderChain::from_config(&cfg.provider)?;
            println!("  chain:   {}", chain.stage_names().join(" -> "));
            let or = &cfg.provider.openrouter;
            println!(
                "  openrouter:  enabled={} key={} model={}",
                or.enabled,
                if has_usable_key(&or.api_key) { "ok" } else { "missing" },
                or.model
            );
            let hf = &cfg.provider.huggingface;
            println!(
                "  huggingface: enabled={} key={} model={}",
                hf.enabled,
                if hf.api_key.trim().is_empty() { "missing" } else { "ok" },
                hf.model
            );

            match Store::open_existing(&cfg.memory).await {
                Ok(store) => match store.ping().await {
                    Ok(()) => println!("  store:   ok"),
                    Err(e) => println!("  store:   error ({e})"),
                },
                Err(e) => println!("  store:   error ({e})"),
            }
        }
        Commands::Ask { user, message } => {
            let store = Store::new(&cfg.memory).await?;
            let gateway = build_gateway(&cfg, store)?;
            let reply = gateway
                .handle_chat_message(user, &message.join(" "))
                .await?;
            println!("{}", reply.response);
        }
        Commands::Seed { user, file } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("failed to read {file}"))?;
            let profile = seed::parse_seed(&content)?;
            let store = Store::new(&cfg.memory).await?;
            let summary = seed::seed_profile(&store, user, profile).await?;
            println!(
                "Seeded user {user}: {} projects, {} connections",
                summary.projects, summary.connections
            );
        }
    }

    Ok(())
}
