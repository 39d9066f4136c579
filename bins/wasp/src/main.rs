use alloy::primitives::utils::format_ether;
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use wasp_bot::{probe_liquidity, Bot, BotOutcome};
use wasp_core::config::AppConfig;
use wasp_core::types::PollOutcome;

#[derive(Parser)]
#[command(name = "wasp", version, about = "Single-pair DEX liquidity sniper")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Run {
        #[arg(short, long, default_value = "config/wasp.toml")]
        config: String,
    },
    CheckLiquidity {
        #[arg(short, long, default_value = "config/wasp.toml")]
        config: String,
    },
    PrintConfig {
        #[arg(short, long, default_value = "config/wasp.toml")]
        config: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Run { config } => {
            let cfg = AppConfig::load(&config)?;
            init_tracing(&cfg.observability.log_level);
            let bot = Bot::new(cfg).await?;
            match bot.run().await? {
                BotOutcome::Completed(receipt) => {
                    info!(tx_hash = %receipt.tx_hash, "position opened");
                }
                BotOutcome::Stopped => {
                    info!("no position opened");
                }
            }
        }
        Commands::CheckLiquidity { config } => {
            let cfg = AppConfig::load(&config)?;
            init_tracing(&cfg.observability.log_level);
            match probe_liquidity(&cfg).await? {
                PollOutcome::Sufficient { pair, balance } => {
                    println!(
                        "pair {pair}: {} in pool, above threshold",
                        format_ether(balance)
                    );
                }
                PollOutcome::Insufficient { balance } => {
                    println!("{} in pool, at or below threshold", format_ether(balance));
                }
                PollOutcome::PairMissing => {
                    println!("pair not created yet");
                }
            }
        }
        Commands::PrintConfig { config } => {
            let cfg = AppConfig::load(&config)?;
            init_tracing(&cfg.observability.log_level);
            let json = serde_json::to_string_pretty(&cfg)?;
            println!("{json}");
        }
    }

    info!("done");
    Ok(())
}

fn init_tracing(log_level: &str) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(value) => EnvFilter::try_new(value).unwrap_or_else(|_| EnvFilter::new("info")),
        Err(_) => EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
