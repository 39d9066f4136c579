//! Wires the monitor, the buyer and the recovery controller into the one
//! trade cycle the bot exists to run.

use crate::buyer::Buyer;
use crate::monitor::LiquidityMonitor;
use crate::notifier::TelegramNotifier;
use crate::recovery::RecoveryController;
use crate::status::{spawn_status_server, BotMetrics};
use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, U256};
use std::fmt::Write;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use wasp_chain::{connect_provider, NodeClient};
use wasp_core::config::AppConfig;
use wasp_core::error::{Error, Result};
use wasp_core::modes::RecoveryMode;
use wasp_core::types::{PollOutcome, RestartDecision, SwapReceipt, TradePlan};
use wasp_core::utils::{parse_address, parse_amount_18};
use wasp_dex::{DexChain, DexClient, FixedGas};

/// Lets the notifier queue drain before the process exits on success.
const SUCCESS_FLUSH_DELAY_MS: u64 = 2_000;

/// How a run ended. `Stopped` is a clean shutdown, not an error; config
/// and startup failures surface as `Err` from [`Bot::new`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotOutcome {
    /// The entry swap confirmed on chain.
    Completed(SwapReceipt),
    /// The run ended without a position (restart declined or buy skipped).
    Stopped,
}

/// Config addresses and amounts, parsed once at startup so every later
/// failure is a chain problem rather than a typo.
#[derive(Debug)]
struct ResolvedTargets {
    factory: Address,
    router: Address,
    token_in: Address,
    token_out: Address,
    recipient: Address,
    amount_in: U256,
    min_liquidity: U256,
}

fn resolve(cfg: &AppConfig) -> Result<ResolvedTargets> {
    let factory = config_address(&cfg.dex.factory, "dex.factory")?;
    let router = config_address(&cfg.dex.router, "dex.router")?;
    let token_in = config_address(&cfg.dex.token_in, "dex.token_in")?;
    let token_out = config_address(&cfg.dex.token_out, "dex.token_out")?;
    let recipient = config_address(&cfg.trade.recipient, "trade.recipient")?;
    let amount_in = config_amount(&cfg.trade.amount_in, "trade.amount_in")?;
    let min_liquidity = if cfg.monitor.enabled {
        config_amount(&cfg.monitor.min_liquidity, "monitor.min_liquidity")?
    } else {
        U256::ZERO
    };
    Ok(ResolvedTargets {
        factory,
        router,
        token_in,
        token_out,
        recipient,
        amount_in,
        min_liquidity,
    })
}

fn config_address(raw: &str, field: &str) -> Result<Address> {
    let addr =
        parse_address(raw).map_err(|err| Error::InvalidConfig(format!("{field}: {err}")))?;
    if addr == Address::ZERO {
        return Err(Error::InvalidConfig(format!("{field}: zero address")));
    }
    Ok(addr)
}

fn config_amount(raw: &str, field: &str) -> Result<U256> {
    parse_amount_18(raw).map_err(|err| Error::InvalidConfig(format!("{field}: {err}")))
}

pub struct Bot {
    monitor: Option<LiquidityMonitor>,
    buyer: Buyer,
    recovery: RecoveryController,
    notifier: Option<TelegramNotifier>,
    metrics: Arc<BotMetrics>,
    explorer_tx_base: String,
    token_out: Address,
}

impl Bot {
    pub async fn new(cfg: AppConfig) -> Result<Self> {
        let targets = resolve(&cfg)?;
        let node = NodeClient::connect(&cfg.chain).await?;
        let client = DexClient::new(
            node.provider.clone(),
            targets.factory,
            targets.router,
            FixedGas {
                gas_price_gwei: cfg.trade.gas_price_gwei,
                gas_limit: cfg.trade.gas_limit,
            },
            Duration::from_millis(cfg.executor.receipt_poll_interval_ms),
            Duration::from_millis(cfg.executor.receipt_timeout_ms),
        );
        let chain: Arc<dyn DexChain> = Arc::new(client);

        let metrics = Arc::new(BotMetrics::new()?);
        spawn_status_server(cfg.observability.status_port, targets.token_out, metrics.clone())
            .map_err(|err| {
                Error::InvalidConfig(format!(
                    "status listener on port {}: {err}",
                    cfg.observability.status_port
                ))
            })?;

        let notifier = TelegramNotifier::from_env();
        if notifier.is_some() {
            info!("telegram notifier enabled");
        }

        let mode = RecoveryMode::parse(&cfg.recovery.mode)?;
        let recovery = RecoveryController::from_mode(
            mode,
            cfg.recovery.max_auto_restarts,
            Some(metrics.clone()),
            notifier.clone(),
        );

        let monitor = cfg.monitor.enabled.then(|| {
            LiquidityMonitor::new(
                chain.clone(),
                targets.token_in,
                targets.token_out,
                targets.min_liquidity,
                Duration::from_millis(cfg.monitor.poll_interval_ms),
                Some(metrics.clone()),
            )
        });

        let plan = TradePlan {
            token_in: targets.token_in,
            token_out: targets.token_out,
            amount_in: targets.amount_in,
            slippage_divisor: cfg.trade.slippage_divisor,
            recipient: targets.recipient,
            fee_on_transfer: cfg.trade.fee_on_transfer,
            gas_price_gwei: cfg.trade.gas_price_gwei,
            gas_limit: cfg.trade.gas_limit,
        };
        let buyer = Buyer::new(chain, plan, notifier.clone());

        Ok(Self {
            monitor,
            buyer,
            recovery,
            notifier,
            metrics,
            explorer_tx_base: cfg.observability.explorer_tx_base,
            token_out: targets.token_out,
        })
    }

    /// Runs trade cycles until one confirms or the recovery controller
    /// declines a restart.
    pub async fn run(&self) -> Result<BotOutcome> {
        info!(token = %self.token_out, "entering trade cycle");
        loop {
            match self.cycle().await {
                Ok(Some(receipt)) => {
                    self.report_success(&receipt);
                    tokio::time::sleep(Duration::from_millis(SUCCESS_FLUSH_DELAY_MS)).await;
                    return Ok(BotOutcome::Completed(receipt));
                }
                Ok(None) => {
                    warn!("entry already attempted; nothing left to do");
                    return Ok(BotOutcome::Stopped);
                }
                Err(err) => match self.recovery.handle(&err).await {
                    RestartDecision::Restart => self.buyer.reset(),
                    RestartDecision::Terminate => return Ok(BotOutcome::Stopped),
                },
            }
        }
    }

    async fn cycle(&self) -> Result<Option<SwapReceipt>> {
        if let Some(monitor) = &self.monitor {
            let (pair, balance) = monitor.wait_for_liquidity().await;
            info!(%pair, balance = %format_ether(balance), "liquidity target reached; buying");
        } else {
            info!("liquidity monitor disabled; buying immediately");
        }
        self.buyer.execute().await
    }

    fn report_success(&self, receipt: &SwapReceipt) {
        let link = format!("{}{}", self.explorer_tx_base, receipt.tx_hash);
        info!(
            tx_hash = %receipt.tx_hash,
            block = receipt.block_number,
            gas_used = receipt.gas_used,
            link = %link,
            "entry confirmed"
        );
        self.metrics.purchases_total.inc();
        self.notify_entry_confirmed(receipt, &link);
    }

    fn notify_entry_confirmed(&self, receipt: &SwapReceipt, link: &str) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        let mut msg = String::new();
        let _ = writeln!(msg, "✅ Entry confirmed");
        let _ = writeln!(msg, "token: {}", self.token_out);
        let _ = writeln!(msg, "block: {}", receipt.block_number);
        let _ = writeln!(msg, "tx: {link}");
        notifier.notify(msg);
    }

    #[cfg(test)]
    fn assemble(
        monitor: Option<LiquidityMonitor>,
        buyer: Buyer,
        recovery: RecoveryController,
        metrics: Arc<BotMetrics>,
    ) -> Self {
        Self {
            monitor,
            buyer,
            recovery,
            notifier: None,
            metrics,
            explorer_tx_base: "https://bscscan.com/tx/".to_string(),
            token_out: Address::ZERO,
        }
    }
}

/// One factory/pool reading with the live config, without a signer.
/// Backs the `check-liquidity` subcommand.
pub async fn probe_liquidity(cfg: &AppConfig) -> Result<PollOutcome> {
    let targets = resolve(cfg)?;
    let provider = connect_provider(&cfg.chain).await?;
    let client = DexClient::new(
        provider,
        targets.factory,
        targets.router,
        FixedGas {
            gas_price_gwei: cfg.trade.gas_price_gwei,
            gas_limit: cfg.trade.gas_limit,
        },
        Duration::from_millis(cfg.executor.receipt_poll_interval_ms),
        Duration::from_millis(cfg.executor.receipt_timeout_ms),
    );
    let monitor = LiquidityMonitor::new(
        Arc::new(client),
        targets.token_in,
        targets.token_out,
        targets.min_liquidity,
        Duration::from_millis(cfg.monitor.poll_interval_ms),
        None,
    );
    monitor.poll_once().await
}
