//! Builds and submits the one entry swap.

use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, U256};
use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use wasp_core::error::{Error, Result};
use wasp_core::types::{SwapReceipt, TradeOrder, TradePlan};
use wasp_core::utils::now_ms;
use wasp_dex::DexChain;

use crate::notifier::TelegramNotifier;

/// Fixed execution window; the router rejects the swap if it has not been
/// mined within this many seconds of submission.
pub const SWAP_DEADLINE_SECS: u64 = 60;

pub struct Buyer {
    chain: Arc<dyn DexChain>,
    plan: TradePlan,
    notifier: Option<TelegramNotifier>,
    attempted: AtomicBool,
}

impl Buyer {
    pub fn new(
        chain: Arc<dyn DexChain>,
        plan: TradePlan,
        notifier: Option<TelegramNotifier>,
    ) -> Self {
        Self {
            chain,
            plan,
            notifier,
            attempted: AtomicBool::new(false),
        }
    }

    /// Quotes, signs and submits the swap, then waits out confirmation.
    /// Returns `Ok(None)` without touching the chain when an attempt is
    /// already in flight or finished; only [`reset`](Self::reset) re-arms.
    pub async fn execute(&self) -> Result<Option<SwapReceipt>> {
        if self
            .attempted
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Ok(None);
        }

        let path = vec![self.plan.token_in, self.plan.token_out];
        let min_amount_out = self.min_amount_out(&path).await?;
        let deadline = U256::from(now_ms() / 1000 + SWAP_DEADLINE_SECS);
        let order = TradeOrder {
            amount_in: self.plan.amount_in,
            min_amount_out,
            path,
            recipient: self.plan.recipient,
            deadline,
            fee_on_transfer: self.plan.fee_on_transfer,
        };
        info!(
            amount_in = %format_ether(order.amount_in),
            min_out = %format_ether(order.min_amount_out),
            slippage_divisor = self.plan.slippage_divisor,
            gas_price_gwei = self.plan.gas_price_gwei,
            gas_limit = self.plan.gas_limit,
            path = ?order.path,
            "submitting entry swap"
        );
        self.notify_entry_submitted(&order);
        let receipt = self.chain.swap_exact_native(&order).await?;
        Ok(Some(receipt))
    }

    fn notify_entry_submitted(&self, order: &TradeOrder) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        let mut msg = String::new();
        let _ = writeln!(msg, "🚀 Entry submitted");
        let _ = writeln!(msg, "token: {}", self.plan.token_out);
        let _ = writeln!(msg, "amount_in: {}", format_ether(order.amount_in));
        let _ = writeln!(msg, "min_out: {}", format_ether(order.min_amount_out));
        notifier.notify(msg);
    }

    /// A divisor of zero disables protection entirely and skips the quote.
    /// Otherwise the floor is the quoted output minus `quoted / divisor`.
    async fn min_amount_out(&self, path: &[Address]) -> Result<U256> {
        if self.plan.slippage_divisor == 0 {
            return Ok(U256::ZERO);
        }
        let expected = self.chain.amounts_out(self.plan.amount_in, path).await?;
        let Some(expected_out) = expected.last().copied() else {
            return Err(Error::Quote {
                message: "router returned empty amounts".into(),
                code: None,
            });
        };
        Ok(expected_out - expected_out / U256::from(self.plan.slippage_divisor))
    }

    pub fn attempted(&self) -> bool {
        self.attempted.load(Ordering::SeqCst)
    }

    /// Re-arms the guard so a restarted cycle may buy again.
    pub fn reset(&self) {
        self.attempted.store(false, Ordering::SeqCst);
    }
}
