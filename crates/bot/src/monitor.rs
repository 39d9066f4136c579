//! Polls the factory and the pool until the target pair holds enough
//! liquidity to enter.

use alloy::primitives::utils::format_ether;
use alloy::primitives::{Address, U256};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use wasp_core::error::Result;
use wasp_core::types::PollOutcome;
use wasp_dex::DexChain;

use crate::status::BotMetrics;

pub struct LiquidityMonitor {
    chain: Arc<dyn DexChain>,
    token_in: Address,
    token_out: Address,
    min_liquidity: U256,
    poll_interval: Duration,
    metrics: Option<Arc<BotMetrics>>,
}

impl LiquidityMonitor {
    pub fn new(
        chain: Arc<dyn DexChain>,
        token_in: Address,
        token_out: Address,
        min_liquidity: U256,
        poll_interval: Duration,
        metrics: Option<Arc<BotMetrics>>,
    ) -> Self {
        Self {
            chain,
            token_in,
            token_out,
            min_liquidity,
            poll_interval,
            metrics,
        }
    }

    /// One factory/pool round trip. The pool counts as ready only when its
    /// input-token balance is strictly above the configured threshold.
    pub async fn poll_once(&self) -> Result<PollOutcome> {
        let Some(pair) = self
            .chain
            .pair_address(self.token_in, self.token_out)
            .await?
        else {
            return Ok(PollOutcome::PairMissing);
        };
        let balance = self.chain.token_balance(self.token_in, pair).await?;
        if balance > self.min_liquidity {
            return Ok(PollOutcome::Sufficient { pair, balance });
        }
        Ok(PollOutcome::Insufficient { balance })
    }

    /// Polls until the pool is ready. Never gives up: a missing pair, a
    /// shallow pool and a failed poll all wait one interval and try again.
    pub async fn wait_for_liquidity(&self) -> (Address, U256) {
        loop {
            if let Some(metrics) = &self.metrics {
                metrics.polls_total.inc();
            }
            match self.poll_once().await {
                Ok(PollOutcome::Sufficient { pair, balance }) => {
                    info!(
                        %pair,
                        balance = %format_ether(balance),
                        threshold = %format_ether(self.min_liquidity),
                        "pool liquidity above threshold"
                    );
                    return (pair, balance);
                }
                Ok(PollOutcome::PairMissing) => {
                    if let Some(metrics) = &self.metrics {
                        metrics.pair_missing_total.inc();
                    }
                    debug!(token = %self.token_out, "pair not registered yet");
                }
                Ok(PollOutcome::Insufficient { balance }) => {
                    if let Some(metrics) = &self.metrics {
                        metrics.insufficient_total.inc();
                    }
                    debug!(
                        balance = %format_ether(balance),
                        threshold = %format_ether(self.min_liquidity),
                        "pool below liquidity threshold"
                    );
                }
                Err(err) => {
                    warn!(error = %err, "liquidity poll failed; retrying");
                }
            }
            sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FakeChain;
    use alloy::primitives::address;
    use wasp_core::error::Error;

    fn monitor(chain: Arc<FakeChain>, min_liquidity: u64) -> LiquidityMonitor {
        LiquidityMonitor::new(
            chain,
            address!("0x00000000000000000000000000000000000000aa"),
            address!("0x00000000000000000000000000000000000000bb"),
            U256::from(min_liquidity),
            Duration::from_millis(500),
            None,
        )
    }

    #[tokio::test]
    async fn poll_once_reports_missing_pair_without_balance_query() {
        let chain = Arc::new(FakeChain::new());
        chain.push_pair(Ok(None));
        let monitor = monitor(chain.clone(), 100);

        let outcome = monitor.poll_once().await.unwrap();
        assert_eq!(outcome, PollOutcome::PairMissing);
        assert_eq!(chain.balance_calls(), 0);
    }

    #[tokio::test]
    async fn poll_once_treats_threshold_exactly_met_as_insufficient() {
        let chain = Arc::new(FakeChain::new());
        let pair = address!("0x00000000000000000000000000000000000000cc");
        chain.push_pair(Ok(Some(pair)));
        chain.push_balance(Ok(U256::from(100u64)));
        let monitor = monitor(chain.clone(), 100);

        let outcome = monitor.poll_once().await.unwrap();
        assert_eq!(
            outcome,
            PollOutcome::Insufficient {
                balance: U256::from(100u64)
            }
        );
    }

    #[tokio::test]
    async fn poll_once_reports_sufficient_above_threshold() {
        let chain = Arc::new(FakeChain::new());
        let pair = address!("0x00000000000000000000000000000000000000cc");
        chain.push_pair(Ok(Some(pair)));
        chain.push_balance(Ok(U256::from(101u64)));
        let monitor = monitor(chain.clone(), 100);

        let outcome = monitor.poll_once().await.unwrap();
        assert_eq!(
            outcome,
            PollOutcome::Sufficient {
                pair,
                balance: U256::from(101u64)
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn wait_for_liquidity_retries_through_misses_and_errors() {
        let chain = Arc::new(FakeChain::new());
        let pair = address!("0x00000000000000000000000000000000000000cc");
        chain.push_pair(Ok(None));
        chain.push_pair(Ok(Some(pair)));
        chain.push_balance(Ok(U256::from(100u64)));
        chain.push_pair(Err(Error::Network {
            message: "connection reset".into(),
        }));
        chain.push_pair(Ok(Some(pair)));
        chain.push_balance(Ok(U256::from(250u64)));
        let monitor = monitor(chain.clone(), 100);

        let (found, balance) = monitor.wait_for_liquidity().await;
        assert_eq!(found, pair);
        assert_eq!(balance, U256::from(250u64));
        assert_eq!(chain.pair_calls(), 4);
        assert_eq!(chain.balance_calls(), 2);
    }
}
