use alloy::primitives::{Address, TxKind, B256, U256};
use alloy::providers::{DynProvider, Provider};
use alloy::rpc::types::transaction::TransactionInput;
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use alloy::transports::{RpcError, TransportError};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{info, warn};
use wasp_core::error::{Error, Result};
use wasp_core::types::{SwapReceipt, TradeOrder};
use wasp_core::utils::gwei_to_wei;

use crate::abi::{IUniswapV2Factory, IUniswapV2Router02, IERC20};

/// Read and write operations the bot needs from a v2-style exchange.
/// The trait seam exists so the trading flow can run against a scripted
/// implementation in tests.
#[async_trait]
pub trait DexChain: Send + Sync {
    /// Pair address from the factory; `None` while the factory still
    /// reports the zero address.
    async fn pair_address(&self, token_a: Address, token_b: Address) -> Result<Option<Address>>;

    /// ERC-20 balance in base units.
    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256>;

    /// Router quote for `amount_in` along `path`.
    async fn amounts_out(&self, amount_in: U256, path: &[Address]) -> Result<Vec<U256>>;

    /// Submits the swap and suspends until it is mined or times out.
    async fn swap_exact_native(&self, order: &TradeOrder) -> Result<SwapReceipt>;
}

/// Fixed fee policy: no estimation, no bumping.
#[derive(Debug, Clone, Copy)]
pub struct FixedGas {
    pub gas_price_gwei: u64,
    pub gas_limit: u64,
}

impl FixedGas {
    fn apply(&self, tx: &mut TransactionRequest) {
        tx.gas_price = Some(gwei_to_wei(self.gas_price_gwei));
        tx.gas = Some(self.gas_limit);
    }
}

#[derive(Clone)]
pub struct DexClient {
    provider: DynProvider,
    factory: Address,
    router: Address,
    gas: FixedGas,
    receipt_poll_interval: Duration,
    receipt_timeout: Duration,
}

impl DexClient {
    pub fn new(
        provider: DynProvider,
        factory: Address,
        router: Address,
        gas: FixedGas,
        receipt_poll_interval: Duration,
        receipt_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            factory,
            router,
            gas,
            receipt_poll_interval,
            receipt_timeout,
        }
    }

    fn build_swap_request(&self, order: &TradeOrder) -> TransactionRequest {
        let input = if order.fee_on_transfer {
            IUniswapV2Router02::swapExactETHForTokensSupportingFeeOnTransferTokensCall {
                amountOutMin: order.min_amount_out,
                path: order.path.clone(),
                to: order.recipient,
                deadline: order.deadline,
            }
            .abi_encode()
        } else {
            IUniswapV2Router02::swapExactETHForTokensCall {
                amountOutMin: order.min_amount_out,
                path: order.path.clone(),
                to: order.recipient,
                deadline: order.deadline,
            }
            .abi_encode()
        };
        let mut tx = TransactionRequest {
            to: Some(TxKind::Call(self.router)),
            input: TransactionInput::new(input.into()),
            value: Some(order.amount_in),
            ..Default::default()
        };
        self.gas.apply(&mut tx);
        tx
    }

    async fn wait_for_receipt(&self, tx_hash: B256) -> Result<SwapReceipt> {
        let started = tokio::time::Instant::now();
        loop {
            match self.provider.get_transaction_receipt(tx_hash).await {
                Ok(Some(receipt)) => {
                    let block_number = receipt.block_number.unwrap_or_default();
                    if receipt.inner.status() {
                        return Ok(SwapReceipt {
                            tx_hash,
                            block_number,
                            gas_used: receipt.gas_used,
                        });
                    }
                    return Err(Error::Transaction {
                        reason: format!("swap reverted in block {block_number}"),
                        code: None,
                        tx_hash: Some(tx_hash),
                    });
                }
                Ok(None) => {}
                Err(err) => {
                    warn!(%tx_hash, error = %err, "receipt query failed; retrying");
                }
            }
            if started.elapsed() >= self.receipt_timeout {
                return Err(Error::Transaction {
                    reason: format!(
                        "no receipt after {}ms",
                        self.receipt_timeout.as_millis()
                    ),
                    code: None,
                    tx_hash: Some(tx_hash),
                });
            }
            tokio::time::sleep(self.receipt_poll_interval).await;
        }
    }
}

#[async_trait]
impl DexChain for DexClient {
    async fn pair_address(&self, token_a: Address, token_b: Address) -> Result<Option<Address>> {
        let call = IUniswapV2Factory::getPairCall {
            tokenA: token_a,
            tokenB: token_b,
        };
        let tx = TransactionRequest {
            to: Some(TxKind::Call(self.factory)),
            input: TransactionInput::new(call.abi_encode().into()),
            ..Default::default()
        };
        let data = self.provider.call(tx).await.map_err(read_error)?;
        let pair =
            IUniswapV2Factory::getPairCall::abi_decode_returns(&data).map_err(decode_error)?;
        if pair == Address::ZERO {
            return Ok(None);
        }
        Ok(Some(pair))
    }

    async fn token_balance(&self, token: Address, owner: Address) -> Result<U256> {
        let call = IERC20::balanceOfCall { owner };
        let tx = TransactionRequest {
            to: Some(TxKind::Call(token)),
            input: TransactionInput::new(call.abi_encode().into()),
            ..Default::default()
        };
        let data = self.provider.call(tx).await.map_err(read_error)?;
        IERC20::balanceOfCall::abi_decode_returns(&data).map_err(decode_error)
    }

    async fn amounts_out(&self, amount_in: U256, path: &[Address]) -> Result<Vec<U256>> {
        let call = IUniswapV2Router02::getAmountsOutCall {
            amountIn: amount_in,
            path: path.to_vec(),
        };
        let tx = TransactionRequest {
            to: Some(TxKind::Call(self.router)),
            input: TransactionInput::new(call.abi_encode().into()),
            ..Default::default()
        };
        let data = self.provider.call(tx).await.map_err(quote_error)?;
        IUniswapV2Router02::getAmountsOutCall::abi_decode_returns(&data).map_err(|e| {
            Error::Quote {
                message: format!("getAmountsOut decode failed: {e}"),
                code: None,
            }
        })
    }

    async fn swap_exact_native(&self, order: &TradeOrder) -> Result<SwapReceipt> {
        let tx = self.build_swap_request(order);
        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(swap_error)?;
        let tx_hash = *pending.inner().tx_hash();
        info!(%tx_hash, "swap broadcast");
        self.wait_for_receipt(tx_hash).await
    }
}

fn read_error(err: TransportError) -> Error {
    Error::Network {
        message: err.to_string(),
    }
}

fn decode_error(err: alloy::sol_types::Error) -> Error {
    Error::Network {
        message: format!("response decode failed: {err}"),
    }
}

/// A structured error response means the router itself refused the quote
/// (no pair, empty reserves); anything else is connectivity.
fn quote_error(err: TransportError) -> Error {
    match err {
        RpcError::ErrorResp(payload) => Error::Quote {
            message: payload.message.to_string(),
            code: Some(payload.code),
        },
        other => Error::Network {
            message: other.to_string(),
        },
    }
}

/// Submission rejections keep the node's reason and code; transport
/// failures stay network errors so recovery can tell them apart.
fn swap_error(err: TransportError) -> Error {
    match err {
        RpcError::ErrorResp(payload) => Error::Transaction {
            reason: payload.message.to_string(),
            code: Some(payload.code),
            tx_hash: None,
        },
        other => Error::Network {
            message: other.to_string(),
        },
    }
}
