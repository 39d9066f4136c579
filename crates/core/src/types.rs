use alloy::primitives::{Address, B256, U256};

/// Trade parameters resolved from configuration once at startup.
#[derive(Debug, Clone)]
pub struct TradePlan {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub slippage_divisor: u32,
    pub recipient: Address,
    pub fee_on_transfer: bool,
    pub gas_price_gwei: u64,
    pub gas_limit: u64,
}

/// A fully assembled swap, ready for submission.
#[derive(Debug, Clone)]
pub struct TradeOrder {
    pub amount_in: U256,
    pub min_amount_out: U256,
    pub path: Vec<Address>,
    pub recipient: Address,
    pub deadline: U256,
    pub fee_on_transfer: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapReceipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub gas_used: u64,
}

/// Result of one liquidity polling iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Pool balance is strictly above the threshold; purchase may proceed.
    Sufficient { pair: Address, balance: U256 },
    Insufficient { balance: U256 },
    /// Factory reported the zero address: the pair does not exist yet.
    PairMissing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestartDecision {
    Restart,
    Terminate,
}
