//! Scripted chain stand-in for exercising the trading flow without a node.

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use wasp_core::error::Result;
use wasp_core::types::{SwapReceipt, TradeOrder};
use wasp_dex::DexChain;

/// Answers calls from pre-loaded queues, in order, and records every
/// submitted order. An unscripted call is a test bug and panics.
#[derive(Default)]
pub struct FakeChain {
    pairs: Mutex<VecDeque<Result<Option<Address>>>>,
    balances: Mutex<VecDeque<Result<U256>>>,
    quotes: Mutex<VecDeque<Result<Vec<U256>>>>,
    swaps: Mutex<VecDeque<Result<SwapReceipt>>>,
    orders: Mutex<Vec<TradeOrder>>,
    pair_calls: AtomicUsize,
    balance_calls: AtomicUsize,
    quote_calls: AtomicUsize,
    swap_calls: AtomicUsize,
}

impl FakeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_pair(&self, response: Result<Option<Address>>) {
        self.pairs.lock().unwrap().push_back(response);
    }

    pub fn push_balance(&self, response: Result<U256>) {
        self.balances.lock().unwrap().push_back(response);
    }

    pub fn push_quote(&self, response: Result<Vec<U256>>) {
        self.quotes.lock().unwrap().push_back(response);
    }

    pub fn push_swap(&self, response: Result<SwapReceipt>) {
        self.swaps.lock().unwrap().push_back(response);
    }

    pub fn pair_calls(&self) -> usize {
        self.pair_calls.load(Ordering::SeqCst)
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }

    pub fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }

    pub fn swap_calls(&self) -> usize {
        self.swap_calls.load(Ordering::SeqCst)
    }

    pub fn recorded_orders(&self) -> Vec<TradeOrder> {
        self.orders.lock().unwrap().clone()
    }
}

#[async_trait]
impl DexChain for FakeChain {
    async fn pair_address(&self, _token_a: Address, _token_b: Address) -> Result<Option<Address>> {
        self.pair_calls.fetch_add(1, Ordering::SeqCst);
        self.pairs
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted pair_address call")
    }

    async fn token_balance(&self, _token: Address, _owner: Address) -> Result<U256> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.balances
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted token_balance call")
    }

    async fn amounts_out(&self, _amount_in: U256, _path: &[Address]) -> Result<Vec<U256>> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.quotes
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted amounts_out call")
    }

    async fn swap_exact_native(&self, order: &TradeOrder) -> Result<SwapReceipt> {
        self.swap_calls.fetch_add(1, Ordering::SeqCst);
        self.orders.lock().unwrap().push(order.clone());
        self.swaps
            .lock()
            .unwrap()
            .pop_front()
            .expect("unscripted swap_exact_native call")
    }
}

pub fn sample_receipt(seed: u8) -> SwapReceipt {
    SwapReceipt {
        tx_hash: B256::repeat_byte(seed),
        block_number: 7_000_000 + seed as u64,
        gas_used: 180_000,
    }
}
