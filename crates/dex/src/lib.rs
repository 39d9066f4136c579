pub mod abi;
pub mod client;

pub use client::{DexChain, DexClient, FixedGas};
