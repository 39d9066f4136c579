use alloy::primitives::utils::parse_units;
use alloy::primitives::{Address, U256};
use anyhow::anyhow;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

pub fn parse_address(s: &str) -> anyhow::Result<Address> {
    Address::from_str(s.trim()).map_err(|e| anyhow!("invalid address {s}: {e}"))
}

/// Parses a human-readable decimal into 18-decimal base units.
/// "0.1" becomes 100000000000000000.
pub fn parse_amount_18(s: &str) -> anyhow::Result<U256> {
    let trimmed = s.trim();
    if trimmed.starts_with('-') {
        return Err(anyhow!("negative amount not allowed: {s}"));
    }
    let amount: U256 = parse_units(trimmed, 18)
        .map_err(|e| anyhow!("invalid decimal amount {s}: {e}"))?
        .into();
    Ok(amount)
}

pub fn gwei_to_wei(gwei: u64) -> u128 {
    (gwei as u128) * 1_000_000_000u128
}
