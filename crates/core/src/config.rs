use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub chain: ChainConfig,
    pub dex: DexConfig,
    pub trade: TradeConfig,
    pub monitor: MonitorConfig,
    #[serde(default)]
    pub executor: ExecutorConfig,
    #[serde(default)]
    pub recovery: RecoveryConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub ws_url: String,
    #[serde(default)]
    pub chain_id: Option<u64>,
    #[serde(default = "default_signer_env")]
    pub signer_env: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DexConfig {
    pub factory: String,
    pub router: String,
    /// Wrapped-native token spent on the purchase; also the side of the
    /// pool that is measured against the liquidity threshold.
    pub token_in: String,
    pub token_out: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeConfig {
    /// Purchase amount as a human-readable decimal, e.g. "0.01".
    pub amount_in: String,
    /// Divisor for the quoted output: min out = quote - quote / divisor.
    /// 0 disables the protection entirely (min out = 0).
    #[serde(default)]
    pub slippage_divisor: u32,
    pub gas_price_gwei: u64,
    pub gas_limit: u64,
    pub recipient: String,
    #[serde(default)]
    pub fee_on_transfer: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    #[serde(default = "default_monitor_enabled")]
    pub enabled: bool,
    /// Minimum pool balance of `token_in`, human-readable decimal.
    /// Required while the monitor is enabled.
    #[serde(default)]
    pub min_liquidity: String,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutorConfig {
    #[serde(default = "default_receipt_poll_interval_ms")]
    pub receipt_poll_interval_ms: u64,
    #[serde(default = "default_receipt_timeout_ms")]
    pub receipt_timeout_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecoveryConfig {
    #[serde(default = "default_recovery_mode")]
    pub mode: String,
    #[serde(default = "default_max_auto_restarts")]
    pub max_auto_restarts: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_status_port")]
    pub status_port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_explorer_tx_base")]
    pub explorer_tx_base: String,
}

impl AppConfig {
    pub fn load(path: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(
                config::Environment::with_prefix("WASP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let cfg: Self = cfg.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        require(&self.chain.ws_url, "chain.ws_url")?;
        require(&self.dex.factory, "dex.factory")?;
        require(&self.dex.router, "dex.router")?;
        require(&self.dex.token_in, "dex.token_in")?;
        require(&self.dex.token_out, "dex.token_out")?;
        require(&self.trade.amount_in, "trade.amount_in")?;
        require(&self.trade.recipient, "trade.recipient")?;
        if self.trade.gas_limit == 0 {
            return Err(Error::InvalidConfig(
                "trade.gas_limit must be greater than zero".to_string(),
            ));
        }
        if self.monitor.enabled {
            require(&self.monitor.min_liquidity, "monitor.min_liquidity")?;
            if self.monitor.poll_interval_ms == 0 {
                return Err(Error::InvalidConfig(
                    "monitor.poll_interval_ms must be at least 1".to_string(),
                ));
            }
        }
        Ok(())
    }
}

fn require(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidConfig(format!("{field} must not be empty")));
    }
    Ok(())
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            receipt_poll_interval_ms: default_receipt_poll_interval_ms(),
            receipt_timeout_ms: default_receipt_timeout_ms(),
        }
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            mode: default_recovery_mode(),
            max_auto_restarts: default_max_auto_restarts(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            status_port: default_status_port(),
            log_level: default_log_level(),
            explorer_tx_base: default_explorer_tx_base(),
        }
    }
}

fn default_signer_env() -> String {
    "WASP_PRIVATE_KEY".to_string()
}

fn default_monitor_enabled() -> bool {
    true
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_receipt_poll_interval_ms() -> u64 {
    2_000
}

fn default_receipt_timeout_ms() -> u64 {
    120_000
}

fn default_recovery_mode() -> String {
    "prompt".to_string()
}

fn default_max_auto_restarts() -> u32 {
    3
}

fn default_status_port() -> u16 {
    5001
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_explorer_tx_base() -> String {
    "https://bscscan.com/tx/".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> AppConfig {
        AppConfig {
            chain: ChainConfig {
                ws_url: "ws://localhost:8546".to_string(),
                chain_id: Some(56),
                signer_env: default_signer_env(),
            },
            dex: DexConfig {
                factory: "0xBCfCcbde45cE874adCB698cC183deBcF17952812".to_string(),
                router: "0x05fF2B0DB69458A0750badebc4f9e13aDd608C7F".to_string(),
                token_in: "0xbb4CdB9CBd36B01bD1cBaEBF2De08d9173bc095c".to_string(),
                token_out: "0x1000000000000000000000000000000000000001".to_string(),
            },
            trade: TradeConfig {
                amount_in: "0.01".to_string(),
                slippage_divisor: 50,
                gas_price_gwei: 5,
                gas_limit: 345_684,
                recipient: "0x2000000000000000000000000000000000000002".to_string(),
                fee_on_transfer: false,
            },
            monitor: MonitorConfig {
                enabled: true,
                min_liquidity: "0.1".to_string(),
                poll_interval_ms: 500,
            },
            executor: ExecutorConfig::default(),
            recovery: RecoveryConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }

    #[test]
    fn validate_accepts_complete_config() {
        assert!(sample_config().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_required_field() {
        let mut cfg = sample_config();
        cfg.dex.router = "  ".to_string();
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(msg) if msg.contains("dex.router")));
    }

    #[test]
    fn validate_rejects_zero_gas_limit() {
        let mut cfg = sample_config();
        cfg.trade.gas_limit = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_poll_interval_when_monitoring() {
        let mut cfg = sample_config();
        cfg.monitor.poll_interval_ms = 0;
        assert!(cfg.validate().is_err());

        cfg.monitor.enabled = false;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn monitor_threshold_only_required_when_enabled() {
        let mut cfg = sample_config();
        cfg.monitor.min_liquidity = String::new();
        assert!(cfg.validate().is_err());

        cfg.monitor.enabled = false;
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn defaults_match_documented_values() {
        let observability = ObservabilityConfig::default();
        assert_eq!(observability.status_port, 5001);
        assert_eq!(observability.log_level, "info");
        assert!(observability.explorer_tx_base.starts_with("https://bscscan.com"));

        let recovery = RecoveryConfig::default();
        assert_eq!(recovery.mode, "prompt");
        assert_eq!(recovery.max_auto_restarts, 3);

        let executor = ExecutorConfig::default();
        assert_eq!(executor.receipt_poll_interval_ms, 2_000);
        assert_eq!(executor.receipt_timeout_ms, 120_000);
    }
}
