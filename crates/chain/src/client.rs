use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use tracing::info;
use wasp_core::config::ChainConfig;
use wasp_core::error::{Error, Result};

use crate::signer::load_signer;

/// One node connection, established at startup and held for the process
/// lifetime.
#[derive(Clone)]
pub struct NodeClient {
    pub provider: DynProvider,
    /// Address derived from the signing credential.
    pub sender: Address,
}

impl NodeClient {
    /// Connects with the signing credential attached, so transactions sent
    /// through the provider are signed locally.
    pub async fn connect(cfg: &ChainConfig) -> Result<Self> {
        let signer = load_signer(&cfg.signer_env)?;
        let sender = signer.address();
        let wallet = EthereumWallet::from(signer);
        let provider = ProviderBuilder::new()
            .wallet(wallet)
            .connect(&cfg.ws_url)
            .await
            .map_err(connect_error)?
            .erased();
        ensure_chain_id(&provider, cfg.chain_id).await?;
        info!(%sender, url = %cfg.ws_url, "node connected");
        Ok(Self { provider, sender })
    }
}

/// Read-only connection for probes that never sign anything.
pub async fn connect_provider(cfg: &ChainConfig) -> Result<DynProvider> {
    let provider = ProviderBuilder::new()
        .connect(&cfg.ws_url)
        .await
        .map_err(connect_error)?
        .erased();
    ensure_chain_id(&provider, cfg.chain_id).await?;
    Ok(provider)
}

async fn ensure_chain_id(provider: &DynProvider, expected: Option<u64>) -> Result<()> {
    let Some(expected) = expected else {
        return Ok(());
    };
    let actual = provider.get_chain_id().await.map_err(|e| Error::Network {
        message: format!("chain id query failed: {e}"),
    })?;
    if actual != expected {
        return Err(Error::InvalidConfig(format!(
            "chain.chain_id mismatch: node reports {actual}, config expects {expected}"
        )));
    }
    Ok(())
}

fn connect_error(err: impl std::fmt::Display) -> Error {
    Error::Network {
        message: format!("node connection failed: {err}"),
    }
}
