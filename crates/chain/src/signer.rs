use alloy::primitives::B256;
use alloy::signers::local::coins_bip39::English;
use alloy::signers::local::{MnemonicBuilder, PrivateKeySigner};
use std::str::FromStr;
use wasp_core::error::{Error, Result};

/// Loads the signing credential from the environment variable named in the
/// configuration. A value containing whitespace is treated as a BIP-39
/// mnemonic phrase, anything else as a hex private key.
pub fn load_signer(env_name: &str) -> Result<PrivateKeySigner> {
    let raw = std::env::var(env_name)
        .map_err(|_| Error::Signer(format!("environment variable {env_name} is not set")))?;
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::Signer(format!(
            "environment variable {env_name} is empty"
        )));
    }
    signer_from_raw(raw)
}

pub fn signer_from_raw(raw: &str) -> Result<PrivateKeySigner> {
    if raw.contains(char::is_whitespace) {
        return MnemonicBuilder::<English>::default()
            .phrase(raw)
            .build()
            .map_err(|e| Error::Signer(format!("invalid mnemonic phrase: {e}")));
    }
    let key = B256::from_str(raw.trim_start_matches("0x"))
        .map_err(|e| Error::Signer(format!("invalid private key: {e}")))?;
    PrivateKeySigner::from_bytes(&key).map_err(|e| Error::Signer(format!("invalid private key: {e}")))
}
