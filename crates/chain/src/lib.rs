pub mod client;
pub mod signer;

pub use client::{connect_provider, NodeClient};
pub use signer::load_signer;
