pub mod buyer;
pub mod monitor;
pub mod notifier;
pub mod orchestrator;
pub mod recovery;
pub mod status;
#[cfg(test)]
pub(crate) mod testutil;

pub use orchestrator::{probe_liquidity, Bot, BotOutcome};
