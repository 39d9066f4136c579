use anyhow::anyhow;

use crate::error::Result;

/// How the bot reacts when a purchase attempt fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecoveryMode {
    /// Ask the operator on the console before restarting.
    Prompt,
    /// Restart unattended, up to the configured budget.
    Auto,
    /// Always shut down on failure.
    Never,
}

impl RecoveryMode {
    pub fn parse(raw: &str) -> Result<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "prompt" | "interactive" => Ok(Self::Prompt),
            "auto" | "always" => Ok(Self::Auto),
            "never" | "off" => Ok(Self::Never),
            _ => Err(anyhow!("unsupported recovery.mode: {raw}").into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!(RecoveryMode::parse("prompt").unwrap(), RecoveryMode::Prompt);
        assert_eq!(RecoveryMode::parse(" AUTO ").unwrap(), RecoveryMode::Auto);
        assert_eq!(RecoveryMode::parse("off").unwrap(), RecoveryMode::Never);
    }

    #[test]
    fn parse_rejects_unknown_mode() {
        assert!(RecoveryMode::parse("retry").is_err());
    }
}
