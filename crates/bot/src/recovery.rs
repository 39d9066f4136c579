//! Failure handling for the trade cycle: log what went wrong, then decide
//! whether to run the cycle again.

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{error, info};
use wasp_core::error::Error;
use wasp_core::modes::RecoveryMode;
use wasp_core::types::RestartDecision;

use crate::notifier::TelegramNotifier;
use crate::status::BotMetrics;

/// Where the restart answer comes from. The blocking call runs on a
/// dedicated thread so an unattended prompt cannot stall the runtime.
pub trait RestartPrompt: Send + Sync {
    fn confirm_restart(&self) -> bool;
}

/// Asks the operator on the terminal. Anything but an explicit yes
/// declines.
pub struct StdinPrompt;

impl RestartPrompt for StdinPrompt {
    fn confirm_restart(&self) -> bool {
        use std::io::Write as _;

        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "restart the trade cycle? [y/N] ");
        let _ = stdout.flush();

        let mut line = String::new();
        if std::io::stdin().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

/// Restarts without asking, up to a fixed number of times.
pub struct AutoRestart {
    max: u32,
    used: AtomicU32,
}

impl AutoRestart {
    pub fn new(max: u32) -> Self {
        Self {
            max,
            used: AtomicU32::new(0),
        }
    }
}

impl RestartPrompt for AutoRestart {
    fn confirm_restart(&self) -> bool {
        self.used.fetch_add(1, Ordering::SeqCst) < self.max
    }
}

pub struct NeverRestart;

impl RestartPrompt for NeverRestart {
    fn confirm_restart(&self) -> bool {
        false
    }
}

pub struct RecoveryController {
    prompt: Arc<dyn RestartPrompt>,
    metrics: Option<Arc<BotMetrics>>,
    notifier: Option<TelegramNotifier>,
}

impl RecoveryController {
    pub fn new(
        prompt: Arc<dyn RestartPrompt>,
        metrics: Option<Arc<BotMetrics>>,
        notifier: Option<TelegramNotifier>,
    ) -> Self {
        Self {
            prompt,
            metrics,
            notifier,
        }
    }

    pub fn from_mode(
        mode: RecoveryMode,
        max_auto_restarts: u32,
        metrics: Option<Arc<BotMetrics>>,
        notifier: Option<TelegramNotifier>,
    ) -> Self {
        let prompt: Arc<dyn RestartPrompt> = match mode {
            RecoveryMode::Prompt => Arc::new(StdinPrompt),
            RecoveryMode::Auto => Arc::new(AutoRestart::new(max_auto_restarts)),
            RecoveryMode::Never => Arc::new(NeverRestart),
        };
        Self::new(prompt, metrics, notifier)
    }

    /// Records the failure with every detail the error carries, then asks
    /// the prompt whether to go around again.
    pub async fn handle(&self, err: &Error) -> RestartDecision {
        error!(
            kind = err.kind(),
            code = ?err.code(),
            tx_hash = ?err.tx_hash(),
            error = %err,
            "trade cycle failed"
        );
        if let Some(metrics) = &self.metrics {
            metrics.failures_total.with_label_values(&[err.kind()]).inc();
        }
        if let Some(notifier) = &self.notifier {
            let mut msg = String::new();
            let _ = writeln!(msg, "❌ Entry failed");
            let _ = writeln!(msg, "reason: {err}");
            if let Some(hash) = err.tx_hash() {
                let _ = writeln!(msg, "tx: {hash}");
            }
            notifier.notify(msg);
        }

        let prompt = Arc::clone(&self.prompt);
        let restart = tokio::task::spawn_blocking(move || prompt.confirm_restart())
            .await
            .unwrap_or(false);
        if restart {
            info!("restarting trade cycle");
            RestartDecision::Restart
        } else {
            info!("not restarting; shutting down");
            RestartDecision::Terminate
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Always(bool);

    impl RestartPrompt for Always {
        fn confirm_restart(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn auto_restart_stops_at_the_cap() {
        let prompt = AutoRestart::new(2);
        assert!(prompt.confirm_restart());
        assert!(prompt.confirm_restart());
        assert!(!prompt.confirm_restart());
        assert!(!prompt.confirm_restart());
    }

    #[test]
    fn never_restart_always_declines() {
        assert!(!NeverRestart.confirm_restart());
    }

    #[tokio::test]
    async fn handle_returns_the_prompt_answer() {
        let restart = RecoveryController::new(Arc::new(Always(true)), None, None);
        assert_eq!(
            restart
                .handle(&Error::Network {
                    message: "connection reset".into()
                })
                .await,
            RestartDecision::Restart
        );

        let terminate = RecoveryController::new(Arc::new(Always(false)), None, None);
        assert_eq!(
            terminate
                .handle(&Error::Network {
                    message: "connection reset".into()
                })
                .await,
            RestartDecision::Terminate
        );
    }

    #[tokio::test]
    async fn handle_counts_failures_by_kind() {
        let metrics = Arc::new(BotMetrics::new().unwrap());
        let controller =
            RecoveryController::new(Arc::new(Always(false)), Some(metrics.clone()), None);
        controller
            .handle(&Error::Quote {
                message: "execution reverted".into(),
                code: Some(3),
            })
            .await;

        assert_eq!(
            metrics.failures_total.with_label_values(&["quote"]).get(),
            1
        );
    }
}
