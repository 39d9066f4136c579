//! Optional Telegram push notifications for trade milestones.
//!
//! Credentials come from the environment so the config file never holds
//! secrets. Sending is fire-and-forget through a bounded queue; a full
//! queue drops the message rather than stalling the trading flow.

use reqwest::Client;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::Duration;
use tracing::{debug, warn};

const QUEUE_CAPACITY: usize = 128;
const MESSAGE_LIMIT: usize = 4096;
const SEND_TIMEOUT_SECS: u64 = 5;

#[derive(Clone)]
pub struct TelegramNotifier {
    sender: mpsc::Sender<String>,
}

impl TelegramNotifier {
    /// Builds a notifier from `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID`.
    /// Returns `None` when both are absent; warns when only one is set.
    pub fn from_env() -> Option<Self> {
        let token = std::env::var("TELEGRAM_BOT_TOKEN").ok().and_then(non_empty);
        let chat_id = std::env::var("TELEGRAM_CHAT_ID").ok().and_then(non_empty);

        match (token, chat_id) {
            (Some(token), Some(chat_id)) => Some(Self::new(token, chat_id)),
            (None, None) => None,
            _ => {
                warn!("telegram notifier disabled: TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID missing");
                None
            }
        }
    }

    pub fn new(token: String, chat_id: String) -> Self {
        let (sender, receiver) = mpsc::channel(QUEUE_CAPACITY);
        tokio::spawn(run_worker(token, chat_id, receiver));
        Self { sender }
    }

    pub fn notify(&self, message: String) {
        if message.is_empty() {
            return;
        }
        let message = truncate_message(message);
        match self.sender.try_send(message) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("notification queue full; dropping message");
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("notification queue closed; dropping message");
            }
        }
    }
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    disable_web_page_preview: bool,
}

async fn run_worker(token: String, chat_id: String, mut receiver: mpsc::Receiver<String>) {
    let client = Client::builder()
        .timeout(Duration::from_secs(SEND_TIMEOUT_SECS))
        .build()
        .unwrap_or_else(|err| {
            warn!(?err, "telegram client build failed; using default client");
            Client::new()
        });
    let url = format!("https://api.telegram.org/bot{token}/sendMessage");

    while let Some(message) = receiver.recv().await {
        let payload = SendMessage {
            chat_id: &chat_id,
            text: &message,
            disable_web_page_preview: true,
        };
        match client.post(&url).json(&payload).send().await {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), "telegram send rejected");
            }
            Ok(_) => {}
            Err(err) => {
                warn!(?err, "telegram send failed");
            }
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn truncate_message(mut message: String) -> String {
    if message.len() <= MESSAGE_LIMIT {
        return message;
    }
    // Cut on a char boundary so multi-byte text cannot panic the worker.
    let mut cut = MESSAGE_LIMIT.saturating_sub(3);
    while !message.is_char_boundary(cut) {
        cut -= 1;
    }
    message.truncate(cut);
    message.push_str("...");
    message
}
