//! Resilient messaging utilities with automatic retry for Telegram API operations.
//!
//! Transient failures (network, I/O, flood control) are retried with
//! exponential backoff and jitter. API errors such as "bot was blocked" are
//! returned on the first attempt.
//!
//! # Usage
//!
//! ```ignore
//! use drive_browser_transport_telegram::bot::resilient::send_message_resilient;
//!
//! let msg = send_message_resilient(&bot, chat_id, "Hello!", None).await?;
//! ```

use crate::config::{
    TELEGRAM_API_INITIAL_BACKOFF_MS, TELEGRAM_API_MAX_BACKOFF_MS, TELEGRAM_API_MAX_RETRIES,
};
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InlineKeyboardMarkup, Message};
use teloxide::RequestError;
use tokio_retry::strategy::{jitter, ExponentialBackoff};
use tokio_retry::RetryIf;
use tracing::warn;

/// Whether a failed request may succeed when sent again.
#[must_use]
pub const fn is_transient(error: &RequestError) -> bool {
    matches!(
        error,
        RequestError::Network(_) | RequestError::Io(_) | RequestError::RetryAfter(_)
    )
}

/// Retry a Telegram API operation with exponential backoff.
///
/// - Initial delay: 500ms
/// - Max delay: 5s
/// - Retries: 3 after the first attempt, so at most 4 attempts
///
/// Only errors accepted by [`is_transient`] are retried.
///
/// # Errors
///
/// Returns the first non-transient error, or the last error once all
/// retries are spent.
pub async fn retry_telegram_operation<F, Fut, T>(operation: F) -> Result<T, RequestError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, RequestError>>,
{
    let retry_strategy = ExponentialBackoff::from_millis(TELEGRAM_API_INITIAL_BACKOFF_MS)
        .max_delay(Duration::from_millis(TELEGRAM_API_MAX_BACKOFF_MS))
        .map(jitter)
        .take(TELEGRAM_API_MAX_RETRIES);

    RetryIf::spawn(retry_strategy, operation, is_transient)
        .await
        .map_err(|e| {
            warn!("Telegram API operation failed: {}", e);
            e
        })
}

/// Send a message with automatic retry on transient failures.
///
/// # Arguments
///
/// * `bot` - The Telegram bot instance
/// * `chat_id` - Target chat ID
/// * `text` - Message text to send
/// * `markup` - Optional inline keyboard attached to the message
///
/// # Errors
///
/// Returns the Telegram error once retrying is over.
pub async fn send_message_resilient(
    bot: &Bot,
    chat_id: ChatId,
    text: impl Into<String>,
    markup: Option<InlineKeyboardMarkup>,
) -> Result<Message, RequestError> {
    let text = text.into();
    retry_telegram_operation(|| async {
        let mut req = bot.send_message(chat_id, text.clone());
        if let Some(markup) = markup.clone() {
            req = req.reply_markup(markup);
        }
        req.await
    })
    .await
}
