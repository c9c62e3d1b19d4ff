use crate::bot::resilient::send_message_resilient;
use crate::bot::views::inline_keyboard;
use async_trait::async_trait;
use drive_browser_core::{ChatIdentity, ChatTransport, Keyboard, TransportError};
use std::path::Path;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile};
use tracing::warn;

/// Telegram Bot API implementation of [`ChatTransport`].
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    /// Create a transport sending through `bot`.
    #[must_use]
    pub const fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl ChatTransport for TelegramTransport {
    async fn send_message(
        &self,
        chat: ChatIdentity,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError> {
        let markup = (!keyboard.is_empty()).then(|| inline_keyboard(keyboard));

        send_message_resilient(&self.bot, ChatId(chat.0), text, markup)
            .await
            .map(|_| ())
            .map_err(|e| TransportError::Message {
                chat,
                reason: e.to_string(),
            })
    }

    async fn send_document(&self, chat: ChatIdentity, path: &Path) -> Result<(), TransportError> {
        // Sent once, uploads are not retried
        self.bot
            .send_document(ChatId(chat.0), InputFile::file(path.to_path_buf()))
            .await
            .map(|_| ())
            .map_err(|e| {
                warn!(%chat, path = %path.display(), error = %e, "Failed to send document");
                TransportError::Document {
                    chat,
                    reason: e.to_string(),
                }
            })
    }
}
