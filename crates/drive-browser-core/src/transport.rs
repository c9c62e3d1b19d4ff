//! Outbound side of the chat transport.

use crate::navigation::ChatIdentity;
use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Failure to deliver something to the chat
#[derive(Error, Debug)]
pub enum TransportError {
    /// Sending a text message failed
    #[error("Failed to send message to chat {chat}: {reason}")]
    Message {
        /// Target chat
        chat: ChatIdentity,
        /// Transport-specific description
        reason: String,
    },
    /// Sending a document failed
    #[error("Failed to send document to chat {chat}: {reason}")]
    Document {
        /// Target chat
        chat: ChatIdentity,
        /// Transport-specific description
        reason: String,
    },
}

/// Inline button with an opaque payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    /// Visible text
    pub label: String,
    /// Data delivered back when pressed
    pub payload: String,
}

impl Button {
    /// Create a button
    #[must_use]
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// Rows of inline buttons
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    /// Button rows, top to bottom
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// Append a row; empty rows are skipped.
    pub fn push_row(&mut self, row: Vec<Button>) {
        if !row.is_empty() {
            self.rows.push(row);
        }
    }

    /// All buttons in reading order
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }

    /// Keyboard without buttons
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Interface for chat transports
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send a text with an inline keyboard
    async fn send_message(
        &self,
        chat: ChatIdentity,
        text: &str,
        keyboard: &Keyboard,
    ) -> Result<(), TransportError>;

    /// Send a local file as a document attachment
    async fn send_document(&self, chat: ChatIdentity, path: &Path) -> Result<(), TransportError>;
}
