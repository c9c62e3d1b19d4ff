//! Inbound chat events and their navigation meaning.
//!
//! The transport hands over raw `(chat, kind, payload)` triples; this module
//! owns the payload vocabulary in both directions (parsing inbound payloads
//! and encoding button payloads).

use std::fmt;
use thiserror::Error;

/// Command that starts or resets browsing
pub const START_COMMAND: &str = "/start";
/// Callback payload prefix of a file button
pub const SELECT_FILE_PREFIX: &str = "file_";
/// Callback payload of the "previous page" button
pub const PREVIOUS_PAGE_PAYLOAD: &str = "prev_page";
/// Callback payload of the "next page" button
pub const NEXT_PAGE_PAYLOAD: &str = "next_page";

/// Process-stable identifier of a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChatIdentity(pub i64);

impl fmt::Display for ChatIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatIdentity {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Where an inbound payload came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Text message (commands)
    Message,
    /// Inline button press
    Callback,
}

/// Raw event as delivered by the chat transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    /// Conversation the event belongs to
    pub chat: ChatIdentity,
    /// Message or button press
    pub kind: EventKind,
    /// Message text or callback data
    pub payload: String,
}

impl InboundEvent {
    /// Text message event
    #[must_use]
    pub fn message(chat: impl Into<ChatIdentity>, text: impl Into<String>) -> Self {
        Self {
            chat: chat.into(),
            kind: EventKind::Message,
            payload: text.into(),
        }
    }

    /// Button press event
    #[must_use]
    pub fn callback(chat: impl Into<ChatIdentity>, data: impl Into<String>) -> Self {
        Self {
            chat: chat.into(),
            kind: EventKind::Callback,
            payload: data.into(),
        }
    }
}

/// Payload that does not map to a navigation event
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProtocolError {
    /// Unknown command or callback data
    #[error("Unrecognized {kind:?} payload: {payload:?}")]
    Unrecognized {
        /// Origin of the payload
        kind: EventKind,
        /// The raw payload
        payload: String,
    },
    /// `file_` callback without an id
    #[error("File selection without file id")]
    MissingFileId,
}

/// What the user asked the browser to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationEvent {
    /// Start or reset browsing at page 0
    Start,
    /// Go one page back
    PreviousPage,
    /// Go one page forward
    NextPage,
    /// Download the file with this id
    SelectFile(String),
}

impl NavigationEvent {
    /// Parse a raw payload.
    ///
    /// Commands may carry a `@botname` suffix and trailing arguments, as
    /// Telegram sends them in group chats.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` for anything outside the known vocabulary.
    ///
    /// # Examples
    ///
    /// ```
    /// use drive_browser_core::navigation::{EventKind, NavigationEvent};
    ///
    /// let event = NavigationEvent::parse(EventKind::Callback, "file_1AbC");
    /// assert_eq!(event, Ok(NavigationEvent::SelectFile("1AbC".into())));
    /// ```
    pub fn parse(kind: EventKind, payload: &str) -> Result<Self, ProtocolError> {
        match kind {
            EventKind::Message => {
                let command = payload
                    .split_whitespace()
                    .next()
                    .and_then(|token| token.split('@').next())
                    .unwrap_or_default();
                if command == START_COMMAND {
                    Ok(Self::Start)
                } else {
                    Err(ProtocolError::Unrecognized {
                        kind,
                        payload: payload.to_string(),
                    })
                }
            }
            EventKind::Callback => match payload {
                PREVIOUS_PAGE_PAYLOAD => Ok(Self::PreviousPage),
                NEXT_PAGE_PAYLOAD => Ok(Self::NextPage),
                _ => match payload.strip_prefix(SELECT_FILE_PREFIX) {
                    Some("") => Err(ProtocolError::MissingFileId),
                    Some(id) => Ok(Self::SelectFile(id.to_string())),
                    None => Err(ProtocolError::Unrecognized {
                        kind,
                        payload: payload.to_string(),
                    }),
                },
            },
        }
    }

    /// Payload that parses back into this event
    #[must_use]
    pub fn payload(&self) -> String {
        match self {
            Self::Start => START_COMMAND.to_string(),
            Self::PreviousPage => PREVIOUS_PAGE_PAYLOAD.to_string(),
            Self::NextPage => NEXT_PAGE_PAYLOAD.to_string(),
            Self::SelectFile(id) => format!("{SELECT_FILE_PREFIX}{id}"),
        }
    }
}

impl TryFrom<&InboundEvent> for NavigationEvent {
    type Error = ProtocolError;

    fn try_from(event: &InboundEvent) -> Result<Self, Self::Error> {
        Self::parse(event.kind, &event.payload)
    }
}
