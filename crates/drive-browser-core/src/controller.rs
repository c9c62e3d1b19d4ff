//! Interaction controller
//!
//! Turns navigation events into session updates, gateway calls and chat
//! output. Every event of a chat runs under that chat's session guard, so
//! events of one chat are applied one at a time while different chats run
//! in parallel.

use crate::navigation::{ChatIdentity, InboundEvent, NavigationEvent};
use crate::pagination::{paginate, PageSize};
use crate::session::{SessionError, SessionStore};
use crate::storage::{GatewayError, StorageGateway};
use crate::transport::{ChatTransport, TransportError};
use crate::view::{page_keyboard, BrowserView, DefaultBrowserView};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, info};

/// Failure while handling one event
#[derive(Error, Debug)]
pub enum ControllerError {
    /// Listing or downloading failed
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    /// Sending to the chat failed
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Navigation on a chat without session
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// What handling an event produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A page was sent
    Rendered {
        /// Page that was shown
        page_index: usize,
        /// Number of file buttons on it
        entries: usize,
    },
    /// A file was sent as a document
    Delivered {
        /// Local artifact that was sent
        path: PathBuf,
    },
    /// Nothing to do (e.g. "previous" on the first page)
    Ignored,
}

/// State machine driving the file browser
pub struct InteractionController {
    sessions: SessionStore,
    gateway: Arc<dyn StorageGateway>,
    transport: Arc<dyn ChatTransport>,
    view: Arc<dyn BrowserView>,
    page_size: PageSize,
    staging_dir: PathBuf,
}

impl InteractionController {
    /// Create a controller with the default view
    #[must_use]
    pub fn new(
        gateway: Arc<dyn StorageGateway>,
        transport: Arc<dyn ChatTransport>,
        sessions: SessionStore,
        page_size: PageSize,
        staging_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            sessions,
            gateway,
            transport,
            view: Arc::new(DefaultBrowserView),
            page_size,
            staging_dir: staging_dir.into(),
        }
    }

    /// Replace the texts of the browser
    #[must_use]
    pub fn with_view(mut self, view: Arc<dyn BrowserView>) -> Self {
        self.view = view;
        self
    }

    /// Session store backing this controller
    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Handle one raw inbound event to completion.
    ///
    /// This is the error boundary: failures are logged and the event is
    /// dropped, the chat receives nothing.
    pub async fn dispatch(&self, event: InboundEvent) {
        let navigation = match NavigationEvent::try_from(&event) {
            Ok(navigation) => navigation,
            Err(e) => {
                debug!(chat = %event.chat, error = %e, "Ignoring inbound payload");
                return;
            }
        };

        info!(chat = %event.chat, event = ?navigation, "Handling navigation event");
        match self.handle(event.chat, navigation.clone()).await {
            Ok(outcome) => debug!(chat = %event.chat, ?outcome, "Event handled"),
            Err(e) => error!(
                chat = %event.chat,
                event = ?navigation,
                error = %e,
                "Event dropped"
            ),
        }
    }

    /// Apply a parsed event for `chat`.
    ///
    /// Session mutations made before a failure stay in effect.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError` if the gateway, the transport or the
    /// session rejects the operation.
    pub async fn handle(
        &self,
        chat: ChatIdentity,
        event: NavigationEvent,
    ) -> Result<Outcome, ControllerError> {
        let mut session = self.sessions.acquire(chat).await;

        match event {
            NavigationEvent::Start => {
                session.reset();
                self.render(chat, 0).await
            }
            NavigationEvent::PreviousPage => {
                if session.page_index() == 0 {
                    debug!(%chat, "Already on the first page");
                    return Ok(Outcome::Ignored);
                }
                let page_index = session.decrement()?;
                self.render(chat, page_index).await
            }
            NavigationEvent::NextPage => {
                let page_index = session.increment()?;
                self.render(chat, page_index).await
            }
            NavigationEvent::SelectFile(file_id) => self.deliver(chat, &file_id).await,
        }
    }

    async fn render(&self, chat: ChatIdentity, page_index: usize) -> Result<Outcome, ControllerError> {
        let files = self.gateway.list_files().await?;
        let page = paginate(&files, page_index, self.page_size);
        let keyboard = page_keyboard(self.view.as_ref(), &page);

        self.transport
            .send_message(chat, self.view.choose_file_prompt(), &keyboard)
            .await?;

        Ok(Outcome::Rendered {
            page_index,
            entries: page.entries.len(),
        })
    }

    async fn deliver(&self, chat: ChatIdentity, file_id: &str) -> Result<Outcome, ControllerError> {
        // Per-chat subdirectory keeps concurrent downloads of one file apart
        let destination = self.staging_dir.join(chat.to_string());
        let path = self.gateway.download_file(file_id, &destination).await?;

        self.transport.send_document(chat, &path).await?;
        info!(%chat, file_id, path = %path.display(), "File delivered");

        Ok(Outcome::Delivered { path })
    }
}
