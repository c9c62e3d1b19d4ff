#![deny(missing_docs)]
//! Drive Browser core library.
//!
//! Per-chat pagination state, the interaction state machine and the
//! storage/transport seams it drives.

/// Configuration management.
pub mod config;
/// Interaction controller (event state machine).
pub mod controller;
/// Parsing of raw chat payloads into navigation events.
pub mod navigation;
/// Page window computation.
pub mod pagination;
/// Per-chat pagination sessions.
pub mod session;
/// Storage gateway (Google Drive).
pub mod storage;
/// Outbound chat transport seam.
pub mod transport;
/// Texts and keyboard layout of the file browser.
pub mod view;

#[cfg(test)]
pub mod testing;

pub use controller::{ControllerError, InteractionController, Outcome};
pub use navigation::{ChatIdentity, EventKind, InboundEvent, NavigationEvent, ProtocolError};
pub use pagination::{paginate, Page, PageSize};
pub use session::{SessionError, SessionGuard, SessionStore};
pub use storage::{FileEntry, GatewayError, StorageGateway};
pub use transport::{Button, ChatTransport, Keyboard, TransportError};
