/// Command, message and callback handlers
pub mod handlers;
/// Resilient messaging with automatic retry for Telegram API operations
pub mod resilient;
/// `ChatTransport` implementation over the Bot API
pub mod transport;
/// Unauthorized access flood protection
pub mod unauthorized_cache;
/// View layer for UI components (keyboards)
pub mod views;

pub use transport::TelegramTransport;
pub use unauthorized_cache::{DenialKind, UnauthorizedCache};
