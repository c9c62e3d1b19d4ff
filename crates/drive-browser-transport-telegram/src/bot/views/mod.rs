//! View layer for bot UI components
//!
//! Converts transport-neutral keyboards into Telegram markup.

use drive_browser_core::Keyboard;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

/// Inline markup with one Telegram row per keyboard row
#[must_use]
pub fn inline_keyboard(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    let rows: Vec<Vec<InlineKeyboardButton>> = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|button| {
                    InlineKeyboardButton::callback(button.label.clone(), button.payload.clone())
                })
                .collect()
        })
        .collect();

    InlineKeyboardMarkup::new(rows)
}
