use crate::bot::{DenialKind, UnauthorizedCache};
use drive_browser_core::navigation::START_COMMAND;
use drive_browser_core::{InboundEvent, InteractionController};
use std::sync::Arc;
use teloxide::types::User;
use teloxide::{prelude::*, utils::command::BotCommands};
use tracing::{debug, error, info, warn};

/// Result type shared by all endpoints of the update tree
pub type HandlerResult = Result<(), teloxide::RequestError>;

/// Supported commands for the bot
#[derive(BotCommands, Clone)]
#[command(rename_rule = "lowercase", description = "Supported commands:")]
pub enum Command {
    /// Show the first page of the file list
    #[command(description = "Browse your Google Drive files.")]
    Start,
}

/// Sender's user ID, or 0 for anonymous messages
#[must_use]
pub fn get_user_id_safe(msg: &Message) -> i64 {
    msg.from.as_ref().map_or(0, |u| u.id.0.cast_signed())
}

/// Sender's username or first name
#[must_use]
pub fn get_user_name(msg: &Message) -> String {
    msg.from
        .as_ref()
        .map_or_else(|| "Unknown".to_string(), display_name)
}

fn display_name(user: &User) -> String {
    if let Some(ref username) = user.username {
        return username.clone();
    }
    if !user.first_name.is_empty() {
        return user.first_name.clone();
    }
    "Unknown".to_string()
}

const ACCESS_DENIED: &str = "⛔️ Access denied";

/// Handle a parsed bot command.
///
/// # Errors
///
/// Never fails; controller errors are logged inside `dispatch`.
pub async fn handle_command(
    msg: Message,
    cmd: Command,
    controller: Arc<InteractionController>,
) -> HandlerResult {
    match cmd {
        Command::Start => {
            info!(
                "User {} ({}) opened the file browser.",
                get_user_id_safe(&msg),
                get_user_name(&msg)
            );
            controller
                .dispatch(InboundEvent::message(msg.chat.id.0, START_COMMAND))
                .await;
        }
    }
    respond(())
}

/// Forward any other text; the controller ignores what it does not know.
///
/// # Errors
///
/// Never fails.
pub async fn handle_text(msg: Message, controller: Arc<InteractionController>) -> HandlerResult {
    if let Some(text) = msg.text() {
        controller
            .dispatch(InboundEvent::message(msg.chat.id.0, text))
            .await;
    }
    respond(())
}

/// Handle an inline button press.
///
/// The query is acknowledged first so the client stops its spinner, even
/// when the payload turns out to be unknown.
///
/// # Errors
///
/// Never fails; a failed acknowledgement is only logged.
pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    controller: Arc<InteractionController>,
) -> HandlerResult {
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        warn!("Failed to answer callback query {}: {}", q.id, e);
    }

    let Some(data) = q.data.as_deref() else {
        return respond(());
    };

    let Some(chat_id) = q.message.as_ref().map(|msg| msg.chat().id) else {
        debug!(
            "Callback from user {} has no message attached, ignoring",
            q.from.id
        );
        return respond(());
    };

    controller
        .dispatch(InboundEvent::callback(chat_id.0, data))
        .await;
    respond(())
}

/// Reply "Access denied" to users outside the allowlist, once per cooldown.
///
/// # Errors
///
/// Never fails; send errors are logged.
pub async fn handle_unauthorized(
    bot: Bot,
    msg: Message,
    cache: Arc<UnauthorizedCache>,
) -> HandlerResult {
    let user_id = get_user_id_safe(&msg);
    let user_name = get_user_name(&msg);

    if cache.should_send(user_id, DenialKind::Message, &user_name).await {
        info!(
            "⛔️ Unauthorized access from user {} ({}). Sending denial message.",
            user_id, user_name
        );

        if let Err(e) = bot.send_message(msg.chat.id, ACCESS_DENIED).await {
            error!("Failed to send access denied message to {}: {}", user_id, e);
        } else {
            cache.mark_sent(user_id, DenialKind::Message).await;
        }
    }

    respond(())
}

/// Text to show a user outside the allowlist who pressed a button.
///
/// The first press in a cooldown period gets the denial, later presses are
/// answered without text.
pub async fn callback_denial(cache: &UnauthorizedCache, user: &User) -> Option<&'static str> {
    let user_id = user.id.0.cast_signed();
    cache
        .should_send(user_id, DenialKind::Button, &display_name(user))
        .await
        .then_some(ACCESS_DENIED)
}

/// Answer a button press from a user outside the allowlist.
///
/// The query is always answered so the client stops its spinner.
///
/// # Errors
///
/// Never fails; a failed answer is only logged.
pub async fn handle_unauthorized_callback(
    bot: Bot,
    q: CallbackQuery,
    cache: Arc<UnauthorizedCache>,
) -> HandlerResult {
    let user_id = q.from.id.0.cast_signed();
    let denial = callback_denial(&cache, &q.from).await;

    let mut answer = bot.answer_callback_query(q.id.clone());
    if let Some(text) = denial {
        info!(
            "⛔️ Unauthorized button press from user {} ({}).",
            user_id,
            display_name(&q.from)
        );
        answer = answer.text(text);
    }

    match answer.await {
        Ok(_) if denial.is_some() => cache.mark_sent(user_id, DenialKind::Button).await,
        Ok(_) => {}
        Err(e) => warn!("Failed to answer callback query {}: {}", q.id, e),
    }

    respond(())
}
