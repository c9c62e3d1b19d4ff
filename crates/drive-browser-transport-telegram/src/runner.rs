use crate::bot::handlers::{
    get_user_id_safe, handle_callback, handle_command, handle_text, handle_unauthorized,
    handle_unauthorized_callback, Command,
};
use crate::bot::{TelegramTransport, UnauthorizedCache};
use crate::config::{
    get_unauthorized_cache_max_size, get_unauthorized_cache_ttl, get_unauthorized_cooldown,
    BotSettings,
};
use drive_browser_core::storage::GoogleDriveGateway;
use drive_browser_core::{InteractionController, SessionStore};
use std::sync::Arc;
use teloxide::dispatching::UpdateHandler;
use teloxide::prelude::*;
use teloxide::types::{AllowedUpdate, CallbackQuery};
use teloxide::update_listeners::Polling;
use teloxide::utils::command::BotCommands;
use tracing::{error, info, warn};

/// Run the Telegram transport runtime.
///
/// Exits the process with code 1 when Google Drive authentication or the
/// file browser configuration fails.
pub async fn run_bot(settings: Arc<BotSettings>) {
    let gateway = init_gateway(&settings).await;

    let bot = Bot::new(settings.telegram.telegram_token.clone());
    let controller = init_controller(&settings, gateway, &bot);
    let unauthorized_cache = init_unauthorized_cache();

    if settings.telegram.is_restricted() {
        info!(
            "Access restricted to {} user(s).",
            settings.telegram.allowed_users().len()
        );
    } else {
        warn!("ALLOWED_USERS is not set, the bot is open to every Telegram user.");
    }

    if let Err(e) = bot.set_my_commands(Command::bot_commands()).await {
        warn!("Failed to register bot commands: {}", e);
    }
    match bot.get_me().await {
        Ok(me) => info!("Authorized as @{}", me.username()),
        Err(e) => warn!("Failed to fetch bot info: {}", e),
    }

    let listener = Polling::builder(bot.clone())
        .drop_pending_updates()
        .allowed_updates(vec![AllowedUpdate::Message, AllowedUpdate::CallbackQuery])
        .build();

    info!("Bot is running...");

    Dispatcher::builder(bot, setup_handler())
        .dependencies(dptree::deps![controller, settings, unauthorized_cache])
        .default_handler(|_| async {})
        .enable_ctrlc_handler()
        .build()
        .dispatch_with_listener(
            listener,
            LoggingErrorHandler::with_custom_text("An error from the update listener"),
        )
        .await;
}

async fn init_gateway(settings: &BotSettings) -> Arc<GoogleDriveGateway> {
    match GoogleDriveGateway::connect(settings.browser.as_ref()).await {
        Ok(gateway) => {
            info!("Google Drive gateway initialized.");
            if gateway.check_connection().await.is_err() {
                error!("Google Drive connection check returned error.");
            }
            Arc::new(gateway)
        }
        Err(e) => {
            error!("Failed to initialize Google Drive gateway: {}", e);
            std::process::exit(1);
        }
    }
}

fn init_controller(
    settings: &BotSettings,
    gateway: Arc<GoogleDriveGateway>,
    bot: &Bot,
) -> Arc<InteractionController> {
    let page_size = match settings.browser.page_size() {
        Ok(page_size) => page_size,
        Err(e) => {
            error!("Invalid file browser configuration: {}", e);
            std::process::exit(1);
        }
    };

    let sessions = SessionStore::from_settings(settings.browser.as_ref());
    info!(
        "Session store initialized (capacity: {}, idle: {}s, page size: {})",
        settings.browser.session_cache_capacity,
        settings.browser.session_idle_secs,
        page_size.get()
    );

    Arc::new(InteractionController::new(
        gateway,
        Arc::new(TelegramTransport::new(bot.clone())),
        sessions,
        page_size,
        settings.browser.staging_dir.clone(),
    ))
}

fn init_unauthorized_cache() -> Arc<UnauthorizedCache> {
    let cooldown = get_unauthorized_cooldown();
    let ttl = get_unauthorized_cache_ttl();
    let max_size = get_unauthorized_cache_max_size();

    info!(
        "Initializing UnauthorizedCache (cooldown: {}s, ttl: {}s, max_size: {})",
        cooldown, ttl, max_size
    );

    Arc::new(UnauthorizedCache::new(cooldown, ttl, max_size))
}

fn setup_handler() -> UpdateHandler<teloxide::RequestError> {
    dptree::entry()
        .branch(
            Update::filter_callback_query()
                .filter(|q: CallbackQuery, settings: Arc<BotSettings>| {
                    settings.telegram.is_allowed(q.from.id.0.cast_signed())
                })
                .endpoint(handle_callback),
        )
        .branch(
            Update::filter_message().branch(
                dptree::filter(|msg: Message, settings: Arc<BotSettings>| {
                    settings.telegram.is_allowed(get_user_id_safe(&msg))
                })
                .branch(
                    dptree::entry()
                        .filter_command::<Command>()
                        .endpoint(handle_command),
                )
                .branch(dptree::endpoint(handle_text)),
            ),
        )
        // Everyone not admitted above
        .branch(Update::filter_callback_query().endpoint(handle_unauthorized_callback))
        .branch(Update::filter_message().endpoint(handle_unauthorized))
}
