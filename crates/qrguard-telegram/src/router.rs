use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use qrguard_core::{config::Config, handler::Handler, messaging::port::MessagingPort};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub handler: Arc<Handler>,
    pub messenger: Arc<dyn MessagingPort>,
}

pub async fn run_polling(cfg: Arc<Config>, handler: Arc<Handler>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    match bot.get_me().await {
        Ok(me) => tracing::info!(username = %me.username(), "qrguard started"),
        Err(e) => tracing::warn!(error = %e, "could not fetch bot identity"),
    }
    tracing::info!(
        qr_available = handler.capabilities().qr_available,
        max_image_bytes = cfg.max_image_bytes,
        "capabilities"
    );

    let messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));

    let state = Arc::new(AppState {
        cfg,
        handler,
        messenger,
    });

    let schema = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    // The dispatcher runs one update at a time per chat and chats in parallel.
    Dispatcher::builder(bot, schema)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}
