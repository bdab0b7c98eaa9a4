//! Telegram update handlers.
//!
//! Each handler is a small adapter that:
//! - extracts the sender and payload from the teloxide `Message`
//! - downloads media if needed
//! - hands a core `IncomingUpdate` to `qrguard-core`'s handler

use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use qrguard_core::domain::{Sender, UserId};

use crate::router::AppState;

mod commands;
mod photo;
mod text;

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(sender) = sender_of(&msg) else {
        return Ok(());
    };

    if let Some(text) = msg.text() {
        return match text_kind(text) {
            TextKind::Command => commands::handle_command(&msg, text, sender, state).await,
            TextKind::Plain => text::handle_text(&msg, text, sender, state).await,
        };
    }

    if let Some(photos) = msg.photo() {
        return photo::handle_photo(bot, &msg, photos, sender, state).await;
    }

    // Stickers, voice, documents and the rest are not scanned.
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum TextKind {
    Command,
    Plain,
}

fn text_kind(text: &str) -> TextKind {
    if text.starts_with('/') {
        TextKind::Command
    } else {
        TextKind::Plain
    }
}

fn sender_of(msg: &Message) -> Option<Sender> {
    let user = msg.from()?;
    Some(Sender {
        user_id: UserId(user.id.0 as i64),
        first_name: user.first_name.clone(),
        username: user.username.clone(),
    })
}

fn chat_of(msg: &Message) -> qrguard_core::domain::ChatId {
    qrguard_core::domain::ChatId(msg.chat.id.0)
}

/// Core failures are logged, never propagated into the dispatcher.
fn log_outcome(kind: &str, user_id: UserId, res: qrguard_core::Result<()>) {
    if let Err(e) = res {
        tracing::warn!(kind, user_id = user_id.0, error = %e, "failed to handle update");
    }
}
