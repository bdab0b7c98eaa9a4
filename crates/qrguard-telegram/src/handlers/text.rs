use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use qrguard_core::{
    domain::Sender,
    messaging::types::{IncomingUpdate, TextMessage},
};

use crate::router::AppState;

use super::{chat_of, log_outcome};

pub async fn handle_text(
    msg: &Message,
    text: &str,
    sender: Sender,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    if text.trim().is_empty() {
        return Ok(());
    }

    let user_id = sender.user_id;
    let update = IncomingUpdate::Text(TextMessage {
        chat_id: chat_of(msg),
        sender,
        text: text.to_string(),
    });

    let res = state.handler.handle(update, state.messenger.as_ref()).await;
    log_outcome("text", user_id, res);
    Ok(())
}
