use std::sync::Arc;

use teloxide::{prelude::*, types::Message};

use qrguard_core::{
    domain::Sender,
    messaging::types::{Command, IncomingUpdate},
    utils::parse_command,
};

use crate::router::AppState;

use super::{chat_of, log_outcome};

pub async fn handle_command(
    msg: &Message,
    text: &str,
    sender: Sender,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let (name, args) = parse_command(text);
    let user_id = sender.user_id;

    let update = IncomingUpdate::Command(Command {
        chat_id: chat_of(msg),
        sender,
        name,
        args,
    });

    let res = state.handler.handle(update, state.messenger.as_ref()).await;
    log_outcome("command", user_id, res);
    Ok(())
}
