use std::sync::Arc;

use teloxide::{net::Download, prelude::*, types::PhotoSize};

use qrguard_core::{
    domain::Sender,
    formatting,
    messaging::types::{IncomingUpdate, PhotoMessage},
};

use crate::router::AppState;

use super::{chat_of, log_outcome};

/// Reject a photo by Telegram's declared size before downloading it.
fn check_declared_size(size: u32, max: usize) -> anyhow::Result<()> {
    let declared = size as usize;
    if declared > max {
        anyhow::bail!("photo is too large ({declared} bytes, max {max})");
    }
    Ok(())
}

/// Download the largest rendition Telegram offers into memory.
async fn download_photo(
    bot: &Bot,
    photos: &[PhotoSize],
    max_bytes: usize,
) -> anyhow::Result<Vec<u8>> {
    let best = photos
        .last()
        .ok_or_else(|| anyhow::anyhow!("no photo sizes"))?;

    check_declared_size(best.file.size, max_bytes)?;

    let file = bot.get_file(best.file.id.clone()).await?;
    let mut buf = Vec::with_capacity(best.file.size as usize);
    bot.download_file(&file.path, &mut buf).await?;
    Ok(buf)
}

pub async fn handle_photo(
    bot: Bot,
    msg: &Message,
    photos: &[PhotoSize],
    sender: Sender,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    let chat_id = chat_of(msg);
    let user_id = sender.user_id;
    let messenger = state.messenger.as_ref();

    // Check availability before touching the file at all.
    match state.handler.photo_received(chat_id, messenger).await {
        Ok(true) => {}
        Ok(false) => return Ok(()),
        Err(e) => {
            log_outcome("photo", user_id, Err(e));
            return Ok(());
        }
    }

    let image = match download_photo(&bot, photos, state.cfg.max_image_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(user_id = user_id.0, error = %e, "photo download failed");
            let res = messenger
                .send_html(chat_id, &formatting::download_failed(&e.to_string()))
                .await
                .map(|_| ());
            log_outcome("photo", user_id, res);
            return Ok(());
        }
    };

    let update = IncomingUpdate::Photo(PhotoMessage {
        chat_id,
        sender,
        image,
    });
    let res = state.handler.handle(update, messenger).await;
    log_outcome("photo", user_id, res);
    Ok(())
}
