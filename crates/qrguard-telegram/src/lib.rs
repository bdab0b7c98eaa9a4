//! Telegram adapter (teloxide).
//!
//! This crate implements the `qrguard-core` MessagingPort over the Telegram
//! Bot API and turns Telegram updates into core `IncomingUpdate`s.

use std::time::Duration;

use async_trait::async_trait;

use teloxide::{prelude::*, types::ParseMode};

use tokio::time::sleep;

pub mod handlers;
pub mod router;

use qrguard_core::{
    domain::{ChatId, MessageId, MessageRef},
    errors::Error,
    messaging::port::MessagingPort,
    Result,
};

#[derive(Clone)]
pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::External(format!("telegram error: {e}"))
    }

    /// How long to wait before retrying `e`, or `None` to give up.
    fn retry_delay(e: &teloxide::RequestError, attempts: usize) -> Option<Duration> {
        const MAX_RETRIES: usize = 1;
        match e {
            teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => Some(*d),
            _ => None,
        }
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match Self::retry_delay(&e, attempts) {
                    Some(d) => {
                        attempts += 1;
                        tracing::warn!(retry_after = ?d, "telegram flood control, retrying");
                        sleep(d).await;
                    }
                    None => return Err(Self::map_err(e)),
                },
            }
        }
    }
}

#[async_trait]
impl MessagingPort for TelegramMessenger {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef> {
        let msg = self
            .with_retry(|| {
                self.bot
                    .send_message(Self::tg_chat(chat_id), html.to_string())
                    .parse_mode(ParseMode::Html)
            })
            .await?;

        Ok(MessageRef {
            chat_id,
            message_id: MessageId(msg.id.0),
        })
    }
}
