use async_trait::async_trait;

use crate::{
    domain::{ChatId, MessageRef},
    Result,
};

/// Outbound side of the messaging transport.
///
/// Telegram is the only implementation; handlers in `qrguard-core` only ever
/// talk to this trait so they can be driven by a test double.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send_html(&self, chat_id: ChatId, html: &str) -> Result<MessageRef>;
}
