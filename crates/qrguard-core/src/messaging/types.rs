use crate::domain::{ChatId, Sender};

/// Incoming update, already parsed by the transport adapter.
#[derive(Clone, Debug)]
pub enum IncomingUpdate {
    Command(Command),
    Text(TextMessage),
    Photo(PhotoMessage),
}

#[derive(Clone, Debug)]
pub struct Command {
    pub chat_id: ChatId,
    pub sender: Sender,
    pub name: String,
    pub args: String,
}

#[derive(Clone, Debug)]
pub struct TextMessage {
    pub chat_id: ChatId,
    pub sender: Sender,
    pub text: String,
}

/// A photo whose bytes were already downloaded by the adapter.
#[derive(Clone, Debug)]
pub struct PhotoMessage {
    pub chat_id: ChatId,
    pub sender: Sender,
    pub image: Vec<u8>,
}
