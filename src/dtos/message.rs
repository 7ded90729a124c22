//! Message DTOs - Data Transfer Objects per conversazioni e messaggi

use crate::dtos::UserDTO;
use crate::entities::{Conversation, Message};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageDTO {
    pub message_id: Option<i64>,
    pub conversation_id: Option<i64>,
    pub sender_id: Option<i64>,
    pub content: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
}

impl From<Message> for MessageDTO {
    fn from(value: Message) -> Self {
        Self {
            message_id: Some(value.message_id),
            conversation_id: Some(value.conversation_id),
            sender_id: Some(value.sender_id),
            content: Some(value.content),
            created_at: Some(value.created_at),
            read_at: value.read_at,
        }
    }
}

/// DTO per inviare un nuovo messaggio
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateMessageDTO {
    #[validate(length(
        min = 1,
        max = 5000,
        message = "Message content must be between 1 and 5000 characters"
    ))]
    pub content: String,
}

/// DTO per aprire (o ritrovare) la conversazione con un altro utente
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OpenConversationDTO {
    pub user_id: i64,
}

/// Conversazione arricchita con controparte e contatore non letti
#[derive(Serialize, Deserialize, Debug)]
pub struct ConversationDTO {
    pub conversation_id: i64,
    pub created_at: DateTime<Utc>,
    pub counterparty: Option<UserDTO>,
    pub unread_count: i64,
}

impl ConversationDTO {
    pub fn from_parts(conv: Conversation, counterparty: Option<UserDTO>, unread_count: i64) -> Self {
        Self {
            conversation_id: conv.conversation_id,
            created_at: conv.created_at,
            counterparty,
            unread_count,
        }
    }
}
