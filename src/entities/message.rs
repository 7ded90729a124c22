//! Message entity - Messaggio in una conversazione

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Message {
    pub message_id: i64,
    pub conversation_id: i64,
    pub sender_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    // stato di lettura: None finché il destinatario non apre la conversazione
    pub read_at: Option<DateTime<Utc>>,
}
