//! MessageRepository - Repository per la gestione dei messaggi

use super::{Create, Read};
use crate::entities::Message;
use chrono::{DateTime, Utc};
use sqlx::{Error, SqlitePool};

#[derive(Debug, Clone)]
pub struct NewMessageRecord {
    pub conversation_id: i64,
    pub sender_id: i64,
    pub content: String,
}

// MESSAGE REPO
pub struct MessageRepository {
    connection_pool: SqlitePool,
}

impl MessageRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Get paginated messages for a conversation
    ///
    /// Supports both:
    /// - Loading recent messages (when `before_date` is None): gets the most recent `limit` messages
    /// - Loading older messages (when `before_date` is Some): gets `limit` messages before that date
    ///
    /// # Returns
    /// Messages ordered from newest to oldest (DESC), limited to `limit` count
    pub async fn find_many_paginated(
        &self,
        conversation_id: &i64,
        before_date: Option<&DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Message>, Error> {
        let messages = if let Some(before) = before_date {
            sqlx::query_as::<_, Message>(
                "SELECT message_id, conversation_id, sender_id, content, created_at, read_at
                 FROM messages
                 WHERE conversation_id = ? AND created_at < ?
                 ORDER BY created_at DESC
                 LIMIT ?",
            )
            .bind(conversation_id)
            .bind(before)
            .bind(limit)
            .fetch_all(&self.connection_pool)
            .await?
        } else {
            sqlx::query_as::<_, Message>(
                "SELECT message_id, conversation_id, sender_id, content, created_at, read_at
                 FROM messages
                 WHERE conversation_id = ?
                 ORDER BY created_at DESC
                 LIMIT ?",
            )
            .bind(conversation_id)
            .bind(limit)
            .fetch_all(&self.connection_pool)
            .await?
        };

        Ok(messages)
    }

    /// Messaggi della controparte non ancora letti dal lettore
    pub async fn count_unread(
        &self,
        conversation_id: &i64,
        reader_id: &i64,
    ) -> Result<i64, Error> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM messages
             WHERE conversation_id = ? AND sender_id != ? AND read_at IS NULL",
        )
        .bind(conversation_id)
        .bind(reader_id)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(count.0)
    }

    /// Timbra read_at sui messaggi della controparte; idempotente perché
    /// tocca solo le righe con read_at IS NULL
    pub async fn mark_read(
        &self,
        conversation_id: &i64,
        reader_id: &i64,
        read_at: &DateTime<Utc>,
    ) -> Result<u64, Error> {
        let result = sqlx::query(
            "UPDATE messages SET read_at = ?
             WHERE conversation_id = ? AND sender_id != ? AND read_at IS NULL",
        )
        .bind(read_at)
        .bind(conversation_id)
        .bind(reader_id)
        .execute(&self.connection_pool)
        .await?;

        Ok(result.rows_affected())
    }
}

impl Create<Message, NewMessageRecord> for MessageRepository {
    async fn create(&self, data: &NewMessageRecord) -> Result<Message, Error> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO messages (conversation_id, sender_id, content, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(data.conversation_id)
        .bind(data.sender_id)
        .bind(&data.content)
        .bind(created_at)
        .execute(&self.connection_pool)
        .await?;

        Ok(Message {
            message_id: result.last_insert_rowid(),
            conversation_id: data.conversation_id,
            sender_id: data.sender_id,
            content: data.content.clone(),
            created_at,
            read_at: None,
        })
    }
}

impl Read<Message, i64> for MessageRepository {
    async fn read(&self, id: &i64) -> Result<Option<Message>, Error> {
        let message = sqlx::query_as::<_, Message>(
            "SELECT message_id, conversation_id, sender_id, content, created_at, read_at
             FROM messages WHERE message_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(message)
    }
}
