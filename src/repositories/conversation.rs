//! ConversationRepository - Repository per le conversazioni

use super::Read;
use crate::entities::Conversation;
use chrono::Utc;
use sqlx::{Error, SqlitePool};

// CONVERSATION REPO
pub struct ConversationRepository {
    connection_pool: SqlitePool,
}

impl ConversationRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn find_by_pair(
        &self,
        user_a: &i64,
        user_b: &i64,
    ) -> Result<Option<Conversation>, Error> {
        let (a, b) = Conversation::normalized_pair(*user_a, *user_b);
        let conversation = sqlx::query_as::<_, Conversation>(
            "SELECT conversation_id, party_a, party_b, created_at
             FROM conversations WHERE party_a = ? AND party_b = ?",
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(conversation)
    }

    /// Ritrova o crea la conversazione tra due utenti; la coppia è
    /// normalizzata quindi l'ordine degli argomenti non conta
    pub async fn get_or_create(
        &self,
        user_a: &i64,
        user_b: &i64,
    ) -> Result<Conversation, Error> {
        if let Some(existing) = self.find_by_pair(user_a, user_b).await? {
            return Ok(existing);
        }

        let (a, b) = Conversation::normalized_pair(*user_a, *user_b);
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO conversations (party_a, party_b, created_at) VALUES (?, ?, ?)",
        )
        .bind(a)
        .bind(b)
        .bind(created_at)
        .execute(&self.connection_pool)
        .await?;

        Ok(Conversation {
            conversation_id: result.last_insert_rowid(),
            party_a: a,
            party_b: b,
            created_at,
        })
    }

    pub async fn find_many_by_user(&self, user_id: &i64) -> Result<Vec<Conversation>, Error> {
        let conversations = sqlx::query_as::<_, Conversation>(
            "SELECT conversation_id, party_a, party_b, created_at
             FROM conversations
             WHERE party_a = ?1 OR party_b = ?1
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(conversations)
    }
}

impl Read<Conversation, i64> for ConversationRepository {
    async fn read(&self, id: &i64) -> Result<Option<Conversation>, Error> {
        let conversation = sqlx::query_as::<_, Conversation>(
            "SELECT conversation_id, party_a, party_b, created_at
             FROM conversations WHERE conversation_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(conversation)
    }
}
