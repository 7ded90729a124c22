//! Conversation entity - Conversazione tra due utenti

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Conversation {
    pub conversation_id: i64,
    // coppia normalizzata: party_a < party_b, così la coppia è unica
    pub party_a: i64,
    pub party_b: i64,
    pub created_at: DateTime<Utc>,
}

impl Conversation {
    /// Coppia ordinata (min, max) per la ricerca/creazione
    pub fn normalized_pair(user_a: i64, user_b: i64) -> (i64, i64) {
        if user_a <= user_b {
            (user_a, user_b)
        } else {
            (user_b, user_a)
        }
    }

    pub fn involves(&self, user_id: i64) -> bool {
        self.party_a == user_id || self.party_b == user_id
    }

    pub fn counterparty_of(&self, user_id: i64) -> i64 {
        if self.party_a == user_id {
            self.party_b
        } else {
            self.party_a
        }
    }
}
