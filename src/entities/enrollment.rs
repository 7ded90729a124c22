//! ClassEnrollment entity - Iscrizione di uno studente alla classe di un tutor

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct ClassEnrollment {
    pub student_id: i64,
    pub tutor_id: i64,
    pub subject: String,
    pub joined_at: DateTime<Utc>,
}
