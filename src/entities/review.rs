//! Review entity - Recensione di una sessione

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Review {
    pub review_id: i64,
    pub session_id: i64,
    pub student_id: i64,
    pub tutor_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}
