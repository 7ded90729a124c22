//! StudentProfile entity - Profilo studente

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct StudentProfile {
    pub user_id: i64,
    pub display_name: String,
    pub learning_goals: Option<String>,
    pub learning_style: Option<String>,
    pub grade_level: Option<String>,
}
