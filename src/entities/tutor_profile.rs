//! TutorProfile entity - Profilo tutor con tariffe e disponibilità

use super::availability::WeeklyAvailability;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct TutorProfile {
    pub user_id: i64,
    pub display_name: String,
    pub bio: Option<String>,
    // lista di materie serializzata come array JSON (es. ["algebra","physics"])
    pub subjects: String,
    pub hourly_rate_cents: i64,
    // prezzo totale della classe di gruppo, diviso tra gli iscritti
    pub class_price_cents: i64,
    // settimana tipo serializzata come blob JSON, vedi WeeklyAvailability
    pub availability: String,
    pub connect_account_id: Option<String>,
    // media voti denormalizzata, ricalcolata a ogni nuova recensione
    pub rating_avg: f64,
    pub rating_count: i64,
}

impl TutorProfile {
    pub fn subject_list(&self) -> Vec<String> {
        serde_json::from_str(&self.subjects).unwrap_or_default()
    }

    /// Il blob corrotto degrada a "mai disponibile", non a errore
    pub fn weekly_availability(&self) -> WeeklyAvailability {
        serde_json::from_str(&self.availability).unwrap_or_default()
    }

    pub fn teaches(&self, subject: &str) -> bool {
        self.subject_list().iter().any(|s| s == subject)
    }
}
