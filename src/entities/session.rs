//! Session entity - Sessione di tutoraggio e calcolo prezzi

use super::enums::SessionStatus;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, sqlx::FromRow)]
pub struct Session {
    pub session_id: i64,
    pub student_id: i64,
    pub tutor_id: i64,
    pub subject: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_mins: i64,
    pub price_cents: i64,
    pub status: SessionStatus,
    pub meeting_link: Option<String>,
    // id ordine assegnato dal provider di pagamento, presente solo dopo la create
    pub payment_order_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn ends_at(&self) -> DateTime<Utc> {
        self.scheduled_at + Duration::minutes(self.duration_mins)
    }

    pub fn involves(&self, user_id: i64) -> bool {
        self.student_id == user_id || self.tutor_id == user_id
    }

    /// Prezzo della sessione: tariffa oraria prorata sulla durata,
    /// in centesimi arrotondati per difetto. Il prezzo è SEMPRE calcolato
    /// lato server dalla tariffa corrente del tutor.
    pub fn price_for(hourly_rate_cents: i64, duration_mins: i64) -> i64 {
        hourly_rate_cents * duration_mins / 60
    }

    /// Quota a studente di una classe di gruppo: totale diviso iscritti,
    /// centesimi arrotondati per difetto. Zero iscritti -> quota zero.
    pub fn price_per_student(class_total_cents: i64, enrolled_count: i64) -> i64 {
        if enrolled_count <= 0 {
            return 0;
        }
        class_total_cents / enrolled_count
    }
}
