//! Query DTOs - Data Transfer Objects per query di ricerca

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// DTO per query parameters di ricerca tutor
/// /tutors?subject=algebra&max_rate_cents=3000&min_rating=4&search=mar
#[derive(Serialize, Deserialize, Debug)]
pub struct TutorSearchQuery {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub max_rate_cents: Option<i64>,
    #[serde(default)]
    pub min_rating: Option<f64>,
    #[serde(default)]
    pub search: Option<String>,
}

/// DTO per query parameters del calcolo slot
/// /tutors/{id}/slots?from=...&until=...&duration_mins=60
#[derive(Serialize, Deserialize, Debug)]
pub struct SlotsQuery {
    pub from: DateTime<Utc>,
    pub until: DateTime<Utc>,
    #[serde(default = "default_slot_duration")]
    pub duration_mins: u32,
}

fn default_slot_duration() -> u32 {
    60
}

/// DTO per query parameters di paginazione messaggi
#[derive(Serialize, Deserialize, Debug)]
pub struct MessagesQuery {
    #[serde(default)]
    pub before_date: Option<DateTime<Utc>>,
}
