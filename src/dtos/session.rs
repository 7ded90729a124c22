//! Session DTOs - Data Transfer Objects per le sessioni

use crate::dtos::UserDTO;
use crate::entities::{Session, SessionStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SessionDTO {
    pub session_id: Option<i64>,
    pub student_id: Option<i64>,
    pub tutor_id: Option<i64>,
    pub subject: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub duration_mins: Option<i64>,
    pub price_cents: Option<i64>,
    pub status: Option<SessionStatus>,
    pub meeting_link: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Session> for SessionDTO {
    fn from(value: Session) -> Self {
        Self {
            session_id: Some(value.session_id),
            student_id: Some(value.student_id),
            tutor_id: Some(value.tutor_id),
            subject: Some(value.subject),
            scheduled_at: Some(value.scheduled_at),
            duration_mins: Some(value.duration_mins),
            price_cents: Some(value.price_cents),
            status: Some(value.status),
            meeting_link: value.meeting_link,
            created_at: Some(value.created_at),
            // payment_order_id resta interno, il client vede solo lo stato
        }
    }
}

/// DTO per proporre una sessione (il prezzo NON è accettato dal client)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateSessionDTO {
    pub tutor_id: i64,

    #[validate(length(min = 1, max = 64, message = "Subject must be 1-64 characters"))]
    pub subject: String,

    pub scheduled_at: DateTime<Utc>,

    #[validate(range(min = 30, max = 180, message = "Duration must be 30-180 minutes"))]
    pub duration_mins: i64,
}

/// DTO arricchito con i profili delle due parti
#[derive(Serialize, Deserialize, Debug)]
pub struct EnrichedSessionDTO {
    pub session_id: i64,
    pub subject: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_mins: i64,
    pub price_cents: i64,
    pub status: SessionStatus,
    pub meeting_link: Option<String>,
    pub student: Option<UserDTO>,
    pub tutor: Option<UserDTO>,
}
