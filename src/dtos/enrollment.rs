//! Enrollment DTOs - Data Transfer Objects per le iscrizioni alle classi

use crate::entities::ClassEnrollment;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EnrollmentDTO {
    pub student_id: Option<i64>,
    pub tutor_id: Option<i64>,
    pub subject: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl From<ClassEnrollment> for EnrollmentDTO {
    fn from(value: ClassEnrollment) -> Self {
        Self {
            student_id: Some(value.student_id),
            tutor_id: Some(value.tutor_id),
            subject: Some(value.subject),
            joined_at: Some(value.joined_at),
        }
    }
}

/// DTO per iscriversi alla classe di un tutor
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateEnrollmentDTO {
    pub tutor_id: i64,

    #[validate(length(min = 1, max = 64, message = "Subject must be 1-64 characters"))]
    pub subject: String,
}

/// Riepilogo della classe di un tutor con la quota a studente
#[derive(Serialize, Deserialize, Debug)]
pub struct ClassSummaryDTO {
    pub tutor_id: i64,
    pub class_price_cents: i64,
    pub enrolled_count: i64,
    // invariante: price_per_student_cents == class_price_cents / enrolled_count
    pub price_per_student_cents: i64,
    pub enrollments: Vec<EnrollmentDTO>,
}
