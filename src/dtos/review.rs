//! Review DTOs - Data Transfer Objects per le recensioni

use crate::entities::Review;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ReviewDTO {
    pub review_id: Option<i64>,
    pub session_id: Option<i64>,
    pub student_id: Option<i64>,
    pub tutor_id: Option<i64>,
    pub rating: Option<i64>,
    pub comment: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Review> for ReviewDTO {
    fn from(value: Review) -> Self {
        Self {
            review_id: Some(value.review_id),
            session_id: Some(value.session_id),
            student_id: Some(value.student_id),
            tutor_id: Some(value.tutor_id),
            rating: Some(value.rating),
            comment: value.comment,
            created_at: Some(value.created_at),
        }
    }
}

/// DTO per creare una recensione
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateReviewDTO {
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i64,

    #[validate(length(max = 2000, message = "Comment must be at most 2000 characters"))]
    pub comment: Option<String>,
}

/// Recensioni di un tutor con il riepilogo della media
#[derive(Serialize, Deserialize, Debug)]
pub struct TutorReviewsDTO {
    pub tutor_id: i64,
    pub rating_avg: f64,
    pub rating_count: i64,
    pub reviews: Vec<ReviewDTO>,
}
