//! Profile DTOs - Data Transfer Objects per i profili di ruolo

use crate::entities::{StudentProfile, TutorProfile, WeeklyAvailability};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Struct per gestire io col client (vista pubblica del tutor)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TutorProfileDTO {
    pub user_id: Option<i64>,
    pub display_name: Option<String>,
    pub bio: Option<String>,
    pub subjects: Option<Vec<String>>,
    pub hourly_rate_cents: Option<i64>,
    pub class_price_cents: Option<i64>,
    pub availability: Option<WeeklyAvailability>,
    pub rating_avg: Option<f64>,
    pub rating_count: Option<i64>,
    // il client deve solo sapere se l'onboarding pagamenti è completo
    pub payouts_enabled: Option<bool>,
}

impl From<TutorProfile> for TutorProfileDTO {
    fn from(value: TutorProfile) -> Self {
        let subjects = value.subject_list();
        let availability = value.weekly_availability();
        Self {
            user_id: Some(value.user_id),
            display_name: Some(value.display_name),
            bio: value.bio,
            subjects: Some(subjects),
            hourly_rate_cents: Some(value.hourly_rate_cents),
            class_price_cents: Some(value.class_price_cents),
            availability: Some(availability),
            rating_avg: Some(value.rating_avg),
            rating_count: Some(value.rating_count),
            payouts_enabled: Some(value.connect_account_id.is_some()),
        }
    }
}

/// DTO per l'aggiornamento parziale del profilo tutor
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct UpdateTutorProfileDTO {
    #[validate(length(min = 1, max = 64, message = "Display name must be 1-64 characters"))]
    pub display_name: Option<String>,

    #[validate(length(max = 2000, message = "Bio must be at most 2000 characters"))]
    pub bio: Option<String>,

    #[validate(length(min = 1, max = 20, message = "Subjects must be 1-20 entries"))]
    pub subjects: Option<Vec<String>>,

    #[validate(range(min = 500, max = 50000, message = "Hourly rate must be 5-500 EUR"))]
    pub hourly_rate_cents: Option<i64>,

    #[validate(range(min = 0, max = 500000, message = "Class price out of range"))]
    pub class_price_cents: Option<i64>,

    pub availability: Option<WeeklyAvailability>,
}

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct StudentProfileDTO {
    pub user_id: Option<i64>,
    pub display_name: Option<String>,
    pub learning_goals: Option<String>,
    pub learning_style: Option<String>,
    pub grade_level: Option<String>,
}

impl From<StudentProfile> for StudentProfileDTO {
    fn from(value: StudentProfile) -> Self {
        Self {
            user_id: Some(value.user_id),
            display_name: Some(value.display_name),
            learning_goals: value.learning_goals,
            learning_style: value.learning_style,
            grade_level: value.grade_level,
        }
    }
}

/// DTO per l'aggiornamento parziale del profilo studente
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct UpdateStudentProfileDTO {
    #[validate(length(min = 1, max = 64, message = "Display name must be 1-64 characters"))]
    pub display_name: Option<String>,

    #[validate(length(max = 2000, message = "Learning goals must be at most 2000 characters"))]
    pub learning_goals: Option<String>,

    #[validate(length(max = 200, message = "Learning style must be at most 200 characters"))]
    pub learning_style: Option<String>,

    #[validate(length(max = 50, message = "Grade level must be at most 50 characters"))]
    pub grade_level: Option<String>,
}
