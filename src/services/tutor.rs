//! Tutor services - Ricerca, dettaglio, slot prenotabili e recensioni

use crate::core::{AppError, AppState};
use crate::dtos::{
    ClassSummaryDTO, EnrollmentDTO, ReviewDTO, SlotsQuery, TutorProfileDTO, TutorReviewsDTO,
    TutorSearchQuery,
};
use crate::entities::Session;
use crate::repositories::Read;
use axum::extract::{Json, Path, Query, State};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[instrument(skip(state, params))]
pub async fn search_tutors(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TutorSearchQuery>, // /tutors?subject=algebra&max_rate_cents=3000
) -> Result<Json<Vec<TutorProfileDTO>>, AppError> {
    debug!("Searching tutors");
    let profiles = state.tutor_profile.search(&params).await?;
    info!("Found {} tutors matching filters", profiles.len());
    let dtos = profiles.into_iter().map(TutorProfileDTO::from).collect();
    Ok(Json(dtos))
}

#[instrument(skip(state), fields(tutor_id = %user_id))]
pub async fn get_tutor(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<TutorProfileDTO>, AppError> {
    debug!("Fetching tutor profile");
    let profile = state
        .tutor_profile
        .read(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Tutor not found"))?;
    Ok(Json(TutorProfileDTO::from(profile)))
}

#[instrument(skip(state, params), fields(tutor_id = %user_id))]
pub async fn get_tutor_slots(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
    Query(params): Query<SlotsQuery>, // ?from=...&until=...&duration_mins=60
) -> Result<Json<Vec<DateTime<Utc>>>, AppError> {
    debug!("Computing bookable slots");
    // 1. Leggere la settimana tipo dal profilo del tutor
    // 2. Stringere il bordo sinistro della finestra a "adesso": mai slot nel passato
    // 3. Recuperare le sessioni non cancellate del tutor nella finestra
    // 4. Derivare gli slot dalle fasce, escludendo le sovrapposizioni

    if params.until <= params.from {
        return Err(AppError::bad_request("Window end must be after window start"));
    }

    let profile = state
        .tutor_profile
        .read(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Tutor not found"))?;

    let from = params.from.max(Utc::now());

    let busy: Vec<(DateTime<Utc>, DateTime<Utc>)> = state
        .session
        .find_busy_between(&user_id, &from, &params.until)
        .await?
        .iter()
        .map(|s| (s.scheduled_at, s.ends_at()))
        .collect();

    let slots = profile
        .weekly_availability()
        .bookable_slots(from, params.until, params.duration_mins, &busy);

    info!("Computed {} bookable slots", slots.len());
    Ok(Json(slots))
}

#[instrument(skip(state), fields(tutor_id = %user_id))]
pub async fn list_tutor_reviews(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<TutorReviewsDTO>, AppError> {
    debug!("Listing tutor reviews");
    let profile = state
        .tutor_profile
        .read(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Tutor not found"))?;

    let reviews = state.review.find_many_by_tutor(&user_id).await?;
    info!("Found {} reviews", reviews.len());

    Ok(Json(TutorReviewsDTO {
        tutor_id: user_id,
        rating_avg: profile.rating_avg,
        rating_count: profile.rating_count,
        reviews: reviews.into_iter().map(ReviewDTO::from).collect(),
    }))
}

#[instrument(skip(state), fields(tutor_id = %user_id))]
pub async fn get_tutor_class(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<ClassSummaryDTO>, AppError> {
    debug!("Fetching class summary");
    // La quota a studente deriva SEMPRE dal totale della classe diviso
    // il numero di iscritti correnti
    let profile = state
        .tutor_profile
        .read(&user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Tutor not found"))?;

    let enrollments = state.enrollment.find_many_by_tutor(&user_id).await?;
    let enrolled_count = enrollments.len() as i64;
    let price_per_student_cents =
        Session::price_per_student(profile.class_price_cents, enrolled_count);

    if enrolled_count == 0 {
        warn!("Class has no enrollments yet");
    }

    Ok(Json(ClassSummaryDTO {
        tutor_id: user_id,
        class_price_cents: profile.class_price_cents,
        enrolled_count,
        price_per_student_cents,
        enrollments: enrollments.into_iter().map(EnrollmentDTO::from).collect(),
    }))
}
