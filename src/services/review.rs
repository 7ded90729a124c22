//! Review services - Recensioni delle sessioni

use crate::core::{AppError, AppState};
use crate::dtos::{CreateReviewDTO, ReviewDTO};
use crate::entities::{Session, SessionStatus, User};
use crate::repositories::{Create, NewReviewRecord};
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

#[instrument(skip(state, current_user, session, body), fields(session_id = %session_id, user_id = %current_user.user_id))]
pub async fn create_review(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<i64>,
    Extension(current_user): Extension<User>,
    Extension(session): Extension<Session>, // dal session_party_middleware
    Json(body): Json<CreateReviewDTO>,
) -> Result<Json<ReviewDTO>, AppError> {
    debug!("Creating review");
    // 1. Validare rating (1..=5) e commento
    // 2. Solo lo studente della sessione recensisce
    // 3. Si recensiscono solo sessioni confermate o completate
    // 4. Una sola recensione per (studente, sessione)
    // 5. Salvare e ricalcolare la media denormalizzata del tutor

    body.validate()?;

    if current_user.user_id != session.student_id {
        return Err(AppError::forbidden("Only the student of the session can review it"));
    }

    if !matches!(
        session.status,
        SessionStatus::Confirmed | SessionStatus::Completed
    ) {
        warn!("Review attempted on session in status {:?}", session.status);
        return Err(AppError::conflict(
            "Only confirmed or completed sessions can be reviewed",
        ));
    }

    if state
        .review
        .exists_for(&session.session_id, &current_user.user_id)
        .await?
    {
        return Err(AppError::conflict("Session already reviewed"));
    }

    let review = state
        .review
        .create(&NewReviewRecord {
            session_id: session.session_id,
            student_id: current_user.user_id,
            tutor_id: session.tutor_id,
            rating: body.rating,
            comment: body.comment,
        })
        .await?;

    // rollup della media sul profilo tutor
    let (avg, count) = state.review.aggregate_for_tutor(&session.tutor_id).await?;
    state
        .tutor_profile
        .update_rating(&session.tutor_id, avg, count)
        .await?;

    info!(review_id = review.review_id, "Review stored, tutor rating updated");
    Ok(Json(ReviewDTO::from(review)))
}
