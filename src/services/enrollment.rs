//! Enrollment services - Iscrizioni alle classi di gruppo

use crate::core::{AppError, AppState, require_role};
use crate::dtos::{CreateEnrollmentDTO, EnrollmentDTO};
use crate::entities::{User, UserRole};
use crate::repositories::{Delete, Read};
use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use validator::Validate;

#[instrument(skip(state, current_user, body), fields(student_id = %current_user.user_id, tutor_id = %body.tutor_id))]
pub async fn join_class(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<CreateEnrollmentDTO>,
) -> Result<Json<EnrollmentDTO>, AppError> {
    debug!("Joining class");
    // 1. Solo gli studenti si iscrivono
    // 2. Verificare che il tutor esista e abbia un profilo
    // 3. Una sola iscrizione per coppia (studente, tutor)

    require_role(&current_user, UserRole::Student)?;
    body.validate()?;

    state
        .tutor_profile
        .read(&body.tutor_id)
        .await?
        .ok_or_else(|| AppError::not_found("Tutor not found"))?;

    if state
        .enrollment
        .read(&(current_user.user_id, body.tutor_id))
        .await?
        .is_some()
    {
        return Err(AppError::conflict("Already enrolled in this class"));
    }

    let enrollment = state
        .enrollment
        .create(current_user.user_id, body.tutor_id, &body.subject)
        .await?;

    info!("Student enrolled");
    Ok(Json(EnrollmentDTO::from(enrollment)))
}

#[instrument(skip(state, current_user), fields(student_id = %current_user.user_id, tutor_id = %tutor_id))]
pub async fn leave_class(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(tutor_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    debug!("Leaving class");

    if state
        .enrollment
        .read(&(current_user.user_id, tutor_id))
        .await?
        .is_none()
    {
        return Err(AppError::not_found("Enrollment not found"));
    }

    state
        .enrollment
        .delete(&(current_user.user_id, tutor_id))
        .await?;

    info!("Student left the class");
    Ok(StatusCode::OK)
}
