//! Profile services - Gestione dei profili di ruolo

use crate::core::{AppError, AppState};
use crate::dtos::{
    StudentProfileDTO, TutorProfileDTO, UpdateStudentProfileDTO, UpdateTutorProfileDTO,
};
use crate::entities::{User, UserRole};
use crate::repositories::{Read, Update};
use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use validator::Validate;

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, role = ?current_user.role))]
pub async fn get_my_profile(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Response, AppError> {
    debug!("Fetching own role profile");
    // Il tipo di profilo dipende dal ruolo dello user autenticato
    match current_user.role {
        UserRole::Tutor => {
            let profile = state
                .tutor_profile
                .read(&current_user.user_id)
                .await?
                .ok_or_else(|| {
                    warn!("Tutor profile missing for user");
                    AppError::not_found("Profile not found")
                })?;
            Ok(Json(TutorProfileDTO::from(profile)).into_response())
        }
        UserRole::Student => {
            let profile = state
                .student_profile
                .read(&current_user.user_id)
                .await?
                .ok_or_else(|| {
                    warn!("Student profile missing for user");
                    AppError::not_found("Profile not found")
                })?;
            Ok(Json(StudentProfileDTO::from(profile)).into_response())
        }
    }
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, role = ?current_user.role))]
pub async fn update_my_profile(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, AppError> {
    debug!("Updating own role profile");
    // 1. Deserializzare il body nel DTO del ruolo dello user
    // 2. Validare con validator
    // 3. Applicare l'update parziale (solo i campi presenti)
    // 4. Ritornare il profilo aggiornato

    match current_user.role {
        UserRole::Tutor => {
            let update: UpdateTutorProfileDTO = serde_json::from_value(body).map_err(|e| {
                AppError::bad_request("Invalid profile payload").with_details(e.to_string())
            })?;
            update.validate()?;

            let profile = state
                .tutor_profile
                .update(&current_user.user_id, &update)
                .await?;
            Ok(Json(TutorProfileDTO::from(profile)).into_response())
        }
        UserRole::Student => {
            let update: UpdateStudentProfileDTO = serde_json::from_value(body).map_err(|e| {
                AppError::bad_request("Invalid profile payload").with_details(e.to_string())
            })?;
            update.validate()?;

            let profile = state
                .student_profile
                .update(&current_user.user_id, &update)
                .await?;
            Ok(Json(StudentProfileDTO::from(profile)).into_response())
        }
    }
}
