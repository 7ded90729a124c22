//! Notification services - Relay email/SMS
//!
//! Endpoint "fire and forget": validano il payload, sganciano l'invio su un
//! task e rispondono 202. Un invio rifiutato dal provider finisce nei log
//! e da nessun'altra parte: niente retry, niente dead-letter.

use crate::core::{AppError, AppState};
use crate::dtos::{SendEmailDTO, SendSmsDTO};
use crate::entities::User;
use axum::{
    Extension,
    extract::{Json, State},
    http::StatusCode,
};
use std::sync::Arc;
use tracing::{debug, instrument};
use validator::Validate;

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn send_email_notification(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<SendEmailDTO>,
) -> Result<StatusCode, AppError> {
    debug!("Relaying email notification");
    body.validate()?;

    state.notify.spawn_email(body.to, body.subject, body.body);

    Ok(StatusCode::ACCEPTED)
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn send_sms_notification(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<SendSmsDTO>,
) -> Result<StatusCode, AppError> {
    debug!("Relaying SMS notification");
    body.validate()?;

    state.notify.spawn_sms(body.to, body.body);

    Ok(StatusCode::ACCEPTED)
}
