//! User services - Gestione utenti

use crate::core::{AppError, AppState};
use crate::dtos::UserDTO;
use crate::entities::{SessionStatus, User};
use crate::repositories::{Delete, Read};
use axum::{
    Extension,
    extract::{Json, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[instrument(skip(state), fields(user_id = %user_id))]
pub async fn get_user_by_id(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<i64>, // parametro dalla URL /users/{user_id}
) -> Result<Json<Option<UserDTO>>, AppError> {
    debug!("Fetching user by ID");
    let user_option = state.user.read(&user_id).await?;
    if user_option.is_none() {
        warn!("User not found");
    }
    Ok(Json(user_option.map(UserDTO::from)))
}

#[instrument(skip(_state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_me(
    State(_state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<UserDTO>, AppError> {
    Ok(Json(UserDTO::from(current_user)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, username = %current_user.username))]
pub async fn delete_my_account(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>, // ottenuto dall'autenticazione tramite token jwt
) -> Result<impl IntoResponse, AppError> {
    info!("User account deletion initiated");
    // 1. Recuperare tutte le sessioni non terminali dell'utente (singola query)
    // 2. Cancellare ogni sessione aperta e avvisare la controparte via email
    // 3. Soft-delete dello user: username/email anonimizzati, password azzerata
    //    (lo storico di sessioni, messaggi e recensioni resta leggibile)
    // 4. Cookie con Max-Age=0 per forzare il logout lato client

    let open_sessions = state.session.find_open_by_user(&current_user.user_id).await?;
    debug!("Found {} open sessions to cancel", open_sessions.len());

    for session in &open_sessions {
        state
            .session
            .update_status(&session.session_id, SessionStatus::Cancelled)
            .await?;

        // notifica best-effort alla controparte
        let counterparty_id = if session.student_id == current_user.user_id {
            session.tutor_id
        } else {
            session.student_id
        };
        if let Some(counterparty) = state.user.read(&counterparty_id).await? {
            state.notify.spawn_email(
                counterparty.email,
                "Session cancelled".to_string(),
                format!(
                    "Your {} session scheduled at {} was cancelled because the other party closed their account.",
                    session.subject, session.scheduled_at
                ),
            );
        }
    }

    info!("Soft deleting user account");
    state.user.delete(&current_user.user_id).await?;

    let cookie = "token=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";
    let mut headers = HeaderMap::new();
    headers.insert(
        "Set-Cookie",
        HeaderValue::from_str(cookie)
            .map_err(|_| AppError::internal_server_error("Failed to build cookie header"))?,
    );

    info!("Account deleted successfully");
    Ok((StatusCode::OK, headers, "Account deleted successfully"))
}
