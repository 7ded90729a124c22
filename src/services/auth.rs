//! Auth services - Gestione autenticazione e registrazione utenti

use crate::core::{AppError, AppState, encode_jwt};
use crate::dtos::{CreateUserDTO, RegisterUserDTO, UserDTO};
use crate::entities::{User, UserRole};
use crate::repositories::Create;
use axum::{
    extract::{Json, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

/// DTO per il login (solo username e password)
#[derive(serde::Deserialize)]
pub struct LoginDTO {
    pub username: String,
    pub password: String,
}

#[instrument(skip(state, body), fields(username = %body.username))]
pub async fn login_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<LoginDTO>, // JSON body
) -> Result<impl IntoResponse, AppError> {
    // 1. Bloccare subito i login verso account anonimizzati (controllo stringa prima della query DB)
    // 2. Cercare l'utente nel database tramite username
    // 3. Se l'utente non esiste, ritornare errore UNAUTHORIZED senza distinguere i casi
    // 4. Verificare che la password fornita corrisponda all'hash memorizzato
    // 5. Generare un token JWT con userid, username e il segreto
    // 6. Costruire un cookie HttpOnly, Secure, SameSite=Lax con il token e durata 24 ore
    // 7. Creare gli headers HTTP con Set-Cookie e Authorization (Bearer token)
    // 8. Ritornare StatusCode::OK con gli headers

    if body.username.starts_with("Deleted User") {
        return Err(AppError::unauthorized("Invalid username or password"));
    }

    let user = match state.user.find_by_username(&body.username).await? {
        Some(user) => user,
        None => return Err(AppError::unauthorized("Invalid username or password")),
    };

    if !user.verify_password(&body.password) {
        warn!("Password verification failed");
        return Err(AppError::unauthorized("Invalid username or password"));
    }

    let token = encode_jwt(user.username, user.user_id, &state.jwt_secret)?;

    let cookie_value = format!(
        "token={}; HttpOnly; Secure; SameSite=Lax; Max-Age={}",
        token,
        24 * 60 * 60
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        "Set-Cookie",
        HeaderValue::from_str(&cookie_value)
            .map_err(|_| AppError::internal_server_error("Failed to build cookie header"))?,
    );
    headers.insert(
        "Authorization",
        HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| AppError::internal_server_error("Failed to build auth header"))?,
    );

    info!("Login successful");
    Ok((StatusCode::OK, headers))
}

#[instrument(skip(state, body), fields(username = %body.username, role = ?body.role))]
pub async fn register_user(
    State(state): State<Arc<AppState>>,
    Json(body): Json<RegisterUserDTO>, // JSON body
) -> Result<Json<UserDTO>, AppError> {
    // 1. Validare il DTO con validator (username/email/password, display name)
    // 2. Controllare se esiste già un utente con lo stesso username o email
    // 3. Se esiste già, ritornare errore CONFLICT
    // 4. Generare l'hash della password fornita
    // 5. Salvare il nuovo utente nel database
    // 6. Creare il profilo di ruolo (tutor o studente) collegato allo user
    // 7. Ritornare il DTO dell'utente creato come risposta JSON

    body.validate()?;

    if state.user.find_by_username(&body.username).await?.is_some() {
        return Err(AppError::conflict("Username already exists"));
    }

    if state.user.find_by_email(&body.email).await?.is_some() {
        return Err(AppError::conflict("Email already registered"));
    }

    let password_hash = User::hash_password(&body.password)
        .map_err(|_| AppError::internal_server_error("Failed to hash password"))?;

    let new_user = CreateUserDTO {
        username: body.username,
        email: body.email,
        password: password_hash,
        role: body.role,
    };

    let created_user = state.user.create(&new_user).await?;

    // Il profilo di ruolo nasce vuoto insieme allo user: i dettagli
    // (materie, tariffe, obiettivi) arrivano con le PATCH successive
    match created_user.role {
        UserRole::Tutor => {
            state
                .tutor_profile
                .create_default(created_user.user_id, &body.display_name)
                .await?;
        }
        UserRole::Student => {
            state
                .student_profile
                .create_default(created_user.user_id, &body.display_name)
                .await?;
        }
    }

    info!(user_id = created_user.user_id, "User registered");
    Ok(Json(UserDTO::from(created_user)))
}
