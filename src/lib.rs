//! TutorLink server library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod entities;
pub mod monitoring;
pub mod relays;
pub mod repositories;
pub mod services;
pub mod ws;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, auth, config};
pub use crate::services::root;

use axum::{Router, middleware, routing::{any, delete, get, post}};
use std::sync::Arc;

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    use crate::core::authentication_middleware;
    use crate::services::*;
    use crate::ws::ws_handler;

    Router::new()
        .route("/", get(root))
        .nest("/auth", configure_auth_routes())
        .nest("/users", configure_user_routes(state.clone()))
        .nest("/profiles", configure_profile_routes(state.clone()))
        .nest("/tutors", configure_tutor_routes(state.clone()))
        .nest("/matching", configure_matching_routes(state.clone()))
        .nest("/sessions", configure_session_routes(state.clone()))
        .nest("/payments", configure_payment_routes(state.clone()))
        .nest("/notifications", configure_notification_routes(state.clone()))
        .nest("/conversations", configure_conversation_routes(state.clone()))
        .nest("/enrollments", configure_enrollment_routes(state.clone()))
        .route(
            "/ws",
            any(ws_handler).layer(middleware::from_fn_with_state(
                state.clone(),
                authentication_middleware,
            )),
        )
        .with_state(state)
}

/// Configura le routes di autenticazione (login, register)
fn configure_auth_routes() -> Router<Arc<AppState>> {
    use crate::services::*;
    Router::new()
        .route("/login", post(login_user))
        .route("/register", post(register_user))
}

/// Configura le routes per la gestione degli utenti
fn configure_user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/me", get(get_me).delete(delete_my_account))
        .route("/{user_id}", get(get_user_by_id))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes per i profili di ruolo
fn configure_profile_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/me", get(get_my_profile).patch(update_my_profile))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes di ricerca e dettaglio tutor
fn configure_tutor_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/", get(search_tutors))
        .route("/{user_id}", get(get_tutor))
        .route("/{user_id}/slots", get(get_tutor_slots))
        .route("/{user_id}/reviews", get(list_tutor_reviews))
        .route("/{user_id}/class", get(get_tutor_class))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura la route del matching AI
fn configure_matching_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/", post(match_tutors))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes del ciclo di vita sessioni
fn configure_session_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{authentication_middleware, session_party_middleware};
    use crate::services::*;

    // Rotte che NON richiedono di essere parte di una sessione (solo autenticazione)
    let public_routes = Router::new()
        .route("/", get(list_my_sessions).post(create_session))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_middleware,
        ));

    // Rotte che richiedono di essere parte della sessione indicata nel path
    let party_routes = Router::new()
        .route("/{session_id}", get(get_session))
        .route("/{session_id}/accept", post(accept_session))
        .route("/{session_id}/decline", post(decline_session))
        .route("/{session_id}/cancel", post(cancel_session))
        .route("/{session_id}/complete", post(complete_session))
        .route("/{session_id}/reviews", post(create_review))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            session_party_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(party_routes)
}

/// Configura le routes del relay pagamenti
fn configure_payment_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/{order_id}/capture", post(capture_order))
        .route("/connect/onboard", post(connect_onboard))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes del relay notifiche
fn configure_notification_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/email", post(send_email_notification))
        .route("/sms", post(send_sms_notification))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes della messaggistica
fn configure_conversation_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{authentication_middleware, conversation_party_middleware};
    use crate::services::*;

    // Rotte che NON richiedono membership (solo autenticazione)
    let public_routes = Router::new()
        .route("/", get(list_conversations).post(open_conversation))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_middleware,
        ));

    // Rotte che richiedono di partecipare alla conversazione
    let party_routes = Router::new()
        .route(
            "/{conversation_id}/messages",
            get(get_conversation_messages).post(send_message),
        )
        .route("/{conversation_id}/read", post(mark_conversation_read))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            conversation_party_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(party_routes)
}

/// Configura le routes delle iscrizioni alle classi
fn configure_enrollment_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/", post(join_class))
        .route("/{tutor_id}", delete(leave_class))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}
