//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati per una migliore manutenibilità.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità.

pub mod auth;
pub mod enrollment;
pub mod matching;
pub mod message;
pub mod notification;
pub mod payment;
pub mod profile;
pub mod review;
pub mod session;
pub mod tutor;
pub mod user;

// Re-exports per facilitare l'import
pub use auth::{login_user, register_user};
pub use enrollment::{join_class, leave_class};
pub use matching::match_tutors;
pub use message::{
    get_conversation_messages, list_conversations, mark_conversation_read, open_conversation,
    send_message,
};
pub use notification::{send_email_notification, send_sms_notification};
pub use payment::{capture_order, connect_onboard, create_order};
pub use profile::{get_my_profile, update_my_profile};
pub use review::create_review;
pub use session::{
    accept_session, cancel_session, complete_session, create_session, decline_session,
    get_session, list_my_sessions,
};
pub use tutor::{get_tutor, get_tutor_class, get_tutor_slots, list_tutor_reviews, search_tutors};
pub use user::{delete_my_account, get_me, get_user_by_id};

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use axum_macros::debug_handler;
use std::sync::Arc;

/// Root endpoint - health check
#[debug_handler]
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
