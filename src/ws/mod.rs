//! WebSocket Module - Feed in tempo reale dei messaggi
//!
//! Questo modulo gestisce il feed WebSocket della messaggistica: ogni client
//! connesso riceve i nuovi messaggi delle proprie conversazioni. Il feed è
//! di sola lettura: l'invio dei messaggi passa dalla REST API, qui si
//! distribuisce soltanto. Include:
//! - Gestione upgrade HTTP -> WebSocket
//! - Gestione connessioni (split sender/receiver)
//! - Mappe degli utenti connessi e dei canali broadcast per conversazione

pub mod connection;
pub mod conversation_map;
pub mod usermap;

// Re-exports pubblici
pub use connection::handle_socket;

use crate::{AppState, entities::User};
use axum::{
    Extension,
    extract::{State, ws::WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;

/// Capienza dei canali broadcast per conversazione
pub const BROADCAST_CHANNEL_CAPACITY: usize = 64;

/// Una connessione muta oltre questo limite viene chiusa
pub const TIMEOUT_DURATION_SECONDS: u64 = 300;

/// Entry point per gestire richieste di upgrade WebSocket
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>, // ottenuto dall'autenticazione JWT
) -> Response {
    let user_id = current_user.user_id;

    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}
