use axum_test::TestServer;
use sqlx::SqlitePool;
use std::sync::Arc;
use tutorlink::core::{AppState, Config};

/// Secret JWT usato da Config::for_tests
pub const TEST_JWT_SECRET: &str = "ilmiobellissimosegretochevaassolutamentecambiato";

/// Crea un AppState per i test
///
/// # Arguments
/// * `pool` - Connection pool SQLite fornito da #[sqlx::test]
///
/// # Returns
/// Arc<AppState> configurato con il JWT secret di test e nessun provider esterno
#[allow(dead_code)]
pub fn create_test_state(pool: SqlitePool) -> Arc<AppState> {
    let config = Config::for_tests();
    Arc::new(AppState::new(pool, &config))
}

/// Crea un TestServer per i test
///
/// # Arguments
/// * `state` - AppState da utilizzare per il server
///
/// # Returns
/// TestServer configurato e pronto per eseguire richieste
#[allow(dead_code)]
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = tutorlink::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Genera un JWT token per testing
///
/// # Arguments
/// * `user_id` - ID dell'utente per cui generare il token
/// * `username` - Username dell'utente
/// * `jwt_secret` - Secret key per firmare il token
///
/// # Returns
/// Token JWT valido per 24 ore
#[allow(dead_code)]
pub fn create_test_jwt(user_id: i64, username: &str, jwt_secret: &str) -> String {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Claims {
        id: i64,
        username: String,
        exp: usize,
        iat: usize,
    }

    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::hours(24))
        .expect("valid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        id: user_id,
        username: username.to_string(),
        exp: expiration,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("Failed to create JWT token")
}

/// Token pronto per `.authorization_bearer(...)` del TestServer
#[allow(dead_code)]
pub fn auth_token(user_id: i64, username: &str) -> String {
    create_test_jwt(user_id, username, TEST_JWT_SECRET)
}
