//! Integration tests per i relay verso provider esterni
//!
//! Test per:
//! - POST /matching (validazioni e short-circuit senza candidati)
//! - POST /notifications/email e /notifications/sms
//!
//! I provider non sono configurati nei test: si esercita tutto quello che
//! precede la chiamata HTTP esterna.

mod common;

#[cfg(test)]
mod relay_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::SqlitePool;

    // ============================================================
    // Matching
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "profiles")))]
    async fn test_matching_requires_student_role(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/matching")
            .authorization_bearer(&auth_token(2, "bob"))
            .json(&json!({}))
            .await;
        response.assert_status_forbidden();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "profiles")))]
    async fn test_matching_without_candidates_skips_the_model(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // nessun tutor di latino: lista vuota senza toccare il provider
        let response = server
            .post("/matching")
            .authorization_bearer(&auth_token(1, "alice"))
            .json(&json!({ "subject": "latin" }))
            .await;
        response.assert_status_ok();
        let scores: Vec<serde_json::Value> = response.json();
        assert!(scores.is_empty());

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "profiles")))]
    async fn test_matching_with_candidates_needs_the_model(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // ci sono candidati ma il modello non è configurato nei test
        let response = server
            .post("/matching")
            .authorization_bearer(&auth_token(1, "alice"))
            .json(&json!({}))
            .await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        Ok(())
    }

    // ============================================================
    // Notifiche
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_email_notification_is_fire_and_forget(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // payload valido: 202 subito, l'invio (e il suo eventuale fallimento)
        // vive su un task sganciato
        let response = server
            .post("/notifications/email")
            .authorization_bearer(&auth_token(1, "alice"))
            .json(&json!({
                "to": "bob@example.com",
                "subject": "Reminder",
                "body": "See you Monday at 9."
            }))
            .await;
        response.assert_status(StatusCode::ACCEPTED);

        // destinatario malformato
        let response = server
            .post("/notifications/email")
            .authorization_bearer(&auth_token(1, "alice"))
            .json(&json!({
                "to": "not-an-address",
                "subject": "Reminder",
                "body": "See you Monday at 9."
            }))
            .await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_sms_notification_validation(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/notifications/sms")
            .authorization_bearer(&auth_token(1, "alice"))
            .json(&json!({ "to": "+393331234567", "body": "Session confirmed." }))
            .await;
        response.assert_status(StatusCode::ACCEPTED);

        // numero non E.164
        let response = server
            .post("/notifications/sms")
            .authorization_bearer(&auth_token(1, "alice"))
            .json(&json!({ "to": "333 123", "body": "Session confirmed." }))
            .await;
        response.assert_status_bad_request();

        // senza token niente relay
        let response = server
            .post("/notifications/sms")
            .json(&json!({ "to": "+393331234567", "body": "hi" }))
            .await;
        response.assert_status_forbidden();

        Ok(())
    }
}
