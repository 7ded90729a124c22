//! Integration tests per il ciclo di vita delle sessioni e il relay pagamenti
//!
//! Test per:
//! - POST /sessions (proposta con prezzo calcolato lato server)
//! - POST /sessions/{id}/accept|decline|cancel|complete (macchina a stati)
//! - POST /payments/orders e capture (validazioni pre-provider)

mod common;

#[cfg(test)]
mod session_tests {
    use super::common::*;
    use serde_json::json;
    use axum::http::StatusCode;
    use sqlx::SqlitePool;

    // ============================================================
    // Proposta di sessione
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "profiles", "sessions")))]
    async fn test_create_session_computes_price_server_side(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // mercoledì 2030-01-16 alle 09:00, 90 minuti con bob (3000 cent/h)
        let response = server
            .post("/sessions")
            .authorization_bearer(&auth_token(1, "alice"))
            .json(&json!({
                "tutor_id": 2,
                "subject": "algebra",
                "scheduled_at": "2030-01-16T09:00:00Z",
                "duration_mins": 90
            }))
            .await;
        response.assert_status_ok();

        let session: serde_json::Value = response.json();
        assert_eq!(session["status"], "pending");
        assert_eq!(session["price_cents"], 4500); // 3000 * 90 / 60
        assert_eq!(session["student_id"], 1);
        assert_eq!(session["tutor_id"], 2);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "profiles", "sessions")))]
    async fn test_create_session_rejections(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // un tutor non propone sessioni
        let response = server
            .post("/sessions")
            .authorization_bearer(&auth_token(2, "bob"))
            .json(&json!({
                "tutor_id": 4,
                "subject": "physics",
                "scheduled_at": "2030-01-16T09:00:00Z",
                "duration_mins": 60
            }))
            .await;
        response.assert_status_forbidden();

        // materia che il tutor non insegna
        let response = server
            .post("/sessions")
            .authorization_bearer(&auth_token(1, "alice"))
            .json(&json!({
                "tutor_id": 2,
                "subject": "chemistry",
                "scheduled_at": "2030-01-16T09:00:00Z",
                "duration_mins": 60
            }))
            .await;
        response.assert_status_bad_request();

        // orario nel passato
        let response = server
            .post("/sessions")
            .authorization_bearer(&auth_token(1, "alice"))
            .json(&json!({
                "tutor_id": 2,
                "subject": "algebra",
                "scheduled_at": "2020-01-06T09:00:00Z",
                "duration_mins": 60
            }))
            .await;
        response.assert_status_bad_request();

        // durata fuori range
        let response = server
            .post("/sessions")
            .authorization_bearer(&auth_token(1, "alice"))
            .json(&json!({
                "tutor_id": 2,
                "subject": "algebra",
                "scheduled_at": "2030-01-16T09:00:00Z",
                "duration_mins": 15
            }))
            .await;
        response.assert_status_bad_request();

        // tutor inesistente
        let response = server
            .post("/sessions")
            .authorization_bearer(&auth_token(1, "alice"))
            .json(&json!({
                "tutor_id": 999,
                "subject": "algebra",
                "scheduled_at": "2030-01-16T09:00:00Z",
                "duration_mins": 60
            }))
            .await;
        response.assert_status_not_found();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "profiles", "sessions")))]
    async fn test_create_session_overlap_conflict(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // la sessione 2 (non cancellata) occupa il 2030-01-09 alle 10:00
        let response = server
            .post("/sessions")
            .authorization_bearer(&auth_token(3, "carla"))
            .json(&json!({
                "tutor_id": 2,
                "subject": "algebra",
                "scheduled_at": "2030-01-09T10:30:00Z",
                "duration_mins": 60
            }))
            .await;
        response.assert_status(StatusCode::CONFLICT);

        Ok(())
    }

    // ============================================================
    // Macchina a stati: accept / decline / cancel / complete
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "profiles", "sessions")))]
    async fn test_accept_moves_pending_to_awaiting_payment(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/sessions/1/accept")
            .authorization_bearer(&auth_token(2, "bob"))
            .await;
        response.assert_status_ok();

        let session: serde_json::Value = response.json();
        assert_eq!(session["status"], "awaiting_payment");
        // il link stanza viene assegnato all'accettazione
        assert!(session["meeting_link"].as_str().unwrap().starts_with("https://meet.jit.si/"));

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "profiles", "sessions")))]
    async fn test_accept_requires_the_tutor(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // lo studente della sessione non può accettare
        let response = server
            .post("/sessions/1/accept")
            .authorization_bearer(&auth_token(1, "alice"))
            .await;
        response.assert_status_forbidden();

        // un estraneo non vede proprio la sessione
        let response = server
            .post("/sessions/1/accept")
            .authorization_bearer(&auth_token(3, "carla"))
            .await;
        response.assert_status_forbidden();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "profiles", "sessions")))]
    async fn test_illegal_transitions_conflict_and_leave_row_unchanged(
        pool: SqlitePool,
    ) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // accept su una sessione già confermata
        let response = server
            .post("/sessions/3/accept")
            .authorization_bearer(&auth_token(2, "bob"))
            .await;
        response.assert_status(StatusCode::CONFLICT);

        // complete su una pending
        let response = server
            .post("/sessions/1/complete")
            .authorization_bearer(&auth_token(2, "bob"))
            .await;
        response.assert_status(StatusCode::CONFLICT);

        // cancel su una completata (stato terminale)
        let response = server
            .post("/sessions/4/cancel")
            .authorization_bearer(&auth_token(1, "alice"))
            .await;
        response.assert_status(StatusCode::CONFLICT);

        // le righe non sono state toccate
        use tutorlink::entities::SessionStatus;
        use tutorlink::repositories::Read;
        assert_eq!(
            state.session.read(&3).await.unwrap().unwrap().status,
            SessionStatus::Confirmed
        );
        assert_eq!(
            state.session.read(&1).await.unwrap().unwrap().status,
            SessionStatus::Pending
        );
        assert_eq!(
            state.session.read(&4).await.unwrap().unwrap().status,
            SessionStatus::Completed
        );

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "profiles", "sessions")))]
    async fn test_decline_and_cancel_paths(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // il tutor rifiuta la proposta: pending -> cancelled
        let response = server
            .post("/sessions/1/decline")
            .authorization_bearer(&auth_token(2, "bob"))
            .await;
        response.assert_status_ok();
        let session: serde_json::Value = response.json();
        assert_eq!(session["status"], "cancelled");

        // lo studente cancella una awaiting_payment
        let response = server
            .post("/sessions/2/cancel")
            .authorization_bearer(&auth_token(1, "alice"))
            .await;
        response.assert_status_ok();
        let session: serde_json::Value = response.json();
        assert_eq!(session["status"], "cancelled");

        // decline su una confermata non è previsto
        let response = server
            .post("/sessions/3/decline")
            .authorization_bearer(&auth_token(2, "bob"))
            .await;
        response.assert_status(StatusCode::CONFLICT);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "profiles", "sessions")))]
    async fn test_complete_confirmed_session(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/sessions/3/complete")
            .authorization_bearer(&auth_token(2, "bob"))
            .await;
        response.assert_status_ok();
        let session: serde_json::Value = response.json();
        assert_eq!(session["status"], "completed");

        // solo il tutor completa
        let response = server
            .post("/sessions/2/complete")
            .authorization_bearer(&auth_token(1, "alice"))
            .await;
        response.assert_status_forbidden();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "profiles", "sessions")))]
    async fn test_session_detail_and_listing(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // dettaglio arricchito con le due parti
        let response = server
            .get("/sessions/1")
            .authorization_bearer(&auth_token(1, "alice"))
            .await;
        response.assert_status_ok();
        let session: serde_json::Value = response.json();
        assert_eq!(session["student"]["username"], "alice");
        assert_eq!(session["tutor"]["username"], "bob");

        // un estraneo riceve 403
        let response = server
            .get("/sessions/1")
            .authorization_bearer(&auth_token(3, "carla"))
            .await;
        response.assert_status_forbidden();

        // sessione inesistente
        let response = server
            .get("/sessions/999")
            .authorization_bearer(&auth_token(1, "alice"))
            .await;
        response.assert_status_not_found();

        // alice compare in 5 sessioni dei fixtures
        let response = server
            .get("/sessions")
            .authorization_bearer(&auth_token(1, "alice"))
            .await;
        response.assert_status_ok();
        let sessions: Vec<serde_json::Value> = response.json();
        assert_eq!(sessions.len(), 5);

        Ok(())
    }

    // ============================================================
    // Relay pagamenti: le validazioni precedono ogni chiamata al provider
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "profiles", "sessions")))]
    async fn test_order_rejected_before_provider_call(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // sessione pending: non si paga
        let response = server
            .post("/payments/orders")
            .authorization_bearer(&auth_token(1, "alice"))
            .json(&json!({ "session_id": 1 }))
            .await;
        response.assert_status(StatusCode::CONFLICT);

        // solo lo studente della sessione paga
        let response = server
            .post("/payments/orders")
            .authorization_bearer(&auth_token(3, "carla"))
            .json(&json!({ "session_id": 2 }))
            .await;
        response.assert_status_forbidden();

        // sessione inesistente
        let response = server
            .post("/payments/orders")
            .authorization_bearer(&auth_token(1, "alice"))
            .json(&json!({ "session_id": 999 }))
            .await;
        response.assert_status_not_found();

        // sessione pagabile ma provider non configurato nei test: 503
        let response = server
            .post("/payments/orders")
            .authorization_bearer(&auth_token(1, "alice"))
            .json(&json!({ "session_id": 2 }))
            .await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "profiles", "sessions")))]
    async fn test_capture_validations(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // ordine sconosciuto
        let response = server
            .post("/payments/orders/ORD-UNKNOWN/capture")
            .authorization_bearer(&auth_token(1, "alice"))
            .await;
        response.assert_status_not_found();

        // la sessione 3 ha un ordine ma è già confermata
        let response = server
            .post("/payments/orders/ORD-FIXTURE-3/capture")
            .authorization_bearer(&auth_token(1, "alice"))
            .await;
        response.assert_status(StatusCode::CONFLICT);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "profiles")))]
    async fn test_connect_onboarding_requires_tutor(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/payments/connect/onboard")
            .authorization_bearer(&auth_token(1, "alice"))
            .await;
        response.assert_status_forbidden();

        // tutor ok ma Stripe non configurato nei test: 503
        let response = server
            .post("/payments/connect/onboard")
            .authorization_bearer(&auth_token(4, "dario"))
            .await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);

        Ok(())
    }
}
