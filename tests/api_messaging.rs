//! Integration tests per conversazioni, messaggi e stato di lettura
//!
//! Test per:
//! - GET/POST /conversations
//! - GET/POST /conversations/{id}/messages
//! - POST /conversations/{id}/read

mod common;

#[cfg(test)]
mod messaging_tests {
    use super::common::*;
    use axum::http::StatusCode;
    use serde_json::json;
    use sqlx::SqlitePool;

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "conversations")))]
    async fn test_list_conversations_with_unread_counts(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .get("/conversations")
            .authorization_bearer(&auth_token(1, "alice"))
            .await;
        response.assert_status_ok();

        let conversations: Vec<serde_json::Value> = response.json();
        assert_eq!(conversations.len(), 1);
        assert_eq!(conversations[0]["counterparty"]["username"], "bob");
        // i fixtures lasciano due messaggi di bob senza read_at
        assert_eq!(conversations[0]["unread_count"], 2);

        // lato bob non c'è nulla da leggere
        let response = server
            .get("/conversations")
            .authorization_bearer(&auth_token(2, "bob"))
            .await;
        let conversations: Vec<serde_json::Value> = response.json();
        assert_eq!(conversations[0]["unread_count"], 0);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "conversations")))]
    async fn test_open_conversation_is_idempotent(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // nuova conversazione alice <-> carla
        let response = server
            .post("/conversations")
            .authorization_bearer(&auth_token(1, "alice"))
            .json(&json!({ "user_id": 3 }))
            .await;
        response.assert_status_ok();
        let first: serde_json::Value = response.json();

        // riaprire dalla parte opposta ritrova la stessa conversazione
        let response = server
            .post("/conversations")
            .authorization_bearer(&auth_token(3, "carla"))
            .json(&json!({ "user_id": 1 }))
            .await;
        response.assert_status_ok();
        let second: serde_json::Value = response.json();

        assert_eq!(first["conversation_id"], second["conversation_id"]);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "conversations")))]
    async fn test_open_conversation_rejections(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // con se stessi no
        let response = server
            .post("/conversations")
            .authorization_bearer(&auth_token(1, "alice"))
            .json(&json!({ "user_id": 1 }))
            .await;
        response.assert_status_bad_request();

        // controparte inesistente
        let response = server
            .post("/conversations")
            .authorization_bearer(&auth_token(1, "alice"))
            .json(&json!({ "user_id": 999 }))
            .await;
        response.assert_status_not_found();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "conversations")))]
    async fn test_messages_paging_and_party_check(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        // i messaggi arrivano dal più recente
        let response = server
            .get("/conversations/1/messages")
            .authorization_bearer(&auth_token(1, "alice"))
            .await;
        response.assert_status_ok();
        let messages: Vec<serde_json::Value> = response.json();
        assert_eq!(messages.len(), 3);
        assert_eq!(
            messages[0]["content"],
            "I will send the booking link shortly."
        );

        // before_date sposta la finestra indietro
        let response = server
            .get("/conversations/1/messages")
            .add_query_param("before_date", "2026-06-20T10:06:00Z")
            .authorization_bearer(&auth_token(1, "alice"))
            .await;
        response.assert_status_ok();
        let messages: Vec<serde_json::Value> = response.json();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["content"], "Hi, could we do Monday morning?");

        // un estraneo non legge la conversazione
        let response = server
            .get("/conversations/1/messages")
            .authorization_bearer(&auth_token(3, "carla"))
            .await;
        response.assert_status_forbidden();

        // conversazione inesistente
        let response = server
            .get("/conversations/999/messages")
            .authorization_bearer(&auth_token(1, "alice"))
            .await;
        response.assert_status_not_found();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "conversations")))]
    async fn test_send_message_appends_and_counts_unread(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/conversations/1/messages")
            .authorization_bearer(&auth_token(2, "bob"))
            .json(&json!({ "content": "See you Monday!" }))
            .await;
        response.assert_status_ok();
        let message: serde_json::Value = response.json();
        assert_eq!(message["sender_id"], 2);
        assert!(message["read_at"].is_null());

        // alice ora ha tre non letti
        let response = server
            .get("/conversations")
            .authorization_bearer(&auth_token(1, "alice"))
            .await;
        let conversations: Vec<serde_json::Value> = response.json();
        assert_eq!(conversations[0]["unread_count"], 3);

        // contenuto vuoto rifiutato
        let response = server
            .post("/conversations/1/messages")
            .authorization_bearer(&auth_token(2, "bob"))
            .json(&json!({ "content": "" }))
            .await;
        response.assert_status_bad_request();

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "conversations")))]
    async fn test_mark_read_is_idempotent_and_one_sided(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);
        let server = create_test_server(state.clone());

        let response = server
            .post("/conversations/1/read")
            .authorization_bearer(&auth_token(1, "alice"))
            .await;
        response.assert_status(StatusCode::OK);

        // i non letti di alice si azzerano
        let response = server
            .get("/conversations")
            .authorization_bearer(&auth_token(1, "alice"))
            .await;
        let conversations: Vec<serde_json::Value> = response.json();
        assert_eq!(conversations[0]["unread_count"], 0);

        // i messaggi di alice NON sono stati timbrati dalla sua stessa read
        use tutorlink::repositories::Read;
        let own_message = state.msg.read(&1).await.unwrap().unwrap();
        // il fixture aveva già read_at per il messaggio 1 (letto da bob):
        // resta quello originale, la read di alice non lo riscrive
        assert_eq!(
            own_message.read_at.unwrap().to_rfc3339(),
            "2026-06-20T10:05:00+00:00"
        );

        // ripetere la chiamata non cambia nulla
        let response = server
            .post("/conversations/1/read")
            .authorization_bearer(&auth_token(1, "alice"))
            .await;
        response.assert_status(StatusCode::OK);

        Ok(())
    }
}
