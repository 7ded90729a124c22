//! Integration tests per il feed WebSocket dei messaggi
//!
//! Test per:
//! - Sovrascrittura delle connessioni duplicate nella UserMap
//! - Caricamento delle conversazioni dell'utente alla connessione
//! - Consegna end-to-end di un messaggio dal POST REST al frame WebSocket
//!
//! Questi test usano `#[sqlx::test]` che:
//! - Crea automaticamente un database di test isolato
//! - Applica le migrations da `migrations/`
//! - Applica i fixtures specificati da `fixtures/`
//! - Pulisce il database al termine

mod common;

#[cfg(test)]
mod ws_tests {
    use super::common::*;
    use sqlx::SqlitePool;
    use tokio::sync::mpsc;
    use tutorlink::ws::usermap::UserMap;

    // ============================================================
    // Test unitario per UserMap - connessioni duplicate
    // ============================================================

    /// La seconda connessione dello stesso utente sovrascrive la prima:
    /// il vecchio canale deve risultare chiuso
    #[tokio::test]
    async fn test_usermap_duplicate_connection_overwrites() {
        let user_map = UserMap::new();
        let user_id = 1;

        // Prima connessione - crea il primo channel
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        user_map.register_online(user_id, tx1);

        assert!(user_map.is_user_online(&user_id));
        assert_eq!(user_map.online_count(), 1);

        // Seconda connessione per lo stesso user_id (refresh o altro device)
        let (tx2, _rx2) = mpsc::unbounded_channel();
        user_map.register_online(user_id, tx2);

        // ancora online, non duplicato
        assert!(user_map.is_user_online(&user_id));
        assert_eq!(user_map.online_count(), 1);

        // il vecchio receiver è rimasto senza sender
        tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        assert!(rx1.try_recv().is_err(), "Old receiver should be disconnected");
    }

    // ============================================================
    // Caricamento conversazioni e sottoscrizioni broadcast
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "conversations")))]
    async fn test_feed_subscribes_user_conversations(pool: SqlitePool) -> sqlx::Result<()> {
        let state = create_test_state(pool);

        // alice ha una conversazione nei fixtures
        let conversations = state
            .conversation
            .find_many_by_user(&1)
            .await
            .expect("Failed to load user conversations");
        assert_eq!(conversations.len(), 1);

        let ids: Vec<i64> = conversations.iter().map(|c| c.conversation_id).collect();

        // come fa il task write_ws alla connessione
        let subscriptions = state.feeds_online.subscribe_multiple(ids.clone());
        assert_eq!(subscriptions.len(), ids.len());

        // il canale broadcast esiste: un send con un ascoltatore attivo va a buon fine
        use std::sync::Arc;
        use tutorlink::dtos::MessageDTO;
        let dto = MessageDTO {
            message_id: Some(99),
            conversation_id: Some(ids[0]),
            sender_id: Some(2),
            content: Some("ping".to_string()),
            created_at: None,
            read_at: None,
        };
        let delivered = state.feeds_online.send(&ids[0], Arc::new(dto));
        assert_eq!(delivered.expect("send should reach the subscriber"), 1);

        Ok(())
    }

    // ============================================================
    // End-to-end: POST REST -> frame WebSocket
    // ============================================================

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users", "conversations")))]
    async fn test_feed_delivers_messages_end_to_end(pool: SqlitePool) -> sqlx::Result<()> {
        use futures_util::StreamExt;
        use tokio_tungstenite::connect_async;
        use tokio_tungstenite::tungstenite::client::IntoClientRequest;
        use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;

        let state = create_test_state(pool);

        // server reale su porta effimera: serve sia il WS sia la REST API
        let app = tutorlink::create_router(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // bob apre il feed autenticandosi col JWT
        let mut request = format!("ws://{}/ws", addr).into_client_request().unwrap();
        request.headers_mut().insert(
            "Authorization",
            format!("Bearer {}", auth_token(2, "bob")).parse().unwrap(),
        );
        let (mut ws, _) = connect_async(request).await.expect("WebSocket connect failed");

        // attesa della registrazione + sottoscrizione del task di scrittura
        let mut waited = 0;
        while !state.users_online.is_user_online(&2) && waited < 50 {
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
            waited += 1;
        }
        assert!(state.users_online.is_user_online(&2), "bob never registered online");
        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

        // alice scrive via REST nella conversazione 1
        let client = reqwest::Client::new();
        let response = client
            .post(format!("http://{}/conversations/1/messages", addr))
            .header("Authorization", format!("Bearer {}", auth_token(1, "alice")))
            .json(&serde_json::json!({ "content": "Are we still on for Monday?" }))
            .send()
            .await
            .expect("REST send failed");
        assert!(response.status().is_success());

        // il frame arriva sul feed di bob
        let frame = tokio::time::timeout(tokio::time::Duration::from_secs(3), ws.next())
            .await
            .expect("Timed out waiting for feed frame")
            .expect("Feed closed unexpectedly")
            .expect("Feed errored");

        match frame {
            WsMessage::Text(text) => {
                let dto: serde_json::Value = serde_json::from_str(&text).unwrap();
                assert_eq!(dto["conversation_id"], 1);
                assert_eq!(dto["sender_id"], 1);
                assert_eq!(dto["content"], "Are we still on for Monday?");
            }
            other => panic!("Expected text frame, got {:?}", other),
        }

        Ok(())
    }
}
