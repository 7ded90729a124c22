//! WebSocket Connection Management - Gestione connessioni WebSocket

use crate::ws::TIMEOUT_DURATION_SECONDS;
use crate::{
    AppState,
    dtos::MessageDTO,
    ws::usermap::InternalSignal,
};
use axum::extract::ws::Utf8Bytes;
use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::time::Duration;
use tokio::time::timeout;
use tokio_stream::StreamMap;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{error, info, instrument, warn};

#[instrument(skip(ws, state), fields(user_id))]
pub async fn handle_socket(ws: WebSocket, state: Arc<AppState>, user_id: i64) {
    info!("WebSocket connection established");

    // Dividiamo il WebSocket in due metà: sender e receiver
    let (ws_tx, ws_rx) = ws.split();

    // Canale interno per i segnali di controllo verso il task di scrittura
    let (int_tx, int_rx) = unbounded_channel::<InternalSignal>();

    state.users_online.register_online(user_id, int_tx.clone());
    info!("User registered as online");

    // task in ascolto del websocket (solo chiusure: il feed è read-only)
    tokio::spawn(listen_ws(user_id, ws_rx, int_tx.clone(), state.clone()));

    // task che inoltra i broadcast delle conversazioni dell'utente
    tokio::spawn(write_ws(user_id, ws_tx, int_rx, state));
}

#[instrument(skip(websocket_tx, internal_rx, state), fields(user_id))]
pub async fn write_ws(
    user_id: i64,
    mut websocket_tx: SplitSink<WebSocket, Message>,
    mut internal_rx: UnboundedReceiver<InternalSignal>,
    state: Arc<AppState>,
) {
    info!("Write task started");

    let conversation_ids: Vec<i64> = match state.conversation.find_many_by_user(&user_id).await {
        Ok(conversations) => {
            info!(
                conversation_count = conversations.len(),
                "User conversations loaded"
            );
            conversations.iter().map(|c| c.conversation_id).collect()
        }
        Err(e) => {
            error!("Failed to load user conversations: {:?}", e);
            return; // Termina se DB fallisce
        }
    };

    let mut stream_map = StreamMap::new();

    state
        .feeds_online
        .subscribe_multiple(conversation_ids.clone())
        .into_iter()
        .zip(conversation_ids.iter())
        .for_each(|(rx, &conversation_id)| {
            stream_map.insert(conversation_id, BroadcastStream::new(rx));
        });

    'external: loop {
        tokio::select! {
            Some((_, result)) = tokio_stream::StreamExt::next(&mut stream_map) => {
                if let Ok(msg) = result {
                    // il mittente riceve già il messaggio nella risposta REST
                    if msg.sender_id == Some(user_id) {
                        continue;
                    }
                    if forward_message(&mut websocket_tx, &msg).await.is_err() {
                        warn!("Failed to forward message, closing connection");
                        break 'external;
                    }
                }
            }

            signal = internal_rx.recv() => {
                match signal {
                    Some(InternalSignal::Shutdown) => {
                        info!("Shutdown signal received");
                        break 'external;
                    }
                    Some(InternalSignal::AddConversation(conversation_id)) => {
                        info!(conversation_id, "Adding conversation subscription");
                        let rx = state.feeds_online.subscribe(&conversation_id);
                        stream_map.insert(conversation_id, BroadcastStream::new(rx));
                    }
                    None => {
                        info!("Internal channel closed");
                        break 'external; // canale chiuso => listener chiuso => stacca tutto
                    }
                }
            }
        }
    }

    info!("Write task terminated");
}

#[instrument(skip(websocket_tx, msg))]
async fn forward_message(
    websocket_tx: &mut SplitSink<WebSocket, Message>,
    msg: &MessageDTO,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(|e| {
        error!("Failed to serialize message: {:?}", e);
        axum::Error::new(e)
    })?;
    websocket_tx
        .send(Message::Text(Utf8Bytes::from(json)))
        .await
        .map_err(|e| {
            error!("Failed to send message through WebSocket: {:?}", e);
            e
        })
}

#[instrument(skip(websocket_rx, internal_tx, state), fields(user_id))]
pub async fn listen_ws(
    user_id: i64,
    mut websocket_rx: SplitStream<WebSocket>,
    internal_tx: UnboundedSender<InternalSignal>,
    state: Arc<AppState>,
) {
    info!("Listen task started");

    let timeout_duration = Duration::from_secs(TIMEOUT_DURATION_SECONDS);

    loop {
        match timeout(timeout_duration, StreamExt::next(&mut websocket_rx)).await {
            Ok(Some(msg_result)) => {
                let msg = match msg_result {
                    Ok(m) => m,
                    Err(e) => {
                        warn!("WebSocket error: {:?}", e);
                        break;
                    }
                };

                match msg {
                    Message::Close(_) => {
                        info!("Close message received");
                        break;
                    }
                    // il feed è di sola lettura: i messaggi si mandano via REST
                    Message::Text(_) | Message::Binary(_) => {
                        warn!("Ignoring inbound payload on read-only feed");
                    }
                    _ => {}
                }
            }
            Ok(None) => {
                info!("WebSocket stream ended");
                break;
            }
            Err(_) => {
                warn!(
                    timeout_secs = TIMEOUT_DURATION_SECONDS,
                    "Connection timeout"
                );
                break;
            }
        }
    }

    // Cleanup
    info!("Cleaning up connection");
    let _ = internal_tx.send(InternalSignal::Shutdown);
    state.users_online.remove_from_online(&user_id);
    info!("Listen task terminated");
}
