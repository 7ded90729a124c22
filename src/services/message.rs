//! Message services - Conversazioni, messaggi e stato di lettura

use crate::core::{AppError, AppState};
use crate::dtos::{
    ConversationDTO, CreateMessageDTO, MessageDTO, MessagesQuery, OpenConversationDTO,
};
use crate::entities::{Conversation, User};
use crate::repositories::{Create, NewMessageRecord, Read};
use crate::ws::usermap::InternalSignal;
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Quanti messaggi per pagina
const MESSAGES_PAGE_SIZE: i64 = 50;

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<ConversationDTO>>, AppError> {
    debug!("Listing conversations for user");
    // 1. Recuperare tutte le conversazioni dell'utente (singola query)
    // 2. Per ciascuna, arricchire con la controparte e il conteggio non letti
    // 3. Ritornare la lista di ConversationDTO come risposta JSON

    let conversations = state
        .conversation
        .find_many_by_user(&current_user.user_id)
        .await?;

    debug!("User has {} conversations", conversations.len());

    let mut result = Vec::with_capacity(conversations.len());
    for conversation in conversations {
        let counterparty_id = conversation.counterparty_of(current_user.user_id);
        let counterparty = state
            .user
            .read(&counterparty_id)
            .await
            .ok()
            .flatten()
            .map(|u| u.into());

        let unread_count = state
            .msg
            .count_unread(&conversation.conversation_id, &current_user.user_id)
            .await?;

        result.push(ConversationDTO::from_parts(
            conversation,
            counterparty,
            unread_count,
        ));
    }

    info!("Successfully retrieved {} conversations", result.len());
    Ok(Json(result))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, target = %body.user_id))]
pub async fn open_conversation(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<OpenConversationDTO>,
) -> Result<Json<ConversationDTO>, AppError> {
    debug!("Opening conversation");
    // 1. Niente conversazioni con se stessi
    // 2. Verificare che la controparte esista (fail-fast)
    // 3. get_or_create: la coppia è normalizzata, l'operazione è idempotente
    // 4. Avvisare i task WebSocket delle due parti della nuova conversazione

    if body.user_id == current_user.user_id {
        return Err(AppError::bad_request("Cannot open a conversation with yourself"));
    }

    let counterparty = state
        .user
        .read(&body.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User not found"))?;

    let conversation = state
        .conversation
        .get_or_create(&current_user.user_id, &body.user_id)
        .await?;

    // i feed connessi iniziano a seguire il canale della conversazione
    state.users_online.send_signal_if_online(
        &current_user.user_id,
        InternalSignal::AddConversation(conversation.conversation_id),
    );
    state.users_online.send_signal_if_online(
        &body.user_id,
        InternalSignal::AddConversation(conversation.conversation_id),
    );

    let unread_count = state
        .msg
        .count_unread(&conversation.conversation_id, &current_user.user_id)
        .await?;

    info!(conversation_id = conversation.conversation_id, "Conversation ready");
    Ok(Json(ConversationDTO::from_parts(
        conversation,
        Some(counterparty.into()),
        unread_count,
    )))
}

#[instrument(skip(state, conversation, params), fields(conversation_id = %conversation_id))]
pub async fn get_conversation_messages(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<i64>,
    Query(params): Query<MessagesQuery>,
    Extension(conversation): Extension<Conversation>, // dal conversation_party_middleware
) -> Result<Json<Vec<MessageDTO>>, AppError> {
    debug!("Fetching conversation messages");
    // Pagina di 50 dal più recente; before_date sposta la finestra indietro

    let messages = state
        .msg
        .find_many_paginated(
            &conversation.conversation_id,
            params.before_date.as_ref(),
            MESSAGES_PAGE_SIZE,
        )
        .await?;

    info!("Retrieved {} messages", messages.len());

    Ok(Json(messages.into_iter().map(MessageDTO::from).collect()))
}

#[instrument(skip(state, current_user, conversation, body), fields(conversation_id = %conversation_id, sender_id = %current_user.user_id))]
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<i64>,
    Extension(current_user): Extension<User>,
    Extension(conversation): Extension<Conversation>,
    Json(body): Json<CreateMessageDTO>,
) -> Result<Json<MessageDTO>, AppError> {
    debug!("Sending message");
    // 1. Validare il contenuto
    // 2. Salvare il messaggio (append: nessun altro invariante)
    // 3. Inoltrare sul canale broadcast della conversazione per i feed live

    body.validate()?;

    let message = state
        .msg
        .create(&NewMessageRecord {
            conversation_id: conversation.conversation_id,
            sender_id: current_user.user_id,
            content: body.content,
        })
        .await?;

    let dto = MessageDTO::from(message);

    // l'invio fallisce solo se nessuno è in ascolto: non è un errore
    if state
        .feeds_online
        .send(&conversation.conversation_id, Arc::new(dto.clone()))
        .is_err()
    {
        debug!("No live listeners for conversation");
    }

    info!("Message stored and broadcast");
    Ok(Json(dto))
}

#[instrument(skip(state, current_user, conversation), fields(conversation_id = %conversation_id, reader_id = %current_user.user_id))]
pub async fn mark_conversation_read(
    State(state): State<Arc<AppState>>,
    Path(conversation_id): Path<i64>,
    Extension(current_user): Extension<User>,
    Extension(conversation): Extension<Conversation>,
) -> Result<StatusCode, AppError> {
    debug!("Marking conversation as read");
    // Timbra solo i messaggi della controparte ancora senza read_at:
    // ripetere la chiamata non cambia nulla

    let stamped = state
        .msg
        .mark_read(&conversation.conversation_id, &current_user.user_id, &Utc::now())
        .await?;

    if stamped == 0 {
        debug!("Nothing to stamp");
    } else {
        info!("Stamped {} messages as read", stamped);
    }

    Ok(StatusCode::OK)
}
