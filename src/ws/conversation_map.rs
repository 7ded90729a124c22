use crate::dtos::MessageDTO;
use crate::ws::BROADCAST_CHANNEL_CAPACITY;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::SendError;
use tokio::sync::broadcast::{Receiver, Sender};
use tracing::{info, instrument, warn};

pub struct ConversationMap {
    /// Testa tx del canale broadcast di ogni conversazione "calda"
    channels: DashMap<i64, Sender<Arc<MessageDTO>>>,
}

impl ConversationMap {
    pub fn new() -> Self {
        ConversationMap {
            channels: DashMap::new(),
        }
    }

    #[instrument(skip(self), fields(conversation_id))]
    pub fn subscribe(&self, conversation_id: &i64) -> Receiver<Arc<MessageDTO>> {
        match self.channels.get(conversation_id) {
            None => {
                info!("Creating new broadcast channel for conversation");
                // Arc<MessageDTO> per condividere il riferimento, non il messaggio:
                // evita copie inutili su ogni rx
                let (tx, rx) = broadcast::channel::<Arc<MessageDTO>>(BROADCAST_CHANNEL_CAPACITY);
                self.channels.insert(*conversation_id, tx);
                rx
            }
            Some(c) => {
                info!("Subscribing to existing broadcast channel");
                c.value().subscribe()
            }
        }
    }

    #[instrument(skip(self, conversation_ids))]
    pub fn subscribe_multiple(&self, conversation_ids: Vec<i64>) -> Vec<Receiver<Arc<MessageDTO>>> {
        info!(count = conversation_ids.len(), "Subscribing to multiple conversations");
        conversation_ids
            .into_iter()
            .map(|id| self.subscribe(&id))
            .collect()
    }

    #[instrument(skip(self, msg), fields(conversation_id))]
    pub fn send(
        &self,
        conversation_id: &i64,
        msg: Arc<MessageDTO>,
    ) -> Result<usize, SendError<Arc<MessageDTO>>> {
        if let Some(channel) = self.channels.get(conversation_id) {
            match channel.send(msg.clone()) {
                Ok(n) => {
                    info!(receivers = n, "Message broadcast to receivers");
                    Ok(n)
                }
                Err(e) => {
                    warn!("No active receivers, removing channel");
                    // Nessuno sta ascoltando, rimuovi il channel
                    drop(channel); // Rilascia il lock
                    self.channels.remove(conversation_id);
                    Err(e)
                }
            }
        } else {
            // conversazione senza ascoltatori: nessun canale, nessun invio
            Err(SendError(msg))
        }
    }
}
