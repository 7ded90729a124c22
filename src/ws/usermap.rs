use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, instrument, warn};

#[derive(Debug)]
pub enum InternalSignal {
    Shutdown,
    AddConversation(i64),
}

pub struct UserMap {
    users_online: DashMap<i64, UnboundedSender<InternalSignal>>,
}

impl UserMap {
    pub fn new() -> Self {
        UserMap {
            users_online: DashMap::new(),
        }
    }

    #[instrument(skip(self, tx), fields(user_id))]
    pub fn register_online(&self, user_id: i64, tx: UnboundedSender<InternalSignal>) {
        info!("Registering user {} as online", user_id);
        self.users_online.insert(user_id, tx);
        info!("Total online users: {}", self.users_online.len());
    }

    #[instrument(skip(self), fields(user_id))]
    pub fn remove_from_online(&self, user_id: &i64) {
        info!("Removing user from online");
        self.users_online.remove(user_id);
    }

    /// Avvisa il task di scrittura dell'utente (se connesso) che esiste una
    /// nuova conversazione da seguire
    #[instrument(skip(self), fields(user_id))]
    pub fn send_signal_if_online(&self, user_id: &i64, signal: InternalSignal) {
        if let Some(entry) = self.users_online.get(user_id) {
            let tx = entry.value();
            if let Err(e) = tx.send(signal) {
                warn!("Failed to deliver signal to user: {:?}", e);
            }
        } else {
            info!("User {} not online, signal not sent", user_id);
        }
    }

    pub fn online_count(&self) -> usize {
        self.users_online.len()
    }

    pub fn is_user_online(&self, user_id: &i64) -> bool {
        self.users_online.contains_key(user_id)
    }
}
