//! Application State - Stato globale dell'applicazione
//!
//! Contiene tutti i repository, i client verso i provider esterni e lo
//! stato condiviso necessario per gestire l'applicazione.

use crate::core::Config;
use crate::relays::{MatchingClient, NotifyClient, PaymentClient};
use crate::repositories::{
    ConversationRepository, EnrollmentRepository, MessageRepository, ReviewRepository,
    SessionRepository, StudentProfileRepository, TutorProfileRepository, UserRepository,
};
use crate::ws::conversation_map::ConversationMap;
use crate::ws::usermap::UserMap;
use sqlx::SqlitePool;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Repository per la gestione degli utenti
    pub user: UserRepository,

    /// Repository per i profili tutor
    pub tutor_profile: TutorProfileRepository,

    /// Repository per i profili studente
    pub student_profile: StudentProfileRepository,

    /// Repository per le sessioni di tutoraggio
    pub session: SessionRepository,

    /// Repository per le conversazioni
    pub conversation: ConversationRepository,

    /// Repository per i messaggi
    pub msg: MessageRepository,

    /// Repository per le recensioni
    pub review: ReviewRepository,

    /// Repository per le iscrizioni alle classi
    pub enrollment: EnrollmentRepository,

    /// Relay verso il processore pagamenti + Stripe Connect
    pub payments: PaymentClient,

    /// Relay verso l'LLM di matching
    pub matching: MatchingClient,

    /// Relay verso i provider email/SMS
    pub notify: NotifyClient,

    /// Secret key per JWT token
    pub jwt_secret: String,

    /// Mappa concorrente degli utenti connessi al feed WebSocket
    pub users_online: UserMap,

    /// Canali broadcast delle conversazioni con almeno un utente connesso
    pub feeds_online: ConversationMap,
}

impl AppState {
    /// Crea una nuova istanza di AppState inizializzando tutti i repository
    /// con il pool di connessioni fornito e i relay dalla configurazione.
    pub fn new(pool: SqlitePool, config: &Config) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            tutor_profile: TutorProfileRepository::new(pool.clone()),
            student_profile: StudentProfileRepository::new(pool.clone()),
            session: SessionRepository::new(pool.clone()),
            conversation: ConversationRepository::new(pool.clone()),
            msg: MessageRepository::new(pool.clone()),
            review: ReviewRepository::new(pool.clone()),
            enrollment: EnrollmentRepository::new(pool),
            payments: PaymentClient::from_config(config),
            matching: MatchingClient::from_config(config),
            notify: NotifyClient::from_config(config),
            jwt_secret: config.jwt_secret.clone(),
            users_online: UserMap::new(),
            feeds_online: ConversationMap::new(),
        }
    }
}
