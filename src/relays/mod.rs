//! Relays module - Client verso i provider esterni
//!
//! Ogni relay è un client stateless: i service validano sul database,
//! il relay inoltra la chiamata HTTP al provider e basta. Niente retry,
//! niente coda: un invio fallito viene loggato e perso.

pub mod matching;
pub mod notify;
pub mod payments;

// Re-exports per facilitare l'import
pub use matching::MatchingClient;
pub use notify::NotifyClient;
pub use payments::PaymentClient;
