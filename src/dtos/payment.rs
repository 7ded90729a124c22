//! Payment DTOs - Data Transfer Objects per il relay pagamenti

use serde::{Deserialize, Serialize};

/// DTO per creare un ordine: il client manda SOLO l'id sessione,
/// prezzo e stato vengono riletti dal database lato server
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateOrderDTO {
    pub session_id: i64,
}

/// Ordine creato presso il provider
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OrderDTO {
    pub order_id: String,
    pub status: String,
    pub approve_url: Option<String>,
}

/// Esito della capture
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CaptureResultDTO {
    pub order_id: String,
    pub status: String,
    pub session_id: i64,
}

/// Link di onboarding Stripe Connect per il tutor
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConnectOnboardingDTO {
    pub account_id: String,
    pub onboarding_url: String,
}
