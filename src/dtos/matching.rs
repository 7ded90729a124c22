//! Matching DTOs - Data Transfer Objects per il relay di matching AI

use serde::{Deserialize, Serialize};

/// DTO per la richiesta di matching; il profilo dello studente viene
/// riletto dal database, il body può solo restringere la materia
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MatchRequestDTO {
    #[serde(default)]
    pub subject: Option<String>,
}

/// Candidato passato al prompt (vista ridotta del profilo tutor)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TutorCandidate {
    pub tutor_id: i64,
    pub display_name: String,
    pub subjects: Vec<String>,
    pub bio: Option<String>,
    pub hourly_rate_cents: i64,
    pub rating_avg: f64,
}

/// Punteggio restituito dal modello per un singolo tutor
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MatchScoreDTO {
    pub tutor_id: i64,
    pub score: f64,
    pub reason: String,
}
