//! MatchingClient - Relay verso l'LLM per il matching studente-tutor
//!
//! Il questionario dello studente e la lista dei tutor candidati vengono
//! impacchettati in un prompt e inoltrati a un endpoint chat-completions;
//! la risposta attesa è un array JSON di punteggi per tutor.

use crate::core::{AppError, Config};
use crate::dtos::{MatchScoreDTO, TutorCandidate};
use crate::entities::StudentProfile;
use serde::Deserialize;
use tracing::{info, instrument, warn};

const MATCH_SYSTEM_PROMPT: &str = r#"You are a tutoring-marketplace matching assistant. You receive one student profile and a list of tutor candidates as JSON.
Score how well each tutor fits the student on a 0-100 scale, considering subject overlap first, then learning style and goals, then price.
You MUST answer with a JSON array only, no prose, no markdown fences, one object per tutor:
[{"tutor_id": 1, "score": 87.5, "reason": "one short sentence"}]
Every tutor in the input MUST appear exactly once in the output.
"#;

#[derive(Clone)]
pub struct MatchingClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

impl MatchingClient {
    pub fn from_config(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.llm_api_base.clone(),
            api_key: config.llm_api_key.clone(),
            model: config.llm_model.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Chiede al modello una classifica dei candidati per lo studente.
    /// I punteggi tornano ordinati dal migliore al peggiore.
    #[instrument(skip(self, student, candidates), fields(candidate_count = candidates.len()))]
    pub async fn rank(
        &self,
        student: &StudentProfile,
        candidates: &[TutorCandidate],
    ) -> Result<Vec<MatchScoreDTO>, AppError> {
        if !self.is_configured() {
            return Err(AppError::service_unavailable("Matching model not configured"));
        }

        let user_payload = serde_json::json!({
            "student": {
                "display_name": student.display_name,
                "learning_goals": student.learning_goals,
                "learning_style": student.learning_style,
                "grade_level": student.grade_level,
            },
            "tutors": candidates,
        });

        let body = serde_json::json!({
            "model": self.model,
            "temperature": 0,
            "messages": [
                {"role": "system", "content": MATCH_SYSTEM_PROMPT},
                {"role": "user", "content": user_payload.to_string()},
            ]
        });

        let response = self
            .http
            .post(format!("{}/chat/completions", self.api_base))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let details = response.text().await.unwrap_or_default();
            warn!(%status, "Matching model rejected the request");
            return Err(AppError::bad_gateway("Matching model error").with_details(details));
        }

        let completion: ChatCompletionResponse = response.json().await?;
        let content = completion
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or_default();

        let mut scores = Self::parse_scores(content)?;
        // classifica dal punteggio più alto
        scores.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

        info!(score_count = scores.len(), "Matching scores parsed");
        Ok(scores)
    }

    /// Il modello ogni tanto incornicia comunque il JSON in un fence
    /// markdown: lo togliamo prima del parse
    fn parse_scores(content: &str) -> Result<Vec<MatchScoreDTO>, AppError> {
        let trimmed = content.trim();
        let without_fences = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .map(|rest| rest.strip_suffix("```").unwrap_or(rest))
            .unwrap_or(trimmed)
            .trim();

        serde_json::from_str::<Vec<MatchScoreDTO>>(without_fences).map_err(|e| {
            warn!("Matching model returned unparsable content");
            AppError::bad_gateway("Matching model returned invalid scores")
                .with_details(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::MatchingClient;

    #[test]
    fn parses_plain_json_array() {
        let scores = MatchingClient::parse_scores(
            r#"[{"tutor_id": 2, "score": 91.0, "reason": "strong subject overlap"}]"#,
        )
        .unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].tutor_id, 2);
        assert_eq!(scores[0].score, 91.0);
    }

    #[test]
    fn strips_markdown_fences() {
        let content = "```json\n[{\"tutor_id\": 4, \"score\": 55, \"reason\": \"partial fit\"}]\n```";
        let scores = MatchingClient::parse_scores(content).unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].tutor_id, 4);
    }

    #[test]
    fn rejects_prose_answers() {
        assert!(MatchingClient::parse_scores("I think tutor 2 is best.").is_err());
    }
}
