//! Matching services - Questionario AI di matching studente-tutor

use crate::core::{AppError, AppState, require_role};
use crate::dtos::{MatchRequestDTO, MatchScoreDTO, TutorCandidate, TutorSearchQuery};
use crate::entities::{User, UserRole};
use crate::repositories::Read;
use axum::{
    Extension,
    extract::{Json, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn match_tutors(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<MatchRequestDTO>,
) -> Result<Json<Vec<MatchScoreDTO>>, AppError> {
    debug!("Running AI matching");
    // 1. Solo gli studenti usano il matching; il profilo viene riletto dal DB
    // 2. Caricare i tutor candidati (eventuale filtro materia dal body)
    // 3. Nessun candidato -> lista vuota senza scomodare il modello
    // 4. Inoltrare profilo + candidati all'LLM e ritornare i punteggi ordinati

    require_role(&current_user, UserRole::Student)?;

    let student = state
        .student_profile
        .read(&current_user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Profile not found"))?;

    let candidates_query = TutorSearchQuery {
        subject: body.subject,
        max_rate_cents: None,
        min_rating: None,
        search: None,
    };
    let profiles = state.tutor_profile.search(&candidates_query).await?;

    if profiles.is_empty() {
        info!("No tutor candidates, skipping model call");
        return Ok(Json(Vec::new()));
    }

    let candidates: Vec<TutorCandidate> = profiles
        .into_iter()
        .map(|p| TutorCandidate {
            tutor_id: p.user_id,
            subjects: p.subject_list(),
            display_name: p.display_name,
            bio: p.bio,
            hourly_rate_cents: p.hourly_rate_cents,
            rating_avg: p.rating_avg,
        })
        .collect();

    let scores = state.matching.rank(&student, &candidates).await?;

    info!("Matching produced {} scores", scores.len());
    Ok(Json(scores))
}
