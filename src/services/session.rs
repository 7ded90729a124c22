//! Session services - Ciclo di vita delle sessioni di tutoraggio
//!
//! Il ciclo di vita è una macchina a stati minimale: le transizioni legali
//! stanno in SessionStatus::can_transition_to, qui si applicano e basta.
//! Ogni azione scrive lo stato con un update diretto della riga.

use crate::core::{AppError, AppState, require_role};
use crate::dtos::{CreateSessionDTO, EnrichedSessionDTO, SessionDTO};
use crate::entities::{Session, SessionStatus, User, UserRole};
use crate::repositories::{Create, NewSessionRecord, Read};
use axum::{
    Extension,
    extract::{Json, State},
};
use chrono::Utc;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Transizione di stato o conflitto: la riga non viene mai toccata se
/// l'arco non è tra quelli legali
fn ensure_transition(session: &Session, next: SessionStatus) -> Result<(), AppError> {
    if !session.status.can_transition_to(next) {
        warn!(
            "Illegal transition {:?} -> {:?} for session {}",
            session.status, next, session.session_id
        );
        return Err(AppError::conflict("Illegal session status transition")
            .with_details(format!("{:?} -> {:?} is not allowed", session.status, next)));
    }
    Ok(())
}

/// Link stanza video assegnato all'accettazione; il suffisso deriva
/// dall'hash della riga, nessuna chiamata esterna
fn meeting_link_for(session: &Session) -> String {
    let mut hasher = DefaultHasher::new();
    session.session_id.hash(&mut hasher);
    session.created_at.timestamp_millis().hash(&mut hasher);
    let suffix = hasher.finish() as u32;
    format!("https://meet.jit.si/tutorlink-{}-{:08x}", session.session_id, suffix)
}

#[instrument(skip(state, current_user, body), fields(student_id = %current_user.user_id, tutor_id = %body.tutor_id))]
pub async fn create_session(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<CreateSessionDTO>,
) -> Result<Json<SessionDTO>, AppError> {
    debug!("Creating session proposal");
    // 1. Solo gli studenti propongono sessioni
    // 2. Validare il DTO (materia, durata) e rifiutare orari nel passato
    // 3. Verificare che il tutor esista, abbia un profilo e insegni la materia
    // 4. Verificare che l'orario non si sovrapponga a una sessione non cancellata del tutor
    // 5. Calcolare il prezzo dalla tariffa corrente del tutor (mai dal client)
    // 6. Salvare la sessione in stato pending e avvisare il tutor via email

    require_role(&current_user, UserRole::Student)?;
    body.validate()?;

    if body.scheduled_at <= Utc::now() {
        return Err(AppError::bad_request("Session must be scheduled in the future"));
    }

    let tutor = state
        .user
        .read(&body.tutor_id)
        .await?
        .filter(|u| u.role == UserRole::Tutor)
        .ok_or_else(|| AppError::not_found("Tutor not found"))?;

    let profile = state
        .tutor_profile
        .read(&body.tutor_id)
        .await?
        .ok_or_else(|| AppError::not_found("Tutor not found"))?;

    if !profile.teaches(&body.subject) {
        return Err(AppError::bad_request("Tutor does not teach this subject"));
    }

    let proposed_end = body.scheduled_at + chrono::Duration::minutes(body.duration_mins);
    let busy = state
        .session
        .find_busy_between(&body.tutor_id, &body.scheduled_at, &proposed_end)
        .await?;
    let overlaps = busy
        .iter()
        .any(|s| body.scheduled_at < s.ends_at() && s.scheduled_at < proposed_end);
    if overlaps {
        warn!("Proposed slot overlaps an existing session");
        return Err(AppError::conflict("Tutor already has a session in that slot"));
    }

    let price_cents = Session::price_for(profile.hourly_rate_cents, body.duration_mins);

    let session = state
        .session
        .create(&NewSessionRecord {
            student_id: current_user.user_id,
            tutor_id: body.tutor_id,
            subject: body.subject.clone(),
            scheduled_at: body.scheduled_at,
            duration_mins: body.duration_mins,
            price_cents,
        })
        .await?;

    state.notify.spawn_email(
        tutor.email,
        "New session request".to_string(),
        format!(
            "{} requested a {} session on {} ({} minutes).",
            current_user.username, session.subject, session.scheduled_at, session.duration_mins
        ),
    );

    info!(session_id = session.session_id, "Session proposed");
    Ok(Json(SessionDTO::from(session)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn list_my_sessions(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<SessionDTO>>, AppError> {
    debug!("Listing sessions for user");
    let sessions = state.session.find_many_by_user(&current_user.user_id).await?;
    info!("Found {} sessions", sessions.len());
    Ok(Json(sessions.into_iter().map(SessionDTO::from).collect()))
}

#[instrument(skip(state, session), fields(session_id = %session.session_id))]
pub async fn get_session(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<Session>, // ottenuta dal session_party_middleware
) -> Result<Json<EnrichedSessionDTO>, AppError> {
    debug!("Fetching session detail");
    // Arricchimento con le due parti in parallelo; gli errori di lettura
    // degradano a None
    let (student, tutor) = futures::future::join(
        state.user.read(&session.student_id),
        state.user.read(&session.tutor_id),
    )
    .await;
    let student = student.ok().flatten().map(|u| u.into());
    let tutor = tutor.ok().flatten().map(|u| u.into());

    Ok(Json(EnrichedSessionDTO {
        session_id: session.session_id,
        subject: session.subject,
        scheduled_at: session.scheduled_at,
        duration_mins: session.duration_mins,
        price_cents: session.price_cents,
        status: session.status,
        meeting_link: session.meeting_link,
        student,
        tutor,
    }))
}

#[instrument(skip(state, current_user, session), fields(session_id = %session.session_id, user_id = %current_user.user_id))]
pub async fn accept_session(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Extension(session): Extension<Session>,
) -> Result<Json<SessionDTO>, AppError> {
    debug!("Tutor accepting session");
    // 1. Solo il tutor della sessione può accettare
    // 2. Transizione pending -> awaiting_payment, altrimenti conflitto
    // 3. Assegnare il link stanza video
    // 4. Avvisare lo studente che può procedere col pagamento

    if current_user.user_id != session.tutor_id {
        return Err(AppError::forbidden("Only the tutor can accept a session"));
    }
    ensure_transition(&session, SessionStatus::AwaitingPayment)?;

    let link = meeting_link_for(&session);
    state.session.set_meeting_link(&session.session_id, &link).await?;
    state
        .session
        .update_status(&session.session_id, SessionStatus::AwaitingPayment)
        .await?;

    if let Some(student) = state.user.read(&session.student_id).await? {
        state.notify.spawn_email(
            student.email,
            "Session accepted".to_string(),
            format!(
                "Your {} session on {} was accepted. Complete the payment to confirm it.",
                session.subject, session.scheduled_at
            ),
        );
    }

    let updated = state
        .session
        .read(&session.session_id)
        .await?
        .ok_or_else(|| AppError::not_found("Session not found"))?;

    info!("Session accepted");
    Ok(Json(SessionDTO::from(updated)))
}

#[instrument(skip(state, current_user, session), fields(session_id = %session.session_id, user_id = %current_user.user_id))]
pub async fn decline_session(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Extension(session): Extension<Session>,
) -> Result<Json<SessionDTO>, AppError> {
    debug!("Tutor declining session");
    // Una proposta rifiutata finisce cancelled: lo stato enumerato è chiuso
    // e a valle nessuno distingue il rifiuto dalla cancellazione anticipata

    if current_user.user_id != session.tutor_id {
        return Err(AppError::forbidden("Only the tutor can decline a session"));
    }
    if session.status != SessionStatus::Pending {
        return Err(AppError::conflict("Only pending sessions can be declined"));
    }
    ensure_transition(&session, SessionStatus::Cancelled)?;

    state
        .session
        .update_status(&session.session_id, SessionStatus::Cancelled)
        .await?;

    if let Some(student) = state.user.read(&session.student_id).await? {
        state.notify.spawn_email(
            student.email,
            "Session declined".to_string(),
            format!(
                "Your {} session request for {} was declined by the tutor.",
                session.subject, session.scheduled_at
            ),
        );
    }

    let updated = state
        .session
        .read(&session.session_id)
        .await?
        .ok_or_else(|| AppError::not_found("Session not found"))?;

    info!("Session declined");
    Ok(Json(SessionDTO::from(updated)))
}

#[instrument(skip(state, current_user, session), fields(session_id = %session.session_id, user_id = %current_user.user_id))]
pub async fn cancel_session(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Extension(session): Extension<Session>,
) -> Result<Json<SessionDTO>, AppError> {
    debug!("Cancelling session");
    // Entrambe le parti possono cancellare finché lo stato non è terminale

    ensure_transition(&session, SessionStatus::Cancelled)?;

    state
        .session
        .update_status(&session.session_id, SessionStatus::Cancelled)
        .await?;

    // notifica best-effort alla controparte
    let counterparty_id = if session.student_id == current_user.user_id {
        session.tutor_id
    } else {
        session.student_id
    };
    if let Some(counterparty) = state.user.read(&counterparty_id).await? {
        state.notify.spawn_email(
            counterparty.email,
            "Session cancelled".to_string(),
            format!(
                "The {} session scheduled at {} was cancelled by {}.",
                session.subject, session.scheduled_at, current_user.username
            ),
        );
    }

    let updated = state
        .session
        .read(&session.session_id)
        .await?
        .ok_or_else(|| AppError::not_found("Session not found"))?;

    info!("Session cancelled");
    Ok(Json(SessionDTO::from(updated)))
}

#[instrument(skip(state, current_user, session), fields(session_id = %session.session_id, user_id = %current_user.user_id))]
pub async fn complete_session(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Extension(session): Extension<Session>,
) -> Result<Json<SessionDTO>, AppError> {
    debug!("Completing session");

    if current_user.user_id != session.tutor_id {
        return Err(AppError::forbidden("Only the tutor can complete a session"));
    }
    ensure_transition(&session, SessionStatus::Completed)?;

    state
        .session
        .update_status(&session.session_id, SessionStatus::Completed)
        .await?;

    let updated = state
        .session
        .read(&session.session_id)
        .await?
        .ok_or_else(|| AppError::not_found("Session not found"))?;

    info!("Session completed");
    Ok(Json(SessionDTO::from(updated)))
}
