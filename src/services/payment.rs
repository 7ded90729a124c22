//! Payment services - Relay verso il processore pagamenti
//!
//! Gli handler rileggono SEMPRE prezzo e stato dal database prima di
//! chiamare il provider: gli importi proposti dal client vengono ignorati.

use crate::core::{AppError, AppState, require_role};
use crate::dtos::{CaptureResultDTO, ConnectOnboardingDTO, CreateOrderDTO, OrderDTO};
use crate::entities::{SessionStatus, User, UserRole};
use crate::repositories::Read;
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, session_id = %body.session_id))]
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<CreateOrderDTO>,
) -> Result<Json<OrderDTO>, AppError> {
    debug!("Creating payment order");
    // 1. Rileggere la sessione dal database (prezzo e stato autoritativi)
    // 2. Solo lo studente della sessione può pagare
    // 3. Si paga solo una sessione awaiting_payment
    // 4. Creare l'ordine presso il provider con l'importo riletto
    // 5. Salvare l'order id sulla riga della sessione

    let session = state
        .session
        .read(&body.session_id)
        .await?
        .ok_or_else(|| AppError::not_found("Session not found"))?;

    if session.student_id != current_user.user_id {
        return Err(AppError::forbidden("Only the student of the session can pay it"));
    }

    if session.status != SessionStatus::AwaitingPayment {
        warn!("Order requested for session in status {:?}", session.status);
        return Err(AppError::conflict("Session is not awaiting payment"));
    }

    let order = state
        .payments
        .create_order(session.session_id, session.price_cents, "EUR")
        .await?;

    state
        .session
        .set_payment_order_id(&session.session_id, &order.order_id)
        .await?;

    info!(order_id = %order.order_id, "Payment order stored on session");
    Ok(Json(OrderDTO {
        order_id: order.order_id,
        status: order.status,
        approve_url: order.approve_url,
    }))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id, order_id = %order_id))]
pub async fn capture_order(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Path(order_id): Path<String>,
) -> Result<Json<CaptureResultDTO>, AppError> {
    debug!("Capturing payment order");
    // 1. Ritrovare la sessione dall'order id (il provider non è la fonte di verità)
    // 2. Solo lo studente della sessione può completare la capture
    // 3. La sessione deve essere ancora awaiting_payment
    // 4. Capture presso il provider; solo COMPLETED conferma la sessione
    // 5. Avvisare le due parti della conferma

    let session = state
        .session
        .find_by_order_id(&order_id)
        .await?
        .ok_or_else(|| AppError::not_found("Order not found"))?;

    if session.student_id != current_user.user_id {
        return Err(AppError::forbidden("Only the student of the session can pay it"));
    }

    if session.status != SessionStatus::AwaitingPayment {
        return Err(AppError::conflict("Session is not awaiting payment"));
    }

    let captured = state.payments.capture_order(&order_id).await?;

    if captured.status != "COMPLETED" {
        warn!(status = %captured.status, "Capture did not complete");
        return Err(AppError::bad_gateway("Payment capture did not complete")
            .with_details(captured.status));
    }

    state
        .session
        .update_status(&session.session_id, SessionStatus::Confirmed)
        .await?;

    // notifiche best-effort a entrambe le parti
    for user_id in [session.student_id, session.tutor_id] {
        if let Some(user) = state.user.read(&user_id).await? {
            state.notify.spawn_email(
                user.email,
                "Session confirmed".to_string(),
                format!(
                    "The {} session on {} is confirmed. Meeting link: {}",
                    session.subject,
                    session.scheduled_at,
                    session.meeting_link.as_deref().unwrap_or("(assigned soon)")
                ),
            );
        }
    }

    info!("Session confirmed after capture");
    Ok(Json(CaptureResultDTO {
        order_id: captured.order_id,
        status: captured.status,
        session_id: session.session_id,
    }))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn connect_onboard(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<ConnectOnboardingDTO>, AppError> {
    debug!("Starting Connect onboarding");
    // 1. Solo i tutor incassano: serve il ruolo tutor
    // 2. Riusare l'account Connect già registrato, altrimenti crearlo
    // 3. Generare un link di onboarding fresco (i link sono monouso)

    require_role(&current_user, UserRole::Tutor)?;

    let profile = state
        .tutor_profile
        .read(&current_user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Profile not found"))?;

    let account_id = match profile.connect_account_id {
        Some(existing) => existing,
        None => {
            let created = state
                .payments
                .create_connect_account(&current_user.email)
                .await?;
            state
                .tutor_profile
                .set_connect_account(&current_user.user_id, &created)
                .await?;
            created
        }
    };

    let onboarding_url = state.payments.create_onboarding_link(&account_id).await?;

    info!(account_id = %account_id, "Onboarding link issued");
    Ok(Json(ConnectOnboardingDTO {
        account_id,
        onboarding_url,
    }))
}
