//! SessionRepository - Repository per le sessioni di tutoraggio

use super::{Create, Read};
use crate::entities::{Session, SessionStatus};
use chrono::{DateTime, Duration, Utc};
use sqlx::{Error, SqlitePool};

const SESSION_COLUMNS: &str = "session_id, student_id, tutor_id, subject, scheduled_at, \
     duration_mins, price_cents, status, meeting_link, payment_order_id, created_at";

/// Record di insert: il prezzo è già stato calcolato dal service
/// sulla tariffa corrente del tutor
#[derive(Debug, Clone)]
pub struct NewSessionRecord {
    pub student_id: i64,
    pub tutor_id: i64,
    pub subject: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_mins: i64,
    pub price_cents: i64,
}

// SESSION REPO
pub struct SessionRepository {
    connection_pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Tutte le sessioni in cui l'utente compare come studente o tutor
    pub async fn find_many_by_user(&self, user_id: &i64) -> Result<Vec<Session>, Error> {
        let sessions = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE student_id = ?1 OR tutor_id = ?1
             ORDER BY scheduled_at DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(sessions)
    }

    /// Sessioni non cancellate del tutor che possono intersecare la
    /// finestra richiesta. Le durate arrivano al massimo a 180 minuti,
    /// quindi basta allargare il bordo sinistro di altrettanto e lasciare
    /// il confronto fine al chiamante.
    pub async fn find_busy_between(
        &self,
        tutor_id: &i64,
        from: &DateTime<Utc>,
        until: &DateTime<Utc>,
    ) -> Result<Vec<Session>, Error> {
        let margin = *from - Duration::minutes(180);
        let sessions = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE tutor_id = ? AND status != 'cancelled'
               AND scheduled_at >= ? AND scheduled_at < ?
             ORDER BY scheduled_at ASC"
        ))
        .bind(tutor_id)
        .bind(margin)
        .bind(until)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(sessions)
    }

    /// Sessioni non terminali di un utente (per la cancellazione account)
    pub async fn find_open_by_user(&self, user_id: &i64) -> Result<Vec<Session>, Error> {
        let sessions = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE (student_id = ?1 OR tutor_id = ?1)
               AND status IN ('pending', 'awaiting_payment', 'confirmed')"
        ))
        .bind(user_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(sessions)
    }

    pub async fn find_by_order_id(&self, order_id: &str) -> Result<Option<Session>, Error> {
        let session = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE payment_order_id = ?"
        ))
        .bind(order_id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(session)
    }

    pub async fn update_status(
        &self,
        session_id: &i64,
        status: SessionStatus,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE sessions SET status = ? WHERE session_id = ?")
            .bind(status)
            .bind(session_id)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }

    pub async fn set_meeting_link(&self, session_id: &i64, link: &str) -> Result<(), Error> {
        sqlx::query("UPDATE sessions SET meeting_link = ? WHERE session_id = ?")
            .bind(link)
            .bind(session_id)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }

    pub async fn set_payment_order_id(
        &self,
        session_id: &i64,
        order_id: &str,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE sessions SET payment_order_id = ? WHERE session_id = ?")
            .bind(order_id)
            .bind(session_id)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }
}

impl Create<Session, NewSessionRecord> for SessionRepository {
    async fn create(&self, data: &NewSessionRecord) -> Result<Session, Error> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO sessions
                 (student_id, tutor_id, subject, scheduled_at, duration_mins,
                  price_cents, status, created_at)
             VALUES (?, ?, ?, ?, ?, ?, 'pending', ?)",
        )
        .bind(data.student_id)
        .bind(data.tutor_id)
        .bind(&data.subject)
        .bind(data.scheduled_at)
        .bind(data.duration_mins)
        .bind(data.price_cents)
        .bind(created_at)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_rowid();

        Ok(Session {
            session_id: new_id,
            student_id: data.student_id,
            tutor_id: data.tutor_id,
            subject: data.subject.clone(),
            scheduled_at: data.scheduled_at,
            duration_mins: data.duration_mins,
            price_cents: data.price_cents,
            status: SessionStatus::Pending,
            meeting_link: None,
            payment_order_id: None,
            created_at,
        })
    }
}

impl Read<Session, i64> for SessionRepository {
    async fn read(&self, id: &i64) -> Result<Option<Session>, Error> {
        let session = sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE session_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(session)
    }
}
