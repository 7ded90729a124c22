//! ReviewRepository - Repository per le recensioni

use super::Create;
use crate::entities::Review;
use chrono::Utc;
use sqlx::{Error, SqlitePool};

#[derive(Debug, Clone)]
pub struct NewReviewRecord {
    pub session_id: i64,
    pub student_id: i64,
    pub tutor_id: i64,
    pub rating: i64,
    pub comment: Option<String>,
}

// REVIEW REPO
pub struct ReviewRepository {
    connection_pool: SqlitePool,
}

impl ReviewRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn exists_for(
        &self,
        session_id: &i64,
        student_id: &i64,
    ) -> Result<bool, Error> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM reviews WHERE session_id = ? AND student_id = ?",
        )
        .bind(session_id)
        .bind(student_id)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(count.0 > 0)
    }

    pub async fn find_many_by_tutor(&self, tutor_id: &i64) -> Result<Vec<Review>, Error> {
        let reviews = sqlx::query_as::<_, Review>(
            "SELECT review_id, session_id, student_id, tutor_id, rating, comment, created_at
             FROM reviews WHERE tutor_id = ?
             ORDER BY created_at DESC",
        )
        .bind(tutor_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(reviews)
    }

    /// Media e conteggio per il rollup denormalizzato sul profilo tutor
    pub async fn aggregate_for_tutor(&self, tutor_id: &i64) -> Result<(f64, i64), Error> {
        let row: (f64, i64) = sqlx::query_as(
            "SELECT COALESCE(AVG(rating), 0.0), COUNT(*) FROM reviews WHERE tutor_id = ?",
        )
        .bind(tutor_id)
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(row)
    }
}

impl Create<Review, NewReviewRecord> for ReviewRepository {
    async fn create(&self, data: &NewReviewRecord) -> Result<Review, Error> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO reviews (session_id, student_id, tutor_id, rating, comment, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(data.session_id)
        .bind(data.student_id)
        .bind(data.tutor_id)
        .bind(data.rating)
        .bind(&data.comment)
        .bind(created_at)
        .execute(&self.connection_pool)
        .await?;

        Ok(Review {
            review_id: result.last_insert_rowid(),
            session_id: data.session_id,
            student_id: data.student_id,
            tutor_id: data.tutor_id,
            rating: data.rating,
            comment: data.comment.clone(),
            created_at,
        })
    }
}
