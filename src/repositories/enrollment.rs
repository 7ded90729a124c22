//! EnrollmentRepository - Repository per le iscrizioni alle classi

use super::{Delete, Read};
use crate::entities::ClassEnrollment;
use chrono::Utc;
use sqlx::{Error, SqlitePool};

// ENROLLMENT REPO
pub struct EnrollmentRepository {
    connection_pool: SqlitePool,
}

impl EnrollmentRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn create(
        &self,
        student_id: i64,
        tutor_id: i64,
        subject: &str,
    ) -> Result<ClassEnrollment, Error> {
        let joined_at = Utc::now();
        sqlx::query(
            "INSERT INTO class_enrollments (student_id, tutor_id, subject, joined_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(student_id)
        .bind(tutor_id)
        .bind(subject)
        .bind(joined_at)
        .execute(&self.connection_pool)
        .await?;

        Ok(ClassEnrollment {
            student_id,
            tutor_id,
            subject: subject.to_string(),
            joined_at,
        })
    }

    pub async fn find_many_by_tutor(
        &self,
        tutor_id: &i64,
    ) -> Result<Vec<ClassEnrollment>, Error> {
        let enrollments = sqlx::query_as::<_, ClassEnrollment>(
            "SELECT student_id, tutor_id, subject, joined_at
             FROM class_enrollments WHERE tutor_id = ?
             ORDER BY joined_at ASC",
        )
        .bind(tutor_id)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(enrollments)
    }
}

// chiave composta (student_id, tutor_id)
impl Read<ClassEnrollment, (i64, i64)> for EnrollmentRepository {
    async fn read(&self, id: &(i64, i64)) -> Result<Option<ClassEnrollment>, Error> {
        let enrollment = sqlx::query_as::<_, ClassEnrollment>(
            "SELECT student_id, tutor_id, subject, joined_at
             FROM class_enrollments WHERE student_id = ? AND tutor_id = ?",
        )
        .bind(id.0)
        .bind(id.1)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(enrollment)
    }
}

impl Delete<(i64, i64)> for EnrollmentRepository {
    async fn delete(&self, id: &(i64, i64)) -> Result<(), Error> {
        sqlx::query("DELETE FROM class_enrollments WHERE student_id = ? AND tutor_id = ?")
            .bind(id.0)
            .bind(id.1)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }
}
