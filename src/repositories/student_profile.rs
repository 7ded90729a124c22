//! StudentProfileRepository - Repository per i profili studente

use super::{Read, Update};
use crate::dtos::UpdateStudentProfileDTO;
use crate::entities::StudentProfile;
use sqlx::{Error, SqlitePool};

// STUDENT PROFILE REPO
pub struct StudentProfileRepository {
    connection_pool: SqlitePool,
}

impl StudentProfileRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    pub async fn create_default(
        &self,
        user_id: i64,
        display_name: &str,
    ) -> Result<StudentProfile, Error> {
        sqlx::query("INSERT INTO student_profiles (user_id, display_name) VALUES (?, ?)")
            .bind(user_id)
            .bind(display_name)
            .execute(&self.connection_pool)
            .await?;

        self.read(&user_id).await?.ok_or(Error::RowNotFound)
    }
}

impl Read<StudentProfile, i64> for StudentProfileRepository {
    async fn read(&self, id: &i64) -> Result<Option<StudentProfile>, Error> {
        let profile = sqlx::query_as::<_, StudentProfile>(
            "SELECT user_id, display_name, learning_goals, learning_style, grade_level
             FROM student_profiles WHERE user_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(profile)
    }
}

impl Update<StudentProfile, UpdateStudentProfileDTO, i64> for StudentProfileRepository {
    async fn update(
        &self,
        id: &i64,
        data: &UpdateStudentProfileDTO,
    ) -> Result<StudentProfile, Error> {
        let current = self.read(id).await?.ok_or(Error::RowNotFound)?;

        let display_name = data.display_name.clone().unwrap_or(current.display_name);
        let learning_goals = data.learning_goals.clone().or(current.learning_goals);
        let learning_style = data.learning_style.clone().or(current.learning_style);
        let grade_level = data.grade_level.clone().or(current.grade_level);

        sqlx::query(
            "UPDATE student_profiles
             SET display_name = ?, learning_goals = ?, learning_style = ?, grade_level = ?
             WHERE user_id = ?",
        )
        .bind(&display_name)
        .bind(&learning_goals)
        .bind(&learning_style)
        .bind(&grade_level)
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        self.read(id).await?.ok_or(Error::RowNotFound)
    }
}
