//! TutorProfileRepository - Repository per i profili tutor

use super::{Read, Update};
use crate::dtos::{TutorSearchQuery, UpdateTutorProfileDTO};
use crate::entities::TutorProfile;
use sqlx::{Error, SqlitePool};

const TUTOR_COLUMNS: &str = "user_id, display_name, bio, subjects, hourly_rate_cents, \
     class_price_cents, availability, connect_account_id, rating_avg, rating_count";

// TUTOR PROFILE REPO
pub struct TutorProfileRepository {
    connection_pool: SqlitePool,
}

impl TutorProfileRepository {
    pub fn new(connection_pool: SqlitePool) -> Self {
        Self { connection_pool }
    }

    /// Crea il profilo vuoto alla registrazione; i dettagli arrivano
    /// con le PATCH successive
    pub async fn create_default(
        &self,
        user_id: i64,
        display_name: &str,
    ) -> Result<TutorProfile, Error> {
        sqlx::query(
            "INSERT INTO tutor_profiles (user_id, display_name, subjects, availability)
             VALUES (?, ?, '[]', '{}')",
        )
        .bind(user_id)
        .bind(display_name)
        .execute(&self.connection_pool)
        .await?;

        self.read(&user_id).await?.ok_or(Error::RowNotFound)
    }

    /// Ricerca con filtri opzionali: materia, tariffa massima, voto minimo,
    /// prefisso del nome. Le materie sono un array JSON, il match sfrutta
    /// le virgolette del formato per evitare falsi positivi su sottostringhe.
    pub async fn search(&self, params: &TutorSearchQuery) -> Result<Vec<TutorProfile>, Error> {
        let profiles = sqlx::query_as::<_, TutorProfile>(&format!(
            "SELECT {TUTOR_COLUMNS} FROM tutor_profiles
             WHERE (?1 IS NULL OR subjects LIKE '%\"' || ?1 || '\"%')
               AND (?2 IS NULL OR hourly_rate_cents <= ?2)
               AND (?3 IS NULL OR rating_avg >= ?3)
               AND (?4 IS NULL OR display_name LIKE ?4 || '%')
             ORDER BY rating_avg DESC, hourly_rate_cents ASC
             LIMIT 50"
        ))
        .bind(&params.subject)
        .bind(params.max_rate_cents)
        .bind(params.min_rating)
        .bind(&params.search)
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(profiles)
    }

    /// Ricalcolo della media denormalizzata dopo una nuova recensione
    pub async fn update_rating(&self, user_id: &i64, avg: f64, count: i64) -> Result<(), Error> {
        sqlx::query("UPDATE tutor_profiles SET rating_avg = ?, rating_count = ? WHERE user_id = ?")
            .bind(avg)
            .bind(count)
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }

    pub async fn set_connect_account(
        &self,
        user_id: &i64,
        account_id: &str,
    ) -> Result<(), Error> {
        sqlx::query("UPDATE tutor_profiles SET connect_account_id = ? WHERE user_id = ?")
            .bind(account_id)
            .bind(user_id)
            .execute(&self.connection_pool)
            .await?;

        Ok(())
    }
}

impl Read<TutorProfile, i64> for TutorProfileRepository {
    async fn read(&self, id: &i64) -> Result<Option<TutorProfile>, Error> {
        let profile = sqlx::query_as::<_, TutorProfile>(&format!(
            "SELECT {TUTOR_COLUMNS} FROM tutor_profiles WHERE user_id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(profile)
    }
}

impl Update<TutorProfile, UpdateTutorProfileDTO, i64> for TutorProfileRepository {
    async fn update(
        &self,
        id: &i64,
        data: &UpdateTutorProfileDTO,
    ) -> Result<TutorProfile, Error> {
        // Lettura dello stato corrente, poi scrittura completa dei campi
        // risultanti: evita l'SQL dinamico per gli update parziali
        let current = self.read(id).await?.ok_or(Error::RowNotFound)?;

        let display_name = data.display_name.clone().unwrap_or(current.display_name);
        let bio = data.bio.clone().or(current.bio);
        let subjects = match &data.subjects {
            Some(list) => serde_json::to_string(list).unwrap_or_else(|_| "[]".to_string()),
            None => current.subjects,
        };
        let hourly_rate_cents = data.hourly_rate_cents.unwrap_or(current.hourly_rate_cents);
        let class_price_cents = data.class_price_cents.unwrap_or(current.class_price_cents);
        let availability = match &data.availability {
            Some(weekly) => serde_json::to_string(weekly).unwrap_or_else(|_| "{}".to_string()),
            None => current.availability,
        };

        sqlx::query(
            "UPDATE tutor_profiles
             SET display_name = ?, bio = ?, subjects = ?, hourly_rate_cents = ?,
                 class_price_cents = ?, availability = ?
             WHERE user_id = ?",
        )
        .bind(&display_name)
        .bind(&bio)
        .bind(&subjects)
        .bind(hourly_rate_cents)
        .bind(class_price_cents)
        .bind(&availability)
        .bind(id)
        .execute(&self.connection_pool)
        .await?;

        self.read(id).await?.ok_or(Error::RowNotFound)
    }
}
