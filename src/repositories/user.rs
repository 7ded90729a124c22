//! UserRepository - Repository per la gestione degli utenti

use super::{Create, Delete, Read};
use crate::dtos::CreateUserDTO;
use crate::entities::User;
use chrono::Utc;
use sqlx::{Error, SqlitePool};

// USER REPO
pub struct UserRepository {
    connection_pool: SqlitePool,
}

impl UserRepository {
    pub fn new(connection_pool: SqlitePool) -> UserRepository {
        Self { connection_pool }
    }

    /// considero l'username univoco
    /// Find user by exact username match
    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, username, email, password, role, created_at
             FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, username, email, password, role, created_at
             FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }
}

impl Create<User, CreateUserDTO> for UserRepository {
    async fn create(&self, data: &CreateUserDTO) -> Result<User, Error> {
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO users (username, email, password, role, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(&data.password)
        .bind(data.role)
        .bind(created_at)
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_rowid();

        Ok(User {
            user_id: new_id,
            username: data.username.clone(),
            email: data.email.clone(),
            password: data.password.clone(),
            role: data.role,
            created_at,
        })
    }
}

impl Read<User, i64> for UserRepository {
    async fn read(&self, id: &i64) -> Result<Option<User>, Error> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, username, email, password, role, created_at
             FROM users WHERE user_id = ?",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }
}

impl Delete<i64> for UserRepository {
    /// Soft delete: anonimizza l'utente preservando lo storico di
    /// sessioni e messaggi che lo referenziano
    async fn delete(&self, user_id: &i64) -> Result<(), Error> {
        sqlx::query(
            "UPDATE users SET username = 'Deleted User ' || user_id, email = '', password = ''
             WHERE user_id = ?",
        )
        .bind(user_id)
        .execute(&self.connection_pool)
        .await?;

        Ok(())
    }
}
