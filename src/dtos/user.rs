//! User DTOs - Data Transfer Objects per utenti

use crate::entities::{User, UserRole};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[a-zA-Z0-9_.]{3,32}$").unwrap();
}

// struct per gestire io col client
#[derive(Serialize, Deserialize, Debug)]
pub struct UserDTO {
    pub id: Option<i64>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

impl From<User> for UserDTO {
    fn from(value: User) -> Self {
        Self {
            id: Some(value.user_id),
            username: Some(value.username),
            email: Some(value.email),
            role: Some(value.role),
            password: None, // mai esposta al client!!!
        }
    }
}

/// DTO di registrazione: crea lo user e il profilo di ruolo in un colpo solo
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct RegisterUserDTO {
    #[validate(regex(
        path = *USERNAME_RE,
        message = "Username must be 3-32 chars: letters, digits, underscore, dot"
    ))]
    pub username: String,

    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    pub role: UserRole,

    #[validate(length(min = 1, max = 64, message = "Display name must be 1-64 characters"))]
    pub display_name: String,
}

/// DTO interno per l'insert (password già hashata)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateUserDTO {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}
