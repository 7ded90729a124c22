//! Notification DTOs - Data Transfer Objects per il relay notifiche

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

lazy_static! {
    // E.164: prefisso + e 8-15 cifre
    static ref PHONE_RE: Regex = Regex::new(r"^\+[0-9]{8,15}$").unwrap();
}

/// DTO per l'invio di una email
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct SendEmailDTO {
    #[validate(email(message = "Invalid recipient address"))]
    pub to: String,

    #[validate(length(min = 1, max = 200, message = "Subject must be 1-200 characters"))]
    pub subject: String,

    #[validate(length(min = 1, max = 10000, message = "Body must be 1-10000 characters"))]
    pub body: String,
}

/// DTO per l'invio di un SMS
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct SendSmsDTO {
    #[validate(regex(path = *PHONE_RE, message = "Recipient must be an E.164 phone number"))]
    pub to: String,

    #[validate(length(min = 1, max = 640, message = "Body must be 1-640 characters"))]
    pub body: String,
}
