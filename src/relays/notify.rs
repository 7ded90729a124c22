//! NotifyClient - Relay verso i provider email e SMS
//!
//! Le notifiche partono "fire and forget": i service fanno tokio::spawn
//! sull'invio e non aspettano l'esito. Un invio fallito finisce nei log
//! e da nessun'altra parte.

use crate::core::{AppError, Config};
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct NotifyClient {
    http: reqwest::Client,
    email_api_base: String,
    email_api_key: String,
    email_from: String,
    sms_api_base: String,
    sms_account_sid: String,
    sms_auth_token: String,
    sms_from: String,
}

impl NotifyClient {
    pub fn from_config(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            email_api_base: config.email_api_base.clone(),
            email_api_key: config.email_api_key.clone(),
            email_from: config.email_from.clone(),
            sms_api_base: config.sms_api_base.clone(),
            sms_account_sid: config.sms_account_sid.clone(),
            sms_auth_token: config.sms_auth_token.clone(),
            sms_from: config.sms_from.clone(),
        }
    }

    pub fn email_configured(&self) -> bool {
        !self.email_api_key.is_empty()
    }

    pub fn sms_configured(&self) -> bool {
        !self.sms_account_sid.is_empty() && !self.sms_auth_token.is_empty()
    }

    #[instrument(skip(self, body), fields(to = %to))]
    pub async fn send_email(&self, to: &str, subject: &str, body: &str) -> Result<(), AppError> {
        if !self.email_configured() {
            return Err(AppError::service_unavailable("Email provider not configured"));
        }

        let payload = serde_json::json!({
            "from": self.email_from,
            "to": [to],
            "subject": subject,
            "text": body,
        });

        let response = self
            .http
            .post(format!("{}/emails", self.email_api_base))
            .bearer_auth(&self.email_api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let details = response.text().await.unwrap_or_default();
            warn!(%status, "Email provider rejected the message");
            return Err(AppError::bad_gateway("Email send failed").with_details(details));
        }

        info!("Email relayed to provider");
        Ok(())
    }

    #[instrument(skip(self, body), fields(to = %to))]
    pub async fn send_sms(&self, to: &str, body: &str) -> Result<(), AppError> {
        if !self.sms_configured() {
            return Err(AppError::service_unavailable("SMS provider not configured"));
        }

        let response = self
            .http
            .post(format!(
                "{}/2010-04-01/Accounts/{}/Messages.json",
                self.sms_api_base, self.sms_account_sid
            ))
            .basic_auth(&self.sms_account_sid, Some(&self.sms_auth_token))
            .form(&[
                ("To", to),
                ("From", self.sms_from.as_str()),
                ("Body", body),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let details = response.text().await.unwrap_or_default();
            warn!(%status, "SMS provider rejected the message");
            return Err(AppError::bad_gateway("SMS send failed").with_details(details));
        }

        info!("SMS relayed to provider");
        Ok(())
    }

    /// Invio email sganciato dal ciclo richiesta/risposta: l'errore viene
    /// solo loggato, la notifica persa resta persa
    pub fn spawn_email(&self, to: String, subject: String, body: String) {
        if !self.email_configured() {
            return; // niente provider, niente notifica
        }
        let client = self.clone();
        tokio::spawn(async move {
            if let Err(e) = client.send_email(&to, &subject, &body).await {
                warn!(status = %e.status(), "Detached email notification dropped");
            }
        });
    }

    /// Come spawn_email, per gli SMS
    pub fn spawn_sms(&self, to: String, body: String) {
        if !self.sms_configured() {
            return;
        }
        let client = self.clone();
        tokio::spawn(async move {
            if let Err(e) = client.send_sms(&to, &body).await {
                warn!(status = %e.status(), "Detached SMS notification dropped");
            }
        });
    }
}
