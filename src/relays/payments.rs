//! PaymentClient - Relay verso il processore pagamenti e Stripe Connect
//!
//! Due provider distinti dietro lo stesso client: gli ordini passano dal
//! processore checkout (flusso create/capture in due passi), l'onboarding
//! dei tutor passa da Stripe Connect (account Express + account link).

use crate::core::{AppError, Config};
use serde::Deserialize;
use tracing::{info, instrument, warn};

#[derive(Clone)]
pub struct PaymentClient {
    http: reqwest::Client,
    api_base: String,
    client_id: String,
    client_secret: String,
    stripe_api_base: String,
    stripe_secret_key: String,
    connect_refresh_url: String,
    connect_return_url: String,
}

/// Ordine come lo racconta il provider
#[derive(Debug, Clone)]
pub struct ProviderOrder {
    pub order_id: String,
    pub status: String,
    pub approve_url: Option<String>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct OrderResponse {
    id: String,
    status: String,
    #[serde(default)]
    links: Vec<OrderLink>,
}

#[derive(Deserialize)]
struct OrderLink {
    rel: String,
    href: String,
}

#[derive(Deserialize)]
struct StripeAccountResponse {
    id: String,
}

#[derive(Deserialize)]
struct StripeAccountLinkResponse {
    url: String,
}

impl PaymentClient {
    pub fn from_config(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.payment_api_base.clone(),
            client_id: config.payment_client_id.clone(),
            client_secret: config.payment_client_secret.clone(),
            stripe_api_base: config.stripe_api_base.clone(),
            stripe_secret_key: config.stripe_secret_key.clone(),
            connect_refresh_url: config.connect_refresh_url.clone(),
            connect_return_url: config.connect_return_url.clone(),
        }
    }

    pub fn orders_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    pub fn connect_configured(&self) -> bool {
        !self.stripe_secret_key.is_empty()
    }

    /// Centesimi -> stringa decimale che il provider si aspetta ("30.00")
    pub fn format_amount(cents: i64) -> String {
        format!("{}.{:02}", cents / 100, cents % 100)
    }

    async fn access_token(&self) -> Result<String, AppError> {
        let response = self
            .http
            .post(format!("{}/v1/oauth2/token", self.api_base))
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            warn!(status = %response.status(), "Payment provider token request rejected");
            return Err(AppError::bad_gateway("Payment provider rejected credentials"));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Crea un ordine per la sessione: l'importo arriva SEMPRE dalla riga
    /// di database riletta dal service, mai dal client
    #[instrument(skip(self), fields(session_id = %session_id, amount_cents = %amount_cents))]
    pub async fn create_order(
        &self,
        session_id: i64,
        amount_cents: i64,
        currency: &str,
    ) -> Result<ProviderOrder, AppError> {
        if !self.orders_configured() {
            return Err(AppError::service_unavailable("Payment provider not configured"));
        }

        let token = self.access_token().await?;

        let body = serde_json::json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "reference_id": session_id.to_string(),
                "amount": {
                    "currency_code": currency,
                    "value": Self::format_amount(amount_cents),
                }
            }]
        });

        let response = self
            .http
            .post(format!("{}/v2/checkout/orders", self.api_base))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let details = response.text().await.unwrap_or_default();
            warn!(%status, "Order creation rejected by payment provider");
            return Err(AppError::bad_gateway("Order creation failed").with_details(details));
        }

        let order: OrderResponse = response.json().await?;
        info!(order_id = %order.id, "Payment order created");

        let approve_url = order
            .links
            .into_iter()
            .find(|l| l.rel == "approve")
            .map(|l| l.href);

        Ok(ProviderOrder {
            order_id: order.id,
            status: order.status,
            approve_url,
        })
    }

    /// Capture di un ordine approvato dal pagatore
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn capture_order(&self, order_id: &str) -> Result<ProviderOrder, AppError> {
        if !self.orders_configured() {
            return Err(AppError::service_unavailable("Payment provider not configured"));
        }

        let token = self.access_token().await?;

        let response = self
            .http
            .post(format!(
                "{}/v2/checkout/orders/{}/capture",
                self.api_base, order_id
            ))
            .bearer_auth(&token)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let details = response.text().await.unwrap_or_default();
            warn!(%status, "Order capture rejected by payment provider");
            return Err(AppError::bad_gateway("Order capture failed").with_details(details));
        }

        let order: OrderResponse = response.json().await?;
        info!(order_id = %order.id, status = %order.status, "Payment order captured");

        Ok(ProviderOrder {
            order_id: order.id,
            status: order.status,
            approve_url: None,
        })
    }

    /// Crea (se serve) l'account Connect Express del tutor
    #[instrument(skip(self))]
    pub async fn create_connect_account(&self, email: &str) -> Result<String, AppError> {
        if !self.connect_configured() {
            return Err(AppError::service_unavailable("Stripe Connect not configured"));
        }

        let response = self
            .http
            .post(format!("{}/v1/accounts", self.stripe_api_base))
            .bearer_auth(&self.stripe_secret_key)
            .form(&[("type", "express"), ("email", email)])
            .send()
            .await?;

        if !response.status().is_success() {
            let details = response.text().await.unwrap_or_default();
            warn!("Connect account creation rejected");
            return Err(AppError::bad_gateway("Connect account creation failed").with_details(details));
        }

        let account: StripeAccountResponse = response.json().await?;
        info!(account_id = %account.id, "Connect account created");
        Ok(account.id)
    }

    /// Link di onboarding monouso per completare l'attivazione dell'account
    #[instrument(skip(self), fields(account_id = %account_id))]
    pub async fn create_onboarding_link(&self, account_id: &str) -> Result<String, AppError> {
        if !self.connect_configured() {
            return Err(AppError::service_unavailable("Stripe Connect not configured"));
        }

        let response = self
            .http
            .post(format!("{}/v1/account_links", self.stripe_api_base))
            .bearer_auth(&self.stripe_secret_key)
            .form(&[
                ("account", account_id),
                ("refresh_url", self.connect_refresh_url.as_str()),
                ("return_url", self.connect_return_url.as_str()),
                ("type", "account_onboarding"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let details = response.text().await.unwrap_or_default();
            warn!("Onboarding link creation rejected");
            return Err(AppError::bad_gateway("Onboarding link creation failed").with_details(details));
        }

        let link: StripeAccountLinkResponse = response.json().await?;
        Ok(link.url)
    }
}
