use hmac::{Hmac, Mac};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::payment_provider::PlanPrice,
    infra::http_client,
};

const STRIPE_API_BASE: &str = "https://api.stripe.com/v1";

/// Maximum age of a signed webhook timestamp, in seconds.
pub const WEBHOOK_TOLERANCE_SECS: i64 = 300;

#[derive(Clone)]
pub struct StripeClient {
    client: Client,
    secret_key: SecretString,
    api_base: String,
}

impl StripeClient {
    pub fn new(secret_key: SecretString) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client::build_client()?,
            secret_key,
            api_base: STRIPE_API_BASE.to_string(),
        })
    }

    fn auth_header(&self) -> String {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:", self.secret_key.expose_secret()));
        format!("Basic {}", encoded)
    }

    // ========================================================================
    // Checkout Sessions
    // ========================================================================

    pub async fn create_checkout_session(
        &self,
        params: &CheckoutSessionParams<'_>,
    ) -> AppResult<StripeCheckoutSession> {
        let response = self
            .client
            .post(format!("{}/checkout/sessions", self.api_base))
            .header("Authorization", self.auth_header())
            .form(&params.to_form())
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Stripe request failed: {}", e)))?;

        self.handle_response(response).await
    }

    // ========================================================================
    // Customer Portal
    // ========================================================================

    pub async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> AppResult<StripePortalSession> {
        let params = [("customer", customer_id), ("return_url", return_url)];

        let response = self
            .client
            .post(format!("{}/billing_portal/sessions", self.api_base))
            .header("Authorization", self.auth_header())
            .form(&params)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Stripe request failed: {}", e)))?;

        self.handle_response(response).await
    }

    // ========================================================================
    // Subscriptions
    // ========================================================================

    pub async fn get_subscription(&self, subscription_id: &str) -> AppResult<StripeSubscription> {
        let response = self
            .client
            .get(format!("{}/subscriptions/{}", self.api_base, subscription_id))
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Stripe request failed: {}", e)))?;

        self.handle_response(response).await
    }

    // ========================================================================
    // Webhook Signature Verification
    // ========================================================================

    /// Check a `Stripe-Signature` header (`t=<unix>,v1=<hex>`) against the raw body.
    pub fn verify_webhook_signature(
        payload: &str,
        signature_header: &str,
        webhook_secret: &str,
    ) -> AppResult<()> {
        Self::verify_webhook_signature_at(
            payload,
            signature_header,
            webhook_secret,
            chrono::Utc::now().timestamp(),
        )
    }

    fn verify_webhook_signature_at(
        payload: &str,
        signature_header: &str,
        webhook_secret: &str,
        now: i64,
    ) -> AppResult<()> {
        let mut timestamp: Option<&str> = None;
        let mut signatures: Vec<&str> = Vec::new();

        for part in signature_header.split(',') {
            let Some((key, value)) = part.trim().split_once('=') else {
                continue;
            };
            match key {
                "t" => timestamp = Some(value),
                "v1" => signatures.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp
            .ok_or_else(|| AppError::InvalidSignature("Missing timestamp in signature".into()))?;

        if signatures.is_empty() {
            return Err(AppError::InvalidSignature("Missing signature".into()));
        }

        let expected = compute_signature(timestamp, payload, webhook_secret)?;

        if !signatures
            .iter()
            .any(|sig| constant_time_compare(sig, &expected))
        {
            return Err(AppError::InvalidSignature("Signature mismatch".into()));
        }

        let ts: i64 = timestamp
            .parse()
            .map_err(|_| AppError::InvalidSignature("Invalid timestamp".into()))?;
        if (now - ts).abs() > WEBHOOK_TOLERANCE_SECS {
            return Err(AppError::InvalidSignature(
                "Timestamp outside tolerance".into(),
            ));
        }

        Ok(())
    }

    /// Verify the signature, then parse the event envelope.
    pub fn construct_event(
        payload: &str,
        signature_header: &str,
        webhook_secret: &str,
    ) -> AppResult<StripeWebhookEvent> {
        Self::verify_webhook_signature(payload, signature_header, webhook_secret)?;
        serde_json::from_str(payload)
            .map_err(|e| AppError::InvalidInput(format!("Invalid webhook payload: {}", e)))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> AppResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to read Stripe response: {}", e)))?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::NotFound);
        }

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, "Stripe API error");

            if let Ok(error) = serde_json::from_str::<StripeErrorResponse>(&body) {
                return Err(AppError::Provider(format!(
                    "Stripe error: {}",
                    error.error.message.unwrap_or(error.error.error_type)
                )));
            }

            return Err(AppError::Provider(format!("Stripe API error: {}", status)));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(body = %body, error = %e, "Failed to parse Stripe response");
            AppError::Provider(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

/// Hex HMAC-SHA256 of `"{timestamp}.{payload}"`, the v1 Stripe scheme.
pub fn compute_signature(timestamp: &str, payload: &str, secret: &str) -> AppResult<String> {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .map_err(|_| AppError::Internal("HMAC error".into()))?;
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

// ============================================================================
// Request Params
// ============================================================================

pub struct CheckoutSessionParams<'a> {
    pub price: &'a PlanPrice,
    pub customer_email: Option<&'a str>,
    pub user_id: &'a str,
    pub success_url: &'a str,
    pub cancel_url: &'a str,
}

impl CheckoutSessionParams<'_> {
    /// Form-encoded body for `POST /v1/checkout/sessions`.
    pub fn to_form(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = vec![
            ("mode".into(), "subscription".into()),
            ("success_url".into(), self.success_url.to_string()),
            ("cancel_url".into(), self.cancel_url.to_string()),
            ("payment_method_types[0]".into(), "card".into()),
            ("billing_address_collection".into(), "auto".into()),
            ("line_items[0][quantity]".into(), "1".into()),
            ("metadata[userId]".into(), self.user_id.to_string()),
        ];

        if let Some(email) = self.customer_email {
            params.push(("customer_email".into(), email.to_string()));
        }

        match self.price {
            PlanPrice::Catalog { price_id } => {
                params.push(("line_items[0][price]".into(), price_id.clone()));
            }
            PlanPrice::Inline {
                name,
                description,
                unit_amount_cents,
                currency,
                interval,
            } => {
                let prefix = "line_items[0][price_data]";
                params.push((format!("{prefix}[currency]"), currency.to_lowercase()));
                params.push((format!("{prefix}[product_data][name]"), name.clone()));
                params.push((
                    format!("{prefix}[product_data][description]"),
                    description.clone(),
                ));
                params.push((format!("{prefix}[unit_amount]"), unit_amount_cents.to_string()));
                params.push((format!("{prefix}[recurring][interval]"), interval.clone()));
            }
        }

        params
    }
}

// ============================================================================
// Stripe Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StripePrice {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct StripeCheckoutSession {
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StripePortalSession {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct StripeSubscription {
    pub id: String,
    pub customer: String,
    /// Top-level on API versions before 2025-03; moved onto items afterwards.
    #[serde(default)]
    pub current_period_end: Option<i64>,
    pub items: StripeSubscriptionItems,
}

impl StripeSubscription {
    /// Price of the first subscription item.
    pub fn price_id(&self) -> Option<&str> {
        self.items
            .data
            .first()
            .map(|item| item.price.id.as_str())
            .filter(|id| !id.is_empty())
    }

    pub fn period_end(&self) -> Option<i64> {
        self.current_period_end.or_else(|| {
            self.items
                .data
                .first()
                .and_then(|item| item.current_period_end)
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct StripeSubscriptionItems {
    pub data: Vec<StripeSubscriptionItem>,
}

#[derive(Debug, Deserialize)]
pub struct StripeSubscriptionItem {
    pub price: StripePrice,
    #[serde(default)]
    pub current_period_end: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeError,
}

#[derive(Debug, Deserialize)]
pub struct StripeError {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: Option<String>,
}

// ============================================================================
// Webhook Event Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StripeWebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: StripeWebhookEventData,
}

#[derive(Debug, Deserialize)]
pub struct StripeWebhookEventData {
    pub object: serde_json::Value,
}

impl StripeWebhookEvent {
    pub fn object(&self) -> &serde_json::Value {
        &self.data.object
    }

    /// `metadata.userId` on a checkout session.
    pub fn metadata_user_id(&self) -> Option<&str> {
        self.object()["metadata"]["userId"]
            .as_str()
            .filter(|s| !s.is_empty())
    }

    /// Subscription id on a checkout session, or on an invoice under either
    /// the legacy top-level field or `parent.subscription_details`.
    pub fn subscription_id(&self) -> Option<&str> {
        let object = self.object();
        object["subscription"]
            .as_str()
            .or_else(|| object["parent"]["subscription_details"]["subscription"].as_str())
            .filter(|s| !s.is_empty())
    }
}
