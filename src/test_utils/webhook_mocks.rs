//! Signed Stripe-style webhook fixtures.

use chrono::Utc;
use serde_json::json;

use crate::infra::stripe_client::compute_signature;

pub const TEST_WEBHOOK_SECRET: &str = "whsec_test_secret";

/// Build a `Stripe-Signature` header for `payload`, timestamped now.
pub fn sign_webhook_payload(payload: &str, secret: &str) -> String {
    let timestamp = Utc::now().timestamp().to_string();
    let signature = compute_signature(&timestamp, payload, secret).unwrap();
    format!("t={timestamp},v1={signature}")
}

pub fn checkout_completed_payload(
    event_id: &str,
    user_id: Option<&str>,
    subscription_id: Option<&str>,
) -> String {
    let mut metadata = serde_json::Map::new();
    if let Some(user_id) = user_id {
        metadata.insert("userId".to_string(), json!(user_id));
    }

    json!({
        "id": event_id,
        "object": "event",
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "id": "cs_test_123",
                "object": "checkout.session",
                "mode": "subscription",
                "customer": "cus_test123",
                "subscription": subscription_id,
                "metadata": metadata,
            }
        }
    })
    .to_string()
}

pub fn invoice_paid_payload(event_id: &str, subscription_id: Option<&str>) -> String {
    json!({
        "id": event_id,
        "object": "event",
        "type": "invoice.payment_succeeded",
        "data": {
            "object": {
                "id": "in_test_123",
                "object": "invoice",
                "customer": "cus_test123",
                "subscription": subscription_id,
            }
        }
    })
    .to_string()
}
