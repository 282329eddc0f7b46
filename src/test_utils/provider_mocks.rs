//! Fake AI and payment providers that record every call.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::{
        ai_provider::{AiProvider, MediaAsset, MediaRequest, PromptSequence},
        payment_provider::{
            CheckoutRequest, CustomerId, PaymentProviderPort, ProviderSubscription,
            RedirectSession, SubscriptionId, WebhookEvent,
        },
    },
    domain::entities::ai_tool::AiTool,
    infra::{stripe_client::StripeClient, stripe_payment_adapter::webhook_event_from_stripe},
    test_utils::TEST_WEBHOOK_SECRET,
};

// ============================================================================
// FakeAiProvider
// ============================================================================

type GenerateHook = Box<dyn Fn() + Send + Sync>;

pub struct FakeAiProvider {
    unsupported: Vec<AiTool>,
    failing: bool,
    on_generate: Option<GenerateHook>,
    text_prompts: Mutex<Vec<PromptSequence>>,
    media_requests: Mutex<Vec<MediaRequest>>,
}

impl FakeAiProvider {
    /// Supports every tool and answers `"fake response"`.
    pub fn new() -> Self {
        Self {
            unsupported: vec![],
            failing: false,
            on_generate: None,
            text_prompts: Mutex::new(vec![]),
            media_requests: Mutex::new(vec![]),
        }
    }

    /// Every generation call fails with a provider error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    pub fn without_tools(mut self, tools: &[AiTool]) -> Self {
        self.unsupported.extend_from_slice(tools);
        self
    }

    /// Run `hook` while a generation call is in flight.
    pub fn on_generate(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_generate = Some(Box::new(hook));
        self
    }

    fn run_hook(&self) {
        if let Some(hook) = &self.on_generate {
            hook();
        }
    }

    pub fn text_prompts(&self) -> Vec<PromptSequence> {
        self.text_prompts.lock().unwrap().clone()
    }

    pub fn media_requests(&self) -> Vec<MediaRequest> {
        self.media_requests.lock().unwrap().clone()
    }
}

impl Default for FakeAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for FakeAiProvider {
    fn supports(&self, tool: AiTool) -> bool {
        !self.unsupported.contains(&tool)
    }

    async fn generate_text(&self, prompt: &PromptSequence) -> AppResult<String> {
        self.text_prompts.lock().unwrap().push(prompt.clone());
        self.run_hook();
        if self.failing {
            return Err(AppError::Provider("model unavailable".into()));
        }
        Ok("fake response".to_string())
    }

    async fn generate_media(&self, request: &MediaRequest) -> AppResult<Vec<MediaAsset>> {
        self.media_requests.lock().unwrap().push(request.clone());
        self.run_hook();
        if self.failing {
            return Err(AppError::Provider("model unavailable".into()));
        }
        let tool = request.kind.tool().as_str();
        Ok((0..request.amount.max(1))
            .map(|i| MediaAsset {
                url: format!("https://media.example.test/{tool}/{i}"),
            })
            .collect())
    }
}

// ============================================================================
// FakePaymentProvider
// ============================================================================

/// Records checkout and portal requests. Webhooks are verified with the real
/// Stripe signature scheme against `TEST_WEBHOOK_SECRET`.
#[derive(Default)]
pub struct FakePaymentProvider {
    subscriptions: Mutex<HashMap<SubscriptionId, ProviderSubscription>>,
    checkouts: Mutex<Vec<CheckoutRequest>>,
    portals: Mutex<Vec<(CustomerId, String)>>,
}

impl FakePaymentProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscription(self, subscription: ProviderSubscription) -> Self {
        self.subscriptions
            .lock()
            .unwrap()
            .insert(subscription.subscription_id.clone(), subscription);
        self
    }

    pub fn checkouts(&self) -> Vec<CheckoutRequest> {
        self.checkouts.lock().unwrap().clone()
    }

    pub fn portals(&self) -> Vec<(CustomerId, String)> {
        self.portals.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentProviderPort for FakePaymentProvider {
    async fn create_checkout(&self, request: &CheckoutRequest) -> AppResult<RedirectSession> {
        let mut checkouts = self.checkouts.lock().unwrap();
        checkouts.push(request.clone());
        Ok(RedirectSession {
            url: format!("https://checkout.stripe.test/c/cs_test_{}", checkouts.len()),
        })
    }

    async fn create_portal_session(
        &self,
        customer: &CustomerId,
        return_url: &str,
    ) -> AppResult<RedirectSession> {
        self.portals
            .lock()
            .unwrap()
            .push((customer.clone(), return_url.to_string()));
        Ok(RedirectSession {
            url: format!("https://billing.stripe.test/portal/{customer}"),
        })
    }

    async fn get_subscription(
        &self,
        subscription_id: &SubscriptionId,
    ) -> AppResult<Option<ProviderSubscription>> {
        Ok(self
            .subscriptions
            .lock()
            .unwrap()
            .get(subscription_id)
            .cloned())
    }

    fn verify_webhook(&self, payload: &str, signature_header: &str) -> AppResult<WebhookEvent> {
        let event = StripeClient::construct_event(payload, signature_header, TEST_WEBHOOK_SECRET)?;
        Ok(webhook_event_from_stripe(event))
    }
}
