//! Test app state builder for HTTP-level integration testing.
//!
//! This module provides `TestAppStateBuilder` which creates a complete `AppState`
//! with in-memory repositories and fake providers for testing HTTP endpoints.

use std::sync::Arc;

use crate::{
    adapters::http::app_state::AppState,
    application::use_cases::{
        billing::BillingUseCases,
        billing_webhook::BillingWebhookUseCases,
        entitlement::EntitlementUseCases,
        generation::GenerationUseCases,
        subscription::{SubscriptionPolicy, SubscriptionUseCases},
    },
    application::ports::payment_provider::{PaymentProviderPort, ProviderSubscription},
    domain::entities::{subscription_record::SubscriptionRecord, user::UserId},
    test_utils::{
        FakeAiProvider, FakePaymentProvider, InMemorySubscriptionRepo, InMemoryUsageRepo,
        test_config,
    },
};

/// Handles to the doubles behind an `AppState`, for assertions.
pub struct TestMocks {
    pub usage: Arc<InMemoryUsageRepo>,
    pub subscriptions: Arc<InMemorySubscriptionRepo>,
    pub ai: Arc<FakeAiProvider>,
    pub payments: Arc<FakePaymentProvider>,
}

// ============================================================================
// TestAppStateBuilder
// ============================================================================

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let user = UserId::new("user_1");
///
/// let app_state = TestAppStateBuilder::new()
///     .with_usage(user.clone(), 5)
///     .with_subscription(create_test_subscription(&user, |_| {}))
///     .build();
/// ```
pub struct TestAppStateBuilder {
    usage_counts: Vec<(UserId, i64)>,
    subscriptions: Vec<SubscriptionRecord>,
    provider_subscriptions: Vec<ProviderSubscription>,
    ai_provider: Option<FakeAiProvider>,
    payment_configured: bool,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            usage_counts: vec![],
            subscriptions: vec![],
            provider_subscriptions: vec![],
            ai_provider: None,
            payment_configured: true,
        }
    }

    /// Seed a free-tier counter.
    pub fn with_usage(mut self, user_id: UserId, count: i64) -> Self {
        self.usage_counts.push((user_id, count));
        self
    }

    /// Seed a local subscription record.
    pub fn with_subscription(mut self, record: SubscriptionRecord) -> Self {
        self.subscriptions.push(record);
        self
    }

    /// Make a subscription known to the fake payment provider.
    pub fn with_provider_subscription(mut self, subscription: ProviderSubscription) -> Self {
        self.provider_subscriptions.push(subscription);
        self
    }

    pub fn with_ai_provider(mut self, provider: FakeAiProvider) -> Self {
        self.ai_provider = Some(provider);
        self
    }

    /// Build without a payment provider, as when Stripe keys are absent.
    pub fn without_payment_provider(mut self) -> Self {
        self.payment_configured = false;
        self
    }

    pub fn build(self) -> AppState {
        self.build_with_mocks().0
    }

    /// Build the AppState and hand back the mocks behind it.
    pub fn build_with_mocks(self) -> (AppState, TestMocks) {
        let config = test_config();

        let usage = Arc::new(InMemoryUsageRepo::with_counts(self.usage_counts));
        let subscriptions = Arc::new(InMemorySubscriptionRepo::with_records(self.subscriptions));
        let ai = Arc::new(self.ai_provider.unwrap_or_default());
        let payments = Arc::new(
            self.provider_subscriptions
                .into_iter()
                .fold(FakePaymentProvider::new(), |p, s| p.with_subscription(s)),
        );

        let payment_provider = if self.payment_configured {
            Some(payments.clone() as Arc<dyn PaymentProviderPort>)
        } else {
            None
        };

        let subscription_use_cases = Arc::new(SubscriptionUseCases::new(
            subscriptions.clone(),
            SubscriptionPolicy {
                grace: config.subscription_grace,
                paid_price_id: config.pro_plan.price_id.clone(),
            },
        ));

        let entitlement_use_cases = Arc::new(EntitlementUseCases::new(
            usage.clone(),
            subscription_use_cases,
            config.free_limit,
        ));

        let generation_use_cases = Arc::new(GenerationUseCases::new(
            ai.clone(),
            entitlement_use_cases.clone(),
        ));

        let billing_use_cases = Arc::new(BillingUseCases::new(
            subscriptions.clone(),
            payment_provider.clone(),
            config.pro_plan.plan_price(),
            config.settings_url(),
        ));

        let billing_webhook_use_cases = Arc::new(BillingWebhookUseCases::new(
            subscriptions.clone(),
            payment_provider,
        ));

        let app_state = AppState {
            config: Arc::new(config),
            entitlement_use_cases,
            generation_use_cases,
            billing_use_cases,
            billing_webhook_use_cases,
        };

        let mocks = TestMocks {
            usage,
            subscriptions,
            ai,
            payments,
        };

        (app_state, mocks)
    }
}

impl Default for TestAppStateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
