pub mod ai_provider;
pub mod payment_provider;
