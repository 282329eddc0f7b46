pub mod billing;
pub mod billing_webhook;
pub mod entitlement;
pub mod generation;
pub mod subscription;
pub mod usage;
