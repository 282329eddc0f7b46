//! Test utilities for use case and HTTP testing.
//!
//! This module provides:
//! - Test data factories for creating valid test fixtures
//! - In-memory repository implementations for mocking persistence
//! - Fake AI and payment providers that record what they were asked to do
//! - Signed webhook fixtures and a builder for a fully wired `AppState`

mod app_state_builder;
mod factories;
mod provider_mocks;
mod subscription_mocks;
mod usage_mocks;
mod webhook_mocks;

pub use app_state_builder::*;
pub use factories::*;
pub use provider_mocks::*;
pub use subscription_mocks::*;
pub use usage_mocks::*;
pub use webhook_mocks::*;
