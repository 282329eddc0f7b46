use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{
    app_error::AppResult,
    domain::entities::ai_tool::{AiTool, ImageResolution, MediaKind},
};

/// Ordered text parts sent to the model as a single user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSequence {
    pub parts: Vec<String>,
}

impl PromptSequence {
    pub fn new(parts: Vec<String>) -> Self {
        Self { parts }
    }
}

#[derive(Debug, Clone)]
pub struct MediaRequest {
    pub kind: MediaKind,
    pub prompt: String,
    pub amount: u8,
    pub resolution: ImageResolution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAsset {
    pub url: String,
}

#[async_trait]
pub trait AiProvider: Send + Sync {
    /// Whether a backend for `tool` is configured.
    fn supports(&self, tool: AiTool) -> bool;

    async fn generate_text(&self, prompt: &PromptSequence) -> AppResult<String>;

    async fn generate_media(&self, request: &MediaRequest) -> AppResult<Vec<MediaAsset>>;
}
