use async_trait::async_trait;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::ai_provider::{AiProvider, MediaAsset, MediaRequest, PromptSequence},
    domain::entities::ai_tool::AiTool,
    infra::{gemini_client::GeminiClient, replicate_client::ReplicateClient},
};

/// Routes text tools to Gemini and media tools to Replicate. Either backend
/// may be absent; its tools then report as not configured.
pub struct AiGateway {
    text: Option<GeminiClient>,
    media: Option<ReplicateClient>,
}

impl AiGateway {
    pub fn new(text: Option<GeminiClient>, media: Option<ReplicateClient>) -> Self {
        Self { text, media }
    }
}

#[async_trait]
impl AiProvider for AiGateway {
    fn supports(&self, tool: AiTool) -> bool {
        match tool {
            AiTool::Conversation | AiTool::Code => self.text.is_some(),
            AiTool::Image | AiTool::Video | AiTool::Music => self.media.is_some(),
        }
    }

    async fn generate_text(&self, prompt: &PromptSequence) -> AppResult<String> {
        let client = self
            .text
            .as_ref()
            .ok_or(AppError::ProviderNotConfigured("text generation"))?;
        client.generate_content(prompt).await
    }

    async fn generate_media(&self, request: &MediaRequest) -> AppResult<Vec<MediaAsset>> {
        let client = self
            .media
            .as_ref()
            .ok_or(AppError::ProviderNotConfigured("media generation"))?;
        client.run(request).await
    }
}
