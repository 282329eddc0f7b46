use std::sync::Arc;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::ai_provider::{AiProvider, MediaAsset, MediaRequest, PromptSequence},
    domain::entities::{
        ai_tool::{AiTool, CODE_INSTRUCTION, ImageResolution, MAX_IMAGE_AMOUNT, MediaKind},
        user::UserId,
    },
};

use super::entitlement::EntitlementUseCases;

/// Image request as received, before defaults and validation.
#[derive(Debug, Clone, Default)]
pub struct ImageInput {
    pub prompt: Option<String>,
    pub amount: Option<u8>,
    pub resolution: Option<String>,
}

/// Runs the five dashboard tools.
///
/// Every call follows the same order: provider configured, input valid,
/// entitlement granted, provider call, then metering on success.
pub struct GenerationUseCases {
    ai: Arc<dyn AiProvider>,
    entitlement: Arc<EntitlementUseCases>,
}

impl GenerationUseCases {
    pub fn new(ai: Arc<dyn AiProvider>, entitlement: Arc<EntitlementUseCases>) -> Self {
        Self { ai, entitlement }
    }

    pub async fn conversation(
        &self,
        user_id: &UserId,
        messages: Option<Vec<String>>,
    ) -> AppResult<String> {
        self.ensure_supported(AiTool::Conversation)?;
        let prompt = last_message(messages)?;
        self.entitlement.check(user_id).await?;

        let response = self
            .ai
            .generate_text(&PromptSequence::new(vec![prompt]))
            .await?;

        self.record_success(user_id, AiTool::Conversation).await;
        Ok(response)
    }

    pub async fn code(&self, user_id: &UserId, messages: Option<Vec<String>>) -> AppResult<String> {
        self.ensure_supported(AiTool::Code)?;
        let prompt = last_message(messages)?;
        self.entitlement.check(user_id).await?;

        let response = self
            .ai
            .generate_text(&PromptSequence::new(vec![
                CODE_INSTRUCTION.to_string(),
                prompt,
            ]))
            .await?;

        self.record_success(user_id, AiTool::Code).await;
        Ok(response)
    }

    pub async fn image(&self, user_id: &UserId, input: ImageInput) -> AppResult<Vec<MediaAsset>> {
        self.ensure_supported(AiTool::Image)?;

        let prompt = required_prompt(input.prompt)?;
        let amount = input.amount.unwrap_or(1);
        if amount == 0 || amount > MAX_IMAGE_AMOUNT {
            return Err(AppError::InvalidInput(format!(
                "Amount must be between 1 and {MAX_IMAGE_AMOUNT}"
            )));
        }
        let resolution = match input.resolution.as_deref() {
            None => ImageResolution::default(),
            Some(raw) => ImageResolution::parse(raw)
                .ok_or_else(|| AppError::InvalidInput(format!("Unsupported resolution: {raw}")))?,
        };

        self.media(
            user_id,
            MediaRequest {
                kind: MediaKind::Image,
                prompt,
                amount,
                resolution,
            },
        )
        .await
    }

    pub async fn video(&self, user_id: &UserId, prompt: Option<String>) -> AppResult<Vec<MediaAsset>> {
        self.ensure_supported(AiTool::Video)?;
        let prompt = required_prompt(prompt)?;
        self.media(user_id, single_media(MediaKind::Video, prompt)).await
    }

    pub async fn music(&self, user_id: &UserId, prompt: Option<String>) -> AppResult<Vec<MediaAsset>> {
        self.ensure_supported(AiTool::Music)?;
        let prompt = required_prompt(prompt)?;
        self.media(user_id, single_media(MediaKind::Music, prompt)).await
    }

    async fn media(&self, user_id: &UserId, request: MediaRequest) -> AppResult<Vec<MediaAsset>> {
        self.entitlement.check(user_id).await?;

        let assets = self.ai.generate_media(&request).await?;

        self.record_success(user_id, request.kind.tool()).await;
        Ok(assets)
    }

    fn ensure_supported(&self, tool: AiTool) -> AppResult<()> {
        if self.ai.supports(tool) {
            Ok(())
        } else {
            Err(AppError::ProviderNotConfigured(tool.as_str()))
        }
    }

    /// A failed increment leaves the user one extra free use; the generated
    /// response is still returned.
    async fn record_success(&self, user_id: &UserId, tool: AiTool) {
        match self.entitlement.record_success(user_id).await {
            Ok(Some(count)) => {
                tracing::debug!(user_id = %user_id, tool = tool.as_str(), count, "Recorded free use");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(
                    error = %e,
                    user_id = %user_id,
                    tool = tool.as_str(),
                    usage_drift = true,
                    "Failed to record usage after successful generation"
                );
            }
        }
    }
}

fn last_message(messages: Option<Vec<String>>) -> AppResult<String> {
    match messages.and_then(|mut m| m.pop()) {
        Some(last) if !last.trim().is_empty() => Ok(last),
        _ => Err(AppError::InvalidInput("Messages are required".into())),
    }
}

fn required_prompt(prompt: Option<String>) -> AppResult<String> {
    match prompt {
        Some(p) if !p.trim().is_empty() => Ok(p),
        _ => Err(AppError::InvalidInput("Prompt is required".into())),
    }
}

fn single_media(kind: MediaKind, prompt: String) -> MediaRequest {
    MediaRequest {
        kind,
        prompt,
        amount: 1,
        resolution: ImageResolution::default(),
    }
}
