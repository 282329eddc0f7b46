use std::future::Future;
use std::time::Duration;

use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::{
    app_error::{AppError, AppResult},
    application::ports::ai_provider::{MediaAsset, MediaRequest},
    domain::entities::ai_tool::MediaKind,
    infra::http_client,
};

const REPLICATE_API_BASE: &str = "https://api.replicate.com/v1";

/// Delay between status checks once `Prefer: wait` has returned early.
const POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Model slug (`owner/name`) used for each media tool.
#[derive(Debug, Clone)]
pub struct ReplicateModels {
    pub image: String,
    pub video: String,
    pub music: String,
}

impl ReplicateModels {
    fn for_kind(&self, kind: MediaKind) -> &str {
        match kind {
            MediaKind::Image => &self.image,
            MediaKind::Video => &self.video,
            MediaKind::Music => &self.music,
        }
    }
}

/// Image, video and music generation through Replicate predictions.
///
/// Uses the synchronous `Prefer: wait` mode, so a single request returns the
/// finished output URLs.
#[derive(Clone)]
pub struct ReplicateClient {
    client: Client,
    api_token: SecretString,
    models: ReplicateModels,
}

impl ReplicateClient {
    pub fn new(api_token: SecretString, models: ReplicateModels) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: http_client::build_client_with_timeout(http_client::MEDIA_REQUEST_TIMEOUT)?,
            api_token,
            models,
        })
    }

    /// Create a prediction and wait for it to finish. `Prefer: wait` covers
    /// most image runs; slower models are polled on `urls.get` until they reach
    /// a terminal status or `MEDIA_REQUEST_TIMEOUT` elapses.
    pub async fn run(&self, request: &MediaRequest) -> AppResult<Vec<MediaAsset>> {
        let deadline = Instant::now() + http_client::MEDIA_REQUEST_TIMEOUT;
        let model = self.models.for_kind(request.kind);

        let response = self
            .client
            .post(format!("{}/models/{}/predictions", REPLICATE_API_BASE, model))
            .bearer_auth(self.api_token.expose_secret())
            .header("Prefer", "wait")
            .json(&PredictionRequest::from_media(request))
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Replicate request failed: {}", e)))?;
        let created: Prediction = self.handle_response(response, model).await?;

        let prediction = poll_until_done(created, deadline, POLL_INTERVAL, |url| {
            self.get_prediction(url, model)
        })
        .await?;

        if !prediction.is_terminal() {
            tracing::warn!(
                prediction_id = %prediction.id,
                status = %prediction.status,
                model,
                "Replicate prediction timed out, cancelling"
            );
            self.cancel(&prediction).await;
        }

        prediction.into_assets()
    }

    async fn get_prediction(&self, url: String, model: &str) -> AppResult<Prediction> {
        let response = self
            .client
            .get(url)
            .bearer_auth(self.api_token.expose_secret())
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Replicate poll failed: {}", e)))?;
        self.handle_response(response, model).await
    }

    async fn cancel(&self, prediction: &Prediction) {
        let Some(url) = prediction.urls.as_ref().and_then(|u| u.cancel.as_deref()) else {
            return;
        };
        let result = self
            .client
            .post(url)
            .bearer_auth(self.api_token.expose_secret())
            .send()
            .await;
        if let Err(e) = result {
            tracing::warn!(error = %e, prediction_id = %prediction.id, "Failed to cancel prediction");
        }
    }

    async fn handle_response(
        &self,
        response: reqwest::Response,
        model: &str,
    ) -> AppResult<Prediction> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to read Replicate response: {}", e)))?;

        if !status.is_success() {
            tracing::error!(status = %status, body = %body, model, "Replicate API error");
            return Err(AppError::Provider(format!("Replicate API error: {}", status)));
        }

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, model, "Failed to parse Replicate response");
            AppError::Provider(format!("Failed to parse Replicate response: {}", e))
        })
    }
}

/// Re-fetch `prediction` until it is terminal or `deadline` passes. Returns
/// the last observed state either way.
async fn poll_until_done<F, Fut>(
    mut prediction: Prediction,
    deadline: Instant,
    interval: Duration,
    mut fetch: F,
) -> AppResult<Prediction>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = AppResult<Prediction>>,
{
    while !prediction.is_terminal() && Instant::now() + interval < deadline {
        let Some(url) = prediction.urls.as_ref().and_then(|u| u.get.clone()) else {
            break;
        };
        tokio::time::sleep(interval).await;
        prediction = fetch(url).await?;
    }
    Ok(prediction)
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct PredictionRequest {
    pub input: serde_json::Value,
}

impl PredictionRequest {
    pub fn from_media(request: &MediaRequest) -> Self {
        let input = match request.kind {
            MediaKind::Image => {
                let px = request.resolution.pixels();
                serde_json::json!({
                    "prompt": request.prompt,
                    "num_outputs": request.amount,
                    "width": px,
                    "height": px,
                })
            }
            MediaKind::Video | MediaKind::Music => serde_json::json!({ "prompt": request.prompt }),
        };
        Self { input }
    }
}

#[derive(Debug, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub output: serde_json::Value,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub urls: Option<PredictionUrls>,
}

#[derive(Debug, Deserialize)]
pub struct PredictionUrls {
    #[serde(default)]
    pub get: Option<String>,
    #[serde(default)]
    pub cancel: Option<String>,
}

impl Prediction {
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "succeeded" | "failed" | "canceled")
    }

    /// Output is a single URL or a list of URLs depending on the model.
    pub fn into_assets(self) -> AppResult<Vec<MediaAsset>> {
        if self.status != "succeeded" {
            tracing::error!(
                prediction_id = %self.id,
                status = %self.status,
                error = ?self.error,
                "Replicate prediction did not succeed"
            );
            return Err(AppError::Provider(format!(
                "Prediction {} ended with status {}",
                self.id, self.status
            )));
        }

        let urls: Vec<String> = match self.output {
            serde_json::Value::String(url) => vec![url],
            serde_json::Value::Array(items) => items
                .into_iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };

        if urls.is_empty() {
            return Err(AppError::Provider(format!(
                "Prediction {} returned no output",
                self.id
            )));
        }

        Ok(urls.into_iter().map(|url| MediaAsset { url }).collect())
    }
}
