use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::IntoResponse,
    routing::post,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};

use crate::{
    adapters::http::{app_state::AppState, identity::current_user, routes::parse_body},
    app_error::{AppError, AppResult},
    application::use_cases::generation::ImageInput,
};

#[derive(Deserialize, Default)]
struct MessagesPayload {
    #[serde(default)]
    messages: Option<Vec<String>>,
}

#[derive(Deserialize, Default)]
struct PromptPayload {
    #[serde(default)]
    prompt: Option<String>,
}

/// Image forms post the amount either as a number or as a numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Amount {
    Number(u64),
    Text(String),
}

#[derive(Deserialize, Default)]
struct ImagePayload {
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    amount: Option<Amount>,
    #[serde(default)]
    resolution: Option<String>,
}

#[derive(Serialize)]
struct TextResponse {
    response: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/conversation", post(conversation))
        .route("/code", post(code))
        .route("/image", post(image))
        .route("/video", post(video))
        .route("/music", post(music))
}

async fn conversation(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    cookies: CookieJar,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&headers, &cookies, &app_state)?;
    let payload: MessagesPayload = parse_body(&body)?;

    let response = app_state
        .generation_use_cases
        .conversation(&user.id, payload.messages)
        .await?;

    Ok(Json(TextResponse { response }))
}

async fn code(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    cookies: CookieJar,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&headers, &cookies, &app_state)?;
    let payload: MessagesPayload = parse_body(&body)?;

    let response = app_state
        .generation_use_cases
        .code(&user.id, payload.messages)
        .await?;

    Ok(Json(TextResponse { response }))
}

async fn image(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    cookies: CookieJar,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&headers, &cookies, &app_state)?;
    let payload: ImagePayload = parse_body(&body)?;

    let amount = payload.amount.map(parse_amount).transpose()?;
    let assets = app_state
        .generation_use_cases
        .image(
            &user.id,
            ImageInput {
                prompt: payload.prompt,
                amount,
                resolution: payload.resolution,
            },
        )
        .await?;

    Ok(Json(assets))
}

async fn video(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    cookies: CookieJar,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&headers, &cookies, &app_state)?;
    let payload: PromptPayload = parse_body(&body)?;

    let assets = app_state
        .generation_use_cases
        .video(&user.id, payload.prompt)
        .await?;

    Ok(Json(assets))
}

async fn music(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    cookies: CookieJar,
    body: Bytes,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&headers, &cookies, &app_state)?;
    let payload: PromptPayload = parse_body(&body)?;

    let assets = app_state
        .generation_use_cases
        .music(&user.id, payload.prompt)
        .await?;

    Ok(Json(assets))
}

fn parse_amount(amount: Amount) -> AppResult<u8> {
    let invalid = || AppError::InvalidInput("Amount must be a small positive number".into());
    match amount {
        Amount::Number(n) => u8::try_from(n).map_err(|_| invalid()),
        Amount::Text(s) => s.trim().parse::<u8>().map_err(|_| invalid()),
    }
}
