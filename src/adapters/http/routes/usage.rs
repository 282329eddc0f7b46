use axum::{Json, Router, extract::State, http::HeaderMap, response::IntoResponse, routing::get};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;

use crate::{
    adapters::http::{app_state::AppState, identity::current_user},
    app_error::AppResult,
};

#[derive(Serialize)]
struct ApiLimitResponse {
    count: i64,
    free_limit: i64,
    remaining: i64,
    is_pro: bool,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api-limit", get(api_limit))
}

async fn api_limit(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    cookies: CookieJar,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&headers, &cookies, &app_state)?;
    let summary = app_state
        .entitlement_use_cases
        .usage_summary(&user.id)
        .await?;

    Ok(Json(ApiLimitResponse {
        count: summary.count,
        free_limit: summary.free_limit,
        remaining: summary.remaining(),
        is_pro: summary.is_pro,
    }))
}
