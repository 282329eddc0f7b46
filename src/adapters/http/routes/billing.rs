use axum::{Json, Router, extract::State, http::HeaderMap, response::IntoResponse, routing::get};
use axum_extra::extract::cookie::CookieJar;

use crate::{
    adapters::http::{app_state::AppState, identity::current_user},
    app_error::AppResult,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/stripe", get(billing_session))
}

/// Returns `{ url }` for either a new checkout or the billing portal.
async fn billing_session(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    cookies: CookieJar,
) -> AppResult<impl IntoResponse> {
    let user = current_user(&headers, &cookies, &app_state)?;
    let session = app_state.billing_use_cases.billing_session(&user).await?;
    Ok(Json(session))
}
