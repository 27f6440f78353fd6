use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use serde_json::json;
use std::sync::Arc;

use crate::{
    error::AppResult,
    middleware::{clear_session_cookie, session_cookie, session_token, JsonBody, RequestId},
    models::{LoginRequest, RegisterRequest, RequestContext},
    state::AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/accounts/register", post(register))
        .route("/accounts/login", post(login))
        .route("/accounts/logout", post(logout))
        .route("/accounts/me", get(me))
}

/// Creates the account and signs it in
async fn register(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    JsonBody(request): JsonBody<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let context = state.accounts.register(request).await?;
    let token = state.sessions.create(&context).await?;

    tracing::info!(%request_id, account_id = context.account_id, "Signed in new account");

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session_cookie(&token, state.session_ttl_secs))],
        Json(json!({ "success": true, "account": context, "token": token })),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Extension(request_id): Extension<RequestId>,
    headers: HeaderMap,
    JsonBody(request): JsonBody<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let context = state.accounts.authenticate(request).await?;

    if let Some(previous) = session_token(&headers) {
        state.sessions.remove(previous).await?;
    }
    let token = state.sessions.create(&context).await?;

    tracing::info!(
        %request_id,
        account_id = context.account_id,
        is_admin = context.is_admin,
        "Signed in"
    );

    Ok((
        [(header::SET_COOKIE, session_cookie(&token, state.session_ttl_secs))],
        Json(json!({ "success": true, "account": context, "token": token })),
    ))
}

async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> AppResult<impl IntoResponse> {
    if let Some(token) = session_token(&headers) {
        state.sessions.remove(token).await?;
    }

    Ok((
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(json!({ "success": true })),
    ))
}

async fn me(context: RequestContext) -> Json<RequestContext> {
    Json(context)
}
