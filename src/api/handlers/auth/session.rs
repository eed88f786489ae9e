//! Auth endpoints: register, login, refresh, and session introspection.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{InvalidHeaderValue, SET_COOKIE},
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::error;

use super::principal::{ACCESS_TOKEN_COOKIE, require_auth};
use super::state::AuthState;
use super::tokens::TokenPair;
use super::types::{
    LoginRequest, RefreshRequest, RegisterRequest, SessionResponse, TokenPairResponse,
};
use super::utils::{normalize_email, valid_email};

const MIN_PASSWORD_LENGTH: usize = 8;

#[utoipa::path(
    post,
    path = "/v1/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = TokenPairResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 409, description = "Email already in use", body = String)
    ),
    tag = "auth"
)]
pub async fn register(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RegisterRequest>>,
) -> impl IntoResponse {
    let request: RegisterRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);
    if !valid_email(&email) {
        return (StatusCode::BAD_REQUEST, "Invalid email".to_string()).into_response();
    }
    if request.password.len() < MIN_PASSWORD_LENGTH {
        return (StatusCode::BAD_REQUEST, "Password too short".to_string()).into_response();
    }

    match auth_state.manager().register(&email, &request.password).await {
        Ok(pair) => token_pair_response(&auth_state, pair, StatusCode::CREATED),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = TokenPairResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 401, description = "Unauthorized", body = String)
    ),
    tag = "auth"
)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<LoginRequest>>,
) -> impl IntoResponse {
    let request: LoginRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);

    match auth_state.manager().login(&email, &request.password).await {
        Ok(pair) => token_pair_response(&auth_state, pair, StatusCode::OK),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/v1/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token pair rotated", body = TokenPairResponse),
        (status = 400, description = "Validation error", body = String),
        (status = 401, description = "Unauthorized", body = String)
    ),
    tag = "auth"
)]
pub async fn refresh(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<RefreshRequest>>,
) -> impl IntoResponse {
    let request: RefreshRequest = match payload {
        Some(Json(payload)) => payload,
        None => return (StatusCode::BAD_REQUEST, "Missing payload".to_string()).into_response(),
    };

    let email = normalize_email(&request.email);

    match auth_state
        .manager()
        .refresh(&email, &request.refresh_token)
        .await
    {
        Ok(pair) => token_pair_response(&auth_state, pair, StatusCode::OK),
        Err(err) => err.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/v1/auth/session",
    responses(
        (status = 200, description = "Session is active", body = SessionResponse),
        (status = 401, description = "Unauthorized", body = String)
    ),
    tag = "auth"
)]
pub async fn session(
    headers: HeaderMap,
    auth_state: Extension<Arc<AuthState>>,
) -> impl IntoResponse {
    match require_auth(&headers, auth_state.signer()) {
        Ok(principal) => {
            let response = SessionResponse {
                user_id: principal.user_id.to_string(),
                email: principal.email,
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

/// Serialize a token pair, delivering the access token both in the body and
/// as an `HttpOnly` cookie for clients that prefer cookie transport.
fn token_pair_response(
    auth_state: &AuthState,
    pair: TokenPair,
    status: StatusCode,
) -> axum::response::Response {
    let mut response_headers = HeaderMap::new();
    match access_token_cookie(auth_state, &pair.access_token) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => {
            // The body still carries the token; a malformed cookie only costs
            // cookie transport.
            error!("Failed to build access token cookie: {err}");
        }
    }

    let body = TokenPairResponse::from(pair);
    (status, response_headers, Json(body)).into_response()
}

fn access_token_cookie(
    auth_state: &AuthState,
    token: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = auth_state.config().access_token_ttl_seconds();
    let mut cookie = format!(
        "{ACCESS_TOKEN_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if auth_state.config().secure_cookies() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}
