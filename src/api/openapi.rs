//! OpenAPI document for the service.

use utoipa::OpenApi;

use crate::api::handlers::auth::types::{
    LoginRequest, RefreshRequest, RegisterRequest, SessionResponse, TokenPairResponse,
};
use crate::api::handlers::health::Health;

#[derive(OpenApi)]
#[openapi(
    info(description = "Authentication session manager"),
    paths(
        crate::api::handlers::root::root,
        crate::api::handlers::health::health,
        crate::api::handlers::auth::session::register,
        crate::api::handlers::auth::session::login,
        crate::api::handlers::auth::session::refresh,
        crate::api::handlers::auth::session::session,
    ),
    components(schemas(
        Health,
        RegisterRequest,
        LoginRequest,
        RefreshRequest,
        TokenPairResponse,
        SessionResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login, and token rotation"),
        (name = "health", description = "Service health"),
        (name = "root", description = "Service banner")
    )
)]
pub struct ApiDoc;
