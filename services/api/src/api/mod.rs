//! HTTP API handlers and routing.

pub mod error;
mod extract;
mod health;
mod request_context;
mod v1;

use std::path::PathBuf;

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::state::AppState;

pub use v1::ParcelResponse;

/// Create the main router with all routes and middleware.
///
/// When `static_dir` is set, requests that match no route are served from
/// that directory.
pub fn create_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_headers(Any)
        .allow_origin(Any);

    let mut router = Router::new()
        // Health endpoints
        .merge(health::routes())
        // API v1 routes
        .nest("/api/v1", v1::routes());

    if let Some(dir) = static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        // Middleware, innermost first
        .layer(middleware::from_fn(answer_options))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        // CorsLayer only sends these on preflights; browsers get them on every response.
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("*"),
        ))
        .layer(cors)
        // Application state
        .with_state(state)
}

/// Answers every OPTIONS request with an empty 200.
///
/// CORS preflights are already handled by the CORS layer; this covers plain
/// OPTIONS requests on any path.
async fn answer_options(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(req).await
}
