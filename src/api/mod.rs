pub mod error;
pub mod wave;

use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
    BoxError, Router,
};
use std::time::Duration;
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use error::ApiError;

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub fn router(state: AppState) -> Router {
    let body_limit = state.cfg.server.body_limit_bytes;
    let timeout = Duration::from_secs(state.cfg.server.request_timeout_secs);

    let routes = Router::new()
        .route("/", get(index))
        .route("/wave", post(wave::wave))
        .route("/get_count", get(wave::get_count))
        .route("/visits", get(wave::recent_visits))
        .route("/healthz", get(healthz))
        .with_state(state);

    with_limits(routes, body_limit, timeout).layer(TraceLayer::new_for_http())
}

fn with_limits(routes: Router, body_limit: usize, timeout: Duration) -> Router {
    routes.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(middleware_error))
            .layer(TimeoutLayer::new(timeout))
            .layer(DefaultBodyLimit::max(body_limit)),
    )
}

async fn middleware_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Middleware(err.to_string())
    }
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
