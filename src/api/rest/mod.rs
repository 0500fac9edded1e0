pub mod extract;
pub mod handlers;
pub mod types;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::Level;

use crate::api::state::AppState;

use self::handlers::{generate, ip, paste, secret};

/// Room for multipart framing on top of the largest accepted paste.
const BODY_OVERHEAD: usize = 64 * 1024;

fn paste_routes(state: &AppState) -> Router<AppState> {
    let limits = state.pastes.limits();
    let body_limit = limits.max_text_bytes.max(limits.max_file_bytes) + BODY_OVERHEAD;

    Router::new()
        .route("/paste", get(paste::list_public).post(paste::create_private))
        .route("/paste/public", post(paste::create_public))
        .route(
            "/paste/public/:id",
            get(paste::get_public_paste).post(paste::create_public_with_id),
        )
        .route(
            "/paste/:id",
            get(paste::get_paste)
                .post(paste::create_with_id)
                .put(paste::update_paste)
                .delete(paste::delete_paste),
        )
        .layer(DefaultBodyLimit::max(body_limit))
}

fn generate_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/generate",
            get(generate::uuid_v7_query).post(generate::uuid_v7_json),
        )
        .route("/generate/uuid", get(generate::uuid_v7_query))
        .route("/generate/uuid/bulk", get(generate::uuid_v7_bulk))
        .route("/generate/uuid/v4", get(generate::uuid_v4))
        .route("/generate/uuid/v4/bulk", get(generate::uuid_v4_bulk))
        .route("/generate/uuid/v5", get(generate::uuid_v5))
        .route("/generate/uuid/v7", get(generate::uuid_v7_query))
        .route("/generate/uuid/v7/bulk", get(generate::uuid_v7_bulk))
        .route("/generate/number", get(generate::number))
        .route("/generate/number/bulk", get(generate::number_bulk))
        .route("/generate/string", get(generate::string))
        .route("/generate/string/bulk", get(generate::string_bulk))
        .route("/generate/boolean", get(generate::boolean))
        .route("/generate/boolean/bulk", get(generate::boolean_bulk))
        .route("/generate/date", get(generate::date))
        .route("/generate/date/bulk", get(generate::date_bulk))
        .route("/generate/color", get(generate::color))
        .route("/generate/color/bulk", get(generate::color_bulk))
        .route("/generate/bytes", get(generate::bytes))
        .route("/generate/bytes/bulk", get(generate::bytes_bulk))
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .route("/ip", get(ip::ip_text))
        .route("/ip/json", get(ip::ip_json))
        .route(
            "/secret/invalidate",
            get(secret::invalidate_query).post(secret::invalidate_body),
        )
        .merge(paste_routes(&state))
        .merge(generate_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http().make_span_with(|request: &axum::extract::Request| {
            tracing::span!(
                Level::INFO,
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version(),
            )
        }))
        .with_state(state)
}

/// Serves `app` on `addr` until `shutdown` resolves, then drains open
/// connections.
pub async fn start_rest_server<F>(
    addr: SocketAddr,
    app: Router,
    shutdown: F,
) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Starting REST server on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
}
