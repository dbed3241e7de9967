use std::path::Path;

use axum::Router;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

pub mod cli;

pub mod db;

mod payload;
pub use payload::*;

mod state;
pub use state::*;

pub mod routes;

/// The full application: the json api, with anything else served from
/// `assets_dir`
pub fn app(state: AppState, assets_dir: &Path, cors: CorsLayer) -> Router {
    Router::new()
        .merge(routes::router())
        .fallback_service(ServeDir::new(assets_dir))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
