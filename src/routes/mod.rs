pub mod feedback;
pub mod stats;

use std::{sync::Arc, time::Duration};

use axum::{
    http::{header::CONTENT_TYPE, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, axum::http::header::CACHE_CONTROL])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/feedback", post(feedback::submit).get(feedback::list))
        .route("/feedback/clear", post(feedback::clear))
        .route("/stats", get(stats::stats))
        .layer(cors)
        .with_state(state)
}
