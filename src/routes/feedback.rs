use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use log::info;
use serde::Deserialize;
use serde_json::json;

use crate::{error::AppError, ingest, AppState};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub date: Option<String>,
}

pub async fn submit(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let input = ingest::parse_submission(&body)?;
    let source = input.source.clone();
    let id = state.store.insert(input).await?;

    info!("Stored feedback {id} from {source}");

    Ok((StatusCode::CREATED, Json(json!({ "success": true, "id": id }))))
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let events = match ingest::day_filter(query.date.as_deref())? {
        Some(day) => state.store.list_by_date(day).await?,
        None => state.store.list_all().await?,
    };

    Ok(Json(events))
}

pub async fn clear(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    state.store.clear_all().await?;

    info!("Cleared all feedback");

    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "message": "All feedback data cleared" })),
    ))
}
