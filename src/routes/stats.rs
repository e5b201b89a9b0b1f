use std::{convert::Infallible, sync::Arc};

use axum::{
    extract::{Query, State},
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::{future, StreamExt};
use log::error;
use serde::Deserialize;

use crate::{
    error::AppError,
    ingest,
    stats::{self, StatsFilter},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub date: Option<String>,
    pub stream: Option<String>,
}

impl StatsQuery {
    fn filter(&self) -> Result<StatsFilter, AppError> {
        let day = ingest::day_filter(self.date.as_deref())?;
        Ok(StatsFilter::from(day))
    }

    fn wants_stream(&self) -> bool {
        self.stream.as_deref() == Some("true")
    }
}

/// JSON snapshot, or a server-sent event stream when `stream=true`.
pub async fn stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> Result<Response, AppError> {
    let filter = query.filter()?;

    if query.wants_stream() {
        return Ok(live(&state, filter).into_response());
    }

    let snapshot = stats::snapshot(state.store.as_ref(), filter).await?;
    Ok(Json(snapshot).into_response())
}

fn live(state: &AppState, filter: StatsFilter) -> impl IntoResponse {
    // Dropping the body on disconnect drops the subscription, which stops its timer.
    let events = state
        .feed
        .subscribe(filter)
        .filter_map(|snapshot| {
            future::ready(match Event::default().json_data(&snapshot) {
                Ok(event) => Some(Ok::<Event, Infallible>(event)),
                Err(err) => {
                    error!("{}", AppError::StreamTransport(err.to_string()));
                    None
                }
            })
        });

    Sse::new(events).keep_alive(KeepAlive::default())
}
