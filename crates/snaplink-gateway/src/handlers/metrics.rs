use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::Result;
use crate::state::AppState;

pub async fn metrics_handler(State(state): State<AppState>) -> Result<Response> {
    let metrics = state.metrics();
    let body = metrics.render()?;
    Ok(([(header::CONTENT_TYPE, metrics.content_type())], body).into_response())
}
