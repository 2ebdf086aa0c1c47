use crate::error::{AppError, Result};
use crate::metrics::route;
use crate::model::{ShortenRequest, ShortenResponse, UrlResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::info;

pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Response> {
    let _timer = state.metrics().start_timer(route::SHORTEN);
    let Json(request) = payload?;
    let mapping = state.resolver().shorten(&request.url).await?;

    info!(code = %mapping.code, "created short url");
    let body = ShortenResponse::from_mapping(mapping, state.base_url());
    Ok((StatusCode::CREATED, Json(body)).into_response())
}

pub async fn list_urls_handler(State(state): State<AppState>) -> Result<Json<Vec<UrlResponse>>> {
    let mappings = state.resolver().list_all().await?;
    let body = mappings
        .into_iter()
        .map(|mapping| UrlResponse::from_mapping(mapping, state.base_url()))
        .collect();
    Ok(Json(body))
}

pub async fn redirect_handler(
    Path(short_code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let _timer = state.metrics().start_timer(route::REDIRECT);
    let url = state.resolver().resolve(&short_code).await?;
    let location =
        HeaderValue::from_str(&url).map_err(|_| AppError::InvalidRedirect(short_code))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
