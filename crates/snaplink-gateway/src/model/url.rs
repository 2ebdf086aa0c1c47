use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use snaplink_core::Mapping;

#[derive(Debug, Deserialize)]
pub struct ShortenRequest {
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: Timestamp,
}

impl ShortenResponse {
    pub fn from_mapping(mapping: Mapping, base_url: &str) -> Self {
        Self {
            short_url: mapping.code.to_url(base_url),
            short_code: mapping.code.into(),
            original_url: mapping.original_url,
            created_at: mapping.created_at,
        }
    }
}

/// One entry of `GET /api/urls`.
#[derive(Debug, Serialize, Deserialize)]
pub struct UrlResponse {
    pub short_code: String,
    pub short_url: String,
    pub original_url: String,
    pub created_at: Timestamp,
    pub access_count: u64,
}

impl UrlResponse {
    pub fn from_mapping(mapping: Mapping, base_url: &str) -> Self {
        Self {
            short_url: mapping.code.to_url(base_url),
            short_code: mapping.code.into(),
            original_url: mapping.original_url,
            created_at: mapping.created_at,
            access_count: mapping.access_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
