//! Request and response shapes for the HTTP API
//!
//! Everything is JSON; error bodies carry a single `detail` string.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::pagination::{PageRequest, PageResult};
use crate::Error;

pub const INTERNAL_ERROR_DETAIL: &str = "Internal Server Error";

// Routes
pub mod routes {
    pub const FEED: &str = "/rss";
    pub const VALUES: &str = "/rss/values";
    pub const HEALTH: &str = "/health";
    pub const STATUS: &str = "/status";
}

// Query structures

/// `?page=&page_size=`; validated into a [`PageRequest`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageParams {
    pub fn into_request(self) -> crate::Result<PageRequest> {
        PageRequest::from_params(self.page, self.page_size)
    }
}

/// `?keys=a,b,c&page=&page_size=`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValuesParams {
    #[serde(default)]
    pub keys: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl ValuesParams {
    /// Comma-separated keys, blanks dropped
    pub fn key_list(&self) -> Vec<String> {
        self.keys
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn page_request(&self) -> crate::Result<PageRequest> {
        PageRequest::from_params(self.page, self.page_size)
    }
}

// Response structures

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse {
    #[serde(flatten)]
    pub result: PageResult,
    pub timestamp: DateTime<Utc>,
}

impl From<PageResult> for PageResponse {
    fn from(result: PageResult) -> Self {
        Self {
            result,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub uptime_secs: u64,
    pub strategy: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

/// Error as seen by HTTP clients.
///
/// Only validation messages reach the client; everything else becomes a
/// generic 500 and is logged in full here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Validation(String),
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(message) => ApiError::Validation(message),
            other => {
                error!(
                    store_unavailable = other.is_store_unavailable(),
                    "Request failed: {}", other
                );
                ApiError::Internal
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            ApiError::Validation(message) => message,
            ApiError::Internal => INTERNAL_ERROR_DETAIL.to_string(),
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}
