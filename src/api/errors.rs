// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use crate::catalog::CatalogError;
use crate::fetch::FetchError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub error_type: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    InvalidRequest(String),
    NotFound(String),
    /// Upstream did not answer in time
    Timeout(String),
    /// Upstream answered badly or not at all
    BadGateway(String),
    InternalError(String),
}

impl ApiError {
    pub fn to_response(&self) -> ErrorResponse {
        let (error_type, error) = match self {
            ApiError::InvalidRequest(msg) => ("invalid_request", msg.clone()),
            ApiError::NotFound(msg) => ("not_found", msg.clone()),
            ApiError::Timeout(msg) => ("upstream_timeout", msg.clone()),
            ApiError::BadGateway(msg) => ("upstream_error", msg.clone()),
            ApiError::InternalError(msg) => ("internal_error", msg.clone()),
        };

        ErrorResponse {
            error_type: error_type.to_string(),
            error,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::InternalError(_) => 500,
            ApiError::BadGateway(_) => 502,
            ApiError::Timeout(_) => 504,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Timeout(msg) => write!(f, "Upstream timeout: {}", msg),
            ApiError::BadGateway(msg) => write!(f, "Upstream error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<CatalogError> for ApiError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::InvalidQuery(msg) => ApiError::InvalidRequest(msg),
            CatalogError::NotFound(msg) => ApiError::NotFound(msg),
            CatalogError::Network(fetch) if fetch.is_timeout() => {
                ApiError::Timeout(fetch.to_string())
            }
            CatalogError::Network(fetch @ FetchError::InvalidUrl(_)) => {
                ApiError::InvalidRequest(fetch.to_string())
            }
            CatalogError::Network(fetch) => ApiError::BadGateway(fetch.to_string()),
            CatalogError::Serialization(msg) | CatalogError::Config(msg) => {
                ApiError::InternalError(msg)
            }
        }
    }
}

/// Error response wrapper
#[derive(Debug)]
pub struct ApiErrorResponse(pub ApiError);

impl From<ApiError> for ApiErrorResponse {
    fn from(e: ApiError) -> Self {
        Self(e)
    }
}

impl From<CatalogError> for ApiErrorResponse {
    fn from(e: CatalogError) -> Self {
        Self(e.into())
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            warn!("Request failed: {}", self.0);
        }

        (status, Json(self.0.to_response())).into_response()
    }
}
