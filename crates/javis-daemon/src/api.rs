//! REST API handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use javis_core::{CatalogEntry, CatalogError, CatalogSource, CategoryOptions, PartDescriptor};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::state::AppState;

/// API error response
#[derive(Serialize)]
struct ApiError {
    error: String,
}

impl ApiError {
    fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// Validated configuration document as returned by the API
#[derive(Serialize)]
pub struct DocumentView<'a> {
    pub entry: &'a CatalogEntry,
    pub base: &'a PartDescriptor,
    pub categories: Vec<CategoryOptions<'a>>,
}

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// List catalog entries
pub async fn list_catalog(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.catalog.list_entries().await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => {
            warn!(error = %e, "Listing request failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiError::new(e.to_string())),
            )
                .into_response()
        }
    }
}

/// Parse and validate one configuration document
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    Path(entry): Path<String>,
) -> impl IntoResponse {
    let entry = CatalogEntry::new(entry);
    debug!(entry = %entry, "Document requested");

    match state.catalog.fetch_document(&entry).await {
        Ok(document) => Json(DocumentView {
            entry: &document.entry,
            base: document.base(),
            categories: document.grouped(),
        })
        .into_response(),
        Err(e @ CatalogError::DocumentUnavailable { .. }) => {
            (StatusCode::NOT_FOUND, Json(ApiError::new(e.to_string()))).into_response()
        }
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new(e.to_string())),
        )
            .into_response(),
    }
}
