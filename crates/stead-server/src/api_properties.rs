//! Property API handlers.
//!
//! Listing properties requires a city filter and is paginated; every
//! mutation requires the caller identity to match the row's owner.

use crate::api::{listing_err, ApiError};
use crate::middleware::CallerIdentity;
use crate::AppState;
use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use stead_listings::{
    create_property, delete_property, extract_fields, get_property, list_properties_in_city,
    update_property, Property,
};

/// Default page size for property listings.
const DEFAULT_PAGE_SIZE: i64 = 20;
/// Largest page size a caller may request.
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct ListPropertiesParams {
    pub city: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct PropertiesPage {
    pub properties: Vec<Property>,
    pub page: i64,
    pub page_size: i64,
}

/// GET /properties?city=&page=&page_size=
pub async fn list_properties_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<ListPropertiesParams>,
) -> Result<Json<PropertiesPage>, ApiError> {
    let city = params
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ApiError::BadRequest("city query parameter is required".to_string()))?;

    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1) * page_size;

    let properties = tokio::task::spawn_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::Internal(format!("db connection failed: {}", e)))?;
        list_properties_in_city(&conn, &city, page_size, offset).map_err(listing_err)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("task join error: {}", e)))??;

    Ok(Json(PropertiesPage {
        properties,
        page,
        page_size,
    }))
}

/// GET /properties/:propertyId
pub async fn get_property_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(property_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let property = tokio::task::spawn_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::Internal(format!("db connection failed: {}", e)))?;
        get_property(&conn, property_id).map_err(listing_err)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("task join error: {}", e)))??;

    Ok(Json(json!({ "property": property })))
}

/// POST /properties
///
/// Creates a property owned by the caller. The owner lookup runs inside the
/// insert transaction; the foreign key on `owner_id` is the final arbiter if
/// the user vanishes between lookup and commit.
pub async fn create_property_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(CallerIdentity(caller_id)): Extension<CallerIdentity>,
    Json(payload): Json<Value>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let payload = payload.as_object().cloned().unwrap_or_default();
    let fields = extract_fields(&payload, false).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let property = tokio::task::spawn_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::Internal(format!("db connection failed: {}", e)))?;

        let id = create_property(&conn, caller_id, &fields).map_err(listing_err)?;
        get_property(&conn, id).map_err(listing_err)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("task join error: {}", e)))??;

    Ok((StatusCode::CREATED, Json(json!({ "property": property }))))
}

/// PUT|PATCH /properties/:propertyId
pub async fn update_property_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(CallerIdentity(caller_id)): Extension<CallerIdentity>,
    Path(property_id): Path<i64>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    let payload = payload.as_object().cloned().unwrap_or_default();

    let property = tokio::task::spawn_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::Internal(format!("db connection failed: {}", e)))?;

        let existing = get_property(&conn, property_id).map_err(listing_err)?;
        if existing.owner.id != caller_id {
            return Err(ApiError::Forbidden(
                "you can only edit your own properties".to_string(),
            ));
        }

        let fields =
            extract_fields(&payload, true).map_err(|e| ApiError::BadRequest(e.to_string()))?;
        if fields.is_empty() {
            return Err(ApiError::BadRequest("nothing to update".to_string()));
        }

        update_property(&conn, property_id, &fields).map_err(listing_err)?;
        get_property(&conn, property_id).map_err(listing_err)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("task join error: {}", e)))??;

    Ok(Json(json!({ "property": property })))
}

/// DELETE /properties/:propertyId
pub async fn delete_property_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(CallerIdentity(caller_id)): Extension<CallerIdentity>,
    Path(property_id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    tokio::task::spawn_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::Internal(format!("db connection failed: {}", e)))?;

        let existing = get_property(&conn, property_id).map_err(listing_err)?;
        if existing.owner.id != caller_id {
            return Err(ApiError::Forbidden(
                "you can only delete your own properties".to_string(),
            ));
        }

        delete_property(&conn, property_id).map_err(listing_err)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("task join error: {}", e)))??;

    Ok(Json(json!({ "message": "property deleted" })))
}
