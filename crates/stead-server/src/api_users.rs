//! User API handlers.

use crate::api::{account_err, ApiError};
use crate::middleware::CallerIdentity;
use crate::AppState;
use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use stead_accounts::{create_user, get_user, list_users, update_user, NewUser, User, UserChanges};

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
}

/// POST /users
pub async fn create_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let (Some(first_name), Some(last_name), Some(date_of_birth)) = (
        payload.first_name.filter(|s| !s.is_empty()),
        payload.last_name.filter(|s| !s.is_empty()),
        payload.date_of_birth.filter(|s| !s.is_empty()),
    ) else {
        return Err(ApiError::BadRequest(
            "first_name, last_name and date_of_birth are required".to_string(),
        ));
    };

    let user = NewUser {
        first_name,
        last_name,
        date_of_birth,
    };

    let id = tokio::task::spawn_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::Internal(format!("db connection failed: {}", e)))?;
        create_user(&conn, &user).map_err(account_err)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("task join error: {}", e)))??;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// GET /users
pub async fn list_users_handler(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<Vec<User>>, ApiError> {
    let users = tokio::task::spawn_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::Internal(format!("db connection failed: {}", e)))?;
        list_users(&conn).map_err(account_err)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("task join error: {}", e)))??;

    Ok(Json(users))
}

/// GET /users/:userId
pub async fn get_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<i64>,
) -> Result<Json<User>, ApiError> {
    let user = tokio::task::spawn_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::Internal(format!("db connection failed: {}", e)))?;
        get_user(&conn, user_id).map_err(account_err)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("task join error: {}", e)))??;

    Ok(Json(user))
}

/// Reads an updatable field as either a string or an explicit null.
fn string_or_null(field: &'static str, value: &Value) -> Result<Option<String>, ApiError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(ApiError::BadRequest(format!("{field} must be a string"))),
    }
}

/// PATCH /users/:userId
///
/// A caller may only update its own user. Fields left out of the payload
/// keep their prior value; an explicit `date_of_birth: null` clears it.
pub async fn update_user_handler(
    Extension(state): Extension<Arc<AppState>>,
    Extension(CallerIdentity(caller_id)): Extension<CallerIdentity>,
    Path(user_id): Path<i64>,
    Json(payload): Json<Value>,
) -> Result<Json<Value>, ApiError> {
    if caller_id != user_id {
        return Err(ApiError::Forbidden(
            "forbidden: you can only update your own user".to_string(),
        ));
    }

    let payload = payload.as_object().cloned().unwrap_or_default();

    let mut changes = UserChanges::default();
    if let Some(value) = payload.get("first_name") {
        changes.first_name = Some(string_or_null("first_name", value)?);
    }
    if let Some(value) = payload.get("last_name") {
        changes.last_name = Some(string_or_null("last_name", value)?);
    }
    if let Some(value) = payload.get("date_of_birth") {
        changes.date_of_birth = Some(string_or_null("date_of_birth", value)?);
    }

    tokio::task::spawn_blocking(move || {
        let conn = state
            .pool
            .get()
            .map_err(|e| ApiError::Internal(format!("db connection failed: {}", e)))?;

        // 404 for an unknown user wins over complaints about the payload.
        let _ = get_user(&conn, user_id).map_err(account_err)?;

        if changes.is_empty() {
            return Err(ApiError::BadRequest(
                "no supported fields to update".to_string(),
            ));
        }

        update_user(&conn, user_id, &changes).map_err(account_err)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("task join error: {}", e)))??;

    Ok(Json(json!({ "message": "user updated" })))
}
