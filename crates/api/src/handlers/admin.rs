//! Admin-only user management and usage reporting.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use mineruca_core::error::CoreError;
use mineruca_core::paging::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use mineruca_core::roles::{is_valid_role, ROLE_USER};
use mineruca_core::types::DbId;
use mineruca_db::models::search_log::UserUsage;
use mineruca_db::models::user::{CreateUser, UpdateUser, UserResponse};
use mineruca_db::repositories::{SearchLogRepo, SessionRepo, UserRepo};
use serde::{Deserialize, Serialize};

use crate::auth::password::{
    hash_password, validate_email, validate_password_strength, validate_username,
    MIN_PASSWORD_LENGTH,
};
use crate::error::{AppError, AppResult};
use crate::handlers::auth::signup_conflict;
use crate::middleware::rbac::RequireAdmin;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Largest batch accepted by `POST /admin/users/bulk`.
const MAX_BULK_USERS: usize = 200;

/// Default window of the usage report, in days.
const DEFAULT_USAGE_DAYS: i64 = 30;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct NewUserEntry {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BulkCreateRequest {
    pub users: Vec<NewUserEntry>,
}

#[derive(Debug, Serialize)]
pub struct BulkFailure {
    /// Position in the submitted list.
    pub index: usize,
    pub username: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct BulkCreateResult {
    pub created: Vec<UserResponse>,
    pub failed: Vec<BulkFailure>,
}

#[derive(Debug, Serialize)]
pub struct UserPage {
    pub users: Vec<UserResponse>,
    pub total: i64,
}

#[derive(Debug, Deserialize)]
pub struct UsageParams {
    pub days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UsageReport {
    pub days: i64,
    pub users: Vec<UserUsage>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<UserPage>>> {
    let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
    let offset = clamp_offset(params.offset);

    let users = UserRepo::list(&state.pool, limit, offset).await?;
    let total = UserRepo::count(&state.pool).await?;
    Ok(Json(DataResponse {
        data: UserPage {
            users: users.iter().map(UserResponse::from).collect(),
            total,
        },
    }))
}

/// POST /api/v1/admin/users/bulk
///
/// Create accounts from a list. Each entry succeeds or fails on its own;
/// failures are reported per entry and do not abort the batch.
pub async fn bulk_create_users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<BulkCreateRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<BulkCreateResult>>)> {
    if input.users.is_empty() {
        return Err(AppError::BadRequest("No users given".into()));
    }
    if input.users.len() > MAX_BULK_USERS {
        return Err(AppError::BadRequest(format!(
            "At most {MAX_BULK_USERS} users per request"
        )));
    }

    let mut result = BulkCreateResult {
        created: Vec::new(),
        failed: Vec::new(),
    };

    for (index, entry) in input.users.iter().enumerate() {
        match create_one(&state, entry).await {
            Ok(user) => result.created.push(user),
            Err(err) => result.failed.push(BulkFailure {
                index,
                username: entry.username.clone(),
                error: describe(&err),
            }),
        }
    }

    tracing::info!(
        admin_id = admin.user_id,
        created = result.created.len(),
        failed = result.failed.len(),
        "Bulk user creation"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: result })))
}

/// PATCH /api/v1/admin/users/{id}
///
/// Change role or active flag. Deactivating revokes all sessions.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUser>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if input.role.is_none() && input.is_active.is_none() {
        return Err(AppError::BadRequest("No fields to update".into()));
    }
    if let Some(role) = &input.role {
        if !is_valid_role(role) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Unknown role: '{role}'"
            ))));
        }
    }
    if id == admin.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "Admins cannot change their own role or status".into(),
        )));
    }

    let user = UserRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    if input.is_active == Some(false) {
        let revoked = SessionRepo::revoke_all_for_user(&state.pool, id).await?;
        tracing::info!(user_id = id, revoked, "User deactivated");
    }

    Ok(Json(DataResponse {
        data: UserResponse::from(&user),
    }))
}

/// GET /api/v1/admin/usage?days=
///
/// Per-user search activity over the last `days` days (default 30).
pub async fn usage(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Query(params): Query<UsageParams>,
) -> AppResult<Json<DataResponse<UsageReport>>> {
    let days = params.days.unwrap_or(DEFAULT_USAGE_DAYS);
    if !(1..=365).contains(&days) {
        return Err(AppError::Core(CoreError::Validation(
            "days must be between 1 and 365".into(),
        )));
    }

    let since = Utc::now() - chrono::Duration::days(days);
    let users = SearchLogRepo::usage_report(&state.pool, since).await?;
    Ok(Json(DataResponse {
        data: UsageReport { days, users },
    }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn create_one(state: &AppState, entry: &NewUserEntry) -> AppResult<UserResponse> {
    let username = entry.username.trim();
    let email = entry.email.trim();
    validate_username(username).map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    validate_email(email).map_err(|e| AppError::Core(CoreError::Validation(e)))?;
    validate_password_strength(&entry.password, MIN_PASSWORD_LENGTH)
        .map_err(|e| AppError::Core(CoreError::Validation(e)))?;

    let role = entry.role.as_deref().unwrap_or(ROLE_USER);
    if !is_valid_role(role) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Unknown role: '{role}'"
        ))));
    }

    let password_hash = hash_password(&entry.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create = CreateUser {
        username: username.to_string(),
        email: email.to_string(),
        password_hash,
        role: role.to_string(),
    };
    let user = UserRepo::create(&state.pool, &create)
        .await
        .map_err(signup_conflict)?;
    Ok(UserResponse::from(&user))
}

/// Message for a failed bulk entry. Internal details are not exposed.
fn describe(err: &AppError) -> String {
    match err {
        AppError::Core(CoreError::Validation(msg)) | AppError::Core(CoreError::Conflict(msg)) => {
            msg.clone()
        }
        other => {
            tracing::error!(error = %other, "Bulk user creation failed");
            "Internal error".to_string()
        }
    }
}
