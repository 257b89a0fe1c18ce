//! User HTTP handlers (`/users`).

use axum::extract::State;
use serde::Deserialize;

use doorscan_core::{CreateUserRequest, ListQuery, UpdateUserRequest, User, UserRepository};

use crate::error::{
    ApiError, ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, FailureMessage,
};
use crate::AppState;

/// Query parameters for listing users.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Case-insensitive substring of `user_nm`
    pub name: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

fn user_uid(raw: &str, message: &str) -> Result<String, ApiError> {
    let uid = raw.trim();
    if uid.is_empty() {
        return Err(ApiError::BadRequest(message.to_string()));
    }
    Ok(uid.to_string())
}

/// List users with their group.
#[utoipa::path(get, path = "/users", tag = "Users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users retrieved", body = [User]),
        (status = 404, description = "No users found")))]
pub async fn list_users(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListUsersQuery>,
) -> ApiResult<Vec<User>> {
    let query = ListQuery::new(query.name, query.limit.as_deref(), query.offset.as_deref());
    let users = state
        .db
        .users
        .list(&query)
        .await
        .or_fail("Error retrieving users")?;
    if users.is_empty() {
        return Err(ApiError::NotFound("No users found".to_string()));
    }
    Ok(ApiResponse::ok("Users retrieved successfully", users))
}

/// Get a user by identity-provider UID.
#[utoipa::path(get, path = "/users/{user_uid}", tag = "Users",
    params(("user_uid" = String, Path, description = "Identity provider UID")),
    responses(
        (status = 200, description = "User", body = User),
        (status = 404, description = "User not found")))]
pub async fn get_user(
    State(state): State<AppState>,
    ApiPath(raw_uid): ApiPath<String>,
) -> ApiResult<User> {
    let uid = user_uid(&raw_uid, "User UID is required")?;
    let user = state
        .db
        .users
        .get_by_uid(&uid)
        .await
        .or_fail("Error ctrl getUserbyUID")?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(ApiResponse::ok("User fetched successfully", user))
}

/// Register a user in the default group.
///
/// # Returns
/// - 201 Created with the stored user
/// - 400 Bad Request on missing fields or an unknown login type
/// - 409 Conflict if the UID is already registered
#[utoipa::path(post, path = "/users", tag = "Users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Created", body = User),
        (status = 400, description = "Missing fields or invalid login type"),
        (status = 409, description = "UID already registered")))]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> ApiResult<User> {
    let user = req.validate()?;
    let created = state
        .db
        .users
        .create(user)
        .await
        .or_fail("Error creating user")?;
    Ok(ApiResponse::created("User created successfully", created))
}

/// Update a user's name, login type, email or group.
#[utoipa::path(patch, path = "/users/{user_uid}", tag = "Users",
    params(("user_uid" = String, Path, description = "Identity provider UID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated", body = User),
        (status = 400, description = "Invalid or empty update"),
        (status = 404, description = "User not found")))]
pub async fn update_user(
    State(state): State<AppState>,
    ApiPath(raw_uid): ApiPath<String>,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ApiResult<User> {
    let uid = user_uid(&raw_uid, "User UID is required for update")?;
    let updates = req.validate()?;
    let updated = state
        .db
        .users
        .update_by_uid(&uid, updates)
        .await
        .or_fail("Error ctrl updateUserbyUid")?
        .ok_or_else(|| ApiError::NotFound("User not found or no update applied".to_string()))?;
    Ok(ApiResponse::ok("User updated successfully", updated))
}
