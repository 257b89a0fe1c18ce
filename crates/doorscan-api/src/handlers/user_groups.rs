//! User group HTTP handlers (`/usergroup`).

use axum::extract::State;

use doorscan_core::{CreateUserGroupRequest, UserGroup, UserGroupRepository};

use crate::error::{ApiError, ApiJson, ApiPath, ApiResponse, ApiResult, FailureMessage};
use crate::AppState;

/// List every user group. An empty list is still a success.
#[utoipa::path(get, path = "/usergroup", tag = "User groups",
    responses((status = 200, description = "All user groups", body = [UserGroup])))]
pub async fn list_user_groups(State(state): State<AppState>) -> ApiResult<Vec<UserGroup>> {
    let groups = state
        .db
        .user_groups
        .list()
        .await
        .or_fail("Error ctrl getAllUserGroup")?;
    Ok(ApiResponse::ok("All User Groups fetched successfully", groups))
}

/// Look up a group by its join code (case-insensitive).
#[utoipa::path(get, path = "/usergroup/{user_group_cd}", tag = "User groups",
    params(("user_group_cd" = String, Path, description = "Group join code")),
    responses(
        (status = 200, description = "User group", body = UserGroup),
        (status = 404, description = "User group not found")))]
pub async fn get_user_group(
    State(state): State<AppState>,
    ApiPath(code): ApiPath<String>,
) -> ApiResult<UserGroup> {
    if code.trim().is_empty() {
        return Err(ApiError::BadRequest("user_group_cd is required".to_string()));
    }
    let group = state
        .db
        .user_groups
        .get_by_code(&code)
        .await
        .or_fail("Error ctrl getUserGroupByGroupCode")?
        .ok_or_else(|| ApiError::NotFound("User group not found".to_string()))?;
    Ok(ApiResponse::ok("User group fetched successfully", group))
}

/// Create a user group.
///
/// # Returns
/// - 201 Created with the stored group
/// - 400 Bad Request if any field is missing
/// - 409 Conflict if the code is taken (any case)
#[utoipa::path(post, path = "/usergroup", tag = "User groups",
    request_body = CreateUserGroupRequest,
    responses(
        (status = 201, description = "Created", body = UserGroup),
        (status = 400, description = "Missing fields"),
        (status = 409, description = "User group code already exists")))]
pub async fn create_user_group(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUserGroupRequest>,
) -> ApiResult<UserGroup> {
    let group = req.validate()?;
    let created = state
        .db
        .user_groups
        .create(group)
        .await
        .or_fail("Error creating user group")?;
    Ok(ApiResponse::created("User group created successfully", created))
}
