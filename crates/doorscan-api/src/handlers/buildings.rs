//! Building HTTP handlers (`/buildings`).

use axum::extract::State;
use serde::Deserialize;

use doorscan_core::{
    parse_positive_id, Building, BuildingRepository, CreateBuildingRequest, ListQuery,
    NearbyBuilding, RadiusParams, RadiusQuery, UpdateBuildingRequest,
};

use crate::error::{
    ApiError, ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, FailureMessage,
};
use crate::AppState;

const ID_REQUIRED: &str = "Building ID is required";

/// Query parameters for listing buildings.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListBuildingsQuery {
    /// Case-insensitive substring of `bldg_nm`
    pub bldg_nm: Option<String>,
    /// Page size (default 100, max 1000)
    pub limit: Option<String>,
    pub offset: Option<String>,
}

fn building_id(raw: &str) -> Result<i64, ApiError> {
    parse_positive_id(raw).ok_or_else(|| ApiError::BadRequest(ID_REQUIRED.to_string()))
}

/// List buildings.
///
/// # Returns
/// - 200 OK with the matching buildings
/// - 404 Not Found if nothing matches
/// - 500 Internal Server Error if the query fails
#[utoipa::path(get, path = "/buildings", tag = "Buildings",
    params(ListBuildingsQuery),
    responses(
        (status = 200, description = "Buildings retrieved", body = [Building]),
        (status = 404, description = "No buildings found")))]
pub async fn list_buildings(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListBuildingsQuery>,
) -> ApiResult<Vec<Building>> {
    let query = ListQuery::new(
        query.bldg_nm,
        query.limit.as_deref(),
        query.offset.as_deref(),
    );
    let buildings = state
        .db
        .buildings
        .list(&query)
        .await
        .or_fail("Error retrieving buildings")?;
    if buildings.is_empty() {
        return Err(ApiError::NotFound("No buildings found".to_string()));
    }
    Ok(ApiResponse::ok("Buildings retrieved successfully", buildings))
}

/// Buildings within a radius of a point, nearest first.
///
/// # Query Parameters
/// - `x`, `y`: longitude and latitude (SRID 4326)
/// - `radius`: metres
/// - `limit`: maximum rows
#[utoipa::path(get, path = "/buildings/map", tag = "Buildings",
    params(
        ("x" = f64, Query, description = "Longitude"),
        ("y" = f64, Query, description = "Latitude"),
        ("radius" = f64, Query, description = "Radius in metres"),
        ("limit" = i64, Query, description = "Maximum number of buildings")),
    responses(
        (status = 200, description = "Buildings within the radius", body = [NearbyBuilding]),
        (status = 400, description = "Missing or invalid parameters"),
        (status = 404, description = "No buildings within the radius")))]
pub async fn buildings_within_radius(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RadiusParams>,
) -> ApiResult<Vec<NearbyBuilding>> {
    let query = RadiusQuery::parse(&params)?;
    let buildings = state
        .db
        .buildings
        .within_radius(&query)
        .await
        .or_fail("Error fetching buildings by radius")?;
    if buildings.is_empty() {
        return Err(ApiError::NotFound(
            "No buildings found within the specified radius".to_string(),
        ));
    }
    Ok(ApiResponse::ok("Buildings fetched successfully", buildings))
}

/// Get a building by id.
#[utoipa::path(get, path = "/buildings/{bldg_id}", tag = "Buildings",
    params(("bldg_id" = i64, Path, description = "Building id")),
    responses(
        (status = 200, description = "Building", body = Building),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "Building not found")))]
pub async fn get_building(
    State(state): State<AppState>,
    ApiPath(raw_id): ApiPath<String>,
) -> ApiResult<Building> {
    let bldg_id = building_id(&raw_id)?;
    let building = state
        .db
        .buildings
        .get(bldg_id)
        .await
        .or_fail("Error fetching building")?
        .ok_or_else(|| ApiError::NotFound("Building not found".to_string()))?;
    Ok(ApiResponse::ok("Building fetched successfully", building))
}

/// Create a building from WKT geometry.
///
/// # Returns
/// - 201 Created with the stored building
/// - 400 Bad Request if `bldg_nm` or `wkt` is missing or the WKT is invalid
#[utoipa::path(post, path = "/buildings", tag = "Buildings",
    request_body = CreateBuildingRequest,
    responses(
        (status = 201, description = "Created", body = Building),
        (status = 400, description = "Missing fields or invalid geometry")))]
pub async fn create_building(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateBuildingRequest>,
) -> ApiResult<Building> {
    let building = req.validate()?;
    let created = state
        .db
        .buildings
        .create(building)
        .await
        .or_fail("Error creating building")?;
    Ok(ApiResponse::created("Building created successfully", created))
}

/// Partially update a building.
#[utoipa::path(patch, path = "/buildings/{bldg_id}", tag = "Buildings",
    params(("bldg_id" = i64, Path, description = "Building id")),
    request_body = UpdateBuildingRequest,
    responses(
        (status = 200, description = "Updated", body = Building),
        (status = 400, description = "Invalid or empty update"),
        (status = 404, description = "Building not found")))]
pub async fn update_building(
    State(state): State<AppState>,
    ApiPath(raw_id): ApiPath<String>,
    ApiJson(req): ApiJson<UpdateBuildingRequest>,
) -> ApiResult<Building> {
    let bldg_id = building_id(&raw_id)?;
    req.validate()?;
    let updated = state
        .db
        .buildings
        .update(bldg_id, req)
        .await
        .or_fail("Error updating building")?
        .ok_or_else(|| ApiError::NotFound("Building not found".to_string()))?;
    Ok(ApiResponse::ok("Building updated successfully", updated))
}
