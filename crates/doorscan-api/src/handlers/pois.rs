//! POI HTTP handlers (`/pois`), including POI detail records.

use axum::extract::State;
use serde::Deserialize;

use doorscan_core::{
    parse_positive_id, CreatePoiDetailRequest, CreatePoiRequest, ListQuery, NearbyPoi, Poi,
    PoiDetail, PoiRepository, RadiusParams, RadiusQuery, UpdatePoiRequest,
};

use crate::error::{
    ApiError, ApiJson, ApiPath, ApiQuery, ApiResponse, ApiResult, FailureMessage,
};
use crate::AppState;

/// Query parameters for listing POIs.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListPoisQuery {
    /// Case-insensitive substring of `poi_nm`
    pub poi_nm: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

fn poi_id(raw: &str) -> Result<i64, ApiError> {
    parse_positive_id(raw).ok_or_else(|| ApiError::BadRequest("poi_id is required".to_string()))
}

fn poi_not_found() -> ApiError {
    ApiError::NotFound("POI not found".to_string())
}

/// List POIs.
#[utoipa::path(get, path = "/pois", tag = "POIs",
    params(ListPoisQuery),
    responses(
        (status = 200, description = "POIs retrieved", body = [Poi]),
        (status = 404, description = "No POI found")))]
pub async fn list_pois(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListPoisQuery>,
) -> ApiResult<Vec<Poi>> {
    let query = ListQuery::new(query.poi_nm, query.limit.as_deref(), query.offset.as_deref());
    let pois = state
        .db
        .pois
        .list(&query)
        .await
        .or_fail("Error retrieving POI")?;
    if pois.is_empty() {
        return Err(ApiError::NotFound("No POI found".to_string()));
    }
    Ok(ApiResponse::ok("POI retrieved successfully", pois))
}

/// POIs within a radius of a point, nearest first.
#[utoipa::path(get, path = "/pois/map", tag = "POIs",
    params(
        ("x" = f64, Query, description = "Longitude"),
        ("y" = f64, Query, description = "Latitude"),
        ("radius" = f64, Query, description = "Radius in metres"),
        ("limit" = i64, Query, description = "Maximum number of POIs")),
    responses(
        (status = 200, description = "POIs within the radius", body = [NearbyPoi]),
        (status = 400, description = "Missing or invalid parameters"),
        (status = 404, description = "No POI within the radius")))]
pub async fn pois_within_radius(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<RadiusParams>,
) -> ApiResult<Vec<NearbyPoi>> {
    let query = RadiusQuery::parse(&params)?;
    let pois = state
        .db
        .pois
        .within_radius(&query)
        .await
        .or_fail("Error fetching POI by radius")?;
    if pois.is_empty() {
        return Err(ApiError::NotFound(
            "No POI found within the specified radius".to_string(),
        ));
    }
    Ok(ApiResponse::ok("POI fetched successfully", pois))
}

/// Get a POI by id.
#[utoipa::path(get, path = "/pois/{poi_id}", tag = "POIs",
    params(("poi_id" = i64, Path, description = "POI id")),
    responses(
        (status = 200, description = "POI", body = Poi),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "POI not found")))]
pub async fn get_poi(
    State(state): State<AppState>,
    ApiPath(raw_id): ApiPath<String>,
) -> ApiResult<Poi> {
    let poi_id = poi_id(&raw_id)?;
    let poi = state
        .db
        .pois
        .get(poi_id)
        .await
        .or_fail("Error ctrl getPOIByPOIid")?
        .ok_or_else(poi_not_found)?;
    Ok(ApiResponse::ok("POI fetched successfully", poi))
}

/// POIs located in a building.
#[utoipa::path(get, path = "/pois/{bldg_id}/building", tag = "POIs",
    params(("bldg_id" = i64, Path, description = "Building id")),
    responses(
        (status = 200, description = "POIs in the building", body = [Poi]),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "POI not found")))]
pub async fn pois_by_building(
    State(state): State<AppState>,
    ApiPath(raw_id): ApiPath<String>,
) -> ApiResult<Vec<Poi>> {
    let bldg_id = parse_positive_id(&raw_id)
        .ok_or_else(|| ApiError::BadRequest("bldg_id is required".to_string()))?;
    let pois = state
        .db
        .pois
        .list_by_building(bldg_id)
        .await
        .or_fail("Error ctrl getPOIByBldgid")?;
    if pois.is_empty() {
        return Err(poi_not_found());
    }
    Ok(ApiResponse::ok("POI fetched successfully", pois))
}

/// Detail records collected for a POI.
#[utoipa::path(get, path = "/pois/{poi_id}/detail", tag = "POIs",
    params(("poi_id" = i64, Path, description = "POI id")),
    responses(
        (status = 200, description = "POI detail records", body = [PoiDetail]),
        (status = 400, description = "Invalid id"),
        (status = 404, description = "POI Detail not found")))]
pub async fn get_poi_details(
    State(state): State<AppState>,
    ApiPath(raw_id): ApiPath<String>,
) -> ApiResult<Vec<PoiDetail>> {
    let poi_id = poi_id(&raw_id)?;
    let details = state
        .db
        .pois
        .list_details(poi_id)
        .await
        .or_fail("Error ctrl getPOIDtlByPOIid")?;
    if details.is_empty() {
        return Err(ApiError::NotFound("POI Detail not found".to_string()));
    }
    Ok(ApiResponse::ok("POI Detail fetched successfully", details))
}

/// Create a POI.
///
/// # Returns
/// - 201 Created with the stored POI
/// - 400 Bad Request if `poi_nm`, `x` or `y` is missing, or `bldg_id` does not exist
#[utoipa::path(post, path = "/pois", tag = "POIs",
    request_body = CreatePoiRequest,
    responses(
        (status = 201, description = "Created", body = Poi),
        (status = 400, description = "Missing fields or unknown building")))]
pub async fn create_poi(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreatePoiRequest>,
) -> ApiResult<Poi> {
    let poi = req.validate()?;
    let created = state
        .db
        .pois
        .create(poi)
        .await
        .or_fail("Error creating POI")?;
    Ok(ApiResponse::created("POI created successfully", created))
}

/// Partially update a POI. `x` and `y` move the POI and must come together.
#[utoipa::path(patch, path = "/pois/{poi_id}", tag = "POIs",
    params(("poi_id" = i64, Path, description = "POI id")),
    request_body = UpdatePoiRequest,
    responses(
        (status = 200, description = "Updated", body = Poi),
        (status = 400, description = "Invalid or empty update"),
        (status = 404, description = "POI not found")))]
pub async fn update_poi(
    State(state): State<AppState>,
    ApiPath(raw_id): ApiPath<String>,
    ApiJson(req): ApiJson<UpdatePoiRequest>,
) -> ApiResult<Poi> {
    let poi_id = poi_id(&raw_id)?;
    req.validate()?;
    let updated = state
        .db
        .pois
        .update(poi_id, req)
        .await
        .or_fail("Error updating POI")?
        .ok_or_else(poi_not_found)?;
    Ok(ApiResponse::ok("POI updated successfully", updated))
}

/// Attach a detail record to a POI.
#[utoipa::path(post, path = "/pois/{poi_id}/detail", tag = "POIs",
    params(("poi_id" = i64, Path, description = "POI id")),
    request_body = CreatePoiDetailRequest,
    responses(
        (status = 201, description = "Created", body = PoiDetail),
        (status = 400, description = "Invalid detail"),
        (status = 404, description = "POI not found")))]
pub async fn create_poi_detail(
    State(state): State<AppState>,
    ApiPath(raw_id): ApiPath<String>,
    ApiJson(req): ApiJson<CreatePoiDetailRequest>,
) -> ApiResult<PoiDetail> {
    let poi_id = poi_id(&raw_id)?;
    req.validate()?;
    let detail = state
        .db
        .pois
        .create_detail(poi_id, req)
        .await
        .or_fail("Error creating POI detail")?
        .ok_or_else(poi_not_found)?;
    Ok(ApiResponse::created("POI Detail created successfully", detail))
}
