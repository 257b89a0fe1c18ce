//! # doorscan-api
//!
//! HTTP API for doorscan: buildings, POIs, users and user groups stored in
//! PostGIS, plus public file uploads to Google Cloud Storage.
//!
//! The binary (`src/main.rs`) wires configuration, logging and the database
//! pool; everything needed to build the router lives here so integration
//! tests can drive it in-process.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use doorscan_core::defaults::REQUEST_BODY_LIMIT_BYTES;
use doorscan_db::Database;

pub mod config;
pub mod error;
pub mod handlers;
pub mod metadata;
pub mod middleware;
pub mod storage;
pub mod telemetry;

pub use config::ServerConfig;
pub use error::{ApiError, ApiResponse, ApiResult};
pub use middleware::ApiKeys;
pub use storage::{GcsObjectStore, MemoryObjectStore, ObjectStore};

use handlers::{buildings, files, pois, system, user_groups, users};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub api_keys: Arc<ApiKeys>,
    pub storage: Arc<dyn ObjectStore>,
}

// =============================================================================
// REQUEST ID (UUIDv7)
// =============================================================================

/// Generates time-ordered UUIDv7 request correlation IDs.
#[derive(Clone, Default)]
pub struct MakeRequestUuidV7;

impl MakeRequestId for MakeRequestUuidV7 {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::now_v7().to_string().parse().ok()?;
        Some(RequestId::new(id))
    }
}

// =============================================================================
// CORS
// =============================================================================

/// Parse a comma-separated `ALLOWED_ORIGINS` value. Invalid entries are
/// skipped with a warning; an empty value allows no cross-origin callers.
///
/// ```text
/// ALLOWED_ORIGINS=https://doorscan.lbstech.net,http://localhost:3000
/// ```
pub fn parse_allowed_origins(origins: &str) -> Vec<HeaderValue> {
    origins
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

fn cors_layer(allowed_origins: Option<&str>) -> CorsLayer {
    let origins = parse_allowed_origins(allowed_origins.unwrap_or_default());
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(middleware::api_key::API_KEY_HEADER),
        ])
        .max_age(std::time::Duration::from_secs(3600))
}

// =============================================================================
// OPENAPI
// =============================================================================

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Doorscan API",
        description = "Buildings, points of interest and entrance data for the doorscan collector apps"
    ),
    paths(
        system::root,
        system::health_check,
        buildings::list_buildings,
        buildings::buildings_within_radius,
        buildings::get_building,
        buildings::create_building,
        buildings::update_building,
        pois::list_pois,
        pois::pois_within_radius,
        pois::get_poi,
        pois::pois_by_building,
        pois::get_poi_details,
        pois::create_poi,
        pois::update_poi,
        pois::create_poi_detail,
        users::list_users,
        users::get_user,
        users::create_user,
        users::update_user,
        user_groups::list_user_groups,
        user_groups::get_user_group,
        user_groups::create_user_group,
        files::upload_files,
    ),
    components(schemas(
        doorscan_core::Building,
        doorscan_core::NearbyBuilding,
        doorscan_core::CreateBuildingRequest,
        doorscan_core::UpdateBuildingRequest,
        doorscan_core::Poi,
        doorscan_core::NearbyPoi,
        doorscan_core::CreatePoiRequest,
        doorscan_core::UpdatePoiRequest,
        doorscan_core::PoiDetail,
        doorscan_core::CreatePoiDetailRequest,
        doorscan_core::User,
        doorscan_core::CreateUserRequest,
        doorscan_core::UpdateUserRequest,
        doorscan_core::UserGroup,
        doorscan_core::CreateUserGroupRequest,
        system::HealthStatus,
    )),
    tags(
        (name = "Buildings", description = "Building footprints and radius search"),
        (name = "POIs", description = "Points of interest and entrance details"),
        (name = "Users", description = "Collector app users"),
        (name = "User groups", description = "Teams users join by code"),
        (name = "Files", description = "Public file uploads"),
        (name = "System", description = "Banner and health checks")
    )
)]
pub struct ApiDoc;

// =============================================================================
// ROUTER
// =============================================================================

/// Build the application router.
///
/// `/health` and the Swagger UI under `/docs` are public; every other route
/// requires an `x-api-key`.
pub fn build_router(state: AppState, project_id: &str, allowed_origins: Option<&str>) -> Router {
    let protected = Router::new()
        .route("/", get(system::root))
        // Buildings
        .route(
            "/buildings",
            get(buildings::list_buildings).post(buildings::create_building),
        )
        .route("/buildings/map", get(buildings::buildings_within_radius))
        .route(
            "/buildings/:bldg_id",
            get(buildings::get_building).patch(buildings::update_building),
        )
        // POIs (one parameter name per segment position)
        .route("/pois", get(pois::list_pois).post(pois::create_poi))
        .route("/pois/map", get(pois::pois_within_radius))
        .route("/pois/:id", get(pois::get_poi).patch(pois::update_poi))
        .route("/pois/:id/building", get(pois::pois_by_building))
        .route(
            "/pois/:id/detail",
            get(pois::get_poi_details).post(pois::create_poi_detail),
        )
        // Users
        .route("/users", get(users::list_users).post(users::create_user))
        .route(
            "/users/:user_uid",
            get(users::get_user).patch(users::update_user),
        )
        // User groups
        .route(
            "/usergroup",
            get(user_groups::list_user_groups).post(user_groups::create_user_group),
        )
        .route("/usergroup/:user_group_cd", get(user_groups::get_user_group))
        // Files
        .route("/files", post(files::upload_files))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_api_key,
        ));

    let public = Router::new()
        .route("/health", get(system::health_check))
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http().make_span_with(middleware::CloudTraceSpan::new(project_id)))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuidV7))
        .layer(cors_layer(allowed_origins))
        // Extractor limit off; the tower limit below bounds every body.
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(REQUEST_BODY_LIMIT_BYTES))
        .layer(CatchPanicLayer::new())
        .with_state(state)
}
