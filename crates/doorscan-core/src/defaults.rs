//! Centralized default constants for doorscan.
//!
//! All crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// DATABASE
// =============================================================================

/// Spatial reference id of every stored geometry (WGS 84 lon/lat).
pub const SRID: i32 = 4326;

/// Group assigned to users created through the API.
pub const DEFAULT_USER_GROUP_ID: i64 = 1;

/// Default Postgres port for Cloud SQL connections.
pub const CLOUDSQL_PORT: u16 = 5432;

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for list endpoints.
pub const PAGE_LIMIT: i64 = 100;

/// Upper bound for `limit` on list endpoints.
pub const PAGE_LIMIT_MAX: i64 = 1000;

/// Default page offset.
pub const PAGE_OFFSET: i64 = 0;

// =============================================================================
// RADIUS QUERIES
// =============================================================================

/// Upper bound for `limit` on radius queries.
pub const RADIUS_LIMIT_MAX: i64 = 1000;

/// Largest accepted search radius in metres.
pub const RADIUS_MAX_METERS: f64 = 50_000.0;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port (Cloud Run contract).
pub const SERVER_PORT: u16 = 8080;

/// Default bind address.
pub const SERVER_HOST: &str = "0.0.0.0";

/// Maximum accepted request body (multipart uploads included).
pub const REQUEST_BODY_LIMIT_BYTES: usize = 32 * 1024 * 1024;

/// Banner returned by `GET /`.
pub const SERVER_BANNER: &str = "LBSTECH Cloud Run API Server";

// =============================================================================
// STORAGE
// =============================================================================

/// Bucket used when `GCS_BUCKET_NAME` is unset.
pub const GCS_BUCKET: &str = "lbstech-cloud-run-test";

/// Public object URL prefix.
pub const GCS_PUBLIC_BASE_URL: &str = "https://storage.googleapis.com";

/// Host of the GCE metadata server when `GCE_METADATA_HOST` is unset.
pub const METADATA_HOST: &str = "metadata.google.internal";

/// Project id used for log correlation when none can be discovered.
pub const FALLBACK_PROJECT_ID: &str = "default";
