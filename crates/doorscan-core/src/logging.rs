//! Structured logging schema and field name constants for doorscan.
//!
//! Events carry the same structured fields in every crate so Cloud Logging
//! queries can filter on them across subsystems:
//!
//! | Field | Meaning |
//! |-------|---------|
//! | `subsystem` | `api`, `db`, `storage`, `metadata` |
//! | `component` | `buildings`, `pois`, `users`, `user_groups`, `pool`, `gcs` |
//! | `op` | logical operation (`list`, `create`, `within_radius`, ...) |
//! | `duration_ms` | wall-clock duration |
//! | `result_count` | rows returned |
//!
//! Names that are not valid Rust identifiers, or that are shared with
//! middleware, are defined below.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Failed database or storage operation, returned as 5xx |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), writes |
//! | DEBUG | Query parameters, row counts |
//! | TRACE | Per-row data |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the `x-request-id` header (UUIDv7).
pub const REQUEST_ID: &str = "request_id";

/// Cloud Logging trace correlation key.
/// Value format: `projects/{project}/traces/{trace_id}`.
pub const CLOUD_TRACE: &str = "logging.googleapis.com/trace";
