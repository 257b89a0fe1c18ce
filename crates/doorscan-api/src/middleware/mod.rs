//! Request middleware for doorscan-api.

pub mod api_key;
pub mod security_headers;
pub mod trace_context;

pub use api_key::{require_api_key, ApiKeys};
pub use security_headers::security_headers;
pub use trace_context::{parse_trace_header, CloudTraceSpan};
