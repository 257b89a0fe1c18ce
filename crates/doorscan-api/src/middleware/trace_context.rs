//! Request spans correlated with Cloud Trace.
//!
//! Cloud Run forwards `X-Cloud-Trace-Context: TRACE_ID/SPAN_ID;o=1`. Log
//! entries that carry `logging.googleapis.com/trace` set to
//! `projects/{project}/traces/{TRACE_ID}` are grouped under the request in
//! the Logs Explorer.

use std::sync::Arc;

use axum::http::Request;
use tower_http::request_id::RequestId;
use tower_http::trace::MakeSpan;
use tracing::Span;

use doorscan_core::logging::{CLOUD_TRACE, REQUEST_ID};

pub const CLOUD_TRACE_HEADER: &str = "x-cloud-trace-context";

/// The trace id part of an `X-Cloud-Trace-Context` value.
pub fn parse_trace_header(value: &str) -> Option<&str> {
    let trace = value.split('/').next()?.trim();
    (!trace.is_empty()).then_some(trace)
}

/// `MakeSpan` for `TraceLayer` that records the request id and the Cloud
/// Trace resource name on the request span.
#[derive(Debug, Clone)]
pub struct CloudTraceSpan {
    project_id: Arc<str>,
}

impl CloudTraceSpan {
    pub fn new(project_id: impl Into<Arc<str>>) -> Self {
        Self {
            project_id: project_id.into(),
        }
    }

    pub fn trace_resource<B>(&self, request: &Request<B>) -> Option<String> {
        let header = request.headers().get(CLOUD_TRACE_HEADER)?.to_str().ok()?;
        let trace = parse_trace_header(header)?;
        Some(format!("projects/{}/traces/{}", self.project_id, trace))
    }
}

impl<B> MakeSpan<B> for CloudTraceSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .extensions()
            .get::<RequestId>()
            .and_then(|id| id.header_value().to_str().ok())
            .unwrap_or_default();
        let span = tracing::info_span!(
            "request",
            method = %request.method(),
            uri = %request.uri(),
            { REQUEST_ID } = %request_id,
            { CLOUD_TRACE } = tracing::field::Empty,
        );
        if let Some(trace) = self.trace_resource(request) {
            span.record(CLOUD_TRACE, trace.as_str());
        }
        span
    }
}
