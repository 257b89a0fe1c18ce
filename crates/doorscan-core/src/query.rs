//! Query-string parsing shared by every resource: path ids, list filters and
//! radius lookups.
//!
//! Query parameters arrive as raw strings so malformed numbers surface as the
//! same 400 message as missing ones instead of an extractor rejection.

use serde::Deserialize;

use crate::defaults::{
    PAGE_LIMIT, PAGE_LIMIT_MAX, PAGE_OFFSET, RADIUS_LIMIT_MAX, RADIUS_MAX_METERS,
};
use crate::error::{Error, Result};
use crate::models::{is_lon_lat, COORDINATE_RANGE_MESSAGE};

/// Parse a numeric path id. Zero, negatives and non-numbers are rejected.
pub fn parse_positive_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v != 0.0)
}

// =============================================================================
// RADIUS
// =============================================================================

/// Raw `?x=&y=&radius=&limit=` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RadiusParams {
    pub x: Option<String>,
    pub y: Option<String>,
    pub radius: Option<String>,
    pub limit: Option<String>,
}

/// A validated radius lookup around a WGS 84 point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadiusQuery {
    /// Longitude
    pub x: f64,
    /// Latitude
    pub y: f64,
    /// Search radius in metres
    pub radius_m: f64,
    pub limit: i64,
}

impl RadiusQuery {
    pub const REQUIRED_MESSAGE: &'static str =
        "All parameters (x, y, radius, limit) are required";

    /// Validate raw parameters. Every value must be present, numeric and
    /// non-zero; `limit` must be a positive integer and is capped at
    /// [`RADIUS_LIMIT_MAX`].
    pub fn parse(params: &RadiusParams) -> Result<Self> {
        let x = parse_number(params.x.as_deref());
        let y = parse_number(params.y.as_deref());
        let radius = parse_number(params.radius.as_deref());
        let limit = params
            .limit
            .as_deref()
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|v| *v > 0);

        let (Some(x), Some(y), Some(radius_m), Some(limit)) = (x, y, radius, limit) else {
            return Err(Error::InvalidInput(Self::REQUIRED_MESSAGE.to_string()));
        };

        if !is_lon_lat(x, y) {
            return Err(Error::InvalidInput(COORDINATE_RANGE_MESSAGE.to_string()));
        }
        if radius_m < 0.0 || radius_m > RADIUS_MAX_METERS {
            return Err(Error::InvalidInput(format!(
                "radius must be between 0 and {} metres",
                RADIUS_MAX_METERS
            )));
        }

        Ok(Self {
            x,
            y,
            radius_m,
            limit: limit.min(RADIUS_LIMIT_MAX),
        })
    }
}

// =============================================================================
// LIST
// =============================================================================

/// A name filter plus paging, shared by every list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    /// Case-insensitive substring match; `None` lists everything.
    pub name: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            name: None,
            limit: PAGE_LIMIT,
            offset: PAGE_OFFSET,
        }
    }
}

impl ListQuery {
    /// Build from raw values. Blank names mean "no filter"; unparseable or
    /// out-of-range paging values fall back to the defaults.
    pub fn new(name: Option<String>, limit: Option<&str>, offset: Option<&str>) -> Self {
        let name = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
        let limit = limit
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|v| *v > 0)
            .map(|v| v.min(PAGE_LIMIT_MAX))
            .unwrap_or(PAGE_LIMIT);
        let offset = offset
            .and_then(|v| v.trim().parse::<i64>().ok())
            .filter(|v| *v >= 0)
            .unwrap_or(PAGE_OFFSET);
        Self {
            name,
            limit,
            offset,
        }
    }

    pub fn named(name: &str) -> Self {
        Self::new(Some(name.to_string()), None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(x: &str, y: &str, radius: &str, limit: &str) -> RadiusParams {
        RadiusParams {
            x: Some(x.to_string()),
            y: Some(y.to_string()),
            radius: Some(radius.to_string()),
            limit: Some(limit.to_string()),
        }
    }

    #[test]
    fn test_parse_positive_id() {
        assert_eq!(parse_positive_id("42"), Some(42));
        assert_eq!(parse_positive_id(" 7 "), Some(7));
        assert_eq!(parse_positive_id("0"), None);
        assert_eq!(parse_positive_id("-3"), None);
        assert_eq!(parse_positive_id("abc"), None);
        assert_eq!(parse_positive_id(""), None);
    }

    #[test]
    fn test_radius_query_parses_valid_params() {
        let q = RadiusQuery::parse(&params("126.978", "37.566", "250", "20")).unwrap();
        assert_eq!(q.x, 126.978);
        assert_eq!(q.y, 37.566);
        assert_eq!(q.radius_m, 250.0);
        assert_eq!(q.limit, 20);
    }

    #[test]
    fn test_radius_query_requires_every_param() {
        let mut p = params("126.978", "37.566", "250", "20");
        p.limit = None;
        let err = RadiusQuery::parse(&p).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Invalid input: {}", RadiusQuery::REQUIRED_MESSAGE)
        );
    }

    #[test]
    fn test_radius_query_treats_zero_and_garbage_as_missing() {
        assert!(RadiusQuery::parse(&params("0", "37.5", "100", "10")).is_err());
        assert!(RadiusQuery::parse(&params("127", "abc", "100", "10")).is_err());
        assert!(RadiusQuery::parse(&params("127", "37.5", "NaN", "10")).is_err());
        assert!(RadiusQuery::parse(&params("127", "37.5", "100", "1.5")).is_err());
    }

    #[test]
    fn test_radius_query_bounds() {
        assert!(RadiusQuery::parse(&params("190", "37.5", "100", "10")).is_err());
        assert!(RadiusQuery::parse(&params("127", "95", "100", "10")).is_err());
        assert!(RadiusQuery::parse(&params("127", "37.5", "-5", "10")).is_err());
        assert!(RadiusQuery::parse(&params("127", "37.5", "1000000", "10")).is_err());
    }

    #[test]
    fn test_radius_query_caps_limit() {
        let q = RadiusQuery::parse(&params("127", "37.5", "100", "999999")).unwrap();
        assert_eq!(q.limit, RADIUS_LIMIT_MAX);
    }

    #[test]
    fn test_list_query_defaults() {
        let q = ListQuery::new(None, None, None);
        assert_eq!(q, ListQuery::default());

        let q = ListQuery::new(Some("   ".into()), Some("abc"), Some("-1"));
        assert_eq!(q.name, None);
        assert_eq!(q.limit, PAGE_LIMIT);
        assert_eq!(q.offset, PAGE_OFFSET);
    }

    #[test]
    fn test_list_query_caps_limit() {
        let q = ListQuery::new(Some(" hall ".into()), Some("50000"), Some("20"));
        assert_eq!(q.name.as_deref(), Some("hall"));
        assert_eq!(q.limit, PAGE_LIMIT_MAX);
        assert_eq!(q.offset, 20);
    }
}
