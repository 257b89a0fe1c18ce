//! Core data models for doorscan.
//!
//! Row types mirror the `kor3` tables column for column (the abbreviated
//! column names are part of the public JSON contract), request types carry
//! the raw, optional fields a client may send and validate into the shapes
//! the repositories accept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::defaults::DEFAULT_USER_GROUP_ID;
use crate::error::{Error, Result};

// =============================================================================
// SHARED
// =============================================================================

/// A WGS 84 coordinate pair (`x` = longitude, `y` = latitude).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

pub(crate) const COORDINATE_RANGE_MESSAGE: &str =
    "x must be a longitude in [-180, 180] and y a latitude in [-90, 90]";

/// True when `(x, y)` is a valid WGS 84 longitude/latitude. Rows outside
/// this range cannot be cast to `geography`.
pub fn is_lon_lat(x: f64, y: f64) -> bool {
    (-180.0..=180.0).contains(&x) && (-90.0..=90.0).contains(&y)
}

/// Combine an optional `x`/`y` pair, rejecting a half-specified point.
pub fn paired_point(x: Option<f64>, y: Option<f64>) -> Result<Option<Point>> {
    match (x, y) {
        (Some(x), Some(y)) if is_lon_lat(x, y) => Ok(Some(Point { x, y })),
        (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Err(Error::InvalidInput(
            COORDINATE_RANGE_MESSAGE.to_string(),
        )),
        (None, None) => Ok(None),
        (Some(_), Some(_)) => Err(Error::InvalidInput(
            "x and y must be finite numbers".to_string(),
        )),
        _ => Err(Error::InvalidInput(
            "x and y must be provided together".to_string(),
        )),
    }
}

fn required_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn reject_blank(field: &str, value: &Option<String>) -> Result<()> {
    match value {
        Some(v) if v.trim().is_empty() => Err(Error::InvalidInput(format!(
            "{} must not be empty",
            field
        ))),
        _ => Ok(()),
    }
}

// =============================================================================
// BUILDING TYPES
// =============================================================================

/// A building row (`kor3.BLDG`) with its geometry rendered as WKT.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct Building {
    pub bldg_id: i64,
    pub bldg_sn: Option<String>,
    pub rds_sn: Option<String>,
    pub sig_cd: Option<String>,
    pub emd_cd: Option<String>,
    pub lotno_addr: Option<String>,
    pub road_nm_addr: Option<String>,
    pub bldg_nm: Option<String>,
    /// Well-Known Text representation of `bldg_geom`
    pub wkt: Option<String>,
    /// Floors above ground
    pub gro_flo_co: Option<i32>,
    /// Floors below ground
    pub und_flo_co: Option<i32>,
    pub bdtyp_cd: Option<String>,
    pub crt_dt: Option<DateTime<Utc>>,
    pub mdfcn_dt: Option<DateTime<Utc>>,
}

/// A building returned by a radius query.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct NearbyBuilding {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub building: Building,
    /// Longitude of a point guaranteed to lie on the building geometry
    pub x: f64,
    /// Latitude of a point guaranteed to lie on the building geometry
    pub y: f64,
    /// Geodesic distance from the query point in metres
    pub distance_m: f64,
}

/// Body of `POST /buildings`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct CreateBuildingRequest {
    pub bldg_sn: Option<String>,
    pub rds_sn: Option<String>,
    pub sig_cd: Option<String>,
    pub emd_cd: Option<String>,
    pub lotno_addr: Option<String>,
    pub road_nm_addr: Option<String>,
    pub bldg_nm: Option<String>,
    /// Geometry as WKT in SRID 4326
    pub wkt: Option<String>,
    pub gro_flo_co: Option<i32>,
    pub und_flo_co: Option<i32>,
    pub bdtyp_cd: Option<String>,
}

/// A validated building insert.
#[derive(Debug, Clone)]
pub struct NewBuilding {
    pub bldg_sn: Option<String>,
    pub rds_sn: Option<String>,
    pub sig_cd: Option<String>,
    pub emd_cd: Option<String>,
    pub lotno_addr: Option<String>,
    pub road_nm_addr: Option<String>,
    pub bldg_nm: String,
    pub wkt: String,
    pub gro_flo_co: Option<i32>,
    pub und_flo_co: Option<i32>,
    pub bdtyp_cd: Option<String>,
}

impl CreateBuildingRequest {
    pub fn validate(self) -> Result<NewBuilding> {
        let (Some(bldg_nm), Some(wkt)) = (required_text(self.bldg_nm), required_text(self.wkt))
        else {
            return Err(Error::InvalidInput(
                "Missing required building fields. building fields(bldg_nm, wkt) are required"
                    .to_string(),
            ));
        };
        check_floor_counts(self.gro_flo_co, self.und_flo_co)?;
        Ok(NewBuilding {
            bldg_sn: self.bldg_sn,
            rds_sn: self.rds_sn,
            sig_cd: self.sig_cd,
            emd_cd: self.emd_cd,
            lotno_addr: self.lotno_addr,
            road_nm_addr: self.road_nm_addr,
            bldg_nm,
            wkt,
            gro_flo_co: self.gro_flo_co,
            und_flo_co: self.und_flo_co,
            bdtyp_cd: self.bdtyp_cd,
        })
    }
}

/// Body of `PATCH /buildings/{bldg_id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateBuildingRequest {
    pub bldg_sn: Option<String>,
    pub rds_sn: Option<String>,
    pub sig_cd: Option<String>,
    pub emd_cd: Option<String>,
    pub lotno_addr: Option<String>,
    pub road_nm_addr: Option<String>,
    pub bldg_nm: Option<String>,
    pub wkt: Option<String>,
    pub gro_flo_co: Option<i32>,
    pub und_flo_co: Option<i32>,
    pub bdtyp_cd: Option<String>,
}

impl UpdateBuildingRequest {
    pub fn is_empty(&self) -> bool {
        self.bldg_sn.is_none()
            && self.rds_sn.is_none()
            && self.sig_cd.is_none()
            && self.emd_cd.is_none()
            && self.lotno_addr.is_none()
            && self.road_nm_addr.is_none()
            && self.bldg_nm.is_none()
            && self.wkt.is_none()
            && self.gro_flo_co.is_none()
            && self.und_flo_co.is_none()
            && self.bdtyp_cd.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(Error::InvalidInput("No valid updates provided.".to_string()));
        }
        reject_blank("bldg_nm", &self.bldg_nm)?;
        reject_blank("wkt", &self.wkt)?;
        check_floor_counts(self.gro_flo_co, self.und_flo_co)
    }
}

fn check_floor_counts(above: Option<i32>, below: Option<i32>) -> Result<()> {
    if above.is_some_and(|n| n < 0) || below.is_some_and(|n| n < 0) {
        return Err(Error::InvalidInput(
            "gro_flo_co and und_flo_co must not be negative".to_string(),
        ));
    }
    Ok(())
}

// =============================================================================
// POI TYPES
// =============================================================================

/// A point of interest row (`kor3.POI`) with its point split into `x`/`y`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct Poi {
    pub poi_id: i64,
    pub bldg_id: Option<i64>,
    pub poi_nm: Option<String>,
    pub lotno_addr: Option<String>,
    pub road_nm_addr: Option<String>,
    /// Category name
    pub ctgry_nm: Option<String>,
    pub phone: Option<String>,
    /// Identifier in the upstream data source
    pub origin_id: Option<i64>,
    /// Upstream data source code
    pub origin_cd: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub crt_dt: Option<DateTime<Utc>>,
    pub mdfcn_dt: Option<DateTime<Utc>>,
}

/// A POI returned by a radius query.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct NearbyPoi {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub poi: Poi,
    /// Geodesic distance from the query point in metres
    pub distance_m: f64,
}

/// Body of `POST /pois`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct CreatePoiRequest {
    pub bldg_id: Option<i64>,
    pub poi_nm: Option<String>,
    pub lotno_addr: Option<String>,
    pub road_nm_addr: Option<String>,
    pub ctgry_nm: Option<String>,
    pub phone: Option<String>,
    pub origin_id: Option<i64>,
    pub origin_cd: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

/// A validated POI insert.
#[derive(Debug, Clone)]
pub struct NewPoi {
    pub bldg_id: Option<i64>,
    pub poi_nm: String,
    pub lotno_addr: Option<String>,
    pub road_nm_addr: Option<String>,
    pub ctgry_nm: Option<String>,
    pub phone: Option<String>,
    pub origin_id: Option<i64>,
    pub origin_cd: Option<String>,
    pub point: Point,
}

impl CreatePoiRequest {
    pub fn validate(self) -> Result<NewPoi> {
        let missing = || {
            Error::InvalidInput(
                "Missing required POI fields. POI fields(poi_nm, x, y) are required".to_string(),
            )
        };
        let poi_nm = required_text(self.poi_nm).ok_or_else(missing)?;
        let point = paired_point(self.x, self.y)?.ok_or_else(missing)?;
        if self.bldg_id.is_some_and(|id| id <= 0) {
            return Err(Error::InvalidInput("bldg_id must be positive".to_string()));
        }
        Ok(NewPoi {
            bldg_id: self.bldg_id,
            poi_nm,
            lotno_addr: self.lotno_addr,
            road_nm_addr: self.road_nm_addr,
            ctgry_nm: self.ctgry_nm,
            phone: self.phone,
            origin_id: self.origin_id,
            origin_cd: self.origin_cd,
            point,
        })
    }
}

/// Body of `PATCH /pois/{poi_id}`. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdatePoiRequest {
    pub bldg_id: Option<i64>,
    pub poi_nm: Option<String>,
    pub lotno_addr: Option<String>,
    pub road_nm_addr: Option<String>,
    pub ctgry_nm: Option<String>,
    pub phone: Option<String>,
    pub origin_id: Option<i64>,
    pub origin_cd: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl UpdatePoiRequest {
    pub fn is_empty(&self) -> bool {
        self.bldg_id.is_none()
            && self.poi_nm.is_none()
            && self.lotno_addr.is_none()
            && self.road_nm_addr.is_none()
            && self.ctgry_nm.is_none()
            && self.phone.is_none()
            && self.origin_id.is_none()
            && self.origin_cd.is_none()
            && self.x.is_none()
            && self.y.is_none()
    }

    /// Validate and return the new location, if one was supplied.
    pub fn validate(&self) -> Result<Option<Point>> {
        if self.is_empty() {
            return Err(Error::InvalidInput("No valid updates provided.".to_string()));
        }
        reject_blank("poi_nm", &self.poi_nm)?;
        paired_point(self.x, self.y)
    }
}

/// Accessibility and entrance metadata attached to a POI (`kor3.POI_DTL`).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct PoiDetail {
    pub poi_dtl_id: i64,
    pub poi_id: i64,
    /// User who collected the record
    pub user_id: Option<i64>,
    /// Accessibility code
    pub acsbl_cd: Option<i32>,
    /// Entrance longitude
    pub x: Option<f64>,
    /// Entrance latitude
    pub y: Option<f64>,
    #[schema(value_type = Option<Object>)]
    pub entrc_data: Option<JsonValue>,
    #[schema(value_type = Option<Object>)]
    pub fclt_data: Option<JsonValue>,
    /// Entrance is outdoors
    pub out_yn: Option<bool>,
    /// Visual positioning accuracy payload
    #[schema(value_type = Option<Object>)]
    pub vps_acc: Option<JsonValue>,
    pub crt_dt: Option<DateTime<Utc>>,
    pub mdfcn_dt: Option<DateTime<Utc>>,
}

/// Body of `POST /pois/{poi_id}/detail`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct CreatePoiDetailRequest {
    pub user_id: Option<i64>,
    pub acsbl_cd: Option<i32>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    #[schema(value_type = Option<Object>)]
    pub entrc_data: Option<JsonValue>,
    #[schema(value_type = Option<Object>)]
    pub fclt_data: Option<JsonValue>,
    pub out_yn: Option<bool>,
    #[schema(value_type = Option<Object>)]
    pub vps_acc: Option<JsonValue>,
}

impl CreatePoiDetailRequest {
    /// Validate and return the entrance point, if one was supplied.
    pub fn validate(&self) -> Result<Option<Point>> {
        if self.user_id.is_some_and(|id| id <= 0) {
            return Err(Error::InvalidInput("user_id must be positive".to_string()));
        }
        paired_point(self.x, self.y)
    }
}

// =============================================================================
// USER TYPES
// =============================================================================

/// How a user signs in. Stored as `SMALLINT` and serialized as its number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(try_from = "i64", into = "i16")]
#[repr(i16)]
pub enum LoginType {
    Apple = 1,
    Google = 2,
    Kakao = 3,
}

impl LoginType {
    pub const INVALID_MESSAGE: &'static str =
        "Invalid user_lgn_type_cd. APPLE=1, GOOGLE=2, KAKAO=3";
}

impl TryFrom<i64> for LoginType {
    type Error = String;

    fn try_from(value: i64) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(LoginType::Apple),
            2 => Ok(LoginType::Google),
            3 => Ok(LoginType::Kakao),
            _ => Err(LoginType::INVALID_MESSAGE.to_string()),
        }
    }
}

impl From<LoginType> for i16 {
    fn from(value: LoginType) -> Self {
        value as i16
    }
}

/// A user row (`kor3.USER`) joined with its group.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct User {
    pub user_id: i64,
    pub user_group_id: i64,
    pub user_nm: String,
    /// APPLE=1, GOOGLE=2, KAKAO=3
    #[schema(value_type = i16)]
    pub user_lgn_type_cd: LoginType,
    pub eml_addr: String,
    /// External identity provider UID
    pub user_uid: String,
    pub user_group_nm: Option<String>,
    pub user_type_cd: Option<i32>,
    pub crt_dt: Option<DateTime<Utc>>,
    pub mdfcn_dt: Option<DateTime<Utc>>,
}

/// Body of `POST /users`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct CreateUserRequest {
    pub user_nm: Option<String>,
    pub user_lgn_type_cd: Option<i64>,
    pub eml_addr: Option<String>,
    pub user_uid: Option<String>,
}

/// A validated user insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_group_id: i64,
    pub user_nm: String,
    pub user_lgn_type_cd: LoginType,
    pub eml_addr: String,
    pub user_uid: String,
}

impl CreateUserRequest {
    pub fn validate(self) -> Result<NewUser> {
        let (Some(user_nm), Some(lgn_type), Some(eml_addr), Some(user_uid)) = (
            required_text(self.user_nm),
            self.user_lgn_type_cd,
            required_text(self.eml_addr),
            required_text(self.user_uid),
        ) else {
            return Err(Error::InvalidInput(
                "Missing required user fields. user fields(user_nm, user_lgn_type_cd, eml_addr, user_uid) are required"
                    .to_string(),
            ));
        };
        let user_lgn_type_cd = LoginType::try_from(lgn_type).map_err(Error::InvalidInput)?;
        Ok(NewUser {
            user_group_id: DEFAULT_USER_GROUP_ID,
            user_nm,
            user_lgn_type_cd,
            eml_addr,
            user_uid,
        })
    }
}

/// Body of `PATCH /users/{user_uid}`. Only these columns are writable.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    pub user_nm: Option<String>,
    pub user_lgn_type_cd: Option<i64>,
    pub eml_addr: Option<String>,
    pub user_group_id: Option<i64>,
}

/// A validated partial user update.
#[derive(Debug, Clone, Default)]
pub struct UserUpdates {
    pub user_nm: Option<String>,
    pub user_lgn_type_cd: Option<LoginType>,
    pub eml_addr: Option<String>,
    pub user_group_id: Option<i64>,
}

impl UpdateUserRequest {
    pub fn validate(self) -> Result<UserUpdates> {
        if self.user_nm.is_none()
            && self.user_lgn_type_cd.is_none()
            && self.eml_addr.is_none()
            && self.user_group_id.is_none()
        {
            return Err(Error::InvalidInput("No valid updates provided.".to_string()));
        }
        reject_blank("user_nm", &self.user_nm)?;
        reject_blank("eml_addr", &self.eml_addr)?;
        let user_lgn_type_cd = self
            .user_lgn_type_cd
            .map(LoginType::try_from)
            .transpose()
            .map_err(Error::InvalidInput)?;
        if self.user_group_id.is_some_and(|id| id <= 0) {
            return Err(Error::InvalidInput(
                "user_group_id must be positive".to_string(),
            ));
        }
        Ok(UserUpdates {
            user_nm: self.user_nm,
            user_lgn_type_cd,
            eml_addr: self.eml_addr,
            user_group_id: self.user_group_id,
        })
    }
}

// =============================================================================
// USER GROUP TYPES
// =============================================================================

/// A user group row (`kor3.USER_GROUP`). Groups nest through `up_user_group_id`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct UserGroup {
    pub user_group_id: i64,
    /// Parent group (None for the root group)
    pub up_user_group_id: Option<i64>,
    pub user_group_nm: String,
    pub user_type_cd: i32,
    /// Team code users enter to join the group
    pub user_group_cd: String,
}

/// Body of `POST /usergroup`.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
pub struct CreateUserGroupRequest {
    pub up_user_group_id: Option<i64>,
    pub user_group_nm: Option<String>,
    pub user_type_cd: Option<i32>,
    pub user_group_cd: Option<String>,
}

/// A validated user group insert.
#[derive(Debug, Clone)]
pub struct NewUserGroup {
    pub up_user_group_id: i64,
    pub user_group_nm: String,
    pub user_type_cd: i32,
    pub user_group_cd: String,
}

impl CreateUserGroupRequest {
    pub fn validate(self) -> Result<NewUserGroup> {
        match (
            self.up_user_group_id.filter(|id| *id > 0),
            required_text(self.user_group_nm),
            self.user_type_cd.filter(|cd| *cd != 0),
            required_text(self.user_group_cd),
        ) {
            (Some(up_user_group_id), Some(user_group_nm), Some(user_type_cd), Some(code)) => {
                Ok(NewUserGroup {
                    up_user_group_id,
                    user_group_nm,
                    user_type_cd,
                    user_group_cd: code.trim().to_string(),
                })
            }
            _ => Err(Error::InvalidInput(
                "All user group fields are required: up_user_group_id, user_group_nm, user_type_cd, user_group_cd"
                    .to_string(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paired_point_requires_both_coordinates() {
        assert_eq!(paired_point(None, None).unwrap(), None);
        assert_eq!(
            paired_point(Some(127.0), Some(37.5)).unwrap(),
            Some(Point { x: 127.0, y: 37.5 })
        );
        assert!(paired_point(Some(127.0), None).is_err());
        assert!(paired_point(None, Some(37.5)).is_err());
        assert!(paired_point(Some(f64::NAN), Some(37.5)).is_err());
    }

    #[test]
    fn test_paired_point_rejects_out_of_range_coordinates() {
        let err = paired_point(Some(10.0), Some(95.0)).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Invalid input: {}", COORDINATE_RANGE_MESSAGE)
        );
        assert!(paired_point(Some(-180.5), Some(0.0)).is_err());
        assert_eq!(
            paired_point(Some(180.0), Some(-90.0)).unwrap(),
            Some(Point { x: 180.0, y: -90.0 })
        );
    }

    #[test]
    fn test_login_type_serializes_as_number() {
        assert_eq!(serde_json::to_value(LoginType::Kakao).unwrap(), json!(3));
        let parsed: LoginType = serde_json::from_value(json!(2)).unwrap();
        assert_eq!(parsed, LoginType::Google);
        assert!(serde_json::from_value::<LoginType>(json!(4)).is_err());
    }

    #[test]
    fn test_create_user_missing_fields() {
        let req = CreateUserRequest {
            user_nm: Some("kim".into()),
            user_lgn_type_cd: Some(1),
            eml_addr: Some("  ".into()),
            user_uid: Some("uid-1".into()),
        };
        let err = req.validate().unwrap_err();
        assert!(err.to_string().contains("Missing required user fields"));
    }

    #[test]
    fn test_create_user_rejects_unknown_login_type() {
        let req = CreateUserRequest {
            user_nm: Some("kim".into()),
            user_lgn_type_cd: Some(9),
            eml_addr: Some("kim@example.com".into()),
            user_uid: Some("uid-1".into()),
        };
        match req.validate() {
            Err(Error::InvalidInput(msg)) => assert_eq!(msg, LoginType::INVALID_MESSAGE),
            other => panic!("expected invalid login type, got {:?}", other),
        }
    }

    #[test]
    fn test_create_user_joins_default_group() {
        let req = CreateUserRequest {
            user_nm: Some("kim".into()),
            user_lgn_type_cd: Some(3),
            eml_addr: Some("kim@example.com".into()),
            user_uid: Some("uid-1".into()),
        };
        let user = req.validate().unwrap();
        assert_eq!(user.user_group_id, DEFAULT_USER_GROUP_ID);
        assert_eq!(user.user_lgn_type_cd, LoginType::Kakao);
    }

    #[test]
    fn test_update_user_rejects_unknown_columns() {
        let body = json!({ "user_nm": "lee", "user_id": 1 });
        assert!(serde_json::from_value::<UpdateUserRequest>(body).is_err());
    }

    #[test]
    fn test_update_user_empty_body() {
        let req: UpdateUserRequest = serde_json::from_value(json!({})).unwrap();
        let err = req.validate().unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: No valid updates provided.");
    }

    #[test]
    fn test_update_user_validates_login_type() {
        let req: UpdateUserRequest =
            serde_json::from_value(json!({ "user_lgn_type_cd": 0 })).unwrap();
        assert!(req.validate().is_err());

        let req: UpdateUserRequest =
            serde_json::from_value(json!({ "user_lgn_type_cd": 1 })).unwrap();
        assert_eq!(
            req.validate().unwrap().user_lgn_type_cd,
            Some(LoginType::Apple)
        );
    }

    #[test]
    fn test_create_building_requires_name_and_geometry() {
        let req = CreateBuildingRequest {
            bldg_nm: Some("City Hall".into()),
            ..Default::default()
        };
        assert!(req.validate().is_err());

        let req = CreateBuildingRequest {
            bldg_nm: Some("City Hall".into()),
            wkt: Some("POINT(126.97 37.56)".into()),
            gro_flo_co: Some(13),
            ..Default::default()
        };
        let building = req.validate().unwrap();
        assert_eq!(building.bldg_nm, "City Hall");
        assert_eq!(building.gro_flo_co, Some(13));
    }

    #[test]
    fn test_create_building_rejects_negative_floors() {
        let req = CreateBuildingRequest {
            bldg_nm: Some("Tower".into()),
            wkt: Some("POINT(0 0)".into()),
            und_flo_co: Some(-2),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_update_building_blank_name() {
        let req = UpdateBuildingRequest {
            bldg_nm: Some("".into()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
        assert!(UpdateBuildingRequest::default().validate().is_err());
    }

    #[test]
    fn test_create_poi_requires_location() {
        let req = CreatePoiRequest {
            poi_nm: Some("Cafe".into()),
            x: Some(127.0),
            ..Default::default()
        };
        assert!(req.validate().is_err());

        let req = CreatePoiRequest {
            poi_nm: Some("Cafe".into()),
            x: Some(127.0),
            y: Some(37.5),
            bldg_id: Some(10),
            ..Default::default()
        };
        let poi = req.validate().unwrap();
        assert_eq!(poi.point, Point { x: 127.0, y: 37.5 });
        assert_eq!(poi.bldg_id, Some(10));
    }

    #[test]
    fn test_update_poi_half_point() {
        let req = UpdatePoiRequest {
            y: Some(37.0),
            ..Default::default()
        };
        assert!(req.validate().is_err());

        let req = UpdatePoiRequest {
            phone: Some("02-000-0000".into()),
            ..Default::default()
        };
        assert_eq!(req.validate().unwrap(), None);
    }

    #[test]
    fn test_poi_detail_entrance_point_optional() {
        let req = CreatePoiDetailRequest {
            out_yn: Some(true),
            entrc_data: Some(json!({ "door": "automatic" })),
            ..Default::default()
        };
        assert_eq!(req.validate().unwrap(), None);
    }

    #[test]
    fn test_create_user_group_requires_all_fields() {
        let req = CreateUserGroupRequest {
            up_user_group_id: Some(1),
            user_group_nm: Some("Field team".into()),
            user_type_cd: None,
            user_group_cd: Some("TEAM01".into()),
        };
        assert!(req.validate().is_err());

        let req = CreateUserGroupRequest {
            up_user_group_id: Some(1),
            user_group_nm: Some("Field team".into()),
            user_type_cd: Some(2),
            user_group_cd: Some(" TEAM01 ".into()),
        };
        assert_eq!(req.validate().unwrap().user_group_cd, "TEAM01");
    }

    #[test]
    fn test_nearby_building_flattens_on_the_wire() {
        let nearby = NearbyBuilding {
            building: Building {
                bldg_id: 1,
                bldg_sn: None,
                rds_sn: None,
                sig_cd: Some("11110".into()),
                emd_cd: None,
                lotno_addr: None,
                road_nm_addr: None,
                bldg_nm: Some("A".into()),
                wkt: None,
                gro_flo_co: None,
                und_flo_co: None,
                bdtyp_cd: None,
                crt_dt: None,
                mdfcn_dt: None,
            },
            x: 126.9,
            y: 37.5,
            distance_m: 12.5,
        };
        let value = serde_json::to_value(&nearby).unwrap();
        assert_eq!(value["bldg_id"], json!(1));
        assert_eq!(value["sig_cd"], json!("11110"));
        assert_eq!(value["distance_m"], json!(12.5));
        assert!(value.get("building").is_none());
    }
}
