//! Repository traits for doorscan resources.
//!
//! The HTTP layer only talks to these traits; `doorscan-db` provides the
//! PostgreSQL implementations.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;
use crate::query::{ListQuery, RadiusQuery};

// =============================================================================
// BUILDINGS
// =============================================================================

#[async_trait]
pub trait BuildingRepository: Send + Sync {
    /// List buildings, optionally filtered by `bldg_nm`.
    async fn list(&self, query: &ListQuery) -> Result<Vec<Building>>;

    /// Fetch one building.
    async fn get(&self, bldg_id: i64) -> Result<Option<Building>>;

    /// Buildings whose geometry lies within `radius_m` of the query point,
    /// nearest first.
    async fn within_radius(&self, query: &RadiusQuery) -> Result<Vec<NearbyBuilding>>;

    /// Insert a building and return the stored row.
    async fn create(&self, building: NewBuilding) -> Result<Building>;

    /// Apply a partial update. Returns `None` when the building does not exist.
    async fn update(&self, bldg_id: i64, updates: UpdateBuildingRequest)
        -> Result<Option<Building>>;
}

// =============================================================================
// POIS
// =============================================================================

#[async_trait]
pub trait PoiRepository: Send + Sync {
    /// List POIs, optionally filtered by `poi_nm`.
    async fn list(&self, query: &ListQuery) -> Result<Vec<Poi>>;

    async fn get(&self, poi_id: i64) -> Result<Option<Poi>>;

    /// POIs located in a building.
    async fn list_by_building(&self, bldg_id: i64) -> Result<Vec<Poi>>;

    /// POIs within `radius_m` of the query point, nearest first.
    async fn within_radius(&self, query: &RadiusQuery) -> Result<Vec<NearbyPoi>>;

    async fn create(&self, poi: NewPoi) -> Result<Poi>;

    /// Apply a partial update. Returns `None` when the POI does not exist.
    async fn update(&self, poi_id: i64, updates: UpdatePoiRequest) -> Result<Option<Poi>>;

    /// Accessibility / entrance records collected for a POI.
    async fn list_details(&self, poi_id: i64) -> Result<Vec<PoiDetail>>;

    /// Attach a detail record. Returns `None` when the POI does not exist.
    async fn create_detail(
        &self,
        poi_id: i64,
        detail: CreatePoiDetailRequest,
    ) -> Result<Option<PoiDetail>>;
}

// =============================================================================
// USERS
// =============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// List users with their group, optionally filtered by `user_nm`.
    async fn list(&self, query: &ListQuery) -> Result<Vec<User>>;

    async fn get_by_uid(&self, user_uid: &str) -> Result<Option<User>>;

    /// Insert a user. A duplicate `user_uid` yields `Error::Conflict`.
    async fn create(&self, user: NewUser) -> Result<User>;

    /// Apply a partial update. Returns `None` when the user does not exist.
    async fn update_by_uid(&self, user_uid: &str, updates: UserUpdates) -> Result<Option<User>>;
}

// =============================================================================
// USER GROUPS
// =============================================================================

#[async_trait]
pub trait UserGroupRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<UserGroup>>;

    /// Case-insensitive exact match on `user_group_cd`.
    async fn get_by_code(&self, user_group_cd: &str) -> Result<Option<UserGroup>>;

    /// Insert a group. An existing code (any case) yields `Error::Conflict`.
    async fn create(&self, group: NewUserGroup) -> Result<UserGroup>;
}
