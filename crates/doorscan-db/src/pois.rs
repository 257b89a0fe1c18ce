//! POI and POI detail repository implementation.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::{debug, instrument};

use doorscan_core::{
    defaults::SRID, CreatePoiDetailRequest, Error, ListQuery, NearbyPoi, NewPoi, Poi, PoiDetail,
    PoiRepository, RadiusQuery, Result, UpdatePoiRequest,
};

use crate::escape_like;
use crate::update_builder::{SqlValue, UpdateBuilder};

const POI_COLUMNS: &str = "poi_id, bldg_id, poi_nm, lotno_addr, road_nm_addr, ctgry_nm, phone, \
     origin_id, origin_cd, ST_X(poi_geom) AS x, ST_Y(poi_geom) AS y, crt_dt, mdfcn_dt";

const POI_DETAIL_COLUMNS: &str = "poi_dtl_id, poi_id, user_id, acsbl_cd, \
     ST_X(entrc_geom) AS x, ST_Y(entrc_geom) AS y, entrc_data, fclt_data, out_yn, vps_acc, \
     crt_dt, mdfcn_dt";

/// PostgreSQL implementation of PoiRepository.
#[derive(Clone)]
pub struct PgPoiRepository {
    pool: Pool<Postgres>,
}

impl PgPoiRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PoiRepository for PgPoiRepository {
    #[instrument(skip(self), fields(subsystem = "db", component = "pois", op = "list"))]
    async fn list(&self, query: &ListQuery) -> Result<Vec<Poi>> {
        let start = Instant::now();
        let sql = format!(
            "SELECT {POI_COLUMNS} FROM kor3.poi \
             WHERE ($1::text IS NULL OR poi_nm ILIKE $1 ESCAPE '\\') \
             ORDER BY poi_id \
             LIMIT $2 OFFSET $3"
        );
        let pattern = query
            .name
            .as_deref()
            .map(|name| format!("%{}%", escape_like(name)));

        let rows = sqlx::query_as::<_, Poi>(&sql)
            .bind(pattern)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            result_count = rows.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Listed POIs"
        );
        Ok(rows)
    }

    #[instrument(skip(self), fields(subsystem = "db", component = "pois", op = "get"))]
    async fn get(&self, poi_id: i64) -> Result<Option<Poi>> {
        let sql = format!("SELECT {POI_COLUMNS} FROM kor3.poi WHERE poi_id = $1");
        sqlx::query_as::<_, Poi>(&sql)
            .bind(poi_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }

    #[instrument(
        skip(self),
        fields(subsystem = "db", component = "pois", op = "list_by_building")
    )]
    async fn list_by_building(&self, bldg_id: i64) -> Result<Vec<Poi>> {
        let sql = format!("SELECT {POI_COLUMNS} FROM kor3.poi WHERE bldg_id = $1 ORDER BY poi_id");
        let rows = sqlx::query_as::<_, Poi>(&sql)
            .bind(bldg_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(result_count = rows.len(), "Listed POIs for building");
        Ok(rows)
    }

    #[instrument(
        skip(self),
        fields(
            subsystem = "db",
            component = "pois",
            op = "within_radius",
            radius_m = query.radius_m
        )
    )]
    async fn within_radius(&self, query: &RadiusQuery) -> Result<Vec<NearbyPoi>> {
        let start = Instant::now();
        let sql = format!(
            "WITH origin AS (
                SELECT ST_SetSRID(ST_MakePoint($1, $2), {SRID})::geography AS g
             )
             SELECT {POI_COLUMNS},
                    ST_Distance(poi_geom::geography, origin.g) AS distance_m
             FROM kor3.poi, origin
             WHERE poi_geom IS NOT NULL
               AND ST_DWithin(poi_geom::geography, origin.g, $3)
             ORDER BY distance_m, poi_id
             LIMIT $4"
        );

        let rows = sqlx::query_as::<_, NearbyPoi>(&sql)
            .bind(query.x)
            .bind(query.y)
            .bind(query.radius_m)
            .bind(query.limit)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            result_count = rows.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Radius lookup complete"
        );
        Ok(rows)
    }

    #[instrument(skip(self, poi), fields(subsystem = "db", component = "pois", op = "create"))]
    async fn create(&self, poi: NewPoi) -> Result<Poi> {
        let sql = format!(
            "WITH inserted AS (
                INSERT INTO kor3.poi (
                    bldg_id, poi_nm, lotno_addr, road_nm_addr, ctgry_nm, phone,
                    origin_id, origin_cd, poi_geom
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8,
                        ST_SetSRID(ST_MakePoint($9, $10), {SRID}))
                RETURNING *
             )
             SELECT {POI_COLUMNS} FROM inserted"
        );

        let row = sqlx::query_as::<_, Poi>(&sql)
            .bind(poi.bldg_id)
            .bind(&poi.poi_nm)
            .bind(&poi.lotno_addr)
            .bind(&poi.road_nm_addr)
            .bind(&poi.ctgry_nm)
            .bind(&poi.phone)
            .bind(poi.origin_id)
            .bind(&poi.origin_cd)
            .bind(poi.point.x)
            .bind(poi.point.y)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(poi_id = row.poi_id, "POI created");
        Ok(row)
    }

    #[instrument(
        skip(self, updates),
        fields(subsystem = "db", component = "pois", op = "update")
    )]
    async fn update(&self, poi_id: i64, updates: UpdatePoiRequest) -> Result<Option<Poi>> {
        let point = updates.validate()?;

        let mut builder = UpdateBuilder::new("kor3.poi", "poi_id", SqlValue::BigInt(poi_id));
        builder
            .set("bldg_id", updates.bldg_id.map(SqlValue::BigInt))
            .set("poi_nm", updates.poi_nm.map(SqlValue::Text))
            .set("lotno_addr", updates.lotno_addr.map(SqlValue::Text))
            .set("road_nm_addr", updates.road_nm_addr.map(SqlValue::Text))
            .set("ctgry_nm", updates.ctgry_nm.map(SqlValue::Text))
            .set("phone", updates.phone.map(SqlValue::Text))
            .set("origin_id", updates.origin_id.map(SqlValue::BigInt))
            .set("origin_cd", updates.origin_cd.map(SqlValue::Text));
        if let Some(point) = point {
            builder.set_expr(
                "poi_geom",
                &format!("ST_SetSRID(ST_MakePoint(?, ?), {SRID})"),
                vec![SqlValue::Float(point.x), SqlValue::Float(point.y)],
            );
        }

        let Some(update_sql) = builder.sql() else {
            return Err(Error::InvalidInput("No valid updates provided.".to_string()));
        };
        let sql = format!("WITH updated AS ({update_sql}) SELECT {POI_COLUMNS} FROM updated");

        let row = builder
            .bind(sqlx::query_as::<_, Poi>(&sql))
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(updated = row.is_some(), "POI update applied");
        Ok(row)
    }

    #[instrument(
        skip(self),
        fields(subsystem = "db", component = "pois", op = "list_details")
    )]
    async fn list_details(&self, poi_id: i64) -> Result<Vec<PoiDetail>> {
        let sql = format!(
            "SELECT {POI_DETAIL_COLUMNS} FROM kor3.poi_dtl WHERE poi_id = $1 ORDER BY poi_dtl_id"
        );
        let rows = sqlx::query_as::<_, PoiDetail>(&sql)
            .bind(poi_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(result_count = rows.len(), "Listed POI details");
        Ok(rows)
    }

    #[instrument(
        skip(self, detail),
        fields(subsystem = "db", component = "pois", op = "create_detail")
    )]
    async fn create_detail(
        &self,
        poi_id: i64,
        detail: CreatePoiDetailRequest,
    ) -> Result<Option<PoiDetail>> {
        let entrance = detail.validate()?;

        // ST_MakePoint is strict, so a missing entrance yields a NULL geometry.
        // The SELECT ... WHERE EXISTS form inserts nothing for an unknown POI.
        let sql = format!(
            "WITH inserted AS (
                INSERT INTO kor3.poi_dtl (
                    poi_id, user_id, acsbl_cd, entrc_geom, entrc_data, fclt_data, out_yn, vps_acc
                )
                SELECT $1, $2, $3,
                       ST_SetSRID(ST_MakePoint($4::float8, $5::float8), {SRID}),
                       $6, $7, $8, $9
                WHERE EXISTS (SELECT 1 FROM kor3.poi WHERE poi_id = $1)
                RETURNING *
             )
             SELECT {POI_DETAIL_COLUMNS} FROM inserted"
        );

        let row = sqlx::query_as::<_, PoiDetail>(&sql)
            .bind(poi_id)
            .bind(detail.user_id)
            .bind(detail.acsbl_cd)
            .bind(entrance.map(|p| p.x))
            .bind(entrance.map(|p| p.y))
            .bind(&detail.entrc_data)
            .bind(&detail.fclt_data)
            .bind(detail.out_yn)
            .bind(&detail.vps_acc)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            created = row.is_some(),
            poi_dtl_id = ?row.as_ref().map(|d| d.poi_dtl_id),
            "POI detail insert"
        );
        Ok(row)
    }
}
