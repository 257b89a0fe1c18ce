//! Building repository implementation.

use std::time::Instant;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::{debug, instrument};

use doorscan_core::{
    defaults::SRID, Building, BuildingRepository, Error, ListQuery, NearbyBuilding, NewBuilding,
    RadiusQuery, Result, UpdateBuildingRequest,
};

use crate::escape_like;
use crate::update_builder::{SqlValue, UpdateBuilder};

/// Column list shared by every building read. Geometry is rendered as WKT.
const BUILDING_COLUMNS: &str = "bldg_id, bldg_sn, rds_sn, sig_cd, emd_cd, lotno_addr, \
     road_nm_addr, bldg_nm, ST_AsText(bldg_geom) AS wkt, gro_flo_co, und_flo_co, bdtyp_cd, \
     crt_dt, mdfcn_dt";

/// PostgreSQL implementation of BuildingRepository.
#[derive(Clone)]
pub struct PgBuildingRepository {
    pool: Pool<Postgres>,
}

impl PgBuildingRepository {
    /// Create a new PgBuildingRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BuildingRepository for PgBuildingRepository {
    #[instrument(
        skip(self),
        fields(subsystem = "db", component = "buildings", op = "list")
    )]
    async fn list(&self, query: &ListQuery) -> Result<Vec<Building>> {
        let start = Instant::now();
        let sql = format!(
            "SELECT {BUILDING_COLUMNS} FROM kor3.bldg \
             WHERE ($1::text IS NULL OR bldg_nm ILIKE $1 ESCAPE '\\') \
             ORDER BY bldg_id \
             LIMIT $2 OFFSET $3"
        );
        let pattern = query
            .name
            .as_deref()
            .map(|name| format!("%{}%", escape_like(name)));

        let rows = sqlx::query_as::<_, Building>(&sql)
            .bind(pattern)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            result_count = rows.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Listed buildings"
        );
        Ok(rows)
    }

    #[instrument(
        skip(self),
        fields(subsystem = "db", component = "buildings", op = "get")
    )]
    async fn get(&self, bldg_id: i64) -> Result<Option<Building>> {
        let sql = format!("SELECT {BUILDING_COLUMNS} FROM kor3.bldg WHERE bldg_id = $1");
        sqlx::query_as::<_, Building>(&sql)
            .bind(bldg_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }

    #[instrument(
        skip(self),
        fields(
            subsystem = "db",
            component = "buildings",
            op = "within_radius",
            radius_m = query.radius_m
        )
    )]
    async fn within_radius(&self, query: &RadiusQuery) -> Result<Vec<NearbyBuilding>> {
        let start = Instant::now();
        // ST_PointOnSurface keeps x/y on the footprint for polygons, where
        // ST_X/ST_Y would fail.
        let sql = format!(
            "WITH origin AS (
                SELECT ST_SetSRID(ST_MakePoint($1, $2), {SRID})::geography AS g
             )
             SELECT {BUILDING_COLUMNS},
                    ST_X(ST_PointOnSurface(bldg_geom)) AS x,
                    ST_Y(ST_PointOnSurface(bldg_geom)) AS y,
                    ST_Distance(bldg_geom::geography, origin.g) AS distance_m
             FROM kor3.bldg, origin
             WHERE bldg_geom IS NOT NULL
               AND ST_DWithin(bldg_geom::geography, origin.g, $3)
             ORDER BY distance_m, bldg_id
             LIMIT $4"
        );

        let rows = sqlx::query_as::<_, NearbyBuilding>(&sql)
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

    #[instrument(
        skip(self, building),
        fields(subsystem = "db", component = "buildings", op = "create")
    )]
    async fn create(&self, building: NewBuilding) -> Result<Building> {
        let sql = format!(
            "WITH inserted AS (
                INSERT INTO kor3.bldg (
                    bldg_sn, rds_sn, sig_cd, emd_cd, lotno_addr, road_nm_addr, bldg_nm,
                    bldg_geom, gro_flo_co, und_flo_co, bdtyp_cd
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, ST_GeomFromText($8, {SRID}), $9, $10, $11)
                RETURNING *
             )
             SELECT {BUILDING_COLUMNS} FROM inserted"
        );

        let row = sqlx::query_as::<_, Building>(&sql)
            .bind(&building.bldg_sn)
            .bind(&building.rds_sn)
            .bind(&building.sig_cd)
            .bind(&building.emd_cd)
            .bind(&building.lotno_addr)
            .bind(&building.road_nm_addr)
            .bind(&building.bldg_nm)
            .bind(&building.wkt)
            .bind(building.gro_flo_co)
            .bind(building.und_flo_co)
            .bind(&building.bdtyp_cd)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(bldg_id = row.bldg_id, "Building created");
        Ok(row)
    }

    #[instrument(
        skip(self, updates),
        fields(subsystem = "db", component = "buildings", op = "update")
    )]
    async fn update(
        &self,
        bldg_id: i64,
        updates: UpdateBuildingRequest,
    ) -> Result<Option<Building>> {
        let mut builder = UpdateBuilder::new("kor3.bldg", "bldg_id", SqlValue::BigInt(bldg_id));
        builder
            .set("bldg_sn", updates.bldg_sn.map(SqlValue::Text))
            .set("rds_sn", updates.rds_sn.map(SqlValue::Text))
            .set("sig_cd", updates.sig_cd.map(SqlValue::Text))
            .set("emd_cd", updates.emd_cd.map(SqlValue::Text))
            .set("lotno_addr", updates.lotno_addr.map(SqlValue::Text))
            .set("road_nm_addr", updates.road_nm_addr.map(SqlValue::Text))
            .set("bldg_nm", updates.bldg_nm.map(SqlValue::Text))
            .set("gro_flo_co", updates.gro_flo_co.map(SqlValue::Int))
            .set("und_flo_co", updates.und_flo_co.map(SqlValue::Int))
            .set("bdtyp_cd", updates.bdtyp_cd.map(SqlValue::Text));
        if let Some(wkt) = updates.wkt {
            builder.set_expr(
                "bldg_geom",
                &format!("ST_GeomFromText(?, {SRID})"),
                vec![SqlValue::Text(wkt)],
            );
        }

        let Some(update_sql) = builder.sql() else {
            return Err(Error::InvalidInput("No valid updates provided.".to_string()));
        };
        let sql = format!("WITH updated AS ({update_sql}) SELECT {BUILDING_COLUMNS} FROM updated");

        let row = builder
            .bind(sqlx::query_as::<_, Building>(&sql))
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(updated = row.is_some(), "Building update applied");
        Ok(row)
    }
}
