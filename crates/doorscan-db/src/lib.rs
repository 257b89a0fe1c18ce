//! # doorscan-db
//!
//! PostgreSQL + PostGIS database layer for doorscan.
//!
//! This crate provides:
//! - Connection pool management (URL or discrete Cloud SQL settings)
//! - Repository implementations for buildings, POIs, users and user groups
//! - Radius queries delegated to PostGIS `ST_DWithin`
//! - The migration runner for the `kor3` schema
//!
//! ## Example
//!
//! ```rust,ignore
//! use doorscan_db::{BuildingRepository, Database, ListQuery};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/doorscan").await?;
//!     let halls = db.buildings.list(&ListQuery::named("hall")).await?;
//!     println!("{} buildings", halls.len());
//!     Ok(())
//! }
//! ```
pub mod buildings;
pub mod pois;
pub mod pool;
pub mod update_builder;
pub mod user_groups;
pub mod users;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use doorscan_core::*;

/// Escape LIKE/ILIKE wildcard characters (`%`, `_`, `\`) in user input.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// Re-export repository implementations
pub use buildings::PgBuildingRepository;
pub use pois::PgPoiRepository;
pub use pool::{
    create_lazy_pool, create_pool, create_pool_with_config, log_pool_metrics,
    ConnectionSettings, PoolConfig,
};
pub use update_builder::{SqlValue, UpdateBuilder};
pub use user_groups::PgUserGroupRepository;
pub use users::PgUserRepository;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Buildings (`kor3.bldg`).
    pub buildings: PgBuildingRepository,
    /// POIs and their detail records (`kor3.poi`, `kor3.poi_dtl`).
    pub pois: PgPoiRepository,
    /// Users (`kor3.user`).
    pub users: PgUserRepository,
    /// User groups (`kor3.user_group`).
    pub user_groups: PgUserGroupRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            buildings: PgBuildingRepository::new(pool.clone()),
            pois: PgPoiRepository::new(pool.clone()),
            users: PgUserRepository::new(pool.clone()),
            user_groups: PgUserGroupRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Connect using resolved connection settings and a custom pool configuration.
    pub async fn connect_with_config(
        settings: &ConnectionSettings,
        config: PoolConfig,
    ) -> Result<Self> {
        let pool = create_pool_with_config(settings.connect_options()?, config).await?;
        Ok(Self::new(pool))
    }

    /// Build a Database whose pool connects on first use.
    pub fn connect_lazy(settings: &ConnectionSettings, config: PoolConfig) -> Result<Self> {
        let pool = create_lazy_pool(settings.connect_options()?, config);
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Cheap liveness probe used by the health endpoint.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Close every pooled connection. Used during graceful shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_wildcards() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("c:\\dir"), "c:\\\\dir");
        assert_eq!(escape_like("plain"), "plain");
    }

    #[test]
    fn test_escape_like_backslash_first() {
        // A literal backslash followed by % must not turn into an escaped %.
        assert_eq!(escape_like("\\%"), "\\\\\\%");
    }
}
