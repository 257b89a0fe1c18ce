//! User repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::{debug, instrument, warn};

use doorscan_core::{Error, ListQuery, NewUser, Result, User, UserRepository, UserUpdates};

use crate::escape_like;
use crate::update_builder::{SqlValue, UpdateBuilder};

/// Selects users joined with their group from a relation aliased `u`.
const USER_SELECT: &str = "SELECT u.user_id, u.user_group_id, u.user_nm, u.user_lgn_type_cd, \
     u.eml_addr, u.user_uid, g.user_group_nm, g.user_type_cd, u.crt_dt, u.mdfcn_dt";

/// PostgreSQL implementation of UserRepository.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: Pool<Postgres>,
}

impl PgUserRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self), fields(subsystem = "db", component = "users", op = "list"))]
    async fn list(&self, query: &ListQuery) -> Result<Vec<User>> {
        let sql = format!(
            "{USER_SELECT} FROM kor3.user u \
             LEFT JOIN kor3.user_group g ON g.user_group_id = u.user_group_id \
             WHERE ($1::text IS NULL OR u.user_nm ILIKE $1 ESCAPE '\\') \
             ORDER BY u.user_id \
             LIMIT $2 OFFSET $3"
        );
        let pattern = query
            .name
            .as_deref()
            .map(|name| format!("%{}%", escape_like(name)));

        let rows = sqlx::query_as::<_, User>(&sql)
            .bind(pattern)
            .bind(query.limit)
            .bind(query.offset)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(result_count = rows.len(), "Listed users");
        Ok(rows)
    }

    #[instrument(skip(self), fields(subsystem = "db", component = "users", op = "get_by_uid"))]
    async fn get_by_uid(&self, user_uid: &str) -> Result<Option<User>> {
        let sql = format!(
            "{USER_SELECT} FROM kor3.user u \
             LEFT JOIN kor3.user_group g ON g.user_group_id = u.user_group_id \
             WHERE u.user_uid = $1"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user_uid)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }

    #[instrument(
        skip(self, user),
        fields(subsystem = "db", component = "users", op = "create", user_uid = %user.user_uid)
    )]
    async fn create(&self, user: NewUser) -> Result<User> {
        let sql = format!(
            "WITH u AS (
                INSERT INTO kor3.user (user_group_id, user_nm, user_lgn_type_cd, eml_addr, user_uid)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
             )
             {USER_SELECT} FROM u
             LEFT JOIN kor3.user_group g ON g.user_group_id = u.user_group_id"
        );

        let result = sqlx::query_as::<_, User>(&sql)
            .bind(user.user_group_id)
            .bind(&user.user_nm)
            .bind(user.user_lgn_type_cd)
            .bind(&user.eml_addr)
            .bind(&user.user_uid)
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database);

        match result {
            Ok(row) => {
                debug!(user_id = row.user_id, "User created");
                Ok(row)
            }
            Err(e) if e.is_unique_violation() => {
                warn!("Duplicate user_uid rejected");
                Err(Error::Conflict(format!(
                    "User with user_uid {} already exists",
                    user.user_uid
                )))
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(
        skip(self, updates),
        fields(subsystem = "db", component = "users", op = "update_by_uid")
    )]
    async fn update_by_uid(&self, user_uid: &str, updates: UserUpdates) -> Result<Option<User>> {
        let mut builder = UpdateBuilder::new(
            "kor3.user",
            "user_uid",
            SqlValue::Text(user_uid.to_string()),
        );
        builder
            .set("user_nm", updates.user_nm.map(SqlValue::Text))
            .set(
                "user_lgn_type_cd",
                updates
                    .user_lgn_type_cd
                    .map(|t| SqlValue::SmallInt(i16::from(t))),
            )
            .set("eml_addr", updates.eml_addr.map(SqlValue::Text))
            .set("user_group_id", updates.user_group_id.map(SqlValue::BigInt));

        let Some(update_sql) = builder.sql() else {
            return Err(Error::InvalidInput("No valid updates provided.".to_string()));
        };
        let sql = format!(
            "WITH u AS ({update_sql})
             {USER_SELECT} FROM u
             LEFT JOIN kor3.user_group g ON g.user_group_id = u.user_group_id"
        );

        let row = builder
            .bind(sqlx::query_as::<_, User>(&sql))
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(updated = row.is_some(), "User update applied");
        Ok(row)
    }
}
