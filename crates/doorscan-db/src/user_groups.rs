//! User group repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use tracing::{debug, instrument};

use doorscan_core::{Error, NewUserGroup, Result, UserGroup, UserGroupRepository};

const GROUP_COLUMNS: &str =
    "user_group_id, up_user_group_id, user_group_nm, user_type_cd, user_group_cd";

/// PostgreSQL implementation of UserGroupRepository.
#[derive(Clone)]
pub struct PgUserGroupRepository {
    pool: Pool<Postgres>,
}

impl PgUserGroupRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserGroupRepository for PgUserGroupRepository {
    #[instrument(skip(self), fields(subsystem = "db", component = "user_groups", op = "list"))]
    async fn list(&self) -> Result<Vec<UserGroup>> {
        let sql = format!("SELECT {GROUP_COLUMNS} FROM kor3.user_group ORDER BY user_group_id");
        let rows = sqlx::query_as::<_, UserGroup>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(result_count = rows.len(), "Listed user groups");
        Ok(rows)
    }

    #[instrument(
        skip(self),
        fields(subsystem = "db", component = "user_groups", op = "get_by_code")
    )]
    async fn get_by_code(&self, user_group_cd: &str) -> Result<Option<UserGroup>> {
        let sql = format!(
            "SELECT {GROUP_COLUMNS} FROM kor3.user_group WHERE lower(user_group_cd) = lower($1)"
        );
        sqlx::query_as::<_, UserGroup>(&sql)
            .bind(user_group_cd.trim())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)
    }

    #[instrument(
        skip(self, group),
        fields(
            subsystem = "db",
            component = "user_groups",
            op = "create",
            user_group_cd = %group.user_group_cd
        )
    )]
    async fn create(&self, group: NewUserGroup) -> Result<UserGroup> {
        // The unique index on lower(user_group_cd) settles races between
        // concurrent creates; ON CONFLICT turns the loser into "no row".
        let sql = format!(
            "INSERT INTO kor3.user_group (up_user_group_id, user_group_nm, user_type_cd, user_group_cd)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT DO NOTHING
             RETURNING {GROUP_COLUMNS}"
        );

        let row = sqlx::query_as::<_, UserGroup>(&sql)
            .bind(group.up_user_group_id)
            .bind(&group.user_group_nm)
            .bind(group.user_type_cd)
            .bind(&group.user_group_cd)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;

        match row {
            Some(row) => {
                debug!(user_group_id = row.user_group_id, "User group created");
                Ok(row)
            }
            None => Err(Error::Conflict("User group code already exists".to_string())),
        }
    }
}
