//! Server configuration from environment variables.

use std::str::FromStr;

use tracing::warn;

use doorscan_core::defaults::{GCS_BUCKET, METADATA_HOST, SERVER_HOST, SERVER_PORT};
use doorscan_db::{pool::DEFAULT_MAX_CONNECTIONS, ConnectionSettings};

/// Everything the server reads from its environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database: ConnectionSettings,
    pub db_max_connections: u32,
    /// Raw `DOORSCANNER_API_KEYS` document.
    pub api_keys_json: Option<String>,
    pub gcs_bucket: String,
    /// `GOOGLE_CLOUD_PROJECT`; discovered from the metadata server when unset.
    pub project_id: Option<String>,
    pub metadata_host: String,
    /// Raw comma-separated `ALLOWED_ORIGINS`.
    pub allowed_origins: Option<String>,
    pub run_migrations: bool,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`. Empty values count as unset;
    /// unparseable numbers fall back to their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database = ConnectionSettings {
            url: get("DATABASE_URL"),
            host: get("CLOUDSQL_HOST"),
            port: get("CLOUDSQL_PORT").and_then(|v| parse_or_warn("CLOUDSQL_PORT", &v)),
            database: get("CLOUDSQL_DB"),
            user: get("CLOUDSQL_USER_DOORSCANNER"),
            password: get("CLOUDSQL_PASS_DOORSCANNER"),
        };

        Self {
            host: get("HOST").unwrap_or_else(|| SERVER_HOST.to_string()),
            port: get("PORT")
                .and_then(|v| parse_or_warn("PORT", &v))
                .unwrap_or(SERVER_PORT),
            database,
            db_max_connections: get("DB_MAX_CONNECTIONS")
                .and_then(|v| parse_or_warn("DB_MAX_CONNECTIONS", &v))
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_MAX_CONNECTIONS),
            api_keys_json: get("DOORSCANNER_API_KEYS"),
            gcs_bucket: get("GCS_BUCKET_NAME").unwrap_or_else(|| GCS_BUCKET.to_string()),
            project_id: get("GOOGLE_CLOUD_PROJECT"),
            metadata_host: get("GCE_METADATA_HOST").unwrap_or_else(|| METADATA_HOST.to_string()),
            allowed_origins: get("ALLOWED_ORIGINS"),
            run_migrations: get("RUN_MIGRATIONS")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }

    /// Listener address. The host may be a name (`localhost`) or a bare or
    /// bracketed IPv6 literal; it is resolved at bind time.
    pub fn bind_target(&self) -> (&str, u16) {
        (self.host.trim_start_matches('[').trim_end_matches(']'), self.port)
    }
}

fn parse_or_warn<T: FromStr>(key: &str, value: &str) -> Option<T> {
    match value.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value, "Ignoring unparseable configuration value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> ServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_target(), ("0.0.0.0", 8080));
        assert_eq!(cfg.gcs_bucket, GCS_BUCKET);
        assert_eq!(cfg.metadata_host, METADATA_HOST);
        assert_eq!(cfg.db_max_connections, DEFAULT_MAX_CONNECTIONS);
        assert!(cfg.project_id.is_none());
        assert!(!cfg.run_migrations);
    }

    #[test]
    fn test_cloudsql_settings() {
        let cfg = config(&[
            ("CLOUDSQL_HOST", "/cloudsql/proj:region:inst"),
            ("CLOUDSQL_DB", "doorscan"),
            ("CLOUDSQL_USER_DOORSCANNER", "scanner"),
            ("CLOUDSQL_PASS_DOORSCANNER", "secret"),
            ("CLOUDSQL_PORT", "6432"),
        ]);
        assert_eq!(cfg.database.url, None);
        assert_eq!(
            cfg.database.host.as_deref(),
            Some("/cloudsql/proj:region:inst")
        );
        assert_eq!(cfg.database.port, Some(6432));
        assert_eq!(cfg.database.user.as_deref(), Some("scanner"));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let cfg = config(&[
            ("PORT", "eighty"),
            ("DB_MAX_CONNECTIONS", "0"),
            ("CLOUDSQL_PORT", "-1"),
        ]);
        assert_eq!(cfg.port, SERVER_PORT);
        assert_eq!(cfg.db_max_connections, DEFAULT_MAX_CONNECTIONS);
        assert_eq!(cfg.database.port, None);
    }

    #[test]
    fn test_empty_values_are_unset() {
        let cfg = config(&[("GCS_BUCKET_NAME", ""), ("GOOGLE_CLOUD_PROJECT", "  ")]);
        assert_eq!(cfg.gcs_bucket, GCS_BUCKET);
        assert!(cfg.project_id.is_none());
    }

    #[test]
    fn test_run_migrations_flag() {
        assert!(config(&[("RUN_MIGRATIONS", "true")]).run_migrations);
        assert!(config(&[("RUN_MIGRATIONS", "1")]).run_migrations);
        assert!(!config(&[("RUN_MIGRATIONS", "yes")]).run_migrations);
    }

    #[test]
    fn test_bind_target_accepts_ipv6_literals() {
        assert_eq!(config(&[("HOST", "::")]).bind_target(), ("::", 8080));
        assert_eq!(config(&[("HOST", "[::1]")]).bind_target(), ("::1", 8080));
    }

    #[tokio::test]
    async fn test_bind_target_resolves_host_names() {
        let cfg = config(&[("HOST", "localhost"), ("PORT", "0")]);
        let listener = tokio::net::TcpListener::bind(cfg.bind_target())
            .await
            .expect("localhost should resolve");
        assert!(listener.local_addr().unwrap().ip().is_loopback());
    }
}
