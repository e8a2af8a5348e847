use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgRow};
use sqlx::PgPool;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::gateway::Gateway;
use super::params::{bind_params, SqlParam};
use super::routine::{Function, Procedure};
use super::row::{rows_to_json, JsonRow};
use crate::config::DatabaseConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Invalid database name: {0}")]
    InvalidDatabaseName(String),

    #[error("Unknown routine: {0}")]
    UnknownRoutine(String),

    #[error("{routine} expects {expected} parameters, got {actual}")]
    ArityMismatch {
        routine: String,
        expected: usize,
        actual: usize,
    },

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Connection pool registry keyed by database name.
///
/// Pools are created on first use and kept for the life of the manager.
pub struct DatabaseManager {
    settings: DatabaseConfig,
    pools: RwLock<HashMap<String, PgPool>>,
}

impl DatabaseManager {
    pub fn new(settings: DatabaseConfig) -> Self {
        Self {
            settings,
            pools: RwLock::new(HashMap::new()),
        }
    }

    pub fn default_database(&self) -> &str {
        &self.settings.default_database
    }

    /// Get existing pool or create a new one lazily
    pub async fn pool(&self, database: Option<&str>) -> Result<PgPool, DatabaseError> {
        let database_name = database.unwrap_or(&self.settings.default_database);
        if !Self::is_valid_db_name(database_name) {
            return Err(DatabaseError::InvalidDatabaseName(database_name.to_string()));
        }

        // Fast path: try read lock
        {
            let pools = self.pools.read().await;
            if let Some(pool) = pools.get(database_name) {
                return Ok(pool.clone());
            }
        }

        // Re-check under the write lock so racing callers share one pool
        let mut pools = self.pools.write().await;
        if let Some(pool) = pools.get(database_name) {
            return Ok(pool.clone());
        }

        let pool = PgPoolOptions::new()
            .max_connections(self.settings.max_connections)
            .acquire_timeout(Duration::from_secs(self.settings.connection_timeout))
            .connect_lazy_with(self.connect_options(database_name));
        pools.insert(database_name.to_string(), pool.clone());

        info!("Created database pool for: {}", database_name);
        Ok(pool)
    }

    /// Number of pools created so far
    pub async fn pool_count(&self) -> usize {
        self.pools.read().await.len()
    }

    fn connect_options(&self, database_name: &str) -> PgConnectOptions {
        let mut options = PgConnectOptions::new()
            .host(&self.settings.host)
            .port(self.settings.port)
            .username(&self.settings.username)
            .database(database_name)
            .application_name(env!("CARGO_PKG_NAME"));
        if !self.settings.password.is_empty() {
            options = options.password(&self.settings.password);
        }
        options
    }

    /// Close and remove all pools (e.g., on shutdown)
    pub async fn close_all(&self) {
        let mut pools = self.pools.write().await;
        for (name, pool) in pools.drain() {
            pool.close().await;
            info!("Closed database pool: {}", name);
        }
    }

    async fn fetch(
        &self,
        sql: &str,
        database: Option<&str>,
        params: &[SqlParam],
    ) -> Result<Vec<PgRow>, DatabaseError> {
        let pool = self.pool(database).await?;
        let mut conn = pool.acquire().await?;

        let started = Instant::now();
        let result = bind_params(sqlx::query(sql), params)
            .fetch_all(&mut *conn)
            .await;
        // Hand the connection back before reporting anything
        drop(conn);
        self.observe(sql, started.elapsed(), result.is_ok());

        Ok(result?)
    }

    async fn execute(
        &self,
        sql: &str,
        database: Option<&str>,
        params: &[SqlParam],
    ) -> Result<(), DatabaseError> {
        let pool = self.pool(database).await?;
        let mut conn = pool.acquire().await?;

        let started = Instant::now();
        let result = bind_params(sqlx::query(sql), params)
            .execute(&mut *conn)
            .await;
        drop(conn);
        self.observe(sql, started.elapsed(), result.is_ok());

        result?;
        Ok(())
    }

    fn observe(&self, sql: &str, elapsed: Duration, ok: bool) {
        if self.settings.enable_query_logging {
            debug!(elapsed_ms = elapsed.as_millis() as u64, ok, "SQL: {}", sql.trim());
        }
        if self.settings.enable_slow_query_warning
            && elapsed > Duration::from_millis(self.settings.slow_query_threshold_ms)
        {
            warn!(elapsed_ms = elapsed.as_millis() as u64, "Slow query: {}", sql.trim());
        }
    }

    /// Names only reach `PgConnectOptions::database`, so any non-blank name is accepted
    pub fn is_valid_db_name(name: &str) -> bool {
        !name.trim().is_empty()
    }
}

#[async_trait]
impl Gateway for DatabaseManager {
    async fn query(
        &self,
        sql: &str,
        database: Option<&str>,
        params: &[SqlParam],
    ) -> Result<Vec<JsonRow>, DatabaseError> {
        let rows = self.fetch(sql, database, params).await?;
        Ok(rows_to_json(&rows)?)
    }

    async fn call_procedure(
        &self,
        procedure: Procedure,
        database: Option<&str>,
        params: &[SqlParam],
    ) -> Result<(), DatabaseError> {
        if params.len() != procedure.arity() {
            return Err(DatabaseError::ArityMismatch {
                routine: procedure.qualified_name(),
                expected: procedure.arity(),
                actual: params.len(),
            });
        }
        self.execute(&procedure.call_sql(params.len()), database, params).await
    }

    async fn call_function(
        &self,
        function: Function,
        database: Option<&str>,
        params: &[SqlParam],
    ) -> Result<Vec<JsonRow>, DatabaseError> {
        let rows = self.fetch(&function.select_sql(params.len()), database, params).await?;
        Ok(rows_to_json(&rows)?)
    }

    async fn ping(&self, database: Option<&str>) -> Result<(), DatabaseError> {
        self.execute("SELECT 1", database, &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn manager() -> DatabaseManager {
        let mut config = AppConfig::from_lookup(|_| None).database;
        config.default_database = "ritefolio".to_string();
        DatabaseManager::new(config)
    }

    #[test]
    fn validates_db_names() {
        assert!(DatabaseManager::is_valid_db_name("postgres"));
        assert!(DatabaseManager::is_valid_db_name("ritefolio_admin_2"));
        assert!(DatabaseManager::is_valid_db_name("rite-folio"));
        assert!(DatabaseManager::is_valid_db_name("Rite Folio"));
        assert!(!DatabaseManager::is_valid_db_name(""));
        assert!(!DatabaseManager::is_valid_db_name("   "));
    }

    #[tokio::test]
    async fn hyphenated_default_database_gets_a_pool() {
        let mut config = AppConfig::from_lookup(|_| None).database;
        config.default_database = "rite-folio".to_string();
        let manager = DatabaseManager::new(config);

        manager.pool(None).await.unwrap();
        manager.pool(Some("rite-folio")).await.unwrap();
        assert_eq!(manager.pool_count().await, 1);
    }

    #[tokio::test]
    async fn reuses_pool_for_same_name() {
        let manager = manager();
        let first = manager.pool(Some("ritefolio")).await.unwrap();
        let second = manager.pool(Some("ritefolio")).await.unwrap();
        assert_eq!(manager.pool_count().await, 1);

        // Both handles share one pool, so closing one closes the other
        first.close().await;
        assert!(second.is_closed());
    }

    #[tokio::test]
    async fn missing_name_uses_default_database() {
        let manager = manager();
        let default_pool = manager.pool(None).await.unwrap();
        let named = manager.pool(Some("ritefolio")).await.unwrap();
        assert_eq!(manager.pool_count().await, 1);
        default_pool.close().await;
        assert!(named.is_closed());
    }

    #[tokio::test]
    async fn distinct_names_get_distinct_pools() {
        let manager = manager();
        let a = manager.pool(Some("ritefolio")).await.unwrap();
        let b = manager.pool(Some("reporting")).await.unwrap();
        assert_eq!(manager.pool_count().await, 2);
        a.close().await;
        assert!(!b.is_closed());
    }

    #[tokio::test]
    async fn rejects_blank_name_without_creating_pool() {
        let manager = manager();
        let err = manager.pool(Some(" ")).await.unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidDatabaseName(name) if name == " "));
        assert_eq!(manager.pool_count().await, 0);
    }

    #[tokio::test]
    async fn procedure_arity_is_checked_before_connecting() {
        let manager = manager();
        let err = manager
            .call_procedure(Procedure::InsertCurrency, None, &[SqlParam::from("Euro")])
            .await
            .unwrap_err();
        match err {
            DatabaseError::ArityMismatch { expected, actual, .. } => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(manager.pool_count().await, 0);
    }

    #[tokio::test]
    async fn close_all_empties_registry() {
        let manager = manager();
        let pool = manager.pool(None).await.unwrap();
        manager.close_all().await;
        assert!(pool.is_closed());
        assert_eq!(manager.pool_count().await, 0);
    }
}
