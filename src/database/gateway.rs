use async_trait::async_trait;

use super::manager::DatabaseError;
use super::params::SqlParam;
use super::routine::{Function, Procedure};
use super::row::JsonRow;

/// The narrow surface handlers use to reach the database.
///
/// `database` selects a pool by name; `None` means the configured default.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Run a parameterized statement and return its rows
    async fn query(
        &self,
        sql: &str,
        database: Option<&str>,
        params: &[SqlParam],
    ) -> Result<Vec<JsonRow>, DatabaseError>;

    /// `CALL` a stored procedure for its side effect
    async fn call_procedure(
        &self,
        procedure: Procedure,
        database: Option<&str>,
        params: &[SqlParam],
    ) -> Result<(), DatabaseError>;

    /// `SELECT * FROM` a stored function and return its rows
    async fn call_function(
        &self,
        function: Function,
        database: Option<&str>,
        params: &[SqlParam],
    ) -> Result<Vec<JsonRow>, DatabaseError>;

    /// Round-trip a trivial statement
    async fn ping(&self, database: Option<&str>) -> Result<(), DatabaseError>;
}
