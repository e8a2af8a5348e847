use serde::Serialize;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::Postgres;

/// A positional statement parameter.
///
/// Every variant carries an `Option` so a NULL still binds with a concrete
/// Postgres type, which overload resolution for `CALL` relies on.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlParam {
    Text(Option<String>),
    Int(Option<i32>),
    BigInt(Option<i64>),
    Bool(Option<bool>),
    Float(Option<f64>),
}

impl SqlParam {
    pub fn is_null(&self) -> bool {
        match self {
            SqlParam::Text(v) => v.is_none(),
            SqlParam::Int(v) => v.is_none(),
            SqlParam::BigInt(v) => v.is_none(),
            SqlParam::Bool(v) => v.is_none(),
            SqlParam::Float(v) => v.is_none(),
        }
    }

    /// Empty or blank text becomes a typed NULL
    pub fn text_or_null(value: Option<&str>) -> Self {
        SqlParam::Text(
            value
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        )
    }
}

impl From<&str> for SqlParam {
    fn from(v: &str) -> Self {
        SqlParam::Text(Some(v.to_string()))
    }
}

impl From<String> for SqlParam {
    fn from(v: String) -> Self {
        SqlParam::Text(Some(v))
    }
}

impl From<Option<String>> for SqlParam {
    fn from(v: Option<String>) -> Self {
        SqlParam::Text(v)
    }
}

impl From<i32> for SqlParam {
    fn from(v: i32) -> Self {
        SqlParam::Int(Some(v))
    }
}

impl From<Option<i32>> for SqlParam {
    fn from(v: Option<i32>) -> Self {
        SqlParam::Int(v)
    }
}

impl From<i64> for SqlParam {
    fn from(v: i64) -> Self {
        SqlParam::BigInt(Some(v))
    }
}

impl From<bool> for SqlParam {
    fn from(v: bool) -> Self {
        SqlParam::Bool(Some(v))
    }
}

impl From<Option<bool>> for SqlParam {
    fn from(v: Option<bool>) -> Self {
        SqlParam::Bool(v)
    }
}

impl From<f64> for SqlParam {
    fn from(v: f64) -> Self {
        SqlParam::Float(Some(v))
    }
}

/// Bind parameters in order onto a query
pub fn bind_params<'q>(
    mut q: Query<'q, Postgres, PgArguments>,
    params: &'q [SqlParam],
) -> Query<'q, Postgres, PgArguments> {
    for p in params {
        q = match p {
            SqlParam::Text(v) => q.bind(v.as_deref()),
            SqlParam::Int(v) => q.bind(*v),
            SqlParam::BigInt(v) => q.bind(*v),
            SqlParam::Bool(v) => q.bind(*v),
            SqlParam::Float(v) => q.bind(*v),
        };
    }
    q
}
