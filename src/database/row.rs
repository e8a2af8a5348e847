//! Row to JSON conversion for untyped result sets.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Map, Number, Value};
use sqlx::error::BoxDynError;
use sqlx::postgres::{PgRow, PgTypeInfo, PgValueFormat, PgValueRef};
use sqlx::types::BigDecimal;
use sqlx::{Column, Decode, Postgres, Row, Type, TypeInfo, ValueRef};
use uuid::Uuid;

/// A result row keyed by column name, in column order
pub type JsonRow = Map<String, Value>;

pub fn rows_to_json(rows: &[PgRow]) -> Result<Vec<JsonRow>, sqlx::Error> {
    rows.iter().map(row_to_json).collect()
}

pub fn row_to_json(row: &PgRow) -> Result<JsonRow, sqlx::Error> {
    let mut map = Map::new();
    for column in row.columns() {
        let value = column_value(row, column.ordinal(), column.name(), column.type_info().name())?;
        map.insert(column.name().to_string(), value);
    }
    Ok(map)
}

fn column_value(
    row: &PgRow,
    idx: usize,
    column: &str,
    type_name: &str,
) -> Result<Value, sqlx::Error> {
    if row.try_get_raw(idx)?.is_null() {
        return Ok(Value::Null);
    }

    let value = match type_name {
        "BOOL" => Value::Bool(row.try_get::<bool, _>(idx)?),
        "INT2" => Value::from(row.try_get::<i16, _>(idx)?),
        "INT4" => Value::from(row.try_get::<i32, _>(idx)?),
        "INT8" => Value::from(row.try_get::<i64, _>(idx)?),
        "FLOAT4" => float(row.try_get::<f32, _>(idx)? as f64),
        "FLOAT8" => float(row.try_get::<f64, _>(idx)?),
        // Kept as text so no precision is lost
        "NUMERIC" => Value::String(numeric_text(row, idx)?),
        "TIMESTAMPTZ" => Value::String(row.try_get::<DateTime<Utc>, _>(idx)?.to_rfc3339()),
        "TIMESTAMP" => Value::String(
            row.try_get::<NaiveDateTime, _>(idx)?
                .format("%Y-%m-%dT%H:%M:%S%.f")
                .to_string(),
        ),
        "DATE" => Value::String(row.try_get::<NaiveDate, _>(idx)?.to_string()),
        "JSON" | "JSONB" => row.try_get::<Value, _>(idx)?,
        "UUID" => Value::String(row.try_get::<Uuid, _>(idx)?.to_string()),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => Value::String(row.try_get::<String, _>(idx)?),
        "TEXT[]" | "VARCHAR[]" | "BPCHAR[]" | "NAME[]" => {
            array(row.try_get::<Vec<Option<String>>, _>(idx)?)
        }
        "INT2[]" => array(row.try_get::<Vec<Option<i16>>, _>(idx)?),
        "INT4[]" => array(row.try_get::<Vec<Option<i32>>, _>(idx)?),
        "INT8[]" => array(row.try_get::<Vec<Option<i64>>, _>(idx)?),
        "BOOL[]" => array(row.try_get::<Vec<Option<bool>>, _>(idx)?),
        "FLOAT8[]" => array(row.try_get::<Vec<Option<f64>>, _>(idx)?),
        other => match row.try_get::<String, _>(idx) {
            Ok(s) => Value::String(s),
            Err(e) => {
                tracing::warn!(
                    column,
                    type_name = other,
                    "Column type has no JSON mapping, returning null: {}",
                    e
                );
                Value::Null
            }
        },
    };

    Ok(value)
}

fn float(v: f64) -> Value {
    Number::from_f64(v).map(Value::Number).unwrap_or(Value::Null)
}

fn array<T: Into<Value>>(items: Vec<Option<T>>) -> Value {
    Value::Array(items.into_iter().map(|item| item.map_or(Value::Null, Into::into)).collect())
}

/// NUMERIC rendered with the scale the server reports, so `12.50` stays `12.50`
fn numeric_text(row: &PgRow, idx: usize) -> Result<String, sqlx::Error> {
    let value = row.try_get::<BigDecimal, _>(idx)?;
    let NumericScale(scale) = row.try_get::<NumericScale, _>(idx)?;
    Ok(value.with_scale(i64::from(scale)).to_string())
}

/// Display scale of a NUMERIC value, read without decoding its digits
struct NumericScale(u16);

impl Type<Postgres> for NumericScale {
    fn type_info() -> PgTypeInfo {
        <BigDecimal as Type<Postgres>>::type_info()
    }

    fn compatible(ty: &PgTypeInfo) -> bool {
        <BigDecimal as Type<Postgres>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Postgres> for NumericScale {
    fn decode(value: PgValueRef<'r>) -> Result<Self, BoxDynError> {
        let scale = match value.format() {
            PgValueFormat::Binary => {
                let bytes = <&[u8] as Decode<Postgres>>::decode(value)?;
                binary_dscale(bytes).ok_or("truncated NUMERIC value")?
            }
            PgValueFormat::Text => text_scale(<&str as Decode<Postgres>>::decode(value)?),
        };
        Ok(NumericScale(scale))
    }
}

/// Binary NUMERIC starts with ndigits, weight, sign and dscale as big-endian 16-bit words
fn binary_dscale(bytes: &[u8]) -> Option<u16> {
    let header = bytes.get(6..8)?;
    Some(u16::from_be_bytes([header[0], header[1]]))
}

fn text_scale(text: &str) -> u16 {
    text.split_once('.')
        .map_or(0, |(_, fraction)| fraction.len().min(u16::MAX as usize) as u16)
}
