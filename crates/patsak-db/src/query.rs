//! Helpers for the query/insert side of the catalog mutation API: composing
//! an `INSERT` statement against a RelVar's default header, and re-typing a
//! returned Postgres row back into `Value`s per a `Header`.
//!
//! Row decoding dispatches on the QL attribute type rather than inspecting
//! the returned column's Postgres type name — the expected type is already
//! known from the query's own `Header`, so there's no need to probe it.

use chrono::{Datelike, Timelike};
use indexmap::IndexMap;
use patsak_catalog::RelVar;
use patsak_sql::{escape_ident, quote_literal};
use patsak_types::{DateParts, Header, Type, Value};
use sqlx::{postgres::PgRow, Row};

use crate::error::{Error, Result};

pub(crate) fn compose_insert(rel_var: &RelVar, values: &IndexMap<String, Value>) -> Result<(String, Header)> {
    let header = rel_var.header().clone();
    if header.is_empty() {
        return Ok((format!("SELECT * FROM insert_into_empty({})", quote_literal(rel_var.name())), header));
    }

    let mut names = Vec::new();
    let mut rendered = Vec::new();
    for def_attr in rel_var.def_header().iter() {
        match values.get(&def_attr.name) {
            Some(v) => {
                names.push(escape_ident(&def_attr.name));
                rendered.push(v.render(&quote_literal));
            }
            None if def_attr.default.is_some() || def_attr.ty == Type::Serial => {}
            None => return Err(Error::value(format!("Value of attribute \"{}\" must be supplied", def_attr.name))),
        }
    }

    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
        escape_ident(rel_var.name()),
        names.join(", "),
        rendered.join(", "),
    );
    Ok((sql, header))
}

pub(crate) fn row_to_values(row: &PgRow, header: &Header) -> Result<Vec<Value>> {
    header
        .iter()
        .map(|attr| {
            let name = attr.name.as_str();
            Ok(match attr.ty {
                Type::Number => Value::number(row.try_get::<f64, _>(name).map_err(Error::db)?),
                Type::Integer => Value::integer(row.try_get::<i32, _>(name).map_err(Error::db)? as i64),
                Type::Serial => Value::serial(row.try_get::<i32, _>(name).map_err(Error::db)? as i64),
                Type::Boolean => Value::boolean(row.try_get::<bool, _>(name).map_err(Error::db)?),
                Type::String => Value::string(row.try_get::<String, _>(name).map_err(Error::db)?),
                Type::Json => Value::json(row.try_get::<serde_json::Value, _>(name).map_err(Error::db)?.to_string()),
                Type::Binary => Value::binary(row.try_get::<Vec<u8>, _>(name).map_err(Error::db)?),
                Type::Date => {
                    let ts: chrono::NaiveDateTime = row.try_get(name).map_err(Error::db)?;
                    Value::date(DateParts::new(
                        ts.year(),
                        ts.month() as u8,
                        ts.day() as u8,
                        ts.hour() as u8,
                        ts.minute() as u8,
                        ts.second() as u8,
                        (ts.and_utc().timestamp_subsec_millis()) as u16,
                    ))
                }
            })
        })
        .collect()
}
