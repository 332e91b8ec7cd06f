//! Loading RelVars and their constraints from the backend via the stored
//! introspection helpers named in the backend contract
//! (`get_schema_tables`, `describe_table`, `describe_constrs`).

use patsak_sql::{escape_ident, quote_literal};
use patsak_types::{DefAttr, DefHeader, NameSet, Type, Value};
use sqlx::{PgConnection, Row};

use crate::error::{Error, Result};
use crate::types::{ForeignKey, RelVar};

pub(crate) async fn load_rel_var_names(schema: &str, conn: &mut PgConnection) -> Result<Vec<String>> {
    let sql = format!("SELECT * FROM get_schema_tables({})", quote_literal(schema));
    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await.map_err(Error::db)?;
    rows.into_iter().map(|row| row.try_get::<String, _>(0).map_err(Error::db)).collect()
}

pub(crate) async fn load_rel_var(name: &str, conn: &mut PgConnection) -> Result<RelVar> {
    let sql = format!("SELECT * FROM describe_table({})", quote_literal(&escape_ident(name)));
    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await.map_err(Error::db)?;

    let mut def_header = DefHeader::new();
    for row in rows {
        let attr_name: String = row.try_get(0).map_err(Error::db)?;
        let storage_type: String = row.try_get(1).map_err(Error::db)?;
        let default_text: Option<String> = row.try_get(2).map_err(Error::db)?;

        let mut ty = patsak_types::read_backend_type(&storage_type)?;
        let default = match default_text {
            Some(d) if d.starts_with("nextval(") => {
                ty = Type::Serial;
                None
            }
            Some(d) => Some(parse_backend_default(ty, &d)?),
            None => None,
        };
        def_header.add(DefAttr::new(attr_name, ty, default));
    }
    Ok(RelVar::from_def_header(name.to_string(), def_header))
}

/// Best-effort literal reader for the default expressions Postgres echoes
/// back from `pg_get_expr` for simple scalar defaults: numbers and
/// booleans as bare tokens, strings/json/dates/binary as a quoted literal
/// optionally followed by `::type`.
fn parse_backend_default(ty: Type, raw: &str) -> Result<Value> {
    let unquoted = strip_type_cast(raw.trim());
    Ok(match ty {
        Type::Number | Type::Integer | Type::Serial => {
            let n: f64 = unquoted.parse().map_err(|_| Error::db(format!("Unparseable default literal: {raw}")))?;
            match ty {
                Type::Integer => Value::integer(n as i64),
                Type::Serial => Value::serial(n as i64),
                _ => Value::number(n),
            }
        }
        Type::Boolean => Value::boolean(unquoted == "true" || unquoted == "'t'" || unquoted == "t"),
        Type::String => Value::string(unquote(unquoted)),
        Type::Json => Value::json(unquote(unquoted)),
        Type::Date => {
            let text = unquote(unquoted);
            Value::date(parse_date_parts(&text)?)
        }
        Type::Binary => Value::binary(parse_hex_bytea(unquoted)?),
    })
}

fn strip_type_cast(s: &str) -> &str {
    match s.rfind("::") {
        Some(idx) => &s[..idx],
        None => s,
    }
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('\'') && s.ends_with('\'') {
        s[1..s.len() - 1].replace("''", "'")
    } else {
        s.to_string()
    }
}

fn parse_date_parts(text: &str) -> Result<patsak_types::DateParts> {
    let (date_part, time_part) = text.split_once(' ').unwrap_or((text, "00:00:00"));
    let mut date_fields = date_part.split('-');
    let year: i32 = date_fields.next().and_then(|s| s.parse().ok()).unwrap_or(1970);
    let month: u8 = date_fields.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let day: u8 = date_fields.next().and_then(|s| s.parse().ok()).unwrap_or(1);
    let (hms, millis) = time_part.split_once('.').unwrap_or((time_part, "0"));
    let mut time_fields = hms.split(':');
    let hour: u8 = time_fields.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let minute: u8 = time_fields.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let second: u8 = time_fields.next().and_then(|s| s.parse().ok()).unwrap_or(0);
    let millisecond: u16 = millis.parse().unwrap_or(0);
    Ok(patsak_types::DateParts::new(year, month, day, hour, minute, second, millisecond))
}

fn parse_hex_bytea(s: &str) -> Result<Vec<u8>> {
    let s = unquote(s);
    let hex = s.strip_prefix("\\x").ok_or_else(|| Error::db(format!("Unparseable bytea default: {s}")))?;
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| Error::db(format!("Unparseable bytea default: {s}"))))
        .collect()
}

fn read_attr_names(names_in_order: &[String], indexes: &[i32]) -> Result<NameSet> {
    indexes
        .iter()
        .map(|&i| {
            let idx = usize::try_from(i - 1).map_err(|_| Error::db("Attribute index out of range"))?;
            names_in_order.get(idx).cloned().ok_or_else(|| Error::db("Attribute index out of range"))
        })
        .collect()
}

/// Loads unique/foreign keys for one already-constructed RelVar. `lookup_ref`
/// resolves a referenced RelVar's current attribute-name order (itself, if
/// self-referential, or an already-loaded sibling).
pub(crate) async fn load_constrs(
    rel_var: &mut RelVar,
    conn: &mut PgConnection,
    lookup_ref: impl Fn(&str) -> Result<Vec<String>>,
) -> Result<()> {
    let sql = format!("SELECT * FROM describe_constrs({})", quote_literal(&escape_ident(&rel_var.name)));
    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await.map_err(Error::db)?;
    let own_names: Vec<String> = rel_var.header.names().map(|s| s.to_string()).collect();

    for row in rows {
        let kind: String = row.try_get(0).map_err(Error::db)?;
        let attr_idx: Vec<i32> = row.try_get(1).map_err(Error::db)?;
        let attr_names = read_attr_names(&own_names, &attr_idx)?;
        match kind.as_str() {
            "p" | "u" => rel_var.unique_key_set.push(attr_names),
            "f" => {
                let ref_rel_var_name: String = row.try_get(2).map_err(Error::db)?;
                let ref_idx: Vec<i32> = row.try_get(3).map_err(Error::db)?;
                let ref_names = if ref_rel_var_name == rel_var.name { own_names.clone() } else { lookup_ref(&ref_rel_var_name)? };
                let ref_attr_names = read_attr_names(&ref_names, &ref_idx)?;
                rel_var.foreign_key_set.push(ForeignKey::new(attr_names, ref_rel_var_name, ref_attr_names));
            }
            other => return Err(Error::db(format!("Unknown constraint kind: {other}"))),
        }
    }
    Ok(())
}
