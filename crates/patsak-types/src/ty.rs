//! The closed set of QL types and the cast/coercion rules between them.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// A QL type. Closed set, per spec: number, integer, serial, string,
/// boolean, date, json, binary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    Number,
    Integer,
    Serial,
    String,
    Boolean,
    Date,
    Json,
    Binary,
}

impl Type {
    /// `is_numeric ∈ {number, integer, serial}`.
    pub fn is_numeric(self) -> bool {
        matches!(self, Type::Number | Type::Integer | Type::Serial)
    }

    /// The QL source-level display name, as it would appear in a header
    /// declaration or error message.
    pub fn ql_name(self) -> &'static str {
        match self {
            Type::Number => "number",
            Type::Integer => "integer",
            Type::Serial => "serial",
            Type::String => "string",
            Type::Boolean => "boolean",
            Type::Date => "date",
            Type::Json => "json",
            Type::Binary => "binary",
        }
    }

    /// The backend storage type name, per the correspondence in spec §6:
    /// `float8 int4 int4 text bool timestamp(3) <schema>.json bytea`.
    pub fn backend_name(self) -> &'static str {
        match self {
            Type::Number => "float8",
            Type::Integer => "int4",
            Type::Serial => "int4",
            Type::String => "text",
            Type::Boolean => "bool",
            Type::Date => "timestamp(3)",
            Type::Json => "json",
            Type::Binary => "bytea",
        }
    }
}

/// Parse a QL type name. Fails `VALUE` in spec terms (surfaced by callers).
pub fn read_type(name: &str) -> Result<Type> {
    Ok(match name {
        "number" => Type::Number,
        "integer" => Type::Integer,
        "serial" => Type::Serial,
        "string" => Type::String,
        "boolean" => Type::Boolean,
        "date" => Type::Date,
        "json" => Type::Json,
        "binary" => Type::Binary,
        _ => return Err(Error::UnknownType(name.to_string())),
    })
}

/// Parse a backend storage type name. `int4` and a schema-qualified `json`
/// are ambiguous between two QL types on their own (integer/serial,
/// json/json) — callers that need to disambiguate `int4` (e.g. the catalog
/// loader, which promotes a `nextval(...)`-defaulted `int4` column to
/// `serial`) should special-case that before falling back to this function.
pub fn read_backend_type(name: &str) -> Result<Type> {
    Ok(match name {
        "float8" => Type::Number,
        "int4" => Type::Integer,
        "text" => Type::String,
        "bool" => Type::Boolean,
        n if n.starts_with("timestamp") => Type::Date,
        n if n == "json" || n.ends_with(".json") => Type::Json,
        "bytea" => Type::Binary,
        _ => return Err(Error::UnknownBackendType(name.to_string())),
    })
}

/// The backend cast function to apply when coercing a value of type `from`
/// to type `to`. `None` means no cast is needed. Per spec §4.A:
///
/// - same type, or both numeric => no cast
/// - target is date or json => fails TYPE ("cannot coerce")
/// - source is binary and target != boolean => fails TYPE
/// - target numeric => `to_number`
/// - otherwise => `to_<targetname>`
pub fn cast_function(from: Type, to: Type) -> Result<Option<&'static str>> {
    if from == to || (from.is_numeric() && to.is_numeric()) {
        return Ok(None);
    }
    if matches!(to, Type::Date | Type::Json) {
        return Err(Error::Uncoercible {
            from: from.ql_name(),
            to: to.ql_name(),
        });
    }
    if from == Type::Binary && to != Type::Boolean {
        return Err(Error::Uncoercible {
            from: from.ql_name(),
            to: to.ql_name(),
        });
    }
    Ok(Some(if to.is_numeric() {
        "to_number"
    } else {
        match to {
            Type::String => "to_string",
            Type::Boolean => "to_boolean",
            // Integer/Serial covered by `to.is_numeric()` above; Date/Json
            // rejected above; Binary has no named cast target in spec.
            _ => unreachable!("unhandled cast target {:?}", to),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_type_no_cast() {
        assert_eq!(cast_function(Type::String, Type::String).unwrap(), None);
    }

    #[test]
    fn numeric_pair_no_cast() {
        assert_eq!(cast_function(Type::Integer, Type::Serial).unwrap(), None);
        assert_eq!(cast_function(Type::Number, Type::Integer).unwrap(), None);
    }

    #[test]
    fn cast_to_date_or_json_fails() {
        assert!(cast_function(Type::String, Type::Date).is_err());
        assert!(cast_function(Type::Integer, Type::Json).is_err());
    }

    #[test]
    fn binary_source_rejected_except_to_boolean() {
        assert!(cast_function(Type::Binary, Type::String).is_err());
        assert_eq!(
            cast_function(Type::Binary, Type::Boolean).unwrap(),
            Some("to_boolean")
        );
    }

    #[test]
    fn cast_to_numeric_uses_to_number() {
        assert_eq!(
            cast_function(Type::String, Type::Integer).unwrap(),
            Some("to_number")
        );
    }

    #[test]
    fn cast_to_string_uses_to_string() {
        assert_eq!(
            cast_function(Type::Integer, Type::String).unwrap(),
            Some("to_string")
        );
    }

    #[test]
    fn is_numeric() {
        assert!(Type::Number.is_numeric());
        assert!(Type::Integer.is_numeric());
        assert!(Type::Serial.is_numeric());
        assert!(!Type::String.is_numeric());
    }
}
