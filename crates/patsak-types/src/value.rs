//! QL values and their rendering to self-typed backend literals.

use crate::ty::Type;

/// A date/time value, decomposed into broken-down fields plus milliseconds
/// rather than a single floating-point timestamp, so rendering never has to
/// re-derive calendar fields from an epoch offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateParts {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub millisecond: u16,
}

impl DateParts {
    pub fn new(
        year: i32,
        month: u8,
        day: u8,
        hour: u8,
        minute: u8,
        second: u8,
        millisecond: u16,
    ) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            millisecond,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Payload {
    /// Numeric and boolean (0.0 / 1.0) values share one `f64` payload.
    Num(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(DateParts),
}

/// A QL value: a `Type` tag plus a payload shaped to match it. Immutable
/// after construction, as spec §3 "Lifecycle" requires.
#[derive(Clone, Debug, PartialEq)]
pub struct Value {
    ty: Type,
    payload: Payload,
}

impl Value {
    pub fn number(n: f64) -> Self {
        Self {
            ty: Type::Number,
            payload: Payload::Num(n),
        }
    }

    pub fn integer(n: i64) -> Self {
        Self {
            ty: Type::Integer,
            payload: Payload::Num(n as f64),
        }
    }

    pub fn serial(n: i64) -> Self {
        Self {
            ty: Type::Serial,
            payload: Payload::Num(n as f64),
        }
    }

    pub fn boolean(b: bool) -> Self {
        Self {
            ty: Type::Boolean,
            payload: Payload::Num(if b { 1.0 } else { 0.0 }),
        }
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self {
            ty: Type::String,
            payload: Payload::Text(s.into()),
        }
    }

    pub fn json(s: impl Into<String>) -> Self {
        Self {
            ty: Type::Json,
            payload: Payload::Text(s.into()),
        }
    }

    pub fn binary(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            ty: Type::Binary,
            payload: Payload::Bytes(bytes.into()),
        }
    }

    pub fn date(parts: DateParts) -> Self {
        Self {
            ty: Type::Date,
            payload: Payload::Date(parts),
        }
    }

    pub fn get_type(&self) -> Type {
        self.ty
    }

    /// Numeric/boolean accessor. Panics if the payload isn't a `Num` — this
    /// mirrors the original `Value::GetDouble`, which is likewise only
    /// valid for the matching tag.
    pub fn as_double(&self) -> f64 {
        match &self.payload {
            Payload::Num(d) => *d,
            _ => panic!("Value::as_double called on a {:?} value", self.ty),
        }
    }

    pub fn as_bool(&self) -> bool {
        self.as_double() != 0.0
    }

    pub fn as_str(&self) -> &str {
        match &self.payload {
            Payload::Text(s) => s,
            _ => panic!("Value::as_str called on a {:?} value", self.ty),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match &self.payload {
            Payload::Bytes(b) => b,
            _ => panic!("Value::as_bytes called on a {:?} value", self.ty),
        }
    }

    pub fn as_date(&self) -> DateParts {
        match &self.payload {
            Payload::Date(d) => *d,
            _ => panic!("Value::as_date called on a {:?} value", self.ty),
        }
    }

    /// Render this value as a self-typed backend SQL literal.
    ///
    /// `escape` quotes and escapes a raw string payload into a SQL string
    /// literal (including the surrounding quotes) — the callback installed
    /// once at runtime init, per spec §4.A / §9.
    pub fn render(&self, escape: &dyn Fn(&str) -> String) -> String {
        match self.ty {
            Type::Number | Type::Integer | Type::Serial => {
                let d = self.as_double();
                if d.is_nan() {
                    "'NaN'::float8".to_string()
                } else if d.is_infinite() {
                    if d > 0.0 {
                        "'Infinity'::float8".to_string()
                    } else {
                        "'-Infinity'::float8".to_string()
                    }
                } else if self.ty == Type::Number {
                    format!("{d}")
                } else {
                    // integer/serial render without a fractional part
                    format!("{}", d as i64)
                }
            }
            Type::Boolean => {
                if self.as_bool() {
                    "true".to_string()
                } else {
                    "false".to_string()
                }
            }
            Type::Date => {
                let p = self.as_date();
                format!(
                    "'{:04}-{:02}-{:02} {:02}:{:02}:{:02}.{:03}'::timestamp(3)",
                    p.year, p.month, p.day, p.hour, p.minute, p.second, p.millisecond
                )
            }
            Type::String => escape(self.as_str()),
            Type::Json => format!("{}::json", escape(self.as_str())),
            Type::Binary => {
                let hex: String = self.as_bytes().iter().map(|b| format!("{b:02x}")).collect();
                format!("'\\x{hex}'::bytea")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escape(s: &str) -> String {
        format!("'{}'", s.replace('\'', "''"))
    }

    #[test]
    fn render_plain_number() {
        assert_eq!(Value::number(23.0).render(&escape), "23");
    }

    #[test]
    fn render_integer_has_no_fraction() {
        assert_eq!(Value::integer(23).render(&escape), "23");
    }

    #[test]
    fn render_nan_and_inf() {
        assert_eq!(Value::number(f64::NAN).render(&escape), "'NaN'::float8");
        assert_eq!(
            Value::number(f64::INFINITY).render(&escape),
            "'Infinity'::float8"
        );
        assert_eq!(
            Value::number(f64::NEG_INFINITY).render(&escape),
            "'-Infinity'::float8"
        );
    }

    #[test]
    fn render_boolean() {
        assert_eq!(Value::boolean(true).render(&escape), "true");
        assert_eq!(Value::boolean(false).render(&escape), "false");
    }

    #[test]
    fn render_string_is_escaped() {
        assert_eq!(Value::string("anton").render(&escape), "'anton'");
        assert_eq!(Value::string("o'brien").render(&escape), "'o''brien'");
    }

    #[test]
    fn render_date() {
        let v = Value::date(DateParts::new(2024, 1, 2, 3, 4, 5, 6));
        assert_eq!(
            v.render(&escape),
            "'2024-01-02 03:04:05.006'::timestamp(3)"
        );
    }

    #[test]
    fn render_binary_as_hex_bytea() {
        let v = Value::binary(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(v.render(&escape), "'\\xdeadbeef'::bytea");
    }
}
