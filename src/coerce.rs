//! Lexical coercion: read an operand as an exact decimal when possible,
//! otherwise as its text form.

use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::error::{Error, Result};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Lex {
    Decimal(BigDecimal),
    Text(String),
}

impl Lex {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decimal(_) => "decimal",
            Self::Text(_) => "text",
        }
    }
}

/// Reads `value` as an arbitrary-precision decimal. Floats go through their
/// shortest text form so `42.3` becomes `42.3`, not its binary expansion.
pub fn coerce_to_decimal(value: &Value) -> Result<BigDecimal> {
    let parsed = match value {
        Value::Decimal(d) => Some(d.clone()),
        Value::Int(i) => Some(BigDecimal::from(*i)),
        Value::Float(f) if f.is_finite() => parse_decimal(&f.to_string()),
        Value::Str(s) => parse_decimal(s),
        _ => None,
    };
    parsed.ok_or_else(|| Error::coercion(value.to_string(), "decimal"))
}

/// Decimal if the operand parses as one, its text form otherwise. Lists and
/// records have neither.
pub fn decimal_or_text(value: &Value) -> Result<Lex> {
    match value {
        Value::List(_) | Value::Record(_) => Err(Error::coercion(value.to_string(), "decimal or text")),
        other => Ok(coerce_to_decimal(other)
            .map(Lex::Decimal)
            .unwrap_or_else(|_| Lex::Text(other.to_string()))),
    }
}

fn parse_decimal(text: &str) -> Option<BigDecimal> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    BigDecimal::from_str(trimmed).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(text: &str) -> BigDecimal {
        BigDecimal::from_str(text).unwrap()
    }

    #[test]
    fn coerces_numbers_and_numeric_text() {
        assert_eq!(coerce_to_decimal(&Value::Int(42)).unwrap(), dec("42"));
        assert_eq!(coerce_to_decimal(&Value::Float(42.3)).unwrap(), dec("42.3"));
        assert_eq!(coerce_to_decimal(&Value::from("42")).unwrap(), dec("42"));
        assert_eq!(coerce_to_decimal(&Value::from("42.3")).unwrap(), dec("42.3"));
        assert_eq!(coerce_to_decimal(&Value::from(" 7 ")).unwrap(), dec("7"));
        assert_eq!(coerce_to_decimal(&Value::from("1.5e2")).unwrap(), dec("150"));
    }

    #[test]
    fn keeps_digits_past_28_places() {
        let tiny = coerce_to_decimal(&Value::Float(1e-30)).unwrap();
        assert_eq!(tiny, dec("1e-30"));
        assert_ne!(tiny, coerce_to_decimal(&Value::Float(2e-30)).unwrap());
        assert_ne!(tiny, BigDecimal::from(0));

        let long = coerce_to_decimal(&Value::from("0.00000000000000000000000000001")).unwrap();
        assert_ne!(long, BigDecimal::from(0));
        assert_ne!(
            coerce_to_decimal(&Value::from("1.00000000000000000000000000000001")).unwrap(),
            coerce_to_decimal(&Value::from("1.00000000000000000000000000000002")).unwrap()
        );
    }

    #[test]
    fn large_magnitudes_stay_numeric() {
        assert_eq!(
            coerce_to_decimal(&Value::Float(1e30)).unwrap(),
            dec("1000000000000000000000000000000")
        );
        assert_eq!(coerce_to_decimal(&Value::from("1e40")).unwrap(), dec("1e40"));
        assert!(matches!(decimal_or_text(&Value::from("-2.5E+60")).unwrap(), Lex::Decimal(_)));
        assert_eq!(
            coerce_to_decimal(&Value::from(u64::MAX)).unwrap(),
            dec("18446744073709551615")
        );
    }

    #[test]
    fn rejects_non_numeric() {
        assert!(coerce_to_decimal(&Value::Null).is_err());
        assert!(coerce_to_decimal(&Value::from("hello")).is_err());
        assert!(coerce_to_decimal(&Value::Float(f64::NAN)).is_err());
        assert!(coerce_to_decimal(&Value::from("")).is_err());
    }

    #[test]
    fn falls_back_to_text() {
        assert_eq!(decimal_or_text(&Value::Int(42)).unwrap(), Lex::Decimal(dec("42")));
        assert_eq!(decimal_or_text(&Value::from("hello")).unwrap(), Lex::Text("hello".into()));
        assert_eq!(decimal_or_text(&Value::Null).unwrap(), Lex::Text("null".into()));
        assert_eq!(decimal_or_text(&Value::Bool(true)).unwrap(), Lex::Text("true".into()));
    }

    #[test]
    fn containers_do_not_coerce() {
        let err = decimal_or_text(&Value::from(vec![1, 2])).unwrap_err();
        assert_eq!(err, Error::coercion("[1, 2]", "decimal or text"));
    }
}
