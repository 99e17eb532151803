//! The closed set of comparison operators a lookup key can end with.
//!
//! Equality and ordering go through lexical coercion, so `42`, `"42"` and
//! `42.0` are all the same value. The string operators need text on both
//! sides; their `i`-prefixed forms compare lower-cased. `in` checks
//! membership without coercion and `range` is inclusive on both ends.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::coerce::{coerce_to_decimal, decimal_or_text, Lex};
use crate::error::{Error, Result};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Operator {
    #[default]
    Exact,
    IExact,
    Contains,
    IContains,
    In,
    Gt,
    Gte,
    Lt,
    Lte,
    Ne,
    StartsWith,
    IStartsWith,
    EndsWith,
    IEndsWith,
    Range,
}

impl Operator {
    pub const ALL: [Operator; 15] = [
        Self::Exact,
        Self::IExact,
        Self::Contains,
        Self::IContains,
        Self::In,
        Self::Gt,
        Self::Gte,
        Self::Lt,
        Self::Lte,
        Self::Ne,
        Self::StartsWith,
        Self::IStartsWith,
        Self::EndsWith,
        Self::IEndsWith,
        Self::Range,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::IExact => "iexact",
            Self::Contains => "contains",
            Self::IContains => "icontains",
            Self::In => "in",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Ne => "ne",
            Self::StartsWith => "startswith",
            Self::IStartsWith => "istartswith",
            Self::EndsWith => "endswith",
            Self::IEndsWith => "iendswith",
            Self::Range => "range",
        }
    }

    /// Case-insensitive lookup by name.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::find(name).ok_or_else(|| Error::UnknownOperator {
            name: name.to_uppercase(),
        })
    }

    /// Like [`Operator::from_name`], but an unknown name yields `default`
    /// when one is given.
    pub fn lookup(name: &str, default: Option<Operator>) -> Result<Self> {
        match (Self::find(name), default) {
            (Some(op), _) => Ok(op),
            (None, Some(fallback)) => Ok(fallback),
            (None, None) => Err(Error::UnknownOperator {
                name: name.to_uppercase(),
            }),
        }
    }

    /// Reads the operator from whatever follows the last `_` in `path`.
    pub fn from_path_suffix(path: &str, default: Option<Operator>) -> Result<Self> {
        let suffix = path.rsplit('_').next().unwrap_or(path);
        Self::lookup(suffix, default)
    }

    pub(crate) fn find(name: &str) -> Option<Self> {
        let wanted = name.to_uppercase();
        Self::ALL
            .into_iter()
            .find(|op| op.name().eq_ignore_ascii_case(&wanted))
    }

    pub fn evaluate(self, value: &Value, rhs: &Value) -> Result<bool> {
        match self {
            Self::Exact => equals(value, rhs),
            Self::IExact => iequal(value, rhs),
            Self::Contains => contains(value, rhs),
            Self::IContains => icontains(value, rhs),
            Self::In => is_in(value, rhs),
            Self::Gt => greater_than(value, rhs),
            Self::Gte => greater_than_or_equal(value, rhs),
            Self::Lt => less_than(value, rhs),
            Self::Lte => less_than_or_equal(value, rhs),
            Self::Ne => not_equal(value, rhs),
            Self::StartsWith => starts_with(value, rhs),
            Self::IStartsWith => istarts_with(value, rhs),
            Self::EndsWith => ends_with(value, rhs),
            Self::IEndsWith => iends_with(value, rhs),
            Self::Range => in_range(value, rhs),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

pub fn equals(value: &Value, rhs: &Value) -> Result<bool> {
    Ok(decimal_or_text(value)? == decimal_or_text(rhs)?)
}

pub fn not_equal(value: &Value, rhs: &Value) -> Result<bool> {
    equals(value, rhs).map(|eq| !eq)
}

pub fn greater_than(value: &Value, rhs: &Value) -> Result<bool> {
    Ok(lexical_cmp(value, rhs)? == Ordering::Greater)
}

pub fn greater_than_or_equal(value: &Value, rhs: &Value) -> Result<bool> {
    Ok(lexical_cmp(value, rhs)? != Ordering::Less)
}

pub fn less_than(value: &Value, rhs: &Value) -> Result<bool> {
    Ok(lexical_cmp(value, rhs)? == Ordering::Less)
}

pub fn less_than_or_equal(value: &Value, rhs: &Value) -> Result<bool> {
    Ok(lexical_cmp(value, rhs)? != Ordering::Greater)
}

fn lexical_cmp(value: &Value, rhs: &Value) -> Result<Ordering> {
    match (decimal_or_text(value)?, decimal_or_text(rhs)?) {
        (Lex::Decimal(a), Lex::Decimal(b)) => Ok(a.cmp(&b)),
        (Lex::Text(a), Lex::Text(b)) => Ok(a.cmp(&b)),
        (_, other) => Err(Error::coercion(value.to_string(), other.kind())),
    }
}

fn text_pair<'a>(value: &'a Value, rhs: &'a Value) -> Result<(&'a str, &'a str)> {
    let left = value
        .as_str()
        .ok_or_else(|| Error::coercion(value.to_string(), "text"))?;
    let right = rhs
        .as_str()
        .ok_or_else(|| Error::coercion(rhs.to_string(), "text"))?;
    Ok((left, right))
}

pub fn contains(value: &Value, rhs: &Value) -> Result<bool> {
    let (haystack, needle) = text_pair(value, rhs)?;
    Ok(haystack.contains(needle))
}

pub fn icontains(value: &Value, rhs: &Value) -> Result<bool> {
    let (haystack, needle) = text_pair(value, rhs)?;
    Ok(haystack.to_lowercase().contains(&needle.to_lowercase()))
}

pub fn starts_with(value: &Value, rhs: &Value) -> Result<bool> {
    let (text, prefix) = text_pair(value, rhs)?;
    Ok(text.starts_with(prefix))
}

pub fn istarts_with(value: &Value, rhs: &Value) -> Result<bool> {
    let (text, prefix) = text_pair(value, rhs)?;
    Ok(text.to_lowercase().starts_with(&prefix.to_lowercase()))
}

pub fn ends_with(value: &Value, rhs: &Value) -> Result<bool> {
    let (text, suffix) = text_pair(value, rhs)?;
    Ok(text.ends_with(suffix))
}

pub fn iends_with(value: &Value, rhs: &Value) -> Result<bool> {
    let (text, suffix) = text_pair(value, rhs)?;
    Ok(text.to_lowercase().ends_with(&suffix.to_lowercase()))
}

pub fn iequal(value: &Value, rhs: &Value) -> Result<bool> {
    let (left, right) = text_pair(value, rhs)?;
    Ok(left.to_lowercase() == right.to_lowercase())
}

/// Membership in a list, or substring of a string.
pub fn is_in(value: &Value, rhs: &Value) -> Result<bool> {
    match (value, rhs) {
        (_, Value::List(items)) => Ok(items.iter().any(|item| same_value(value, item))),
        (Value::Str(needle), Value::Str(haystack)) => Ok(haystack.contains(needle.as_str())),
        _ => Err(Error::coercion(rhs.to_string(), "list")),
    }
}

/// Plain equality, except numbers of different representations compare
/// by value.
fn same_value(value: &Value, item: &Value) -> bool {
    if value.is_number() && item.is_number() {
        if let (Ok(a), Ok(b)) = (coerce_to_decimal(value), coerce_to_decimal(item)) {
            return a == b;
        }
    }
    value == item
}

/// `low <= value <= high` for a `[low, high]` pair.
pub fn in_range(value: &Value, rhs: &Value) -> Result<bool> {
    let [low, high] = match rhs.as_list() {
        Some([low, high]) => [low, high],
        _ => return Err(Error::coercion(rhs.to_string(), "a [low, high] pair")),
    };

    if value.is_number() && low.is_number() && high.is_number() {
        let v = coerce_to_decimal(value)?;
        return Ok(coerce_to_decimal(low)? <= v && v <= coerce_to_decimal(high)?);
    }

    match (value, low, high) {
        (Value::Str(v), Value::Str(lo), Value::Str(hi)) => Ok(lo <= v && v <= hi),
        _ => Err(Error::coercion(
            value.to_string(),
            format!("a value comparable with {rhs}"),
        )),
    }
}
