//! Lookup keys: an attribute path with an optional trailing operator.

use std::fmt;
use std::str::FromStr;

use crate::attributes::Attributes;
use crate::error::Result;
use crate::operators::Operator;
use crate::path::{AttrPath, DEFAULT_SEPARATOR};
use crate::resolve::resolve;
use crate::value::Value;

/// A parsed lookup key such as `a__b__gt`.
///
/// The last token is read as an operator whenever it names one, so an
/// attribute literally called `in` or `gt` cannot be the final step of a
/// key. Spell the operator out (`tags__in__exact`) to reach such a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryPath {
    path: AttrPath,
    operator: Operator,
}

impl QueryPath {
    pub fn new(path: AttrPath, operator: Operator) -> Self {
        Self { path, operator }
    }

    pub fn parse(value: &str, separator: &str) -> Self {
        let mut path = AttrPath::parse(value, separator);
        match path.get(-1).and_then(Operator::find) {
            Some(operator) => {
                path.truncate(path.depth() - 1);
                Self { path, operator }
            }
            None => Self {
                path,
                operator: Operator::Exact,
            },
        }
    }

    pub fn path(&self) -> &AttrPath {
        &self.path
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn separator(&self) -> &str {
        self.path.separator()
    }
}

impl fmt::Display for QueryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_blank() {
            return write!(f, "{}", self.operator);
        }
        write!(f, "{}{}{}", self.path, self.path.separator(), self.operator)
    }
}

impl FromStr for QueryPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s, DEFAULT_SEPARATOR))
    }
}

/// One predicate of a filter: resolve the key's path on an element, then
/// compare the result with `value` using the key's operator.
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup {
    query: QueryPath,
    value: Value,
}

impl Lookup {
    pub fn new(key: &str, value: impl Into<Value>, separator: &str) -> Self {
        Self {
            query: QueryPath::parse(key, separator),
            value: value.into(),
        }
    }

    pub fn from_query(query: QueryPath, value: impl Into<Value>) -> Self {
        Self {
            query,
            value: value.into(),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I, separator: &str) -> Vec<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        pairs
            .into_iter()
            .map(|(key, value)| Self::new(key.as_ref(), value, separator))
            .collect()
    }

    pub fn query(&self) -> &QueryPath {
        &self.query
    }

    pub fn path(&self) -> &AttrPath {
        self.query.path()
    }

    pub fn operator(&self) -> Operator {
        self.query.operator()
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Missing attributes are errors here, never a silent `false`.
    pub fn evaluate<T: Attributes + ?Sized>(&self, item: &T) -> Result<bool> {
        let resolved = resolve(item, self.query.path(), None)?;
        self.query.operator().evaluate(&resolved, &self.value)
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.query, self.value)
    }
}
