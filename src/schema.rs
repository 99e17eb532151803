//! Declared structure of record types, used to check lookup keys before
//! any element is visited.

use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;

use crate::error::{Error, Result};
use crate::path::AttrPath;

static IDENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

pub trait Describe {
    fn describe() -> RecordSchema;
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Scalar,
    List(Box<FieldType>),
    Record(RecordSchema),
    /// Anything goes below this field; validation stops here.
    Any,
}

impl FieldType {
    pub fn list(inner: FieldType) -> Self {
        Self::List(Box::new(inner))
    }

    pub fn record<T: Describe>() -> Self {
        Self::Record(T::describe())
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::Scalar => "scalar",
            Self::List(_) => "list",
            Self::Record(schema) => schema.name(),
            Self::Any => "any",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    name: String,
    fields: IndexMap<String, FieldType>,
}

impl RecordSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: IndexMap::new(),
        }
    }

    pub fn field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.fields.insert(name.into(), field_type);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self, name: &str) -> Option<&FieldType> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldType)> {
        self.fields.iter().map(|(name, ty)| (name.as_str(), ty))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Walks `path` through the declared fields and returns the type at its
    /// end. Only record fields can be descended into.
    pub fn validate(&self, path: &AttrPath) -> Result<&FieldType> {
        if path.is_blank() {
            return Err(Error::EmptyPath);
        }

        let rendered = path.render();
        let last = path.depth() - 1;
        let mut current = self;

        for (depth, token) in path.iter().enumerate() {
            if !IDENT_RE.is_match(token) {
                return Err(Error::InvalidPath {
                    path: rendered,
                    token: token.to_string(),
                    message: "not a valid attribute name".into(),
                });
            }

            let Some(field_type) = current.field_type(token) else {
                return Err(Error::missing_attribute(current.name(), token).within(&self.name, &rendered));
            };

            if depth == last {
                return Ok(field_type);
            }

            match field_type {
                FieldType::Record(schema) => current = schema,
                FieldType::Any => return Ok(field_type),
                other => {
                    let next = path.get(depth as isize + 1).unwrap_or_default();
                    return Err(Error::missing_attribute(other.kind(), next).within(&self.name, &rendered));
                }
            }
        }

        Err(Error::EmptyPath)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bar;

    impl Describe for Bar {
        fn describe() -> RecordSchema {
            RecordSchema::new("Bar")
                .field("c", FieldType::Scalar)
                .field("tags", FieldType::list(FieldType::Scalar))
                .field("extra", FieldType::Any)
        }
    }

    struct Foo;

    impl Describe for Foo {
        fn describe() -> RecordSchema {
            RecordSchema::new("Foo").field("a", FieldType::record::<Bar>())
        }
    }

    fn path(text: &str) -> AttrPath {
        AttrPath::parse(text, "__")
    }

    #[test]
    fn resolves_declared_fields() {
        let schema = Foo::describe();
        assert_eq!(schema.validate(&path("a__c")).unwrap(), &FieldType::Scalar);
        assert_eq!(
            schema.validate(&path("a__tags")).unwrap(),
            &FieldType::list(FieldType::Scalar)
        );
        assert_eq!(schema.validate(&path("a")).unwrap().kind(), "Bar");
    }

    #[test]
    fn any_stops_validation() {
        let schema = Foo::describe();
        assert_eq!(schema.validate(&path("a__extra__whatever__x")).unwrap(), &FieldType::Any);
    }

    #[test]
    fn unknown_field_is_missing() {
        let err = Foo::describe().validate(&path("a__nope")).unwrap_err();
        assert_eq!(err, Error::missing_attribute("Bar", "nope").within("Foo", "a__nope"));
    }

    #[test]
    fn cannot_descend_into_scalars() {
        let err = Foo::describe().validate(&path("a__c__d")).unwrap_err();
        assert_eq!(err, Error::missing_attribute("scalar", "d").within("Foo", "a__c__d"));
    }

    #[test]
    fn rejects_malformed_tokens() {
        let err = Foo::describe().validate(&path("a____c")).unwrap_err();
        assert!(matches!(err, Error::InvalidPath { ref token, .. } if token.is_empty()));

        let err = Foo::describe().validate(&path("a__1c")).unwrap_err();
        assert!(matches!(err, Error::InvalidPath { ref token, .. } if token == "1c"));
    }

    #[test]
    fn blank_path_is_empty() {
        assert_eq!(Foo::describe().validate(&path("")), Err(Error::EmptyPath));
    }
}
