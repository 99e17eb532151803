use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// An attribute somewhere along a path does not exist.
    ///
    /// `type_name` and `path` describe the lookup the caller asked for,
    /// `owner` and `attribute` the step that failed.
    #[error(
        "'{type_name}' object has no attribute path '{path}', since '{owner}' object has no attribute '{attribute}'"
    )]
    MissingAttribute {
        type_name: String,
        path: String,
        owner: String,
        attribute: String,
    },

    /// Reading an attribute failed for a reason other than its absence.
    #[error("Reading attribute '{attribute}' failed: {message}")]
    AttributeAccess { attribute: String, message: String },

    #[error("Operator '{name}' not found")]
    UnknownOperator { name: String },

    #[error("{message}")]
    AmbiguousResult { message: String },

    #[error("{message}")]
    TypeMismatch { message: String },

    #[error("Cannot coerce value {value} to {expected}.")]
    Coercion { value: String, expected: String },

    #[error("Cannot pop from an empty path.")]
    EmptyPath,

    #[error("Index {index} is out of range for length {len}.")]
    IndexOutOfRange { index: isize, len: usize },

    #[error("Invalid path '{path}' at token '{token}': {message}")]
    InvalidPath {
        path: String,
        token: String,
        message: String,
    },
}

impl Error {
    pub fn missing_attribute(owner: impl Into<String>, attribute: impl Into<String>) -> Self {
        let owner = owner.into();
        let attribute = attribute.into();
        Self::MissingAttribute {
            type_name: owner.clone(),
            path: attribute.clone(),
            owner,
            attribute,
        }
    }

    /// Re-anchors a missing attribute error to the lookup that triggered it.
    pub fn within(self, root: &str, full_path: &str) -> Self {
        match self {
            Self::MissingAttribute {
                owner, attribute, ..
            } => Self::MissingAttribute {
                type_name: root.to_string(),
                path: full_path.to_string(),
                owner,
                attribute,
            },
            other => other,
        }
    }

    pub fn attribute_access(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        Self::AttributeAccess {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    pub fn coercion(value: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::Coercion {
            value: value.into(),
            expected: expected.into(),
        }
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            message: message.into(),
        }
    }

    pub fn is_missing_attribute(&self) -> bool {
        matches!(self, Self::MissingAttribute { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_attribute_names_full_path_and_cause() {
        let err = Error::missing_attribute("Bar", "d").within("Foo", "a__d");
        assert_eq!(
            err.to_string(),
            "'Foo' object has no attribute path 'a__d', since 'Bar' object has no attribute 'd'"
        );
    }

    #[test]
    fn within_leaves_other_errors_alone() {
        let err = Error::EmptyPath.within("Foo", "a");
        assert_eq!(err, Error::EmptyPath);
    }
}
