use serde::{Deserialize, Serialize};

use crate::path::DEFAULT_SEPARATOR;

/// Settings shared by lookups on a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub separator: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl Options {
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_double_underscore() {
        assert_eq!(Options::default().separator(), "__");
        assert_eq!(Options::default().with_separator(".").separator(), ".");
    }

    #[test]
    fn deserializes_with_missing_fields() {
        let options: Options = serde_json::from_str("{}").unwrap();
        assert_eq!(options, Options::default());

        let options: Options = serde_json::from_str(r#"{"separator": "/"}"#).unwrap();
        assert_eq!(options.separator(), "/");
    }
}
