//! The capability records expose so paths can be walked through them.

use crate::error::{Error, Result};
use crate::path::DEFAULT_SEPARATOR;
use crate::resolve;
use crate::value::{Record, Value};

/// Named attribute access on a record.
///
/// `get_attr` returns `None` when the attribute does not exist, which is not
/// the same as an attribute holding [`Value::Null`].
pub trait Attributes {
    fn get_attr(&self, name: &str) -> Option<Value>;

    /// For records whose reads can fail. `Ok(None)` still means absent;
    /// resolution goes through this method so failures are never mistaken
    /// for missing attributes.
    fn try_get_attr(&self, name: &str) -> Result<Option<Value>> {
        Ok(self.get_attr(name))
    }

    /// The whole object as a value, returned by the blank path.
    fn to_value(&self) -> Value;

    /// Mutable access to a nested record, used when setting through a path.
    fn attr_mut(&mut self, _name: &str) -> Option<&mut dyn Attributes> {
        None
    }

    fn set_attr(&mut self, name: &str, _value: Value) -> Result<()> {
        Err(Error::missing_attribute(self.type_name(), name))
    }

    fn type_name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }
}

pub trait AttributesExt: Attributes {
    fn get_path(&self, path: &str) -> Result<Value> {
        resolve::get_path(self, path, DEFAULT_SEPARATOR)
    }

    fn get_path_or(&self, path: &str, default: Value) -> Result<Value> {
        resolve::get_path_or(self, path, DEFAULT_SEPARATOR, default)
    }

    fn get_path_with(&self, path: &str, separator: &str, default: Option<Value>) -> Result<Value> {
        let parsed = crate::AttrPath::parse(path, separator);
        resolve::resolve(self, &parsed, default)
    }

    fn set_path(&mut self, path: &str, value: Value) -> Result<()> {
        resolve::set_path(self, path, value, DEFAULT_SEPARATOR)
    }
}

impl<T: Attributes + ?Sized> AttributesExt for T {}

pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl FromValue for Record {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Record(record) => Ok(record),
            other => Err(Error::type_mismatch(format!(
                "expected a record, got {}",
                other.type_name()
            ))),
        }
    }
}

impl FromValue for serde_json::Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value.to_json())
    }
}

pub(crate) fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

impl Attributes for Record {
    fn get_attr(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn to_value(&self) -> Value {
        Value::Record(self.clone())
    }

    fn attr_mut(&mut self, name: &str) -> Option<&mut dyn Attributes> {
        self.get_mut(name).map(|value| value as &mut dyn Attributes)
    }

    fn set_attr(&mut self, name: &str, value: Value) -> Result<()> {
        self.insert(name, value);
        Ok(())
    }

    fn type_name(&self) -> &str {
        self.name()
    }
}

impl Attributes for Value {
    fn get_attr(&self, name: &str) -> Option<Value> {
        match self {
            Value::Record(record) => record.get_attr(name),
            _ => None,
        }
    }

    fn to_value(&self) -> Value {
        self.clone()
    }

    fn attr_mut(&mut self, name: &str) -> Option<&mut dyn Attributes> {
        match self {
            Value::Record(record) => record.attr_mut(name),
            _ => None,
        }
    }

    fn set_attr(&mut self, name: &str, value: Value) -> Result<()> {
        match self {
            Value::Record(record) => record.set_attr(name, value),
            other => Err(Error::missing_attribute(other.type_name(), name)),
        }
    }

    fn type_name(&self) -> &str {
        Value::type_name(self)
    }
}

impl Attributes for serde_json::Value {
    fn get_attr(&self, name: &str) -> Option<Value> {
        self.as_object()
            .and_then(|map| map.get(name))
            .map(|inner| Value::from(inner.clone()))
    }

    fn to_value(&self) -> Value {
        Value::from(self.clone())
    }

    fn attr_mut(&mut self, name: &str) -> Option<&mut dyn Attributes> {
        self.as_object_mut()
            .and_then(|map| map.get_mut(name))
            .map(|inner| inner as &mut dyn Attributes)
    }

    fn set_attr(&mut self, name: &str, value: Value) -> Result<()> {
        match self.as_object_mut() {
            Some(map) => {
                map.insert(name.to_string(), value.to_json());
                Ok(())
            }
            None => Err(Error::missing_attribute(json_type_name(self), name)),
        }
    }

    fn type_name(&self) -> &str {
        json_type_name(self)
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "str",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}
