//! Walking and writing attribute paths.
//!
//! Reads come in two flavours. Strict reads fail with
//! [`Error::MissingAttribute`] as soon as an attribute is absent; defaulted
//! reads hand back the caller's default instead. Both stop at the first
//! `null` and return it, no matter how many tokens are left.

use crate::attributes::Attributes;
use crate::error::{Error, Result};
use crate::path::AttrPath;
use crate::value::Value;

pub fn get_path<T: Attributes + ?Sized>(obj: &T, path: &str, separator: &str) -> Result<Value> {
    resolve(obj, &AttrPath::parse(path, separator), None)
}

/// Defaulted lookup: the first missing attribute yields `default`. Only a
/// failing [`Attributes::try_get_attr`] can make this an error.
pub fn get_path_or<T: Attributes + ?Sized>(
    obj: &T,
    path: &str,
    separator: &str,
    default: Value,
) -> Result<Value> {
    resolve(obj, &AttrPath::parse(path, separator), Some(default))
}

/// Follows `path` from `obj`. With `default` set, a missing attribute
/// returns it; without, a missing attribute is an error.
pub fn resolve<T: Attributes + ?Sized>(
    obj: &T,
    path: &AttrPath,
    default: Option<Value>,
) -> Result<Value> {
    if path.is_blank() {
        return Ok(obj.to_value());
    }

    let mut tokens = path.iter();
    let Some(first) = tokens.next() else {
        return Ok(obj.to_value());
    };

    let mut current = match obj.try_get_attr(first)? {
        Some(value) => value,
        None => return missing(obj, path, obj.type_name(), first, default),
    };

    for name in tokens {
        if current.is_null() {
            return Ok(Value::Null);
        }
        current = match current {
            Value::Record(mut record) => match record.take(name) {
                Some(value) => value,
                None => return missing(obj, path, record.name(), name, default),
            },
            other => return missing(obj, path, other.type_name(), name, default),
        };
    }

    Ok(current)
}

fn missing<T: Attributes + ?Sized>(
    obj: &T,
    path: &AttrPath,
    owner: &str,
    attribute: &str,
    default: Option<Value>,
) -> Result<Value> {
    match default {
        Some(value) => {
            tracing::trace!(
                target: "attrwalk::resolve",
                path = %path,
                owner,
                attribute,
                "attribute missing, returning default"
            );
            Ok(value)
        }
        None => Err(Error::missing_attribute(owner, attribute).within(obj.type_name(), &path.render())),
    }
}

/// Sets the attribute at the end of `path`. Every attribute before it must
/// already exist; the last one is created or overwritten.
pub fn set_path<T: Attributes + ?Sized>(
    obj: &mut T,
    path: &str,
    value: Value,
    separator: &str,
) -> Result<()> {
    set_attr_path(obj, &AttrPath::parse(path, separator), value)
}

pub fn set_attr_path<T: Attributes + ?Sized>(
    obj: &mut T,
    path: &AttrPath,
    value: Value,
) -> Result<()> {
    if path.is_blank() {
        return Err(Error::EmptyPath);
    }

    let root = obj.type_name().to_string();
    let full = path.render();
    let mut parents: Vec<&str> = path.iter().collect();
    let Some(last) = parents.pop() else {
        return Err(Error::EmptyPath);
    };

    let Some((first, rest)) = parents.split_first() else {
        return obj.set_attr(last, value).map_err(|err| err.within(&root, &full));
    };

    let mut current: &mut dyn Attributes = match obj.attr_mut(first) {
        Some(next) => next,
        None => return Err(Error::missing_attribute(root.as_str(), *first).within(&root, &full)),
    };

    for name in rest {
        let owner = current.type_name().to_string();
        current = match current.attr_mut(name) {
            Some(next) => next,
            None => return Err(Error::missing_attribute(owner, *name).within(&root, &full)),
        };
    }

    current
        .set_attr(last, value)
        .map_err(|err| err.within(&root, &full))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Record;

    fn nested() -> Record {
        Record::new("Bar").with("b", Record::new("Bar").with("b", 42))
    }

    #[test]
    fn blank_path_returns_object() {
        let bar = Record::new("Bar").with("b", 42);
        assert_eq!(get_path(&bar, "", "__").unwrap(), Value::Record(bar.clone()));
    }

    #[test]
    fn nested_lookup() {
        let foo = nested();
        assert_eq!(get_path(&foo, "b__b", "__").unwrap(), Value::Int(42));
        assert_eq!(
            get_path(&foo, "b", "__").unwrap(),
            Value::Record(Record::new("Bar").with("b", 42))
        );
    }

    #[test]
    fn strict_lookup_reports_full_path() {
        let foo = nested();
        let err = get_path(&foo, "b__x", "__").unwrap_err();
        assert_eq!(
            err,
            Error::MissingAttribute {
                type_name: "Bar".into(),
                path: "b__x".into(),
                owner: "Bar".into(),
                attribute: "x".into(),
            }
        );
        assert!(get_path(&foo, "a", "__").unwrap_err().is_missing_attribute());
    }

    #[test]
    fn defaulted_lookup() {
        let bar = Record::new("Bar").with("b", 42);
        assert_eq!(get_path_or(&bar, "a", "__", Value::Null), Ok(Value::Null));
        assert_eq!(get_path_or(&bar, "a", "__", Value::Int(43)), Ok(Value::Int(43)));
        assert_eq!(get_path_or(&bar, "b", "__", Value::Null), Ok(Value::Int(42)));
        assert_eq!(
            get_path_or(&bar, "b__c__d", "__", Value::from("x")),
            Ok(Value::from("x"))
        );
    }

    struct Flaky;

    impl Attributes for Flaky {
        fn get_attr(&self, _name: &str) -> Option<Value> {
            None
        }

        fn try_get_attr(&self, name: &str) -> Result<Option<Value>> {
            match name {
                "broken" => Err(Error::attribute_access(name, "sensor offline")),
                "ok" => Ok(Some(Value::Int(1))),
                _ => Ok(None),
            }
        }

        fn to_value(&self) -> Value {
            Value::Null
        }
    }

    #[test]
    fn read_failures_are_not_missing_attributes() {
        let err = get_path(&Flaky, "broken__x", "__").unwrap_err();
        assert_eq!(err, Error::attribute_access("broken", "sensor offline"));

        let err = get_path_or(&Flaky, "broken", "__", Value::Int(0)).unwrap_err();
        assert!(!err.is_missing_attribute());

        assert_eq!(get_path_or(&Flaky, "absent", "__", Value::Int(0)), Ok(Value::Int(0)));
        assert_eq!(get_path(&Flaky, "ok", "__"), Ok(Value::Int(1)));
    }

    #[test]
    fn null_short_circuits_even_when_strict() {
        let bar = Record::new("Bar").with("b", Value::Null);
        assert_eq!(get_path(&bar, "b", "__").unwrap(), Value::Null);
        assert_eq!(get_path(&bar, "b__c__d", "__").unwrap(), Value::Null);
    }

    #[test]
    fn custom_separator() {
        let foo = nested();
        assert_eq!(get_path(&foo, "b.b", ".").unwrap(), Value::Int(42));
    }

    #[test]
    fn set_simple_and_nested() {
        let mut bar = Record::new("Bar").with("b", 42);
        set_path(&mut bar, "b", Value::Int(43), "__").unwrap();
        assert_eq!(bar.get("b"), Some(&Value::Int(43)));

        let mut foo = nested();
        set_path(&mut foo, "b__b", Value::Int(43), "__").unwrap();
        assert_eq!(get_path(&foo, "b__b", "__").unwrap(), Value::Int(43));

        set_path(&mut foo, "b__fresh", Value::from("new"), "__").unwrap();
        assert_eq!(get_path(&foo, "b__fresh", "__").unwrap(), Value::from("new"));
    }

    #[test]
    fn set_requires_intermediates() {
        let mut foo = nested();
        let err = set_path(&mut foo, "x__y", Value::Int(1), "__").unwrap_err();
        assert_eq!(err, Error::missing_attribute("Bar", "x").within("Bar", "x__y"));

        let err = set_path(&mut foo, "b__b__c", Value::Int(1), "__").unwrap_err();
        assert_eq!(err, Error::missing_attribute("int", "c").within("Bar", "b__b__c"));

        assert_eq!(set_path(&mut foo, "", Value::Int(1), "__"), Err(Error::EmptyPath));
    }
}
