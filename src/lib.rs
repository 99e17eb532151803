//! Attribute paths and Django-style lookups over collections of records.
//!
//! A path such as `a__b__c` walks nested attributes; a lookup key adds a
//! trailing operator (`a__b__gt`) that compares the value found there.
//!
//! ```
//! use attrwalk::{AttributesExt, Collection, Record, Value};
//!
//! let foo = Record::new("Foo").with("a", Record::new("Bar").with("c", 2));
//! assert_eq!(foo.get_path("a__c").unwrap(), Value::Int(2));
//!
//! let items: Collection<Record> = vec![foo].into();
//! assert_eq!(items.filter([("a__c__gte", 2)]).unwrap().len(), 1);
//! ```

mod attributes;
pub mod coerce;
mod collection;
mod error;
pub mod operators;
mod options;
mod path;
#[cfg(feature = "python")]
mod python;
mod query;
pub mod resolve;
mod schema;
mod value;

pub use attributes::{Attributes, AttributesExt, FromValue};
pub use collection::{Assignment, Collection, Slot};
pub use error::{Error, Result};
pub use operators::Operator;
pub use options::Options;
pub use path::{AttrPath, DEFAULT_SEPARATOR};
pub use query::{Lookup, QueryPath};
pub use resolve::{get_path, get_path_or, set_path};
pub use schema::{Describe, FieldType, RecordSchema};
pub use value::{Record, Value};
