//! Ordered collections of records that can be filtered with lookup keys.
//!
//! ```
//! use attrwalk::{Collection, Record};
//!
//! let items: Collection<Record> = (1..=3)
//!     .map(|c| Record::new("Bar").with("c", c))
//!     .collect();
//! let big = items.filter([("c__gt", 1)]).unwrap();
//! assert_eq!(big.len(), 2);
//! ```

use std::fmt;
use std::ops::{Add, AddAssign, Index, IndexMut, Range};
use std::slice::SliceIndex;

use serde::{Deserialize, Serialize};

use crate::attributes::{short_type_name, Attributes, FromValue};
use crate::error::{Error, Result};
use crate::options::Options;
use crate::query::{Lookup, QueryPath};
use crate::schema::{Describe, RecordSchema};
use crate::value::Value;

/// Where [`Collection::assign`] writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    /// A single position, negative values count from the end.
    Index(isize),
    /// A span that is replaced wholesale. Bounds are clamped like slices.
    Range(Range<usize>),
}

/// What [`Collection::assign`] writes.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment<T> {
    One(T),
    Many(Vec<T>),
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<T> {
    items: Vec<T>,
    #[serde(skip)]
    options: Options,
}

impl<T> Collection<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self::with_options(items, Options::default())
    }

    pub fn with_options(items: Vec<T>, options: Options) -> Self {
        Self { items, options }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn separator(&self) -> &str {
        self.options.separator()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn into_inner(self) -> Vec<T> {
        self.items
    }

    /// Short name of the element type, e.g. `Bar` for `my_crate::Bar`.
    pub fn element_type(&self) -> &'static str {
        short_type_name(std::any::type_name::<T>())
    }

    pub fn append(&mut self, item: T) {
        self.items.push(item);
    }

    pub fn concat(mut self, other: impl IntoIterator<Item = T>) -> Self {
        self.items.extend(other);
        self
    }

    /// Appends the elements of a dynamic list. Nothing is appended unless
    /// every element converts.
    pub fn concat_value(mut self, value: &Value) -> Result<Self>
    where
        T: FromValue,
    {
        let Value::List(items) = value else {
            return Err(Error::type_mismatch(format!(
                "can only concatenate a list to Collection[{}], not {}",
                self.element_type(),
                value.type_name()
            )));
        };
        let converted = items
            .iter()
            .cloned()
            .map(T::from_value)
            .collect::<Result<Vec<T>>>()?;
        self.items.extend(converted);
        Ok(self)
    }

    /// Writes one element to an index or a list of elements over a range.
    /// Pairing an index with many elements, or a range with one, fails.
    pub fn assign(&mut self, slot: Slot, assignment: Assignment<T>) -> Result<()> {
        match (slot, assignment) {
            (Slot::Index(index), Assignment::One(item)) => {
                let len = self.items.len();
                let position = if index < 0 {
                    len.checked_sub(index.unsigned_abs())
                } else {
                    Some(index as usize).filter(|idx| *idx < len)
                };
                let idx = position.ok_or(Error::IndexOutOfRange { index, len })?;
                self.items[idx] = item;
                Ok(())
            }
            (Slot::Range(range), Assignment::Many(items)) => {
                let end = range.end.min(self.items.len());
                let start = range.start.min(end);
                self.items.splice(start..end, items);
                Ok(())
            }
            (Slot::Index(_), Assignment::Many(_)) => Err(Error::type_mismatch(
                "cannot assign many elements to a single index",
            )),
            (Slot::Range(_), Assignment::One(_)) => Err(Error::type_mismatch(
                "cannot assign a single element to a range",
            )),
        }
    }

    fn lookups<I, K, V>(&self, lookups: I) -> Vec<Lookup>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        Lookup::from_pairs(lookups, self.separator())
    }
}

impl<T: Attributes> Collection<T> {
    fn matching(&self, lookups: &[Lookup]) -> Result<Vec<&T>> {
        let mut survivors: Vec<&T> = self.items.iter().collect();
        for lookup in lookups {
            let before = survivors.len();
            let mut kept = Vec::with_capacity(before);
            for item in survivors {
                if lookup.evaluate(item)? {
                    kept.push(item);
                }
            }
            tracing::debug!(
                target: "attrwalk::collection",
                lookup = %lookup,
                before,
                after = kept.len(),
                "applied lookup"
            );
            survivors = kept;
        }
        Ok(survivors)
    }

    /// Keeps the elements matching all lookups, in their original order.
    ///
    /// Keys without an operator suffix compare with `exact`. A lookup whose
    /// path does not exist on an element is an error.
    pub fn filter<I, K, V>(&self, lookups: I) -> Result<Self>
    where
        T: Clone,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let lookups = self.lookups(lookups);
        let items = self
            .matching(&lookups)?
            .into_iter()
            .cloned()
            .collect();
        Ok(Self::with_options(items, self.options.clone()))
    }

    /// Drops the elements matching all lookups together. Without lookups
    /// nothing is dropped.
    pub fn exclude<I, K, V>(&self, lookups: I) -> Result<Self>
    where
        T: Clone,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let lookups = self.lookups(lookups);
        if lookups.is_empty() {
            return Ok(self.clone());
        }
        let mut kept = Vec::with_capacity(self.items.len());
        for item in &self.items {
            if !matches_all(item, &lookups)? {
                kept.push(item.clone());
            }
        }
        tracing::debug!(
            target: "attrwalk::collection",
            lookups = lookups.len(),
            before = self.items.len(),
            after = kept.len(),
            "excluded"
        );
        Ok(Self::with_options(kept, self.options.clone()))
    }

    pub fn get<I, K, V>(&self, lookups: I) -> Result<&T>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let lookups = self.lookups(lookups);
        let mut found = self.matching(&lookups)?;
        match found.len() {
            1 => Ok(found.remove(0)),
            0 => Err(Error::AmbiguousResult {
                message: "get() returned no items".into(),
            }),
            _ => Err(Error::AmbiguousResult {
                message: "get() returned more than one item".into(),
            }),
        }
    }

    /// Like [`Collection::get`], but returns `default` unless exactly one
    /// element matches.
    pub fn get_or<I, K, V>(&self, lookups: I, default: T) -> Result<T>
    where
        T: Clone,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let lookups = self.lookups(lookups);
        let found = self.matching(&lookups)?;
        match found.as_slice() {
            [item] => Ok((*item).clone()),
            _ => Ok(default),
        }
    }
}

impl<T: Describe> Collection<T> {
    pub fn element_schema(&self) -> RecordSchema {
        T::describe()
    }

    /// Checks that `key` names declared fields, without touching elements.
    pub fn validate_lookup(&self, key: &str) -> Result<()> {
        let query = QueryPath::parse(key, self.separator());
        if query.path().is_blank() {
            return Ok(());
        }
        T::describe().validate(query.path()).map(|_| ())
    }
}

fn matches_all<T: Attributes + ?Sized>(item: &T, lookups: &[Lookup]) -> Result<bool> {
    for lookup in lookups {
        if !lookup.evaluate(item)? {
            return Ok(false);
        }
    }
    Ok(true)
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl<T: PartialEq> PartialEq for Collection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: PartialEq> PartialEq<Vec<T>> for Collection<T> {
    fn eq(&self, other: &Vec<T>) -> bool {
        &self.items == other
    }
}

impl<T> From<Vec<T>> for Collection<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(items)
    }
}

impl<T> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<T> Extend<T> for Collection<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<T> IntoIterator for Collection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Collection<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter_mut()
    }
}

impl<T, I: SliceIndex<[T]>> Index<I> for Collection<T> {
    type Output = I::Output;

    fn index(&self, index: I) -> &Self::Output {
        &self.items[index]
    }
}

impl<T, I: SliceIndex<[T]>> IndexMut<I> for Collection<T> {
    fn index_mut(&mut self, index: I) -> &mut Self::Output {
        &mut self.items[index]
    }
}

impl<T> Add for Collection<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.concat(rhs)
    }
}

impl<T> Add<Vec<T>> for Collection<T> {
    type Output = Self;

    fn add(self, rhs: Vec<T>) -> Self {
        self.concat(rhs)
    }
}

impl<T> AddAssign for Collection<T> {
    fn add_assign(&mut self, rhs: Self) {
        self.items.extend(rhs.items);
    }
}

impl<T> AddAssign<Vec<T>> for Collection<T> {
    fn add_assign(&mut self, rhs: Vec<T>) {
        self.items.extend(rhs);
    }
}

impl<T: fmt::Debug> fmt::Debug for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Collection[{}](", self.element_type())?;
        f.debug_list().entries(&self.items).finish()?;
        f.write_str(")")
    }
}

impl<T: fmt::Display> fmt::Display for Collection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Collection[{}]([", self.element_type())?;
        for (idx, item) in self.items.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{item}")?;
        }
        f.write_str("])")
    }
}
