//! Delimited attribute paths such as `a__b__c`.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

pub const DEFAULT_SEPARATOR: &str = "__";

/// An ordered sequence of attribute names and the separator that joins them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttrPath {
    separator: String,
    parts: VecDeque<String>,
}

impl AttrPath {
    /// Splits `path` on `separator`. An empty string yields a single empty
    /// token, see [`AttrPath::is_blank`]. An empty separator never splits.
    pub fn parse(path: &str, separator: &str) -> Self {
        let parts = if separator.is_empty() {
            VecDeque::from([path.to_string()])
        } else {
            path.split(separator).map(str::to_string).collect()
        };
        Self {
            separator: separator.to_string(),
            parts,
        }
    }

    pub fn from_parts<I, S>(parts: I, separator: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            separator: separator.to_string(),
            parts: parts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn parts(&self) -> &VecDeque<String> {
        &self.parts
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.parts.iter().map(String::as_str)
    }

    pub fn depth(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// True for the path parsed from an empty string: it addresses the
    /// object itself rather than any attribute.
    pub fn is_blank(&self) -> bool {
        match self.parts.len() {
            0 => true,
            1 => self.parts[0].is_empty(),
            _ => false,
        }
    }

    pub fn render(&self) -> String {
        let parts: Vec<&str> = self.iter().collect();
        parts.join(&self.separator)
    }

    /// Token at `index`, negative indices count from the end.
    pub fn get(&self, index: isize) -> Option<&str> {
        self.resolve_index(index)
            .and_then(|idx| self.parts.get(idx))
            .map(String::as_str)
    }

    /// Removes the token at `index`, negative indices count from the end.
    pub fn pop(&mut self, index: isize) -> Result<String> {
        if self.parts.is_empty() {
            return Err(Error::EmptyPath);
        }
        let len = self.parts.len();
        self.resolve_index(index)
            .and_then(|idx| self.parts.remove(idx))
            .ok_or(Error::IndexOutOfRange { index, len })
    }

    pub fn pop_front(&mut self) -> Result<String> {
        self.parts.pop_front().ok_or(Error::EmptyPath)
    }

    pub fn pop_back(&mut self) -> Result<String> {
        self.parts.pop_back().ok_or(Error::EmptyPath)
    }

    pub fn truncate(&mut self, len: usize) {
        self.parts.truncate(len);
    }

    pub fn push_back(&mut self, part: impl Into<String>) {
        self.parts.push_back(part.into());
    }

    fn resolve_index(&self, index: isize) -> Option<usize> {
        let len = self.parts.len();
        if index < 0 {
            len.checked_sub(index.unsigned_abs())
        } else {
            let idx = index as usize;
            (idx < len).then_some(idx)
        }
    }
}

impl fmt::Display for AttrPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl FromStr for AttrPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::parse(s, DEFAULT_SEPARATOR))
    }
}

impl From<&str> for AttrPath {
    fn from(value: &str) -> Self {
        Self::parse(value, DEFAULT_SEPARATOR)
    }
}

impl<S: Into<String>> FromIterator<S> for AttrPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::from_parts(iter, DEFAULT_SEPARATOR)
    }
}

impl<'a> IntoIterator for &'a AttrPath {
    type Item = &'a String;
    type IntoIter = std::collections::vec_deque::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.parts.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> AttrPath {
        AttrPath::parse("a__b__c", DEFAULT_SEPARATOR)
    }

    #[test]
    fn parse_and_render() {
        let path = abc();
        assert_eq!(path.depth(), 3);
        assert_eq!(path.parts(), &VecDeque::from(vec!["a".to_string(), "b".into(), "c".into()]));
        assert_eq!(path.render(), "a__b__c");
        assert_eq!(path.to_string(), "a__b__c");
    }

    #[test]
    fn pop_front_then_index() {
        let mut path = abc();
        assert_eq!(path.pop_front().unwrap(), "a");
        assert_eq!(path.render(), "b__c");
        assert_eq!(path.get(1), Some("c"));
        assert_eq!(path.pop(-1).unwrap(), "c");
        assert_eq!(path.render(), "b");
    }

    #[test]
    fn pop_middle() {
        let mut path = abc();
        assert_eq!(path.pop(1).unwrap(), "b");
        assert_eq!(path.render(), "a__c");
    }

    #[test]
    fn pop_errors() {
        let mut path = AttrPath::from_parts(Vec::<String>::new(), "__");
        assert_eq!(path.pop(-1), Err(Error::EmptyPath));
        assert_eq!(path.pop_front(), Err(Error::EmptyPath));
        assert_eq!(path.pop_back(), Err(Error::EmptyPath));

        let mut path = abc();
        assert_eq!(path.pop(3), Err(Error::IndexOutOfRange { index: 3, len: 3 }));
        assert_eq!(path.pop(-4), Err(Error::IndexOutOfRange { index: -4, len: 3 }));
        assert_eq!(path.depth(), 3);
    }

    #[test]
    fn from_parts_joins_with_separator() {
        let path: AttrPath = ["a", "b", "c"].into_iter().collect();
        assert_eq!(path.render(), "a__b__c");
        assert_eq!(path.depth(), 3);

        let dotted = AttrPath::from_parts(["x", "y"], ".");
        assert_eq!(dotted.to_string(), "x.y");
    }

    #[test]
    fn empty_separator_keeps_whole_string() {
        let path = AttrPath::parse("a__b", "");
        assert_eq!(path.depth(), 1);
        assert_eq!(path.get(0), Some("a__b"));
    }

    #[test]
    fn empty_string_is_one_blank_token() {
        let path = AttrPath::parse("", DEFAULT_SEPARATOR);
        assert_eq!(path.depth(), 1);
        assert!(path.is_blank());
        assert!(!abc().is_blank());
        assert!(!AttrPath::parse("____", DEFAULT_SEPARATOR).is_blank());
    }

    #[test]
    fn negative_get() {
        let path = abc();
        assert_eq!(path.get(-1), Some("c"));
        assert_eq!(path.get(-3), Some("a"));
        assert_eq!(path.get(-4), None);
        assert_eq!(path.get(5), None);
    }
}
