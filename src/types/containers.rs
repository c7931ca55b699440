//! Heterogeneous value containers: ValueArray and ValueMap
//!
//! Both preserve insertion order. `ValueMap` keeps unique keys with
//! last-write-wins semantics that retain the original slot, so LLSD output
//! is stable across updates. `ValueArray` offers a markable cursor for
//! parsers that need lookahead with retry over the same sequence.

use std::collections::HashMap;
use std::ops::Index;

use url::Url;
use uuid::Uuid;

use crate::error::CapError;
use crate::types::date::Date;
use crate::types::math::{Quaternion, Vector3};
use crate::types::value::Value;

/// Typed extraction from a dynamic value slot. Extraction is strict: it
/// succeeds only when the dynamic variant matches, never coercing. Lossy
/// conversions go through the `as_*` coercion functions on `Value` instead.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

macro_rules! from_value_impl {
    ($ty:ty, $variant:ident) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Option<Self> {
                match value {
                    Value::$variant(v) => Some(v.clone()),
                    _ => None,
                }
            }
        }
    };
}

from_value_impl!(bool, Boolean);
from_value_impl!(i32, Integer);
from_value_impl!(i64, LongInteger);
from_value_impl!(f64, Real);
from_value_impl!(String, String);
from_value_impl!(Uuid, Uuid);
from_value_impl!(Date, Date);
from_value_impl!(Url, Uri);
from_value_impl!(Vec<u8>, Binary);
from_value_impl!(Vector3, Vector);
from_value_impl!(Quaternion, Rotation);
from_value_impl!(ValueArray, Array);
from_value_impl!(ValueMap, Map);

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueArray {
    items: Vec<Value>,
}

impl ValueArray {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, value: impl Into<Value>) {
        self.items.push(value.into());
    }

    pub fn insert(&mut self, index: usize, value: impl Into<Value>) {
        self.items.insert(index, value.into());
    }

    pub fn remove(&mut self, index: usize) -> Value {
        self.items.remove(index)
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    /// Strict typed fetch; `None` when out of range or the variant differs.
    pub fn try_get<T: FromValue>(&self, index: usize) -> Option<T> {
        self.items.get(index).and_then(T::from_value)
    }

    /// All elements of the requested variant, in order.
    pub fn get_values<T: FromValue>(&self) -> Vec<T> {
        self.items.iter().filter_map(T::from_value).collect()
    }

    /// Cursor supporting mark/rewind for lookahead-with-retry parsing.
    pub fn cursor(&self) -> MarkCursor<'_> {
        MarkCursor {
            items: &self.items,
            pos: 0,
            mark: 0,
        }
    }
}

impl Index<usize> for ValueArray {
    type Output = Value;

    fn index(&self, index: usize) -> &Value {
        &self.items[index]
    }
}

impl From<Vec<Value>> for ValueArray {
    fn from(items: Vec<Value>) -> Self {
        Self { items }
    }
}

impl FromIterator<Value> for ValueArray {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for ValueArray {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValueArray {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Forward cursor over a `ValueArray` with a single mark position.
pub struct MarkCursor<'a> {
    items: &'a [Value],
    pos: usize,
    mark: usize,
}

impl<'a> MarkCursor<'a> {
    /// Remembers the current position; `rewind` returns to it.
    pub fn mark(&mut self) {
        self.mark = self.pos;
    }

    pub fn rewind(&mut self) {
        self.pos = self.mark;
    }

    pub fn remaining(&self) -> usize {
        self.items.len() - self.pos
    }

    pub fn peek(&self) -> Option<&'a Value> {
        self.items.get(self.pos)
    }
}

impl<'a> Iterator for MarkCursor<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<&'a Value> {
        let item = self.items.get(self.pos)?;
        self.pos += 1;
        Some(item)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueMap {
    order: Vec<String>,
    entries: HashMap<String, Value>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Last write wins; an overwritten key keeps its original slot.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        if self.entries.insert(key.clone(), value.into()).is_none() {
            self.order.push(key);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let removed = self.entries.remove(key);
        if removed.is_some() {
            self.order.retain(|k| k != key);
        }
        removed
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Strict typed fetch; `None` when the key is absent or the variant
    /// differs. This is the opt-in safe path; the indexer panics instead.
    pub fn try_get<T: FromValue>(&self, key: &str) -> Option<T> {
        self.entries.get(key).and_then(T::from_value)
    }

    /// Required-key fetch for capability handlers; a missing key is a
    /// request format error.
    pub fn expect_key(&self, key: &'static str) -> Result<&Value, CapError> {
        self.entries.get(key).ok_or(CapError::MissingKey(key))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.order
            .iter()
            .filter_map(|k| self.entries.get(k).map(|v| (k.as_str(), v)))
    }
}

impl Index<&str> for ValueMap {
    type Output = Value;

    fn index(&self, key: &str) -> &Value {
        self.entries
            .get(key)
            .unwrap_or_else(|| panic!("missing map key: {key}"))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ValueMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = ValueMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_typed_fetch() {
        let mut arr = ValueArray::new();
        arr.push(1i32);
        arr.push("two");
        arr.push(3i32);

        assert_eq!(arr.try_get::<i32>(0), Some(1));
        assert_eq!(arr.try_get::<String>(1), Some("two".to_string()));
        assert_eq!(arr.try_get::<i32>(1), None);
        assert_eq!(arr.get_values::<i32>(), vec![1, 3]);
    }

    #[test]
    fn test_mark_cursor_rewind() {
        let mut arr = ValueArray::new();
        for i in 0..5i32 {
            arr.push(i);
        }
        let mut cursor = arr.cursor();
        assert_eq!(cursor.next(), Some(&Value::Integer(0)));
        cursor.mark();
        assert_eq!(cursor.next(), Some(&Value::Integer(1)));
        assert_eq!(cursor.next(), Some(&Value::Integer(2)));
        cursor.rewind();
        assert_eq!(cursor.next(), Some(&Value::Integer(1)));
        assert_eq!(cursor.remaining(), 3);
    }

    #[test]
    fn test_map_insertion_order_preserved() {
        let mut map = ValueMap::new();
        map.insert("b", 1i32);
        map.insert("a", 2i32);
        map.insert("c", 3i32);
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_map_last_write_wins_keeps_slot() {
        let mut map = ValueMap::new();
        map.insert("b", 1i32);
        map.insert("a", 2i32);
        map.insert("b", 9i32);
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
        assert_eq!(map.try_get::<i32>("b"), Some(9));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_map_typed_fetch_tolerates_shape_mismatch() {
        let mut map = ValueMap::new();
        map.insert("n", 5i32);
        assert_eq!(map.try_get::<String>("n"), None);
        assert_eq!(map.try_get::<i32>("missing"), None);
    }

    #[test]
    fn test_expect_key() {
        let mut map = ValueMap::new();
        map.insert("have", 1i32);
        assert!(map.expect_key("have").is_ok());
        assert!(matches!(
            map.expect_key("want"),
            Err(CapError::MissingKey("want"))
        ));
    }

    #[test]
    #[should_panic(expected = "missing map key")]
    fn test_map_indexer_panics_on_missing() {
        let map = ValueMap::new();
        let _ = &map["nope"];
    }
}
