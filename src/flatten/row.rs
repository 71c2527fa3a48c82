use crate::flatten::value::Primitive;
use serde::Serialize;
use std::collections::btree_map::{self, BTreeMap};

/// One flattened record: flat path -> primitive value
///
/// Rows are owned values. Every branch of the traversal works on its own
/// clone, so writes in one branch are never visible in a sibling.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, Primitive>);

impl Row {
    pub fn new() -> Self {
        Row(BTreeMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&Primitive> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Primitive) -> Option<Primitive> {
        self.0.insert(key.into(), value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Primitive> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Primitive>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Row(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Row {
    type Item = (String, Primitive);
    type IntoIter = btree_map::IntoIter<String, Primitive>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = (&'a String, &'a Primitive);
    type IntoIter = btree_map::Iter<'a, String, Primitive>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_serializes_as_flat_object() {
        let row: Row = [("aa", Primitive::from("a")), ("bb", Primitive::from(1))]
            .into_iter()
            .collect();

        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"aa":"a","bb":1}"#);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut base = Row::new();
        base.insert("shared", Primitive::from(1));

        let mut left = base.clone();
        let mut right = base.clone();
        left.insert("side", Primitive::from("left"));
        right.insert("side", Primitive::from("right"));

        assert_eq!(base.len(), 1);
        assert_eq!(left.get("side"), Some(&Primitive::from("left")));
        assert_eq!(right.get("side"), Some(&Primitive::from("right")));
    }
}
