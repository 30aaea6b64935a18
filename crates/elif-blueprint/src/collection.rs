//! Collection implementations for mapped list and set fields

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Insertion semantics a collection implementation provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionSemantics {
    /// Ordered, keeps duplicates
    List,
    /// Deduplicating, no positional guarantee
    Set,
}

impl fmt::Display for CollectionSemantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionSemantics::List => write!(f, "list"),
            CollectionSemantics::Set => write!(f, "set"),
        }
    }
}

/// Concrete collection a mapped field is populated into
///
/// The variants mirror the Rust collections a typed model would deserialize
/// the field into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionImpl {
    Vec,
    VecDeque,
    LinkedList,
    HashSet,
    BTreeSet,
}

impl CollectionImpl {
    /// Default implementation for list fields
    pub const DEFAULT_LIST: CollectionImpl = CollectionImpl::Vec;

    /// Default implementation for set fields
    pub const DEFAULT_SET: CollectionImpl = CollectionImpl::HashSet;

    pub fn semantics(self) -> CollectionSemantics {
        match self {
            CollectionImpl::Vec | CollectionImpl::VecDeque | CollectionImpl::LinkedList => {
                CollectionSemantics::List
            }
            CollectionImpl::HashSet | CollectionImpl::BTreeSet => CollectionSemantics::Set,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CollectionImpl::Vec => "Vec",
            CollectionImpl::VecDeque => "VecDeque",
            CollectionImpl::LinkedList => "LinkedList",
            CollectionImpl::HashSet => "HashSet",
            CollectionImpl::BTreeSet => "BTreeSet",
        }
    }

    /// Allocate an empty collection of this implementation
    pub fn new_collection(self) -> Collection {
        Collection::new(self)
    }
}

impl fmt::Display for CollectionImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A collection being populated for a mapped field
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    implementation: CollectionImpl,
    items: Vec<Value>,
}

impl Collection {
    pub fn new(implementation: CollectionImpl) -> Self {
        Self {
            implementation,
            items: Vec::new(),
        }
    }

    pub fn implementation(&self) -> CollectionImpl {
        self.implementation
    }

    /// Insert an element, returning false when a set already held an equal one
    pub fn insert(&mut self, value: Value) -> bool {
        if self.implementation.semantics() == CollectionSemantics::Set
            && self.items.contains(&value)
        {
            return false;
        }
        self.items.push(value);
        true
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// Convert into the JSON array stored on the model
    pub fn into_value(self) -> Value {
        let mut items = self.items;
        if self.implementation == CollectionImpl::BTreeSet {
            items.sort_by_cached_key(|item| item.to_string());
        }
        Value::Array(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_semantics() {
        assert_eq!(CollectionImpl::Vec.semantics(), CollectionSemantics::List);
        assert_eq!(CollectionImpl::LinkedList.semantics(), CollectionSemantics::List);
        assert_eq!(CollectionImpl::BTreeSet.semantics(), CollectionSemantics::Set);
        assert_eq!(CollectionImpl::DEFAULT_LIST, CollectionImpl::Vec);
        assert_eq!(CollectionImpl::DEFAULT_SET, CollectionImpl::HashSet);
    }

    #[test]
    fn test_list_keeps_duplicates_in_order() {
        let mut list = CollectionImpl::VecDeque.new_collection();
        assert!(list.insert(json!({"name": "b"})));
        assert!(list.insert(json!({"name": "a"})));
        assert!(list.insert(json!({"name": "b"})));

        assert_eq!(
            list.into_value(),
            json!([{"name": "b"}, {"name": "a"}, {"name": "b"}])
        );
    }

    #[test]
    fn test_set_collapses_equal_elements() {
        let mut set = CollectionImpl::HashSet.new_collection();
        assert!(set.insert(json!({"name": "a"})));
        assert!(!set.insert(json!({"name": "a"})));
        assert!(set.insert(json!({"name": "b"})));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_btree_set_is_ordered() {
        let mut set = CollectionImpl::BTreeSet.new_collection();
        set.insert(json!("pear"));
        set.insert(json!("apple"));
        assert_eq!(set.into_value(), json!(["apple", "pear"]));
    }
}
