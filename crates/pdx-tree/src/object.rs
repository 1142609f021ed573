//! Ordered entry lists: objects, pairs, and the top level of a file.

use std::cell::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::{BraceKind, Brace, Comment, Commented, Key, OpNode, Operator, Scalar, ScalarValue, Value};

/// Comment marker for editor-style header lines (`# -*- coding: ... -*-`).
pub const HEADER_MARKER: &str = "-*-";

/// A `key op value` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    /// The key scalar.
    pub key: Scalar,
    /// The operator between key and value.
    pub op: OpNode,
    /// The value.
    pub value: Value,
}

impl Pair {
    /// `key = value` with no comments.
    pub fn new(key: impl Into<Scalar>, value: impl Into<Value>) -> Self {
        Self::with_op(key, Operator::Assign, value)
    }

    /// `key op value` with no comments.
    pub fn with_op(key: impl Into<Scalar>, op: Operator, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            op: Commented::new(op),
            value: value.into(),
        }
    }

    /// Lookup key of this pair.
    pub fn lookup_key(&self) -> Key {
        Key::from(&self.key.value)
    }

    /// Comments above the pair (stored on the key).
    pub fn pre_comments(&self) -> &[Comment] {
        &self.key.pre_comments
    }

    /// Trailing comment of the pair (stored on the value).
    pub fn post_comment(&self) -> Option<&Comment> {
        self.value.post_comment()
    }

    /// Whether this pair or anything inside it carries a comment.
    pub fn has_comments(&self) -> bool {
        self.key.has_comments() || self.op.has_comments() || self.value.has_comments()
    }
}

/// One entry of an object: a pair or a bare value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    /// `key op value`
    Pair(Pair),
    /// A value standing alone, as in `{ 1 2 3 }`.
    Value(Value),
}

impl Item {
    /// The pair's key, if this is a pair.
    pub fn key(&self) -> Option<&Scalar> {
        match self {
            Item::Pair(p) => Some(&p.key),
            Item::Value(_) => None,
        }
    }

    /// The pair's value, or the bare value itself.
    pub fn value(&self) -> &Value {
        match self {
            Item::Pair(p) => &p.value,
            Item::Value(v) => v,
        }
    }

    /// Get as pair.
    pub fn as_pair(&self) -> Option<&Pair> {
        match self {
            Item::Pair(p) => Some(p),
            Item::Value(_) => None,
        }
    }

    /// Comments above the item.
    pub fn pre_comments(&self) -> &[Comment] {
        match self {
            Item::Pair(p) => p.pre_comments(),
            Item::Value(v) => v.pre_comments(),
        }
    }

    /// Mutable comments above the item.
    pub fn pre_comments_mut(&mut self) -> &mut Vec<Comment> {
        match self {
            Item::Pair(p) => &mut p.key.pre_comments,
            Item::Value(v) => v.pre_comments_mut(),
        }
    }

    /// Whether this item or anything inside it carries a comment.
    pub fn has_comments(&self) -> bool {
        match self {
            Item::Pair(p) => p.has_comments(),
            Item::Value(v) => v.has_comments(),
        }
    }
}

impl From<Pair> for Item {
    fn from(pair: Pair) -> Self {
        Item::Pair(pair)
    }
}

impl From<Value> for Item {
    fn from(value: Value) -> Self {
        Item::Value(value)
    }
}

/// An ordered list of items with a lazily built key index.
///
/// Duplicate keys are kept in order; lookups return the last one.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Entries {
    items: Vec<Item>,
    #[serde(skip)]
    index: OnceCell<HashMap<Key, usize>>,
}

impl Entries {
    /// Create entries from items.
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items,
            index: OnceCell::new(),
        }
    }

    /// All items in source order.
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Mutable access to the items. Drops the key index.
    pub fn items_mut(&mut self) -> &mut Vec<Item> {
        self.index.take();
        &mut self.items
    }

    /// Consume into the item list.
    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    /// Append an item.
    pub fn push(&mut self, item: impl Into<Item>) {
        self.items_mut().push(item.into());
    }

    /// Insert an item at `index`.
    pub fn insert(&mut self, index: usize, item: impl Into<Item>) {
        self.items_mut().insert(index, item.into());
    }

    /// Remove and return the item at `index`.
    pub fn remove(&mut self, index: usize) -> Item {
        self.items_mut().remove(index)
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate over items.
    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    /// Iterate over pairs, skipping bare values.
    pub fn pairs(&self) -> impl Iterator<Item = &Pair> {
        self.items.iter().filter_map(Item::as_pair)
    }

    /// Whether any item is a pair.
    pub fn has_pairs(&self) -> bool {
        self.pairs().next().is_some()
    }

    fn index(&self) -> &HashMap<Key, usize> {
        self.index.get_or_init(|| {
            let mut index = HashMap::new();
            for (i, item) in self.items.iter().enumerate() {
                if let Item::Pair(pair) = item {
                    index.insert(pair.lookup_key(), i);
                }
            }
            index
        })
    }

    /// The last pair with this key.
    pub fn pair(&self, key: impl Into<Key>) -> Option<&Pair> {
        let i = *self.index().get(&key.into())?;
        self.items[i].as_pair()
    }

    /// Value of the last pair with this key.
    pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
        self.pair(key).map(|p| &p.value)
    }

    /// Mutable value of the last pair with this key.
    pub fn get_mut(&mut self, key: impl Into<Key>) -> Option<&mut Value> {
        let i = *self.index().get(&key.into())?;
        match &mut self.items[i] {
            Item::Pair(p) => Some(&mut p.value),
            Item::Value(_) => None,
        }
    }

    /// Whether a pair with this key exists.
    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.index().contains_key(&key.into())
    }

    /// Whether the last pair with this key has a scalar value equal to
    /// `value`. Values compare like keys: `1` equals `1.0`, quoting is
    /// ignored.
    pub fn has_pair(&self, key: impl Into<Key>, value: impl Into<ScalarValue>) -> bool {
        let value = Key::from(&value.into());
        self.get(key)
            .and_then(Value::as_scalar)
            .is_some_and(|s| Key::from(&s.value) == value)
    }

    /// Whether any item carries a comment, recursively.
    pub fn has_comments(&self) -> bool {
        self.items.iter().any(Item::has_comments)
    }
}

impl PartialEq for Entries {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl fmt::Debug for Entries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

impl FromIterator<Item> for Entries {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl FromIterator<Pair> for Entries {
    fn from_iter<I: IntoIterator<Item = Pair>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Item::Pair).collect())
    }
}

impl<'a> IntoIterator for &'a Entries {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// A braced `{ ... }` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Object {
    /// Opening brace; its pre comments sit above the whole block.
    pub open: Brace,
    /// Items between the braces.
    pub entries: Entries,
    /// Closing brace; its pre comments sit after the last item.
    pub close: Brace,
}

impl Object {
    /// An object with no comments on its braces.
    pub fn new(entries: impl Into<Entries>) -> Self {
        Self {
            open: Commented::new(BraceKind::Open),
            entries: entries.into(),
            close: Commented::new(BraceKind::Close),
        }
    }

    /// An object from pairs and bare values.
    pub fn from_items<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Item>,
    {
        Self::new(items.into_iter().map(Into::into).collect::<Entries>())
    }

    /// An object of bare scalar values, as in `{ 1 2 3 }`.
    pub fn from_values<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::new(
            values
                .into_iter()
                .map(|v| Item::Value(v.into()))
                .collect::<Entries>(),
        )
    }

    /// Whether the braces or any item carry a comment.
    pub fn has_comments(&self) -> bool {
        self.open.has_comments() || self.close.has_comments() || self.entries.has_comments()
    }
}

impl Default for Object {
    fn default() -> Self {
        Self::new(Entries::default())
    }
}

impl From<Vec<Item>> for Entries {
    fn from(items: Vec<Item>) -> Self {
        Self::new(items)
    }
}

impl From<Vec<Pair>> for Entries {
    fn from(pairs: Vec<Pair>) -> Self {
        pairs.into_iter().collect()
    }
}

impl Deref for Object {
    type Target = Entries;

    fn deref(&self) -> &Entries {
        &self.entries
    }
}

impl DerefMut for Object {
    fn deref_mut(&mut self) -> &mut Entries {
        &mut self.entries
    }
}

/// The root of a parsed file: a list of items plus comments after the last
/// one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopLevel {
    /// Top-level items.
    pub entries: Entries,
    /// Comments after the last item.
    pub post_comments: Vec<Comment>,
}

impl TopLevel {
    /// A top level with the given items and no trailing comments.
    pub fn new(entries: impl Into<Entries>) -> Self {
        Self {
            entries: entries.into(),
            post_comments: Vec::new(),
        }
    }

    fn header_comments(&self) -> &[Comment] {
        match self.entries.items().first() {
            Some(first) => first.pre_comments(),
            None => &self.post_comments,
        }
    }

    fn header_comments_mut(&mut self) -> &mut Vec<Comment> {
        if self.entries.is_empty() {
            &mut self.post_comments
        } else {
            self.entries.items_mut()[0].pre_comments_mut()
        }
    }

    /// The editor header comment (one starting with `-*-`) at the top of
    /// the file, if any.
    pub fn header_comment(&self) -> Option<&Comment> {
        self.header_comments()
            .iter()
            .find(|c| c.starts_with(HEADER_MARKER))
    }

    /// Set or replace the header comment, keeping it first.
    pub fn set_header_comment(&mut self, text: &str) {
        let comments = self.header_comments_mut();
        comments.retain(|c| !c.starts_with(HEADER_MARKER));
        comments.insert(0, Comment::new(text));
    }

    /// Remove the header comment, returning it.
    pub fn remove_header_comment(&mut self) -> Option<Comment> {
        let comments = self.header_comments_mut();
        let pos = comments
            .iter()
            .position(|c| c.starts_with(HEADER_MARKER))?;
        Some(comments.remove(pos))
    }

    /// Whether any item or trailing comment exists.
    pub fn has_comments(&self) -> bool {
        !self.post_comments.is_empty() || self.entries.has_comments()
    }
}

impl Deref for TopLevel {
    type Target = Entries;

    fn deref(&self) -> &Entries {
        &self.entries
    }
}

impl DerefMut for TopLevel {
    fn deref_mut(&mut self) -> &mut Entries {
        &mut self.entries
    }
}
