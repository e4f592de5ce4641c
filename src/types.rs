//! Items and batches flowing from the line reader to the sink.

use crate::constants::MAX_BATCH_PREALLOCATION;
use serde::Serialize;
use std::fmt;

/// One trimmed, non-empty input line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Item(String);

/// ASCII whitespace plus NUL; other Unicode spaces are item content
pub fn is_line_padding(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r' | '\0')
}

impl Item {
    /// Trim a raw line; blank lines produce no item
    pub fn from_line(line: &str) -> Option<Self> {
        let trimmed = line.trim_matches(is_line_padding);
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Item {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered group of items handed to a sink in one call.
///
/// Batch numbers start at 1 and increase by one per flush.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Batch {
    number: u64,
    items: Vec<Item>,
}

impl Batch {
    pub fn new(number: u64) -> Self {
        Self {
            number,
            items: Vec::new(),
        }
    }

    pub fn with_capacity(number: u64, capacity: usize) -> Self {
        Self {
            number,
            items: Vec::with_capacity(capacity.min(MAX_BATCH_PREALLOCATION)),
        }
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: Item) {
        self.items.push(item);
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn into_items(self) -> Vec<Item> {
        self.items
    }

    /// Item names as plain strings, in batch order
    pub fn to_strings(&self) -> Vec<String> {
        self.items.iter().map(|item| item.as_str().to_string()).collect()
    }
}

impl IntoIterator for Batch {
    type Item = Item;
    type IntoIter = std::vec::IntoIter<Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Item;
    type IntoIter = std::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
