use crate::types::HistoryEntry;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

struct Node {
    entry: HistoryEntry,
    prev: Option<Arc<Node>>,
}

/// Append-only change history shared between snapshots.
///
/// Entries live in a persistent list: cloning is O(1) and `push` links one
/// node onto the shared tail, so publishing a new snapshot never copies the
/// entries of the previous one.
#[derive(Clone, Default)]
pub struct History {
    head: Option<Arc<Node>>,
    len: usize,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        let prev = self.head.take();
        self.head = Some(Arc::new(Node { entry, prev }));
        self.len += 1;
    }

    /// The newest entry.
    pub fn last(&self) -> Option<&HistoryEntry> {
        self.head.as_deref().map(|n| &n.entry)
    }

    /// Entries oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> + ExactSizeIterator {
        let mut entries = Vec::with_capacity(self.len);
        let mut node = self.head.as_deref();
        while let Some(n) = node {
            entries.push(&n.entry);
            node = n.prev.as_deref();
        }
        entries.into_iter().rev()
    }

    pub fn to_vec(&self) -> Vec<HistoryEntry> {
        self.iter().cloned().collect()
    }

    /// Whether both histories share the same newest node.
    pub fn ptr_eq(&self, other: &History) -> bool {
        same_node(self.head.as_ref(), other.head.as_ref())
    }

    /// Whether `older` is a shared prefix of this history, reached by
    /// appending only.
    pub fn extends(&self, older: &History) -> bool {
        if older.len > self.len {
            return false;
        }
        let mut node = self.head.as_ref();
        for _ in older.len..self.len {
            node = node.and_then(|n| n.prev.as_ref());
        }
        same_node(node, older.head.as_ref())
    }
}

fn same_node(a: Option<&Arc<Node>>, b: Option<&Arc<Node>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    }
}

// unlink iteratively; a recursive drop of a long list overflows the stack
impl Drop for History {
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(node) = next {
            match Arc::try_unwrap(node) {
                Ok(mut node) => next = node.prev.take(),
                Err(_) => break,
            }
        }
    }
}

impl FromIterator<HistoryEntry> for History {
    fn from_iter<I: IntoIterator<Item = HistoryEntry>>(iter: I) -> Self {
        let mut history = History::new();
        for entry in iter {
            history.push(entry);
        }
        history
    }
}

impl PartialEq for History {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && (self.ptr_eq(other) || self.iter().eq(other.iter()))
    }
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Serialize for History {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for History {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<HistoryEntry>::deserialize(deserializer).map(History::from_iter)
    }
}
