//! ChainedList: singly linked key/value chain used as bucket storage.
//!
//! Nodes live in a per-list `SlotMap` and link to their successor through a
//! generational key, so the list owns every node outright and dropping it
//! frees the whole chain without recursion. Every positional or key-based
//! operation walks from the head; there is no cached length and no backward
//! link.

use crate::error::ListError;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use log::trace;
use slotmap::{DefaultKey, SlotMap};

// Source of per-list owner ids; a handle only resolves against its owner.
static NEXT_OWNER: AtomicU64 = AtomicU64::new(0);

fn next_owner() -> u64 {
    NEXT_OWNER.fetch_add(1, Ordering::Relaxed)
}

/// Copyable reference to a node, resolved against the list that owns it.
///
/// A handle stops resolving once its node is unlinked, even if the slot is
/// later reused for a new node. It never resolves against any list other
/// than the one that minted it, including a clone of that list or the fresh
/// buckets a `HashTable` builds on `clear` or growth.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle {
    owner: u64,
    node: DefaultKey,
}

impl Handle {
    pub fn key<'a, V>(&self, list: &'a ChainedList<V>) -> Option<&'a str> {
        list.resolve(*self).map(|n| n.key.as_str())
    }

    pub fn value<'a, V>(&self, list: &'a ChainedList<V>) -> Option<&'a V> {
        list.resolve(*self).map(|n| &n.value)
    }

    pub fn value_mut<'a, V>(&self, list: &'a mut ChainedList<V>) -> Option<&'a mut V> {
        if self.owner != list.owner {
            return None;
        }
        list.nodes.get_mut(self.node).map(|n| &mut n.value)
    }

    /// Successor of this node, or `None` at the tail (or if stale).
    pub fn next<V>(&self, list: &ChainedList<V>) -> Option<Handle> {
        list.resolve(*self)
            .and_then(|n| n.next)
            .map(|k| list.handle(k))
    }
}

#[derive(Debug, Clone)]
struct Node<V> {
    key: String,
    value: V,
    next: Option<DefaultKey>,
}

#[derive(Debug)]
pub struct ChainedList<V> {
    owner: u64,
    head: Option<DefaultKey>,
    nodes: SlotMap<DefaultKey, Node<V>>, // arena; links are generational keys
}

impl<V> Default for ChainedList<V> {
    fn default() -> Self {
        Self::new()
    }
}

// A clone is a distinct owner: handles into the original stay with it.
impl<V: Clone> Clone for ChainedList<V> {
    fn clone(&self) -> Self {
        Self {
            owner: next_owner(),
            head: self.head,
            nodes: self.nodes.clone(),
        }
    }
}

/// Iterator over `(key, value)` pairs in list order.
pub struct Iter<'a, V> {
    nodes: &'a SlotMap<DefaultKey, Node<V>>,
    cur: Option<DefaultKey>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.nodes.get(self.cur?)?;
        self.cur = node.next;
        Some((node.key.as_str(), &node.value))
    }
}

impl<V> ChainedList<V> {
    pub fn new() -> Self {
        Self {
            owner: next_owner(),
            head: None,
            nodes: SlotMap::with_key(),
        }
    }

    fn handle(&self, node: DefaultKey) -> Handle {
        Handle {
            owner: self.owner,
            node,
        }
    }

    fn resolve(&self, h: Handle) -> Option<&Node<V>> {
        if h.owner != self.owner {
            return None;
        }
        self.nodes.get(h.node)
    }

    // Node keys from head to tail.
    fn links(&self) -> impl Iterator<Item = DefaultKey> + '_ {
        core::iter::successors(self.head, move |&k| self.nodes.get(k).and_then(|n| n.next))
    }

    fn detach(&mut self, k: DefaultKey) -> Node<V> {
        self.nodes.remove(k).expect("linked node must be live")
    }

    fn set_next(&mut self, k: DefaultKey, next: Option<DefaultKey>) {
        if let Some(node) = self.nodes.get_mut(k) {
            node.next = next;
        }
    }

    /// Adds a node after the current tail. Walks the whole chain.
    pub fn append(&mut self, key: impl Into<String>, value: V) {
        let last = self.links().last();
        let k = self.nodes.insert(Node {
            key: key.into(),
            value,
            next: None,
        });
        match last {
            None => self.head = Some(k),
            Some(last) => self.set_next(last, Some(k)),
        }
    }

    /// Adds a node in front of the current head.
    pub fn prepend(&mut self, key: impl Into<String>, value: V) {
        let k = self.nodes.insert(Node {
            key: key.into(),
            value,
            next: self.head,
        });
        self.head = Some(k);
    }

    /// Number of nodes, counted by walking the chain.
    pub fn size(&self) -> usize {
        self.links().count()
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn head(&self) -> Option<Handle> {
        self.head.map(|k| self.handle(k))
    }

    pub fn tail(&self) -> Option<Handle> {
        self.links().last().map(|k| self.handle(k))
    }

    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            nodes: &self.nodes,
            cur: self.head,
        }
    }

    /// Handles of every node, head first.
    pub fn handles(&self) -> impl Iterator<Item = Handle> + '_ {
        self.links().map(|k| self.handle(k))
    }

    pub fn keys(&self) -> Vec<String> {
        self.iter().map(|(k, _)| k.to_string()).collect()
    }

    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.iter().map(|(_, v)| v.clone()).collect()
    }

    pub fn entries(&self) -> Vec<(String, V)>
    where
        V: Clone,
    {
        self.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    /// Consumes the list, yielding its pairs in list order.
    pub fn into_entries(mut self) -> Vec<(String, V)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut cur = self.head.take();
        while let Some(node) = cur.and_then(|k| self.nodes.remove(k)) {
            cur = node.next;
            out.push((node.key, node.value));
        }
        out
    }

    /// Node at zero-based position `index`.
    pub fn at(&self, index: usize) -> Result<Handle, ListError> {
        if self.is_empty() {
            trace!("at({index}) on empty list");
            return Err(ListError::Empty);
        }
        self.handles().nth(index).ok_or_else(|| {
            trace!("at({index}) past the tail");
            ListError::IndexOutOfRange { index }
        })
    }

    /// Inserts a node so that it ends up at position `index`, shifting the
    /// former occupant and its successors back by one.
    ///
    /// Index 0 always succeeds. Any other index must name an existing node:
    /// inserting past the tail (including at `size()`) fails and leaves the
    /// list untouched.
    pub fn insert_at(
        &mut self,
        key: impl Into<String>,
        value: V,
        index: usize,
    ) -> Result<(), ListError> {
        if index == 0 {
            self.prepend(key, value);
            return Ok(());
        }
        if self.is_empty() {
            trace!("insert_at({index}) on empty list");
            return Err(ListError::Empty);
        }
        let prev = self.links().nth(index - 1);
        let occupant = prev.and_then(|p| self.nodes.get(p)).and_then(|n| n.next);
        match (prev, occupant) {
            (Some(prev), Some(occupant)) => {
                let k = self.nodes.insert(Node {
                    key: key.into(),
                    value,
                    next: Some(occupant),
                });
                self.set_next(prev, Some(k));
                Ok(())
            }
            _ => {
                trace!("insert_at({index}) past the tail");
                Err(ListError::IndexOutOfRange { index })
            }
        }
    }

    /// Unlinks the node at `index`, splicing its predecessor to its
    /// successor, and returns its pair.
    pub fn remove_at(&mut self, index: usize) -> Result<(String, V), ListError> {
        let Some(head) = self.head else {
            trace!("remove_at({index}) on empty list");
            return Err(ListError::Empty);
        };
        if index == 0 {
            let node = self.detach(head);
            self.head = node.next;
            return Ok((node.key, node.value));
        }
        let prev = self.links().nth(index - 1);
        let target = prev.and_then(|p| self.nodes.get(p)).and_then(|n| n.next);
        match (prev, target) {
            (Some(prev), Some(target)) => {
                let node = self.detach(target);
                self.set_next(prev, node.next);
                Ok((node.key, node.value))
            }
            _ => {
                trace!("remove_at({index}) past the tail");
                Err(ListError::IndexOutOfRange { index })
            }
        }
    }

    /// Removes the tail node.
    pub fn pop(&mut self) -> Result<(String, V), ListError> {
        let Some(head) = self.head else {
            return Err(ListError::Empty);
        };
        let mut prev = None;
        let mut cur = head;
        while let Some(next) = self.nodes.get(cur).and_then(|n| n.next) {
            prev = Some(cur);
            cur = next;
        }
        let node = self.detach(cur);
        match prev {
            None => self.head = None,
            Some(prev) => self.set_next(prev, None),
        }
        Ok((node.key, node.value))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.iter().any(|(k, _)| k == key)
    }

    /// Position of the first node holding `key`.
    pub fn find(&self, key: &str) -> Option<usize> {
        self.iter().position(|(k, _)| k == key)
    }

    /// Handle of the first node holding `key`.
    pub fn find_handle(&self, key: &str) -> Option<Handle> {
        self.links()
            .find(|&k| self.nodes.get(k).is_some_and(|n| n.key == key))
            .map(|k| self.handle(k))
    }

    /// `( v1 ) -> ( v2 ) -> null`, or `None` for an empty list.
    pub fn render(&self) -> Option<String>
    where
        V: fmt::Display,
    {
        if self.is_empty() {
            None
        } else {
            Some(self.to_string())
        }
    }
}

impl<V: fmt::Display> fmt::Display for ChainedList<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (_, v) in self.iter() {
            write!(f, "( {} ) -> ", v)?;
        }
        f.write_str("null")
    }
}

impl<'a, V> IntoIterator for &'a ChainedList<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn abc() -> ChainedList<i32> {
        let mut l = ChainedList::new();
        l.append("a", 1);
        l.append("b", 2);
        l.append("c", 3);
        l
    }

    /// Invariant: append adds at the tail, prepend at the head.
    #[test]
    fn append_and_prepend_order() {
        let mut l = ChainedList::new();
        l.append("b", 2);
        l.append("c", 3);
        l.prepend("a", 1);
        assert_eq!(l.keys(), vec!["a", "b", "c"]);
        assert_eq!(l.values(), vec![1, 2, 3]);
        assert_eq!(l.size(), 3);
    }

    /// Invariant: head/tail are `None` on an empty list and agree on a
    /// single-node list.
    #[test]
    fn head_and_tail() {
        let mut l: ChainedList<i32> = ChainedList::new();
        assert!(l.head().is_none());
        assert!(l.tail().is_none());
        assert_eq!(l.size(), 0);

        l.append("only", 7);
        assert_eq!(l.head(), l.tail());

        l.append("last", 8);
        let tail = l.tail().unwrap();
        assert_eq!(tail.key(&l), Some("last"));
        assert_eq!(tail.next(&l), None);
        assert_eq!(l.head().unwrap().next(&l), Some(tail));
    }

    /// Invariant: `at` distinguishes an empty list from an index past the tail.
    #[test]
    fn at_positions_and_errors() {
        let empty: ChainedList<i32> = ChainedList::new();
        assert_eq!(empty.at(0), Err(ListError::Empty));

        let l = abc();
        assert_eq!(l.at(0).unwrap().value(&l), Some(&1));
        assert_eq!(l.at(2).unwrap().key(&l), Some("c"));
        assert_eq!(l.at(3), Err(ListError::IndexOutOfRange { index: 3 }));
    }

    /// Invariant: `insert_at` shifts the occupant back; index 0 becomes the head.
    #[test]
    fn insert_at_shifts_successors() {
        let mut l = abc();
        l.insert_at("x", 10, 1).unwrap();
        assert_eq!(l.keys(), vec!["a", "x", "b", "c"]);
        l.insert_at("y", 11, 0).unwrap();
        assert_eq!(l.keys(), vec!["y", "a", "x", "b", "c"]);
        l.insert_at("z", 12, 4).unwrap();
        assert_eq!(l.keys(), vec!["y", "a", "x", "b", "z", "c"]);
    }

    /// Invariant: `insert_at` past the tail fails without modifying the list.
    #[test]
    fn insert_at_past_tail_is_rejected() {
        let mut l = abc();
        assert_eq!(
            l.insert_at("x", 9, 3),
            Err(ListError::IndexOutOfRange { index: 3 })
        );
        assert_eq!(
            l.insert_at("x", 9, 10),
            Err(ListError::IndexOutOfRange { index: 10 })
        );
        assert_eq!(l.keys(), vec!["a", "b", "c"]);

        let mut empty: ChainedList<i32> = ChainedList::new();
        assert_eq!(empty.insert_at("x", 1, 1), Err(ListError::Empty));
        empty.insert_at("x", 1, 0).unwrap();
        assert_eq!(empty.keys(), vec!["x"]);
    }

    /// Invariant: `remove_at` splices around the removed node and returns it.
    #[test]
    fn remove_at_splices() {
        let mut l = abc();
        assert_eq!(l.remove_at(1), Ok(("b".to_string(), 2)));
        assert_eq!(l.keys(), vec!["a", "c"]);
        assert_eq!(l.remove_at(0), Ok(("a".to_string(), 1)));
        assert_eq!(l.head().unwrap().key(&l), Some("c"));
        assert_eq!(l.remove_at(1), Err(ListError::IndexOutOfRange { index: 1 }));
        assert_eq!(l.remove_at(0), Ok(("c".to_string(), 3)));
        assert!(l.is_empty());
        assert_eq!(l.remove_at(0), Err(ListError::Empty));
    }

    /// Invariant: a handle to an unlinked node no longer resolves, even after
    /// its slot is reused.
    #[test]
    fn stale_handle_does_not_alias_new_node() {
        let mut l = abc();
        let h = l.at(1).unwrap();
        l.remove_at(1).unwrap();
        l.append("d", 4);
        assert!(h.value(&l).is_none());
        assert!(h.key(&l).is_none());
        assert_eq!(l.keys(), vec!["a", "c", "d"]);
    }

    /// Invariant: a handle resolves only against the list that minted it,
    /// even when another list holds a live node in the same slot.
    #[test]
    fn handle_does_not_resolve_against_other_list() {
        let mut a = ChainedList::new();
        a.append("a", 1);
        a.append("a2", 2);
        let mut b = ChainedList::new();
        b.append("b", 10);
        b.append("b2", 20);

        let h = a.head().unwrap();
        assert_eq!(h.key(&a), Some("a"));
        assert!(h.key(&b).is_none());
        assert!(h.value(&b).is_none());
        assert!(h.next(&b).is_none());
        assert!(h.value_mut(&mut b).is_none());
        assert_eq!(b.values(), vec![10, 20]);

        let c = a.clone();
        assert_eq!(c.entries(), a.entries());
        assert!(h.key(&c).is_none());
        assert_eq!(c.head().unwrap().key(&c), Some("a"));
    }

    /// Invariant: `pop` removes the tail; the last pop empties the list.
    #[test]
    fn pop_until_empty() {
        let mut l = abc();
        assert_eq!(l.pop(), Ok(("c".to_string(), 3)));
        assert_eq!(l.tail().unwrap().key(&l), Some("b"));
        assert_eq!(l.pop(), Ok(("b".to_string(), 2)));
        assert_eq!(l.pop(), Ok(("a".to_string(), 1)));
        assert!(l.head().is_none());
        assert_eq!(l.pop(), Err(ListError::Empty));
    }

    /// Invariant: `contains`/`find` report the first match by exact equality.
    #[test]
    fn contains_and_find() {
        let mut l = abc();
        l.append("b", 20);
        assert!(l.contains("b"));
        assert!(!l.contains("B"));
        assert_eq!(l.find("b"), Some(1));
        assert_eq!(l.find("c"), Some(2));
        assert_eq!(l.find("zz"), None);
        let h = l.find_handle("b").unwrap();
        assert_eq!(h.value(&l), Some(&2));
    }

    /// Invariant: `value_mut` through a handle updates the stored value in place.
    #[test]
    fn value_mut_in_place() {
        let mut l = abc();
        let h = l.find_handle("c").unwrap();
        *h.value_mut(&mut l).unwrap() += 40;
        assert_eq!(l.entries()[2], ("c".to_string(), 43));
        assert_eq!(l.find("c"), Some(2));
    }

    #[test]
    fn render_chain() {
        let l = abc();
        assert_eq!(l.render().as_deref(), Some("( 1 ) -> ( 2 ) -> ( 3 ) -> null"));
        let empty: ChainedList<i32> = ChainedList::new();
        assert_eq!(empty.render(), None);
        assert_eq!(empty.to_string(), "null");
    }

    /// Invariant: snapshots do not track later mutation.
    #[test]
    fn snapshots_are_detached() {
        let mut l = abc();
        let keys = l.keys();
        let entries = l.entries();
        l.pop().unwrap();
        assert_eq!(keys.len(), 3);
        assert_eq!(entries.len(), 3);
        assert_eq!(l.size(), 2);
    }

    /// Invariant: `into_entries` yields list order, not arena order.
    #[test]
    fn into_entries_follows_links() {
        let mut l = abc();
        l.remove_at(0).unwrap();
        l.prepend("z", 0);
        l.insert_at("m", 5, 1).unwrap();
        let expected = l.entries();
        assert_eq!(l.into_entries(), expected);
    }

    /// Invariant: dropping a long chain does not recurse.
    #[test]
    fn drop_long_chain() {
        let mut l = ChainedList::new();
        for i in 0..100_000u32 {
            l.prepend(i.to_string(), i);
        }
        assert_eq!(l.size(), 100_000);
        drop(l);
    }
}
