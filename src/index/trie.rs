//! Prefix tree keyed by sequences of symbols.

use std::collections::HashMap;
use std::hash::Hash;

struct TrieNode<K, V> {
    next: HashMap<K, TrieNode<K, V>>,
    value: Option<V>,
}

impl<K, V> TrieNode<K, V> {
    fn new() -> Self {
        Self {
            next: HashMap::new(),
            value: None,
        }
    }
}

impl<K: Eq + Hash, V> TrieNode<K, V> {
    fn descend<I: IntoIterator<Item = K>>(&mut self, key: I) -> &mut Self {
        let mut node = self;
        for symbol in key {
            node = node.next.entry(symbol).or_insert_with(TrieNode::new);
        }
        node
    }
}

/// Map from symbol sequences to values.
///
/// The empty sequence is a valid key.
pub struct Trie<K, V> {
    root: TrieNode<K, V>,
    len: usize,
}

impl<K: Eq + Hash, V> Default for Trie<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> Trie<K, V> {
    /// Empty trie.
    pub fn new() -> Self {
        Self {
            root: TrieNode::new(),
            len: 0,
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether no value is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Value stored under the exact key sequence.
    pub fn get<'a, I>(&self, key: I) -> Option<&V>
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        let mut node = &self.root;
        for symbol in key {
            node = node.next.get(symbol)?;
        }
        node.value.as_ref()
    }

    /// Whether a value is stored under the key sequence.
    pub fn contains<'a, I>(&self, key: I) -> bool
    where
        I: IntoIterator<Item = &'a K>,
        K: 'a,
    {
        self.get(key).is_some()
    }

    /// Store a value, returning the previous one.
    pub fn insert<I: IntoIterator<Item = K>>(&mut self, key: I, value: V) -> Option<V> {
        let previous = self.root.descend(key).value.replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Value under `key`, inserting `make()` first if absent.
    pub fn get_or_insert_with<I, F>(&mut self, key: I, make: F) -> &mut V
    where
        I: IntoIterator<Item = K>,
        F: FnOnce() -> V,
    {
        let node = self.root.descend(key);
        if node.value.is_none() {
            self.len += 1;
        }
        node.value.get_or_insert_with(make)
    }
}
