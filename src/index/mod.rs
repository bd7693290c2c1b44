//! Lookup structures used by the analysis engines.

pub mod trie;

pub use trie::Trie;
