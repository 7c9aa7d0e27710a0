//! Dictionary storage and lookup.
//!
//! Every storage form implements [`Dict`], the single capability the
//! segmentation engine needs: find the longest key that prefixes the input at
//! a given byte offset. Callers never need to know which form backs a
//! dictionary.
//!
//! - [`Lexicon`]: byte-sorted `(key, values)` table, the atomic storage unit.
//! - [`TextDict`]: plain dictionary over one [`Lexicon`], loaded from the
//!   `key<TAB>value ...` text format.
//! - [`TrieDict`]: compressed trie (`fst`) index plus a packed value table.
//! - [`DictGroup`]: ordered set of dictionaries queried jointly.

use std::fmt;

pub mod dict_group;
pub mod lexicon;
pub mod text_dict;
pub mod trie_dict;

pub use dict_group::{DictGroup, GroupMatch};
pub use lexicon::{Lexicon, LexiconEntry};
pub use text_dict::{parse_lexicon, reverse_mapping, write_lexicon, TextDict};
pub use trie_dict::TrieDict;

/// Result of a longest-prefix lookup.
///
/// `len` is the matched key length in **bytes**, always ending on a code-point
/// boundary of the input. `values` are the candidate replacements in
/// dictionary order and are never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'d> {
    pub len: usize,
    pub values: &'d [String],
}

impl<'d> Match<'d> {
    /// The default (first) candidate.
    #[inline]
    pub fn default_value(&self) -> Option<&'d str> {
        self.values.first().map(String::as_str)
    }
}

/// Longest-prefix lookup over an immutable dictionary.
///
/// Implementations are read-only after construction, so they can be shared
/// across threads behind an `Arc` without locking.
pub trait Dict: Send + Sync + fmt::Debug {
    /// Longest key `K` such that `text[start..]` begins with `K`.
    ///
    /// Returns `None` when nothing matches, when `start` is past the end of
    /// `text`, or when `start` is not a char boundary.
    ///
    /// `Match::len` must end on a char boundary of `text`; segmentation
    /// treats a match that does not as a miss.
    fn match_prefix(&self, text: &str, start: usize) -> Option<Match<'_>>;

    /// Exact lookup of `key`.
    fn get(&self, key: &str) -> Option<&[String]>;

    /// Longest key length, in code points.
    fn max_key_length(&self) -> usize;

    /// Number of entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
