//! Sorted `(key, values)` table, the atomic storage unit of every dictionary.
//!
//! A [`Lexicon`] keeps its entries in ascending **byte order** of the key, so
//! exact lookups are a binary search. On top of the sorted table it keeps a
//! per-starter length bitmask (see [`crate::utils::length_bit`]) used by
//! [`Lexicon::match_prefix`] to probe only the key lengths that actually exist
//! for the first character at the current position.
//!
//! ## Example
//! ```
//! use opencc_chain::dictionary_lib::Lexicon;
//!
//! let lexicon = Lexicon::from_pairs(vec![
//!     ("头发".to_string(), vec!["頭髮".to_string()]),
//!     ("头".to_string(), vec!["頭".to_string()]),
//! ])
//! .unwrap();
//!
//! let m = lexicon.match_prefix("头发长", 0).unwrap();
//! assert_eq!(m.len, "头发".len());
//! assert_eq!(m.default_value(), Some("頭髮"));
//! ```

use rustc_hash::FxHashMap;

use crate::dictionary_lib::Match;
use crate::errors::DictLoadError;
use crate::utils::{for_each_len_dec, length_bit};

/// Char ends kept on the stack per lookup; matches the 64 mask lengths.
const INLINE_ENDS: usize = 64;

/// One dictionary entry: a key and its ordered, non-empty candidate values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexiconEntry {
    key: String,
    values: Vec<String>,
}

impl LexiconEntry {
    pub fn new(key: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            key: key.into(),
            values,
        }
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// The first candidate, used when a caller wants a single replacement.
    #[inline]
    pub fn default_value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }
}

/// Immutable, byte-sorted collection of [`LexiconEntry`] with unique keys.
///
/// Invariants upheld by every constructor:
/// - keys are non-empty and unique;
/// - every entry has at least one value;
/// - entries are sorted ascending by the UTF-8 bytes of the key.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: Vec<LexiconEntry>,
    /// Starter char → bitmask of key lengths (in chars) beginning with it.
    starter_masks: FxHashMap<char, u64>,
    /// Longest key, in chars.
    max_key_length: usize,
}

impl Lexicon {
    /// Builds a lexicon from entries in any order.
    ///
    /// ### Duplicates
    /// - Same key with **identical** values: collapsed into one entry, logged
    ///   at debug level.
    /// - Same key with **different** values: [`DictLoadError::DuplicateKey`].
    ///
    /// ### Errors
    /// [`DictLoadError::EmptyKey`] or [`DictLoadError::EmptyValues`] when an
    /// entry violates the invariants above.
    pub fn from_entries(entries: Vec<LexiconEntry>) -> Result<Self, DictLoadError> {
        for (i, entry) in entries.iter().enumerate() {
            if entry.key.is_empty() {
                return Err(DictLoadError::EmptyKey { entry: i + 1 });
            }
            if entry.values.is_empty() {
                return Err(DictLoadError::EmptyValues {
                    key: entry.key.clone(),
                });
            }
        }

        let mut entries = entries;
        // Stable, so the first occurrence of a key stays first.
        entries.sort_by(|a, b| a.key.as_bytes().cmp(b.key.as_bytes()));

        let mut unique: Vec<LexiconEntry> = Vec::with_capacity(entries.len());
        for entry in entries {
            match unique.last() {
                Some(prev) if prev.key == entry.key => {
                    if prev.values != entry.values {
                        return Err(DictLoadError::DuplicateKey { key: entry.key });
                    }
                    log::debug!("duplicate dictionary entry collapsed: key={}", entry.key);
                }
                _ => unique.push(entry),
            }
        }

        let mut lexicon = Self {
            entries: unique,
            starter_masks: FxHashMap::default(),
            max_key_length: 0,
        };
        lexicon.populate_starter_masks();
        Ok(lexicon)
    }

    /// Convenience wrapper over [`from_entries`](Self::from_entries).
    pub fn from_pairs<I>(pairs: I) -> Result<Self, DictLoadError>
    where
        I: IntoIterator<Item = (String, Vec<String>)>,
    {
        Self::from_entries(
            pairs
                .into_iter()
                .map(|(key, values)| LexiconEntry { key, values })
                .collect(),
        )
    }

    fn populate_starter_masks(&mut self) {
        self.starter_masks.clear();
        self.max_key_length = 0;
        for entry in &self.entries {
            let mut chars = entry.key.chars();
            let Some(starter) = chars.next() else {
                continue;
            };
            let len = 1 + chars.count();
            *self.starter_masks.entry(starter).or_insert(0) |= length_bit(len);
            self.max_key_length = self.max_key_length.max(len);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending byte order of their keys.
    #[inline]
    pub fn entries(&self) -> &[LexiconEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LexiconEntry> {
        self.entries.iter()
    }

    /// Longest key length, in chars.
    #[inline]
    pub fn max_key_length(&self) -> usize {
        self.max_key_length
    }

    /// Exact lookup.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.find(key.as_bytes())
            .map(|i| self.entries[i].values.as_slice())
    }

    #[inline]
    fn find(&self, key: &[u8]) -> Option<usize> {
        self.entries
            .binary_search_by(|e| e.key.as_bytes().cmp(key))
            .ok()
    }

    /// Longest entry whose key prefixes `text[start..]`.
    ///
    /// Only lengths present in the starter mask of the first char are probed,
    /// longest first, so the cost is one binary search per viable length.
    pub fn match_prefix(&self, text: &str, start: usize) -> Option<Match<'_>> {
        let rest = text.get(start..)?;
        let starter = rest.chars().next()?;
        let mask = *self.starter_masks.get(&starter)?;

        // ends[n - 1] = byte length of the first n chars of `rest`, for the
        // first INLINE_ENDS chars. Longer candidates are located on demand.
        let mut ends = [0usize; INLINE_ENDS];
        let mut known = 0;
        for (i, c) in rest.char_indices().take(self.max_key_length.min(INLINE_ENDS)) {
            ends[known] = i + c.len_utf8();
            known += 1;
        }
        let mut cap_here = known;
        if known == INLINE_ENDS && self.max_key_length > INLINE_ENDS {
            cap_here += rest[ends[INLINE_ENDS - 1]..]
                .chars()
                .take(self.max_key_length - INLINE_ENDS)
                .count();
        }

        let mut found = None;
        for_each_len_dec(mask, cap_here, |n| {
            let byte_len = if n <= known {
                ends[n - 1]
            } else {
                match rest.char_indices().nth(n - 1) {
                    Some((i, c)) => i + c.len_utf8(),
                    None => return false,
                }
            };
            match self.find(&rest.as_bytes()[..byte_len]) {
                Some(i) => {
                    found = Some(Match {
                        len: byte_len,
                        values: &self.entries[i].values,
                    });
                    true
                }
                None => false,
            }
        });
        found
    }

    pub fn into_entries(self) -> Vec<LexiconEntry> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Lexicon {
    type Item = &'a LexiconEntry;
    type IntoIter = std::slice::Iter<'a, LexiconEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
