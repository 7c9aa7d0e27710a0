//! Ordered group of dictionaries queried as one.

use std::sync::Arc;

use crate::dictionary_lib::{Dict, Match};

/// A match from a [`DictGroup`], tagged with the index of the member that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GroupMatch<'d> {
    pub len: usize,
    pub values: &'d [String],
    pub source: usize,
}

impl<'d> From<GroupMatch<'d>> for Match<'d> {
    fn from(m: GroupMatch<'d>) -> Self {
        Match {
            len: m.len,
            values: m.values,
        }
    }
}

/// Ordered, non-owning view over several dictionaries.
///
/// Members are shared (`Arc`), so the same loaded dictionary can sit in more
/// than one group. A group is itself a [`Dict`] and may be nested.
///
/// Lookup rule: the longest match across all members wins; on equal length
/// the member listed first wins.
#[derive(Debug, Clone, Default)]
pub struct DictGroup {
    dicts: Vec<Arc<dyn Dict>>,
    max_key_length: usize,
}

impl DictGroup {
    pub fn new(dicts: Vec<Arc<dyn Dict>>) -> Self {
        let max_key_length = dicts.iter().map(|d| d.max_key_length()).max().unwrap_or(0);
        Self {
            dicts,
            max_key_length,
        }
    }

    #[inline]
    pub fn dicts(&self) -> &[Arc<dyn Dict>] {
        &self.dicts
    }

    /// Longest match across members, with the member index.
    pub fn lookup(&self, text: &str, start: usize) -> Option<GroupMatch<'_>> {
        let mut best: Option<GroupMatch<'_>> = None;
        for (source, dict) in self.dicts.iter().enumerate() {
            if let Some(m) = dict.match_prefix(text, start) {
                // Strictly longer only: earlier members keep ties.
                if best.map_or(true, |b| m.len > b.len) {
                    best = Some(GroupMatch {
                        len: m.len,
                        values: m.values,
                        source,
                    });
                }
            }
        }
        best
    }
}

impl Dict for DictGroup {
    fn match_prefix(&self, text: &str, start: usize) -> Option<Match<'_>> {
        self.lookup(text, start).map(Match::from)
    }

    /// First member holding `key`.
    fn get(&self, key: &str) -> Option<&[String]> {
        self.dicts.iter().find_map(|d| d.get(key))
    }

    fn max_key_length(&self) -> usize {
        self.max_key_length
    }

    /// Sum of member sizes; keys present in several members count once each.
    fn len(&self) -> usize {
        self.dicts.iter().map(|d| d.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary_lib::{TextDict, TrieDict};

    fn text(content: &str) -> Arc<dyn Dict> {
        Arc::new(TextDict::parse(content).unwrap())
    }

    fn trie(content: &str) -> Arc<dyn Dict> {
        let dict = TextDict::parse(content).unwrap();
        Arc::new(TrieDict::from_lexicon(dict.lexicon()).unwrap())
    }

    #[test]
    fn longest_match_across_members() {
        let group = DictGroup::new(vec![text("发\t發\n"), trie("头发\t頭髮\n")]);
        let m = group.lookup("头发", 0).unwrap();
        assert_eq!(m.len, "头发".len());
        assert_eq!(m.source, 1);
        assert_eq!(group.max_key_length(), 2);
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn earliest_member_wins_ties() {
        let group = DictGroup::new(vec![text("台\t臺\n"), text("台\t颱\n")]);
        let m = group.lookup("台", 0).unwrap();
        assert_eq!(m.source, 0);
        assert_eq!(m.values, &["臺".to_string()][..]);
        assert_eq!(group.get("台").unwrap(), &["臺".to_string()][..]);
    }

    #[test]
    fn groups_nest() {
        let inner: Arc<dyn Dict> = Arc::new(DictGroup::new(vec![text("干燥\t乾燥\n")]));
        let outer = DictGroup::new(vec![text("干\t幹\n"), inner]);
        assert_eq!(
            outer.match_prefix("干燥", 0).and_then(|m| m.default_value()),
            Some("乾燥")
        );
    }

    #[test]
    fn empty_group_matches_nothing() {
        let group = DictGroup::new(Vec::new());
        assert!(group.is_empty());
        assert_eq!(group.max_key_length(), 0);
        assert!(group.lookup("abc", 0).is_none());
    }
}
