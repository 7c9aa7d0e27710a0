//! Greedy forward maximum-match segmentation.
//!
//! Starting at byte offset `i`, the stage's [`DictGroup`] is asked for the
//! longest key prefixing `text[i..]`. A hit of `L` bytes becomes one matched
//! segment and the scan resumes at `i + L`. A miss emits the single code point
//! at `i` unchanged. The scan never backtracks, and the emitted segments
//! always tile the input exactly.

use std::iter::FusedIterator;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dictionary_lib::DictGroup;
use crate::utils::utf8_char_len;

/// Segmentation strategy selector, as named in conversion profiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentationType {
    /// Greedy forward maximum match.
    #[default]
    #[serde(rename = "mmseg")]
    Mmseg,
}

/// One span of the input.
///
/// `values` is `Some` for a dictionary hit (candidates in dictionary order,
/// never empty) and `None` for a pass-through code point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub start: usize,
    pub end: usize,
    pub text: &'a str,
    pub values: Option<&'a [String]>,
}

impl<'a> Segment<'a> {
    /// The replacement text: first candidate for a hit, the source otherwise.
    #[inline]
    pub fn output(&self) -> &'a str {
        match self.values.and_then(|v| v.first()) {
            Some(first) => first.as_str(),
            None => self.text,
        }
    }

    #[inline]
    pub fn is_match(&self) -> bool {
        self.values.is_some()
    }
}

/// Max-match segmenter over a shared dictionary group.
#[derive(Debug, Clone)]
pub struct MaxMatchSegmentation {
    group: Arc<DictGroup>,
}

impl MaxMatchSegmentation {
    pub fn new(group: Arc<DictGroup>) -> Self {
        Self { group }
    }

    #[inline]
    pub fn group(&self) -> &Arc<DictGroup> {
        &self.group
    }

    /// Lazily segments `text`. Each call starts a fresh scan at offset 0.
    pub fn segment<'a>(&'a self, text: &'a str) -> Segments<'a> {
        Segments {
            group: &self.group,
            text,
            pos: 0,
        }
    }
}

/// Iterator returned by [`MaxMatchSegmentation::segment`].
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    group: &'a DictGroup,
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.pos;
        let bytes = self.text.as_bytes();
        if start >= bytes.len() {
            return None;
        }

        let (end, values) = match self.group.lookup(self.text, start) {
            // A length off a char boundary breaks the `Dict` contract; treat
            // it as a miss rather than slicing mid-char.
            Some(m) if m.len > 0 && self.text.is_char_boundary(start + m.len) => {
                (start + m.len, Some(m.values))
            }
            _ => ((start + utf8_char_len(bytes[start])).min(bytes.len()), None),
        };
        debug_assert!(end > start, "segmentation must move forward");
        self.pos = end;

        Some(Segment {
            start,
            end,
            text: &self.text[start..end],
            values,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.text.len().saturating_sub(self.pos);
        ((remaining > 0) as usize, Some(remaining))
    }
}

impl FusedIterator for Segments<'_> {}
