//! Plain-text dictionaries.
//!
//! ## File format
//! UTF-8, one entry per line:
//!
//! ```text
//! key<TAB>value1 value2 ...
//! ```
//!
//! - Values are separated by single spaces; the first value is the default.
//! - Blank lines and lines starting with `#` are ignored.
//! - A leading UTF-8 BOM is stripped.
//! - Any other line without a TAB, with an empty key, or without values is a
//!   [`DictLoadError::MalformedLine`].

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use crate::dictionary_lib::{Dict, Lexicon, LexiconEntry, Match};
use crate::errors::DictLoadError;

const UTF8_BOM: char = '\u{feff}';

/// Dictionary backed by a single [`Lexicon`].
#[derive(Debug, Clone, Default)]
pub struct TextDict {
    lexicon: Lexicon,
}

impl TextDict {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { lexicon }
    }

    /// Parses dictionary text already held in memory.
    pub fn parse(content: &str) -> Result<Self, DictLoadError> {
        parse_lexicon(content).map(Self::new)
    }

    /// Reads and parses a text dictionary file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DictLoadError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| DictLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    #[inline]
    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn into_lexicon(self) -> Lexicon {
        self.lexicon
    }
}

impl From<Lexicon> for TextDict {
    fn from(lexicon: Lexicon) -> Self {
        Self::new(lexicon)
    }
}

impl Dict for TextDict {
    fn match_prefix(&self, text: &str, start: usize) -> Option<Match<'_>> {
        self.lexicon.match_prefix(text, start)
    }

    fn get(&self, key: &str) -> Option<&[String]> {
        self.lexicon.get(key)
    }

    fn max_key_length(&self) -> usize {
        self.lexicon.max_key_length()
    }

    fn len(&self) -> usize {
        self.lexicon.len()
    }
}

/// Splits dictionary text into entries, in order of appearance.
fn parse_entries(content: &str) -> Result<Vec<LexiconEntry>, DictLoadError> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);
    let mut entries = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let malformed = || DictLoadError::MalformedLine {
            line: idx + 1,
            content: line.to_string(),
        };

        let (key, rest) = line.split_once('\t').ok_or_else(malformed)?;
        let values: Vec<String> = rest.split_whitespace().map(str::to_owned).collect();
        if key.is_empty() || values.is_empty() {
            return Err(malformed());
        }
        entries.push(LexiconEntry::new(key, values));
    }

    Ok(entries)
}

/// Parses dictionary text into a [`Lexicon`].
///
/// ```
/// use opencc_chain::dictionary_lib::parse_lexicon;
///
/// let lexicon = parse_lexicon("# comment\n干\t幹 乾 干\n\n干燥\t乾燥\n").unwrap();
/// assert_eq!(lexicon.len(), 2);
/// assert_eq!(lexicon.get("干").unwrap()[1], "乾");
/// ```
pub fn parse_lexicon(content: &str) -> Result<Lexicon, DictLoadError> {
    Lexicon::from_entries(parse_entries(content)?)
}

/// Writes `lexicon` in the text format, one entry per line, in byte order.
pub fn write_lexicon<W: Write>(lexicon: &Lexicon, mut out: W) -> io::Result<()> {
    for entry in lexicon {
        writeln!(out, "{}\t{}", entry.key(), entry.values().join(" "))?;
    }
    out.flush()
}

/// Builds the inverse of a text dictionary: every value becomes a key whose
/// values are the original keys that produced it.
///
/// Output lines are sorted by byte order of the new key; original keys keep
/// their order of appearance in `content`.
///
/// ```
/// use opencc_chain::dictionary_lib::reverse_mapping;
///
/// let reversed = reverse_mapping("甲\tA B\n乙\tB\n").unwrap();
/// assert_eq!(reversed, "A\t甲\nB\t甲 乙\n");
/// ```
pub fn reverse_mapping(content: &str) -> Result<String, DictLoadError> {
    let entries = parse_entries(content)?;
    let mut reversed: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for entry in &entries {
        for value in entry.values() {
            let keys = reversed.entry(value.as_str()).or_default();
            if !keys.contains(&entry.key()) {
                keys.push(entry.key());
            }
        }
    }

    let mut out = String::new();
    for (value, keys) in reversed {
        out.push_str(value);
        out.push('\t');
        out.push_str(&keys.join(" "));
        out.push('\n');
    }
    Ok(out)
}
