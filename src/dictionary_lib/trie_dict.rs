//! Compact dictionaries: an `fst` trie index over the keys plus a packed
//! value table.
//!
//! Each key maps (through the trie) to an entry id. The id selects a span
//! `(offset, count)` in `spans`, and the span selects the entry's values in the
//! flat `values` table.
//!
//! ## On-disk format (`.trie`)
//! A zstd-compressed CBOR document holding the raw fst bytes, the value table
//! and the span table. Every load is validated; an index that disagrees with
//! the value table is reported as [`DictLoadError::CorruptIndex`].

use std::fmt;
use std::fs;
use std::path::Path;

use fst::raw::Output;
use fst::{Map, MapBuilder, Streamer};
use serde::{Deserialize, Serialize};

use crate::dictionary_lib::{Dict, Lexicon, LexiconEntry, Match};
use crate::errors::DictLoadError;

/// zstd level used when saving, same as the bundled dictionary blobs.
const ZSTD_LEVEL: i32 = 19;

#[derive(Serialize, Deserialize)]
struct TrieDictData {
    fst: Vec<u8>,
    values: Vec<String>,
    spans: Vec<(u32, u32)>,
}

/// Dictionary backed by a compressed trie.
pub struct TrieDict {
    index: Map<Vec<u8>>,
    values: Vec<String>,
    spans: Vec<(u32, u32)>,
    max_key_length: usize,
}

impl fmt::Debug for TrieDict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrieDict")
            .field("entries", &self.spans.len())
            .field("values", &self.values.len())
            .field("max_key_length", &self.max_key_length)
            .finish()
    }
}

impl TrieDict {
    /// Builds the trie and value table from a lexicon.
    ///
    /// Lexicon keys are already unique and byte-sorted, which is the insertion
    /// order `fst` requires.
    pub fn from_lexicon(lexicon: &Lexicon) -> Result<Self, DictLoadError> {
        let mut builder = MapBuilder::memory();
        let mut values = Vec::new();
        let mut spans = Vec::with_capacity(lexicon.len());

        for (id, entry) in lexicon.iter().enumerate() {
            builder
                .insert(entry.key(), id as u64)
                .map_err(|e| DictLoadError::Encode(e.to_string()))?;
            spans.push((to_u32(values.len())?, to_u32(entry.values().len())?));
            values.extend(entry.values().iter().cloned());
        }

        let bytes = builder
            .into_inner()
            .map_err(|e| DictLoadError::Encode(e.to_string()))?;
        let index = Map::new(bytes).map_err(|e| DictLoadError::Encode(e.to_string()))?;

        Ok(Self {
            index,
            values,
            spans,
            max_key_length: lexicon.max_key_length(),
        })
    }

    #[inline]
    fn values_for(&self, id: u64) -> Option<&[String]> {
        let &(offset, count) = self.spans.get(usize::try_from(id).ok()?)?;
        let start = offset as usize;
        self.values.get(start..start + count as usize)
    }

    /// Rebuilds the sorted lexicon this trie was made from.
    pub fn to_lexicon(&self) -> Result<Lexicon, DictLoadError> {
        let mut entries = Vec::with_capacity(self.spans.len());
        let mut stream = self.index.stream();
        while let Some((key, id)) = stream.next() {
            let key = std::str::from_utf8(key)
                .map_err(|_| DictLoadError::CorruptIndex("non UTF-8 key".into()))?;
            let values = self
                .values_for(id)
                .ok_or_else(|| DictLoadError::CorruptIndex(format!("dangling id {id}")))?;
            entries.push(LexiconEntry::new(key, values.to_vec()));
        }
        Lexicon::from_entries(entries)
    }

    /// Encodes to the `.trie` blob (CBOR, then zstd).
    pub fn to_bytes(&self) -> Result<Vec<u8>, DictLoadError> {
        let data = TrieDictData {
            fst: self.index.as_fst().as_bytes().to_vec(),
            values: self.values.clone(),
            spans: self.spans.clone(),
        };
        let cbor = serde_cbor::to_vec(&data).map_err(|e| DictLoadError::Encode(e.to_string()))?;
        zstd::encode_all(cbor.as_slice(), ZSTD_LEVEL)
            .map_err(|e| DictLoadError::Encode(e.to_string()))
    }

    /// Decodes and validates a `.trie` blob.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DictLoadError> {
        let cbor = zstd::decode_all(bytes).map_err(|e| DictLoadError::Decode(e.to_string()))?;
        let data: TrieDictData =
            serde_cbor::from_slice(&cbor).map_err(|e| DictLoadError::Decode(e.to_string()))?;
        Self::validate(data)
    }

    fn validate(data: TrieDictData) -> Result<Self, DictLoadError> {
        let corrupt = |msg: String| DictLoadError::CorruptIndex(msg);

        let index = Map::new(data.fst).map_err(|e| corrupt(format!("bad trie: {e}")))?;
        // `Map::new` only reads the header and footer; the body is checked
        // against its checksum before anything walks it.
        index
            .as_fst()
            .verify()
            .map_err(|e| corrupt(format!("bad trie: {e}")))?;
        if index.len() != data.spans.len() {
            return Err(corrupt(format!(
                "{} keys but {} value spans",
                index.len(),
                data.spans.len()
            )));
        }
        for (id, &(offset, count)) in data.spans.iter().enumerate() {
            let end = offset as usize + count as usize;
            if count == 0 || end > data.values.len() {
                return Err(corrupt(format!(
                    "span {id} ({offset}, {count}) outside value table of {}",
                    data.values.len()
                )));
            }
        }

        let mut max_key_length = 0;
        let mut stream = index.stream();
        while let Some((key, id)) = stream.next() {
            if id >= data.spans.len() as u64 {
                return Err(corrupt(format!("entry id {id} out of range")));
            }
            let key = std::str::from_utf8(key).map_err(|_| corrupt("non UTF-8 key".into()))?;
            if key.is_empty() {
                return Err(corrupt("empty key".into()));
            }
            max_key_length = max_key_length.max(key.chars().count());
        }
        drop(stream);

        Ok(Self {
            index,
            values: data.values,
            spans: data.spans,
            max_key_length,
        })
    }

    /// Writes the `.trie` blob to `path`.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), DictLoadError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        fs::write(path, bytes).map_err(|source| DictLoadError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reads and validates a `.trie` file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DictLoadError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| DictLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }
}

impl Dict for TrieDict {
    /// Walks the trie byte by byte from `start`, remembering the last final
    /// state reached. Runs in time proportional to the matched length.
    fn match_prefix(&self, text: &str, start: usize) -> Option<Match<'_>> {
        let rest = text.get(start..)?;
        let fst = self.index.as_fst();
        let mut node = fst.root();
        let mut out = Output::zero();
        let mut best: Option<(usize, u64)> = None;

        for (i, &b) in rest.as_bytes().iter().enumerate() {
            let Some(t) = node.find_input(b) else {
                break;
            };
            let t = node.transition(t);
            out = out.cat(t.out);
            node = fst.node(t.addr);
            if node.is_final() && rest.is_char_boundary(i + 1) {
                best = Some((i + 1, out.cat(node.final_output()).value()));
            }
        }

        let (len, id) = best?;
        Some(Match {
            len,
            values: self.values_for(id)?,
        })
    }

    fn get(&self, key: &str) -> Option<&[String]> {
        self.index.get(key).and_then(|id| self.values_for(id))
    }

    fn max_key_length(&self) -> usize {
        self.max_key_length
    }

    fn len(&self) -> usize {
        self.spans.len()
    }
}

fn to_u32(n: usize) -> Result<u32, DictLoadError> {
    u32::try_from(n).map_err(|_| DictLoadError::Encode(format!("value table too large: {n}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dictionary_lib::{parse_lexicon, TextDict};

    const SAMPLE: &str = "头\t頭\n头发\t頭髮\n发\t發 髮\n干\t幹 乾 干\n干燥\t乾燥\n一发千钧\t一髮千鈞\n";

    #[test]
    fn trie_agrees_with_text_dict() {
        let lexicon = parse_lexicon(SAMPLE).unwrap();
        let trie = TrieDict::from_lexicon(&lexicon).unwrap();
        let text = TextDict::new(lexicon);

        assert_eq!(trie.len(), text.len());
        assert_eq!(trie.max_key_length(), 4);

        let input = "一发千钧，头发干燥，发干";
        for (start, _) in input.char_indices() {
            assert_eq!(
                trie.match_prefix(input, start),
                text.match_prefix(input, start),
                "mismatch at byte {start}"
            );
        }
    }

    #[test]
    fn match_prefix_requires_full_key() {
        let lexicon = parse_lexicon(SAMPLE).unwrap();
        let trie = TrieDict::from_lexicon(&lexicon).unwrap();

        // "一发千" is only a path in the trie, not a key.
        assert!(trie.match_prefix("一发千", 0).is_none());
        let m = trie.match_prefix("干燥剂", 0).unwrap();
        assert_eq!(m.len, "干燥".len());
        assert_eq!(m.values, &["乾燥".to_string()][..]);
        assert!(trie.match_prefix("头", 1).is_none());
        assert!(trie.match_prefix("头", 99).is_none());
    }

    #[test]
    fn bytes_roundtrip_and_back_to_lexicon() {
        let lexicon = parse_lexicon(SAMPLE).unwrap();
        let trie = TrieDict::from_lexicon(&lexicon).unwrap();
        let restored = TrieDict::from_bytes(&trie.to_bytes().unwrap()).unwrap();

        assert_eq!(restored.get("干").unwrap().len(), 3);
        assert_eq!(restored.max_key_length(), 4);
        assert_eq!(restored.to_lexicon().unwrap().entries(), lexicon.entries());
    }

    #[test]
    fn inconsistent_spans_are_corrupt() {
        let lexicon = parse_lexicon(SAMPLE).unwrap();
        let trie = TrieDict::from_lexicon(&lexicon).unwrap();

        let mut data = TrieDictData {
            fst: trie.index.as_fst().as_bytes().to_vec(),
            values: trie.values.clone(),
            spans: trie.spans.clone(),
        };
        data.spans.pop();
        assert!(matches!(
            TrieDict::validate(data).unwrap_err(),
            DictLoadError::CorruptIndex(_)
        ));

        let data = TrieDictData {
            fst: trie.index.as_fst().as_bytes().to_vec(),
            values: vec!["x".to_string()],
            spans: trie.spans.clone(),
        };
        assert!(matches!(
            TrieDict::validate(data).unwrap_err(),
            DictLoadError::CorruptIndex(_)
        ));
    }

    #[test]
    fn out_of_range_entry_id_is_corrupt() {
        let mut builder = MapBuilder::memory();
        builder.insert("头", 7).unwrap();
        let data = TrieDictData {
            fst: builder.into_inner().unwrap(),
            values: vec!["頭".to_string()],
            spans: vec![(0, 1)],
        };
        match TrieDict::validate(data).unwrap_err() {
            DictLoadError::CorruptIndex(msg) => assert!(msg.contains("7"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn flipped_trie_bytes_are_corrupt() {
        let lexicon = parse_lexicon(SAMPLE).unwrap();
        let trie = TrieDict::from_lexicon(&lexicon).unwrap();
        let fst = trie.index.as_fst().as_bytes().to_vec();

        for pos in 0..fst.len() {
            for mask in [0x01u8, 0x80, 0xFF] {
                let mut bytes = fst.clone();
                bytes[pos] ^= mask;
                let data = TrieDictData {
                    fst: bytes,
                    values: trie.values.clone(),
                    spans: trie.spans.clone(),
                };
                assert!(
                    matches!(
                        TrieDict::validate(data),
                        Err(DictLoadError::CorruptIndex(_))
                    ),
                    "byte {pos} ^ {mask:#04x} was accepted"
                );
            }
        }
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            TrieDict::from_bytes(b"not a dictionary").unwrap_err(),
            DictLoadError::Decode(_)
        ));
    }

    #[test]
    fn empty_lexicon_gives_empty_trie() {
        let trie = TrieDict::from_lexicon(&Lexicon::default()).unwrap();
        assert!(trie.is_empty());
        assert!(trie.match_prefix("abc", 0).is_none());
        let restored = TrieDict::from_bytes(&trie.to_bytes().unwrap()).unwrap();
        assert_eq!(restored.len(), 0);
    }
}
