//! Error types for dictionary loading, profile initialisation and conversion.
//!
//! Every fallible operation returns its own error value; there is no
//! process-wide "last error" slot. Use `Display` (or `to_string()`) to get the
//! human-readable description.

use std::path::PathBuf;
use std::str::Utf8Error;

/// A dictionary could not be built or decoded.
#[derive(Debug, thiserror::Error)]
pub enum DictLoadError {
    /// An entry has an empty key. `entry` is the 1-based position in the input.
    #[error("empty dictionary key (entry {entry})")]
    EmptyKey { entry: usize },

    /// An entry was supplied without any value.
    #[error("dictionary key {key:?} has no values")]
    EmptyValues { key: String },

    /// A non-blank, non-comment line is not `key<TAB>value ...`.
    #[error("malformed dictionary line {line}: {content:?}")]
    MalformedLine { line: usize, content: String },

    /// The same key appears twice with different values.
    #[error("duplicate dictionary key with conflicting values: {key:?}")]
    DuplicateKey { key: String },

    /// The trie index and the value table do not agree.
    #[error("corrupt trie dictionary: {0}")]
    CorruptIndex(String),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A compact dictionary blob could not be decompressed or deserialized.
    #[error("failed to decode compact dictionary: {0}")]
    Decode(String),

    #[error("failed to encode compact dictionary: {0}")]
    Encode(String),
}

/// A [`Converter`](crate::Converter) could not be opened.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    /// `kind` is `"profile"` or `"dictionary"`.
    #[error("{kind} not found: {}", .path.display())]
    NotFound { kind: &'static str, path: PathBuf },

    #[error("failed to read profile {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed profile {}: {reason}", .path.display())]
    MalformedProfile { path: PathBuf, reason: String },

    #[error("failed to load dictionary {}: {source}", .path.display())]
    Dictionary {
        path: PathBuf,
        #[source]
        source: DictLoadError,
    },

    /// A conversion chain needs at least one stage.
    #[error("conversion chain has no stages")]
    EmptyChain,
}

/// Input text could not be converted. Nothing is returned on this path.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error("invalid UTF-8 input at byte {valid_up_to}: {source}")]
    InvalidUtf8 {
        valid_up_to: usize,
        #[source]
        source: Utf8Error,
    },
}

impl From<Utf8Error> for ConvertError {
    fn from(source: Utf8Error) -> Self {
        ConvertError::InvalidUtf8 {
            valid_up_to: source.valid_up_to(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_path() {
        let err = InitError::NotFound {
            kind: "profile",
            path: PathBuf::from("/no/such/s2t.json"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/no/such/s2t.json"));
        assert!(msg.contains("not found"));
    }

    #[test]
    fn invalid_utf8_message_prefix() {
        let bytes = [0xFFu8, 0xFE, 0xFD];
        let err: ConvertError = std::str::from_utf8(&bytes).unwrap_err().into();
        assert!(err.to_string().starts_with("invalid UTF-8"));
    }
}
