//! Chinese script conversion through chained max-match dictionary stages.
//!
//! A [`Converter`] is opened from a conversion profile (see [`config`]) and
//! runs the profile's [`ConversionChain`] over input text. Each stage segments
//! its input greedily against a [`DictGroup`] and substitutes the first
//! candidate of every matched key.
//!
//! ```
//! use opencc_chain::Converter;
//!
//! let converter = Converter::open("s2t").unwrap();
//! assert_eq!(converter.convert("龙马精神"), "龍馬精神");
//! ```

use rayon::prelude::*;

pub mod config;
pub mod conversion;
pub mod dictionary_lib;
pub mod errors;
pub mod segmentation;
pub mod utils;

pub use crate::config::{default_loader, Profile, ProfileLoader, PROFILE_IDS};
pub use crate::conversion::{Conversion, ConversionChain};
pub use crate::dictionary_lib::{Dict, DictGroup, Lexicon, Match, TextDict, TrieDict};
pub use crate::errors::{ConvertError, DictLoadError, InitError};
pub use crate::segmentation::{MaxMatchSegmentation, Segment, SegmentationType};

/// An opened conversion profile.
///
/// Immutable once opened; share it across threads by reference or `Arc`.
#[derive(Debug, Clone)]
pub struct Converter {
    name: String,
    chain: ConversionChain,
}

impl Converter {
    /// Opens a profile by built-in id (e.g. `"s2twp"`) or by path, through the
    /// [`default_loader`].
    ///
    /// Fails if the profile or any dictionary it names cannot be found, read,
    /// or parsed. Nothing is substituted for missing data.
    pub fn open(profile: &str) -> Result<Self, InitError> {
        default_loader().open(profile)
    }

    /// Wraps an already-built chain.
    pub fn from_chain(name: impl Into<String>, chain: ConversionChain) -> Self {
        Self {
            name: name.into(),
            chain,
        }
    }

    /// Profile name, or the id it was opened with when the profile has none.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn chain(&self) -> &ConversionChain {
        &self.chain
    }

    pub fn convert(&self, text: &str) -> String {
        self.chain.convert(text)
    }

    /// Validates `input` as UTF-8, then converts it.
    ///
    /// ```
    /// use opencc_chain::Converter;
    ///
    /// let converter = Converter::open("s2t").unwrap();
    /// let err = converter.convert_bytes(&[0xFF, 0xFE, 0xFD]).unwrap_err();
    /// assert!(err.to_string().starts_with("invalid UTF-8"));
    /// ```
    pub fn convert_bytes(&self, input: &[u8]) -> Result<String, ConvertError> {
        self.chain.convert_bytes(input)
    }

    /// Converts independent documents in parallel. Output order matches input.
    pub fn convert_batch<S>(&self, inputs: &[S]) -> Vec<String>
    where
        S: AsRef<str> + Sync,
    {
        inputs
            .par_iter()
            .map(|text| self.chain.convert(text.as_ref()))
            .collect()
    }

    /// Releases the converter. Dropping it has the same effect; dictionaries
    /// shared with other converters stay alive until their last user is gone.
    pub fn close(self) {
        log::debug!("closing converter {:?}", self.name);
    }
}
