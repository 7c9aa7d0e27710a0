//! Conversion stages and the chain that threads text through them.
//!
//! A [`Conversion`] is one stage: a shared [`DictGroup`] plus the segmentation
//! strategy. Every matched span is replaced by its first candidate; every
//! unmatched code point is copied through. A [`ConversionChain`] runs its
//! stages in order, feeding the output of stage *k* to stage *k + 1*.

use std::borrow::Cow;
use std::sync::Arc;

use crate::dictionary_lib::DictGroup;
use crate::errors::{ConvertError, InitError};
use crate::segmentation::{MaxMatchSegmentation, SegmentationType, Segments};

/// One conversion stage.
#[derive(Debug, Clone)]
pub struct Conversion {
    segmentation: MaxMatchSegmentation,
    kind: SegmentationType,
}

impl Conversion {
    /// Stage using the default ([`SegmentationType::Mmseg`]) strategy.
    pub fn new(group: Arc<DictGroup>) -> Self {
        Self::with_segmentation(group, SegmentationType::default())
    }

    pub fn with_segmentation(group: Arc<DictGroup>, kind: SegmentationType) -> Self {
        let segmentation = match kind {
            SegmentationType::Mmseg => MaxMatchSegmentation::new(group),
        };
        Self { segmentation, kind }
    }

    #[inline]
    pub fn group(&self) -> &Arc<DictGroup> {
        self.segmentation.group()
    }

    #[inline]
    pub fn segmentation_type(&self) -> SegmentationType {
        self.kind
    }

    /// Segments of `text` as seen by this stage.
    pub fn segments<'a>(&'a self, text: &'a str) -> Segments<'a> {
        self.segmentation.segment(text)
    }

    /// Converts `text`, choosing the first candidate for every match.
    pub fn convert(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + (text.len() >> 3));
        for segment in self.segments(text) {
            out.push_str(segment.output());
        }
        out
    }

    /// Like [`convert`](Self::convert), after validating `input` as UTF-8.
    pub fn convert_bytes(&self, input: &[u8]) -> Result<String, ConvertError> {
        Ok(self.convert(std::str::from_utf8(input)?))
    }

    /// Every span of `text` with all of its candidates in dictionary order.
    /// Pass-through spans carry their own text as the only candidate.
    ///
    /// ```
    /// use std::sync::Arc;
    /// use opencc_chain::conversion::Conversion;
    /// use opencc_chain::dictionary_lib::{Dict, DictGroup, TextDict};
    ///
    /// let dict: Arc<dyn Dict> = Arc::new(TextDict::parse("发\t發 髮\n").unwrap());
    /// let stage = Conversion::new(Arc::new(DictGroup::new(vec![dict])));
    ///
    /// let spans = stage.candidates("发!");
    /// assert_eq!(spans[0], ("发", vec!["發", "髮"]));
    /// assert_eq!(spans[1], ("!", vec!["!"]));
    /// ```
    pub fn candidates<'a>(&'a self, text: &'a str) -> Vec<(&'a str, Vec<&'a str>)> {
        self.segments(text)
            .map(|s| {
                let values = match s.values {
                    Some(values) => values.iter().map(String::as_str).collect(),
                    None => vec![s.text],
                };
                (s.text, values)
            })
            .collect()
    }
}

/// Ordered, non-empty list of conversion stages.
#[derive(Debug, Clone)]
pub struct ConversionChain {
    stages: Vec<Conversion>,
}

impl ConversionChain {
    /// Fails with [`InitError::EmptyChain`] when `stages` is empty.
    pub fn new(stages: Vec<Conversion>) -> Result<Self, InitError> {
        if stages.is_empty() {
            return Err(InitError::EmptyChain);
        }
        Ok(Self { stages })
    }

    #[inline]
    pub fn stages(&self) -> &[Conversion] {
        &self.stages
    }

    pub fn convert(&self, text: &str) -> String {
        let mut current = Cow::Borrowed(text);
        for stage in &self.stages {
            current = Cow::Owned(stage.convert(&current));
        }
        current.into_owned()
    }

    /// Validates `input` once, then runs every stage. Invalid input yields an
    /// error and no partial output.
    pub fn convert_bytes(&self, input: &[u8]) -> Result<String, ConvertError> {
        Ok(self.convert(std::str::from_utf8(input)?))
    }
}
