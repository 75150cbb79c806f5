//! Segmentation guard
//!
//! Sentence boundary detectors know nothing about annotations, so a period
//! inside `coref_tag_beg_A1_ Mr. Jones coref_tag_end_A1_` can look like the
//! end of a sentence. Every inline triplet becomes a no-break zone and any
//! proposed boundary strictly inside one is merged into the following
//! sentence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

use crate::annotate::LinguisticAnnotator;
use crate::error::Result;
use crate::markup::inline_annotations;

/// Half-open byte range `[start, end)` over a fixed text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether `pos` lies strictly between the span's endpoints
    #[must_use]
    pub const fn strictly_contains(&self, pos: usize) -> bool {
        self.start < pos && pos < self.end
    }

    /// The text this span covers
    #[must_use]
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

/// Abbreviations that must not end a sentence
///
/// Stored lower-cased without the final period, so `Mr.` and `mr` are the
/// same entry. Built once per batch and shared read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbbreviationSet {
    words: BTreeSet<String>,
}

/// Abbreviations known before anything is learned from the documents
///
/// Only forms that are not also ordinary English words; `no`, `co`, `st`
/// and the like end sentences too often to suppress every boundary after them.
pub const DEFAULT_ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "mt", "gov", "inc", "corp", "ltd", "bros", "vs",
    "etc", "jan", "feb", "apr", "aug", "sept", "oct", "nov", "u.s", "u.k", "a.m", "p.m",
];

impl AbbreviationSet {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set holding [`DEFAULT_ABBREVIATIONS`]
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut set = Self::new();
        set.extend(DEFAULT_ABBREVIATIONS.iter().copied());
        set
    }

    fn normalize(word: &str) -> String {
        let word = word.trim();
        word.strip_suffix('.').unwrap_or(word).to_lowercase()
    }

    /// Add one abbreviation, with or without its final period
    pub fn insert(&mut self, word: &str) -> bool {
        let normalized = Self::normalize(word);
        if normalized.is_empty() {
            return false;
        }
        self.words.insert(normalized)
    }

    /// Whether `word` (with or without its final period) is known
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&Self::normalize(word))
    }

    /// Learn every period-final word inside the annotations of decoded text
    ///
    /// Returns the number of new entries.
    pub fn learn_from_decoded(&mut self, text: &str) -> usize {
        let mut learned = 0;
        for annotation in inline_annotations(text) {
            for word in annotation.payload.split_whitespace() {
                if word.ends_with('.') && self.insert(word) {
                    learned += 1;
                }
            }
        }
        learned
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

}

impl<'a> Extend<&'a str> for AbbreviationSet {
    fn extend<I: IntoIterator<Item = &'a str>>(&mut self, iter: I) {
        for word in iter {
            self.insert(word);
        }
    }
}

/// Byte ranges of every inline annotation triplet in decoded text
#[must_use]
pub fn no_break_zones(text: &str) -> Vec<Span> {
    inline_annotations(text)
        .into_iter()
        .map(|annotation| annotation.span)
        .collect()
}

/// Split `text` into sentences without breaking inside any zone
///
/// # Errors
///
/// Returns an error if the annotator's boundary detector fails
pub fn segment(
    text: &str,
    zones: &[Span],
    annotator: &dyn LinguisticAnnotator,
) -> Result<Vec<Span>> {
    let proposed = annotator.sentence_spans(text)?;
    Ok(merge_protected(text.len(), &proposed, zones))
}

/// Turn proposed sentence spans into contiguous spans covering `0..text_len`
///
/// Only the end of each proposed span counts as a boundary; a boundary
/// strictly inside a zone is dropped, which merges the two sentences around
/// it.
#[must_use]
pub fn merge_protected(text_len: usize, proposed: &[Span], zones: &[Span]) -> Vec<Span> {
    if text_len == 0 {
        return Vec::new();
    }

    let mut boundaries = Vec::with_capacity(proposed.len());
    let mut previous = 0;

    for span in proposed {
        let boundary = span.end;
        if boundary <= previous || boundary >= text_len {
            continue;
        }
        if let Some(zone) = zones.iter().find(|zone| zone.strictly_contains(boundary)) {
            debug!(
                boundary,
                zone_start = zone.start,
                zone_end = zone.end,
                "merging sentence boundary inside annotation"
            );
            continue;
        }
        boundaries.push(boundary);
        previous = boundary;
    }

    let mut spans = Vec::with_capacity(boundaries.len() + 1);
    let mut start = 0;
    for boundary in boundaries {
        spans.push(Span::new(start, boundary));
        start = boundary;
    }
    spans.push(Span::new(start, text_len));
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markup::decode;

    #[test]
    fn test_span_helpers() {
        let span = Span::new(2, 5);
        assert_eq!(span.len(), 3);
        assert!(!span.is_empty());
        assert!(span.strictly_contains(3));
        assert!(!span.strictly_contains(2));
        assert!(!span.strictly_contains(5));
        assert_eq!(span.slice("abcdefg"), "cde");
    }

    #[test]
    fn test_no_break_zones_cover_triplets() {
        let text = decode(r#"A <COREF ID="A1">Mr. Smith</COREF> left. <COREF ID="A2">He</COREF> won."#);
        let zones = no_break_zones(&text);

        assert_eq!(zones.len(), 2);
        assert_eq!(zones[0].slice(&text), "coref_tag_beg_A1_ Mr. Smith coref_tag_end_A1_");
        assert_eq!(zones[1].slice(&text), "coref_tag_beg_A2_ He coref_tag_end_A2_");
    }

    #[test]
    fn test_merge_drops_boundary_inside_zone() {
        // "aaaa. bb. cc" with a zone over "bb. cc"
        let proposed = [Span::new(0, 6), Span::new(6, 10), Span::new(10, 12)];
        let zones = [Span::new(6, 12)];

        let spans = merge_protected(12, &proposed, &zones);
        assert_eq!(spans, vec![Span::new(0, 6), Span::new(6, 12)]);
    }

    #[test]
    fn test_merge_single_sentence() {
        assert_eq!(merge_protected(7, &[], &[]), vec![Span::new(0, 7)]);
        assert_eq!(merge_protected(7, &[Span::new(0, 7)], &[]), vec![Span::new(0, 7)]);
        assert!(merge_protected(0, &[], &[]).is_empty());
    }

    #[test]
    fn test_merge_is_contiguous_and_complete() {
        let proposed = [Span::new(0, 3), Span::new(4, 9), Span::new(9, 20)];
        let spans = merge_protected(20, &proposed, &[Span::new(8, 10)]);

        assert_eq!(spans.first().map(|s| s.start), Some(0));
        assert_eq!(spans.last().map(|s| s.end), Some(20));
        for pair in spans.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn test_abbreviation_normalization() {
        let mut set = AbbreviationSet::new();
        assert!(set.insert("Mr."));
        assert!(!set.insert("mr"));
        assert!(set.contains("MR."));
        assert!(!set.insert("."));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_learn_from_decoded() {
        let text = decode(r#"<COREF ID="A1">Acme Corp.</COREF> hired <COREF ID="A2">Dr. Who</COREF>."#);
        let mut set = AbbreviationSet::new();

        assert_eq!(set.learn_from_decoded(&text), 2);
        assert!(set.contains("corp"));
        assert!(set.contains("Dr."));
        assert!(!set.contains("who"));
    }

    #[test]
    fn test_defaults_present() {
        let set = AbbreviationSet::with_defaults();
        assert!(set.contains("Inc."));
        assert!(set.contains("U.S."));
    }

    #[test]
    fn test_defaults_exclude_common_words() {
        let set = AbbreviationSet::with_defaults();
        for word in ["no", "co", "st", "mar", "dec", "rev", "gen", "sen", "rep"] {
            assert!(!set.contains(word), "{word} should not be a default abbreviation");
        }
    }
}
