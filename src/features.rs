//! Pairwise coreference features
//!
//! Each anaphor is paired with every mention positioned strictly before it,
//! nearest first:
//!
//! - `word_match`: the two phrases share a lemma (lower-cased, stemmed)
//! - `sentence_distance` and `distance`: deltas on the mention positions
//! - `is_appositive`: the candidate's sentence ends in a noun phrase holding a
//!   comma. It is computed for every pair but no strategy consumes it yet.

use cached::{Cached, UnboundCache};
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};

use crate::annotate::NOUN_PHRASE;
use crate::mention::CorefMention;

/// Features of one (anaphor, candidate) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub anaphor_id: String,
    pub candidate_id: String,

    /// Whether any lemma of the anaphor is also a lemma of the candidate
    pub word_match: bool,

    /// Anaphor sentence index minus candidate sentence index
    pub sentence_distance: i64,

    /// `(sentence_distance, phrase_distance)`, compared lexicographically
    pub distance: (i64, i64),

    pub is_appositive: bool,
}

/// An anaphor with its preceding candidates and their features
///
/// `tail` and `features` are parallel and ordered nearest candidate first.
#[derive(Debug, Clone)]
pub struct AnaphorCandidates<'a> {
    pub anaphor: &'a CorefMention,
    pub tail: Vec<&'a CorefMention>,
    pub features: Vec<FeatureVector>,
}

/// Lower-casing stemmer with a per-instance memo of every word it has seen
pub struct Lemmatizer {
    stemmer: Stemmer,
    cache: UnboundCache<String, String>,
}

impl Default for Lemmatizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lemmatizer {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
            cache: UnboundCache::new(),
        }
    }

    /// Base form of `word`
    pub fn lemma(&mut self, word: &str) -> String {
        let stemmer = &self.stemmer;
        let key = word.to_lowercase();
        self.cache
            .cache_get_or_set_with(key.clone(), || stemmer.stem(&key).into_owned())
            .clone()
    }

    /// Lemmas of the whitespace-delimited words of `phrase`
    pub fn lemmas(&mut self, phrase: &str) -> Vec<String> {
        phrase.split_whitespace().map(|word| self.lemma(word)).collect()
    }

    /// Number of memoized words
    #[must_use]
    pub fn cached_words(&self) -> usize {
        self.cache.cache_size()
    }
}

/// Builds feature vectors for every anaphor of a document
#[derive(Default)]
pub struct FeatureBuilder {
    lemmatizer: Lemmatizer,
}

impl FeatureBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair every anaphor with its strictly preceding mentions
    ///
    /// Anaphors come out most recent first. The first mention of a document
    /// has an empty tail and no features.
    pub fn build<'a>(&mut self, mentions: &'a [CorefMention]) -> Vec<AnaphorCandidates<'a>> {
        let mut ordered: Vec<&CorefMention> = mentions.iter().collect();
        ordered.sort_by(|a, b| b.position.cmp(&a.position));

        let mut out = Vec::new();
        for (i, &anaphor) in ordered.iter().enumerate() {
            if !anaphor.is_anaphor {
                continue;
            }

            let tail = ordered[i + 1..].to_vec();
            let features = tail
                .iter()
                .map(|candidate| self.features(anaphor, candidate))
                .collect();

            out.push(AnaphorCandidates {
                anaphor,
                tail,
                features,
            });
        }

        out
    }

    /// Features of a single pair
    pub fn features(&mut self, anaphor: &CorefMention, candidate: &CorefMention) -> FeatureVector {
        let sentence_distance = delta(anaphor.position.sentence, candidate.position.sentence);
        let phrase_distance = delta(anaphor.position.phrase, candidate.position.phrase);

        FeatureVector {
            anaphor_id: anaphor.id.clone(),
            candidate_id: candidate.id.clone(),
            word_match: self.word_match(anaphor, candidate),
            sentence_distance,
            distance: (sentence_distance, phrase_distance),
            is_appositive: is_appositive(candidate),
        }
    }

    fn word_match(&mut self, anaphor: &CorefMention, candidate: &CorefMention) -> bool {
        let candidate_lemmas = self.lemmatizer.lemmas(&candidate.text);
        self.lemmatizer
            .lemmas(&anaphor.text)
            .iter()
            .any(|lemma| candidate_lemmas.contains(lemma))
    }
}

/// Whether the candidate's sentence ends in a noun phrase containing a comma
#[must_use]
pub fn is_appositive(candidate: &CorefMention) -> bool {
    match candidate.sentence_context.last_chunk() {
        Some(node) if node.is_phrase(NOUN_PHRASE) => {
            node.leaves().iter().any(|token| token.word.contains(','))
        }
        _ => false,
    }
}

fn delta(a: usize, b: usize) -> i64 {
    if a >= b {
        i64::try_from(a - b).unwrap_or(i64::MAX)
    } else {
        -i64::try_from(b - a).unwrap_or(i64::MAX)
    }
}
