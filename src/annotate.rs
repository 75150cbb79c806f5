//! Linguistic annotation adapter
//!
//! Sentence boundary detection, word tokenization, part-of-speech tagging and
//! shallow chunking sit behind the [`LinguisticAnnotator`] trait. The pipeline
//! keeps the inline annotation markers away from the annotator: it cuts them
//! out before tokenizing and tagging, then puts them back with the reserved
//! `CRB`/`CRE` tags so the chunk grammar can see them.
//!
//! [`RuleBasedAnnotator`] is the built-in implementation:
//!
//! - Sentences: Unicode sentence boundaries (UAX #29), with boundaries after
//!   known abbreviations and single-letter initials suppressed
//! - Tokens: money, numbers, acronyms, words, single punctuation marks
//! - Tags: closed-class lexicon, suffix heuristics, capitalization
//! - Chunks: a four-rule noun-phrase grammar, rules applied in order
//!
//! ```text
//! NP: <CRB> <.*>+? <CRE>
//! NP: <DT|PRP$>? <JJ>* <NN.*>+
//! NP: <WP.*>
//! NP: <PRP.*>
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{Error, Result};
use crate::markup::{BEGIN_PREFIX, END_PREFIX};
use crate::segment::{AbbreviationSet, Span};

/// Tag reserved for an annotation's begin marker
pub const BEGIN_TAG: &str = "CRB";

/// Tag reserved for an annotation's end marker
pub const END_TAG: &str = "CRE";

/// Label of a noun-phrase chunk
pub const NOUN_PHRASE: &str = "NP";

static MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"coref_tag_(?:beg|end)_[A-Za-z0-9]+_").expect("marker pattern is valid")
});

static MONEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$[0-9]+(?:\.[0-9]+)?").expect("money pattern is valid"));

static WORD_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\$[0-9]+(?:[.,][0-9]+)*|[0-9]+(?:[.,:][0-9]+)*|(?:[A-Za-z]\.){2,}|[\p{L}\p{M}\p{N}]+(?:['’-][\p{L}\p{M}\p{N}]+)*|[^\s\p{L}\p{M}\p{N}]",
    )
    .expect("token pattern is valid")
});

/// A word with its part-of-speech tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaggedToken {
    pub word: String,
    pub tag: String,
}

impl TaggedToken {
    pub fn new(word: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            word: word.into(),
            tag: tag.into(),
        }
    }
}

/// A node of a shallow chunk tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkNode {
    /// A single tagged word
    Leaf(TaggedToken),

    /// A labelled chunk such as `NP`
    Phrase {
        label: String,
        children: Vec<ChunkNode>,
    },
}

impl ChunkNode {
    /// Whether this node is a phrase labelled `label`
    #[must_use]
    pub fn is_phrase(&self, label: &str) -> bool {
        matches!(self, ChunkNode::Phrase { label: l, .. } if l == label)
    }

    /// All leaves below this node, left to right
    #[must_use]
    pub fn leaves(&self) -> Vec<&TaggedToken> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, into: &mut Vec<&'a TaggedToken>) {
        match self {
            ChunkNode::Leaf(token) => into.push(token),
            ChunkNode::Phrase { children, .. } => {
                for child in children {
                    child.collect_leaves(into);
                }
            }
        }
    }
}

/// A chunked sentence: the children of its root node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkTree {
    pub children: Vec<ChunkNode>,
}

impl ChunkTree {
    #[must_use]
    pub fn new(children: Vec<ChunkNode>) -> Self {
        Self { children }
    }

    /// All leaves of the sentence, left to right
    #[must_use]
    pub fn leaves(&self) -> Vec<&TaggedToken> {
        let mut leaves = Vec::new();
        for child in &self.children {
            child.collect_leaves(&mut leaves);
        }
        leaves
    }

    /// The sentence's final top-level chunk
    #[must_use]
    pub fn last_chunk(&self) -> Option<&ChunkNode> {
        self.children.last()
    }
}

/// The external tokenizer, tagger and chunker the pipeline depends on
///
/// Implementations never see inline annotation markers in `tokenize` or
/// `pos_tag`; `chunk` receives them tagged [`BEGIN_TAG`] and [`END_TAG`].
pub trait LinguisticAnnotator: Send + Sync {
    /// Proposed sentence spans over `text`, in order
    ///
    /// # Errors
    ///
    /// Returns an error if the boundary detector fails
    fn sentence_spans(&self, text: &str) -> Result<Vec<Span>>;

    /// Split plain text into word tokens
    ///
    /// # Errors
    ///
    /// Returns an error if the tokenizer fails
    fn tokenize(&self, text: &str) -> Result<Vec<String>>;

    /// Tag each token; the result must have one entry per token
    ///
    /// # Errors
    ///
    /// Returns an error if the tagger fails or rejects its input
    fn pos_tag(&self, tokens: &[String]) -> Result<Vec<TaggedToken>>;

    /// Group a tagged sentence into a shallow chunk tree
    ///
    /// # Errors
    ///
    /// Returns an error if the chunker fails
    fn chunk(&self, tagged: Vec<TaggedToken>) -> Result<ChunkTree>;
}

/// Tokenize a decoded sentence, keeping every inline marker as one token
///
/// # Errors
///
/// Returns an error if the annotator's tokenizer fails
pub fn tokenize_sentence(annotator: &dyn LinguisticAnnotator, sentence: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut last = 0;

    for marker in MARKER.find_iter(sentence) {
        tokens.extend(annotator.tokenize(&sentence[last..marker.start()])?);
        tokens.push(marker.as_str().to_string());
        last = marker.end();
    }
    tokens.extend(annotator.tokenize(&sentence[last..])?);

    Ok(tokens)
}

/// Tag a token sequence, applying the reserved tags on top of the annotator's
///
/// Markers are tagged `CRB`/`CRE` without consulting the annotator, and money
/// amounts are always nouns.
///
/// # Errors
///
/// Returns an error if the tagger fails or returns the wrong number of tags
pub fn tag_sentence(annotator: &dyn LinguisticAnnotator, tokens: &[String]) -> Result<Vec<TaggedToken>> {
    let plain: Vec<String> = tokens
        .iter()
        .filter(|token| reserved_tag(token).is_none())
        .cloned()
        .collect();

    let tagged = annotator.pos_tag(&plain)?;
    if tagged.len() != plain.len() {
        return Err(Error::Annotation(format!(
            "tagger returned {} tags for {} tokens",
            tagged.len(),
            plain.len()
        )));
    }

    let mut tagged = tagged.into_iter();
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        if let Some(tag) = reserved_tag(token) {
            out.push(TaggedToken::new(token.clone(), tag));
            continue;
        }
        let Some(mut tagged_token) = tagged.next() else {
            break;
        };
        if MONEY.is_match(&tagged_token.word) {
            tagged_token.tag = "NN".to_string();
        }
        out.push(tagged_token);
    }

    Ok(out)
}

fn reserved_tag(token: &str) -> Option<&'static str> {
    if token.contains(BEGIN_PREFIX) {
        Some(BEGIN_TAG)
    } else if token.contains(END_PREFIX) {
        Some(END_TAG)
    } else {
        None
    }
}

/// Rule-based annotator built on Unicode segmentation and a small lexicon
#[derive(Debug, Clone, Default)]
pub struct RuleBasedAnnotator {
    abbreviations: Arc<AbbreviationSet>,
}

impl RuleBasedAnnotator {
    /// Create an annotator that treats `abbreviations` as non-terminal
    #[must_use]
    pub fn new(abbreviations: Arc<AbbreviationSet>) -> Self {
        Self { abbreviations }
    }

    fn ends_with_abbreviation(&self, sentence: &str) -> bool {
        let trimmed = sentence.trim_end();
        if !trimmed.ends_with('.') {
            return false;
        }

        let Some(last_word) = trimmed.split_whitespace().last() else {
            return false;
        };
        let last_word = last_word.trim_start_matches(|c: char| !c.is_alphanumeric());
        let stem = last_word.strip_suffix('.').unwrap_or(last_word);

        let is_initial = stem.chars().count() == 1 && stem.chars().all(char::is_alphabetic);
        is_initial || self.abbreviations.contains(stem)
    }

    fn tag_word(word: &str, sentence_initial: bool) -> &'static str {
        let lower = word.to_lowercase();

        if let Some(tag) = LEXICON.get(lower.as_str()) {
            let capitalized = word.chars().next().is_some_and(char::is_uppercase);
            if !capitalized || sentence_initial || lower == "i" {
                return tag;
            }
        }

        let first = word.chars().next();
        if first.is_some_and(|c| c.is_ascii_digit()) {
            return "CD";
        }
        if first.is_some_and(|c| !c.is_alphanumeric()) {
            return match word {
                "." | "!" | "?" => ".",
                "," => ",",
                ":" | ";" | "-" | "--" => ":",
                "$" => "$",
                "(" | "[" | "{" => "(",
                ")" | "]" | "}" => ")",
                _ => "SYM",
            };
        }
        if first.is_some_and(char::is_uppercase) {
            return "NNP";
        }

        suffix_tag(&lower)
    }
}

impl LinguisticAnnotator for RuleBasedAnnotator {
    fn sentence_spans(&self, text: &str) -> Result<Vec<Span>> {
        // A lower-case marker after a period would suppress the boundary;
        // upper-casing keeps byte offsets intact.
        let masked = MARKER.replace_all(text, |caps: &regex::Captures<'_>| caps[0].to_ascii_uppercase());

        let mut spans = Vec::new();
        let mut pending: Option<usize> = None;

        for (start, sentence) in masked.split_sentence_bound_indices() {
            let begin = pending.take().unwrap_or(start);
            let end = start + sentence.len();

            if end < text.len() && self.ends_with_abbreviation(sentence) {
                pending = Some(begin);
                continue;
            }
            spans.push(Span::new(begin, end));
        }

        if let Some(begin) = pending {
            spans.push(Span::new(begin, text.len()));
        }

        Ok(spans)
    }

    fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let mut tokens = Vec::new();
        let mut pos = 0;

        while let Some(m) = WORD_TOKEN.find_at(text, pos) {
            let token = m.as_str();
            pos = m.end();

            let is_word = token.chars().all(char::is_alphabetic);
            if is_word && text[pos..].starts_with('.') && self.abbreviations.contains(token) {
                tokens.push(format!("{token}."));
                pos += 1;
            } else {
                tokens.push(token.to_string());
            }
        }

        Ok(tokens)
    }

    fn pos_tag(&self, tokens: &[String]) -> Result<Vec<TaggedToken>> {
        Ok(tokens
            .iter()
            .enumerate()
            .map(|(i, token)| TaggedToken::new(token.clone(), Self::tag_word(token, i == 0)))
            .collect())
    }

    fn chunk(&self, tagged: Vec<TaggedToken>) -> Result<ChunkTree> {
        Ok(chunk_noun_phrases(tagged))
    }
}

fn suffix_tag(lower: &str) -> &'static str {
    let len = lower.chars().count();

    if len > 4 && lower.ends_with("ly") {
        "RB"
    } else if len > 4 && lower.ends_with("ing") {
        "VBG"
    } else if len > 3 && lower.ends_with("ed") {
        "VBD"
    } else if ["ous", "ful", "ive", "able", "ible", "less", "ic"]
        .iter()
        .any(|suffix| len > suffix.len() + 2 && lower.ends_with(suffix))
    {
        "JJ"
    } else if len > 3 && lower.ends_with('s') && !lower.ends_with("ss") {
        "NNS"
    } else {
        "NN"
    }
}

static LEXICON: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let groups: &[(&str, &[&str])] = &[
        (
            "DT",
            &[
                "the", "a", "an", "this", "that", "these", "those", "each", "every", "some", "any",
                "no", "all", "both", "another", "either", "neither",
            ],
        ),
        (
            "PRP",
            &[
                "i", "you", "he", "she", "it", "we", "they", "me", "him", "us", "them", "myself",
                "yourself", "himself", "herself", "itself", "ourselves", "themselves",
            ],
        ),
        ("PRP$", &["my", "your", "his", "her", "its", "our", "their"]),
        ("WP", &["who", "whom", "what"]),
        ("WP$", &["whose"]),
        ("WDT", &["which"]),
        (
            "IN",
            &[
                "of", "in", "on", "at", "by", "for", "with", "from", "about", "into", "over",
                "after", "before", "under", "between", "through", "during", "without", "within",
                "against", "among", "upon", "since", "until", "than", "as", "because", "if",
                "while", "although", "though", "per",
            ],
        ),
        ("TO", &["to"]),
        ("CC", &["and", "or", "but", "nor", "yet"]),
        (
            "MD",
            &["will", "would", "can", "could", "shall", "should", "may", "might", "must"],
        ),
        ("VBZ", &["is", "has", "does", "says", "goes"]),
        ("VBP", &["am", "are"]),
        ("VB", &["be", "have", "do", "say", "go", "get", "make", "take", "give", "see"]),
        ("VBN", &["been", "done", "gone", "known", "given", "taken", "seen"]),
        ("VBG", &["being", "having"]),
        (
            "VBD",
            &[
                "was", "were", "had", "did", "said", "told", "made", "went", "got", "took",
                "gave", "came", "saw", "knew", "thought", "left", "ran", "won", "lost", "sat",
                "stood", "held", "became", "began", "brought", "bought", "paid", "sold", "sent",
                "spent", "built", "met", "kept", "felt", "found", "led", "wrote", "spoke",
            ],
        ),
        (
            "RB",
            &[
                "not", "n't", "also", "very", "too", "just", "only", "still", "even", "never",
                "always", "often", "already", "soon", "now", "then", "here", "there", "again",
                "however", "yesterday", "today", "tomorrow", "so",
            ],
        ),
        (
            "JJ",
            &[
                "new", "old", "big", "small", "large", "good", "bad", "other", "former", "many",
                "several", "few", "such", "same", "own", "high", "low", "long", "great",
                "little", "public", "major", "local", "national", "chief", "senior",
            ],
        ),
        ("JJS", &["most", "first", "last"]),
        ("JJR", &["more"]),
        (
            "CD",
            &[
                "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
                "hundred", "thousand", "million", "billion",
            ],
        ),
    ];

    groups
        .iter()
        .flat_map(|(tag, words)| words.iter().map(move |word| (*word, *tag)))
        .collect()
});

/// A chunk rule: how many leading tokens of `tokens` it groups, if any
type ChunkRule = fn(&[TaggedToken]) -> Option<usize>;

const NOUN_PHRASE_RULES: [ChunkRule; 4] = [
    annotated_mention_rule,
    nominal_rule,
    wh_pronoun_rule,
    personal_pronoun_rule,
];

/// `<CRB> <.*>+? <CRE>`
fn annotated_mention_rule(tokens: &[TaggedToken]) -> Option<usize> {
    if tokens.first()?.tag != BEGIN_TAG {
        return None;
    }
    let close = tokens.iter().skip(1).position(|t| t.tag == END_TAG)? + 1;
    (close >= 2).then_some(close + 1)
}

/// `<DT|PRP$>? <JJ>* <NN.*>+`
fn nominal_rule(tokens: &[TaggedToken]) -> Option<usize> {
    let mut i = 0;
    if tokens
        .first()
        .is_some_and(|t| matches!(t.tag.as_str(), "DT" | "PRP$" | "PP$"))
    {
        i += 1;
    }
    while tokens.get(i).is_some_and(|t| t.tag == "JJ") {
        i += 1;
    }
    let nouns = tokens[i.min(tokens.len())..]
        .iter()
        .take_while(|t| t.tag.starts_with("NN"))
        .count();
    (nouns > 0).then_some(i + nouns)
}

/// `<WP.*>`
fn wh_pronoun_rule(tokens: &[TaggedToken]) -> Option<usize> {
    tokens.first()?.tag.starts_with("WP").then_some(1)
}

/// `<PRP.*>`
fn personal_pronoun_rule(tokens: &[TaggedToken]) -> Option<usize> {
    tokens.first()?.tag.starts_with("PRP").then_some(1)
}

/// Chunk a tagged sentence with the noun-phrase grammar
///
/// Each rule only groups leaves that no earlier rule has already claimed.
#[must_use]
pub fn chunk_noun_phrases(tagged: Vec<TaggedToken>) -> ChunkTree {
    let mut nodes: Vec<ChunkNode> = tagged.into_iter().map(ChunkNode::Leaf).collect();
    for rule in NOUN_PHRASE_RULES {
        nodes = apply_rule(nodes, rule);
    }
    ChunkTree::new(nodes)
}

fn apply_rule(nodes: Vec<ChunkNode>, rule: ChunkRule) -> Vec<ChunkNode> {
    let mut out = Vec::with_capacity(nodes.len());
    let mut run = Vec::new();

    for node in nodes {
        match node {
            ChunkNode::Leaf(token) => run.push(token),
            phrase @ ChunkNode::Phrase { .. } => {
                chunk_run(std::mem::take(&mut run), rule, &mut out);
                out.push(phrase);
            }
        }
    }
    chunk_run(run, rule, &mut out);

    out
}

fn chunk_run(run: Vec<TaggedToken>, rule: ChunkRule, out: &mut Vec<ChunkNode>) {
    let mut matches = Vec::new();
    let mut i = 0;
    while i < run.len() {
        match rule(&run[i..]) {
            Some(len) if len > 0 => {
                matches.push((i, i + len));
                i += len;
            }
            _ => i += 1,
        }
    }

    let mut tokens = run.into_iter();
    let mut pos = 0;
    for (start, end) in matches {
        out.extend(tokens.by_ref().take(start - pos).map(ChunkNode::Leaf));
        out.push(ChunkNode::Phrase {
            label: NOUN_PHRASE.to_string(),
            children: tokens.by_ref().take(end - start).map(ChunkNode::Leaf).collect(),
        });
        pos = end;
    }
    out.extend(tokens.map(ChunkNode::Leaf));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotator() -> RuleBasedAnnotator {
        RuleBasedAnnotator::new(Arc::new(AbbreviationSet::with_defaults()))
    }

    fn tagged(pairs: &[(&str, &str)]) -> Vec<TaggedToken> {
        pairs.iter().map(|(w, t)| TaggedToken::new(*w, *t)).collect()
    }

    fn phrase_words(tree: &ChunkTree) -> Vec<String> {
        tree.children
            .iter()
            .filter(|node| node.is_phrase(NOUN_PHRASE))
            .map(|node| {
                node.leaves()
                    .iter()
                    .map(|t| t.word.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }

    #[test]
    fn test_sentence_spans_cover_text() {
        let text = "The board met. It voted twice! Did it pass?";
        let spans = annotator().sentence_spans(text).unwrap();

        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].slice(text).trim_end(), "The board met.");
        assert_eq!(spans.last().map(|s| s.end), Some(text.len()));
    }

    #[test]
    fn test_sentence_spans_respect_abbreviations() {
        let text = "Mr. Smith met Dr. Jones. They talked.";
        let spans = annotator().sentence_spans(text).unwrap();

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].slice(text).trim_end(), "Mr. Smith met Dr. Jones.");
    }

    #[test]
    fn test_sentence_spans_before_marker() {
        let text = "The board met. coref_tag_beg_A1_ It coref_tag_end_A1_ voted.";
        let spans = annotator().sentence_spans(text).unwrap();

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].slice(text), "coref_tag_beg_A1_ It coref_tag_end_A1_ voted.");
    }

    #[test]
    fn test_tokenize() {
        let tokens = annotator()
            .tokenize("Mr. Smith paid $1.5 million, didn't he?")
            .unwrap();
        assert_eq!(
            tokens,
            vec!["Mr.", "Smith", "paid", "$1.5", "million", ",", "didn't", "he", "?"]
        );
    }

    #[test]
    fn test_tokenize_keeps_combining_marks() {
        let tokens = annotator().tokenize("e\u{301}te\u{301} cafe\u{301}.").unwrap();
        assert_eq!(tokens, vec!["e\u{301}te\u{301}", "cafe\u{301}", "."]);
    }

    #[test]
    fn test_sentence_spans_after_common_word() {
        let text = "The answer was no. The board left.";
        let spans = annotator().sentence_spans(text).unwrap();

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].slice(text), "The board left.");
    }

    #[test]
    fn test_tokenize_sentence_isolates_markers() {
        let tokens =
            tokenize_sentence(&annotator(), "saidcoref_tag_beg_A2_ he coref_tag_end_A2_.").unwrap();
        assert_eq!(
            tokens,
            vec!["said", "coref_tag_beg_A2_", "he", "coref_tag_end_A2_", "."]
        );
    }

    #[test]
    fn test_tag_sentence_reserved_tags() {
        let tokens: Vec<String> = ["coref_tag_beg_A1_", "the", "dog", "coref_tag_end_A1_", "cost", "$5"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let tags: Vec<String> = tag_sentence(&annotator(), &tokens)
            .unwrap()
            .into_iter()
            .map(|t| t.tag)
            .collect();

        assert_eq!(tags, vec!["CRB", "DT", "NN", "CRE", "NN", "NN"]);
    }

    #[test]
    fn test_tagger_capitalization_and_lexicon() {
        let tokens: Vec<String> = ["The", "committee", "and", "Smith", "voted", "quickly"]
            .iter()
            .map(ToString::to_string)
            .collect();
        let tags: Vec<String> = annotator()
            .pos_tag(&tokens)
            .unwrap()
            .into_iter()
            .map(|t| t.tag)
            .collect();

        assert_eq!(tags, vec!["DT", "NN", "CC", "NNP", "VBD", "RB"]);
    }

    #[test]
    fn test_chunk_grammar() {
        let tree = chunk_noun_phrases(tagged(&[
            ("coref_tag_beg_A1_", "CRB"),
            ("John", "NNP"),
            ("Smith", "NNP"),
            ("coref_tag_end_A1_", "CRE"),
            ("met", "VBD"),
            ("the", "DT"),
            ("big", "JJ"),
            ("board", "NN"),
            ("who", "WP"),
            ("saw", "VBD"),
            ("him", "PRP"),
            (".", "."),
        ]));

        assert_eq!(
            phrase_words(&tree),
            vec![
                "coref_tag_beg_A1_ John Smith coref_tag_end_A1_",
                "the big board",
                "who",
                "him"
            ]
        );
        assert_eq!(tree.leaves().len(), 12);
    }

    #[test]
    fn test_possessive_groups_with_noun() {
        let tree = chunk_noun_phrases(tagged(&[("his", "PRP$"), ("car", "NN"), ("her", "PRP$")]));
        assert_eq!(phrase_words(&tree), vec!["his car", "her"]);
    }

    #[test]
    fn test_determiner_without_noun_is_not_chunked() {
        let tree = chunk_noun_phrases(tagged(&[("the", "DT"), ("quickly", "RB")]));
        assert!(phrase_words(&tree).is_empty());
    }

    #[test]
    fn test_empty_annotation_is_not_chunked() {
        let tree = chunk_noun_phrases(tagged(&[
            ("coref_tag_beg_A1_", "CRB"),
            ("coref_tag_end_A1_", "CRE"),
        ]));
        assert!(phrase_words(&tree).is_empty());
    }

    #[test]
    fn test_last_chunk() {
        let tree = chunk_noun_phrases(tagged(&[("ran", "VBD"), ("Smith", "NNP")]));
        assert!(tree.last_chunk().is_some_and(|node| node.is_phrase(NOUN_PHRASE)));
    }
}
