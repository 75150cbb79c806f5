//! Noun-phrase extraction
//!
//! Every noun-phrase chunk of a sentence becomes a [`CorefMention`]. Chunks
//! that start with a begin marker were annotated in the input and are
//! anaphors awaiting resolution; every other chunk is a freshly discovered
//! candidate, which gets a new identifier and is wrapped in marker leaves so
//! it is serialized as an annotation too.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::annotate::{ChunkNode, ChunkTree, TaggedToken, BEGIN_TAG, END_TAG, NOUN_PHRASE};
use crate::markup::{begin_marker, begin_marker_id, end_marker, is_end_marker};

/// Sentence-relative ordering key of a mention
///
/// Ordered by sentence first, then by phrase within the sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub sentence: usize,
    pub phrase: usize,
}

impl Position {
    #[must_use]
    pub const fn new(sentence: usize, phrase: usize) -> Self {
        Self { sentence, phrase }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.sentence, self.phrase)
    }
}

/// Fresh identifier source: `X1`, `X2`, ...
///
/// One instance per document; never share one between documents processed
/// at the same time.
#[derive(Debug, Clone, Default)]
pub struct Gensym {
    counter: usize,
    reserved: HashSet<String>,
}

impl Gensym {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A generator that never yields one of `reserved`
    #[must_use]
    pub fn with_reserved(reserved: impl IntoIterator<Item = String>) -> Self {
        Self {
            counter: 0,
            reserved: reserved.into_iter().collect(),
        }
    }

    /// Next unused identifier
    pub fn next_id(&mut self) -> String {
        loop {
            self.counter += 1;
            let id = format!("X{}", self.counter);
            if !self.reserved.contains(&id) {
                return id;
            }
        }
    }

    /// Start again from `X1`
    pub fn reset(&mut self) {
        self.counter = 0;
    }
}

/// One noun-phrase mention of a document
#[derive(Debug, Clone)]
pub struct CorefMention {
    /// Identifier, unique within the document
    pub id: String,

    /// Surface text, markers stripped, words joined by single spaces
    pub text: String,

    /// Tagged words of the phrase, markers excluded
    pub tagged_tokens: Vec<TaggedToken>,

    /// Whether the input already annotated this phrase
    pub is_anaphor: bool,

    pub position: Position,

    /// Chunk tree of the containing sentence, markers included
    pub sentence_context: Arc<ChunkTree>,
}

/// Extract the mentions of one chunked sentence
///
/// Unannotated noun phrases are wrapped in fresh marker leaves inside `tree`
/// before it is frozen into the shared sentence context, which is returned
/// alongside the mentions.
pub fn extract_mentions(
    mut tree: ChunkTree,
    sentence_index: usize,
    gensym: &mut Gensym,
) -> (Arc<ChunkTree>, Vec<CorefMention>) {
    struct Found {
        id: String,
        is_anaphor: bool,
        tokens: Vec<TaggedToken>,
    }

    let mut found = Vec::new();

    for node in &mut tree.children {
        let ChunkNode::Phrase { label, children } = node else {
            continue;
        };
        if label.as_str() != NOUN_PHRASE {
            continue;
        }

        let annotated_id = match children.first() {
            Some(ChunkNode::Leaf(first)) if first.tag == BEGIN_TAG => {
                begin_marker_id(&first.word).map(str::to_string)
            }
            _ => None,
        };

        let is_anaphor = annotated_id.is_some();
        let id = match annotated_id {
            Some(id) => id,
            None => {
                let id = gensym.next_id();
                children.insert(0, ChunkNode::Leaf(TaggedToken::new(begin_marker(&id), BEGIN_TAG)));
                children.push(ChunkNode::Leaf(TaggedToken::new(end_marker(&id), END_TAG)));
                id
            }
        };

        let tokens = node
            .leaves()
            .into_iter()
            .filter(|token| begin_marker_id(&token.word).is_none() && !is_end_marker(&token.word))
            .cloned()
            .collect();

        found.push(Found {
            id,
            is_anaphor,
            tokens,
        });
    }

    let context = Arc::new(tree);
    let mentions = found
        .into_iter()
        .enumerate()
        .map(|(phrase_index, found)| CorefMention {
            text: untagged_phrase(&found.tokens),
            id: found.id,
            tagged_tokens: found.tokens,
            is_anaphor: found.is_anaphor,
            position: Position::new(sentence_index, phrase_index),
            sentence_context: Arc::clone(&context),
        })
        .collect();

    (context, mentions)
}

/// Words of `tokens` joined by single spaces
#[must_use]
pub fn untagged_phrase<'a>(tokens: impl IntoIterator<Item = &'a TaggedToken>) -> String {
    tokens
        .into_iter()
        .map(|token| token.word.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::chunk_noun_phrases;

    fn tree(pairs: &[(&str, &str)]) -> ChunkTree {
        chunk_noun_phrases(pairs.iter().map(|(w, t)| TaggedToken::new(*w, *t)).collect())
    }

    #[test]
    fn test_gensym_sequence_and_reset() {
        let mut gensym = Gensym::new();
        assert_eq!(gensym.next_id(), "X1");
        assert_eq!(gensym.next_id(), "X2");
        gensym.reset();
        assert_eq!(gensym.next_id(), "X1");
    }

    #[test]
    fn test_gensym_skips_reserved() {
        let mut gensym = Gensym::with_reserved(["X1".to_string(), "X3".to_string()]);
        assert_eq!(gensym.next_id(), "X2");
        assert_eq!(gensym.next_id(), "X4");
    }

    #[test]
    fn test_position_ordering() {
        assert!(Position::new(0, 5) < Position::new(1, 0));
        assert!(Position::new(2, 1) < Position::new(2, 3));
        assert_eq!(Position::new(1, 2).to_string(), "(1, 2)");
    }

    #[test]
    fn test_extract_anaphor_and_fresh_mention() {
        let sentence = tree(&[
            ("coref_tag_beg_A1_", "CRB"),
            ("the", "DT"),
            ("committee", "NN"),
            ("coref_tag_end_A1_", "CRE"),
            ("approved", "VBD"),
            ("the", "DT"),
            ("budget", "NN"),
            (".", "."),
        ]);

        let mut gensym = Gensym::new();
        let (context, mentions) = extract_mentions(sentence, 3, &mut gensym);

        assert_eq!(mentions.len(), 2);

        assert_eq!(mentions[0].id, "A1");
        assert!(mentions[0].is_anaphor);
        assert_eq!(mentions[0].text, "the committee");
        assert_eq!(mentions[0].position, Position::new(3, 0));

        assert_eq!(mentions[1].id, "X1");
        assert!(!mentions[1].is_anaphor);
        assert_eq!(mentions[1].text, "the budget");
        assert_eq!(mentions[1].tagged_tokens.len(), 2);
        assert_eq!(mentions[1].position, Position::new(3, 1));

        let words = untagged_phrase(context.leaves());
        assert_eq!(
            words,
            "coref_tag_beg_A1_ the committee coref_tag_end_A1_ approved \
             coref_tag_beg_X1_ the budget coref_tag_end_X1_ ."
        );
        assert!(Arc::ptr_eq(&context, &mentions[1].sentence_context));
    }

    #[test]
    fn test_sentence_without_phrases() {
        let mut gensym = Gensym::new();
        let (context, mentions) = extract_mentions(tree(&[("ran", "VBD"), (".", ".")]), 0, &mut gensym);

        assert!(mentions.is_empty());
        assert_eq!(context.leaves().len(), 2);
        assert_eq!(gensym.next_id(), "X1");
    }
}
