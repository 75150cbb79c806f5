//! Re-serialization of a resolved document
//!
//! Sentences are rebuilt from their chunk-tree leaves (words joined by single
//! spaces, one sentence per line), XML-escaped, converted back from inline
//! markers to annotation elements and wrapped in the root element. Resolved
//! anaphors then gain a `REF` attribute on their opening tag.

use std::sync::Arc;

use crate::annotate::ChunkTree;
use crate::markup::{encode, escape, open_tag, RootElement};
use crate::mention::untagged_phrase;
use crate::resolver::Resolution;

/// Leaves of every sentence, one sentence per line
#[must_use]
pub fn render_sentences(sentences: &[Arc<ChunkTree>]) -> String {
    sentences
        .iter()
        .map(|sentence| untagged_phrase(sentence.leaves()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Add `REF` to the opening tag of each resolved anaphor
///
/// Every identifier opens exactly one annotation, so only the first matching
/// tag is rewritten.
#[must_use]
pub fn inject_references(text: &str, resolutions: &[Resolution]) -> String {
    let mut text = text.to_string();
    for resolution in resolutions {
        let plain = open_tag(&resolution.anaphor_id, None);
        let referring = open_tag(&resolution.anaphor_id, Some(&resolution.antecedent_id));
        text = text.replacen(&plain, &referring, 1);
    }
    text
}

/// Final document text for a set of chunked sentences and resolutions
#[must_use]
pub fn serialize(sentences: &[Arc<ChunkTree>], resolutions: &[Resolution], root: &RootElement) -> String {
    let body = encode(&escape(&render_sentences(sentences)));
    inject_references(&root.wrap(&body), resolutions)
}
