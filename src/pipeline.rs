//! Per-document resolution pipeline
//!
//! ```text
//! raw text
//!    ↓ strip root element, decode annotations, unescape entities
//! decoded text
//!    ↓ no-break zones + sentence segmentation
//! sentences
//!    ↓ tokenize → tag → chunk → extract mentions   (per sentence)
//! mentions
//!    ↓ features + strategy
//! resolutions
//!    ↓ re-serialize
//! response text
//! ```

use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::annotate::{tag_sentence, tokenize_sentence, ChunkTree, LinguisticAnnotator, RuleBasedAnnotator};
use crate::error::{Error, Result};
use crate::markup::{decode, inline_annotations, unescape, RootElement};
use crate::mention::{extract_mentions, CorefMention, Gensym};
use crate::resolver::{Resolution, Resolver};
use crate::segment::{no_break_zones, segment, AbbreviationSet, Span};
use crate::serialize::serialize;
use crate::ResolverConfig;

/// An input document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Identifier, the input file name without its extension
    pub id: String,

    /// File contents as read
    pub raw_text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            raw_text: raw_text.into(),
        }
    }

    /// Identifier for a document read from `path`
    #[must_use]
    pub fn id_from_path(path: &Path) -> String {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Read a document from disk
    ///
    /// # Errors
    ///
    /// Returns an error naming `path` if it cannot be read
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw_text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::file(path, e))?;

        Ok(Self::new(Self::id_from_path(path), raw_text))
    }

    /// The text the pipeline segments: root stripped, annotations inline,
    /// entities unescaped
    #[must_use]
    pub fn decoded_text(&self, root: &RootElement) -> String {
        unescape(&decode(&root.strip(&self.raw_text)))
    }
}

/// Outcome of resolving one document
#[derive(Debug, Clone)]
pub struct ResolvedDocument {
    pub id: String,

    /// Response text, ready to be written
    pub text: String,

    /// Spans of the non-blank sentences over the decoded text
    pub sentences: Vec<Span>,

    pub mentions: Vec<CorefMention>,

    /// Resolutions, most recent anaphor first
    pub resolutions: Vec<Resolution>,
}

/// Resolves documents one at a time
///
/// Holds only read-only state, so one pipeline can serve many documents
/// concurrently; each run gets its own identifier generator.
pub struct CorefPipeline {
    annotator: Arc<dyn LinguisticAnnotator>,
    resolver: Resolver,
    root: RootElement,
}

impl CorefPipeline {
    /// Create a pipeline around a custom annotator
    ///
    /// # Errors
    ///
    /// Returns an error if the configured strategy or root element is invalid
    pub fn new(config: &ResolverConfig, annotator: Arc<dyn LinguisticAnnotator>) -> Result<Self> {
        Ok(Self {
            annotator,
            resolver: Resolver::new(config.strategy)?,
            root: RootElement::new(config.root_element.clone())?,
        })
    }

    /// Create a pipeline with the rule-based annotator and a frozen
    /// abbreviation set
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn with_abbreviations(config: &ResolverConfig, abbreviations: AbbreviationSet) -> Result<Self> {
        Self::new(config, Arc::new(RuleBasedAnnotator::new(Arc::new(abbreviations))))
    }

    /// Create a pipeline with the default and configured abbreviations only
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid
    pub fn from_config(config: &ResolverConfig) -> Result<Self> {
        Self::with_abbreviations(config, config.base_abbreviations())
    }

    /// Resolve one document
    ///
    /// # Errors
    ///
    /// Returns an error if the annotation service fails on any sentence
    pub fn resolve(&self, document: &Document) -> Result<ResolvedDocument> {
        let text = document.decoded_text(&self.root);
        let annotator = self.annotator.as_ref();

        let zones = no_break_zones(&text);
        let spans = segment(&text, &zones, annotator)?;

        let mut gensym = Gensym::with_reserved(
            inline_annotations(&text)
                .into_iter()
                .map(|annotation| annotation.id.to_string()),
        );

        let mut sentences: Vec<Arc<ChunkTree>> = Vec::new();
        let mut sentence_spans = Vec::new();
        let mut mentions = Vec::new();

        for span in spans {
            let sentence = span.slice(&text);
            if sentence.trim().is_empty() {
                continue;
            }

            let tokens = tokenize_sentence(annotator, sentence)?;
            let tagged = tag_sentence(annotator, &tokens)?;
            let tree = annotator.chunk(tagged)?;

            let (context, found) = extract_mentions(tree, sentences.len(), &mut gensym);
            debug!(
                document = %document.id,
                sentence = sentences.len(),
                mentions = found.len(),
                "chunked sentence"
            );

            sentences.push(context);
            sentence_spans.push(span);
            mentions.extend(found);
        }

        let resolutions = self.resolver.resolve(&mentions);
        let response = serialize(&sentences, &resolutions, &self.root);

        info!(
            document = %document.id,
            sentences = sentences.len(),
            mentions = mentions.len(),
            anaphors = mentions.iter().filter(|m| m.is_anaphor).count(),
            resolved = resolutions.len(),
            "resolved document"
        );

        Ok(ResolvedDocument {
            id: document.id.clone(),
            text: response,
            sentences: sentence_spans,
            mentions,
            resolutions,
        })
    }
}
