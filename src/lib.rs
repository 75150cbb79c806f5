//! # Markup Coreference Library
//!
//! Resolves noun-phrase coreference in SGML-style annotated text. Input
//! documents mark phrases with `<COREF ID="...">...</COREF>`; the pipeline
//! finds further noun phrases, picks an antecedent for each annotated
//! phrase and writes the document back with a `REF` attribute on every
//! resolved annotation.
//!
//! ## Features
//!
//! - Marker-Safe Segmentation: sentence boundaries never split an annotation
//! - Pluggable Annotation: tokenizer, tagger and chunker sit behind a trait
//! - Pluggable Strategies: antecedent selection sits behind a trait
//! - Concurrent Batches: documents resolve independently on a bounded pool
//! - Environment Variable Support: Load configuration from .env files
//!
//! ## Example
//!
//! ```rust,no_run
//! use markup_coref::{CorefPipeline, Document, ResolverConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ResolverConfig::from_env()?;
//!     let pipeline = CorefPipeline::from_config(&config)?;
//!
//!     let document = Document::new(
//!         "d1",
//!         r#"<TXT><COREF ID="A1">The committee</COREF> met. <COREF ID="A2">The committee</COREF> voted.</TXT>"#,
//!     );
//!     let resolved = pipeline.resolve(&document)?;
//!     print!("{}", resolved.text);
//!
//!     Ok(())
//! }
//! ```

use std::env;

pub mod annotate;
pub mod batch;
pub mod error;
pub mod features;
pub mod markup;
pub mod mention;
pub mod pipeline;
pub mod resolver;
pub mod segment;
pub mod serialize;

pub use annotate::{ChunkNode, ChunkTree, LinguisticAnnotator, RuleBasedAnnotator, TaggedToken};
pub use batch::{BatchFailure, BatchReport, BatchResolver};
pub use error::{Error, Result};
pub use features::{AnaphorCandidates, FeatureBuilder, FeatureVector};
pub use markup::{decode, encode, RootElement};
pub use mention::{CorefMention, Gensym, Position};
pub use pipeline::{CorefPipeline, Document, ResolvedDocument};
pub use resolver::{NearestLexicalMatch, Resolution, ResolutionStrategy, Resolver, StrategyKind};
pub use segment::{AbbreviationSet, Span};

/// Initialize the library by loading .env file
///
/// # Errors
///
/// Returns an error if the .env file exists but cannot be read or parsed
pub fn init() -> Result<()> {
    dotenvy::dotenv().ok(); // Ignore if .env doesn't exist
    Ok(())
}

/// Configuration for coreference resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Antecedent selection strategy (default: nearest lexical match)
    pub strategy: StrategyKind,

    /// Abbreviations added to the built-in list before learning from documents
    pub extra_abbreviations: Vec<String>,

    /// Root element wrapping every document (default: "TXT")
    pub root_element: String,

    /// Extension of the files a batch writes (default: "response")
    pub response_extension: String,

    /// Maximum number of documents resolved at once
    pub max_concurrency: usize,
}

fn default_concurrency() -> usize {
    std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get)
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            extra_abbreviations: Vec::new(),
            root_element: "TXT".to_string(),
            response_extension: "response".to_string(),
            max_concurrency: default_concurrency(),
        }
    }
}

impl ResolverConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables
    ///
    /// Automatically loads .env file if present. Supports these variables:
    /// - `COREF_STRATEGY`: "nearest-lexical", "hobbs" or "centering" (default: "nearest-lexical")
    /// - `COREF_ABBREVIATIONS`: Comma-separated extra abbreviations
    /// - `COREF_ROOT_ELEMENT`: Document root element (default: "TXT")
    /// - `COREF_RESPONSE_EXTENSION`: Output file extension (default: "response")
    /// - `COREF_MAX_CONCURRENCY`: Documents resolved at once (default: available cores)
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set to an invalid value
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let strategy = match env::var("COREF_STRATEGY") {
            Ok(value) => value.parse::<StrategyKind>()?,
            Err(_) => StrategyKind::default(),
        };

        let extra_abbreviations = env::var("COREF_ABBREVIATIONS").map_or_else(
            |_| Vec::new(),
            |v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            },
        );

        let root_element = env::var("COREF_ROOT_ELEMENT").unwrap_or_else(|_| "TXT".to_string());
        if root_element.trim().is_empty() {
            return Err(Error::Config(
                "COREF_ROOT_ELEMENT must not be empty".to_string(),
            ));
        }

        let response_extension =
            env::var("COREF_RESPONSE_EXTENSION").unwrap_or_else(|_| "response".to_string());

        let max_concurrency = match env::var("COREF_MAX_CONCURRENCY") {
            Ok(value) => match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(Error::Config(format!(
                        "COREF_MAX_CONCURRENCY must be a positive integer, got `{value}`"
                    )))
                }
            },
            Err(_) => default_concurrency(),
        };

        Ok(Self {
            strategy,
            extra_abbreviations,
            root_element,
            response_extension,
            max_concurrency,
        })
    }

    /// Set the resolution strategy
    #[must_use]
    pub const fn with_strategy(mut self, strategy: StrategyKind) -> Self {
        self.strategy = strategy;
        self
    }

    /// Add an abbreviation that must not end a sentence
    #[must_use]
    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        self.extra_abbreviations.push(abbreviation.into());
        self
    }

    /// Set the document root element
    #[must_use]
    pub fn with_root_element(mut self, root_element: impl Into<String>) -> Self {
        self.root_element = root_element.into();
        self
    }

    /// Set the output file extension
    #[must_use]
    pub fn with_response_extension(mut self, extension: impl Into<String>) -> Self {
        self.response_extension = extension.into();
        self
    }

    /// Set how many documents are resolved at once (at least one)
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }

    /// Built-in abbreviations plus the configured extras
    #[must_use]
    pub fn base_abbreviations(&self) -> AbbreviationSet {
        let mut set = AbbreviationSet::with_defaults();
        set.extend(self.extra_abbreviations.iter().map(String::as_str));
        set
    }
}
