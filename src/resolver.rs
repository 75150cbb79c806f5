//! Antecedent selection
//!
//! The [`Resolver`] builds pairwise features for a document's mentions and
//! hands each anaphor's candidates to a [`ResolutionStrategy`]. The only
//! implemented strategy is [`NearestLexicalMatch`]:
//!
//! 1. Keep candidates sharing at least one lemma with the anaphor
//! 2. Pick the one with the smallest `(sentence, phrase)` distance
//! 3. On a tie, keep the first one seen (candidates arrive nearest first)
//!
//! Anaphors without a qualifying candidate stay unresolved.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::features::{AnaphorCandidates, FeatureBuilder};
use crate::mention::CorefMention;

/// A resolved anaphor and the mention it refers to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resolution {
    pub anaphor_id: String,
    pub antecedent_id: String,
}

/// Available resolution strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrategyKind {
    /// Nearest candidate sharing a lemma with the anaphor
    #[default]
    NearestLexical,

    /// Hobbs tree-distance search (not implemented)
    Hobbs,

    /// Centering-theory transition ranking (not implemented)
    Centering,
}

impl FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "nearest-lexical" | "nearest_lexical" | "lexical" => Ok(StrategyKind::NearestLexical),
            "hobbs" => Ok(StrategyKind::Hobbs),
            "centering" => Ok(StrategyKind::Centering),
            other => Err(Error::Config(format!("unknown resolution strategy `{other}`"))),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StrategyKind::NearestLexical => "nearest-lexical",
            StrategyKind::Hobbs => "hobbs",
            StrategyKind::Centering => "centering",
        })
    }
}

/// Chooses an antecedent for one anaphor
pub trait ResolutionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Index into `candidates.tail` of the chosen antecedent, if any
    fn select(&self, candidates: &AnaphorCandidates<'_>) -> Option<usize>;
}

/// Nearest candidate with a shared lemma
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestLexicalMatch;

impl ResolutionStrategy for NearestLexicalMatch {
    fn name(&self) -> &'static str {
        "nearest-lexical"
    }

    fn select(&self, candidates: &AnaphorCandidates<'_>) -> Option<usize> {
        candidates
            .features
            .iter()
            .enumerate()
            .filter(|(_, features)| features.word_match)
            .min_by_key(|(_, features)| features.distance)
            .map(|(index, _)| index)
    }
}

/// Resolves every anaphor of a document
pub struct Resolver {
    strategy: Box<dyn ResolutionStrategy>,
}

impl Resolver {
    /// Create a resolver for a strategy kind
    ///
    /// # Errors
    ///
    /// Returns an error for strategies that are not implemented
    pub fn new(kind: StrategyKind) -> Result<Self> {
        let strategy: Box<dyn ResolutionStrategy> = match kind {
            StrategyKind::NearestLexical => Box::new(NearestLexicalMatch),
            StrategyKind::Hobbs | StrategyKind::Centering => {
                return Err(Error::Config(format!(
                    "{kind} resolution strategy not yet implemented"
                )));
            }
        };

        Ok(Self { strategy })
    }

    /// Create a resolver around a custom strategy
    #[must_use]
    pub fn with_strategy(strategy: Box<dyn ResolutionStrategy>) -> Self {
        Self { strategy }
    }

    #[must_use]
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Resolve the anaphors among `mentions`, most recent anaphor first
    #[must_use]
    pub fn resolve(&self, mentions: &[CorefMention]) -> Vec<Resolution> {
        let mut builder = FeatureBuilder::new();
        let mut resolutions = Vec::new();

        for candidates in builder.build(mentions) {
            if candidates.tail.is_empty() {
                continue;
            }

            let anaphor = candidates.anaphor;
            let Some(index) = self.strategy.select(&candidates) else {
                debug!(anaphor = %anaphor.id, "no qualifying antecedent");
                continue;
            };

            let Some(antecedent) = candidates.tail.get(index) else {
                warn!(
                    strategy = self.strategy.name(),
                    index, "strategy selected a candidate outside the tail"
                );
                continue;
            };

            if antecedent.position >= anaphor.position || antecedent.id == anaphor.id {
                warn!(
                    strategy = self.strategy.name(),
                    anaphor = %anaphor.id,
                    antecedent = %antecedent.id,
                    "discarding antecedent that does not precede its anaphor"
                );
                continue;
            }

            resolutions.push(Resolution {
                anaphor_id: anaphor.id.clone(),
                antecedent_id: antecedent.id.clone(),
            });
        }

        resolutions
    }
}
