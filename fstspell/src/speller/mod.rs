//! Spelling correction over a lexicon and a learned error model.
//!
//! [`FstSpeller`] minimizes the lexicon, composes it with the error model
//! built from a trained [`CostTable`] and inverts the result, so that
//! transducing a typed word yields lexicon words ranked by the weight of
//! the edits that turn them into it.
use std::sync::Arc;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::align::CostTable;
use crate::automaton::Automaton;
use crate::transducer::{compose, Transducer};
use crate::types::{Symbol, Weight};

pub use self::error::SpellerError;
pub use self::error_model::error_model;
pub use self::suggestion::Suggestion;

mod error;
mod error_model;
pub mod suggestion;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpellerConfig {
    /// keep at most this many suggestions
    pub n_best: Option<usize>,
    /// drop search paths heavier than this
    pub max_weight: Option<Weight>,
    /// Lidstone constant used when turning counts into arc weights
    pub smoothing: f64,
}

impl SpellerConfig {
    pub const fn default() -> SpellerConfig {
        SpellerConfig {
            n_best: Some(10),
            max_weight: None,
            smoothing: 1.0,
        }
    }
}

impl Default for SpellerConfig {
    fn default() -> Self {
        SpellerConfig::default()
    }
}

pub trait Speller {
    fn is_correct(self: Arc<Self>, word: &str) -> bool;
    fn suggest(self: Arc<Self>, word: &str) -> Vec<Suggestion>;
    fn suggest_with_config(self: Arc<Self>, word: &str, config: &SpellerConfig) -> Vec<Suggestion>;
}

#[derive(Debug)]
pub struct FstSpeller {
    lexicon: Automaton,
    error_model: Transducer,
    corrector: Transducer,
    config: SpellerConfig,
}

impl FstSpeller {
    /// Builds the correction machine. `config.smoothing` is baked into the
    /// error model weights here; the other fields are search defaults.
    ///
    /// Queries are lower-cased, so the lexicon is folded the same way first.
    pub fn new(
        lexicon: Automaton,
        table: &CostTable,
        config: SpellerConfig,
    ) -> Result<Arc<FstSpeller>, SpellerError> {
        let mut lexicon = if lexicon.alphabet().iter().any(|c| c.is_uppercase()) {
            lexicon.to_lowercase()?
        } else {
            lexicon
        };
        lexicon.minimize()?;

        let unknown: String = lexicon
            .alphabet()
            .into_iter()
            .filter(|&c| !table.contains(Symbol::Char(c)))
            .collect();
        if !unknown.is_empty() {
            log::warn!(
                "lexicon symbols {:?} are missing from the cost table; words using them are never suggested",
                unknown
            );
        }
        log::debug!(
            "lexicon: {} states, {} transitions",
            lexicon.state_count(),
            lexicon.transition_count()
        );

        let error_model = error_model(table, config.smoothing)?;
        let mut corrector = compose(&Transducer::from_automaton(&lexicon), &error_model)?;
        corrector.invert_in_place();

        log::debug!(
            "corrector: {} states, {} transitions",
            corrector.state_count(),
            corrector.transition_count()
        );

        Ok(Arc::new(FstSpeller {
            lexicon,
            error_model,
            corrector,
            config,
        }))
    }

    pub fn from_words<I, S>(
        words: I,
        table: &CostTable,
        config: SpellerConfig,
    ) -> Result<Arc<FstSpeller>, SpellerError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        FstSpeller::new(Automaton::from_words(words), table, config)
    }

    pub fn lexicon(&self) -> &Automaton {
        &self.lexicon
    }

    pub fn error_model(&self) -> &Transducer {
        &self.error_model
    }

    /// The inverted `lexicon ∘ error model`, reading typed strings.
    pub fn corrector(&self) -> &Transducer {
        &self.corrector
    }

    pub fn config(&self) -> &SpellerConfig {
        &self.config
    }
}

impl Speller for FstSpeller {
    fn is_correct(self: Arc<Self>, word: &str) -> bool {
        self.lexicon.recognize(&word.to_lowercase())
    }

    #[inline]
    fn suggest(self: Arc<Self>, word: &str) -> Vec<Suggestion> {
        let config = self.config.clone();
        self.suggest_with_config(word, &config)
    }

    fn suggest_with_config(self: Arc<Self>, word: &str, config: &SpellerConfig) -> Vec<Suggestion> {
        if word.is_empty() {
            return vec![];
        }

        let word = word.to_lowercase();
        let mut best: HashMap<SmolStr, Weight> = HashMap::new();

        // Results arrive lightest first, so the first weight seen for a
        // candidate is its best one.
        for t in self
            .corrector
            .transduce(&word)
            .with_max_weight(config.max_weight)
        {
            best.entry(t.output).or_insert(t.weight);

            if let Some(n_best) = config.n_best {
                if best.len() >= n_best {
                    break;
                }
            }
        }

        let mut out = best
            .into_iter()
            .map(|(value, weight)| Suggestion { value, weight })
            .collect::<Vec<_>>();
        out.sort();
        if let Some(n_best) = config.n_best {
            out.truncate(n_best);
        }

        log::trace!("{} suggestions for {:?}", out.len(), word);
        out
    }
}
