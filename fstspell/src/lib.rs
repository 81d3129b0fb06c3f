/*! Spelling correction with weighted finite-state machines.

A lexicon is compiled into a minimal [`Automaton`](automaton::Automaton),
edit costs are learned from pairs of misspellings and their corrections
with an [`EditCostEstimator`](align::EditCostEstimator), and the two are
composed into a [`Transducer`](transducer::Transducer) that maps a typed
word to ranked lexicon words.

# Usage examples

```
use fstspell::align::{EditCostEstimator, EstimatorConfig, TrainingPair};
use fstspell::speller::{FstSpeller, Speller, SpellerConfig};

let pairs = vec![TrainingPair::new("wark", "work"), TrainingPair::new("fark", "fork")];
let estimate = EditCostEstimator::new(&pairs, EstimatorConfig::default())
    .estimate()
    .unwrap();

let speller = FstSpeller::from_words(
    &["work", "works", "forks"],
    &estimate.table,
    SpellerConfig::default(),
)
.unwrap();

let suggestions = speller.suggest("wark");
assert_eq!(suggestions[0].value(), "work");
```

The command line front end in `fstspell-bin` trains, checks and suggests
from files; `accuracy` measures suggestion quality over a test corpus.
*/

pub mod align;
pub mod automaton;
pub mod dot;
pub mod io;
pub mod speller;
pub mod transducer;
pub mod types;

/// Routes the library's `log` output through `env_logger` (`RUST_LOG`) for
/// embedders that do not install a logger of their own. Calling it twice
/// is harmless.
#[cfg(feature = "logging")]
pub fn enable_logging() {
    let _ = env_logger::try_init();
}
