//! Error types for building a speller.

use crate::align::AlignError;
use crate::automaton::AutomatonError;
use crate::io::ReadError;
use crate::transducer::TransducerError;

/// Errors that can occur while assembling a speller from its parts.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum SpellerError {
    /// Error model could not be weighted from the cost table
    #[error("Cost table error")]
    Align(#[from] AlignError),

    /// Lexicon could not be minimized
    #[error("Lexicon error")]
    Automaton(#[from] AutomatonError),

    /// Lexicon and error model could not be composed
    #[error("Composition error")]
    Transducer(#[from] TransducerError),

    /// Lexicon or cost table could not be read
    #[error("Read error")]
    Read(#[from] ReadError),
}
