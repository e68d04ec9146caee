// Failure taxonomy for the melody pipeline.
//
// Every failure here marks a contract violation (bad input or a misbehaving
// collaborator), not a transient condition, so nothing is retried internally.
// Callers that want to degrade gracefully (e.g. skip an unencodable song)
// do so above this boundary.

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A token is not present in the vocabulary.
    #[error("unknown symbol: {0:?}")]
    UnknownSymbol(crate::token::Token),

    /// An id is outside the vocabulary's range.
    #[error("unknown id: {0}")]
    UnknownId(usize),

    /// An event duration is zero or not an exact multiple of the timestep.
    #[error("duration {quarter_length} is not a positive multiple of timestep {time_step}")]
    InvalidDuration { quarter_length: f64, time_step: f64 },

    /// Sampling temperature must be strictly positive.
    #[error("invalid temperature: {0} (must be > 0)")]
    InvalidTemperature(f64),

    /// The predictor returned a distribution that doesn't cover the vocabulary.
    #[error("predictor returned {got} probabilities, vocabulary has {expected}")]
    PredictorContractViolation { expected: usize, got: usize },

    /// A vocabulary cannot be built from an empty corpus.
    #[error("empty corpus")]
    EmptyCorpus,

    /// Corpus text contains a string that isn't a token.
    #[error("bad token in corpus text: {0:?}")]
    BadToken(String),

    /// I/O error from persistence.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error from vocabulary/model persistence.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
}
