use thiserror::Error;

/// Error types shared by every Wordlink crate.
///
/// None of these are fatal to the process: lookups that miss return
/// `NotFound`/`NoBaseform`, exhausted searches return `NoPairFound`, and
/// transport failures surface as `FetchFailed` so the caller can retry.
#[derive(Debug, Error)]
pub enum WordlinkError {
    /// Shard or word absent from the embedding store.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Word has no entry in the baseform index (not a playable word).
    #[error("No baseform for word: {0}")]
    NoBaseform(String),

    /// Zero-magnitude vector or NaN similarity.
    #[error("Degenerate vector: {0}")]
    DegenerateVector(String),

    /// Two vectors of different lengths were compared.
    #[error("Dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },

    /// Pair search exhausted its attempt budget.
    #[error("No word pair found after {0} attempts")]
    NoPairFound(usize),

    /// I/O or network failure loading a shard or static resource.
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    /// Payload could not be decoded (bad JSON, bad base64, bad record length).
    #[error("Malformed data: {0}")]
    MalformedData(String),

    /// Candidate word is not close enough to its predecessor.
    #[error("Word \"{word}\" rejected: not related enough to \"{previous}\"")]
    RejectedWord { word: String, previous: String },

    /// Operation not permitted in the current game/cache state.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid configuration value.
    #[error("Config error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for WordlinkError {
    fn from(e: serde_json::Error) -> Self {
        WordlinkError::MalformedData(e.to_string())
    }
}

impl From<base64::DecodeError> for WordlinkError {
    fn from(e: base64::DecodeError) -> Self {
        WordlinkError::MalformedData(format!("base64: {}", e))
    }
}

impl From<std::io::Error> for WordlinkError {
    fn from(e: std::io::Error) -> Self {
        WordlinkError::FetchFailed(e.to_string())
    }
}
