use thiserror::Error;

#[derive(Error, Debug)]
pub enum TypeForgeError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV Parsing Error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Malformed lexicon line {line}: {reason}")]
    MalformedLexicon { line: usize, reason: String },

    #[error("Lexicon word '{word}' uses '{ch}', which has no key on the layout")]
    MissingKey { word: String, ch: char },

    #[error("Lexicon word '{word}' has non-positive weight {weight}")]
    InvalidWeight { word: String, weight: f64 },

    #[error("Data Validation Error: {0}")]
    Validation(String),
}

pub type TfResult<T> = Result<T, TypeForgeError>;
