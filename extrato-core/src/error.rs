use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("No statement format recognized")]
    FormatNotRecognized,

    #[error("No extractor for institution: {0}")]
    UnknownInstitution(String),

    #[error("Institution {institution} has no mode {mode}")]
    UnknownMode { institution: String, mode: String },

    #[error("Parse failure: {0}")]
    ParseFailure(String),

    #[error("Card lookup unavailable: {0}")]
    CardLookup(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
