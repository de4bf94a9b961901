use thiserror::Error;

#[derive(Error, Debug)]
pub enum BunrenError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("AnkiConnect error: {0}")]
    AnkiConnect(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("No API key configured")]
    NoApiKey,

    #[error("BunrenError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for BunrenError {
    fn from(error: std::io::Error) -> Self {
        BunrenError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for BunrenError {
    fn from(error: reqwest::Error) -> Self {
        BunrenError::Reqwest(Box::new(error))
    }
}
