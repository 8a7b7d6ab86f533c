use thiserror::Error;

#[derive(Error, Debug)]
pub enum AurError {
    #[error("Malformed dependency: {0:?}")]
    MalformedDependency(String),

    #[error("Unbalanced '{delimiter}' in value of '{field}'")]
    UnbalancedDelimiter { field: String, delimiter: char },

    #[error("AUR reported an error: {}", .0.as_deref().unwrap_or("no details given"))]
    RemoteError(Option<String>),

    #[error("Nothing retrieved from {0}")]
    EmptyOrMissingInput(String),

    #[error("Response contained no package record")]
    RecordNotFound,

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid search pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Error: {0}")]
    Other(#[from] anyhow::Error),
}

impl AurError {
    /// True for failures in the content of a response, as opposed to
    /// failures retrieving it.
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            AurError::RemoteError(_)
                | AurError::RecordNotFound
                | AurError::JsonError(_)
                | AurError::EmptyOrMissingInput(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AurError>;
