use thiserror::Error;

/// Errors raised by the config cache and its parameter sources
///
/// `Clone` so that a single refresh outcome can be handed to every caller
/// that joined the same in-flight refresh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("Missing parameter store keys: {}", keys.join(","))]
    MissingKeys { keys: Vec<String> },

    #[error("Source error: {source_name} - {message}")]
    Source { source_name: String, message: String },
}

impl CacheError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn missing_keys<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingKeys {
            keys: keys.into_iter().map(Into::into).collect(),
        }
    }

    pub fn source(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Source {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Names of the keys a source failed to return, if this is a `MissingKeys` error
    pub fn missing(&self) -> &[String] {
        match self {
            Self::MissingKeys { keys } => keys,
            _ => &[],
        }
    }
}
