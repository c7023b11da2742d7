//! Error types for zkhb-estate.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    pub kind: ErrorKind,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// Shorthand for an argument that failed validation.
    pub(crate) fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation {
            field,
            message: message.into(),
        })
    }

    /// Returns true if a query argument was rejected before any request was sent.
    pub fn is_validation_error(&self) -> bool {
        matches!(self.kind, ErrorKind::Validation { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    #[error("Client error: {0}")]
    Client(String),
    #[error("Invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    #[error("XML error: {0}")]
    Xml(String),
}

impl From<zkhb_client::Error> for Error {
    fn from(err: zkhb_client::Error) -> Self {
        Error {
            kind: ErrorKind::Client(err.to_string()),
            source: Some(Box::new(err)),
        }
    }
}
