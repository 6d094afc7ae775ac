use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
#[derive(Debug, Error)]
pub enum DigestError {
    /// An error occurred during an HTTP request (transport, timeout, body decoding).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A provided or derived URL could not be parsed.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The server returned an unexpected or unsuccessful HTTP status code.
    #[error("Unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// A JSON payload could not be decoded.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// An XML payload could not be parsed.
    #[error("XML parse error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// The data received was in an unexpected format or was missing a required field.
    #[error("Data format unexpected or missing field: {0}")]
    Data(String),

    /// A required delivery credential is not configured.
    #[error("missing delivery credential: {var} is not set")]
    MissingCredential {
        /// Name of the environment variable that must be set.
        var: &'static str,
    },

    /// Composing or sending the digest email failed.
    #[error("mail delivery failed: {0}")]
    Mail(String),
}

impl DigestError {
    /// True when the error is a 404 from the upstream.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DigestError::Status { status: 404, .. })
    }
}

impl From<lettre::error::Error> for DigestError {
    fn from(e: lettre::error::Error) -> Self {
        DigestError::Mail(e.to_string())
    }
}

impl From<lettre::address::AddressError> for DigestError {
    fn from(e: lettre::address::AddressError) -> Self {
        DigestError::Mail(format!("invalid address: {e}"))
    }
}

impl From<lettre::transport::smtp::Error> for DigestError {
    fn from(e: lettre::transport::smtp::Error) -> Self {
        DigestError::Mail(e.to_string())
    }
}
