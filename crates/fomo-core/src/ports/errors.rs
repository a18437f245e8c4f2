use thiserror::Error;

/// Failures of a `UserDirectoryPort` implementation.
///
/// `Rejected` is the only variant carrying server intent; everything else is
/// transport or protocol trouble and is treated uniformly by callers.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The server answered with a business rejection (404 on a wallet
    /// route, for example) and possibly a human-readable reason.
    #[error("directory rejected the request: {}", message.as_deref().unwrap_or("no reason given"))]
    Rejected { message: Option<String> },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("server error: HTTP {status}")]
    Server { status: u16 },

    #[error("unexpected response body: {0}")]
    InvalidResponse(String),
}

impl DirectoryError {
    /// The server-provided reason, when the directory rejected the request.
    pub fn rejection_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message } => message.as_deref(),
            _ => None,
        }
    }
}
