use thiserror::Error;

/// Custom error type for tokens, allow us to differentiate between errors.
///
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("No credentials, set them in the config file or the environment")]
    NoCredentials,
    #[error("Decoding token: {0}")]
    Decoding(String),
    #[error("HTTP Error: {0}")]
    HTTP(String),
    #[error("Error retrieving token for {0}")]
    Retrieval(String),
}

/// Everything that can go wrong while polling the feed.
///
/// Only `Unauthorized` is special: the credential is not valid anymore.  Everything else is
/// transient and the next poll may very well work.
///
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Authentication refused ({0})")]
    Unauthorized(u16),
    #[error("HTTP Error({0})")]
    Http(u16),
    #[error("Can not decode answer: {0}")]
    Decode(String),
}

/// Broad classification of `FetchError`.
///
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Skip this cycle, try again next time
    Transient,
    /// Credential refused, needs a new one
    AuthExpired,
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Unauthorized(_) => ErrorKind::AuthExpired,
            _ => ErrorKind::Transient,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else if let Some(code) = e.status() {
            FetchError::Http(code.as_u16())
        } else {
            FetchError::Connection(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(FetchError::Timeout, ErrorKind::Transient)]
    #[case(FetchError::Connection("refused".into()), ErrorKind::Transient)]
    #[case(FetchError::Http(503), ErrorKind::Transient)]
    #[case(FetchError::Http(429), ErrorKind::Transient)]
    #[case(FetchError::Decode("eof".into()), ErrorKind::Transient)]
    #[case(FetchError::Unauthorized(401), ErrorKind::AuthExpired)]
    fn test_fetch_error_kind(#[case] e: FetchError, #[case] kind: ErrorKind) {
        assert_eq!(kind, e.kind());
    }
}
