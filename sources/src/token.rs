//! Module for handling authentication tokens.
//!
//! Opensky uses the OAuth2 "client credentials" flow: we post our client id & secret and get a
//! bearer token valid for a limited time (30 min at the time of writing).  Tokens are kept in
//! memory only.
//!

use std::fmt::{Debug, Display, Formatter};

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

use crate::AuthError;

/// Anything with an expiration date
///
pub trait Expirable {
    /// Expiration instant
    fn expires_at(&self) -> DateTime<Utc>;

    #[inline]
    fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at()
    }

    /// Will it expire within `margin`?
    ///
    #[inline]
    fn expires_within(&self, margin: Duration) -> bool {
        Utc::now() + margin >= self.expires_at()
    }
}

/// Bearer token and its expiration date
///
#[derive(Clone, Eq, PartialEq)]
pub struct Credential {
    /// The actual token
    pub token: String,
    /// Expiration date
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(token: &str, expires_at: DateTime<Utc>) -> Self {
        Credential {
            token: token.to_owned(),
            expires_at,
        }
    }
}

impl Expirable for Credential {
    #[inline]
    fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}

impl Debug for Credential {
    /// Never log the token itself
    ///
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &format!("{}…", self.token.chars().take(6).collect::<String>()))
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Display for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "token valid until {}", self.expires_at)
    }
}

/// Anything able to give us a fresh credential
///
pub trait TokenProvider: Debug + Send {
    fn get_token(&self) -> Result<Credential, AuthError>;
}

/// Answer from the OAuth2 token endpoint, only what we need.
///
#[derive(Debug, Deserialize)]
pub(crate) struct TokenReply {
    pub access_token: String,
    /// Validity in seconds
    pub expires_in: i64,
}

impl TokenReply {
    pub(crate) fn into_credential(self) -> Result<Credential, AuthError> {
        if self.access_token.is_empty() {
            return Err(AuthError::Decoding("empty access_token".to_string()));
        }
        let expires_at = Duration::try_seconds(self.expires_in.max(0))
            .and_then(|d| Utc::now().checked_add_signed(d))
            .ok_or_else(|| AuthError::Decoding(format!("bad expires_in {}", self.expires_in)))?;
        Ok(Credential {
            token: self.access_token,
            expires_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_expiration() {
        let valid = Credential::new("FOOBAR", Utc::now() + Duration::minutes(30));
        assert!(!valid.is_expired());
        assert!(!valid.expires_within(Duration::seconds(30)));
        assert!(valid.expires_within(Duration::hours(1)));

        let old = Credential::new("FOOBAR", Utc::now() - Duration::seconds(1));
        assert!(old.is_expired());
    }

    #[test]
    fn test_credential_debug_hides_token() {
        let cred = Credential::new("FOOBARBAZQUUX", Utc::now());
        let s = format!("{:?}", cred);
        assert!(s.contains("FOOBAR"));
        assert!(!s.contains("FOOBARBAZQUUX"));
    }

    #[test]
    fn test_token_reply() {
        let reply: TokenReply =
            serde_json::from_str(r##"{"access_token":"abc","expires_in":1800,"token_type":"Bearer"}"##)
                .unwrap();
        let cred = reply.into_credential().unwrap();
        assert_eq!("abc", cred.token);
        assert!(cred.expires_within(Duration::seconds(1801)));
        assert!(!cred.expires_within(Duration::seconds(1700)));
    }

    #[test]
    fn test_token_reply_empty() {
        let reply = TokenReply {
            access_token: String::new(),
            expires_in: 1800,
        };
        assert!(reply.into_credential().is_err());
    }

    #[test]
    fn test_token_reply_huge_expiry() {
        let reply: TokenReply =
            serde_json::from_str(r##"{"access_token":"abc","expires_in":9223372036854775807}"##)
                .unwrap();
        let res = reply.into_credential();
        assert!(matches!(res, Err(AuthError::Decoding(_))));
    }
}
