use std::env;
use std::fmt::{Debug, Display, Formatter};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::AuthError;

/// Environment variables used when the config file has no `auth` block.
pub const ENV_CLIENT_ID: &str = "OPENSKY_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "OPENSKY_CLIENT_SECRET";

/// OAuth2 client credentials, exchanged for a bearer token
///
#[derive(Clone, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Auth {
    pub client_id: String,
    pub client_secret: String,
}

impl Auth {
    pub fn new(client_id: &str, client_secret: &str) -> Self {
        Auth {
            client_id: client_id.to_owned(),
            client_secret: client_secret.to_owned(),
        }
    }

    /// Look into the environment
    ///
    #[tracing::instrument]
    pub fn from_env() -> Result<Self, AuthError> {
        trace!("auth::from_env");

        match (env::var(ENV_CLIENT_ID), env::var(ENV_CLIENT_SECRET)) {
            (Ok(id), Ok(secret)) if !id.is_empty() && !secret.is_empty() => {
                Ok(Auth::new(&id, &secret))
            }
            _ => Err(AuthError::NoCredentials),
        }
    }

    /// Empty values are as good as nothing
    ///
    pub fn check(self) -> Result<Self, AuthError> {
        if self.client_id.trim().is_empty() || self.client_secret.trim().is_empty() {
            return Err(AuthError::NoCredentials);
        }
        Ok(self)
    }
}

impl Display for Auth {
    /// Obfuscate the secret
    ///
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Auth {{ client_id: {:?}, client_secret: HIDDEN }}", self.client_id)
    }
}

impl Debug for Auth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_display_hides_secret() {
        let auth = Auth::new("me", "s3cr3t");
        let s = auth.to_string();
        assert!(s.contains("me"));
        assert!(!s.contains("s3cr3t"));
        assert!(!format!("{:?}", auth).contains("s3cr3t"));
    }

    #[test]
    fn test_auth_check() {
        assert!(Auth::new("me", "s3cr3t").check().is_ok());
        assert!(Auth::new("me", " ").check().is_err());
        assert!(Auth::default().check().is_err());
    }
}
