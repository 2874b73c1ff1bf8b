//! API credentials loaded from the environment.

use crate::domain::SourceError;

pub const CONSUMER_KEY_VAR: &str = "TWITTER_CONSUMER_KEY";
pub const CONSUMER_SECRET_VAR: &str = "TWITTER_CONSUMER_SECRET";
pub const ACCESS_TOKEN_VAR: &str = "TWITTER_ACCESS_TOKEN";
pub const ACCESS_SECRET_VAR: &str = "TWITTER_ACCESS_SECRET";

/// OAuth 1.0a user-context credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    pub access_token: String,
    pub access_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"***")
            .field("access_token", &"***")
            .field("access_secret", &"***")
            .finish()
    }
}

impl Credentials {
    /// Read all four variables from the process environment.
    ///
    /// Fails on the first missing or blank variable.
    pub fn from_env() -> Result<Self, SourceError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, SourceError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| SourceError::Credentials {
                    variable: name.to_string(),
                })
        };

        Ok(Self {
            consumer_key: required(CONSUMER_KEY_VAR)?,
            consumer_secret: required(CONSUMER_SECRET_VAR)?,
            access_token: required(ACCESS_TOKEN_VAR)?,
            access_secret: required(ACCESS_SECRET_VAR)?,
        })
    }
}
