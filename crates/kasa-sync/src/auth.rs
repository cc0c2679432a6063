//! Token supply for the sale endpoint.

use std::sync::Arc;

/// Supplies the bearer token attached to each push.
///
/// The engine owns token refresh; the sync client just asks for whatever
/// is current right before each attempt, so a refresh that lands between
/// retries is picked up automatically.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> String;
}

/// Fixed token, for API-key style deployments and tests.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl TokenProvider for StaticTokenProvider {
    fn token(&self) -> String {
        self.token.clone()
    }
}

impl<T: TokenProvider + ?Sized> TokenProvider for Arc<T> {
    fn token(&self) -> String {
        (**self).token()
    }
}
