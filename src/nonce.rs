//! Single-use verification tokens for the relay.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::error::MemoriaError;

/// Issues short-lived tokens and accepts each exactly once.
#[derive(Debug)]
pub struct NonceStore {
    ttl: Duration,
    issued: Mutex<HashMap<String, Instant>>,
}

impl NonceStore {
    /// Create an empty store whose tokens live for `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            issued: Mutex::new(HashMap::new()),
        }
    }

    fn tokens(&self) -> MutexGuard<'_, HashMap<String, Instant>> {
        self.issued
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Issue a fresh token, pruning expired ones.
    pub fn issue(&self) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        let now = Instant::now();
        let mut issued = self.tokens();
        issued.retain(|_, at| now.duration_since(*at) < self.ttl);
        issued.insert(token.clone(), now);
        token
    }

    /// Accept `token` if it was issued, is unexpired, and has not been used.
    ///
    /// # Errors
    ///
    /// Returns [`MemoriaError::Forbidden`] otherwise.
    pub fn consume(&self, token: &str) -> Result<(), MemoriaError> {
        match self.tokens().remove(token) {
            Some(at) if at.elapsed() < self.ttl => Ok(()),
            Some(_) => Err(MemoriaError::Forbidden("verification token expired".into())),
            None => Err(MemoriaError::Forbidden("invalid verification token".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_is_single_use() {
        let store = NonceStore::new(Duration::from_secs(60));
        let token = store.issue();
        assert!(store.consume(&token).is_ok());
        let reused = store.consume(&token);
        assert!(matches!(reused, Err(MemoriaError::Forbidden(_))));
    }

    #[test]
    fn unknown_token_rejected() {
        let store = NonceStore::new(Duration::from_secs(60));
        assert!(store.consume("not-a-token").is_err());
        assert!(store.consume("").is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let store = NonceStore::new(Duration::ZERO);
        let token = store.issue();
        let err = store.consume(&token).unwrap_err();
        assert!(err.to_string().contains("expired"));
    }

    #[test]
    fn tokens_are_distinct() {
        let store = NonceStore::new(Duration::from_secs(60));
        assert_ne!(store.issue(), store.issue());
    }
}
