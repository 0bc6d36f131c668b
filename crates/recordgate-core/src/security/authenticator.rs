//! Auth token resolution.
//!
//! The decorator is handed an auth token rather than a caller; an
//! [`Authenticator`] turns it into the [`Caller`] links are enhanced for.
//!
//! # Configuration
//!
//! [`TokenAuthenticator::from_env`] reads tokens in the format:
//! ```text
//! token1:user1:role1,role2;token2:user2:role3
//! ```

use super::caller::Caller;
use crate::error::{Error, Result};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Default environment variable read by [`TokenAuthenticator::from_default_env`].
pub const DEFAULT_TOKENS_ENV: &str = "RECORDGATE_TOKENS";

/// Resolves auth tokens to callers.
pub trait Authenticator: Send + Sync {
    /// Resolve the token, failing with `AuthenticationFailed` when it is
    /// unknown or expired.
    fn caller_for_token(&self, token: &str) -> Result<Caller>;
}

#[derive(Clone)]
struct TokenEntry {
    caller: Caller,
    expires_at: Option<Instant>,
}

impl TokenEntry {
    fn is_expired(&self) -> bool {
        self.expires_at.map(|exp| Instant::now() > exp).unwrap_or(false)
    }
}

/// Authenticator backed by an in-memory token table.
#[derive(Default)]
pub struct TokenAuthenticator {
    tokens: RwLock<HashMap<String, TokenEntry>>,
}

impl TokenAuthenticator {
    /// Create an empty authenticator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token for a caller (no expiry).
    pub fn register_token(&self, token: impl Into<String>, caller: Caller) {
        self.tokens.write().insert(
            token.into(),
            TokenEntry {
                caller,
                expires_at: None,
            },
        );
    }

    /// Register a token that expires after `ttl`.
    pub fn register_token_with_ttl(&self, token: impl Into<String>, caller: Caller, ttl: Duration) {
        self.tokens.write().insert(
            token.into(),
            TokenEntry {
                caller,
                expires_at: Some(Instant::now() + ttl),
            },
        );
    }

    /// Revoke a token.
    pub fn revoke_token(&self, token: &str) -> bool {
        self.tokens.write().remove(token).is_some()
    }

    /// Load tokens from an environment variable.
    ///
    /// Malformed entries are skipped. Tokens loaded from env have no expiry.
    pub fn from_env(env_var: &str) -> Self {
        let auth = Self::new();

        if let Ok(tokens_str) = std::env::var(env_var) {
            auth.load_tokens(&tokens_str);
        }

        auth
    }

    /// Load from [`DEFAULT_TOKENS_ENV`].
    pub fn from_default_env() -> Self {
        Self::from_env(DEFAULT_TOKENS_ENV)
    }

    fn load_tokens(&self, tokens: &str) {
        for token_spec in tokens.split(';') {
            let mut parts = token_spec.trim().splitn(3, ':');
            let (Some(token), Some(user)) = (parts.next(), parts.next()) else {
                continue;
            };
            let (token, user) = (token.trim(), user.trim());
            if token.is_empty() || user.is_empty() {
                continue;
            }
            let roles = parts
                .next()
                .unwrap_or("")
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty());
            self.register_token(token, Caller::new(user).with_roles(roles));
        }
    }

    /// Check if a token is valid (exists and not expired).
    pub fn is_valid(&self, token: &str) -> bool {
        self.tokens
            .read()
            .get(token)
            .map(|e| !e.is_expired())
            .unwrap_or(false)
    }

    /// Number of registered tokens.
    pub fn token_count(&self) -> usize {
        self.tokens.read().len()
    }

    /// Remove expired tokens, returning how many were dropped.
    pub fn cleanup_expired(&self) -> usize {
        let mut tokens = self.tokens.write();
        let before = tokens.len();
        tokens.retain(|_, entry| !entry.is_expired());
        before - tokens.len()
    }
}

impl Authenticator for TokenAuthenticator {
    fn caller_for_token(&self, token: &str) -> Result<Caller> {
        let tokens = self.tokens.read();
        match tokens.get(token) {
            Some(entry) if entry.is_expired() => {
                Err(Error::AuthenticationFailed("token expired".to_string()))
            }
            Some(entry) => Ok(entry.caller.clone()),
            None => Err(Error::AuthenticationFailed("unknown token".to_string())),
        }
    }
}
