//! Process-local session registry keyed by hashed bearer tokens.
//!
//! Sessions live only in memory and are lost on restart. Only the SHA-256 of a
//! token is kept, so a dump of the registry cannot be replayed as cookies.

use super::Session;
use anyhow::{Context, Result};
use base64::Engine;
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug)]
struct SessionEntry {
    session: Session,
    expires_at: Instant,
}

#[derive(Debug)]
pub struct SessionRegistry {
    ttl: Duration,
    entries: RwLock<HashMap<Vec<u8>, SessionEntry>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Resolve a token into its session. Missing, unknown, or expired tokens
    /// yield a fresh unauthenticated session.
    pub async fn load(&self, token: Option<&str>) -> Session {
        let Some(token) = token else {
            return Session::new();
        };
        let token_hash = hash_session_token(token);

        {
            let entries = self.entries.read().await;
            match entries.get(&token_hash) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    return entry.session.clone();
                }
                Some(_) => {}
                None => return Session::new(),
            }
        }

        debug!("Dropping expired session");
        self.entries.write().await.remove(&token_hash);
        Session::new()
    }

    /// Store a session under a new random token and return the raw token.
    ///
    /// # Errors
    /// Returns an error if the OS random source fails.
    pub async fn issue(&self, session: Session) -> Result<String> {
        let token = generate_session_token()?;
        let entry = SessionEntry {
            session,
            expires_at: Instant::now() + self.ttl,
        };
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > Instant::now());
        entries.insert(hash_session_token(&token), entry);
        Ok(token)
    }

    /// Forget a token. Unknown tokens are ignored.
    pub async fn revoke(&self, token: &str) {
        self.entries
            .write()
            .await
            .remove(&hash_session_token(token));
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// 32 random bytes, base64url without padding.
fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

fn hash_session_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}
