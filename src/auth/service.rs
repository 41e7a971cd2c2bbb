use chrono::{Duration, Utc};

use crate::error::Result;
use crate::store::Store;
use crate::types::{RefreshToken, new_id};

use super::jwt::{TokenSigner, Verification};

/// Issues access tokens and maintains the single rotated refresh token per
/// user. Access tokens are pure crypto; refresh tokens are additionally a
/// server-side pointer, which is what makes rotation effective: an old,
/// still cryptographically valid token stops resolving once its row is
/// overwritten.
pub struct TokenService {
    signer: TokenSigner,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    #[must_use]
    pub fn new(signer: TokenSigner, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            signer,
            access_ttl,
            refresh_ttl,
        }
    }

    /// Mints a short-lived bearer token. Nothing is persisted; the embedded
    /// expiry is the only invalidation mechanism.
    pub fn issue_access_token(&self, user_id: &str) -> Result<String> {
        self.signer.sign(user_id, self.access_ttl)
    }

    /// Resolves a bearer access token to a user id. Expired and malformed
    /// tokens both come back as `None`; the caller treats that as
    /// unauthenticated, not as a fault.
    #[must_use]
    pub fn resolve_access_token(&self, token: &str) -> Option<String> {
        self.signer.verify(token).user_id()
    }

    /// Returns the user's current refresh token, minting and upserting a
    /// fresh one when none is stored or the stored one no longer verifies
    /// for this user. Repeated logins inside the validity window return the
    /// identical string. Concurrent calls race on the upsert; the schema's
    /// one-row-per-user constraint makes that last-writer-wins, never a
    /// duplicate row.
    pub fn get_or_create_refresh_token(&self, store: &dyn Store, user_id: &str) -> Result<String> {
        if let Some(existing) = store.get_refresh_token_for_user(user_id)? {
            let still_valid =
                matches!(self.signer.verify(&existing.token), Verification::Valid(id) if id == user_id);
            if still_valid {
                return Ok(existing.token);
            }
        }

        let token = self.signer.sign(user_id, self.refresh_ttl)?;
        let now = Utc::now();
        store.upsert_refresh_token(&RefreshToken {
            id: new_id(),
            user_id: user_id.to_string(),
            token: token.clone(),
            created_at: now,
            updated_at: now,
        })?;
        Ok(token)
    }

    /// Resolves a refresh token to a user id, or `None` when it is not the
    /// active token of any user, fails verification, or disagrees with the
    /// row it matched.
    pub fn resolve_refresh_token(&self, store: &dyn Store, token: &str) -> Result<Option<String>> {
        // Exact-string lookup first: a rotated-away token matches no row.
        let Some(row) = store.get_refresh_token_by_token(token)? else {
            return Ok(None);
        };
        match self.signer.verify(token) {
            // Cross-check against the row; a desynchronized token/record
            // pair resolves to nothing.
            Verification::Valid(user_id) if user_id == row.user_id => Ok(Some(user_id)),
            _ => Ok(None),
        }
    }
}
