use std::str::FromStr;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const SUBJECT_PREFIX: &str = "userId:";

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

/// Outcome of verifying a signed token. Expiry is a normal negative result,
/// not a fault; callers fold `Expired` and `Invalid` into the same
/// unauthenticated path.
#[derive(Debug, PartialEq, Eq)]
pub enum Verification {
    Valid(String),
    Expired,
    Invalid,
}

impl Verification {
    /// The verified subject's user id, if any.
    pub fn user_id(self) -> Option<String> {
        match self {
            Verification::Valid(user_id) => Some(user_id),
            Verification::Expired | Verification::Invalid => None,
        }
    }
}

/// Signs and verifies the JWTs used for both access and refresh tokens.
/// Symmetric key, configured algorithm, subject `userId:<id>`, absolute
/// expiry. Stateless by construction; expiry is the only invalidation an
/// access token has.
pub struct TokenSigner {
    header: Header,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    pub fn new(secret: &str, algorithm: &str) -> Result<Self> {
        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|_| Error::Config(format!("unknown signing algorithm: {algorithm}")))?;

        let mut validation = Validation::new(algorithm);
        // Exact expiry: the default leeway keeps just-expired tokens alive.
        validation.leeway = 0;

        Ok(Self {
            header: Header::new(algorithm),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Mints a token whose subject names the user and whose expiry is `ttl`
    /// from now.
    pub fn sign(&self, user_id: &str, ttl: Duration) -> Result<String> {
        let claims = Claims {
            sub: format!("{SUBJECT_PREFIX}{user_id}"),
            exp: (Utc::now() + ttl).timestamp(),
        };
        encode(&self.header, &claims, &self.encoding)
            .map_err(|e| Error::TokenSigning(e.to_string()))
    }

    /// Verifies signature and expiry and extracts the subject's user id.
    /// Every failure mode other than expiry collapses to `Invalid`.
    pub fn verify(&self, token: &str) -> Verification {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => match data.claims.sub.strip_prefix(SUBJECT_PREFIX) {
                Some(user_id) if !user_id.is_empty() => Verification::Valid(user_id.to_string()),
                _ => Verification::Invalid,
            },
            Err(e) if matches!(e.kind(), ErrorKind::ExpiredSignature) => Verification::Expired,
            Err(_) => Verification::Invalid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> TokenSigner {
        TokenSigner::new("test-secret", "HS256").unwrap()
    }

    #[test]
    fn test_sign_and_verify_round_trip() {
        let signer = signer();
        let token = signer.sign("user0001", Duration::minutes(30)).unwrap();
        assert_eq!(
            signer.verify(&token),
            Verification::Valid("user0001".to_string())
        );
    }

    #[test]
    fn test_expired_token_is_expired_not_invalid() {
        let signer = signer();
        let token = signer.sign("user0001", Duration::seconds(-1)).unwrap();
        assert_eq!(signer.verify(&token), Verification::Expired);
        assert_eq!(signer.verify(&token).user_id(), None);
    }

    #[test]
    fn test_garbage_token_is_invalid() {
        assert_eq!(signer().verify("not.a.jwt"), Verification::Invalid);
        assert_eq!(signer().verify(""), Verification::Invalid);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = signer().sign("user0001", Duration::minutes(5)).unwrap();
        let other = TokenSigner::new("other-secret", "HS256").unwrap();
        assert_eq!(other.verify(&token), Verification::Invalid);
    }

    #[test]
    fn test_subject_without_prefix_is_invalid() {
        let signer = signer();
        let claims = Claims {
            sub: "nakedUserId".to_string(),
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(signer.verify(&token), Verification::Invalid);
    }

    #[test]
    fn test_unknown_algorithm_is_rejected() {
        assert!(matches!(
            TokenSigner::new("secret", "HS257"),
            Err(Error::Config(_))
        ));
    }
}
