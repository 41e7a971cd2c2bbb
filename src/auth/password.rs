use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::{Error, Result};

const ARGON2_MEMORY: u32 = 64 * 1024; // 64KB
const ARGON2_ITERATIONS: u32 = 1;
const ARGON2_PARALLELISM: u32 = 4;
const ARGON2_OUTPUT_LEN: usize = 32;

/// Password hashing as an explicitly constructed collaborator: handlers get
/// this through application state, never through a process-wide context.
pub struct PasswordContext {
    argon2: Argon2<'static>,
}

impl Default for PasswordContext {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordContext {
    #[must_use]
    pub fn new() -> Self {
        let params = Params::new(
            ARGON2_MEMORY,
            ARGON2_ITERATIONS,
            ARGON2_PARALLELISM,
            Some(ARGON2_OUTPUT_LEN),
        )
        .expect("invalid argon2 params");

        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Hashes a plaintext password into a PHC string with embedded salt.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Config(format!("failed to hash password: {e}")))?;
        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored hash.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| Error::Config(format!("invalid hash format: {e}")))?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::Config(format!("failed to verify password: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verifies() {
        let passwords = PasswordContext::new();
        let hash = passwords.hash("p@ssW0rd").unwrap();
        assert!(passwords.verify("p@ssW0rd", &hash).unwrap());
    }

    #[test]
    fn test_wrong_password_fails() {
        let passwords = PasswordContext::new();
        let hash = passwords.hash("p@ssW0rd").unwrap();
        assert!(!passwords.verify("wr0ngP@ssWord", &hash).unwrap());
    }

    #[test]
    fn test_hash_is_phc_format() {
        let passwords = PasswordContext::new();
        let hash = passwords.hash("p@ssW0rd").unwrap();
        assert!(hash.starts_with("$argon2id$"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let passwords = PasswordContext::new();
        assert_ne!(
            passwords.hash("p@ssW0rd").unwrap(),
            passwords.hash("p@ssW0rd").unwrap()
        );
    }
}
