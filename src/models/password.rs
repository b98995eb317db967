//! This file defines the `PasswordHash` type which wraps the stored form of a
//! user's credential.

use std::fmt::Display;

use bcrypt::{hash, verify};

use crate::Error;

/// The stored form of a user's password.
///
/// On the server this is always a salted bcrypt hash. The on-device store
/// keeps the raw password in the same column and compares by equality, so
/// this type also supports direct comparison via [PasswordHash::as_str].
#[derive(Debug, Clone, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// An alias for the default encryption cost for hashing passwords.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash a raw password with the specified `cost`.
    ///
    /// `cost` increases the rounds of hashing and therefore the time needed to verify a password.
    /// Pass in [PasswordHash::DEFAULT_COST] to use the recommended cost.
    ///
    /// # Errors
    ///
    /// This function will return an error if the password could not be hashed.
    pub fn new(raw_password: &str, cost: u32) -> Result<Self, Error> {
        match hash(raw_password, cost) {
            Ok(password_hash) => Ok(Self(password_hash)),
            Err(e) => Err(Error::Hashing(e.to_string())),
        }
    }

    /// Create a new `PasswordHash` without any hashing or validation.
    ///
    /// This is used when loading an already stored credential, and by the
    /// on-device store which keeps the raw password as-is.
    ///
    /// This function has `_unchecked` in the name but is not `unsafe`, because if an invalid hash
    /// is provided it will cause incorrect behaviour but not affect memory safety.
    pub fn new_unchecked(stored: &str) -> Self {
        Self(stored.to_string())
    }

    /// Check that `raw_password` matches the stored bcrypt hash.
    pub fn verify(&self, raw_password: &str) -> Result<bool, Error> {
        verify(raw_password, &self.0).map_err(|e| Error::Hashing(e.to_string()))
    }

    /// The stored string itself.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod password_hash_tests {
    use super::PasswordHash;

    #[test]
    fn verify_password_succeeds_for_valid_password() {
        let hash = PasswordHash::new_unchecked(
            "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm",
        );
        let password = "okon";

        assert!(hash.verify(password).unwrap());
    }

    #[test]
    fn verify_password_fails_for_invalid_password() {
        let hash = PasswordHash::new_unchecked(
            "$2b$12$Gwf0uvxH3L7JLfo0CC/NCOoijK2vQ/wbgP.LeNup8vj6gg31IiFkm",
        );
        let password = "thewrongpassword";

        assert!(!hash.verify(password).unwrap());
    }

    #[test]
    fn hash_then_verify_round_trips() {
        // The minimum cost keeps the test fast.
        let hash = PasswordHash::new("hunter2", 4).unwrap();

        assert!(hash.verify("hunter2").unwrap());
        assert!(!hash.verify("hunter3").unwrap());
    }
}
