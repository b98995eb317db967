//! This file defines a user of the application and its supporting types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Error, models::PasswordHash};

/// A newtype wrapper for integer user IDs.
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserID(i64);

impl UserID {
    /// Create a user ID from its integer representation.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// The integer representation of the user ID.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
///
/// The stored credential never leaves the store layer; the wire shape for
/// users is [UserProfile].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    id: UserID,
    username: String,
    password_hash: PasswordHash,
}

impl User {
    /// Create a user from its parts.
    ///
    /// This is intended for store implementations reconstructing a user from
    /// persisted data; new users are created through
    /// [UserStore::create](crate::stores::UserStore::create).
    pub fn new(id: UserID, username: String, password_hash: PasswordHash) -> Self {
        Self {
            id,
            username,
            password_hash,
        }
    }

    /// The user's ID in the store.
    pub fn id(&self) -> UserID {
        self.id
    }

    /// The unique name the user registered with.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The user's stored credential.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// The public view of this user.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// The public view of a [User]: what registration and login responses carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// The user's ID in the store.
    pub id: UserID,
    /// The unique name the user registered with.
    pub username: String,
}

/// The response body for a successful login: the user's profile plus a
/// session token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogInResponse {
    /// The user's ID in the store.
    pub id: UserID,
    /// The unique name the user registered with.
    pub username: String,
    /// The bearer token to present on protected routes.
    pub token: String,
}

/// The request body for registration and login.
///
/// Both fields are optional so that missing fields produce a 400 response
/// with a helpful message instead of a deserialization rejection.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Credentials {
    /// The name the user wants to register or log in with.
    pub username: Option<String>,
    /// The matching password.
    pub password: Option<String>,
}

impl Credentials {
    /// Check that both fields are present and non-empty, and return them.
    ///
    /// The username is trimmed of surrounding whitespace.
    ///
    /// # Errors
    /// Returns [Error::InvalidInput] if either field is missing or empty.
    pub fn validate(self) -> Result<(String, String), Error> {
        let username = self
            .username
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_owned();
        let password = self.password.unwrap_or_default();

        if username.is_empty() || password.is_empty() {
            return Err(Error::InvalidInput(
                "username and password are required".to_owned(),
            ));
        }

        Ok((username, password))
    }
}
