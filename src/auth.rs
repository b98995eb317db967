//! Bearer-token authentication for the protected routes.
//!
//! Tokens are stateless: the server keeps no session list and cannot revoke
//! a token early. A token simply expires [TOKEN_DURATION] after it was
//! issued, and logging out is the client discarding its copy.

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    models::{User, UserID},
    state::AuthState,
};

/// How long a session token stays valid after it is issued.
pub const TOKEN_DURATION: Duration = Duration::hours(1);

/// The contents of a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// The ID of the user the token was issued to.
    pub sub: i64,
    /// The username of the user the token was issued to.
    pub username: String,
    /// The expiry time of the token as a unix timestamp.
    pub exp: usize,
    /// The time the token was issued as a unix timestamp.
    pub iat: usize,
}

impl Claims {
    /// The ID of the user the token was issued to.
    pub fn user_id(&self) -> UserID {
        UserID::new(self.sub)
    }
}

/// The signing and verification keys for session tokens, derived from one
/// secret.
#[derive(Clone)]
pub struct TokenKeys {
    /// The key for signing new tokens.
    pub encoding: EncodingKey,
    /// The key for verifying presented tokens.
    pub decoding: DecodingKey,
}

impl TokenKeys {
    /// Derive the token keys from a secret string.
    pub fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_ref()),
            decoding: DecodingKey::from_secret(secret.as_ref()),
        }
    }
}

/// Issue a session token for `user`, valid for [TOKEN_DURATION].
///
/// # Errors
/// Returns [Error::TokenCreation] if signing fails; the underlying error is
/// logged server-side.
pub fn encode_token(user: &User, encoding_key: &EncodingKey) -> Result<String, Error> {
    let now = OffsetDateTime::now_utc();
    let claims = Claims {
        sub: user.id().as_i64(),
        username: user.username().to_owned(),
        exp: (now + TOKEN_DURATION).unix_timestamp() as usize,
        iat: now.unix_timestamp() as usize,
    };

    encode(&Header::default(), &claims, encoding_key).map_err(|e| {
        tracing::error!("could not sign session token: {}", e);
        Error::TokenCreation
    })
}

/// Validate a presented token and extract its claims.
///
/// # Errors
/// Returns [Error::InvalidToken] if the signature or expiry check fails.
pub fn decode_token(token: &str, decoding_key: &DecodingKey) -> Result<Claims, Error> {
    decode::<Claims>(token, decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| Error::InvalidToken)
}

impl<S> FromRequestParts<S> for Claims
where
    AuthState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) = parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
            .map_err(|_| Error::MissingToken)?;

        let auth_state = AuthState::from_ref(state);

        decode_token(bearer.token(), &auth_state.decoding_key)
    }
}

#[cfg(test)]
mod token_tests {
    use jsonwebtoken::{Header, encode};
    use time::OffsetDateTime;

    use crate::{
        Error,
        models::{PasswordHash, User, UserID},
    };

    use super::{Claims, TokenKeys, decode_token, encode_token};

    fn test_user() -> User {
        User::new(
            UserID::new(7),
            "ana".to_owned(),
            PasswordHash::new_unchecked("hunter2"),
        )
    }

    #[test]
    fn decode_returns_the_encoded_identity() {
        let keys = TokenKeys::from_secret("foobar");

        let token = encode_token(&test_user(), &keys.encoding).unwrap();
        let claims = decode_token(&token, &keys.decoding).unwrap();

        assert_eq!(claims.sub, 7);
        assert_eq!(claims.username, "ana");
        assert_eq!(claims.user_id(), UserID::new(7));
    }

    #[test]
    fn decode_fails_with_the_wrong_secret() {
        let keys = TokenKeys::from_secret("foobar");
        let other_keys = TokenKeys::from_secret("bazqux");

        let token = encode_token(&test_user(), &keys.encoding).unwrap();

        assert_eq!(
            decode_token(&token, &other_keys.decoding),
            Err(Error::InvalidToken)
        );
    }

    #[test]
    fn decode_fails_with_a_tampered_token() {
        let keys = TokenKeys::from_secret("foobar");

        let mut token = encode_token(&test_user(), &keys.encoding).unwrap();
        token.push('x');

        assert_eq!(decode_token(&token, &keys.decoding), Err(Error::InvalidToken));
    }

    #[test]
    fn decode_fails_with_an_expired_token() {
        let keys = TokenKeys::from_secret("foobar");

        // Expired well past the default validation leeway.
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: 7,
            username: "ana".to_owned(),
            exp: (now - 7200) as usize,
            iat: (now - 10800) as usize,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();

        assert_eq!(decode_token(&token, &keys.decoding), Err(Error::InvalidToken));
    }
}
