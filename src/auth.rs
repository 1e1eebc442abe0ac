//! Password hashing and bearer-token issuance.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

/// Tokens expire 7 days after issuance.
pub const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Account id the token was issued for.
    sub: i64,
    exp: i64,
}

pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|err| ServiceError::Internal(err.into()))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    bcrypt::verify(password, hash).map_err(|err| ServiceError::Internal(err.into()))
}

/// Signs a bearer token carrying `account_id`.
pub fn issue_token(secret: &str, account_id: i64) -> Result<String, ServiceError> {
    let claims = Claims {
        sub: account_id,
        exp: (Utc::now() + chrono::Duration::days(TOKEN_TTL_DAYS)).timestamp(),
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|err| ServiceError::Internal(err.into()))
}

/// Returns the account id a token was issued for, or Unauthorized if the
/// token is missing, malformed, forged, or expired.
pub fn verify_token(secret: &str, token: &str) -> Result<i64, ServiceError> {
    jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims.sub)
    .map_err(|_| ServiceError::Unauthorized("Invalid or expired token".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_round_trip() {
        let hash = hash_password("Passw0rd!").unwrap();
        assert_ne!(hash, "Passw0rd!");
        assert!(verify_password("Passw0rd!", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn token_round_trip() {
        let token = issue_token("test-secret", 42).unwrap();
        assert_eq!(verify_token("test-secret", &token).unwrap(), 42);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = issue_token("secret-a", 42).unwrap();
        let err = verify_token("secret-b", &token).unwrap_err();
        assert_eq!(err.status_code(), 401);
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(verify_token("test-secret", "not.a.token").is_err());
    }
}
