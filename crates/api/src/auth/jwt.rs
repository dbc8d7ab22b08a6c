//! Bearer tokens for instructors and students.
//!
//! Accounts are managed elsewhere; this service signs and checks HS256
//! tokens whose subject is a `users.id` and whose issuer is
//! [`TOKEN_ISSUER`]. Tokens minted for other services sharing the secret
//! are rejected.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use qalab_core::types::DbId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TOKEN_ISSUER: &str = "qalab";

const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// `users.id` of the caller.
    pub sub: DbId,
    /// `"instructor"` or `"student"`.
    pub role: String,
    pub iss: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
}

impl JwtConfig {
    /// Read `JWT_SECRET` (required, non-empty) and `JWT_ACCESS_EXPIRY_MINS`
    /// (minutes, default 15).
    ///
    /// Panics at startup when either is unusable.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let access_token_expiry_mins = match std::env::var("JWT_ACCESS_EXPIRY_MINS") {
            Ok(raw) => raw
                .parse()
                .expect("JWT_ACCESS_EXPIRY_MINS must be a whole number of minutes"),
            Err(_) => DEFAULT_ACCESS_EXPIRY_MINS,
        };

        Self {
            secret,
            access_token_expiry_mins,
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::default();
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation
    }
}

pub fn generate_access_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        iss: TOKEN_ISSUER.to_string(),
        exp: iat + config.access_token_expiry_mins * 60,
        iat,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature, expiry and issuer, and return the claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &config.validation(),
    )
    .map(|data| data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "qalab-test-secret-long-enough-for-hmac";

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            access_token_expiry_mins: 15,
        }
    }

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn claims_for(role: &str, iss: &str, exp_offset_secs: i64) -> Claims {
        let now = chrono::Utc::now().timestamp();
        Claims {
            sub: 1,
            role: role.to_string(),
            iss: iss.to_string(),
            exp: now + exp_offset_secs,
            iat: now - 600,
            jti: Uuid::new_v4().to_string(),
        }
    }

    #[test]
    fn instructor_token_keeps_identity() {
        let token = generate_access_token(42, "instructor", &config(SECRET)).unwrap();

        let claims = validate_token(&token, &config(SECRET)).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, "instructor");
        assert_eq!(claims.iss, TOKEN_ISSUER);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn expired_token_fails() {
        // Well past the default 60-second leeway.
        let token = sign(&claims_for("student", TOKEN_ISSUER, -300), SECRET);
        assert!(validate_token(&token, &config(SECRET)).is_err());
    }

    #[test]
    fn token_from_another_issuer_fails() {
        let token = sign(&claims_for("student", "grading-service", 300), SECRET);
        assert!(validate_token(&token, &config(SECRET)).is_err());
    }

    #[test]
    fn token_from_other_secret_fails() {
        let token = generate_access_token(1, "student", &config("secret-alpha")).unwrap();
        assert!(validate_token(&token, &config("secret-bravo")).is_err());
    }
}
