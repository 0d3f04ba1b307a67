/// Authentication service - JWT and password handling
use crate::error::{Result, ServerError};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct AuthService {
    secret: String,
    access_token_expiration: Duration,
    refresh_token_expiration: Duration,
    bcrypt_cost: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user email)
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
    pub token_type: TokenType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

impl AuthService {
    pub fn new(secret: String, access_expiration_hours: u64, refresh_expiration_days: u64) -> Self {
        Self {
            secret,
            access_token_expiration: Duration::hours(access_expiration_hours as i64),
            refresh_token_expiration: Duration::days(refresh_expiration_days as i64),
            bcrypt_cost: bcrypt::DEFAULT_COST,
        }
    }

    /// Use a different bcrypt work factor for new hashes
    #[must_use]
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    /// Access token lifetime in seconds
    pub fn access_expires_in(&self) -> i64 {
        self.access_token_expiration.num_seconds()
    }

    /// Hash a password using bcrypt
    pub fn hash_password(&self, password: &str) -> Result<String> {
        bcrypt::hash(password, self.bcrypt_cost).map_err(ServerError::from)
    }

    /// Verify a password against a hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        bcrypt::verify(password, hash).map_err(ServerError::from)
    }

    /// Create an access token for the account identified by `email`
    pub fn create_access_token(&self, email: &str) -> Result<String> {
        self.create_token(email, TokenType::Access, self.access_token_expiration)
    }

    /// Create a refresh token
    pub fn create_refresh_token(&self, email: &str) -> Result<String> {
        self.create_token(email, TokenType::Refresh, self.refresh_token_expiration)
    }

    /// Verify and decode a token
    pub fn verify_token(&self, token: &str) -> Result<Claims> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::default();

        let token_data = decode::<Claims>(token, &decoding_key, &validation)?;
        Ok(token_data.claims)
    }

    /// Verify an access token and return its subject
    pub fn verify_access_token(&self, token: &str) -> Result<String> {
        let claims = self.verify_token(token)?;
        if claims.token_type != TokenType::Access {
            return Err(ServerError::Auth("Invalid token type".to_string()));
        }
        Ok(claims.sub)
    }

    /// Verify a refresh token and return its subject
    pub fn verify_refresh_token(&self, token: &str) -> Result<String> {
        let claims = self.verify_token(token)?;
        if claims.token_type != TokenType::Refresh {
            return Err(ServerError::Auth("Invalid token type".to_string()));
        }
        Ok(claims.sub)
    }

    fn create_token(&self, subject: &str, token_type: TokenType, expiration: Duration) -> Result<String> {
        let now = Utc::now();
        let exp = now + expiration;

        let claims = Claims {
            sub: subject.to_string(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type,
        };

        let encoding_key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &encoding_key).map_err(ServerError::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_subject_round_trip() {
        let auth = AuthService::new("secret".to_string(), 24, 30);

        let access_token = auth.create_access_token("dj@example.com").unwrap();
        assert_eq!(auth.verify_access_token(&access_token).unwrap(), "dj@example.com");

        let refresh_token = auth.create_refresh_token("dj@example.com").unwrap();
        assert_eq!(auth.verify_refresh_token(&refresh_token).unwrap(), "dj@example.com");
    }

    #[test]
    fn test_token_type_validation() {
        let auth = AuthService::new("secret".to_string(), 24, 30);

        let access_token = auth.create_access_token("a@example.com").unwrap();
        assert!(auth.verify_refresh_token(&access_token).is_err());

        let refresh_token = auth.create_refresh_token("a@example.com").unwrap();
        assert!(auth.verify_access_token(&refresh_token).is_err());
    }

    #[test]
    fn test_foreign_secret_is_rejected() {
        let ours = AuthService::new("secret".to_string(), 24, 30);
        let theirs = AuthService::new("other".to_string(), 24, 30);

        let token = theirs.create_access_token("a@example.com").unwrap();
        assert!(ours.verify_access_token(&token).is_err());
    }
}
