//! HS256 JWT session validator.
//!
//! Tokens are issued by the account service with a shared secret. The
//! validator checks:
//!
//! - **Signature**: HMAC-SHA256 with the configured secret
//! - **Expiry (exp)**: Always required, with configurable leeway
//! - **Issuer (iss)** and **Audience (aud)**: Checked when configured
//!
//! The `sub` claim becomes the [`UserId`].

use async_trait::async_trait;
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::domain::foundation::{AuthError, AuthenticatedUser, UserId};
use crate::ports::SessionValidator;

/// JWT claims read from access tokens.
#[derive(Debug, Serialize, Deserialize)]
struct AccessClaims {
    /// Subject - the user ID
    sub: String,

    /// Expiry timestamp (Unix epoch seconds)
    exp: i64,

    #[serde(default)]
    iss: Option<String>,

    /// Audience - array or single string
    #[serde(default)]
    aud: Audience,

    #[serde(default)]
    email: Option<String>,
}

/// Audience can be a single string or array of strings in JWTs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
enum Audience {
    #[default]
    None,
    Single(String),
    Multiple(Vec<String>),
}

/// Validates HS256 bearer tokens.
pub struct JwtSessionValidator {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionValidator {
    /// Creates a validator that checks signature and expiry only.
    pub fn new(secret: &SecretString) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.validate_exp = true;
        validation.validate_aud = false;

        Self {
            decoding_key: DecodingKey::from_secret(secret.expose_secret().as_bytes()),
            validation,
        }
    }

    /// Builds a validator from the auth configuration section.
    pub fn from_config(config: &AuthConfig) -> Self {
        let mut validator = Self::new(&config.jwt_secret).with_leeway(config.leeway_secs);
        if let Some(issuer) = &config.jwt_issuer {
            validator = validator.with_issuer(issuer);
        }
        if let Some(audience) = &config.jwt_audience {
            validator = validator.with_audience(audience);
        }
        validator
    }

    /// Requires the `iss` claim to match.
    pub fn with_issuer(mut self, issuer: &str) -> Self {
        self.validation.set_issuer(&[issuer]);
        self
    }

    /// Requires the `aud` claim to contain `audience`.
    pub fn with_audience(mut self, audience: &str) -> Self {
        self.validation.set_audience(&[audience]);
        self.validation.validate_aud = true;
        self
    }

    /// Clock skew allowance for `exp`, in seconds.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.validation.leeway = leeway_secs;
        self
    }
}

#[async_trait]
impl SessionValidator for JwtSessionValidator {
    async fn validate(&self, token: &str) -> Result<AuthenticatedUser, AuthError> {
        let token_data =
            decode::<AccessClaims>(token, &self.decoding_key, &self.validation).map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => {
                        tracing::debug!("Token expired");
                        AuthError::TokenExpired
                    }
                    ErrorKind::InvalidIssuer => {
                        tracing::warn!("Invalid issuer in token");
                        AuthError::InvalidToken
                    }
                    ErrorKind::InvalidAudience => {
                        tracing::warn!("Invalid audience in token");
                        AuthError::InvalidToken
                    }
                    _ => {
                        tracing::debug!("Token validation failed: {}", e);
                        AuthError::InvalidToken
                    }
                }
            })?;
        let claims = token_data.claims;

        let user_id = UserId::new(&claims.sub).map_err(|_| {
            tracing::warn!("Invalid subject in token");
            AuthError::InvalidToken
        })?;

        Ok(AuthenticatedUser::new(user_id, claims.email))
    }
}

impl std::fmt::Debug for JwtSessionValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSessionValidator")
            .field("issuer", &self.validation.iss)
            .field("audience", &self.validation.aud)
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    const SECRET: &str = "test-secret-that-is-at-least-32-bytes-long";

    fn secret() -> SecretString {
        SecretString::new(SECRET.to_string())
    }

    fn token(claims: serde_json::Value, key: &str) -> String {
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(key.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    // ══════════════════════════════════════════════════════════════
    // Happy Path
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn valid_token_yields_subject() {
        let validator = JwtSessionValidator::new(&secret());
        let t = token(
            serde_json::json!({ "sub": "user-42", "exp": future_exp(), "email": "a@b.c" }),
            SECRET,
        );

        let user = validator.validate(&t).await.unwrap();

        assert_eq!(user.id.as_str(), "user-42");
        assert_eq!(user.email.as_deref(), Some("a@b.c"));
    }

    #[tokio::test]
    async fn email_claim_is_optional() {
        let validator = JwtSessionValidator::new(&secret());
        let t = token(serde_json::json!({ "sub": "user-42", "exp": future_exp() }), SECRET);

        let user = validator.validate(&t).await.unwrap();

        assert!(user.email.is_none());
    }

    #[tokio::test]
    async fn matching_issuer_and_audience_accepted() {
        let validator = JwtSessionValidator::new(&secret())
            .with_issuer("https://accounts.example.com")
            .with_audience("pro-api");
        let t = token(
            serde_json::json!({
                "sub": "user-1",
                "exp": future_exp(),
                "iss": "https://accounts.example.com",
                "aud": ["web", "pro-api"]
            }),
            SECRET,
        );

        assert!(validator.validate(&t).await.is_ok());
    }

    // ══════════════════════════════════════════════════════════════
    // Rejections
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn wrong_secret_is_invalid() {
        let validator = JwtSessionValidator::new(&secret());
        let t = token(
            serde_json::json!({ "sub": "user-1", "exp": future_exp() }),
            "another-secret-that-is-at-least-32-bytes",
        );

        assert_eq!(validator.validate(&t).await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn expired_token_is_expired() {
        let validator = JwtSessionValidator::new(&secret());
        let exp = chrono::Utc::now().timestamp() - 3600;
        let t = token(serde_json::json!({ "sub": "user-1", "exp": exp }), SECRET);

        assert_eq!(validator.validate(&t).await, Err(AuthError::TokenExpired));
    }

    #[tokio::test]
    async fn missing_exp_is_invalid() {
        let validator = JwtSessionValidator::new(&secret());
        let t = token(serde_json::json!({ "sub": "user-1" }), SECRET);

        assert_eq!(validator.validate(&t).await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn wrong_issuer_is_invalid() {
        let validator = JwtSessionValidator::new(&secret()).with_issuer("https://good.example.com");
        let t = token(
            serde_json::json!({ "sub": "user-1", "exp": future_exp(), "iss": "https://evil.example.com" }),
            SECRET,
        );

        assert_eq!(validator.validate(&t).await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn wrong_audience_is_invalid() {
        let validator = JwtSessionValidator::new(&secret()).with_audience("pro-api");
        let t = token(
            serde_json::json!({ "sub": "user-1", "exp": future_exp(), "aud": "other-api" }),
            SECRET,
        );

        assert_eq!(validator.validate(&t).await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn blank_subject_is_invalid() {
        let validator = JwtSessionValidator::new(&secret());
        let t = token(serde_json::json!({ "sub": "  ", "exp": future_exp() }), SECRET);

        assert_eq!(validator.validate(&t).await, Err(AuthError::InvalidToken));
    }

    #[tokio::test]
    async fn garbage_is_invalid() {
        let validator = JwtSessionValidator::new(&secret());
        assert_eq!(
            validator.validate("not.a.jwt").await,
            Err(AuthError::InvalidToken)
        );
    }
}
