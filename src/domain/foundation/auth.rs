//! Authentication types for the domain layer.
//!
//! `AuthenticatedUser` is what the Identity Resolver produces from a bearer
//! credential. It carries no provider-specific data; any token scheme can
//! populate it through the `SessionValidator` port.

use super::UserId;
use thiserror::Error;

/// Authenticated caller extracted from a validated bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// The unique user identifier (`sub` claim).
    pub id: UserId,

    /// Email address, when the token carries one.
    pub email: Option<String>,
}

impl AuthenticatedUser {
    pub fn new(id: UserId, email: Option<String>) -> Self {
        Self { id, email }
    }
}

/// Reasons a bearer credential was not accepted.
///
/// Every variant surfaces to clients as `Unauthenticated`; the split exists
/// for logging and for clients that refresh on expiry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No credential was presented.
    #[error("Missing bearer token")]
    MissingToken,

    /// The token is malformed or has an invalid signature or claims.
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token has expired (separate from InvalidToken for specific handling).
    #[error("Token expired")]
    TokenExpired,
}

impl AuthError {
    /// Stable machine-readable code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "MISSING_TOKEN",
            AuthError::InvalidToken => "INVALID_TOKEN",
            AuthError::TokenExpired => "TOKEN_EXPIRED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticated_user_holds_identity() {
        let user = AuthenticatedUser::new(
            UserId::new("user-123").unwrap(),
            Some("user@example.com".to_string()),
        );
        assert_eq!(user.id.as_str(), "user-123");
        assert_eq!(user.email.as_deref(), Some("user@example.com"));
    }

    #[test]
    fn auth_error_codes_are_distinct() {
        assert_eq!(AuthError::MissingToken.code(), "MISSING_TOKEN");
        assert_eq!(AuthError::InvalidToken.code(), "INVALID_TOKEN");
        assert_eq!(AuthError::TokenExpired.code(), "TOKEN_EXPIRED");
    }

    #[test]
    fn auth_error_display() {
        assert_eq!(AuthError::TokenExpired.to_string(), "Token expired");
    }
}
