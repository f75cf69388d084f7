//! Bearer-token access checks.
//!
//! Tokens are HS256 JWTs whose `permissions` claim lists granted permission
//! names. The schema pages require a single configured permission.

use crate::domain::config::JwtConfig;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

#[atlas_derive::atlas_error]
pub enum AccessError {
    /// No usable credentials were presented.
    #[error("Missing credentials{}: {message}", format_context(.context))]
    MissingToken { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// The token failed signature, expiry, issuer or audience validation.
    #[error("Invalid token{}: {source}", format_context(.context))]
    InvalidToken { source: jsonwebtoken::errors::Error, context: Option<Cow<'static, str>> },

    /// The token is valid but does not grant the required permission.
    #[error("Permission denied{}: {message}", format_context(.context))]
    Forbidden { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    pub sub: String,
    pub iss: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub exp: u64,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl AccessClaims {
    #[must_use]
    pub fn grants(&self, permission: &str) -> bool {
        self.permissions.iter().any(|granted| granted == permission)
    }
}

/// Validates (and, for tooling and tests, issues) access tokens.
#[derive(Clone)]
pub struct AccessValidator {
    issuer: String,
    audience: Option<String>,
    decoding: DecodingKey,
    encoding: EncodingKey,
    validation: Validation,
}

impl fmt::Debug for AccessValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessValidator")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

impl AccessValidator {
    #[must_use]
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.leeway = config.clock_skew_seconds;
        match &config.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        Self {
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            validation,
        }
    }

    /// Decodes and validates a raw token.
    ///
    /// # Errors
    /// Returns [`AccessError::InvalidToken`] on any validation failure.
    pub fn validate(&self, token: &str) -> Result<AccessClaims, AccessError> {
        decode::<AccessClaims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|source| {
                let reason = match source.kind() {
                    ErrorKind::ExpiredSignature => "token expired",
                    ErrorKind::InvalidSignature => "signature mismatch",
                    ErrorKind::InvalidIssuer => "unexpected issuer",
                    ErrorKind::InvalidAudience => "unexpected audience",
                    _ => "malformed token",
                };
                AccessError::InvalidToken { source, context: Some(reason.into()) }
            })
    }

    /// Validates an `Authorization` header value and checks `permission`.
    ///
    /// # Errors
    /// * [`AccessError::MissingToken`] when the header is absent or not a bearer token.
    /// * [`AccessError::InvalidToken`] when validation fails.
    /// * [`AccessError::Forbidden`] when the permission is not granted.
    pub fn authorize(
        &self,
        authorization: Option<&str>,
        permission: &str,
    ) -> Result<AccessClaims, AccessError> {
        let token = authorization
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| AccessError::MissingToken {
                message: "expected `Authorization: Bearer <token>`".into(),
                context: None,
            })?;

        let claims = self.validate(token)?;
        if !claims.grants(permission) {
            return Err(AccessError::Forbidden {
                message: format!("'{}' lacks '{permission}'", claims.sub).into(),
                context: None,
            });
        }
        Ok(claims)
    }

    /// Signs a token for `subject` with the given permissions, valid for `ttl_seconds`.
    ///
    /// # Errors
    /// Returns [`AccessError::InvalidToken`] if encoding fails.
    pub fn issue(
        &self,
        subject: &str,
        permissions: &[&str],
        ttl_seconds: u64,
    ) -> Result<String, AccessError> {
        let claims = AccessClaims {
            sub: subject.to_owned(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            exp: jsonwebtoken::get_current_timestamp() + ttl_seconds,
            permissions: permissions.iter().map(|p| (*p).to_owned()).collect(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .context("Signing access token")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PERMISSION: &str = "schema_browser.can_access_schema_browser";

    fn validator() -> AccessValidator {
        AccessValidator::new(&JwtConfig { secret: "test-secret".to_owned(), ..JwtConfig::default() })
    }

    #[test]
    fn issued_token_round_trips() {
        let v = validator();
        let token = v.issue("alice", &[PERMISSION], 300).unwrap();

        let claims = v.authorize(Some(&format!("Bearer {token}")), PERMISSION).unwrap();
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.iss, "atlas");
    }

    #[test]
    fn missing_header_is_rejected() {
        let err = validator().authorize(None, PERMISSION).unwrap_err();
        assert!(matches!(err, AccessError::MissingToken { .. }));

        let err = validator().authorize(Some("Basic abc"), PERMISSION).unwrap_err();
        assert!(matches!(err, AccessError::MissingToken { .. }));
    }

    #[test]
    fn token_without_permission_is_forbidden() {
        let v = validator();
        let token = v.issue("bob", &["other.permission"], 300).unwrap();

        let err = v.authorize(Some(&format!("Bearer {token}")), PERMISSION).unwrap_err();
        assert!(matches!(err, AccessError::Forbidden { .. }));
    }

    #[test]
    fn foreign_signature_is_invalid() {
        let other =
            AccessValidator::new(&JwtConfig { secret: "other".to_owned(), ..JwtConfig::default() });
        let token = other.issue("eve", &[PERMISSION], 300).unwrap();

        let err = validator().authorize(Some(&format!("Bearer {token}")), PERMISSION).unwrap_err();
        assert!(matches!(err, AccessError::InvalidToken { .. }));
    }
}
