use super::{ApiError, ApiState};
use crate::i18n::Translator;
use crate::security::access::{AccessClaims, AccessError};
use axum::extract::{FromRequestParts, RawPathParams};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::{debug, warn};

/// Name of the optional locale segment in route paths (`/{lang}/...`).
pub const LOCALE_PARAM: &str = "lang";

/// The request's translator, chosen from the `{lang}` path segment.
///
/// Routes without the segment use the default locale; a segment that is not a
/// configured locale is a 404.
#[derive(Debug, Clone)]
pub struct Locale(pub Translator);

impl FromRequestParts<ApiState> for Locale {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        let requested = RawPathParams::from_request_parts(parts, state)
            .await
            .ok()
            .and_then(|params| {
                params.iter().find(|(key, _)| *key == LOCALE_PARAM).map(|(_, v)| v.to_owned())
            });

        match requested {
            None => Ok(Self(state.catalog.default_translator())),
            Some(code) if state.catalog.supports(&code) => {
                debug!(locale = %code, "Activated locale from path");
                Ok(Self(state.catalog.translator(&code)))
            },
            Some(code) => {
                let t = state.catalog.default_translator();
                Err(ApiError::not_found(t.tr_with("[Unknown language: %(lang)s]", &[("lang", &code)])))
            },
        }
    }
}

/// Guards a handler behind the configured schema permission.
///
/// Rejects with 401 when no valid bearer token is presented and with 403 when
/// the token does not grant the permission. The token is checked before the
/// locale, so an unknown `{lang}` segment only yields a 404 to authorized callers.
#[derive(Debug, Clone)]
pub struct RequirePermission(pub AccessClaims);

impl FromRequestParts<ApiState> for RequirePermission {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        let header = parts.headers.get(AUTHORIZATION).and_then(|value| value.to_str().ok());
        let permission = &state.config.security.permission;

        match state.access.authorize(header, permission) {
            Ok(claims) => {
                debug!(subject = %claims.sub, "Access granted");
                Ok(Self(claims))
            },
            Err(err) => {
                if matches!(err, AccessError::Forbidden { .. }) {
                    warn!(error = %err, permission = %permission, "Access denied");
                } else {
                    warn!(error = %err, "Authentication failed");
                }
                let t = match Locale::from_request_parts(parts, state).await {
                    Ok(Locale(t)) => t,
                    Err(_) => state.catalog.default_translator(),
                };
                Err(ApiError::access_denied(&err, permission, &t))
            },
        }
    }
}
