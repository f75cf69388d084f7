use crate::i18n::Translator;
use crate::security::access::AccessError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::borrow::Cow;

/// JSON body of every error response.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable kind (`not_found`, `forbidden`, ...)
    pub error: &'static str,
    /// Human-readable, localized message
    pub message: String,
}

/// Errors surfaced to HTTP clients.
#[atlas_derive::atlas_error]
pub enum ApiError {
    #[error("Unauthorized{}: {message}", format_context(.context))]
    Unauthorized { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Forbidden{}: {message}", format_context(.context))]
    Forbidden { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Not found{}: {message}", format_context(.context))]
    NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    #[error("Internal error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

impl ApiError {
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound { message: message.into(), context: None }
    }

    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            Self::Forbidden { .. } => StatusCode::FORBIDDEN,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "unauthorized",
            Self::Forbidden { .. } => "forbidden",
            Self::NotFound { .. } => "not_found",
            Self::Internal { .. } => "internal_error",
        }
    }

    fn message(&self) -> &str {
        match self {
            Self::Unauthorized { message, .. }
            | Self::Forbidden { message, .. }
            | Self::NotFound { message, .. }
            | Self::Internal { message, .. } => message.as_ref(),
        }
    }
}

impl ApiError {
    /// Maps a failed access check to a localized 401 (no valid token) or 403
    /// (token without `permission`).
    pub fn access_denied(err: &AccessError, permission: &str, t: &Translator) -> Self {
        match err {
            AccessError::Forbidden { .. } => Self::Forbidden {
                message: t.tr_with("[Access denied: %(permission)s]", &[("permission", permission)]).into(),
                context: None,
            },
            AccessError::MissingToken { .. } | AccessError::InvalidToken { .. } => {
                Self::Unauthorized { message: t.tr("[Authentication required.]").into(), context: None }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse { error: self.kind(), message: self.message().to_owned() };
        (status, Json(body)).into_response()
    }
}
