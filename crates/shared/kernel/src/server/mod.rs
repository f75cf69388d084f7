//! Axum integration: shared state, error responses, request extractors and
//! the system routes.

mod error;
mod extract;
mod health;
pub mod router;
mod state;

pub use error::{ApiError, ErrorResponse};
pub use extract::{LOCALE_PARAM, Locale, RequirePermission};
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateInner};
