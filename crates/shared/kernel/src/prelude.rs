pub use crate::domain::config::ApiConfig;
pub use crate::domain::registry::{FeatureSlice, InitializedSlice};
pub use crate::i18n::{Catalog, Translator};
pub use crate::security::access::{AccessClaims, AccessValidator};
#[cfg(feature = "server")]
pub use crate::server::{ApiError, ApiState, Locale, RequirePermission};
