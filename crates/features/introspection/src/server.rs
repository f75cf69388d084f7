//! HTTP routes of the schema browser.
//!
//! Every route is served twice: at its plain path and under a `/{lang}`
//! prefix that selects the response locale. Only the plain paths are listed
//! in the `OpenAPI` document.

use crate::model::{AppModels, Application, ModelDetail};
use crate::{Introspection, IntrospectionError, SchemaBrowser};
use atlas_derive::api_handler;
use atlas_kernel::domain::constants::SCHEMA_TAG;
use atlas_kernel::server::{ApiError, ApiState, ErrorResponse, Locale, RequirePermission};
use axum::Json;
use axum::extract::{Path, State};
use axum::routing::get;
use serde::Deserialize;
use tracing::{debug, error};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

impl From<IntrospectionError> for ApiError {
    fn from(err: IntrospectionError) -> Self {
        match err {
            IntrospectionError::NotFound { message, .. } => {
                debug!(%message, "Schema lookup miss");
                Self::NotFound { message, context: None }
            },
            other => {
                error!(error = %other, "Schema browser failure");
                Self::Internal { message: "Schema browser failure".into(), context: None }
            },
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AppPath {
    app_label: String,
}

#[derive(Debug, Deserialize)]
pub struct ModelPath {
    app_label: String,
    model_name: String,
}

fn browser(state: &ApiState) -> Result<&SchemaBrowser, ApiError> {
    state.try_get_slice::<Introspection>().map(|slice| &slice.browser).map_err(|err| {
        error!(error = %err, "Introspection slice not registered");
        ApiError::Internal { message: "Schema browser unavailable".into(), context: None }
    })
}

#[api_handler(
    get,
    path = "/",
    responses(
        (status = OK, description = "Project applications", body = Vec<Application>),
        (status = UNAUTHORIZED, body = ErrorResponse),
        (status = FORBIDDEN, body = ErrorResponse),
    ),
    tag = SCHEMA_TAG,
)]
pub async fn list_apps(
    _: RequirePermission,
    Locale(t): Locale,
    State(state): State<ApiState>,
) -> Result<Json<Vec<Application>>, ApiError> {
    Ok(Json(browser(&state)?.list_applications(&t)))
}

#[api_handler(
    get,
    path = "/apps/{app_label}/",
    params(("app_label" = String, Path, description = "Application label")),
    responses(
        (status = OK, description = "Application and its models", body = AppModels),
        (status = UNAUTHORIZED, body = ErrorResponse),
        (status = FORBIDDEN, body = ErrorResponse),
        (status = NOT_FOUND, body = ErrorResponse),
    ),
    tag = SCHEMA_TAG,
)]
pub async fn app_models(
    _: RequirePermission,
    Locale(t): Locale,
    State(state): State<ApiState>,
    Path(path): Path<AppPath>,
) -> Result<Json<AppModels>, ApiError> {
    Ok(Json(browser(&state)?.app_models(&path.app_label, &t)?))
}

#[api_handler(
    get,
    path = "/apps/{app_label}/models/{model_name}/",
    params(
        ("app_label" = String, Path, description = "Application label"),
        ("model_name" = String, Path, description = "Class name or normalized model name"),
    ),
    responses(
        (status = OK, description = "Model fields and reverse relations", body = ModelDetail),
        (status = UNAUTHORIZED, body = ErrorResponse),
        (status = FORBIDDEN, body = ErrorResponse),
        (status = NOT_FOUND, body = ErrorResponse),
    ),
    tag = SCHEMA_TAG,
)]
pub async fn model_detail(
    _: RequirePermission,
    Locale(t): Locale,
    State(state): State<ApiState>,
    Path(path): Path<ModelPath>,
) -> Result<Json<ModelDetail>, ApiError> {
    Ok(Json(browser(&state)?.get_model_details(&path.app_label, &path.model_name, &t)?))
}

/// Schema browser routes, plain and locale-prefixed.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(list_apps))
        .routes(routes!(app_models))
        .routes(routes!(model_detail))
        .route("/{lang}/", get(list_apps))
        .route("/{lang}/apps/{app_label}/", get(app_models))
        .route("/{lang}/apps/{app_label}/models/{model_name}/", get(model_detail))
}
