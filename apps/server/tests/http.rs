use atlas::domain::config::ApiConfig;
use atlas::kernel::i18n::Catalog;
use atlas_server::{Server, router};
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::header::AUTHORIZATION;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::fs;
use tempfile::TempDir;
use tower::ServiceExt;

const PERMISSION: &str = "schema_browser.can_access_schema_browser";

const MANIFEST: &str = r#"{
  "apps": [
    {
      "label": "catalog",
      "name": "shop.catalog",
      "verbose_name": "Catalog",
      "path": "catalog",
      "models": [
        {
          "name": "Product",
          "doc": "A sellable item.",
          "fields": [
            { "name": "sku", "kind": "CharField", "help_text": "Stock code" },
            { "name": "category", "kind": "ForeignKey", "internal_type": "ForeignKey",
              "is_relation": true, "related_model": "catalog.Category" }
          ]
        },
        {
          "name": "Category",
          "fields": [
            { "name": "title", "kind": "CharField" },
            { "name": "product", "kind": "ManyToOneRel", "auto_created": true, "concrete": false,
              "is_relation": true, "related_model": "catalog.Product", "remote_field": "category",
              "accessor_name": "products" }
          ]
        }
      ]
    },
    { "label": "auth", "name": "framework.auth", "path": "/usr/lib/framework/auth",
      "models": [ { "name": "User" } ] }
  ]
}"#;

struct TestApp {
    _root: TempDir,
    router: Router,
    server: Server,
}

impl TestApp {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("catalog")).unwrap();
        let manifest = root.path().join("schema.json");
        fs::write(&manifest, MANIFEST).unwrap();

        let mut cfg = ApiConfig::default();
        cfg.schema.manifest = manifest;
        cfg.schema.project_root = root.path().to_path_buf();
        cfg.security.jwt.secret = "http-test-secret".to_owned();

        let catalog = Catalog::empty("en").with_messages(
            "fr",
            [
                ("[No description.]", "[Aucune description.]"),
                ("[App not found: %(app_label)s]", "[Application introuvable : %(app_label)s]"),
                ("[Authentication required.]", "[Authentification requise.]"),
                ("[Access denied: %(permission)s]", "[Accès refusé : %(permission)s]"),
            ],
        );

        let server = Server::builder().config(cfg).catalog(catalog).build().unwrap();
        let router = router::init(server.state().clone());
        Self { _root: root, router, server }
    }

    fn token(&self, permissions: &[&str]) -> String {
        self.server.state().access.issue("tester", permissions, 300).unwrap()
    }

    async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut request = Request::builder().uri(uri);
        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }

        let response =
            self.router.clone().oneshot(request.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, body)
    }
}

#[tokio::test]
async fn health_needs_no_token() {
    let app = TestApp::new();
    let (status, body) = app.get("/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "up");
    assert_eq!(body["locales"], serde_json::json!(["en", "fr"]));
}

#[tokio::test]
async fn missing_or_bad_token_is_unauthorized() {
    let app = TestApp::new();

    let (status, body) = app.get("/", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["message"], "Authentication required.");

    let (status, _) = app.get("/", Some("not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.get("/fr/", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentification requise.");
}

#[tokio::test]
async fn token_is_checked_before_the_locale() {
    let app = TestApp::new();

    let (status, body) = app.get("/de/", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Authentication required.");

    let token = app.token(&["billing.view"]);
    let (status, body) = app.get("/de/apps/catalog/", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], format!("Access denied: {PERMISSION}"));
}

#[tokio::test]
async fn token_without_permission_is_forbidden() {
    let app = TestApp::new();
    let token = app.token(&["billing.view"]);

    let (status, body) = app.get("/apps/catalog/", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
    assert_eq!(body["message"], format!("Access denied: {PERMISSION}"));

    let (status, body) = app.get("/fr/apps/catalog/", Some(&token)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], format!("Accès refusé : {PERMISSION}"));
}

#[tokio::test]
async fn lists_project_applications() {
    let app = TestApp::new();
    let token = app.token(&[PERMISSION]);

    let (status, body) = app.get("/", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);

    let apps = body.as_array().unwrap();
    assert_eq!(apps.len(), 1);
    assert_eq!(apps[0]["label"], "catalog");
    assert_eq!(apps[0]["module"], "shop.catalog");
    assert_eq!(apps[0]["models_count"], 2);
    assert_eq!(apps[0]["has_description"], false);
}

#[tokio::test]
async fn app_page_lists_models() {
    let app = TestApp::new();
    let token = app.token(&[PERMISSION]);

    let (status, body) = app.get("/apps/catalog/", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["app"]["label"], "catalog");

    let names: Vec<_> = body["models"].as_array().unwrap().iter().map(|m| m["name"].clone()).collect();
    assert_eq!(names, ["Category", "Product"]);
    assert_eq!(body["models"][0]["description"], "No description.");
}

#[tokio::test]
async fn model_page_has_fields_and_reverse_relations() {
    let app = TestApp::new();
    let token = app.token(&[PERMISSION]);

    let (status, body) = app.get("/apps/catalog/models/product/", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model_label"], "catalog.Product");

    let category = &body["fields"][0];
    assert_eq!(category["name"], "category");
    assert_eq!(category["type"], "ForeignKey");
    assert_eq!(category["is_relation"], true);
    assert_eq!(category["related_target"]["label"], "catalog.Category");
    assert_eq!(body["fields"][1]["description"], "Stock code");

    let (_, body) = app.get("/apps/catalog/models/Category/", Some(&token)).await;
    let reverse = &body["reverse_relations"][0];
    assert_eq!(reverse["name"], "products");
    assert_eq!(reverse["source_model_label"], "catalog.Product");
    assert_eq!(reverse["description"], "Field category of model catalog.Product");
}

#[tokio::test]
async fn unknown_app_or_model_is_localized_not_found() {
    let app = TestApp::new();
    let token = app.token(&[PERMISSION]);

    let (status, body) = app.get("/apps/ghost/", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "App not found: ghost");

    let (status, body) = app.get("/fr/apps/ghost/", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Application introuvable : ghost");

    let (status, body) = app.get("/apps/auth/", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "App not found: auth");

    let (status, body) = app.get("/apps/catalog/models/Prod/", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Model not found: catalog.Prod");
}

#[tokio::test]
async fn locale_prefix_switches_catalog() {
    let app = TestApp::new();
    let token = app.token(&[PERMISSION]);

    let (status, body) = app.get("/fr/apps/catalog/", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["models"][0]["description"], "Aucune description.");

    let (status, body) = app.get("/de/", Some(&token)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Unknown language: de");
}
