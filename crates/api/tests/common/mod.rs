#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use catalog_api::auth::jwt::{generate_access_token, JwtConfig};
use catalog_api::auth::password::hash_password;
use catalog_api::config::ServerConfig;
use catalog_api::router::build_app_router;
use catalog_api::state::AppState;
use catalog_core::assets::{AssetStore, LocalAssetStore};
use catalog_db::models::user::CreateUser;
use catalog_db::repositories::UserRepo;

/// PNG signature plus the start of an IHDR chunk; enough for format sniffing.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR\0\0\0\x01\0\0\0\x01";
/// JPEG SOI marker followed by a JFIF APP0 segment header.
pub const JPEG_BYTES: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0";
pub const PDF_BYTES: &[u8] = b"%PDF-1.4\n%test\n";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config(storage_root: PathBuf) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout: std::time::Duration::from_secs(30),
        storage_root,
        max_upload_bytes: 32 * 1024 * 1024,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            lifetime: chrono::Duration::minutes(60),
        },
    }
}

/// The application under test plus the temporary directory its asset store
/// writes into. The directory lives as long as this value.
pub struct TestApp {
    pub router: Router,
    pub config: ServerConfig,
    storage: tempfile::TempDir,
}

impl TestApp {
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Absolute path of a stored asset.
    pub fn asset_path(&self, relative: &str) -> PathBuf {
        self.storage.path().join(relative)
    }

    pub fn asset_exists(&self, relative: &str) -> bool {
        self.asset_path(relative).exists()
    }

    /// Every file under the storage root, relative to it.
    pub fn stored_files(&self) -> Vec<PathBuf> {
        fn walk(dir: &Path, root: &Path, out: &mut Vec<PathBuf>) {
            let Ok(entries) = std::fs::read_dir(dir) else {
                return;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    walk(&path, root, out);
                } else {
                    out.push(path.strip_prefix(root).unwrap().to_path_buf());
                }
            }
        }
        let mut files = Vec::new();
        walk(self.storage.path(), self.storage.path(), &mut files);
        files
    }

    /// A valid token for a freshly created user.
    pub async fn token(&self, pool: &PgPool) -> String {
        let email = format!("{}@test.com", uuid::Uuid::new_v4());
        let user = UserRepo::create(
            pool,
            &CreateUser {
                name: "Test User".to_string(),
                email,
                password_hash: hash_password("secret123").expect("hashing should succeed"),
            },
        )
        .await
        .expect("user creation should succeed");
        generate_access_token(user.id, &self.config.jwt).expect("token generation should succeed")
    }
}

/// Build the full application router, the same stack `main.rs` serves, backed
/// by a local asset store in a fresh temporary directory.
pub async fn build_test_app(pool: PgPool) -> TestApp {
    build_test_app_with(pool, |_| {}, local_store).await
}

pub fn local_store(root: &Path) -> Arc<dyn AssetStore> {
    Arc::new(LocalAssetStore::new(root))
}

/// Like [`build_test_app`], with `configure` applied to the config and the
/// asset store built by `make_store` over the temporary storage root.
pub async fn build_test_app_with(
    pool: PgPool,
    configure: impl FnOnce(&mut ServerConfig),
    make_store: impl FnOnce(&Path) -> Arc<dyn AssetStore>,
) -> TestApp {
    let storage = tempfile::tempdir().expect("tempdir should be created");
    let mut config = test_config(storage.path().to_path_buf());
    configure(&mut config);

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        storage: make_store(storage.path()),
    };

    TestApp {
        router: build_app_router(state, &config),
        config,
        storage,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.unwrap()
}

fn request(method: Method, uri: &str, token: Option<&str>) -> axum::http::request::Builder {
    let builder = Request::builder().method(method).uri(uri);
    match token {
        Some(token) => builder.header("authorization", format!("Bearer {token}")),
        None => builder,
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, None).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(
        app,
        request(Method::GET, uri, Some(token))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(
        app,
        request(Method::POST, uri, None)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(
        app,
        request(Method::POST, uri, Some(token))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(
        app,
        request(Method::PUT, uri, Some(token))
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(
        app,
        request(Method::DELETE, uri, Some(token))
            .body(Body::empty())
            .unwrap(),
    )
    .await
}

pub async fn post_multipart_auth(
    app: Router,
    uri: &str,
    form: MultipartForm,
    token: &str,
) -> Response<Body> {
    let (content_type, body) = form.finish();
    send(
        app,
        request(Method::POST, uri, Some(token))
            .header("content-type", content_type)
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and return the parsed body.
pub async fn expect_json(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    let actual = response.status();
    let json = body_json(response).await;
    assert_eq!(actual, status, "unexpected status, body: {json}");
    json
}

// ---------------------------------------------------------------------------
// Multipart bodies
// ---------------------------------------------------------------------------

const BOUNDARY: &str = "catalog-test-boundary";

/// Minimal `multipart/form-data` encoder for tests.
#[derive(Default)]
pub struct MultipartForm {
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content_type: &str, data: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"; \
                 filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(data);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    fn finish(mut self) -> (String, Vec<u8>) {
        self.body
            .extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        (format!("multipart/form-data; boundary={BOUNDARY}"), self.body)
    }
}

/// The required article fields.
pub fn article_form(external_id: &str) -> MultipartForm {
    MultipartForm::new()
        .text("external_id", external_id)
        .text("name", "Oak chair")
        .text("description", "Solid oak")
        .text("base_price", "49.90")
        .text("tax_category", "general")
        .text("tax_percentage", "21")
}
