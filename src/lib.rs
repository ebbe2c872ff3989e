use serde::{Deserialize, Serialize};
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

pub mod catalog;
pub mod gallery;
pub mod startup_checks;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub app: AppConfig,
    pub gallery: GalleryConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub name: String,
    pub log_level: String,
}

/// Where photos are listed from: the catalog tables or the folder itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingSource {
    Catalog,
    #[default]
    Directory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GalleryConfig {
    pub assets_directory: PathBuf,
    pub galleries_subdirectory: String,
    pub before_after_subdirectory: String,
    /// Folder names under the galleries directory that are not categories.
    pub excluded_directories: Vec<String>,
    pub url_prefix: String,
    pub page_size: usize,
    pub listing_source: ListingSource,
    pub scan_on_startup: bool,
    /// Folder name -> display name overrides.
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            name: "Folio".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            assets_directory: PathBuf::from("attached_assets"),
            galleries_subdirectory: "galleries".to_string(),
            before_after_subdirectory: "before_and_after".to_string(),
            excluded_directories: vec![
                "before_and_after".to_string(),
                "facebook_posts_image".to_string(),
            ],
            url_prefix: "/assets".to_string(),
            page_size: gallery::DEFAULT_PAGE_SIZE,
            listing_source: ListingSource::default(),
            scan_on_startup: true,
            aliases: BTreeMap::new(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("folio.db"),
        }
    }
}

impl GalleryConfig {
    pub fn galleries_directory(&self) -> PathBuf {
        self.assets_directory.join(&self.galleries_subdirectory)
    }

    pub fn before_after_directory(&self) -> PathBuf {
        self.assets_directory.join(&self.before_after_subdirectory)
    }

    pub fn is_excluded(&self, folder: &str) -> bool {
        self.excluded_directories
            .iter()
            .any(|excluded| excluded.eq_ignore_ascii_case(folder))
    }
}

impl Config {
    /// Reads a TOML config file, falling back to defaults when it is absent.
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        if !path.exists() {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml_edit::de::from_str::<Config>(&content)?)
    }
}

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

#[derive(Clone)]
pub struct AppState {
    pub gallery: gallery::SharedGallery,
    pub config: Config,
}

impl AppState {
    /// Opens the catalog database and builds the gallery context.
    pub fn open(config: Config) -> Result<Self, catalog::CatalogError> {
        let catalog = catalog::Catalog::open(&config.database.path)?;
        Ok(Self::with_catalog(config, catalog))
    }

    pub fn with_catalog(config: Config, catalog: catalog::Catalog) -> Self {
        let gallery = Arc::new(gallery::Gallery::new(config.gallery.clone(), catalog));
        Self { gallery, config }
    }

    pub async fn close(&self) -> Result<(), gallery::GalleryError> {
        self.gallery.close().await
    }
}

pub fn create_app(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any);

    Router::new()
        .route("/api/categories", get(gallery::categories_handler))
        .route("/api/photos", get(gallery::photos_handler))
        .route("/api/photos/{id}/like", post(gallery::toggle_like_handler))
        .route(
            "/api/photos/{id}/recommendations",
            get(gallery::recommendations_handler).post(gallery::add_recommendation_handler),
        )
        .route("/api/scan", post(gallery::scan_handler))
        .route("/api/before-after", get(gallery::before_after_handler))
        .route("/version", get(gallery::version_handler))
        .route(
            "/assets/{category}/{filename}",
            get(gallery::asset_handler),
        )
        .route(
            "/galleries/{category}/{filename}",
            get(gallery::asset_handler),
        )
        .route(
            "/download/{category}/{filename}",
            get(gallery::download_handler),
        )
        .route(
            "/photography/attached_assets/galleries",
            get(gallery::photos_handler),
        )
        .route(
            "/photography/attached_assets/galleries/scan",
            post(gallery::scan_handler),
        )
        .route(
            "/photography/attached_assets/galleries/{category}/{filename}",
            get(gallery::asset_handler),
        )
        .layer(CatchPanicLayer::custom(gallery::panic_response))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let method = request.method();
                    let uri = request.uri();
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched_path| matched_path.as_str());

                    tracing::info_span!(
                        "http_request",
                        method = %method,
                        uri = %uri,
                        matched_path,
                    )
                })
                .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                    let headers = request.headers();
                    let fingerprint = headers
                        .get(gallery::FINGERPRINT_HEADER)
                        .map(|_| "present")
                        .unwrap_or("-");
                    let user_agent = headers
                        .get("user-agent")
                        .and_then(|h| h.to_str().ok())
                        .unwrap_or("-");

                    tracing::info!(
                        target: "access_log",
                        method = %request.method(),
                        path = %request.uri().path(),
                        query = ?request.uri().query(),
                        user_agent = %user_agent,
                        fingerprint = %fingerprint,
                        "request"
                    );
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        let size = response
                            .headers()
                            .get("content-length")
                            .and_then(|h| h.to_str().ok())
                            .unwrap_or("-");

                        tracing::info!(
                            target: "access_log",
                            status = %response.status(),
                            size = %size,
                            latency_ms = %latency.as_millis(),
                            "response"
                        );
                    },
                ),
        )
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let catalog = catalog::Catalog::open_in_memory().unwrap();
        AppState::with_catalog(Config::default(), catalog)
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: Config = toml_edit::de::from_str(
            r#"
            [gallery]
            assets_directory = "/srv/photos"
            listing_source = "catalog"

            [gallery.aliases]
            Women = "Femininity"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.gallery.listing_source, ListingSource::Catalog);
        assert_eq!(config.gallery.page_size, 20);
        assert_eq!(
            config.gallery.galleries_directory(),
            PathBuf::from("/srv/photos/galleries")
        );
        assert_eq!(
            config.gallery.aliases.get("Women").map(String::as_str),
            Some("Femininity")
        );
        assert!(config.gallery.is_excluded("Before_And_After"));
        assert!(!config.gallery.is_excluded("Kids"));
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let response = create_app(test_state())
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/api/photos/1/like")
                    .header(header::ORIGIN, "https://example.com")
                    .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[tokio::test]
    async fn test_closed_catalog_returns_error_envelope() {
        let state = test_state();
        state.close().await.unwrap();

        let response = create_app(state)
            .oneshot(
                Request::builder()
                    .uri("/api/categories")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
