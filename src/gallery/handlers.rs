use super::{
    BeforeAfterSet, Disposition, GalleryError, LikeResponse, PageRequest, PhotosQuery,
    RecommendationRequest, RecommendationResponse, ScanQuery, ScanResponse, VersionResponse,
};
use crate::{
    AppState,
    catalog::{CategorySummary, Photo},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Response},
};
use std::path::{Component, PathBuf};
use tracing::info;

pub const FINGERPRINT_HEADER: &str = "x-browser-fingerprint";

fn fingerprint(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(FINGERPRINT_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn parse_photo_id(raw: &str) -> Result<i64, GalleryError> {
    raw.trim()
        .parse()
        .map_err(|_| GalleryError::BadRequest("Invalid photo id".to_string()))
}

/// Accepts only plain relative paths below the assets root.
fn parse_scan_path(raw: &str) -> Result<PathBuf, GalleryError> {
    let path = PathBuf::from(raw.trim());
    let plain = !path.as_os_str().is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    if plain {
        Ok(path)
    } else {
        Err(GalleryError::BadRequest("Invalid scan path".to_string()))
    }
}

#[axum::debug_handler]
pub async fn categories_handler(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<CategorySummary>>, GalleryError> {
    let summaries = app_state.gallery.catalog().category_summaries().await?;
    Ok(Json(summaries))
}

#[axum::debug_handler]
pub async fn photos_handler(
    State(app_state): State<AppState>,
    Query(query): Query<PhotosQuery>,
    headers: HeaderMap,
) -> Result<Json<Vec<Photo>>, GalleryError> {
    let gallery = &app_state.gallery;
    let page = PageRequest::parse(
        query.page.as_deref(),
        query.page_size.as_deref(),
        gallery.config().page_size,
    );

    let photos = gallery
        .list_photos(query.category.as_deref(), page, fingerprint(&headers))
        .await?;
    Ok(Json(photos))
}

#[axum::debug_handler]
pub async fn toggle_like_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<LikeResponse>, GalleryError> {
    let id = parse_photo_id(&id)?;
    let fingerprint = fingerprint(&headers)
        .ok_or_else(|| GalleryError::BadRequest("Browser fingerprint required".to_string()))?;

    let liked = app_state
        .gallery
        .catalog()
        .toggle_like(id, fingerprint)
        .await?
        .ok_or_else(|| GalleryError::not_found("Photo not found"))?;

    Ok(Json(LikeResponse { liked }))
}

#[axum::debug_handler]
pub async fn scan_handler(
    State(app_state): State<AppState>,
    Query(query): Query<ScanQuery>,
) -> Result<Json<ScanResponse>, GalleryError> {
    let root = query.path.as_deref().map(parse_scan_path).transpose()?;

    info!("Scan requested for {:?}", root);
    let summary = app_state.gallery.scan(root.as_deref()).await?;

    Ok(Json(ScanResponse {
        message: "Successfully scanned and processed all images".to_string(),
        categories: summary.categories,
        photos: summary.photos,
    }))
}

#[axum::debug_handler]
pub async fn asset_handler(
    State(app_state): State<AppState>,
    Path((category, file_name)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, GalleryError> {
    app_state
        .gallery
        .serve_asset(&category, &file_name, &headers, Disposition::Inline)
        .await
}

#[axum::debug_handler]
pub async fn download_handler(
    State(app_state): State<AppState>,
    Path((category, file_name)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Response, GalleryError> {
    app_state
        .gallery
        .serve_asset(&category, &file_name, &headers, Disposition::Attachment)
        .await
}

#[axum::debug_handler]
pub async fn recommendations_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Photo>>, GalleryError> {
    let id = parse_photo_id(&id)?;
    let catalog = app_state.gallery.catalog();
    if catalog.photo(id).await?.is_none() {
        return Err(GalleryError::not_found("Photo not found"));
    }
    Ok(Json(catalog.recommendations(id).await?))
}

#[axum::debug_handler]
pub async fn add_recommendation_handler(
    State(app_state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<RecommendationRequest>,
) -> Result<Json<RecommendationResponse>, GalleryError> {
    let id = parse_photo_id(&id)?;
    if id == request.recommended_photo_id {
        return Err(GalleryError::BadRequest(
            "A photo cannot recommend itself".to_string(),
        ));
    }

    let created = app_state
        .gallery
        .catalog()
        .add_recommendation(id, request.recommended_photo_id)
        .await?;
    Ok(Json(RecommendationResponse { created }))
}

#[axum::debug_handler]
pub async fn before_after_handler(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<BeforeAfterSet>>, GalleryError> {
    Ok(Json(app_state.gallery.before_after_sets().await?))
}

pub async fn version_handler() -> impl IntoResponse {
    (
        [
            (header::CACHE_CONTROL, "no-cache, no-store, must-revalidate"),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        Json(VersionResponse {
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
