use super::{
    Gallery, GalleryError,
    naming::{EntryKind, find_entry, is_safe_segment},
};
use axum::{
    body::Body,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::{path::PathBuf, time::UNIX_EPOCH};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, error};

const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Inline,
    Attachment,
}

impl Gallery {
    /// Finds `{category}/{file_name}` on disk. The category's spaces become
    /// underscores; both segments are matched ignoring case. Category folders
    /// are looked up in the galleries directory, then in the assets root.
    pub async fn resolve_asset(&self, category: &str, file_name: &str) -> Option<PathBuf> {
        let folder = category.split_whitespace().collect::<Vec<_>>().join("_");
        if !is_safe_segment(&folder) || !is_safe_segment(file_name) {
            debug!("Rejected asset path {}/{}", category, file_name);
            return None;
        }

        for root in [
            self.config.galleries_directory(),
            self.config.assets_directory.clone(),
        ] {
            if let Some(dir) = find_entry(&root, &folder, EntryKind::Directory).await
                && let Some(path) = find_entry(&dir, file_name, EntryKind::File).await
            {
                return Some(path);
            }
        }
        None
    }

    pub async fn serve_asset(
        &self,
        category: &str,
        file_name: &str,
        request_headers: &HeaderMap,
        disposition: Disposition,
    ) -> Result<Response, GalleryError> {
        let not_found = || GalleryError::NotFound {
            message: "Image not found".to_string(),
            path: Some(format!("{category}/{file_name}")),
        };

        let Some(path) = self.resolve_asset(category, file_name).await else {
            debug!("Image not found: {}/{}", category, file_name);
            return Err(not_found());
        };

        let metadata = tokio::fs::metadata(&path).await.map_err(|e| {
            debug!("Failed to get metadata for {:?}: {}", path, e);
            not_found()
        })?;

        let mut builder = Response::builder()
            .header(header::CACHE_CONTROL, IMMUTABLE_CACHE)
            .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
            .header("cross-origin-resource-policy", "cross-origin")
            .header(header::VARY, "Accept-Encoding");

        if let Ok(modified) = metadata.modified()
            && let Ok(duration) = modified.duration_since(UNIX_EPOCH)
        {
            let etag = format!("\"{}-{}\"", duration.as_secs(), metadata.len());
            let fresh = request_headers
                .get(header::IF_NONE_MATCH)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|value| {
                    value
                        .split(',')
                        .map(str::trim)
                        .any(|candidate| candidate == etag || candidate == "*")
                });

            builder = builder
                .header(header::LAST_MODIFIED, httpdate::fmt_http_date(modified))
                .header(header::ETAG, &etag);

            if fresh {
                return Ok(finish(builder.status(StatusCode::NOT_MODIFIED), Body::empty()));
            }
        }

        let file = File::open(&path).await.map_err(|e| {
            debug!("Failed to open file {:?}: {}", path, e);
            not_found()
        })?;

        let content_type = mime_guess::from_path(&path)
            .first_or_octet_stream()
            .to_string();

        builder = builder
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type)
            .header(header::CONTENT_LENGTH, metadata.len())
            .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff");

        if disposition == Disposition::Attachment {
            let served_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .unwrap_or(file_name);
            if let Ok(value) =
                HeaderValue::from_str(&format!("attachment; filename=\"{served_name}\""))
            {
                builder = builder.header(header::CONTENT_DISPOSITION, value);
            }
        }

        Ok(finish(builder, Body::from_stream(ReaderStream::new(file))))
    }
}

fn finish(builder: axum::http::response::Builder, body: Body) -> Response {
    builder.body(body).unwrap_or_else(|e| {
        error!("Failed to build image response: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GalleryConfig, catalog::Catalog};
    use std::fs;
    use tempfile::TempDir;

    fn gallery_with_files() -> (TempDir, Gallery) {
        let temp_dir = TempDir::new().unwrap();
        let kids = temp_dir.path().join("galleries").join("Bat_Mitsva");
        fs::create_dir_all(&kids).unwrap();
        fs::write(kids.join("005.jpeg"), b"full").unwrap();
        let before_after = temp_dir.path().join("before_and_after");
        fs::create_dir_all(&before_after).unwrap();
        fs::write(before_after.join("Anna-1 Large.jpeg"), b"before").unwrap();

        let mut config = GalleryConfig::default();
        config.assets_directory = temp_dir.path().to_path_buf();
        (temp_dir, Gallery::new(config, Catalog::open_in_memory().unwrap()))
    }

    #[tokio::test]
    async fn test_resolve_ignores_case_and_spaces() {
        let (_temp_dir, gallery) = gallery_with_files();

        let path = gallery.resolve_asset("Bat Mitsva", "005.JPEG").await.unwrap();
        assert!(path.ends_with("Bat_Mitsva/005.jpeg"));
        assert!(gallery.resolve_asset("bat_mitsva", "005.jpeg").await.is_some());
        assert!(
            gallery
                .resolve_asset("before_and_after", "Anna-1 Large.jpeg")
                .await
                .is_some()
        );
        assert!(gallery.resolve_asset("Bat_Mitsva", "006.jpeg").await.is_none());
        assert!(gallery.resolve_asset("..", "005.jpeg").await.is_none());
    }

    #[tokio::test]
    async fn test_serve_sets_headers_and_revalidates() {
        let (_temp_dir, gallery) = gallery_with_files();

        let response = gallery
            .serve_asset("Bat_Mitsva", "005.jpeg", &HeaderMap::new(), Disposition::Inline)
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "image/jpeg");
        assert_eq!(headers[header::CACHE_CONTROL], IMMUTABLE_CACHE);
        assert_eq!(headers[header::CONTENT_LENGTH], "4");
        assert!(headers.get(header::CONTENT_DISPOSITION).is_none());
        let etag = headers[header::ETAG].clone();

        let mut conditional = HeaderMap::new();
        conditional.insert(header::IF_NONE_MATCH, etag);
        let cached = gallery
            .serve_asset("Bat_Mitsva", "005.jpeg", &conditional, Disposition::Inline)
            .await
            .unwrap();
        assert_eq!(cached.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_attachment_and_miss() {
        let (_temp_dir, gallery) = gallery_with_files();

        let download = gallery
            .serve_asset("Bat_Mitsva", "005.JPEG", &HeaderMap::new(), Disposition::Attachment)
            .await
            .unwrap();
        assert_eq!(
            download.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"005.jpeg\""
        );

        let missing = gallery
            .serve_asset("Bat_Mitsva", "404.jpeg", &HeaderMap::new(), Disposition::Inline)
            .await;
        match missing {
            Err(GalleryError::NotFound { message, path }) => {
                assert_eq!(message, "Image not found");
                assert_eq!(path.as_deref(), Some("Bat_Mitsva/404.jpeg"));
            }
            other => panic!("expected not found, got {other:?}"),
        }
    }
}
