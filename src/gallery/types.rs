use serde::{Deserialize, Serialize};

/// Query of `GET /api/photos`. Paging values stay strings so malformed input
/// falls back to defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotosQuery {
    pub category: Option<String>,
    pub page: Option<String>,
    pub page_size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScanQuery {
    pub path: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub message: String,
    pub categories: usize,
    pub photos: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LikeResponse {
    pub liked: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationRequest {
    pub recommended_photo_id: i64,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub created: bool,
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}
