use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub display_order: i64,
}

/// A category as listed by `/api/categories`, with the photo that represents it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    #[serde(flatten)]
    pub category: Category,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_photo: Option<FirstPhoto>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstPhoto {
    pub image_url: String,
    pub thumbnail_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: i64,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub category: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub display_order: i64,
    pub likes_count: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<PhotoMetadata>,
    /// Resolved per request against the caller's fingerprint; never stored.
    #[serde(default)]
    pub is_liked: bool,
}

/// Free-form tags attached to a photo. Not used by listing or ordering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoMetadata {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub color_palette: Vec<String>,
    #[serde(default)]
    pub style: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub display_order: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPhoto {
    pub id: i64,
    pub title: String,
    pub category: String,
    pub folder: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub display_order: i64,
}

/// Everything a scan found on disk, applied to the catalog in one transaction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub categories: Vec<NewCategory>,
    pub photos: Vec<NewPhoto>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RebuildSummary {
    pub categories: usize,
    pub photos: usize,
    pub removed_photos: usize,
}
