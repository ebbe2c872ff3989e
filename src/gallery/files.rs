use crate::catalog::{NewPhoto, Photo};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::warn;

pub const THUMBNAIL_SUFFIX: &str = "-thumb";

pub fn is_jpeg(file_name: &str) -> bool {
    let lower = file_name.to_lowercase();
    lower.ends_with(".jpg") || lower.ends_with(".jpeg")
}

pub fn is_thumbnail(file_name: &str) -> bool {
    file_name.contains(THUMBNAIL_SUFFIX)
}

/// Splits `"007.jpeg"` into `("007", ".jpeg")`.
fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(index) if index > 0 => file_name.split_at(index),
        _ => (file_name, ""),
    }
}

/// `"007.jpeg"` -> `"007-thumb.jpeg"`.
pub fn thumbnail_name(file_name: &str) -> String {
    let (stem, extension) = split_extension(file_name);
    format!("{stem}{THUMBNAIL_SUFFIX}{extension}")
}

/// The number formed by the leading digits of the file name, if any.
pub fn leading_number(file_name: &str) -> Option<i64> {
    let (stem, _) = split_extension(file_name);
    let digits: String = stem.chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

pub fn photo_title(category: &str) -> String {
    format!("{category} Portrait Session")
}

pub fn asset_url(url_prefix: &str, folder: &str, file_name: &str) -> String {
    format!(
        "{}/{}/{}",
        url_prefix.trim_end_matches('/'),
        urlencoding::encode(folder),
        urlencoding::encode(file_name)
    )
}

/// A full-size image found in a category folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoFile {
    pub id: i64,
    pub file_name: String,
    pub thumbnail: Option<String>,
}

impl PhotoFile {
    pub fn image_url(&self, url_prefix: &str, folder: &str) -> String {
        asset_url(url_prefix, folder, &self.file_name)
    }

    /// Falls back to the full image when no thumbnail exists on disk.
    pub fn thumbnail_url(&self, url_prefix: &str, folder: &str) -> String {
        asset_url(
            url_prefix,
            folder,
            self.thumbnail.as_deref().unwrap_or(&self.file_name),
        )
    }

    pub fn to_new_photo(&self, category: &str, folder: &str, url_prefix: &str) -> NewPhoto {
        NewPhoto {
            id: self.id,
            title: photo_title(category),
            category: category.to_string(),
            folder: folder.to_string(),
            image_url: self.image_url(url_prefix, folder),
            thumbnail_url: self.thumbnail_url(url_prefix, folder),
            display_order: self.id,
        }
    }

    pub fn to_photo(&self, category: &str, folder: &str, url_prefix: &str) -> Photo {
        Photo {
            id: self.id,
            title: photo_title(category),
            description: None,
            category: category.to_string(),
            image_url: self.image_url(url_prefix, folder),
            thumbnail_url: self.thumbnail_url(url_prefix, folder),
            display_order: self.id,
            likes_count: 0,
            metadata: None,
            is_liked: false,
        }
    }
}

/// Turns the file names of one category folder into its photos.
///
/// JPEG files without the thumbnail suffix are taken in name order and
/// numbered by their leading digits, or by 1-based position among the images
/// when the name has none. A second file claiming an already used number is
/// skipped. The result is ordered by id.
pub fn plan_photo_files(file_names: &[String]) -> Vec<PhotoFile> {
    let mut sorted: Vec<&String> = file_names
        .iter()
        .filter(|name| !name.starts_with('.'))
        .collect();
    sorted.sort();

    let by_lowercase: HashMap<String, &String> = sorted
        .iter()
        .map(|name| (name.to_lowercase(), *name))
        .collect();

    let mut seen = HashSet::new();
    let mut photos = Vec::new();

    for (index, name) in sorted
        .iter()
        .filter(|name| is_jpeg(name) && !is_thumbnail(name))
        .enumerate()
    {
        let id = leading_number(name).unwrap_or(index as i64 + 1);
        if !seen.insert(id) {
            warn!("Skipping {}: photo number {} is already taken", name, id);
            continue;
        }

        let thumbnail = by_lowercase
            .get(&thumbnail_name(name).to_lowercase())
            .map(|thumb| thumb.to_string());

        photos.push(PhotoFile {
            id,
            file_name: name.to_string(),
            thumbnail,
        });
    }

    photos.sort_by_key(|photo| photo.id);
    photos
}

/// Names of the regular files directly inside `dir`.
pub async fn list_file_names(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let file_type = match entry.file_type().await {
            Ok(file_type) => file_type,
            Err(e) => {
                warn!("Failed to stat {:?}: {}", entry.path(), e);
                continue;
            }
        };
        if !file_type.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => warn!("Skipping file with non UTF-8 name: {:?}", raw),
        }
    }

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_thumbnail_name() {
        assert_eq!(thumbnail_name("007.jpeg"), "007-thumb.jpeg");
        assert_eq!(thumbnail_name("007.JPG"), "007-thumb.JPG");
        assert_eq!(thumbnail_name("cover"), "cover-thumb");
    }

    #[test]
    fn test_leading_number() {
        assert_eq!(leading_number("007.jpeg"), Some(7));
        assert_eq!(leading_number("12-thumb.jpeg"), Some(12));
        assert_eq!(leading_number("cover.jpeg"), None);
        assert_eq!(leading_number("a12.jpeg"), None);
    }

    #[test]
    fn test_is_jpeg_ignores_case() {
        assert!(is_jpeg("001.jpeg"));
        assert!(is_jpeg("001.JPG"));
        assert!(!is_jpeg("001.png"));
        assert!(!is_jpeg("notes.txt"));
    }

    #[test]
    fn test_plan_pairs_thumbnails_and_orders_by_number() {
        let planned = plan_photo_files(&names(&[
            "010.jpeg",
            "005-thumb.jpeg",
            "005.jpeg",
            "007.jpeg",
            ".DS_Store",
            "readme.txt",
        ]));

        assert_eq!(
            planned,
            vec![
                PhotoFile {
                    id: 5,
                    file_name: "005.jpeg".to_string(),
                    thumbnail: Some("005-thumb.jpeg".to_string()),
                },
                PhotoFile {
                    id: 7,
                    file_name: "007.jpeg".to_string(),
                    thumbnail: None,
                },
                PhotoFile {
                    id: 10,
                    file_name: "010.jpeg".to_string(),
                    thumbnail: None,
                },
            ]
        );
    }

    #[test]
    fn test_plan_numbers_unnumbered_files_by_position() {
        let planned = plan_photo_files(&names(&["beta.jpg", "alpha.jpg"]));
        let ids: Vec<_> = planned.iter().map(|p| (p.id, p.file_name.as_str())).collect();
        assert_eq!(ids, vec![(1, "alpha.jpg"), (2, "beta.jpg")]);
    }

    #[test]
    fn test_plan_skips_duplicate_numbers() {
        let planned = plan_photo_files(&names(&["005.jpeg", "5.jpeg"]));
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].file_name, "005.jpeg");
    }

    #[test]
    fn test_thumbnail_url_falls_back_to_image() {
        let file = PhotoFile {
            id: 7,
            file_name: "007.jpeg".to_string(),
            thumbnail: None,
        };
        assert_eq!(file.image_url("/assets", "Kids"), "/assets/Kids/007.jpeg");
        assert_eq!(file.thumbnail_url("/assets/", "Kids"), "/assets/Kids/007.jpeg");

        let photo = file.to_photo("Kids", "Kids", "/assets");
        assert_eq!(photo.title, "Kids Portrait Session");
        assert_eq!(photo.display_order, 7);
        assert_eq!(photo.thumbnail_url, photo.image_url);
    }

    #[test]
    fn test_asset_url_encodes_segments() {
        assert_eq!(
            asset_url("/assets", "before_and_after", "Anna-1 Large.jpeg"),
            "/assets/before_and_after/Anna-1%20Large.jpeg"
        );
    }
}
