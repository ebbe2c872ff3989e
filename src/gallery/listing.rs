use super::{
    Gallery, GalleryError,
    files::{list_file_names, plan_photo_files},
    naming::{EntryKind, find_entry},
};
use crate::{ListingSource, catalog::Photo};
use tracing::{debug, warn};

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// A 1-based page of a category listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: usize,
    pub page_size: usize,
}

impl PageRequest {
    /// Unparseable or zero values fall back to page 1 and `default_size`.
    pub fn parse(page: Option<&str>, page_size: Option<&str>, default_size: usize) -> Self {
        let page = page
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|&page| page > 0)
            .unwrap_or(1);
        let page_size = page_size
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .filter(|&size| size > 0)
            .unwrap_or(default_size);
        Self { page, page_size }
    }

    /// Items skipped before this page, or `None` when the page starts past
    /// any addressable item.
    pub fn offset(&self) -> Option<usize> {
        (self.page - 1).checked_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Gallery {
    /// One page of photos in `category`, ascending by id, with like counts
    /// and the caller's like state filled in.
    pub async fn list_photos(
        &self,
        category: Option<&str>,
        page: PageRequest,
        fingerprint: Option<&str>,
    ) -> Result<Vec<Photo>, GalleryError> {
        let requested = category.map(str::trim).unwrap_or_default();
        if requested.is_empty() {
            return Err(GalleryError::BadRequest(
                "Category parameter is required".to_string(),
            ));
        }

        let category = self
            .catalog
            .category_by_name(requested)
            .await?
            .ok_or_else(|| GalleryError::not_found("Category not found"))?;

        let mut photos = match (self.config.listing_source, page.offset()) {
            (_, None) => Vec::new(),
            (ListingSource::Catalog, Some(offset)) => {
                self.catalog
                    .photos_in_category(&category.name, offset, page.page_size)
                    .await?
            }
            (ListingSource::Directory, Some(offset)) => {
                self.directory_photos(&category.name, offset, page.page_size).await
            }
        };

        let ids: Vec<i64> = photos.iter().map(|photo| photo.id).collect();
        let states = self.catalog.like_states(&ids, fingerprint).await?;
        for photo in &mut photos {
            if let Some(state) = states.get(&photo.id) {
                photo.likes_count = state.count;
                photo.is_liked = state.liked;
            }
        }

        debug!(
            "Listed {} photos for {} (page {})",
            photos.len(),
            category.name,
            page.page
        );
        Ok(photos)
    }

    /// Reads the category folder live. An unreadable folder yields no photos.
    async fn directory_photos(&self, category: &str, offset: usize, limit: usize) -> Vec<Photo> {
        let folder_name = self.resolver.folder_name(category);
        let Some(folder) = find_entry(
            &self.config.galleries_directory(),
            &folder_name,
            EntryKind::Directory,
        )
        .await
        else {
            warn!("No folder found for category {}", category);
            return Vec::new();
        };

        let file_names = match list_file_names(&folder).await {
            Ok(names) => names,
            Err(e) => {
                warn!("Failed to read category folder {:?}: {}", folder, e);
                return Vec::new();
            }
        };

        let on_disk = folder
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&folder_name)
            .to_string();

        plan_photo_files(&file_names)
            .iter()
            .skip(offset)
            .take(limit)
            .map(|file| file.to_photo(category, &on_disk, &self.config.url_prefix))
            .collect()
    }
}
