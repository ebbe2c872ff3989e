// Gallery module - category folders on disk, mirrored into the catalog
mod before_after;
mod error;
mod files;
mod handlers;
mod listing;
mod naming;
mod scanner;
mod serve;
mod types;

// Re-export public items
pub use before_after::{BeforeAfterSet, pair_files};
pub use error::{GalleryError, error_envelope, panic_response};
pub use files::{PhotoFile, is_jpeg, plan_photo_files, thumbnail_name};
pub use handlers::*;
pub use listing::{DEFAULT_PAGE_SIZE, PageRequest};
pub use naming::{CategoryResolver, to_display_name, to_folder_name};
pub use serve::Disposition;
pub use types::*;

use crate::catalog::Catalog;
use std::sync::Arc;

pub type SharedGallery = Arc<Gallery>;

/// The context shared by every request: configuration, the catalog and the
/// category naming rules. Built once at startup and closed at shutdown.
pub struct Gallery {
    pub(crate) config: crate::GalleryConfig,
    pub(crate) catalog: Catalog,
    pub(crate) resolver: CategoryResolver,
}

impl Gallery {
    pub fn new(config: crate::GalleryConfig, catalog: Catalog) -> Self {
        let resolver = CategoryResolver::new(config.aliases.clone());
        Self {
            config,
            catalog,
            resolver,
        }
    }

    pub fn config(&self) -> &crate::GalleryConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub async fn close(&self) -> Result<(), GalleryError> {
        self.catalog.close().await?;
        Ok(())
    }
}
