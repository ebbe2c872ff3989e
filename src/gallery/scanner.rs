use super::{
    Gallery, GalleryError,
    files::{list_file_names, plan_photo_files},
};
use crate::catalog::{CatalogSnapshot, NewCategory, RebuildSummary};
use std::{
    collections::{HashMap, HashSet},
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

impl Gallery {
    /// Rebuilds the catalog from the category folders under `root`, or under
    /// the configured galleries directory when no root is given.
    ///
    /// The tree is read into a snapshot first; a root that cannot be read
    /// fails the scan with the catalog untouched.
    pub async fn scan(&self, root: Option<&Path>) -> Result<RebuildSummary, GalleryError> {
        let root: PathBuf = match root {
            Some(relative) => self.config.assets_directory.join(relative),
            None => self.config.galleries_directory(),
        };

        info!("Scanning gallery directory {:?}", root);
        let snapshot = self.build_snapshot(&root).await?;
        let summary = self.catalog.rebuild(&snapshot).await?;

        info!(
            "Scan complete: {} categories, {} photos, {} removed",
            summary.categories, summary.photos, summary.removed_photos
        );
        Ok(summary)
    }

    pub(crate) async fn build_snapshot(&self, root: &Path) -> Result<CatalogSnapshot, GalleryError> {
        let mut entries = tokio::fs::read_dir(root).await?;
        let mut folders = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let Ok(name) = entry.file_name().into_string() else {
                warn!("Skipping folder with non UTF-8 name: {:?}", entry.path());
                continue;
            };
            if name.starts_with('.') || self.config.is_excluded(&name) {
                debug!("Skipping excluded entry {}", name);
                continue;
            }
            match entry.file_type().await {
                Ok(file_type) if file_type.is_dir() => folders.push(name),
                Ok(_) => {}
                Err(e) => warn!("Failed to stat {:?}: {}", entry.path(), e),
            }
        }
        folders.sort();

        let mut snapshot = CatalogSnapshot::default();
        let mut seen_names = HashSet::new();
        let mut photo_slots: HashMap<i64, usize> = HashMap::new();

        for folder in folders {
            let name = self.resolver.display_name(&folder);
            if !seen_names.insert(name.to_lowercase()) {
                warn!(
                    "Skipping folder {}: category {} is already taken by another folder",
                    folder, name
                );
                continue;
            }

            snapshot.categories.push(NewCategory {
                description: Some(format!("{name} Photography Sessions")),
                display_order: snapshot.categories.len() as i64 + 1,
                name: name.clone(),
            });

            let file_names = match list_file_names(&root.join(&folder)).await {
                Ok(names) => names,
                Err(e) => {
                    warn!("Failed to read category folder {}: {}", folder, e);
                    continue;
                }
            };

            let planned = plan_photo_files(&file_names);
            info!("Category {}: {} photos", name, planned.len());

            for file in planned {
                let photo = file.to_new_photo(&name, &folder, &self.config.url_prefix);
                match photo_slots.get(&photo.id) {
                    Some(&slot) => {
                        warn!(
                            "Photo {} in {} replaces the one from {}",
                            photo.id, name, snapshot.photos[slot].category
                        );
                        snapshot.photos[slot] = photo;
                    }
                    None => {
                        photo_slots.insert(photo.id, snapshot.photos.len());
                        snapshot.photos.push(photo);
                    }
                }
            }
        }

        Ok(snapshot)
    }
}
