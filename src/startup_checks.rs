use crate::Config;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum StartupCheckError {
    #[error("Failed to create directory {0:?}: {1}")]
    DirectoryCreationFailed(PathBuf, std::io::Error),

    #[error("Directory is not accessible {0:?}: {1}")]
    DirectoryNotAccessible(PathBuf, std::io::Error),

    #[error("Database directory could not be created {0:?}: {1}")]
    DatabaseDirectoryFailed(PathBuf, std::io::Error),
}

impl StartupCheckError {
    /// Critical failures prevent the server from starting.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            StartupCheckError::DirectoryCreationFailed(..)
                | StartupCheckError::DatabaseDirectoryFailed(..)
        )
    }
}

async fn ensure_directory(dir: &Path, errors: &mut Vec<StartupCheckError>) -> bool {
    if dir.exists() {
        info!("Directory exists: {:?}", dir);
    } else {
        info!("Directory does not exist, creating: {:?}", dir);
        if let Err(e) = tokio::fs::create_dir_all(dir).await {
            error!("Failed to create directory {:?}: {}", dir, e);
            errors.push(StartupCheckError::DirectoryCreationFailed(
                dir.to_path_buf(),
                e,
            ));
            return false;
        }
    }

    if let Err(e) = tokio::fs::read_dir(dir).await {
        error!("Directory is not accessible {:?}: {}", dir, e);
        errors.push(StartupCheckError::DirectoryNotAccessible(dir.to_path_buf(), e));
        return false;
    }
    true
}

/// Number of JPEG files anywhere below `dir`.
pub fn count_images(dir: &Path) -> usize {
    WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .file_name()
                .to_str()
                .is_some_and(crate::gallery::is_jpeg)
        })
        .count()
}

pub async fn perform_startup_checks(config: &Config) -> Result<(), Vec<StartupCheckError>> {
    let mut errors = Vec::new();

    info!("Performing startup checks...");

    let gallery = &config.gallery;
    ensure_directory(&gallery.assets_directory, &mut errors).await;
    let galleries_ready = ensure_directory(&gallery.galleries_directory(), &mut errors).await;
    ensure_directory(&gallery.before_after_directory(), &mut errors).await;

    if galleries_ready {
        let galleries_dir = gallery.galleries_directory();
        let images = count_images(&galleries_dir);
        if images == 0 {
            warn!("No images found under {:?}", galleries_dir);
        } else {
            info!("Found {} images under {:?}", images, galleries_dir);
        }
    }

    if let Some(parent) = config.database.path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        info!("Creating database directory: {:?}", parent);
        if let Err(e) = tokio::fs::create_dir_all(parent).await {
            error!("Failed to create database directory {:?}: {}", parent, e);
            errors.push(StartupCheckError::DatabaseDirectoryFailed(
                parent.to_path_buf(),
                e,
            ));
        }
    }

    if errors.is_empty() {
        info!("All startup checks passed");
        Ok(())
    } else {
        error!("Startup checks failed with {} errors", errors.len());
        Err(errors)
    }
}
