// Catalog store - SQLite index mirroring the gallery directory tree
mod error;
mod likes;
mod recommendations;
mod schema;
mod types;


pub use error::CatalogError;
pub use likes::LikeState;
pub use types::*;

use rusqlite::{Connection, OptionalExtension, Row, params};
use std::{
    collections::HashSet,
    path::Path,
    sync::{Arc, Mutex},
};
use tracing::{debug, info};

pub(crate) const PHOTO_COLUMNS: &str = "p.id, p.title, p.description, p.category, p.image_url, \
     p.thumbnail_url, p.display_order, \
     (SELECT COUNT(*) FROM photo_likes l WHERE l.photo_id = p.id), p.metadata";

pub(crate) fn photo_from_row(row: &Row<'_>) -> rusqlite::Result<Photo> {
    let image_url: String = row.get(4)?;
    let thumbnail_url: Option<String> = row.get(5)?;
    let metadata: Option<String> = row.get(8)?;

    Ok(Photo {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        thumbnail_url: thumbnail_url.unwrap_or_else(|| image_url.clone()),
        image_url,
        display_order: row.get(6)?,
        likes_count: row.get(7)?,
        metadata: metadata.and_then(|raw| serde_json::from_str(&raw).ok()),
        is_liked: false,
    })
}

fn category_from_row(row: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        display_order: row.get(3)?,
    })
}

/// The catalog owns a single SQLite connection. Every operation runs on the
/// blocking pool under the connection lock, so multi-statement operations
/// (rebuild, like toggle) are atomic with respect to each other.
pub struct Catalog {
    conn: Arc<Mutex<Option<Connection>>>,
}

impl Catalog {
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        info!("Catalog database opened at {:?}", path);
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, CatalogError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, CatalogError> {
        schema::initialize(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }

    /// Closes the underlying connection. Later calls fail with `CatalogError::Closed`.
    pub async fn close(&self) -> Result<(), CatalogError> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| CatalogError::LockPoisoned)?;
            if let Some(conn) = guard.take() {
                conn.close().map_err(|(_, e)| CatalogError::DatabaseError(e))?;
                info!("Catalog database closed");
            }
            Ok(())
        })
        .await?
    }

    /// Runs `f` against the open connection on the blocking thread pool.
    pub(crate) async fn with_connection<T, F>(&self, f: F) -> Result<T, CatalogError>
    where
        F: FnOnce(&mut Connection) -> Result<T, CatalogError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| CatalogError::LockPoisoned)?;
            let conn = guard.as_mut().ok_or(CatalogError::Closed)?;
            f(conn)
        })
        .await?
    }

    /// Returns `(categories, photos)` row counts.
    pub async fn counts(&self) -> Result<(usize, usize), CatalogError> {
        self.with_connection(|conn| {
            let categories: i64 =
                conn.query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;
            let photos: i64 = conn.query_row("SELECT COUNT(*) FROM photos", [], |row| row.get(0))?;
            Ok((categories as usize, photos as usize))
        })
        .await
    }

    pub async fn is_empty(&self) -> Result<bool, CatalogError> {
        let (categories, photos) = self.counts().await?;
        Ok(categories == 0 && photos == 0)
    }

    /// Replaces the catalog contents with `snapshot` in a single transaction.
    ///
    /// Categories are replaced wholesale. Photos are upserted by id and rows
    /// missing from the snapshot are deleted, which cascades to their likes
    /// and recommendations. Authored columns (`description`, `metadata`) of
    /// surviving photos are kept.
    pub async fn rebuild(&self, snapshot: &CatalogSnapshot) -> Result<RebuildSummary, CatalogError> {
        let snapshot = snapshot.clone();
        self.with_connection(move |conn| {
            let tx = conn.transaction()?;

            let existing: HashSet<i64> = {
                let mut stmt = tx.prepare("SELECT id FROM photos")?;
                let ids = stmt
                    .query_map([], |row| row.get(0))?
                    .collect::<Result<HashSet<i64>, _>>()?;
                ids
            };

            tx.execute("DELETE FROM categories", [])?;
            {
                let mut insert = tx.prepare(
                    "INSERT INTO categories (id, name, description, display_order)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                for category in &snapshot.categories {
                    insert.execute(params![
                        category.display_order,
                        category.name,
                        category.description,
                        category.display_order
                    ])?;
                }
            }

            {
                let mut upsert = tx.prepare(
                    "INSERT INTO photos
                        (id, title, category, folder, image_url, thumbnail_url, display_order)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(id) DO UPDATE SET
                        title = excluded.title,
                        category = excluded.category,
                        folder = excluded.folder,
                        image_url = excluded.image_url,
                        thumbnail_url = excluded.thumbnail_url,
                        display_order = excluded.display_order",
                )?;
                for photo in &snapshot.photos {
                    upsert.execute(params![
                        photo.id,
                        photo.title,
                        photo.category,
                        photo.folder,
                        photo.image_url,
                        photo.thumbnail_url,
                        photo.display_order
                    ])?;
                }
            }

            let keep: HashSet<i64> = snapshot.photos.iter().map(|photo| photo.id).collect();
            let mut removed_photos = 0;
            {
                let mut delete = tx.prepare("DELETE FROM photos WHERE id = ?1")?;
                for id in existing.difference(&keep) {
                    removed_photos += delete.execute(params![id])?;
                }
            }

            tx.commit()?;

            debug!(
                "Catalog rebuilt: {} categories, {} photos, {} removed",
                snapshot.categories.len(),
                keep.len(),
                removed_photos
            );

            Ok(RebuildSummary {
                categories: snapshot.categories.len(),
                photos: keep.len(),
                removed_photos,
            })
        })
        .await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        self.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, name, description, display_order
                 FROM categories ORDER BY display_order, id",
            )?;
            let categories = stmt
                .query_map([], category_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(categories)
        })
        .await
    }

    /// Looks a category up by display name, ignoring ASCII case.
    pub async fn category_by_name(&self, name: &str) -> Result<Option<Category>, CatalogError> {
        let name = name.to_string();
        self.with_connection(move |conn| {
            let category = conn
                .query_row(
                    "SELECT id, name, description, display_order
                     FROM categories WHERE name = ?1 COLLATE NOCASE",
                    params![name],
                    category_from_row,
                )
                .optional()?;
            Ok(category)
        })
        .await
    }

    /// Categories in display order, each with its lowest-numbered photo.
    pub async fn category_summaries(&self) -> Result<Vec<CategorySummary>, CatalogError> {
        self.with_connection(|conn| {
            let categories = {
                let mut stmt = conn.prepare(
                    "SELECT id, name, description, display_order
                     FROM categories ORDER BY display_order, id",
                )?;
                let categories = stmt
                    .query_map([], category_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                categories
            };

            let mut first = conn.prepare(
                "SELECT image_url, thumbnail_url FROM photos
                 WHERE category = ?1 ORDER BY id LIMIT 1",
            )?;

            let mut summaries = Vec::with_capacity(categories.len());
            for category in categories {
                let first_photo = first
                    .query_row(params![category.name], |row| {
                        let image_url: String = row.get(0)?;
                        let thumbnail_url: Option<String> = row.get(1)?;
                        Ok(FirstPhoto {
                            thumbnail_url: thumbnail_url.unwrap_or_else(|| image_url.clone()),
                            image_url,
                        })
                    })
                    .optional()?;
                summaries.push(CategorySummary {
                    category,
                    first_photo,
                });
            }
            Ok(summaries)
        })
        .await
    }

    /// A page of photos in `category`, ascending by id. An offset beyond
    /// what SQLite can address is past the end and yields no rows.
    pub async fn photos_in_category(
        &self,
        category: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Photo>, CatalogError> {
        let Ok(offset) = i64::try_from(offset) else {
            return Ok(Vec::new());
        };
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let category = category.to_string();

        self.with_connection(move |conn| {
            let sql = format!(
                "SELECT {PHOTO_COLUMNS} FROM photos p
                 WHERE p.category = ?1 ORDER BY p.id LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = conn.prepare(&sql)?;
            let photos = stmt
                .query_map(params![category, limit, offset], photo_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(photos)
        })
        .await
    }

    pub async fn photo(&self, id: i64) -> Result<Option<Photo>, CatalogError> {
        self.with_connection(move |conn| {
            let sql = format!("SELECT {PHOTO_COLUMNS} FROM photos p WHERE p.id = ?1");
            let photo = conn
                .query_row(&sql, params![id], photo_from_row)
                .optional()?;
            Ok(photo)
        })
        .await
    }

    pub async fn all_photos(&self) -> Result<Vec<Photo>, CatalogError> {
        self.with_connection(|conn| {
            let sql = format!("SELECT {PHOTO_COLUMNS} FROM photos p ORDER BY p.id");
            let mut stmt = conn.prepare(&sql)?;
            let photos = stmt
                .query_map([], photo_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(photos)
        })
        .await
    }

    #[cfg(test)]
    pub(crate) async fn set_photo_metadata(
        &self,
        id: i64,
        metadata: &PhotoMetadata,
    ) -> Result<(), CatalogError> {
        let raw = serde_json::to_string(metadata)?;
        self.with_connection(move |conn| {
            let updated = conn.execute(
                "UPDATE photos SET metadata = ?1 WHERE id = ?2",
                params![raw, id],
            )?;
            if updated == 0 {
                return Err(CatalogError::PhotoNotFound(id));
            }
            Ok(())
        })
        .await
    }
}
