use super::{Catalog, CatalogError, PHOTO_COLUMNS, Photo, photo_from_row};
use rusqlite::{OptionalExtension, params};

impl Catalog {
    /// Links `photo_id` to `recommended_photo_id`. Returns `false` when the
    /// pair already existed.
    pub async fn add_recommendation(
        &self,
        photo_id: i64,
        recommended_photo_id: i64,
    ) -> Result<bool, CatalogError> {
        self.with_connection(move |conn| {
            for id in [photo_id, recommended_photo_id] {
                let exists = conn
                    .query_row("SELECT 1 FROM photos WHERE id = ?1", params![id], |_| {
                        Ok(())
                    })
                    .optional()?
                    .is_some();
                if !exists {
                    return Err(CatalogError::PhotoNotFound(id));
                }
            }

            let inserted = conn.execute(
                "INSERT OR IGNORE INTO photo_recommendations
                    (photo_id, recommended_photo_id, created_at)
                 VALUES (?1, ?2, ?3)",
                params![
                    photo_id,
                    recommended_photo_id,
                    chrono::Utc::now().to_rfc3339()
                ],
            )?;
            Ok(inserted == 1)
        })
        .await
    }

    pub async fn recommendations(&self, photo_id: i64) -> Result<Vec<Photo>, CatalogError> {
        self.with_connection(move |conn| {
            let sql = format!(
                "SELECT {PHOTO_COLUMNS} FROM photo_recommendations r
                 JOIN photos p ON p.id = r.recommended_photo_id
                 WHERE r.photo_id = ?1 ORDER BY p.id"
            );
            let mut stmt = conn.prepare(&sql)?;
            let photos = stmt
                .query_map(params![photo_id], photo_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(photos)
        })
        .await
    }
}
