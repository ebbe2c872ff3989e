use super::{Catalog, CatalogError};
use rusqlite::{OptionalExtension, TransactionBehavior, params};
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LikeState {
    pub count: i64,
    pub liked: bool,
}

impl Catalog {
    /// Flips the like recorded for `(photo_id, fingerprint)`.
    ///
    /// Returns the new liked state, or `None` when the photo does not exist.
    /// The lookup, delete and insert run in one immediate transaction under
    /// the connection lock, so concurrent toggles for the same pair serialize
    /// instead of double-inserting.
    pub async fn toggle_like(
        &self,
        photo_id: i64,
        fingerprint: &str,
    ) -> Result<Option<bool>, CatalogError> {
        let fingerprint = fingerprint.to_string();
        self.with_connection(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let exists = tx
                .query_row(
                    "SELECT 1 FROM photos WHERE id = ?1",
                    params![photo_id],
                    |_| Ok(()),
                )
                .optional()?
                .is_some();
            if !exists {
                return Ok(None);
            }

            let removed = tx.execute(
                "DELETE FROM photo_likes WHERE photo_id = ?1 AND fingerprint = ?2",
                params![photo_id, fingerprint],
            )?;

            let liked = if removed == 0 {
                tx.execute(
                    "INSERT INTO photo_likes (photo_id, fingerprint, created_at)
                     VALUES (?1, ?2, ?3)",
                    params![photo_id, fingerprint, chrono::Utc::now().to_rfc3339()],
                )?;
                true
            } else {
                false
            };

            tx.commit()?;
            debug!(photo_id, liked, "Like toggled");
            Ok(Some(liked))
        })
        .await
    }

    /// Like counts for `photo_ids`, and whether `fingerprint` liked each one.
    /// Ids with no catalog row are reported with a zero count.
    pub async fn like_states(
        &self,
        photo_ids: &[i64],
        fingerprint: Option<&str>,
    ) -> Result<HashMap<i64, LikeState>, CatalogError> {
        let photo_ids = photo_ids.to_vec();
        let fingerprint = fingerprint.map(str::to_string);
        self.with_connection(move |conn| {
            let mut count_stmt =
                conn.prepare("SELECT COUNT(*) FROM photo_likes WHERE photo_id = ?1")?;
            let mut liked_stmt = conn.prepare(
                "SELECT 1 FROM photo_likes WHERE photo_id = ?1 AND fingerprint = ?2",
            )?;

            let mut states = HashMap::with_capacity(photo_ids.len());
            for &id in &photo_ids {
                let count: i64 = count_stmt.query_row(params![id], |row| row.get(0))?;
                let liked = match fingerprint.as_deref() {
                    Some(fingerprint) if count > 0 => liked_stmt
                        .query_row(params![id, fingerprint], |_| Ok(()))
                        .optional()?
                        .is_some(),
                    _ => false,
                };
                states.insert(id, LikeState { count, liked });
            }
            Ok(states)
        })
        .await
    }
}
