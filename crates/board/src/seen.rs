//! SeenIds (spec §3, §4.8): a durable set of board-item ids already
//! processed, backed by a single-table sqlite database — the same `sqlx`
//! crate the teacher uses for Postgres, pointed at a local file instead
//! (spec §9 design note).

use mwmbl_core::CrawlError;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};

pub struct SeenIds {
    pool: SqlitePool,
}

impl SeenIds {
    pub async fn open(path: &str) -> Result<Self, CrawlError> {
        let url = format!("sqlite://{path}?mode=rwc");
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(&url)
            .await
            .map_err(|e| CrawlError::Storage(e.to_string()))?;

        sqlx::query("CREATE TABLE IF NOT EXISTS ids (id INTEGER PRIMARY KEY)")
            .execute(&pool)
            .await
            .map_err(|e| CrawlError::Storage(e.to_string()))?;

        Ok(Self { pool })
    }

    #[cfg(test)]
    async fn open_in_memory() -> Result<Self, CrawlError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| CrawlError::Storage(e.to_string()))?;
        sqlx::query("CREATE TABLE IF NOT EXISTS ids (id INTEGER PRIMARY KEY)")
            .execute(&pool)
            .await
            .map_err(|e| CrawlError::Storage(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Bulk existence lookup: returns the subset of `ids` NOT already seen.
    pub async fn filter_unseen(&self, ids: &[i64]) -> Result<Vec<i64>, CrawlError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders = vec!["?"; ids.len()].join(",");
        let query = format!("SELECT id FROM ids WHERE id IN ({placeholders})");
        let mut q = sqlx::query_scalar::<_, i64>(&query);
        for id in ids {
            q = q.bind(id);
        }
        let existing: Vec<i64> = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| CrawlError::Storage(e.to_string()))?;

        let existing_set: std::collections::HashSet<i64> = existing.into_iter().collect();
        Ok(ids.iter().copied().filter(|id| !existing_set.contains(id)).collect())
    }

    /// Bulk upsert: inserting an id already present is a no-op (spec §3).
    pub async fn insert_all(&self, ids: &[i64]) -> Result<(), CrawlError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| CrawlError::Storage(e.to_string()))?;
        for id in ids {
            sqlx::query("INSERT OR IGNORE INTO ids (id) VALUES (?)")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| CrawlError::Storage(e.to_string()))?;
        }
        tx.commit().await.map_err(|e| CrawlError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unseen_ids_come_back_until_inserted() {
        let store = SeenIds::open_in_memory().await.unwrap();
        let window = vec![1, 2, 3, 4, 5];
        let unseen = store.filter_unseen(&window).await.unwrap();
        assert_eq!(unseen, window);

        store.insert_all(&[1, 2, 3]).await.unwrap();
        let unseen = store.filter_unseen(&window).await.unwrap();
        assert_eq!(unseen, vec![4, 5]);
    }

    #[tokio::test]
    async fn inserting_an_existing_id_is_a_no_op() {
        let store = SeenIds::open_in_memory().await.unwrap();
        store.insert_all(&[42]).await.unwrap();
        store.insert_all(&[42]).await.unwrap();
        let unseen = store.filter_unseen(&[42]).await.unwrap();
        assert!(unseen.is_empty());
    }
}
