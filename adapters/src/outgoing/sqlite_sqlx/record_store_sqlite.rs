use super::utils::{SqliteExecutor, begin_transaction, commit_transaction};
use domain::{
    object_key::ObjectKey,
    record::{ImageRecord, NewImageRecord, RecordId},
};
use framer_application::{
    error::{AppError, AppResult},
    ports::outgoing::record_store::RecordStorePort,
};
use sqlx::{FromRow, SqlitePool};
use time::OffsetDateTime;
use tracing::{debug, instrument};

#[derive(FromRow)]
struct RecordRow {
    id: i64,
    original_filename: String,
    processed_url: String,
    object_key: String,
    position: i64,
    created_at: OffsetDateTime,
}

impl TryFrom<RecordRow> for ImageRecord {
    type Error = AppError;

    fn try_from(row: RecordRow) -> AppResult<Self> {
        let object_key = ObjectKey::parse(&row.object_key).map_err(|e| AppError::DatabaseError {
            message: format!("Record {} holds an invalid object key: {e}", row.id),
        })?;

        Ok(Self {
            id: RecordId::new(row.id),
            original_filename: row.original_filename,
            processed_url: row.processed_url,
            object_key,
            position: row.position,
            created_at: row.created_at,
        })
    }
}

pub struct SqliteRecordStoreAdapter {
    pool: SqlitePool,
    executor: SqliteExecutor,
}

impl SqliteRecordStoreAdapter {
    pub fn new(pool: SqlitePool, query_timeout_secs: u64) -> Self {
        Self {
            pool,
            executor: SqliteExecutor::new(query_timeout_secs),
        }
    }
}

#[async_trait::async_trait]
impl RecordStorePort for SqliteRecordStoreAdapter {
    #[instrument(skip(self, record), fields(object_key = %record.object_key))]
    async fn create(&self, record: &NewImageRecord) -> AppResult<RecordId> {
        let created_at = OffsetDateTime::now_utc();

        let id = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query_scalar::<_, i64>(
                        r"
                        INSERT INTO processed_images
                            (original_filename, processed_url, object_key, position, created_at)
                        SELECT ?1, ?2, ?3, COALESCE(MAX(position) + 1, 0), ?4
                        FROM processed_images
                        RETURNING id
                        ",
                    )
                    .bind(record.original_filename.as_str())
                    .bind(record.processed_url.as_str())
                    .bind(record.object_key.as_str())
                    .bind(created_at)
                    .fetch_one(&self.pool)
                },
                &format!("Failed to create record for {}", record.object_key),
            )
            .await?;

        debug!(id, "Created record");
        Ok(RecordId::new(id))
    }

    #[instrument(skip(self))]
    async fn get(&self, id: RecordId) -> AppResult<Option<ImageRecord>> {
        let row = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query_as::<_, RecordRow>(
                        r"
                        SELECT id, original_filename, processed_url, object_key, position, created_at
                        FROM processed_images
                        WHERE id = ?1
                        ",
                    )
                    .bind(id.value())
                    .fetch_optional(&self.pool)
                },
                &format!("Failed to get record {id}"),
            )
            .await?;

        row.map(ImageRecord::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self) -> AppResult<Vec<ImageRecord>> {
        let rows = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query_as::<_, RecordRow>(
                        r"
                        SELECT id, original_filename, processed_url, object_key, position, created_at
                        FROM processed_images
                        ORDER BY position ASC, id ASC
                        ",
                    )
                    .fetch_all(&self.pool)
                },
                "Failed to list records",
            )
            .await?;

        rows.into_iter().map(ImageRecord::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: RecordId) -> AppResult<bool> {
        let result = self
            .executor
            .execute_with_timeout(
                || {
                    sqlx::query("DELETE FROM processed_images WHERE id = ?1")
                        .bind(id.value())
                        .execute(&self.pool)
                },
                &format!("Failed to delete record {id}"),
            )
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, ordered_ids), fields(count = ordered_ids.len()))]
    async fn reorder(&self, ordered_ids: &[RecordId]) -> AppResult<()> {
        let mut tx = begin_transaction(&self.pool).await?;

        let mut updated = 0_u64;
        for (position, id) in (0_i64..).zip(ordered_ids) {
            let result = self
                .executor
                .execute_with_timeout(
                    || {
                        sqlx::query("UPDATE processed_images SET position = ?1 WHERE id = ?2")
                            .bind(position)
                            .bind(id.value())
                            .execute(&mut *tx)
                    },
                    &format!("Failed to move record {id}"),
                )
                .await?;
            updated += result.rows_affected();
        }

        commit_transaction(tx).await?;
        debug!(updated, "Reordered records");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outgoing::sqlite_sqlx::utils::connect;

    async fn store() -> SqliteRecordStoreAdapter {
        let pool = connect("sqlite::memory:", 1).await.unwrap();
        SqliteRecordStoreAdapter::new(pool, 5)
    }

    fn new_record(key: &str) -> NewImageRecord {
        NewImageRecord::new(
            format!("{key}-original.jpg"),
            format!("/s3/file/{key}"),
            ObjectKey::parse(key).unwrap(),
        )
    }

    #[tokio::test]
    async fn create_appends_after_last_position() {
        let store = store().await;

        let first = store.create(&new_record("a.png")).await.unwrap();
        let second = store.create(&new_record("b.png")).await.unwrap();

        let first = store.get(first).await.unwrap().unwrap();
        let second = store.get(second).await.unwrap().unwrap();
        assert_eq!(first.position, 0);
        assert_eq!(second.position, 1);
        assert_eq!(second.original_filename, "b.png-original.jpg");
        assert_eq!(second.processed_url, "/s3/file/b.png");
        assert_eq!(second.object_key.as_str(), "b.png");
    }

    #[tokio::test]
    async fn get_unknown_id_is_none() {
        assert!(store().await.get(RecordId::new(42)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_object_key_is_a_database_error() {
        let store = store().await;
        store.create(&new_record("a.png")).await.unwrap();

        let err = store.create(&new_record("a.png")).await.unwrap_err();

        assert!(matches!(err, AppError::DatabaseError { .. }));
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_went_away() {
        let store = store().await;
        let id = store.create(&new_record("a.png")).await.unwrap();

        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn reorder_assigns_index_positions_and_skips_unknown_ids() {
        let store = store().await;
        let a = store.create(&new_record("a.png")).await.unwrap();
        let b = store.create(&new_record("b.png")).await.unwrap();
        let c = store.create(&new_record("c.png")).await.unwrap();

        store
            .reorder(&[c, RecordId::new(999), a, b])
            .await
            .unwrap();

        let listed: Vec<(RecordId, i64)> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|r| (r.id, r.position))
            .collect();
        assert_eq!(listed, vec![(c, 0), (a, 2), (b, 3)]);
    }

    #[tokio::test]
    async fn list_breaks_position_ties_by_id() {
        let store = store().await;
        let a = store.create(&new_record("a.png")).await.unwrap();
        let b = store.create(&new_record("b.png")).await.unwrap();

        store.reorder(&[b]).await.unwrap();

        let ids: Vec<RecordId> = store.list().await.unwrap().into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![a, b]);
    }
}
