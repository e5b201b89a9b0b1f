use std::path::PathBuf;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::db::{Database, FeedbackEvent, FeedbackInput};

use super::{now_millis, EventStore, StoreResult};

/// `EventStore` over the SQLite worker-thread [`Database`].
#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        Ok(Self {
            db: Database::new(path)?,
        })
    }

    pub fn from_database(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventStore for SqliteStore {
    async fn insert(&self, input: FeedbackInput) -> StoreResult<i64> {
        Ok(self.db.insert_feedback(input, now_millis()).await?)
    }

    async fn list_all(&self) -> StoreResult<Vec<FeedbackEvent>> {
        Ok(self.db.list_feedback().await?)
    }

    async fn list_by_date(&self, day: NaiveDate) -> StoreResult<Vec<FeedbackEvent>> {
        Ok(self.db.list_feedback_on(day).await?)
    }

    async fn clear_all(&self) -> StoreResult<()> {
        Ok(self.db.clear_feedback().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(date: &str, source: &str) -> FeedbackInput {
        FeedbackInput {
            positive: vec!["Foco / Produtividade".into(), "Comunicação".into()],
            negative: vec!["Nada a destacar hoje".into()],
            date: date.into(),
            source: source.into(),
        }
    }

    #[tokio::test]
    async fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("feedback.sqlite3");

        {
            let store = SqliteStore::open(path.clone()).unwrap();
            assert_eq!(store.insert(input("2024-03-01T10:00:00Z", "tablet")).await.unwrap(), 1);
        }

        let store = SqliteStore::open(path).unwrap();
        let events = store.list_all().await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].positive, vec!["Foco / Produtividade", "Comunicação"]);
        assert_eq!(events[0].source, "tablet");
        assert_eq!(store.insert(input("2024-03-01", "link")).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn clear_resets_autoincrement() {
        let store = SqliteStore::from_database(Database::open_in_memory().unwrap());
        store.insert(input("2024-03-01", "link")).await.unwrap();
        store.insert(input("2024-03-01", "link")).await.unwrap();

        store.clear_all().await.unwrap();

        assert!(store.list_all().await.unwrap().is_empty());
        assert_eq!(store.insert(input("2024-03-02", "link")).await.unwrap(), 1);
    }
}
