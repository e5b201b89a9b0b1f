use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{decode_categories, encode_categories},
    models::{feedback::DATE_FORMAT, FeedbackEvent, FeedbackInput},
};

fn row_to_feedback(row: &Row) -> Result<FeedbackEvent> {
    let positive: String = row.get("positive")?;
    let negative: String = row.get("negative")?;

    Ok(FeedbackEvent {
        id: row.get("id")?,
        positive: decode_categories(&positive, "positive")?,
        negative: decode_categories(&negative, "negative")?,
        date: row.get("date")?,
        source: row.get("source")?,
        created_at: row.get("created_at")?,
    })
}

impl Database {
    /// Append a feedback row and return its AUTOINCREMENT id.
    pub async fn insert_feedback(&self, input: FeedbackInput, created_at: i64) -> Result<i64> {
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO feedback (positive, negative, date, source, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    encode_categories(&input.positive)?,
                    encode_categories(&input.negative)?,
                    input.date,
                    input.source,
                    created_at,
                ],
            )
            .context("failed to insert feedback")?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    pub async fn list_feedback(&self) -> Result<Vec<FeedbackEvent>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, positive, negative, date, source, created_at
                 FROM feedback
                 ORDER BY created_at DESC, id DESC",
            )?;

            let mut rows = stmt.query([])?;
            let mut events = Vec::new();
            while let Some(row) = rows.next()? {
                events.push(row_to_feedback(row)?);
            }

            Ok(events)
        })
        .await
    }

    /// Feedback whose `date` starts with the given calendar day.
    pub async fn list_feedback_on(&self, day: NaiveDate) -> Result<Vec<FeedbackEvent>> {
        let day = day.format(DATE_FORMAT).to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, positive, negative, date, source, created_at
                 FROM feedback
                 WHERE substr(date, 1, 10) = ?1
                 ORDER BY created_at DESC, id DESC",
            )?;

            let mut rows = stmt.query(params![day])?;
            let mut events = Vec::new();
            while let Some(row) = rows.next()? {
                events.push(row_to_feedback(row)?);
            }

            Ok(events)
        })
        .await
    }

    /// Delete every row and reset the id sequence so the next insert gets id 1.
    pub async fn clear_feedback(&self) -> Result<()> {
        self.execute(|conn| {
            let tx = conn
                .transaction()
                .context("failed to open clear transaction")?;
            tx.execute("DELETE FROM feedback", [])?;
            tx.execute("DELETE FROM sqlite_sequence WHERE name = 'feedback'", [])?;
            tx.commit().context("failed to commit clear")?;
            Ok(())
        })
        .await
    }
}
