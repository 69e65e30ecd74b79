//! Record persistence for inference submissions and predictions.
//!
//! The store owns record identity: every append assigns fresh guids and
//! writes the student row and its prediction row in one transaction, so a
//! reader never observes one without the other.

use serde::Serialize;
use sqlx::{Pool, Sqlite};
use uuid::Uuid;

use crate::Result;

/// Validated inference input, as handed to the store.
#[derive(Debug, Clone)]
pub struct StudentSubmission {
    pub name: String,
    pub english: f64,
    pub math: f64,
    pub science: f64,
    pub history: f64,
    pub geography: f64,
    /// Interest after vocabulary fallback, never the raw request value.
    pub interest: String,
}

/// Inference outcome for one submission.
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub career: String,
    /// Percentage in [0, 100]; None when the model cannot estimate one.
    pub confidence: Option<f64>,
}

/// Identifiers assigned by a successful append.
#[derive(Debug, Clone)]
pub struct RecordIds {
    pub student_id: Uuid,
    pub prediction_id: Uuid,
}

/// One row of the administrative listing.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PredictionListing {
    pub student_id: String,
    pub name: String,
    pub english: f64,
    pub math: f64,
    pub science: f64,
    pub history: f64,
    pub geography: f64,
    pub interest: String,
    pub career: String,
    pub confidence: Option<f64>,
    pub created_at: String,
}

/// Append-only store for (submission, prediction) pairs.
#[derive(Clone)]
pub struct RecordStore {
    db: Pool<Sqlite>,
}

impl RecordStore {
    pub fn new(db: Pool<Sqlite>) -> Self {
        Self { db }
    }

    /// Write the submission and its prediction atomically.
    ///
    /// Both inserts run inside one transaction; an error on either side
    /// rolls the whole pair back.
    pub async fn append(
        &self,
        submission: &StudentSubmission,
        outcome: &PredictionOutcome,
    ) -> Result<RecordIds> {
        let student_id = Uuid::new_v4();
        let prediction_id = Uuid::new_v4();

        let mut tx = self.db.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO students (guid, name, english, math, science, history, geography, interest, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
            "#,
        )
        .bind(student_id.to_string())
        .bind(&submission.name)
        .bind(submission.english)
        .bind(submission.math)
        .bind(submission.science)
        .bind(submission.history)
        .bind(submission.geography)
        .bind(&submission.interest)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO predictions (guid, student_id, career, confidence, created_at)
            VALUES (?, ?, ?, ?, CURRENT_TIMESTAMP)
            "#,
        )
        .bind(prediction_id.to_string())
        .bind(student_id.to_string())
        .bind(&outcome.career)
        .bind(outcome.confidence)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::debug!(
            student_id = %student_id,
            prediction_id = %prediction_id,
            career = %outcome.career,
            "Recorded prediction"
        );

        Ok(RecordIds {
            student_id,
            prediction_id,
        })
    }

    /// All recorded pairs, newest first.
    ///
    /// rowid breaks ties for pairs written within the same timestamp
    /// second, keeping the order deterministic.
    pub async fn list_all(&self) -> Result<Vec<PredictionListing>> {
        let rows = sqlx::query_as::<_, PredictionListing>(
            r#"
            SELECT s.guid AS student_id,
                   s.name,
                   s.english,
                   s.math,
                   s.science,
                   s.history,
                   s.geography,
                   s.interest,
                   p.career,
                   p.confidence,
                   p.created_at
            FROM predictions p
            JOIN students s ON s.guid = p.student_id
            ORDER BY p.created_at DESC, p.rowid DESC
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init::{create_predictions_table, create_students_table};
    use sqlx::SqlitePool;

    /// Setup in-memory test database with the production schema
    async fn setup_test_db() -> SqlitePool {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        sqlx::query("PRAGMA foreign_keys = ON")
            .execute(&pool)
            .await
            .unwrap();
        create_students_table(&pool).await.unwrap();
        create_predictions_table(&pool).await.unwrap();
        pool
    }

    fn submission(name: &str) -> StudentSubmission {
        StudentSubmission {
            name: name.to_string(),
            english: 80.0,
            math: 90.0,
            science: 75.0,
            history: 60.0,
            geography: 65.0,
            interest: "Coding".to_string(),
        }
    }

    fn outcome(career: &str, confidence: Option<f64>) -> PredictionOutcome {
        PredictionOutcome {
            career: career.to_string(),
            confidence,
        }
    }

    #[tokio::test]
    async fn append_writes_linked_pair() {
        let pool = setup_test_db().await;
        let store = RecordStore::new(pool.clone());

        let ids = store
            .append(&submission("Alice"), &outcome("Engineer", Some(87.5)))
            .await
            .unwrap();

        let linked: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM predictions WHERE guid = ? AND student_id = ?",
        )
        .bind(ids.prediction_id.to_string())
        .bind(ids.student_id.to_string())
        .fetch_one(&pool)
        .await
        .unwrap();

        assert_eq!(linked, 1);

        let stored_confidence: Option<f64> =
            sqlx::query_scalar("SELECT confidence FROM predictions WHERE guid = ?")
                .bind(ids.prediction_id.to_string())
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(stored_confidence, Some(87.5));
    }

    #[tokio::test]
    async fn append_stores_null_when_confidence_unavailable() {
        let pool = setup_test_db().await;
        let store = RecordStore::new(pool.clone());

        store
            .append(&submission("Bob"), &outcome("Teacher", None))
            .await
            .unwrap();

        let stored: Option<f64> = sqlx::query_scalar("SELECT confidence FROM predictions")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(stored, None);
    }

    #[tokio::test]
    async fn append_rolls_back_when_prediction_insert_fails() {
        let pool = setup_test_db().await;
        let store = RecordStore::new(pool.clone());

        // Out-of-range confidence violates the predictions CHECK constraint
        // after the student row was already written inside the transaction.
        let result = store
            .append(&submission("Carol"), &outcome("Doctor", Some(250.0)))
            .await;
        assert!(result.is_err());

        let students: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM students")
            .fetch_one(&pool)
            .await
            .unwrap();
        let predictions: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM predictions")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(students, 0);
        assert_eq!(predictions, 0);
    }

    #[tokio::test]
    async fn list_all_returns_newest_first() {
        let pool = setup_test_db().await;
        let store = RecordStore::new(pool);

        for name in ["Alice", "Bob", "Carol"] {
            store
                .append(&submission(name), &outcome("Engineer", Some(90.0)))
                .await
                .unwrap();
        }

        let listing = store.list_all().await.unwrap();

        assert_eq!(listing.len(), 3);
        assert_eq!(listing[0].name, "Carol");
        assert_eq!(listing[1].name, "Bob");
        assert_eq!(listing[2].name, "Alice");
    }

    #[tokio::test]
    async fn list_all_on_empty_store() {
        let pool = setup_test_db().await;
        let store = RecordStore::new(pool);

        assert!(store.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_carries_resolved_interest() {
        let pool = setup_test_db().await;
        let store = RecordStore::new(pool);

        let mut input = submission("Dana");
        input.interest = "Other".to_string();
        store
            .append(&input, &outcome("Artist", Some(55.0)))
            .await
            .unwrap();

        let listing = store.list_all().await.unwrap();
        assert_eq!(listing[0].interest, "Other");
        assert_eq!(listing[0].career, "Artist");
    }
}
