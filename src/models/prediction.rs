//! Prediction history model

use serde::Serialize;
use sqlx::{FromRow, PgPool, Postgres};
use chrono::{DateTime, Utc};

use crate::inference::Verdict;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PredictionHistory {
    pub id: i64,
    pub child_name: String,
    /// "위험" or "정상"
    pub predicted_result: String,
    /// Percentage in 0..=100; absent for class-only predictions
    pub predicted_prob: Option<f64>,
    pub created_at: DateTime<Utc>,
}

impl PredictionHistory {
    pub async fn create<'e, E>(
        executor: E,
        child_name: &str,
        verdict: Verdict,
        predicted_prob: Option<f64>,
    ) -> Result<Self, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, PredictionHistory>(
            r#"
            INSERT INTO prediction_history (child_name, predicted_result, predicted_prob)
            VALUES ($1, $2, $3)
            RETURNING *
            "#
        )
        .bind(child_name)
        .bind(verdict.as_str())
        .bind(predicted_prob)
        .fetch_one(executor)
        .await
    }

    /// Full history in insertion order
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, PredictionHistory>(
            "SELECT * FROM prediction_history ORDER BY created_at ASC, id ASC"
        )
        .fetch_all(pool)
        .await
    }

    pub async fn delete_all<'e, E>(executor: E) -> Result<u64, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM prediction_history")
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    pub fn is_danger(&self) -> bool {
        self.predicted_result == Verdict::Danger.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::run_migrations;

    #[sqlx::test(migrations = false)]
    async fn test_list_oldest_first(pool: PgPool) {
        run_migrations(&pool).await.unwrap();

        PredictionHistory::create(&pool, "윤아", Verdict::Danger, Some(85.0)).await.unwrap();
        PredictionHistory::create(&pool, "도현", Verdict::Normal, None).await.unwrap();

        let history = PredictionHistory::list(&pool).await.unwrap();
        let names: Vec<&str> = history.iter().map(|h| h.child_name.as_str()).collect();
        assert_eq!(names, vec!["윤아", "도현"]);
        assert!(history[0].is_danger());
        assert_eq!(history[0].predicted_prob, Some(85.0));
        assert!(!history[1].is_danger());
        assert_eq!(history[1].predicted_prob, None);

        assert_eq!(PredictionHistory::delete_all(&pool).await.unwrap(), 2);
    }
}
