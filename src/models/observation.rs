//! Child observation model

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool, Postgres};
use chrono::{DateTime, Utc};
use validator::Validate;

/// One stored assessment of a child
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChildObservation {
    pub id: i64,
    pub child_name: String,
    pub age: i32,
    pub gender: String,
    pub attendance: String,
    pub negative_language: String,
    pub parental_aggression: String,
    pub contact_reaction: String,
    pub sibling: i32,
    pub income_level: String,
    pub emotional_state: String,
    pub is_danger: bool,
    pub observation_date: DateTime<Utc>,
}

/// Observation fields as entered, before a verdict is attached.
///
/// Categorical fields keep their Korean labels; numeric encoding happens in
/// [`crate::inference::features`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct NewObservation {
    #[validate(length(min = 1, max = 100, message = "이름은 1자 이상 100자 이하로 입력하세요."))]
    pub child_name: String,
    #[validate(range(min = 0, max = 18, message = "나이는 0세에서 18세 사이여야 합니다."))]
    pub age: i32,
    #[validate(custom(function = "crate::forms::validate_gender"))]
    pub gender: String,
    #[validate(custom(function = "crate::forms::validate_attendance"))]
    pub attendance: String,
    #[validate(custom(function = "crate::forms::validate_level"))]
    pub negative_language: String,
    #[validate(custom(function = "crate::forms::validate_aggression"))]
    pub parental_aggression: String,
    #[validate(custom(function = "crate::forms::validate_contact_reaction"))]
    pub contact_reaction: String,
    #[validate(range(min = 0, max = 20, message = "형제자매 수는 0에서 20 사이여야 합니다."))]
    pub sibling: i32,
    #[validate(custom(function = "crate::forms::validate_level"))]
    pub income_level: String,
    #[validate(custom(function = "crate::forms::validate_emotional_state"))]
    pub emotional_state: String,
}

impl ChildObservation {
    pub async fn create<'e, E>(
        executor: E,
        data: &NewObservation,
        is_danger: bool,
    ) -> Result<Self, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ChildObservation>(
            r#"
            INSERT INTO child_observations (
                child_name, age, gender, attendance, negative_language,
                parental_aggression, contact_reaction, sibling, income_level,
                emotional_state, is_danger
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#
        )
        .bind(&data.child_name)
        .bind(data.age)
        .bind(&data.gender)
        .bind(&data.attendance)
        .bind(&data.negative_language)
        .bind(&data.parental_aggression)
        .bind(&data.contact_reaction)
        .bind(data.sibling)
        .bind(&data.income_level)
        .bind(&data.emotional_state)
        .bind(is_danger)
        .fetch_one(executor)
        .await
    }

    /// All observations, newest first
    pub async fn list_recent(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, ChildObservation>(
            "SELECT * FROM child_observations ORDER BY observation_date DESC, id DESC"
        )
        .fetch_all(pool)
        .await
    }

    pub async fn delete_all<'e, E>(executor: E) -> Result<u64, sqlx::Error>
    where
        E: sqlx::Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM child_observations")
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
