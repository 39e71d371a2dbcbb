//! User model

use serde::Serialize;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use chrono::{DateTime, Utc};

/// Unique constraint on `users.username`, named in the schema
pub const USERNAME_CONSTRAINT: &str = "users_username_key";

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_active: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub date_joined: DateTime<Utc>,
}

#[derive(Debug)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
}

impl User {
    pub async fn create(pool: &PgPool, data: CreateUser, password_hash: String) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING *
            "#
        )
        .bind(&data.username)
        .bind(&data.email)
        .bind(&password_hash)
        .fetch_one(pool)
        .await
    }

    /// Lookup ignores `is_active` so callers can tell "no account" from "cannot log in"
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(pool)
            .await
    }

    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::run_migrations;

    fn account(username: &str, email: &str) -> CreateUser {
        CreateUser {
            username: username.to_string(),
            email: email.to_string(),
        }
    }

    #[sqlx::test(migrations = false)]
    async fn test_create_and_find(pool: PgPool) {
        run_migrations(&pool).await.unwrap();

        let user = User::create(&pool, account("이보람", "boram@daycare.kr"), "hash".to_string())
            .await
            .unwrap();
        assert!(user.is_active);
        assert!(user.last_login.is_none());

        let by_email = User::find_by_email(&pool, "boram@daycare.kr").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);
        let by_name = User::find_by_username(&pool, "이보람").await.unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
        assert!(User::find_by_email(&pool, "nobody@daycare.kr").await.unwrap().is_none());

        User::update_last_login(&pool, user.id).await.unwrap();
        let refreshed = User::find_by_email(&pool, "boram@daycare.kr").await.unwrap().unwrap();
        assert!(refreshed.last_login.is_some());
    }

    #[sqlx::test(migrations = false)]
    async fn test_duplicate_username_names_its_constraint(pool: PgPool) {
        run_migrations(&pool).await.unwrap();

        User::create(&pool, account("이보람", "a@daycare.kr"), "hash".to_string()).await.unwrap();
        let err = User::create(&pool, account("이보람", "b@daycare.kr"), "hash".to_string())
            .await
            .unwrap_err();

        match err {
            sqlx::Error::Database(e) => {
                assert!(e.is_unique_violation());
                assert_eq!(e.constraint(), Some(USERNAME_CONSTRAINT));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
