//! Database module - PostgreSQL connection and migrations

use sqlx::{postgres::PgPoolOptions, PgPool};

/// Create database connection pool
pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await
}

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Multi-statement script, so it goes through the simple query protocol
    sqlx::raw_sql(SCHEMA_SQL)
        .execute(pool)
        .await?;

    tracing::info!("Database schema applied successfully");
    Ok(())
}

/// Database schema SQL
const SCHEMA_SQL: &str = r#"
-- Users
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    username VARCHAR(150) NOT NULL CONSTRAINT users_username_key UNIQUE,
    email VARCHAR(254) NOT NULL CONSTRAINT users_email_key UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT true,
    last_login TIMESTAMPTZ,
    date_joined TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Child observations (one assessment each)
CREATE TABLE IF NOT EXISTS child_observations (
    id BIGSERIAL PRIMARY KEY,
    child_name VARCHAR(100) NOT NULL,
    age INT NOT NULL,
    gender VARCHAR(10) NOT NULL,
    attendance VARCHAR(10) NOT NULL,
    negative_language VARCHAR(10) NOT NULL,
    parental_aggression VARCHAR(10) NOT NULL,
    contact_reaction VARCHAR(10) NOT NULL,
    sibling INT NOT NULL DEFAULT 0,
    income_level VARCHAR(10) NOT NULL,
    emotional_state VARCHAR(10) NOT NULL,
    is_danger BOOLEAN NOT NULL DEFAULT false,
    observation_date TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Prediction history (dashboard chart)
CREATE TABLE IF NOT EXISTS prediction_history (
    id BIGSERIAL PRIMARY KEY,
    child_name VARCHAR(100) NOT NULL,
    predicted_result VARCHAR(10) NOT NULL,
    predicted_prob DOUBLE PRECISION,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

-- Indexes
CREATE INDEX IF NOT EXISTS idx_observations_date ON child_observations(observation_date);
CREATE INDEX IF NOT EXISTS idx_prediction_history_created ON prediction_history(created_at);
"#;
