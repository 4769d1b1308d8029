use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

const SCHEMA: &[(&str, &str)] = &[
    (
        "mock_interviews",
        r#"
        CREATE TABLE IF NOT EXISTS mock_interviews (
            id              SERIAL PRIMARY KEY,
            mock_id         UUID NOT NULL UNIQUE,
            json_mock_resp  TEXT NOT NULL,
            job_position    VARCHAR NOT NULL,
            job_desc        VARCHAR NOT NULL,
            job_experience  VARCHAR NOT NULL,
            created_by      VARCHAR NOT NULL,
            created_at      DATE NOT NULL DEFAULT CURRENT_DATE
        )
        "#,
    ),
    (
        "question_sets",
        r#"
        CREATE TABLE IF NOT EXISTS question_sets (
            id                  SERIAL PRIMARY KEY,
            mock_id             UUID NOT NULL UNIQUE,
            question_json_resp  TEXT NOT NULL,
            job_position        VARCHAR NOT NULL,
            job_desc            VARCHAR NOT NULL,
            job_experience      VARCHAR NOT NULL,
            type_question       VARCHAR NOT NULL,
            company             VARCHAR NOT NULL,
            created_by          VARCHAR NOT NULL,
            created_at          DATE NOT NULL DEFAULT CURRENT_DATE
        )
        "#,
    ),
    (
        "user_answers",
        r#"
        CREATE TABLE IF NOT EXISTS user_answers (
            id           SERIAL PRIMARY KEY,
            mock_id_ref  UUID NOT NULL,
            question     VARCHAR NOT NULL,
            correct_ans  TEXT,
            user_ans     TEXT,
            feedback     TEXT,
            rating       TEXT,
            user_email   VARCHAR,
            created_at   DATE NOT NULL DEFAULT CURRENT_DATE
        )
        "#,
    ),
];

/// Ensures the three record tables exist. Idempotent; safe to run on every start.
pub async fn init_schema(pool: &PgPool) -> Result<()> {
    for (table, ddl) in SCHEMA {
        sqlx::query(ddl).execute(pool).await?;
        info!("Table '{table}' ready");
    }

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS user_answers_mock_id_ref_idx ON user_answers (mock_id_ref)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
