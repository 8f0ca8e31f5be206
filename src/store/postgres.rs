//! Postgres-backed store.

use super::{
    CredentialStore, InsertOutcome, QuestionResult, ResultStore, Store, StoreError,
    StudentIdentity, TestResult,
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{Connection, PgPool, Row, postgres::PgPoolOptions, types::Json};
use std::time::Duration;
use tracing::{Instrument, info_span};

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open the shared connection pool.
    ///
    /// # Errors
    /// Returns an error if the database cannot be reached.
    pub async fn connect(dsn: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(max_connections)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await
            .context("Failed to connect to database")?;

        Ok(Self::new(pool))
    }

    /// Create the portal tables and indexes if they are missing.
    ///
    /// # Errors
    /// Returns an error if any schema statement fails.
    pub async fn apply_schema(&self) -> Result<(), StoreError> {
        for statement in split_sql_statements(SCHEMA_SQL) {
            let span = info_span!(
                "db.query",
                db.system = "postgresql",
                db.operation = "DDL",
                db.statement = statement.as_str()
            );
            sqlx::query(&statement)
                .execute(&self.pool)
                .instrument(span)
                .await
                .map_err(|err| StoreError::Schema(format!("{statement}: {err}")))?;
        }
        Ok(())
    }

    /// Insert a graded result. The portal itself never writes results; this
    /// is used to seed data for local runs and tests.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_result(&self, result: &TestResult) -> Result<(), StoreError> {
        let query = r"
            INSERT INTO student_scores
                (prn, test_id, student_name, total_marks, max_marks, results)
            VALUES ($1, $2, $3, $4, $5, $6)
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(&result.identifier)
            .bind(&result.test_id)
            .bind(result.student_name.as_deref())
            .bind(result.total_marks)
            .bind(result.max_marks)
            .bind(Json(&result.results))
            .execute(&self.pool)
            .instrument(span)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn find_identity(&self, identifier: &str) -> Result<Option<StudentIdentity>, StoreError> {
        let query = "SELECT prn, student_name, password FROM student_metadata WHERE UPPER(prn) = UPPER($1)";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(identifier)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await?;

        row.map(|row| -> Result<StudentIdentity, StoreError> {
            Ok(StudentIdentity {
                identifier: row.try_get("prn")?,
                display_name: row.try_get("student_name")?,
                secret_hash: row.try_get("password")?,
            })
        })
        .transpose()
    }

    async fn insert_identity(
        &self,
        identity: &StudentIdentity,
    ) -> Result<InsertOutcome, StoreError> {
        let query = "INSERT INTO student_metadata (prn, student_name, password) VALUES ($1, $2, $3)";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(&identity.identifier)
            .bind(&identity.display_name)
            .bind(&identity.secret_hash)
            .execute(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Created),
            Err(err) if is_unique_violation(&err) => Ok(InsertOutcome::Conflict),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl ResultStore for PgStore {
    async fn find_results(&self, identifier: &str) -> Result<Vec<TestResult>, StoreError> {
        let query = r"
            SELECT prn, test_id, student_name, total_marks, max_marks, results
            FROM student_scores
            WHERE UPPER(prn) = UPPER($1)
            ORDER BY id
        ";
        let span = info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let rows = sqlx::query(query)
            .bind(identifier)
            .fetch_all(&self.pool)
            .instrument(span)
            .await?;

        rows.into_iter()
            .map(|row| -> Result<TestResult, StoreError> {
                let Json(results): Json<Vec<QuestionResult>> = row.try_get("results")?;
                Ok(TestResult {
                    identifier: row.try_get("prn")?,
                    test_id: row.try_get("test_id")?,
                    student_name: row.try_get("student_name")?,
                    total_marks: row.try_get("total_marks")?,
                    max_marks: row.try_get("max_marks")?,
                    results,
                })
            })
            .collect()
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend_tag(&self) -> &'static str {
        "postgresql"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let acquire_span = info_span!(
            "db.acquire",
            db.system = "postgresql",
            db.operation = "ACQUIRE"
        );
        let mut conn = self.pool.acquire().instrument(acquire_span).await?;
        let ping_span = info_span!("db.ping", db.system = "postgresql", db.operation = "PING");
        conn.ping().instrument(ping_span).await?;
        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

/// Split a schema file into individual statements on trailing `;`.
fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("--") {
            continue;
        }
        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') {
            statements.push(current.trim().to_string());
            current.clear();
        }
    }

    let leftover = current.trim();
    if !leftover.is_empty() {
        statements.push(leftover.to_string());
    }

    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_sql_statements_skips_comments_and_blank_lines() {
        let sql = "-- header\nCREATE TABLE a (\n  id INT\n);\n\nCREATE INDEX b ON a (id);\n";
        let statements = split_sql_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE a"));
        assert!(statements[0].ends_with(");"));
        assert_eq!(statements[1], "CREATE INDEX b ON a (id);");
    }

    #[test]
    fn split_sql_statements_keeps_unterminated_tail() {
        let statements = split_sql_statements("SELECT 1;\nSELECT 2");
        assert_eq!(statements, vec!["SELECT 1;".to_string(), "SELECT 2".to_string()]);
    }

    #[test]
    fn bundled_schema_declares_unique_identifier_index() {
        let statements = split_sql_statements(SCHEMA_SQL);
        assert_eq!(statements.len(), 4);
        assert!(
            statements
                .iter()
                .any(|s| s.starts_with("CREATE UNIQUE INDEX") && s.contains("UPPER(prn)"))
        );
    }
}
