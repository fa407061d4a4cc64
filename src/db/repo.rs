//! Repository layer for the activity journal.

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use sqlx::Row;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// What a journal entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    CreateSubmitted,
    CreateConfirmed,
    CreateRejected,
    ExecuteSubmitted,
    ExecuteSettled,
    CancelSubmitted,
    CancelSettled,
    Reconciled,
    Failed,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::CreateSubmitted => "create_submitted",
            ActivityKind::CreateConfirmed => "create_confirmed",
            ActivityKind::CreateRejected => "create_rejected",
            ActivityKind::ExecuteSubmitted => "execute_submitted",
            ActivityKind::ExecuteSettled => "execute_settled",
            ActivityKind::CancelSubmitted => "cancel_submitted",
            ActivityKind::CancelSettled => "cancel_settled",
            ActivityKind::Reconciled => "reconciled",
            ActivityKind::Failed => "failed",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create_submitted" => Ok(ActivityKind::CreateSubmitted),
            "create_confirmed" => Ok(ActivityKind::CreateConfirmed),
            "create_rejected" => Ok(ActivityKind::CreateRejected),
            "execute_submitted" => Ok(ActivityKind::ExecuteSubmitted),
            "execute_settled" => Ok(ActivityKind::ExecuteSettled),
            "cancel_submitted" => Ok(ActivityKind::CancelSubmitted),
            "cancel_settled" => Ok(ActivityKind::CancelSettled),
            "reconciled" => Ok(ActivityKind::Reconciled),
            "failed" => Ok(ActivityKind::Failed),
            other => Err(format!("unknown activity kind: {}", other)),
        }
    }
}

/// An entry to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivity {
    pub kind: ActivityKind,
    pub position_id: Option<String>,
    pub tx_id: Option<String>,
    pub message: String,
}

impl NewActivity {
    pub fn new(kind: ActivityKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            position_id: None,
            tx_id: None,
            message: message.into(),
        }
    }

    pub fn position(mut self, id: &str) -> Self {
        self.position_id = Some(id.to_string());
        self
    }

    pub fn tx(mut self, tx_id: Option<&str>) -> Self {
        self.tx_id = tx_id.map(str::to_string);
        self
    }
}

/// A stored entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: i64,
    pub kind: ActivityKind,
    pub position_id: Option<String>,
    pub tx_id: Option<String>,
    pub message: String,
    /// RFC 3339, UTC.
    pub created_at: String,
}

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Append an entry, returning its row id.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_activity(&self, activity: &NewActivity) -> Result<i64, sqlx::Error> {
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let result = sqlx::query(
            r#"
            INSERT INTO activity (kind, position_id, tx_id, message, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(activity.kind.as_str())
        .bind(activity.position_id.as_deref())
        .bind(activity.tx_id.as_deref())
        .bind(&activity.message)
        .bind(created_at)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// The most recent `limit` entries, newest first.
    pub async fn recent_activity(&self, limit: u32) -> Result<Vec<Activity>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, kind, position_id, tx_id, message, created_at
            FROM activity
            ORDER BY id DESC
            LIMIT ?
            "#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().filter_map(activity_from_row).collect())
    }

    /// Entries touching one position, oldest first.
    pub async fn position_activity(&self, position_id: &str) -> Result<Vec<Activity>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, kind, position_id, tx_id, message, created_at
            FROM activity
            WHERE position_id = ?
            ORDER BY id ASC
            "#,
        )
        .bind(position_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().filter_map(activity_from_row).collect())
    }
}

fn activity_from_row(row: &SqliteRow) -> Option<Activity> {
    let id: i64 = row.get("id");
    let kind_str: String = row.get("kind");
    let kind = match ActivityKind::from_str(&kind_str) {
        Ok(kind) => kind,
        Err(e) => {
            warn!(id, error = %e, "Skipping journal row with unknown kind");
            return None;
        }
    };
    Some(Activity {
        id,
        kind,
        position_id: row.get("position_id"),
        tx_id: row.get("tx_id"),
        message: row.get("message"),
        created_at: row.get("created_at"),
    })
}
