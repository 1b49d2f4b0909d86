use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use civicpulse_common::{geo, CivicError, GeoPoint, IssueStatus, Result, Verdict, VerdictStatus};

/// Column list shared by every issue query. `location` is a PostGIS geometry;
/// it is read back as EWKT so the codec can decode it.
const ISSUE_COLUMNS: &str = "id, title, description, category, status, reported_by, \
     ST_AsEWKT(location) AS location, images, ai_status, ai_confidence, ai_analysis, \
     created_at, updated_at";

/// A row from the issues table, location still in its EWKT storage form.
#[derive(Debug, Clone, sqlx::FromRow)]
struct IssueRow {
    id: Uuid,
    title: String,
    description: String,
    category: String,
    status: IssueStatus,
    reported_by: Uuid,
    location: String,
    images: Vec<String>,
    ai_status: VerdictStatus,
    ai_confidence: f64,
    ai_analysis: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// The issue aggregate as served to clients, coordinates decoded.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub status: IssueStatus,
    pub reported_by: Uuid,
    pub location: GeoPoint,
    pub images: Vec<String>,
    pub ai_status: VerdictStatus,
    pub ai_confidence: f64,
    pub ai_analysis: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<IssueRow> for Issue {
    type Error = CivicError;

    fn try_from(row: IssueRow) -> Result<Self> {
        let location = geo::decode_geo_point(&row.location)?;
        Ok(Self {
            id: row.id,
            title: row.title,
            description: row.description,
            category: row.category,
            status: row.status,
            reported_by: row.reported_by,
            location,
            images: row.images,
            ai_status: row.ai_status,
            ai_confidence: row.ai_confidence,
            ai_analysis: row.ai_analysis,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Parameters for the single-statement insert performed at submission time.
/// The verdict travels with the issue so both land atomically.
pub struct InsertIssue {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: String,
    pub reported_by: Uuid,
    pub location_ewkt: String,
    pub images: Vec<String>,
    pub verdict: Verdict,
}

impl Issue {
    /// Persist a new issue in one write. Status is always `REPORTED`.
    pub async fn insert(i: InsertIssue, pool: &PgPool) -> Result<Self> {
        let row = sqlx::query_as::<_, IssueRow>(&format!(
            r#"
            INSERT INTO issues
                (id, title, description, category, status, reported_by,
                 location, images, ai_status, ai_confidence, ai_analysis)
            VALUES ($1, $2, $3, $4, 'REPORTED', $5, ST_GeomFromEWKT($6), $7, $8, $9, $10)
            RETURNING {ISSUE_COLUMNS}
            "#
        ))
        .bind(i.id)
        .bind(&i.title)
        .bind(&i.description)
        .bind(&i.category)
        .bind(i.reported_by)
        .bind(&i.location_ewkt)
        .bind(&i.images)
        .bind(i.verdict.status)
        .bind(i.verdict.confidence)
        .bind(&i.verdict.analysis)
        .fetch_one(pool)
        .await?;

        row.try_into()
    }

    /// All issues, newest first. `limit` is a pagination hook; `None` returns
    /// everything.
    pub async fn list(limit: Option<i64>, pool: &PgPool) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, IssueRow>(&format!(
            r#"
            SELECT {ISSUE_COLUMNS} FROM issues
            ORDER BY created_at DESC
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(Issue::try_from).collect()
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Self> {
        let row = sqlx::query_as::<_, IssueRow>(&format!(
            "SELECT {ISSUE_COLUMNS} FROM issues WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CivicError::NotFound(format!("issue {id}")))?;

        row.try_into()
    }

    pub async fn list_by_reporter(user_id: Uuid, pool: &PgPool) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, IssueRow>(&format!(
            r#"
            SELECT {ISSUE_COLUMNS} FROM issues
            WHERE reported_by = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(Issue::try_from).collect()
    }

    /// Transition to `status`, stamping `updated_at`. Any state is reachable
    /// from any other; repeating the current status only refreshes the stamp.
    pub async fn set_status(id: Uuid, status: IssueStatus, pool: &PgPool) -> Result<Self> {
        let row = sqlx::query_as::<_, IssueRow>(&format!(
            r#"
            UPDATE issues SET status = $2, updated_at = now()
            WHERE id = $1
            RETURNING {ISSUE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CivicError::NotFound(format!("issue {id}")))?;

        row.try_into()
    }

    /// Overwrite title, description and category. Status, images and the
    /// verdict fields are never touched here; edits do not re-run
    /// verification.
    pub async fn update_details(
        id: Uuid,
        title: &str,
        description: &str,
        category: &str,
        pool: &PgPool,
    ) -> Result<Self> {
        let row = sqlx::query_as::<_, IssueRow>(&format!(
            r#"
            UPDATE issues
            SET title = $2, description = $3, category = $4, updated_at = now()
            WHERE id = $1
            RETURNING {ISSUE_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(title)
        .bind(description)
        .bind(category)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| CivicError::NotFound(format!("issue {id}")))?;

        row.try_into()
    }

    /// Hard delete.
    pub async fn delete(id: Uuid, pool: &PgPool) -> Result<()> {
        let deleted = sqlx::query_scalar::<_, Uuid>("DELETE FROM issues WHERE id = $1 RETURNING id")
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match deleted {
            Some(_) => Ok(()),
            None => Err(CivicError::NotFound(format!("issue {id}"))),
        }
    }

    /// Ownership rule for edit and delete.
    pub fn can_mutate(&self, caller: Uuid) -> bool {
        self.reported_by == caller
    }
}
