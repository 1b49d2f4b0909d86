use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tokio::sync::OnceCell;
use uuid::Uuid;

use civicpulse_common::{Result, Role};

/// Well-known identity used as the reporter when no authenticated caller is
/// present.
pub const ANONYMOUS_EMAIL: &str = "anonymous@civic.com";
const ANONYMOUS_USERNAME: &str = "anonymous";
const ANONYMOUS_NAME: &str = "Anonymous Citizen";
const ANONYMOUS_PHONE: &str = "0000000000";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub phone_number: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub name: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for inserting a new user.
pub struct InsertUser<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub phone_number: Option<&'a str>,
    pub password_hash: Option<&'a str>,
    pub name: &'a str,
    pub role: Role,
}

impl User {
    pub async fn create(u: InsertUser<'_>, pool: &PgPool) -> Result<Self> {
        let user = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO users (id, email, username, phone_number, password_hash, name, role)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(u.email)
        .bind(u.username)
        .bind(u.phone_number)
        .bind(u.password_hash)
        .bind(u.name)
        .bind(u.role)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Look a user up by email, username, or phone number.
    pub async fn find_by_identifier(identifier: &str, pool: &PgPool) -> Result<Option<Self>> {
        let user = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM users
            WHERE email = $1 OR username = $1 OR phone_number = $1
            LIMIT 1
            "#,
        )
        .bind(identifier)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Whether any existing user already claims one of the unique identifiers.
    pub async fn identifier_taken(
        email: &str,
        username: &str,
        phone_number: Option<&str>,
        pool: &PgPool,
    ) -> Result<bool> {
        let taken = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM users
                WHERE email = $1 OR username = $2 OR ($3::text IS NOT NULL AND phone_number = $3)
            )
            "#,
        )
        .bind(email)
        .bind(username)
        .bind(phone_number)
        .fetch_one(pool)
        .await?;

        Ok(taken)
    }

    /// Resolve the well-known anonymous reporter, creating it on first use.
    /// The upsert is idempotent: concurrent callers converge on one row.
    pub async fn get_or_create_anonymous(pool: &PgPool) -> Result<Self> {
        let user = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO users (id, email, username, phone_number, password_hash, name, role)
            VALUES ($1, $2, $3, $4, NULL, $5, 'USER')
            ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(ANONYMOUS_EMAIL)
        .bind(ANONYMOUS_USERNAME)
        .bind(ANONYMOUS_PHONE)
        .bind(ANONYMOUS_NAME)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }
}

/// Read-through guard around the anonymous reporter id: the upsert runs at
/// most once per process, later callers get the cached id.
#[derive(Default)]
pub struct AnonymousReporter {
    id: OnceCell<Uuid>,
}

impl AnonymousReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve(&self, pool: &PgPool) -> Result<Uuid> {
        let id = self
            .id
            .get_or_try_init(|| async {
                User::get_or_create_anonymous(pool).await.map(|u| u.id)
            })
            .await?;
        Ok(*id)
    }
}
