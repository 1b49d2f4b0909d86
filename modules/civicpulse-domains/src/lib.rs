pub mod issues;
pub mod users;
pub mod verification;

use civicpulse_common::Result;
use sqlx::PgPool;

/// Run the embedded SQL migrations.
pub async fn migrate(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| civicpulse_common::CivicError::Database(e.into()))?;
    Ok(())
}
