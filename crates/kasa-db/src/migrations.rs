//! Embedded schema migrations.
//!
//! Migration files live in `migrations/sqlite/` at the workspace root and
//! are compiled into the binary, so a deployed terminal never needs the
//! SQL files on disk.

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Apply any pending migrations.
pub async fn run(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!("migrations up to date");
    Ok(())
}
