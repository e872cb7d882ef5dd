pub mod connection;

pub use connection::{ConnectionManager, Connector, PgConnector};

use sqlx::PgPool;
use tracing::info;

pub type Database = ConnectionManager<PgConnector>;

pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("src/db/migrations").run(pool).await?;
    info!("Migrations applied");
    Ok(())
}
