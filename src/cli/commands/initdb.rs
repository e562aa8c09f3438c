use anyhow::{bail, Context, Result};
use migration::{Migrator, MigratorTrait, SchemaManager};
use sea_orm::{Database, DatabaseConnection};
use tracing::{debug, info, trace};

/// Tables the storefront expects after migrating.
pub const STOREFRONT_TABLES: [&str; 4] = ["products", "orders", "order_items", "admin_users"];

/// Applies pending migrations and returns the storefront tables now present.
pub async fn migrate(db: &DatabaseConnection) -> Result<Vec<&'static str>> {
    let pending = Migrator::get_pending_migrations(db).await?;
    info!("Applying {} pending migration(s)", pending.len());
    for migration in &pending {
        debug!("Pending migration: {}", migration.name());
    }
    Migrator::up(db, None).await.context("running migrations")?;

    let manager = SchemaManager::new(db);
    let mut present = Vec::with_capacity(STOREFRONT_TABLES.len());
    for table in STOREFRONT_TABLES {
        if manager.has_table(table).await? {
            present.push(table);
        }
    }
    Ok(present)
}

pub async fn init_database(database_url: &str) -> Result<()> {
    trace!("Entering init_database function");
    debug!("Database URL: {}", database_url);

    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("connecting to {database_url}"))?;

    let tables = migrate(&db).await?;
    if tables.len() != STOREFRONT_TABLES.len() {
        bail!(
            "migrations finished but only these tables exist: {}",
            tables.join(", ")
        );
    }

    info!("Database ready with tables: {}", tables.join(", "));
    Ok(())
}
