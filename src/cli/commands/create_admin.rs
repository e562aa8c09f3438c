use anyhow::{Context, Result};
use chrono::Utc;
use model::entities::admin_user::{self, AdminRole};
use sea_orm::{ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set};
use tracing::{info, debug, trace, warn};

use crate::auth::hash_password;

/// Inserts an approved super admin unless the email is already registered.
/// Returns whether an account was created.
pub async fn seed_admin(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
    full_name: &str,
) -> Result<bool> {
    let email = email.trim().to_lowercase();
    let existing = admin_user::Entity::find()
        .filter(admin_user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        warn!("Admin {} already exists, nothing to do", email);
        return Ok(false);
    }

    let password_hash = hash_password(password).context("hashing bootstrap password")?;
    let model = admin_user::ActiveModel {
        email: Set(email),
        full_name: Set(full_name.to_string()),
        password_hash: Set(password_hash),
        role: Set(AdminRole::SuperAdmin),
        is_approved: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!("Created super admin {} (id {})", model.email, model.id);
    Ok(true)
}

pub async fn create_admin(database_url: &str, email: &str, password: &str, full_name: &str) -> Result<()> {
    trace!("Entering create_admin function");
    debug!("Database URL: {}", database_url);

    let db = Database::connect(database_url)
        .await
        .with_context(|| format!("connecting to {database_url}"))?;
    seed_admin(&db, email, password, full_name).await?;
    Ok(())
}
