use anyhow::Result;
use moka::future::Cache;
use sea_orm::Database;
use std::{sync::Arc, time::Duration};

use crate::auth::JwtConfig;
use crate::schemas::AppState;

pub const DEFAULT_ALLOWED_ORIGINS: [&str; 2] = ["https://roomtn.netlify.app", "http://localhost:5173"];
pub const DEFAULT_BOOTSTRAP_ADMIN_EMAIL: &str = "admin@room.tn";

/// Runtime settings shared by every handler.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt: JwtConfig,
    /// Origins allowed by the CORS layer.
    pub allowed_origins: Vec<String>,
    /// The seeded super admin. It can never be deleted.
    pub bootstrap_admin_email: String,
}

impl AppConfig {
    pub fn new(jwt: JwtConfig) -> Self {
        Self {
            jwt,
            allowed_origins: DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
            bootstrap_admin_email: DEFAULT_BOOTSTRAP_ADMIN_EMAIL.to_string(),
        }
    }

    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        if !origins.is_empty() {
            self.allowed_origins = origins;
        }
        self
    }

    pub fn with_bootstrap_admin_email(mut self, email: impl Into<String>) -> Self {
        self.bootstrap_admin_email = email.into();
        self
    }
}

pub fn build_cache() -> Cache<String, crate::schemas::CachedData> {
    Cache::builder()
        .max_capacity(1000)
        .time_to_live(Duration::from_secs(300)) // 5 minutes
        .build()
}

/// Connects to the database and assembles the application state.
pub async fn initialize_app_state(database_url: &str, config: AppConfig) -> Result<AppState> {
    tracing::info!("Connecting to database: {}", database_url);
    let db = Database::connect(database_url).await?;

    Ok(AppState {
        db,
        cache: build_cache(),
        catalog_generation: Arc::default(),
        config: Arc::new(config),
    })
}
