#[cfg(test)]
pub mod test_utils {
    use crate::auth::{hash_password, JwtConfig};
    use crate::cli::commands::create_admin::seed_admin;
    use crate::config::{build_cache, AppConfig};
    use crate::router::create_router;
    use crate::schemas::AppState;
    use axum::http::HeaderValue;
    use axum::Router;
    use chrono::Utc;
    use migration::{Migrator, MigratorTrait};
    use model::entities::admin_user::{self, AdminRole};
    use sea_orm::{ActiveModelTrait, ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter, Set};
    use std::sync::Arc;
    use tracing::Level;
    use tracing_subscriber::FmtSubscriber;

    pub const TEST_JWT_SECRET: &str = "test-secret";
    pub const BOOTSTRAP_EMAIL: &str = "admin@room.tn";
    pub const BOOTSTRAP_PASSWORD: &str = "admin@room.tn";

    /// Create an in-memory SQLite database for testing
    pub async fn setup_test_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");

        // Run migrations
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");

        db
    }

    /// Create AppState for testing, seeded with the bootstrap super admin
    pub async fn setup_test_app_state() -> AppState {
        let db = setup_test_db().await;

        seed_admin(&db, BOOTSTRAP_EMAIL, BOOTSTRAP_PASSWORD, "Administrateur")
            .await
            .expect("Failed to seed bootstrap admin");

        let config = AppConfig::new(JwtConfig::new(TEST_JWT_SECRET, 24));

        AppState {
            db,
            cache: build_cache(),
            catalog_generation: Arc::default(),
            config: Arc::new(config),
        }
    }

    /// Initialize tracing for tests with output to STDERR.
    ///
    /// The log level is read from RUST_LOG and defaults to WARN.
    fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
        let log_level = std::env::var("RUST_LOG")
            .ok()
            .and_then(|level| match level.to_uppercase().as_str() {
                "ERROR" => Some(Level::ERROR),
                "WARN" => Some(Level::WARN),
                "INFO" => Some(Level::INFO),
                "DEBUG" => Some(Level::DEBUG),
                "TRACE" => Some(Level::TRACE),
                _ => None,
            })
            .unwrap_or(Level::WARN);

        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    /// Create axum app for testing, returning the state for direct DB access
    pub async fn setup_test_app_with_state() -> (Router, AppState) {
        let _ = init_test_tracing();

        let state = setup_test_app_state().await;
        let router = create_router(state.clone());
        (router, state)
    }

    /// Create axum app for testing
    pub async fn setup_test_app() -> Router {
        setup_test_app_with_state().await.0
    }

    /// Inserts an admin account directly, bypassing the API.
    pub async fn insert_admin(
        state: &AppState,
        email: &str,
        password: &str,
        role: AdminRole,
        is_approved: bool,
    ) -> admin_user::Model {
        admin_user::ActiveModel {
            email: Set(email.to_string()),
            full_name: Set(format!("Test {email}")),
            password_hash: Set(hash_password(password).expect("Failed to hash password")),
            role: Set(role),
            is_approved: Set(is_approved),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&state.db)
        .await
        .expect("Failed to insert admin")
    }

    /// Token of the seeded super admin
    pub async fn super_admin_token(state: &AppState) -> String {
        let admin = admin_user::Entity::find()
            .filter(admin_user::Column::Email.eq(BOOTSTRAP_EMAIL))
            .one(&state.db)
            .await
            .expect("Failed to query bootstrap admin")
            .expect("Bootstrap admin missing");
        state.config.jwt.issue(&admin).expect("Failed to issue token")
    }

    /// Token of a freshly created, approved, regular admin
    pub async fn admin_token(state: &AppState) -> String {
        let admin = insert_admin(state, "staff@room.tn", "staff-password", AdminRole::Admin, true).await;
        state.config.jwt.issue(&admin).expect("Failed to issue token")
    }

    pub fn bearer(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {token}")).expect("Invalid header value")
    }
}
