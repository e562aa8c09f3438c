use crate::handlers::{
    admin_users::{
        approve_admin_user, create_admin_user, delete_admin_user, get_admin_users, update_admin_user,
    },
    auth::{login, me, register},
    health::health_check,
    orders::{approve_order, create_order, get_order, get_order_pdf, get_orders, reject_order},
    products::{
        create_product, delete_product, get_product, get_product_facets, get_products, update_product,
    },
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post, put},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// CORS policy for the storefront and back-office origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Catalog
        .route("/api/products", get(get_products).post(create_product))
        .route("/api/products/facets", get(get_product_facets))
        .route(
            "/api/products/:product_id",
            get(get_product).put(update_product).delete(delete_product),
        )
        // Orders
        .route("/api/orders", get(get_orders).post(create_order))
        .route("/api/orders/:order_id", get(get_order))
        .route("/api/orders/:order_id/approve", post(approve_order))
        .route("/api/orders/:order_id/reject", post(reject_order))
        .route("/api/orders/:order_id/pdf", get(get_order_pdf))
        // Authentication
        .route("/api/auth/login", post(login))
        .route("/api/auth/register", post(register))
        .route("/api/auth/me", get(me))
        // Back-office accounts
        .route("/api/admin/users", get(get_admin_users).post(create_admin_user))
        .route(
            "/api/admin/users/:user_id",
            put(update_admin_user).delete(delete_admin_user),
        )
        .route("/api/admin/users/:user_id/approve", post(approve_admin_user))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(cors),
        )
        .with_state(state)
}
