use moka::future::Cache;
use model::entities::{
    admin_user::AdminRole,
    order::OrderStatus,
    product::{self, Gender},
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use std::sync::{atomic::AtomicU64, Arc};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi, ToSchema,
};

use crate::config::AppConfig;
use crate::handlers::{
    admin_users::{AdminUserResponse, CreateAdminUserRequest, UpdateAdminUserRequest},
    auth::{LoginRequest, LoginResponse, RegisterRequest},
    orders::{CheckoutItem, CreateOrderRequest, OrderItemResponse, OrderResponse},
    products::{CreateProductRequest, FacetsResponse, ProductResponse, UpdateProductRequest},
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Cache for expensive operations
    pub cache: Cache<String, CachedData>,
    pub config: Arc<AppConfig>,
    /// Bumped after every product write; catalog cache keys embed it.
    pub catalog_generation: Arc<AtomicU64>,
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    /// The whole catalog, unfiltered
    Products(Arc<Vec<product::Model>>),
}

/// API response wrapper
#[derive(Serialize, Deserialize, ToSchema)]
#[aliases(
    ProductApiResponse = ApiResponse<ProductResponse>,
    ProductListApiResponse = ApiResponse<Vec<ProductResponse>>,
    FacetsApiResponse = ApiResponse<FacetsResponse>,
    OrderApiResponse = ApiResponse<OrderResponse>,
    OrderListApiResponse = ApiResponse<Vec<OrderResponse>>,
    LoginApiResponse = ApiResponse<LoginResponse>,
    AdminUserApiResponse = ApiResponse<AdminUserResponse>,
    AdminUserListApiResponse = ApiResponse<Vec<AdminUserResponse>>,
)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Human readable error message
    pub message: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::products::get_products,
        crate::handlers::products::get_product_facets,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::delete_product,
        crate::handlers::orders::get_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::create_order,
        crate::handlers::orders::approve_order,
        crate::handlers::orders::reject_order,
        crate::handlers::orders::get_order_pdf,
        crate::handlers::auth::login,
        crate::handlers::auth::register,
        crate::handlers::auth::me,
        crate::handlers::admin_users::get_admin_users,
        crate::handlers::admin_users::create_admin_user,
        crate::handlers::admin_users::update_admin_user,
        crate::handlers::admin_users::approve_admin_user,
        crate::handlers::admin_users::delete_admin_user,
    ),
    components(
        schemas(
            ProductApiResponse,
            ProductListApiResponse,
            FacetsApiResponse,
            OrderApiResponse,
            OrderListApiResponse,
            LoginApiResponse,
            AdminUserApiResponse,
            AdminUserListApiResponse,
            ErrorResponse,
            HealthResponse,
            ProductResponse,
            CreateProductRequest,
            UpdateProductRequest,
            FacetsResponse,
            OrderResponse,
            OrderItemResponse,
            CreateOrderRequest,
            CheckoutItem,
            LoginRequest,
            LoginResponse,
            RegisterRequest,
            AdminUserResponse,
            CreateAdminUserRequest,
            UpdateAdminUserRequest,
            Gender,
            OrderStatus,
            AdminRole,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "products", description = "Catalog browsing and product management"),
        (name = "orders", description = "Checkout and order review"),
        (name = "auth", description = "Admin authentication"),
        (name = "admin-users", description = "Back-office account management"),
    ),
    info(
        title = "Room.tn API",
        description = "Room.tn t-shirt storefront backend",
        version = "0.1.0",
    )
)]
pub struct ApiDoc;
