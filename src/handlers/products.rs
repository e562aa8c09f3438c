use crate::auth::AuthenticatedAdmin;
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::schemas::{
    ApiResponse, AppState, CachedData, ErrorResponse, FacetsApiResponse, ProductApiResponse,
    ProductListApiResponse,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_valid::Valid;
use chrono::{DateTime, Utc};
use compute::catalog::{self, CategorySlug, ProductFilter, SortOrder};
use model::entities::product::{self, Gender, StringList};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, EntityTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::{atomic::Ordering, Arc};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

const CATALOG_CACHE_KEY: &str = "products:all";
const DEFAULT_CATEGORY: &str = "T-Shirts";

fn non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative"));
    }
    Ok(())
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

fn known_sort(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<SortOrder>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("unknown_sort"))
}

/// Splits a comma separated query value, dropping empty entries.
fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Query parameters for browsing the catalog
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams, Validate)]
pub struct ProductQuery {
    /// Category slug: homme, femme or enfant. Anything else lists every product.
    pub category: Option<String>,
    /// Inclusive lower price bound (TND)
    #[validate(custom(function = "non_negative"))]
    pub min_price: Option<Decimal>,
    /// Inclusive upper price bound (TND)
    #[validate(custom(function = "non_negative"))]
    pub max_price: Option<Decimal>,
    /// Comma separated colors; a product matches when it offers any of them
    pub colors: Option<String>,
    /// Comma separated sizes; a product matches when it offers any of them
    pub sizes: Option<String>,
    /// Only featured (or only non featured) products
    pub featured: Option<bool>,
    /// name, price-low, price-high or newest
    #[validate(custom(function = "known_sort"))]
    pub sort: Option<String>,
}

impl ProductQuery {
    fn filter(&self) -> ProductFilter {
        ProductFilter {
            category: self.category.as_deref().and_then(CategorySlug::parse),
            min_price: self.min_price,
            max_price: self.max_price,
            colors: split_list(self.colors.as_deref()),
            sizes: split_list(self.sizes.as_deref()),
            featured: self.featured,
        }
    }

    fn sort_order(&self) -> SortOrder {
        self.sort
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

/// Query parameters for catalog facets
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct FacetsQuery {
    /// Category slug: homme, femme or enfant
    pub category: Option<String>,
}

/// Request body for creating a product
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateProductRequest {
    #[validate(custom(function = "not_blank"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Unit price in TND
    #[validate(custom(function = "non_negative"))]
    pub price: Decimal,
    /// Free text category label (default "T-Shirts")
    pub category: Option<String>,
    /// Defaults to unisexe
    pub gender: Option<Gender>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default, alias = "stockQuantity")]
    #[validate(range(min = 0))]
    pub stock_quantity: i32,
    #[serde(default, alias = "isFeatured")]
    pub is_featured: bool,
}

/// Request body for updating a product. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateProductRequest {
    #[validate(custom(function = "not_blank"))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(custom(function = "non_negative"))]
    pub price: Option<Decimal>,
    pub category: Option<String>,
    pub gender: Option<Gender>,
    pub images: Option<Vec<String>>,
    pub sizes: Option<Vec<String>>,
    pub colors: Option<Vec<String>>,
    #[serde(alias = "stockQuantity")]
    #[validate(range(min = 0))]
    pub stock_quantity: Option<i32>,
    #[serde(alias = "isFeatured")]
    pub is_featured: Option<bool>,
}

/// Product response model
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub category: String,
    pub gender: Gender,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock_quantity: i32,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl From<product::Model> for ProductResponse {
    fn from(model: product::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            price: model.price,
            category: model.category,
            gender: model.gender,
            images: model.images.0,
            sizes: model.sizes.0,
            colors: model.colors.0,
            stock_quantity: model.stock_quantity,
            is_featured: model.is_featured,
            created_at: model.created_at,
        }
    }
}

/// Colors and sizes available in a category
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FacetsResponse {
    /// Page title for the category
    pub title: String,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
}

/// Returns the unfiltered catalog, from cache when possible.
fn catalog_cache_key(generation: u64) -> String {
    format!("{CATALOG_CACHE_KEY}:{generation}")
}

/// Loads the unfiltered catalog through the cache. The entry is keyed by the
/// generation read before querying, so a load racing a write can only fill a
/// key that later readers no longer look up.
async fn load_catalog(state: &AppState) -> ApiResult<Arc<Vec<product::Model>>> {
    let generation = state.catalog_generation.load(Ordering::Acquire);
    let key = catalog_cache_key(generation);
    if let Some(CachedData::Products(products)) = state.cache.get(&key).await {
        trace!("Catalog served from cache (generation {})", generation);
        return Ok(products);
    }

    debug!("Catalog cache miss for generation {}, loading products from database", generation);
    let products = Arc::new(
        product::Entity::find()
            .order_by_asc(product::Column::Id)
            .all(&state.db)
            .await?,
    );
    state
        .cache
        .insert(key, CachedData::Products(products.clone()))
        .await;
    Ok(products)
}

/// Called after a product write has completed.
async fn invalidate_catalog(state: &AppState) {
    let previous = state.catalog_generation.fetch_add(1, Ordering::AcqRel);
    state.cache.invalidate(&catalog_cache_key(previous)).await;
}

/// List products, filtered and sorted
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "products",
    params(ProductQuery),
    responses(
        (status = 200, description = "Products retrieved successfully", body = ProductListApiResponse),
        (status = 400, description = "Invalid query", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_products(
    State(state): State<AppState>,
    Valid(Query(query)): Valid<Query<ProductQuery>>,
) -> ApiResult<Json<ApiResponse<Vec<ProductResponse>>>> {
    trace!("Entering get_products function");
    let catalog = load_catalog(&state).await?;
    let filter = query.filter();
    debug!("Browsing catalog with filter: {:?}", filter);

    let products: Vec<ProductResponse> = catalog::browse(&catalog, &filter, query.sort_order())
        .into_iter()
        .map(ProductResponse::from)
        .collect();

    info!("Successfully retrieved {} products", products.len());
    Ok(Json(ApiResponse::ok(products, "Products retrieved successfully")))
}

/// Colors and sizes offered in a category
#[utoipa::path(
    get,
    path = "/api/products/facets",
    tag = "products",
    params(FacetsQuery),
    responses(
        (status = 200, description = "Facets retrieved successfully", body = FacetsApiResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_product_facets(
    State(state): State<AppState>,
    Query(query): Query<FacetsQuery>,
) -> ApiResult<Json<ApiResponse<FacetsResponse>>> {
    trace!("Entering get_product_facets function");
    let category = query.category.as_deref().and_then(CategorySlug::parse);
    let catalog = load_catalog(&state).await?;
    let facets = catalog::facets(&catalog, category);

    let response = FacetsResponse {
        title: catalog::category_title(category).to_string(),
        colors: facets.colors,
        sizes: facets.sizes,
    };
    Ok(Json(ApiResponse::ok(response, "Facets retrieved successfully")))
}

/// Get a specific product by ID
#[utoipa::path(
    get,
    path = "/api/products/{product_id}",
    tag = "products",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    responses(
        (status = 200, description = "Product retrieved successfully", body = ProductApiResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_product(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<ProductResponse>>> {
    trace!("Entering get_product function for product_id: {}", product_id);

    match product::Entity::find_by_id(product_id).one(&state.db).await? {
        Some(model) => {
            info!("Successfully retrieved product with ID: {}", model.id);
            Ok(Json(ApiResponse::ok(
                ProductResponse::from(model),
                "Product retrieved successfully",
            )))
        }
        None => {
            warn!("Product with ID {} not found", product_id);
            Err(ApiError::not_found("Product not found"))
        }
    }
}

/// Create a new product
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "products",
    request_body = CreateProductRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Product created successfully", body = ProductApiResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 403, description = "Not an admin", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_product(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    ApiJson(request): ApiJson<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<ProductResponse>>)> {
    trace!("Entering create_product function");
    request.validate()?;
    debug!("Creating product '{}' at price {}", request.name, request.price);

    let new_product = product::ActiveModel {
        name: Set(request.name.trim().to_string()),
        description: Set(request.description),
        price: Set(request.price),
        category: Set(request.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string())),
        gender: Set(request.gender.unwrap_or_default()),
        images: Set(StringList(request.images)),
        sizes: Set(StringList(request.sizes)),
        colors: Set(StringList(request.colors)),
        stock_quantity: Set(request.stock_quantity),
        is_featured: Set(request.is_featured),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    let model = new_product.insert(&state.db).await?;
    invalidate_catalog(&state).await;

    info!("Product created successfully with ID: {}, name: {}", model.id, model.name);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(ProductResponse::from(model), "Product created successfully")),
    ))
}

/// Update an existing product
#[utoipa::path(
    put,
    path = "/api/products/{product_id}",
    tag = "products",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    request_body = UpdateProductRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Product updated successfully", body = ProductApiResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_product(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
    ApiJson(request): ApiJson<UpdateProductRequest>,
) -> ApiResult<Json<ApiResponse<ProductResponse>>> {
    trace!("Entering update_product function for product_id: {}", product_id);
    request.validate()?;

    let Some(existing) = product::Entity::find_by_id(product_id).one(&state.db).await? else {
        warn!("Product with ID {} not found for update", product_id);
        return Err(ApiError::not_found("Product not found"));
    };

    let mut active: product::ActiveModel = existing.into();
    if let Some(name) = request.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = request.description {
        active.description = Set(description);
    }
    if let Some(price) = request.price {
        active.price = Set(price);
    }
    if let Some(category) = request.category {
        active.category = Set(category);
    }
    if let Some(gender) = request.gender {
        active.gender = Set(gender);
    }
    if let Some(images) = request.images {
        active.images = Set(StringList(images));
    }
    if let Some(sizes) = request.sizes {
        active.sizes = Set(StringList(sizes));
    }
    if let Some(colors) = request.colors {
        active.colors = Set(StringList(colors));
    }
    if let Some(stock_quantity) = request.stock_quantity {
        active.stock_quantity = Set(stock_quantity);
    }
    if let Some(is_featured) = request.is_featured {
        active.is_featured = Set(is_featured);
    }

    let model = active.update(&state.db).await?;
    invalidate_catalog(&state).await;

    info!("Product {} updated successfully", model.id);
    Ok(Json(ApiResponse::ok(
        ProductResponse::from(model),
        "Product updated successfully",
    )))
}

/// Delete a product. Past order lines keep their snapshot and lose the link.
#[utoipa::path(
    delete,
    path = "/api/products/{product_id}",
    tag = "products",
    params(
        ("product_id" = i32, Path, description = "Product ID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Product deleted successfully"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Product not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_product(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
) -> ApiResult<StatusCode> {
    trace!("Entering delete_product function for product_id: {}", product_id);

    let result = product::Entity::delete_by_id(product_id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        warn!("Product with ID {} not found for deletion", product_id);
        return Err(ApiError::not_found("Product not found"));
    }
    invalidate_catalog(&state).await;

    info!("Product {} deleted successfully", product_id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test_utils::setup_test_app_state;

    #[tokio::test]
    async fn test_late_catalog_fill_does_not_hide_new_product() {
        let state = setup_test_app_state().await;

        // A reader starts loading the empty catalog
        let stale_generation = state.catalog_generation.load(Ordering::Acquire);
        let stale = load_catalog(&state).await.unwrap();
        assert!(stale.is_empty());

        // A write lands before the reader stores its result
        product::ActiveModel {
            name: Set("Nouveauté".to_string()),
            description: Set(String::new()),
            price: Set(Decimal::new(30, 0)),
            category: Set(DEFAULT_CATEGORY.to_string()),
            gender: Set(Gender::Unisexe),
            images: Set(StringList::default()),
            sizes: Set(StringList::default()),
            colors: Set(StringList::default()),
            stock_quantity: Set(0),
            is_featured: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&state.db)
        .await
        .unwrap();
        invalidate_catalog(&state).await;

        state
            .cache
            .insert(catalog_cache_key(stale_generation), CachedData::Products(stale))
            .await;

        let catalog = load_catalog(&state).await.unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog[0].name, "Nouveauté");
    }
}
