use crate::auth::AuthenticatedAdmin;
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, OrderApiResponse, OrderListApiResponse};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use compute::{cart::Cart, invoice, ComputeError};
use model::entities::{order, order::OrderStatus, order_item, product};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, LoaderTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, error, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// One line of a checkout request
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema, Validate)]
pub struct CheckoutItem {
    #[serde(alias = "productId")]
    pub product_id: i32,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub color: String,
    /// At most 999 units per line
    #[validate(range(min = 1, max = 999))]
    pub quantity: i64,
}

/// Public checkout request
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateOrderRequest {
    #[serde(alias = "fullName")]
    #[validate(length(min = 1))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub phone: String,
    #[serde(alias = "shippingAddress")]
    #[validate(length(min = 1))]
    pub shipping_address: String,
    #[validate(length(min = 1), nested)]
    pub items: Vec<CheckoutItem>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: i32,
    /// Null once the product has been deleted
    pub product_id: Option<i32>,
    pub name: String,
    pub size: String,
    pub color: String,
    pub quantity: i32,
    /// Unit price at the time of the order
    pub price: Decimal,
}

impl From<order_item::Model> for OrderItemResponse {
    fn from(model: order_item::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            name: model.name,
            size: model.size,
            color: model.color,
            quantity: model.quantity,
            price: model.price,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderResponse {
    pub id: i32,
    pub customer_full_name: String,
    pub customer_email: String,
    pub phone: String,
    pub shipping_address: String,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItemResponse>,
}

impl OrderResponse {
    fn new(order: order::Model, items: Vec<order_item::Model>) -> Self {
        Self {
            id: order.id,
            customer_full_name: order.customer_full_name,
            customer_email: order.customer_email,
            phone: order.phone,
            shipping_address: order.shipping_address,
            total_amount: order.total_amount,
            status: order.status,
            created_at: order.created_at,
            items: items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

async fn load_items(db: &DatabaseConnection, order_id: i32) -> ApiResult<Vec<order_item::Model>> {
    Ok(order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?)
}

/// List all orders, newest first
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = "orders",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Orders retrieved successfully", body = OrderListApiResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_orders(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
) -> ApiResult<Json<ApiResponse<Vec<OrderResponse>>>> {
    trace!("Entering get_orders function");

    let orders = order::Entity::find()
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(&state.db)
        .await?;
    let items = orders.load_many(order_item::Entity, &state.db).await?;
    debug!("Loaded {} orders with their items", orders.len());

    let responses: Vec<OrderResponse> = orders
        .into_iter()
        .zip(items)
        .map(|(order, mut items)| {
            items.sort_by_key(|item| item.id);
            OrderResponse::new(order, items)
        })
        .collect();

    info!("Successfully retrieved {} orders", responses.len());
    Ok(Json(ApiResponse::ok(responses, "Orders retrieved successfully")))
}

/// Get one order with its items
#[utoipa::path(
    get,
    path = "/api/orders/{order_id}",
    tag = "orders",
    params(
        ("order_id" = i32, Path, description = "Order ID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order retrieved successfully", body = OrderApiResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_order(
    Path(order_id): Path<i32>,
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
) -> ApiResult<Json<ApiResponse<OrderResponse>>> {
    trace!("Entering get_order function for order_id: {}", order_id);

    let Some(order) = order::Entity::find_by_id(order_id).one(&state.db).await? else {
        warn!("Order with ID {} not found", order_id);
        return Err(ApiError::not_found("Order not found"));
    };
    let items = load_items(&state.db, order_id).await?;

    info!("Successfully retrieved order {}", order_id);
    Ok(Json(ApiResponse::ok(
        OrderResponse::new(order, items),
        "Order retrieved successfully",
    )))
}

/// Place an order. Prices and names are taken from the catalog, not the request.
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = "orders",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created successfully", body = OrderApiResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Unknown product", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email, num_items = request.items.len()))]
pub async fn create_order(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<OrderResponse>>)> {
    trace!("Entering create_order function");
    request.validate()?;

    let product_ids: Vec<i32> = request.items.iter().map(|item| item.product_id).collect();
    let products: HashMap<i32, product::Model> = product::Entity::find()
        .filter(product::Column::Id.is_in(product_ids))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let mut cart = Cart::new();
    for item in &request.items {
        let Some(product) = products.get(&item.product_id) else {
            warn!("Checkout references unknown product {}", item.product_id);
            return Err(ApiError::not_found(format!(
                "Product {} not found",
                item.product_id
            )));
        };
        let quantity = u32::try_from(item.quantity).map_err(|_| ComputeError::InvalidQuantity {
            product_id: item.product_id,
            quantity: item.quantity,
        })?;
        cart.add(product, &item.size, &item.color, quantity)?;
    }
    debug!(
        "Checkout cart: {} lines, {} units, total {}",
        cart.lines().len(),
        cart.total_items(),
        cart.total_price()
    );

    let txn = state.db.begin().await?;
    let order = order::ActiveModel {
        customer_full_name: Set(request.full_name.trim().to_string()),
        customer_email: Set(request.email.trim().to_string()),
        phone: Set(request.phone.trim().to_string()),
        shipping_address: Set(request.shipping_address.trim().to_string()),
        total_amount: Set(compute::money::round(cart.total_price())),
        status: Set(OrderStatus::Pending),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut items = Vec::with_capacity(cart.lines().len());
    for line in cart.lines() {
        let quantity = i32::try_from(line.quantity).map_err(|_| ComputeError::InvalidQuantity {
            product_id: line.key.product_id,
            quantity: i64::from(line.quantity),
        })?;
        let item = order_item::ActiveModel {
            order_id: Set(order.id),
            product_id: Set(Some(line.key.product_id)),
            name: Set(line.name.clone()),
            size: Set(line.key.size.clone()),
            color: Set(line.key.color.clone()),
            quantity: Set(quantity),
            price: Set(line.unit_price),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        items.push(item);
    }
    txn.commit().await?;

    info!("Order {} created with {} items, total {}", order.id, items.len(), order.total_amount);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(OrderResponse::new(order, items), "Order created successfully")),
    ))
}

/// Overwrites the order status, whatever it was.
async fn set_status(
    state: &AppState,
    order_id: i32,
    status: OrderStatus,
) -> ApiResult<Json<ApiResponse<OrderResponse>>> {
    let Some(existing) = order::Entity::find_by_id(order_id).one(&state.db).await? else {
        warn!("Order with ID {} not found for status change", order_id);
        return Err(ApiError::not_found("Order not found"));
    };
    debug!("Order {} status {} -> {}", order_id, existing.status, status);

    let mut active: order::ActiveModel = existing.into();
    active.status = Set(status);
    let order = active.update(&state.db).await?;
    let items = load_items(&state.db, order_id).await?;

    info!("Order {} marked {}", order_id, status);
    Ok(Json(ApiResponse::ok(
        OrderResponse::new(order, items),
        format!("Order {status}"),
    )))
}

/// Approve an order
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/approve",
    tag = "orders",
    params(
        ("order_id" = i32, Path, description = "Order ID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order approved", body = OrderApiResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn approve_order(
    Path(order_id): Path<i32>,
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
) -> ApiResult<Json<ApiResponse<OrderResponse>>> {
    trace!("Entering approve_order function for order_id: {}", order_id);
    set_status(&state, order_id, OrderStatus::Approved).await
}

/// Reject an order
#[utoipa::path(
    post,
    path = "/api/orders/{order_id}/reject",
    tag = "orders",
    params(
        ("order_id" = i32, Path, description = "Order ID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Order rejected", body = OrderApiResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn reject_order(
    Path(order_id): Path<i32>,
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
) -> ApiResult<Json<ApiResponse<OrderResponse>>> {
    trace!("Entering reject_order function for order_id: {}", order_id);
    set_status(&state, order_id, OrderStatus::Rejected).await
}

/// Download the order invoice as PDF
#[utoipa::path(
    get,
    path = "/api/orders/{order_id}/pdf",
    tag = "orders",
    params(
        ("order_id" = i32, Path, description = "Order ID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Invoice document", content_type = "application/pdf", body = Vec<u8>),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Order not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_order_pdf(
    Path(order_id): Path<i32>,
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
) -> ApiResult<Response> {
    trace!("Entering get_order_pdf function for order_id: {}", order_id);

    let Some(invoice) = invoice::load_invoice(&state.db, order_id).await? else {
        warn!("Order with ID {} not found for PDF export", order_id);
        return Err(ApiError::not_found("Order not found"));
    };
    let filename = invoice.filename();

    let bytes = tokio::task::spawn_blocking(move || invoice.render_pdf())
        .await
        .map_err(|e| {
            error!("Invoice rendering task failed: {}", e);
            ApiError::internal(e)
        })??;

    info!("Generated invoice {} ({} bytes)", filename, bytes.len());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, format!("inline; filename={filename}")),
        ],
        bytes,
    )
        .into_response())
}
