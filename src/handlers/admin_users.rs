use crate::auth::{self, AuthenticatedAdmin, SuperAdmin};
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::schemas::{
    AdminUserApiResponse, AdminUserListApiResponse, ApiResponse, AppState, ErrorResponse,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use model::entities::admin_user::{self, AdminRole};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Back-office account, without its password hash
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminUserResponse {
    pub id: i32,
    pub email: String,
    pub full_name: String,
    pub role: AdminRole,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl From<admin_user::Model> for AdminUserResponse {
    fn from(model: admin_user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            full_name: model.full_name,
            role: model.role,
            is_approved: model.is_approved,
            created_at: model.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateAdminUserRequest {
    #[serde(alias = "fullName")]
    #[validate(length(min = 1))]
    pub full_name: String,
    #[validate(email)]
    pub email: String,
    pub password: String,
    /// Defaults to admin
    pub role: Option<AdminRole>,
}

/// Partial update; absent fields are left unchanged
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateAdminUserRequest {
    #[serde(alias = "fullName")]
    #[validate(length(min = 1))]
    pub full_name: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub role: Option<AdminRole>,
    #[serde(alias = "isApproved")]
    pub is_approved: Option<bool>,
    pub password: Option<String>,
}

/// True when another account (other than `except`) already uses `email`.
pub async fn email_taken(state: &AppState, email: &str, except: Option<i32>) -> ApiResult<bool> {
    let mut query = admin_user::Entity::find().filter(admin_user::Column::Email.eq(email));
    if let Some(id) = except {
        query = query.filter(admin_user::Column::Id.ne(id));
    }
    Ok(query.count(&state.db).await? > 0)
}

fn is_bootstrap(state: &AppState, user: &admin_user::Model) -> bool {
    user.email.eq_ignore_ascii_case(&state.config.bootstrap_admin_email)
}

async fn find_admin(state: &AppState, user_id: i32) -> ApiResult<admin_user::Model> {
    admin_user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| {
            warn!("Admin user with ID {} not found", user_id);
            ApiError::not_found("Admin user not found")
        })
}

/// List back-office accounts, oldest first
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin-users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Admin users retrieved successfully", body = AdminUserListApiResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_admin_users(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
) -> ApiResult<Json<ApiResponse<Vec<AdminUserResponse>>>> {
    trace!("Entering get_admin_users function");

    let users: Vec<AdminUserResponse> = admin_user::Entity::find()
        .order_by_asc(admin_user::Column::CreatedAt)
        .order_by_asc(admin_user::Column::Id)
        .all(&state.db)
        .await?
        .into_iter()
        .map(AdminUserResponse::from)
        .collect();

    info!("Successfully retrieved {} admin users", users.len());
    Ok(Json(ApiResponse::ok(users, "Admin users retrieved successfully")))
}

/// Create an approved back-office account
#[utoipa::path(
    post,
    path = "/api/admin/users",
    tag = "admin-users",
    request_body = CreateAdminUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 201, description = "Admin user created successfully", body = AdminUserApiResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Super admin only", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn create_admin_user(
    State(state): State<AppState>,
    SuperAdmin(admin): SuperAdmin,
    ApiJson(request): ApiJson<CreateAdminUserRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AdminUserResponse>>)> {
    trace!("Entering create_admin_user function");
    request.validate()?;
    auth::validate_password(&request.password)?;

    let email = request.email.trim().to_lowercase();
    if email_taken(&state, &email, None).await? {
        warn!("Admin user creation with an email already in use");
        return Err(ApiError::Conflict("Email already in use".to_string()));
    }

    let model = admin_user::ActiveModel {
        email: Set(email),
        full_name: Set(request.full_name.trim().to_string()),
        password_hash: Set(auth::hash_password_blocking(request.password).await?),
        role: Set(request.role.unwrap_or(AdminRole::Admin)),
        is_approved: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!("Admin user {} created by {}", model.id, admin.email);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            AdminUserResponse::from(model),
            "Admin user created successfully",
        )),
    ))
}

/// Update a back-office account
#[utoipa::path(
    put,
    path = "/api/admin/users/{user_id}",
    tag = "admin-users",
    params(
        ("user_id" = i32, Path, description = "Admin user ID"),
    ),
    request_body = UpdateAdminUserRequest,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Admin user updated successfully", body = AdminUserApiResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 403, description = "Super admin only, or protected field of the main administrator", body = ErrorResponse),
        (status = 404, description = "Admin user not found", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request))]
pub async fn update_admin_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    SuperAdmin(admin): SuperAdmin,
    ApiJson(request): ApiJson<UpdateAdminUserRequest>,
) -> ApiResult<Json<ApiResponse<AdminUserResponse>>> {
    trace!("Entering update_admin_user function for user_id: {}", user_id);
    request.validate()?;

    let existing = find_admin(&state, user_id).await?;
    if is_bootstrap(&state, &existing) {
        let email_changed = request
            .email
            .as_deref()
            .is_some_and(|email| !email.trim().eq_ignore_ascii_case(&existing.email));
        let demoted = request.role.is_some_and(|role| !role.is_super_admin());
        let suspended = request.is_approved == Some(false);
        if email_changed || demoted || suspended {
            warn!("Refused change of the bootstrap admin's email, role or approval by {}", admin.email);
            return Err(ApiError::Forbidden(
                "The main administrator's email, role and approval cannot be changed".to_string(),
            ));
        }
    }
    let mut active: admin_user::ActiveModel = existing.into();

    if let Some(full_name) = request.full_name {
        active.full_name = Set(full_name.trim().to_string());
    }
    if let Some(email) = request.email {
        let email = email.trim().to_lowercase();
        if email_taken(&state, &email, Some(user_id)).await? {
            warn!("Admin user {} update to an email already in use", user_id);
            return Err(ApiError::Conflict("Email already in use".to_string()));
        }
        active.email = Set(email);
    }
    if let Some(role) = request.role {
        active.role = Set(role);
    }
    if let Some(is_approved) = request.is_approved {
        active.is_approved = Set(is_approved);
    }
    if let Some(password) = request.password {
        auth::validate_password(&password)?;
        debug!("Resetting password of admin user {}", user_id);
        active.password_hash = Set(auth::hash_password_blocking(password).await?);
    }

    let model = active.update(&state.db).await?;
    info!("Admin user {} updated by {}", model.id, admin.email);
    Ok(Json(ApiResponse::ok(
        AdminUserResponse::from(model),
        "Admin user updated successfully",
    )))
}

/// Approve a pending back-office account
#[utoipa::path(
    post,
    path = "/api/admin/users/{user_id}/approve",
    tag = "admin-users",
    params(
        ("user_id" = i32, Path, description = "Admin user ID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Admin user approved", body = AdminUserApiResponse),
        (status = 403, description = "Super admin only", body = ErrorResponse),
        (status = 404, description = "Admin user not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn approve_admin_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    SuperAdmin(admin): SuperAdmin,
) -> ApiResult<Json<ApiResponse<AdminUserResponse>>> {
    trace!("Entering approve_admin_user function for user_id: {}", user_id);

    let mut active: admin_user::ActiveModel = find_admin(&state, user_id).await?.into();
    active.is_approved = Set(true);
    let model = active.update(&state.db).await?;

    info!("Admin user {} approved by {}", model.id, admin.email);
    Ok(Json(ApiResponse::ok(
        AdminUserResponse::from(model),
        "Admin user approved",
    )))
}

/// Delete a back-office account
#[utoipa::path(
    delete,
    path = "/api/admin/users/{user_id}",
    tag = "admin-users",
    params(
        ("user_id" = i32, Path, description = "Admin user ID"),
    ),
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Admin user deleted"),
        (status = 400, description = "Cannot delete your own account", body = ErrorResponse),
        (status = 403, description = "Super admin only, or protected account", body = ErrorResponse),
        (status = 404, description = "Admin user not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn delete_admin_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    SuperAdmin(admin): SuperAdmin,
) -> ApiResult<StatusCode> {
    trace!("Entering delete_admin_user function for user_id: {}", user_id);

    let target = find_admin(&state, user_id).await?;
    if is_bootstrap(&state, &target) {
        warn!("Refused deletion of the bootstrap admin by {}", admin.email);
        return Err(ApiError::Forbidden(
            "The main administrator cannot be deleted".to_string(),
        ));
    }
    if target.id == admin.id {
        warn!("Admin {} tried to delete their own account", admin.id);
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }

    admin_user::Entity::delete_by_id(user_id).exec(&state.db).await?;
    info!("Admin user {} deleted by {}", user_id, admin.email);
    Ok(StatusCode::NO_CONTENT)
}
