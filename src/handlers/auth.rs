use crate::auth::{self, AuthError, AuthenticatedAdmin};
use crate::error::{ApiError, ApiJson, ApiResult};
use crate::handlers::admin_users::{email_taken, AdminUserResponse};
use crate::schemas::{AdminUserApiResponse, ApiResponse, AppState, ErrorResponse, LoginApiResponse};
use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use model::entities::admin_user::{self, AdminRole};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// Bearer token for the admin API
    pub token: String,
    pub user: AdminUserResponse,
}

/// Self-service sign-up. The account waits for a super admin's approval.
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
    #[serde(alias = "fullName")]
    #[validate(length(min = 1))]
    pub full_name: String,
}

/// Exchange admin credentials for a token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginApiResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 403, description = "Account awaiting approval", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<ApiResponse<LoginResponse>>> {
    trace!("Entering login function");
    let email = request.email.trim().to_lowercase();

    let admin = admin_user::Entity::find()
        .filter(admin_user::Column::Email.eq(email.as_str()))
        .one(&state.db)
        .await?;
    let Some(admin) = admin else {
        warn!("Login attempt for unknown email");
        return Err(AuthError::InvalidCredentials.into());
    };

    if let Err(e) = auth::verify_password_blocking(request.password, admin.password_hash.clone()).await {
        warn!("Login attempt with wrong password for admin {}", admin.id);
        return Err(e.into());
    }
    if !admin.is_approved {
        warn!("Login refused for unapproved admin {}", admin.id);
        return Err(AuthError::NotApproved.into());
    }

    let token = state.config.jwt.issue(&admin)?;
    info!("Admin {} logged in", admin.id);
    Ok(Json(ApiResponse::ok(
        LoginResponse {
            token,
            user: AdminUserResponse::from(admin),
        },
        "Login successful",
    )))
}

/// Request a back-office account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created, awaiting approval", body = AdminUserApiResponse),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Email already in use", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(email = %request.email))]
pub async fn register(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<AdminUserResponse>>)> {
    trace!("Entering register function");
    request.validate()?;
    auth::validate_password(&request.password)?;

    let email = request.email.trim().to_lowercase();
    if email_taken(&state, &email, None).await? {
        warn!("Registration with an email already in use");
        return Err(ApiError::Conflict("Email already in use".to_string()));
    }

    let model = admin_user::ActiveModel {
        email: Set(email),
        full_name: Set(request.full_name.trim().to_string()),
        password_hash: Set(auth::hash_password_blocking(request.password).await?),
        role: Set(AdminRole::Admin),
        is_approved: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;

    info!("Admin {} registered, awaiting approval", model.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(
            AdminUserResponse::from(model),
            "Account created, awaiting approval",
        )),
    ))
}

/// The admin behind the bearer token
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current admin", body = AdminUserApiResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Account no longer exists", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    admin: AuthenticatedAdmin,
) -> ApiResult<Json<ApiResponse<AdminUserResponse>>> {
    trace!("Entering me function");
    let Some(model) = admin_user::Entity::find_by_id(admin.id).one(&state.db).await? else {
        warn!("Token for deleted admin {}", admin.id);
        return Err(ApiError::not_found("Admin user not found"));
    };
    debug!("Resolved current admin {}", model.id);
    Ok(Json(ApiResponse::ok(
        AdminUserResponse::from(model),
        "Admin user retrieved successfully",
    )))
}
