use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use croscout_auth_types::identity::Identity;
use croscout_core::response;
use croscout_domain::user::UserRole;

use crate::domain::types::{User, UserProfile, UserUpdate};
use crate::error::MarketplaceError;
use crate::state::AppState;
use crate::usecase::user::{
    ChangePasswordUseCase, DeleteUserUseCase, GetUserUseCase, ListUsersUseCase, UpdateUserUseCase,
};

/// User as returned to clients: no password hash, no pending tokens.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub tax_number: Option<String>,
    pub is_completed_profile: bool,
    pub is_email_verified: bool,
    #[serde(flatten)]
    pub profile: UserProfile,
    #[serde(serialize_with = "croscout_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "croscout_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            tax_number: user.tax_number,
            is_completed_profile: user.is_completed_profile,
            is_email_verified: user.is_email_verified,
            profile: user.profile,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

fn users_json(users: Vec<User>) -> serde_json::Value {
    json!(users.into_iter().map(UserResponse::from).collect::<Vec<_>>())
}

// ── GET /api/user/current-user ───────────────────────────────────────────────

pub async fn current_user(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(identity.user_id)
        .await
        .map_err(|e| match e {
            MarketplaceError::UserIdNotFound => MarketplaceError::UserNotFound,
            e => e,
        })?;
    Ok(response::with_payload("user", json!(UserResponse::from(user)), None))
}

// ── GET /api/user/by-userid/{userId} ─────────────────────────────────────────

pub async fn get_user(
    _identity: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let usecase = GetUserUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(user_id).await?;
    Ok(response::with_payload("user", json!(UserResponse::from(user)), None))
}

// ── GET /api/user/users/by-role?role= ────────────────────────────────────────

#[derive(Deserialize)]
pub struct ByRoleQuery {
    pub role: Option<String>,
}

pub async fn list_by_role(
    _identity: Identity,
    State(state): State<AppState>,
    Query(query): Query<ByRoleQuery>,
) -> Result<impl IntoResponse, MarketplaceError> {
    let role = query
        .role
        .as_deref()
        .map(str::parse::<UserRole>)
        .transpose()
        .map_err(|_| MarketplaceError::InvalidRole)?;
    let usecase = ListUsersUseCase {
        users: state.user_repo(),
    };
    let users = usecase.execute(role).await?;
    Ok(response::with_payload("users", users_json(users), None))
}

// ── GET /api/user/all-users ──────────────────────────────────────────────────

pub async fn list_all(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, MarketplaceError> {
    if !identity.is_admin() {
        return Err(MarketplaceError::Forbidden);
    }
    let usecase = ListUsersUseCase {
        users: state.user_repo(),
    };
    let users = usecase.execute(None).await?;
    Ok(response::with_payload("users", users_json(users), None))
}

// ── DELETE /api/user/{userId} ────────────────────────────────────────────────

pub async fn delete_user(
    identity: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, MarketplaceError> {
    if !identity.is_admin() {
        return Err(MarketplaceError::DeleteForbidden);
    }
    let usecase = DeleteUserUseCase {
        users: state.user_repo(),
    };
    usecase.execute(user_id).await?;
    tracing::info!(user_id = %user_id, by = %identity.user_id, "user deleted");
    Ok(response::message("User deleted successfully."))
}

// ── PUT /api/user/{userId} ───────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdateFields {
    pub name: Option<String>,
    pub is_completed_profile: Option<bool>,
    pub role: Option<UserRole>,
    pub tax_number: Option<String>,
    #[serde(flatten)]
    pub profile: UserProfile,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub update: Option<UserUpdateFields>,
}

pub async fn update_user(
    identity: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    if !identity.can_act_for(user_id) {
        return Err(MarketplaceError::Forbidden);
    }
    let fields = body.update.ok_or(MarketplaceError::MissingUpdate)?;
    let usecase = UpdateUserUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(
            user_id,
            UserUpdate {
                name: fields.name,
                is_completed_profile: fields.is_completed_profile,
                role: fields.role,
                tax_number: fields.tax_number,
                profile: fields.profile,
            },
        )
        .await?;
    Ok(response::message("User Info Update"))
}

// ── PATCH /api/user/update-password/{userId} ─────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordFields {
    #[serde(default)]
    pub old_password: String,
    #[serde(default)]
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct UpdatePasswordRequest {
    pub update: Option<PasswordFields>,
}

pub async fn update_password(
    identity: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<UpdatePasswordRequest>,
) -> Result<impl IntoResponse, MarketplaceError> {
    if identity.user_id != user_id {
        return Err(MarketplaceError::Forbidden);
    }
    let fields = body.update.ok_or(MarketplaceError::MissingUpdate)?;
    let usecase = ChangePasswordUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(user_id, &fields.old_password, &fields.new_password)
        .await?;
    Ok(response::message("Password Changed"))
}
