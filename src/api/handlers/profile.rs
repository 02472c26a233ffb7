use axum::{
    extract::{State, Extension},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentUser, state::AppState},
    auth::AuthService,
    domain::{UpdateProfileRequest, User, UserRole},
    error::{AppError, Result},
};

#[derive(Debug, Serialize)]
pub struct ProfileDto {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub phone: String,
    pub role: UserRole,
    pub profile_image_url: Option<String>,
}

impl From<User> for ProfileDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            phone: user.phone,
            role: user.role,
            profile_image_url: user.profile_image_url,
        }
    }
}

pub async fn get(
    Extension(current_user): Extension<CurrentUser>,
) -> Json<ProfileDto> {
    Json(current_user.user.into())
}

pub async fn update(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileDto>> {
    let user = state.service_context.user_repo
        .update_profile(current_user.user.id, request)
        .await?;

    Ok(Json(user.into()))
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

pub async fn change_password(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<StatusCode> {
    if request.new_password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let stored_hash = crate::auth::get_password_hash(
        &state.service_context.db_pool,
        &current_user.user.email,
    )
    .await?
    .ok_or(AppError::Unauthorized)?;

    if !AuthService::verify_password(&request.current_password, &stored_hash).await? {
        return Err(AppError::Unauthorized);
    }

    let new_hash = AuthService::hash_password(&request.new_password).await?;
    state.service_context.user_repo
        .update_password(current_user.user.id, &new_hash)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
