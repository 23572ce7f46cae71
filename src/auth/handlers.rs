use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    dto::{AuthResponse, LoginRequest, Profile, PublicUser, RefreshRequest, RegisterRequest},
    extractors::AuthUser,
    jwt::JwtKeys,
    repo_types::User,
    services,
};
use crate::{error::AppError, projects, state::AppState};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

fn issue_tokens(state: &AppState, user: User) -> Result<AuthResponse, AppError> {
    let keys = JwtKeys::from_ref(state);
    let access_token = keys.sign_access(user.id)?;
    let refresh_token = keys.sign_refresh(user.id)?;
    Ok(AuthResponse {
        access_token,
        refresh_token,
        user: user.into(),
    })
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let user =
        services::register(&state.db, &payload.username, &payload.email, &payload.password).await?;
    Ok((StatusCode::CREATED, Json(issue_tokens(&state, user)?)))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let user = services::authenticate(&state.db, &payload.username, &payload.password).await?;
    info!(user_id = user.id, "user logged in");
    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<AppState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify_refresh(&payload.refresh_token).map_err(|e| {
        warn!(error = %e, "refresh rejected");
        AppError::AuthRequired
    })?;

    // The account may have disappeared since the token was minted.
    let user = services::get_user(&state.db, claims.sub)
        .await
        .map_err(|e| match e {
            AppError::NotFound(_) => AppError::AuthRequired,
            other => other,
        })?;

    Ok(Json(issue_tokens(&state, user)?))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Profile>, AppError> {
    let user = services::get_user(&state.db, user_id).await?;
    let projects = projects::services::list_by_owner(&state.db, user.id).await?;

    Ok(Json(Profile {
        id: user.id,
        username: user.username,
        email: user.email,
        created_at: user.created_at,
        project_count: projects.len(),
        projects,
    }))
}
