use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use tower_sessions::Session;
use tracing::info;
use yardline_application::AuthOutcome;
use yardline_core::{AppError, LoginCredentials};
use yardline_domain::SystemUser;

use crate::dto::{AuthLoginRequest, AuthLoginResponse, CurrentUserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub const SESSION_USER_KEY: &str = "system_user_id";
/// Unix timestamp of the login that created the session.
pub const SESSION_CREATED_AT_KEY: &str = "session_created_at";

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    Json(payload): Json<AuthLoginRequest>,
) -> ApiResult<Json<AuthLoginResponse>> {
    let credentials = LoginCredentials::new(payload.username, payload.password)?;

    let AuthOutcome::Authenticated(user) = state.access_service.login(&credentials).await? else {
        return Err(AppError::Unauthorized("invalid username or password".to_owned()).into());
    };

    // New identifier on every login to rule out fixation.
    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, user.id().as_str())
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    session
        .insert(SESSION_CREATED_AT_KEY, chrono::Utc::now().timestamp())
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session creation time: {error}"))
        })?;

    Ok(Json(AuthLoginResponse {
        status: "authenticated".to_owned(),
    }))
}

pub async fn logout_handler(session: Session) -> ApiResult<StatusCode> {
    let user_id = session
        .get::<String>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?;

    session
        .delete()
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;

    if let Some(user_id) = user_id {
        info!(user_id = %user_id, "operator logged out");
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(Extension(user): Extension<SystemUser>) -> Json<CurrentUserResponse> {
    Json(CurrentUserResponse::from(&user))
}
