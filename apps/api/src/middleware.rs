use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use tower_sessions::Session;
use tracing::info;
use url::Url;
use yardline_core::AppError;

use crate::auth::{SESSION_CREATED_AT_KEY, SESSION_USER_KEY};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Sessions older than this are rejected regardless of activity.
pub const SESSION_ABSOLUTE_TIMEOUT_SECS: i64 = 8 * 60 * 60;

/// Loads the session operator and exposes it as a `SystemUser` extension.
///
/// The snapshot is re-read on every request so permission changes apply
/// without a new login.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let user_id = session
        .get::<String>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let created_at = session
        .get::<i64>(SESSION_CREATED_AT_KEY)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to read session creation time: {error}"))
        })?;

    if session_expired(created_at, chrono::Utc::now().timestamp()) {
        end_session(&session).await?;
        info!(user_id = %user_id, "session exceeded absolute lifetime");
        return Err(AppError::Unauthorized("session expired".to_owned()).into());
    }

    let user = match state.access_service.find_user(&user_id).await {
        Ok(user) if !user.is_inactive() => user,
        Ok(_) | Err(AppError::NotFound(_)) => {
            end_session(&session).await?;
            return Err(AppError::Unauthorized("authentication required".to_owned()).into());
        }
        Err(error) => return Err(error.into()),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if headers
            .get("sec-fetch-site")
            .is_some_and(|fetch_site| fetch_site == HeaderValue::from_static("cross-site"))
        {
            return Err(AppError::Forbidden("cross-site request blocked".to_owned()).into());
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if !same_origin(origin, &state.frontend_url) && !same_origin(referer, &state.frontend_url)
        {
            return Err(AppError::Forbidden("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

/// Compares scheme, host and port. Unparseable input never matches.
fn same_origin(candidate: &str, frontend_url: &str) -> bool {
    match (Url::parse(candidate), Url::parse(frontend_url)) {
        (Ok(candidate), Ok(frontend)) => {
            candidate.origin().is_tuple() && candidate.origin() == frontend.origin()
        }
        _ => false,
    }
}

fn session_expired(created_at: Option<i64>, now: i64) -> bool {
    created_at.is_none_or(|created_at| now.saturating_sub(created_at) > SESSION_ABSOLUTE_TIMEOUT_SECS)
}

async fn end_session(session: &Session) -> ApiResult<()> {
    session
        .flush()
        .await
        .map_err(|error| ApiError::from(AppError::Internal(format!("failed to clear session: {error}"))))
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}
