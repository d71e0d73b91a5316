use axum::Json;
use axum::extract::{Extension, Path, State};
use yardline_application::PermissionSnapshot;
use yardline_domain::SystemUser;

use crate::dto::{PermissionOverridesPayload, SystemUserResponse, UserPermissionsResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(user): Extension<SystemUser>,
) -> ApiResult<Json<Vec<SystemUserResponse>>> {
    let users = state.access_service.list_users(&user).await?;
    Ok(Json(users.iter().map(SystemUserResponse::from).collect()))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(user): Extension<SystemUser>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<SystemUserResponse>> {
    let target = state.access_service.view_user(&user, &user_id).await?;
    Ok(Json(SystemUserResponse::from(&target)))
}

pub async fn get_user_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<SystemUser>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<UserPermissionsResponse>> {
    let snapshot = state.access_service.user_permissions(&user, &user_id).await?;
    Ok(Json(UserPermissionsResponse::from(snapshot)))
}

pub async fn update_user_permissions_handler(
    State(state): State<AppState>,
    Extension(user): Extension<SystemUser>,
    Path(user_id): Path<String>,
    Json(payload): Json<PermissionOverridesPayload>,
) -> ApiResult<Json<UserPermissionsResponse>> {
    let updated = state
        .access_service
        .update_user_permissions(&user, &user_id, payload.into())
        .await?;
    Ok(Json(UserPermissionsResponse::from(PermissionSnapshot::new(updated))))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use yardline_application::AccessService;
    use yardline_core::AppError;
    use yardline_infrastructure::{Argon2PasswordHasher, InMemoryUserDirectory};

    use super::*;
    use crate::dev_seed::{self, DEV_SEED_ADMIN_ID, DEV_SEED_DRIVER_ID, DEV_SEED_RESTRICTED_ID};

    async fn seeded_state() -> AppState {
        let directory = Arc::new(InMemoryUserDirectory::new(Arc::new(
            Argon2PasswordHasher::with_costs(1_024, 1),
        )));
        dev_seed::seed(&directory)
            .await
            .unwrap_or_else(|_| panic!("test seed"));

        AppState {
            access_service: AccessService::new(directory.clone(), directory),
            frontend_url: "http://localhost:3000".to_owned(),
        }
    }

    async fn operator(state: &AppState, user_id: &str) -> SystemUser {
        state
            .access_service
            .find_user(user_id)
            .await
            .unwrap_or_else(|_| panic!("test operator"))
    }

    fn status_of(result: ApiResult<impl IntoResponse>) -> StatusCode {
        match result {
            Ok(response) => response.into_response().status(),
            Err(error) => error.into_response().status(),
        }
    }

    #[tokio::test]
    async fn admin_lists_all_seeded_users() {
        let state = seeded_state().await;
        let admin = operator(&state, DEV_SEED_ADMIN_ID).await;

        let Json(users) = list_users_handler(State(state), Extension(admin))
            .await
            .unwrap_or_else(|_| panic!("test listing"));
        assert_eq!(users.len(), 3);
    }

    #[tokio::test]
    async fn driver_cannot_list_users() {
        let state = seeded_state().await;
        let driver = operator(&state, DEV_SEED_DRIVER_ID).await;

        let result = list_users_handler(State(state), Extension(driver)).await;
        assert_eq!(status_of(result), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn driver_reads_own_record_but_not_others() {
        let state = seeded_state().await;
        let driver = operator(&state, DEV_SEED_DRIVER_ID).await;

        let own = get_user_handler(
            State(state.clone()),
            Extension(driver.clone()),
            Path(DEV_SEED_DRIVER_ID.to_owned()),
        )
        .await;
        assert_eq!(status_of(own), StatusCode::OK);

        let other = get_user_handler(
            State(state),
            Extension(driver),
            Path(DEV_SEED_ADMIN_ID.to_owned()),
        )
        .await;
        assert_eq!(status_of(other), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let state = seeded_state().await;
        let admin = operator(&state, DEV_SEED_ADMIN_ID).await;

        let result = get_user_permissions_handler(
            State(state),
            Extension(admin),
            Path("missing".to_owned()),
        )
        .await;
        assert_eq!(status_of(result), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn driver_reads_own_permissions_but_not_others() {
        let state = seeded_state().await;
        let driver = operator(&state, DEV_SEED_DRIVER_ID).await;

        let Json(own) = get_user_permissions_handler(
            State(state.clone()),
            Extension(driver.clone()),
            Path(DEV_SEED_DRIVER_ID.to_owned()),
        )
        .await
        .unwrap_or_else(|_| panic!("test own permissions"));
        assert_eq!(own.user_id, DEV_SEED_DRIVER_ID);
        assert_eq!(own.overrides.can_view_vehicles, Some(true));
        assert!(own.effective.can_view_vehicles);
        assert!(!own.effective.can_edit_vehicles);

        let other = get_user_permissions_handler(
            State(state),
            Extension(driver),
            Path(DEV_SEED_ADMIN_ID.to_owned()),
        )
        .await;
        assert_eq!(status_of(other), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_grants_vehicle_editing_to_driver() {
        let state = seeded_state().await;
        let admin = operator(&state, DEV_SEED_ADMIN_ID).await;

        let Json(response) = update_user_permissions_handler(
            State(state.clone()),
            Extension(admin),
            Path(DEV_SEED_DRIVER_ID.to_owned()),
            Json(PermissionOverridesPayload {
                can_edit_vehicles: Some(true),
                ..PermissionOverridesPayload::default()
            }),
        )
        .await
        .unwrap_or_else(|_| panic!("test update"));

        assert!(response.effective.can_edit_vehicles);
        assert_eq!(response.overrides.can_edit_vehicles, Some(true));

        let reloaded = operator(&state, DEV_SEED_DRIVER_ID).await;
        assert_eq!(
            reloaded.permissions().and_then(|set| set.can_edit_vehicles),
            Some(true)
        );
    }

    #[tokio::test]
    async fn restricted_operator_cannot_edit_permissions() {
        let state = seeded_state().await;
        let restricted = operator(&state, DEV_SEED_RESTRICTED_ID).await;

        let result = update_user_permissions_handler(
            State(state),
            Extension(restricted),
            Path(DEV_SEED_DRIVER_ID.to_owned()),
            Json(PermissionOverridesPayload {
                can_view_users: Some(true),
                ..PermissionOverridesPayload::default()
            }),
        )
        .await;
        assert_eq!(status_of(result), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn empty_update_is_a_bad_request() {
        let state = seeded_state().await;
        let admin = operator(&state, DEV_SEED_ADMIN_ID).await;

        let result = update_user_permissions_handler(
            State(state),
            Extension(admin),
            Path(DEV_SEED_DRIVER_ID.to_owned()),
            Json(PermissionOverridesPayload::default()),
        )
        .await;
        assert!(matches!(result, Err(ref error) if matches!(error.0, AppError::Validation(_))));
    }
}
