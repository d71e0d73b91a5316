use yardline_application::AccessService;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_service: AccessService,
    pub frontend_url: String,
}
