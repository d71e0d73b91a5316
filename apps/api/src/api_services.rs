use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use yardline_application::AccessService;
use yardline_core::{AppError, AppResult};
use yardline_infrastructure::{Argon2PasswordHasher, InMemoryUserDirectory, PostgrestUserDirectory};

use crate::api_config::{ApiConfig, BackendConfig};
use crate::dev_seed;
use crate::state::AppState;

pub async fn build_app_state(config: &ApiConfig) -> AppResult<AppState> {
    let access_service = match &config.backend {
        BackendConfig::Postgrest {
            url,
            api_key,
            timeout_secs,
        } => {
            let http_client = reqwest::Client::builder()
                .timeout(Duration::from_secs(*timeout_secs))
                .build()
                .map_err(|error| {
                    AppError::Internal(format!("failed to build backend http client: {error}"))
                })?;
            let directory = Arc::new(PostgrestUserDirectory::new(
                http_client,
                url.clone(),
                api_key.clone(),
            )?);
            info!(backend = %url, "using hosted user directory");
            AccessService::new(directory.clone(), directory)
        }
        BackendConfig::Memory => {
            let directory = Arc::new(InMemoryUserDirectory::new(Arc::new(
                Argon2PasswordHasher::new(),
            )));
            dev_seed::seed(&directory).await?;
            info!("using in-memory user directory");
            AccessService::new(directory.clone(), directory)
        }
    };

    Ok(AppState {
        access_service,
        frontend_url: config.frontend_url.clone(),
    })
}
