use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use yardline_application::{AuthenticationGateway, UserDirectory};
use yardline_core::{AppError, AppResult, LoginCredentials};
use yardline_domain::{RawPermissionsRecord, RawUserRecord};

const USERS_PATH: &str = "rest/v1/system_users";
const PERMISSIONS_PATH: &str = "rest/v1/system_user_permissions";
const AUTHENTICATE_PATH: &str = "rest/v1/rpc/authenticate_user";
const USER_SELECT: &str = "*,units(name),system_user_permissions(*)";
const UPSERT_PREFERENCE: &str = "resolution=merge-duplicates,return=minimal";

/// User directory backed by a hosted PostgREST endpoint.
pub struct PostgrestUserDirectory {
    http_client: reqwest::Client,
    base_url: Url,
    api_key: String,
}

impl PostgrestUserDirectory {
    /// Creates a directory for the given backend base URL.
    pub fn new(
        http_client: reqwest::Client,
        base_url: Url,
        api_key: impl Into<String>,
    ) -> AppResult<Self> {
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(AppError::Validation(format!(
                "backend url must use http or https, got '{}'",
                base_url.scheme()
            )));
        }

        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(AppError::Validation(
                "backend api key must not be empty".to_owned(),
            ));
        }

        let mut base_url = base_url;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            http_client,
            base_url,
            api_key,
        })
    }

    fn endpoint(&self, path: &str) -> AppResult<Url> {
        self.base_url.join(path).map_err(|error| {
            AppError::Internal(format!("failed to build backend url for '{path}': {error}"))
        })
    }

    fn user_lookup_url(&self, user_id: &str) -> AppResult<Url> {
        let mut url = self.endpoint(USERS_PATH)?;
        url.query_pairs_mut()
            .append_pair("select", USER_SELECT)
            .append_pair("id", &format!("eq.{user_id}"));
        Ok(url)
    }

    fn user_list_url(&self) -> AppResult<Url> {
        let mut url = self.endpoint(USERS_PATH)?;
        url.query_pairs_mut()
            .append_pair("select", USER_SELECT)
            .append_pair("order", "name.asc");
        Ok(url)
    }

    fn permissions_upsert_url(&self) -> AppResult<Url> {
        let mut url = self.endpoint(PERMISSIONS_PATH)?;
        url.query_pairs_mut().append_pair("on_conflict", "user_id");
        Ok(url)
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("apikey", self.api_key.as_str())
            .bearer_auth(self.api_key.as_str())
    }

    async fn fetch_json(&self, url: Url) -> AppResult<Value> {
        let response = self
            .authorized(self.http_client.get(url))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(AppError::Internal(format!(
                "backend query failed with status {status}: {body}"
            )));
        }

        response.json::<Value>().await.map_err(|error| {
            AppError::MalformedRecord(format!("backend returned unreadable json: {error}"))
        })
    }
}

#[async_trait]
impl UserDirectory for PostgrestUserDirectory {
    async fn find_user_record(&self, user_id: &str) -> AppResult<Option<RawUserRecord>> {
        let payload = self.fetch_json(self.user_lookup_url(user_id)?).await?;
        first_record(payload)?
            .map(RawUserRecord::from_value)
            .transpose()
    }

    async fn list_user_records(&self) -> AppResult<Vec<RawUserRecord>> {
        let payload = self.fetch_json(self.user_list_url()?).await?;
        decode_listing(payload)
    }

    async fn update_user_permissions(
        &self,
        user_id: &str,
        patch: &RawPermissionsRecord,
    ) -> AppResult<bool> {
        let row = RawPermissionsRecord {
            user_id: Some(user_id.to_owned()),
            ..patch.clone()
        };

        let response = self
            .authorized(self.http_client.post(self.permissions_upsert_url()?))
            .header("Prefer", UPSERT_PREFERENCE)
            .json(&row)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status.is_success() {
            debug!(user_id, %status, "permissions row upserted");
            return Ok(true);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<response body unavailable>".to_owned());
        if status.is_client_error() {
            warn!(user_id, %status, body = %body, "backend rejected permissions upsert");
            return Ok(false);
        }

        Err(AppError::Internal(format!(
            "permissions upsert failed with status {status}: {body}"
        )))
    }
}

#[async_trait]
impl AuthenticationGateway for PostgrestUserDirectory {
    async fn authenticate(
        &self,
        credentials: &LoginCredentials,
    ) -> AppResult<Option<RawUserRecord>> {
        let response = self
            .authorized(self.http_client.post(self.endpoint(AUTHENTICATE_PATH)?))
            .json(&json!({
                "p_username": credentials.username(),
                "p_password": credentials.password(),
            }))
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            debug!(%status, "authentication rpc rejected the credentials");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::Internal(format!(
                "authentication rpc failed with status {status}"
            )));
        }

        let payload = response.json::<Value>().await.map_err(|error| {
            AppError::MalformedRecord(format!(
                "authentication rpc returned unreadable json: {error}"
            ))
        })?;

        first_record(payload)?
            .map(RawUserRecord::from_value)
            .transpose()
    }
}

/// Normalizes a PostgREST payload that may be null, an object or an array.
fn first_record(payload: Value) -> AppResult<Option<Value>> {
    match payload {
        Value::Null => Ok(None),
        Value::Object(_) => Ok(Some(payload)),
        Value::Array(rows) => Ok(rows.into_iter().find(|row| !row.is_null())),
        other => Err(AppError::MalformedRecord(format!(
            "expected a json object or array, got '{other}'"
        ))),
    }
}

/// Decodes a listing row by row, dropping rows that do not fit the schema.
fn decode_listing(payload: Value) -> AppResult<Vec<RawUserRecord>> {
    let Value::Array(rows) = payload else {
        return Err(AppError::MalformedRecord(
            "user listing must be a json array".to_owned(),
        ));
    };

    Ok(rows
        .into_iter()
        .filter_map(|row| match RawUserRecord::from_value(row) {
            Ok(record) => Some(record),
            Err(error) => {
                warn!(error = %error, "skipping undecodable user row");
                None
            }
        })
        .collect())
}

fn transport_error(error: reqwest::Error) -> AppError {
    AppError::Internal(format!("backend request failed: {error}"))
}
