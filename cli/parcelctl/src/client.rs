//! Typed HTTP client for the parcel API.

use anyhow::Context;
use chrono::{DateTime, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Url;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::config::Config;
use crate::error::CliError;

const API_PREFIX: [&str; 3] = ["api", "v1", "parcel"];

/// A parcel as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parcel {
    pub id: String,
    pub arrived_at: DateTime<Utc>,
    pub name: String,
    pub street: String,
    pub street_number: i32,
    pub post_code: i32,
    pub region: String,
    pub country: String,
    pub handed_out: bool,
}

/// Body of a create request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewParcel {
    pub name: String,
    pub street: String,
    pub street_number: i32,
    pub post_code: i32,
    pub region: String,
    pub country: String,
    pub handed_out: bool,
}

/// Body of a partial update. Unset fields are left out of the JSON.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParcelUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_number: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_code: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handed_out: Option<bool>,
}

impl ParcelUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// API client for the parcel endpoints.
#[derive(Debug, Clone)]
pub struct ParcelClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ParcelClient {
    /// Create a new client from config.
    pub fn new(config: &Config) -> Result<Self, CliError> {
        let base_url = Url::parse(config.api_url())
            .map_err(|_| CliError::InvalidUrl(config.api_url().to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(CliError::InvalidUrl(config.api_url().to_string()));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, base_url })
    }

    /// Build the URL of a parcel endpoint. Each segment is percent-encoded.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(API_PREFIX).extend(segments);
        }
        url
    }

    /// List all parcels, newest first.
    pub async fn list_parcels(&self) -> Result<Vec<Parcel>, CliError> {
        let response = self.client.get(self.url(&[])).send().await?;
        self.handle_response(response).await
    }

    /// Fetch one parcel by public id.
    pub async fn get_parcel(&self, id: &str) -> Result<Parcel, CliError> {
        let response = self.client.get(self.url(&[id])).send().await?;
        self.handle_response(response).await
    }

    /// Create a parcel. The API does not return the new id.
    pub async fn create_parcel(&self, parcel: &NewParcel) -> Result<(), CliError> {
        let response = self.client.put(self.url(&[])).json(parcel).send().await?;
        self.handle_empty(response).await
    }

    /// Apply a partial update.
    pub async fn update_parcel(&self, id: &str, update: &ParcelUpdate) -> Result<(), CliError> {
        let response = self
            .client
            .patch(self.url(&[id]))
            .json(update)
            .send()
            .await?;
        self.handle_empty(response).await
    }

    /// Delete a parcel.
    pub async fn remove_parcel(&self, id: &str) -> Result<(), CliError> {
        let response = self.client.delete(self.url(&[id])).send().await?;
        self.handle_empty(response).await
    }

    /// URL of the printable label, for opening in a browser.
    pub fn label_url(&self, id: &str) -> String {
        self.url(&[id, "label"]).to_string()
    }

    /// Download the label PDF.
    pub async fn download_label(&self, id: &str) -> Result<Vec<u8>, CliError> {
        let response = self
            .client
            .get(self.url(&[id, "label"]))
            .header(ACCEPT, "application/pdf")
            .send()
            .await?;

        if !response.status().is_success() {
            return self.handle_error(response).await;
        }

        Ok(response.bytes().await?.to_vec())
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, CliError> {
        if response.status().is_success() {
            response
                .json()
                .await
                .map_err(|e| CliError::Other(anyhow::anyhow!("Failed to parse response: {}", e)))
        } else {
            self.handle_error(response).await
        }
    }

    async fn handle_empty(&self, response: reqwest::Response) -> Result<(), CliError> {
        if response.status().is_success() {
            Ok(())
        } else {
            self.handle_error(response).await
        }
    }

    /// Turn a problem+json response into an error.
    async fn handle_error<T>(&self, response: reqwest::Response) -> Result<T, CliError> {
        let status = response.status();

        let problem: ProblemResponse = response.json().await.unwrap_or_else(|_| ProblemResponse {
            code: "unknown".to_string(),
            detail: status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string(),
            request_id: None,
            details: Vec::new(),
        });

        let mut message = problem.detail;
        if !problem.details.is_empty() {
            let fields = problem
                .details
                .iter()
                .map(|d| format!("{} {}", d.field, d.message))
                .collect::<Vec<_>>()
                .join(", ");
            message = format!("{message} ({fields})");
        }

        Err(CliError::api(
            status.as_u16(),
            problem.code,
            message,
            problem.request_id,
        ))
    }
}

/// Problem details returned by the API.
#[derive(Debug, Deserialize)]
struct ProblemResponse {
    code: String,
    detail: String,
    #[serde(default)]
    request_id: Option<String>,
    #[serde(default)]
    details: Vec<ProblemField>,
}

#[derive(Debug, Deserialize)]
struct ProblemField {
    field: String,
    message: String,
}
