//! HTTP access to the Postera Manifold retrosynthesis API.

use anyhow::{bail, Context, Result};
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::time::Duration;

use crate::config::PosteraSettings;
use crate::models::constants::postera::{CONNECT_TIMEOUT_SECS, MAX_RESPONSE_SIZE};

const API_KEY_HEADER: &str = "X-API-KEY";

/// Create an HTTP client with connect and total request timeouts.
///
/// Retrosynthesis batches are slow, so the total timeout comes from the config.
pub(crate) fn create_http_client(timeout_secs: u64) -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("retromix/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to create HTTP client")
}

/// Fail with the status code and a snippet of the body when a request was not successful.
pub(crate) fn validate_response_status(response: Response, context: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = read_with_limit(response, 4096, context).unwrap_or_default();
    let snippet = String::from_utf8_lossy(&body);
    bail!(
        "{}: HTTP {} - {} {}",
        context,
        status.as_u16(),
        status.canonical_reason().unwrap_or("Unknown error"),
        snippet.trim()
    );
}

/// Read a response body, refusing anything larger than `max_size`.
pub(crate) fn read_with_limit(response: Response, max_size: u64, context: &str) -> Result<Vec<u8>> {
    if let Some(content_length) = response.content_length() {
        if content_length > max_size {
            bail!(
                "{context}: Content-Length {content_length} bytes exceeds maximum allowed size of {max_size} bytes"
            );
        }
    }

    let mut bytes = Vec::new();
    response
        .take(max_size + 1)
        .read_to_end(&mut bytes)
        .context("Failed to read response body")?;
    if bytes.len() as u64 > max_size {
        bail!("{context}: Response exceeds maximum allowed size of {max_size} bytes");
    }
    Ok(bytes)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchRequest<'a> {
    smiles_list: &'a [String],
    max_search_depth: u32,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    #[serde(default)]
    results: Vec<PosteraResult>,
}

/// Search result for one target.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosteraResult {
    pub smiles: String,
    #[serde(default)]
    pub routes: Vec<PosteraRoute>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosteraRoute {
    #[serde(default)]
    pub molecules: Vec<PosteraMolecule>,
    #[serde(default)]
    pub reactions: Vec<PosteraReaction>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosteraMolecule {
    pub smiles: String,
    #[serde(default)]
    pub is_building_block: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PosteraReaction {
    #[serde(default)]
    pub name: Option<String>,
    pub product_smiles: String,
    #[serde(default)]
    pub reactant_smiles: Vec<String>,
}

pub struct PosteraClient {
    client: Client,
    api_key: String,
    settings: PosteraSettings,
}

impl PosteraClient {
    pub fn new(api_key: impl Into<String>, settings: PosteraSettings) -> Result<Self> {
        Ok(Self {
            client: create_http_client(settings.timeout_secs)?,
            api_key: api_key.into(),
            settings,
        })
    }

    pub fn batch_size(&self) -> usize {
        self.settings.batch_size.max(1)
    }

    /// Run one batch retrosynthesis request.
    pub fn retrosynthesis_batch(&self, smiles: &[String]) -> Result<Vec<PosteraResult>> {
        let request = BatchRequest {
            smiles_list: smiles,
            max_search_depth: self.settings.max_search_depth,
        };

        let response = self
            .client
            .post(&self.settings.url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .with_context(|| format!("Failed to reach Postera at {}", self.settings.url))?;

        let response = validate_response_status(response, "Postera retrosynthesis request failed")?;
        let body = read_with_limit(response, MAX_RESPONSE_SIZE, "Postera retrosynthesis response")?;
        let parsed: BatchResponse =
            serde_json::from_slice(&body).context("Failed to parse Postera response")?;
        Ok(parsed.results)
    }
}
