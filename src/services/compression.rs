//! Tinify (TinyPNG) compression client
//!
//! Compression is a two-step exchange: the raw image is posted to the shrink
//! endpoint, which answers with a JSON descriptor pointing at a temporary
//! URL, and the compressed image is then fetched from that URL.

use super::{error_body, CompressionService};
use crate::config::ConverterConfig;
use crate::error::{ConvertError, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use tracing::debug;

const SERVICE: &str = "Tinify";

/// Shrink endpoint response
#[derive(Debug, Deserialize)]
struct ShrinkResponse {
    #[serde(default)]
    input: Option<ShrinkInput>,
    output: ShrinkOutput,
}

#[derive(Debug, Deserialize)]
struct ShrinkInput {
    size: u64,
}

#[derive(Debug, Deserialize)]
struct ShrinkOutput {
    url: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    ratio: Option<f64>,
}

/// Client for the Tinify shrink API
#[derive(Debug, Clone)]
pub struct TinifyClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl TinifyClient {
    #[must_use]
    pub fn new<E, K>(client: Client, endpoint: E, api_key: K) -> Self
    where
        E: Into<String>,
        K: Into<String>,
    {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    /// Build a client from the run configuration
    ///
    /// # Errors
    /// - `MissingCredential` when `TINIFY_API_KEY` is not set
    pub fn from_config(client: Client, config: &ConverterConfig) -> Result<Self> {
        Ok(Self::new(
            client,
            config.endpoints.compression_url.clone(),
            config.tinify_api_key()?,
        ))
    }

    /// Post the image and parse the descriptor the service returns
    async fn shrink(&self, image: &[u8]) -> Result<ShrinkResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth("api", Some(&self.api_key))
            .body(image.to_vec())
            .send()
            .await
            .map_err(|e| ConvertError::network_error(format!("Failed to reach {}", SERVICE), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConvertError::http_status(
                SERVICE,
                status.as_u16(),
                error_body(response).await,
            ));
        }

        let body = response.text().await.map_err(|e| {
            ConvertError::network_error(format!("Failed to read {} response", SERVICE), e)
        })?;

        serde_json::from_str(&body).map_err(|e| {
            ConvertError::malformed_response(SERVICE, format!("expected output descriptor: {}", e))
        })
    }

    /// Whether `url` shares scheme, host and port with the shrink endpoint
    fn is_same_origin(&self, url: &Url) -> bool {
        Url::parse(&self.endpoint).is_ok_and(|endpoint| endpoint.origin() == url.origin())
    }

    /// Fetch the compressed image the descriptor points at
    ///
    /// The API key is only attached when the output lives on the same
    /// origin as the shrink endpoint.
    async fn fetch_output(&self, url: &str) -> Result<Vec<u8>> {
        let output_url = Url::parse(url).map_err(|e| {
            ConvertError::malformed_response(SERVICE, format!("invalid output URL '{}': {}", url, e))
        })?;

        let mut request = self.client.get(output_url.clone());
        if self.is_same_origin(&output_url) {
            request = request.basic_auth("api", Some(&self.api_key));
        } else {
            debug!(url = %output_url, "Output is on another origin, downloading without credentials");
        }

        let response = request
            .send()
            .await
            .map_err(|e| {
                ConvertError::network_error(format!("Failed to download {} output", SERVICE), e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConvertError::http_status(
                SERVICE,
                status.as_u16(),
                error_body(response).await,
            ));
        }

        let bytes = response.bytes().await.map_err(|e| {
            ConvertError::network_error(format!("Failed to read {} output", SERVICE), e)
        })?;

        if bytes.is_empty() {
            return Err(ConvertError::malformed_response(
                SERVICE,
                "compressed image is empty",
            ));
        }

        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl CompressionService for TinifyClient {
    async fn compress(&self, image: &[u8]) -> Result<Vec<u8>> {
        let descriptor = self.shrink(image).await?;

        debug!(
            input_size = descriptor.input.as_ref().map_or(image.len() as u64, |i| i.size),
            output_size = ?descriptor.output.size,
            ratio = ?descriptor.output.ratio,
            "Tinify shrink accepted"
        );

        self.fetch_output(&descriptor.output.url).await
    }

    fn name(&self) -> &'static str {
        SERVICE
    }
}
