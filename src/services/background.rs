//! remove.bg background-removal client

use super::{error_body, BackgroundRemovalService};
use crate::config::ConverterConfig;
use crate::error::{ConvertError, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;

const SERVICE: &str = "remove.bg";

/// Client for the remove.bg API
#[derive(Debug, Clone)]
pub struct RemoveBgClient {
    client: Client,
    endpoint: String,
    api_key: String,
}

impl RemoveBgClient {
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
    /// - `MissingCredential` when `REMOVE_BG_API_KEY` is not set
    pub fn from_config(client: Client, config: &ConverterConfig) -> Result<Self> {
        Ok(Self::new(
            client,
            config.endpoints.remove_bg_url.clone(),
            config.remove_bg_api_key()?,
        ))
    }

    /// Multipart body: the image as `image_file` and `size=auto`
    fn form(image: &[u8]) -> Form {
        Form::new()
            .part("image_file", Part::bytes(image.to_vec()).file_name("image_file"))
            .text("size", "auto")
    }
}

#[async_trait]
impl BackgroundRemovalService for RemoveBgClient {
    async fn remove_background(&self, image: &[u8]) -> Result<Vec<u8>> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("X-Api-Key", &self.api_key)
            .multipart(Self::form(image))
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

        let bytes = response.bytes().await.map_err(|e| {
            ConvertError::network_error(format!("Failed to read {} response", SERVICE), e)
        })?;

        if bytes.is_empty() {
            return Err(ConvertError::malformed_response(SERVICE, "result image is empty"));
        }

        debug!(input_size = image.len(), output_size = bytes.len(), "Background removed");
        Ok(bytes.to_vec())
    }

    fn name(&self) -> &'static str {
        SERVICE
    }
}
