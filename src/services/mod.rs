//! Services used by the batch pipeline
//!
//! The remote APIs sit behind async traits so the driver can run against
//! the real HTTP clients or the in-memory mocks in [`mock`].

pub mod background;
pub mod compression;
pub mod io;
pub mod mock;
pub mod progress;

pub use background::RemoveBgClient;
pub use compression::TinifyClient;
pub use io::{InputEnumerator, OutputWriter};
pub use progress::{
    ConsoleProgressReporter, NoOpProgressReporter, ProcessingStage, ProgressReporter,
};

use crate::error::{ConvertError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Remote image compression
#[async_trait]
pub trait CompressionService: Send + Sync {
    /// Compress raw image bytes, returning the compressed image
    ///
    /// # Errors
    /// - Transport failures, non-success status or malformed responses
    async fn compress(&self, image: &[u8]) -> Result<Vec<u8>>;

    /// Service name used in logs and error messages
    fn name(&self) -> &'static str;
}

/// Remote background removal
#[async_trait]
pub trait BackgroundRemovalService: Send + Sync {
    /// Strip the background from an image, returning the processed image
    ///
    /// # Errors
    /// - Transport failures, non-success status or empty responses
    async fn remove_background(&self, image: &[u8]) -> Result<Vec<u8>>;

    fn name(&self) -> &'static str;
}

/// Create the HTTP client shared by the remote services
///
/// # Errors
/// - Failed to create HTTP client
pub fn build_http_client(timeout: Option<Duration>) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| ConvertError::network_error("Failed to create HTTP client", e))
}

/// Read a failed response's body for diagnostics, never failing itself
pub(crate) async fn error_body(response: reqwest::Response) -> String {
    match response.text().await {
        Ok(body) if body.is_empty() => "<empty body>".to_string(),
        Ok(body) => body,
        Err(e) => format!("<unreadable body: {}>", e),
    }
}
