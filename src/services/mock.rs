//! In-memory service implementations for testing
//!
//! The mocks transform bytes deterministically and count their calls, so
//! tests can assert both on what was written and on whether the remote
//! services were contacted at all.

use super::{BackgroundRemovalService, CompressionService};
use crate::error::{ConvertError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// How a mock service answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockBehavior {
    /// Succeed, appending the marker to the input bytes
    Succeed(Vec<u8>),
    /// Answer with the given HTTP status
    FailWithStatus(u16),
    /// Answer with an unusable payload
    Malformed,
    /// Fail only on the n-th call (1-based), succeed with the marker otherwise
    FailOnCall(usize, Vec<u8>),
}

/// Shared call counter, cloneable so tests keep a handle after boxing the mock
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    #[must_use]
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn increment(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }
}

fn respond(
    service: &'static str,
    behavior: &MockBehavior,
    call: usize,
    input: &[u8],
) -> Result<Vec<u8>> {
    let marked = |marker: &[u8]| {
        let mut output = input.to_vec();
        output.extend_from_slice(marker);
        output
    };

    match behavior {
        MockBehavior::Succeed(marker) => Ok(marked(marker)),
        MockBehavior::FailWithStatus(status) => Err(ConvertError::http_status(
            service,
            *status,
            format!("mock failure on call {}", call),
        )),
        MockBehavior::Malformed => Err(ConvertError::malformed_response(
            service,
            "mock returned an unusable payload",
        )),
        MockBehavior::FailOnCall(failing, marker) => {
            if call == *failing {
                Err(ConvertError::http_status(
                    service,
                    500,
                    format!("mock failure on call {}", call),
                ))
            } else {
                Ok(marked(marker))
            }
        },
    }
}

/// Mock compression service
#[derive(Debug)]
pub struct MockCompressor {
    behavior: MockBehavior,
    calls: CallCounter,
}

impl MockCompressor {
    #[must_use]
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: CallCounter::default(),
        }
    }

    /// Succeeds, appending `b"+c"` to every input
    #[must_use]
    pub fn succeeding() -> Self {
        Self::new(MockBehavior::Succeed(b"+c".to_vec()))
    }

    #[must_use]
    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }
}

#[async_trait]
impl CompressionService for MockCompressor {
    async fn compress(&self, image: &[u8]) -> Result<Vec<u8>> {
        let call = self.calls.increment();
        respond("mock-compressor", &self.behavior, call, image)
    }

    fn name(&self) -> &'static str {
        "mock-compressor"
    }
}

/// Mock background-removal service
#[derive(Debug)]
pub struct MockBackgroundRemover {
    behavior: MockBehavior,
    calls: CallCounter,
}

impl MockBackgroundRemover {
    #[must_use]
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: CallCounter::default(),
        }
    }

    /// Succeeds, appending `b"+bg"` to every input
    #[must_use]
    pub fn succeeding() -> Self {
        Self::new(MockBehavior::Succeed(b"+bg".to_vec()))
    }

    #[must_use]
    pub fn calls(&self) -> CallCounter {
        self.calls.clone()
    }
}

#[async_trait]
impl BackgroundRemovalService for MockBackgroundRemover {
    async fn remove_background(&self, image: &[u8]) -> Result<Vec<u8>> {
        let call = self.calls.increment();
        respond("mock-remover", &self.behavior, call, image)
    }

    fn name(&self) -> &'static str {
        "mock-remover"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_compressor_marks_and_counts() {
        let compressor = MockCompressor::succeeding();
        let calls = compressor.calls();

        assert_eq!(compressor.compress(b"img").await.unwrap(), b"img+c");
        assert_eq!(compressor.compress(b"img+bg").await.unwrap(), b"img+bg+c");
        assert_eq!(calls.get(), 2);
    }

    #[tokio::test]
    async fn test_mock_fail_on_call() {
        let compressor = MockCompressor::new(MockBehavior::FailOnCall(2, b"+c".to_vec()));

        assert!(compressor.compress(b"a").await.is_ok());
        let err = compressor.compress(b"a").await.unwrap_err();
        assert!(matches!(err, ConvertError::HttpStatus { status: 500, .. }));
        assert!(compressor.compress(b"a").await.is_ok());
    }

    #[tokio::test]
    async fn test_mock_remover_failures() {
        let remover = MockBackgroundRemover::new(MockBehavior::FailWithStatus(402));
        let err = remover.remove_background(b"a").await.unwrap_err();
        assert!(err.to_string().contains("402"));

        let remover = MockBackgroundRemover::new(MockBehavior::Malformed);
        assert!(matches!(
            remover.remove_background(b"a").await,
            Err(ConvertError::MalformedResponse { .. })
        ));
    }
}
