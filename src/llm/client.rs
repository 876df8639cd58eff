//! GenerateClient trait and mock implementation

use async_trait::async_trait;

use super::error::LlmError;

/// Text-generation client used by the analysis stages
///
/// `generate` is synchronous from the stage's point of view: it resolves
/// before the stage returns. An empty or malformed response is surfaced as
/// `LlmError::InvalidResponse`, never a panic.
#[async_trait]
pub trait GenerateClient: Send + Sync {
    /// Generate text for a prompt with structured context
    async fn generate(&self, prompt: &str, context: &serde_json::Value) -> Result<String, LlmError>;
}

pub mod mock {
    //! Mock generation client for tests

    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::{GenerateClient, LlmError};

    /// Mock client returning queued responses, then a fixed fallback
    pub struct MockGenerateClient {
        responses: Mutex<VecDeque<Result<String, String>>>,
        fallback: String,
        calls: AtomicUsize,
    }

    impl MockGenerateClient {
        /// Create a mock with queued responses; `Err` entries become
        /// `LlmError::InvalidResponse`
        pub fn new(responses: Vec<Result<String, String>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                fallback: "mock analysis".to_string(),
                calls: AtomicUsize::new(0),
            }
        }

        /// Create a mock that always answers with the same text
        pub fn always(text: impl Into<String>) -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
                fallback: text.into(),
                calls: AtomicUsize::new(0),
            }
        }

        /// Number of generate calls made so far
        pub fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl GenerateClient for MockGenerateClient {
        async fn generate(&self, _prompt: &str, _context: &serde_json::Value) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let queued = self.responses.lock().ok().and_then(|mut q| q.pop_front());
            match queued {
                Some(Ok(text)) => Ok(text),
                Some(Err(msg)) => Err(LlmError::InvalidResponse(msg)),
                None => Ok(self.fallback.clone()),
            }
        }
    }
}
