use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{Completion, CompletionClient, CompletionRequest, LlmError};

/// Completion client that never touches the network.
///
/// Returns a fixed reply (or a fixed error) and counts calls. Clones share
/// the counter.
///
/// ```
/// use forage::llm::{CompletionClient, CompletionRequest, MockCompletionClient};
///
/// # #[tokio::main]
/// # async fn main() {
/// let client = MockCompletionClient::new("{}");
/// let request = CompletionRequest::new("system", "user", "model", 16);
/// assert_eq!(client.complete(&request).await.unwrap().text, "{}");
/// assert_eq!(client.call_count(), 1);
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MockCompletionClient {
    reply: Result<String, (u16, String)>,
    call_count: Arc<AtomicUsize>,
    last_request: Arc<Mutex<Option<CompletionRequest>>>,
}

impl MockCompletionClient {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            call_count: Arc::new(AtomicUsize::new(0)),
            last_request: Arc::new(Mutex::new(None)),
        }
    }

    /// Every call fails as if the service answered with `status` and `message`.
    pub fn failing(status: u16, message: impl Into<String>) -> Self {
        Self {
            reply: Err((status, message.into())),
            ..Self::new("")
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.last_request
            .lock()
            .ok()
            .and_then(|last| last.clone())
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }
        match &self.reply {
            Ok(text) => Ok(Completion { text: text.clone() }),
            Err((status, message)) => Err(LlmError::Api {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}
