//! A scripted model for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use alfred_core::{CoreError, Llm, Message, Result};

type Reply = std::result::Result<String, String>;

/// An [`Llm`] that replays a script of canned replies.
///
/// Each call to [`generate`](Llm::generate) pops the next scripted entry and
/// bumps a call counter, letting tests assert both what the model returned
/// and how many times it was invoked. Once the script runs out, calls fall
/// back to the configured repeat entry, or fail loudly when there is none —
/// so tests that expect zero calls catch any that slip through.
pub struct MockLlm {
    script: Mutex<VecDeque<Reply>>,
    fallback: Option<Reply>,
    calls: AtomicUsize,
}

impl MockLlm {
    /// A mock that replays the given replies in order.
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
            fallback: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A mock that replays a script of successes and failures in order.
    pub fn with_script<I>(script: I) -> Self
    where
        I: IntoIterator<Item = Reply>,
    {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            fallback: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// A mock that answers every call with the same reply.
    pub fn repeating(reply: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(Ok(reply.into())),
            calls: AtomicUsize::new(0),
        }
    }

    /// A mock whose every call fails with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            fallback: Some(Err(message.into())),
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer with this reply once the script is exhausted.
    pub fn with_fallback(mut self, reply: impl Into<String>) -> Self {
        self.fallback = Some(Ok(reply.into()));
        self
    }

    /// How many times [`generate`](Llm::generate) has been called.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Llm for MockLlm {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, _messages: &[Message]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self.script.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
        let reply = match scripted {
            Some(reply) => reply,
            None => match &self.fallback {
                Some(fallback) => fallback.clone(),
                None => Err("mock script exhausted".to_string()),
            },
        };

        reply.map_err(|message| CoreError::Model { provider: "mock".into(), message })
    }
}
