//! The generation boundary: an injected client producing token streams, and
//! the service handle that cancels and supersedes them.

use super::action::{AiAction, GenerationRequest};
use crate::error::{Error, Result};
use futures::future;
use futures::stream::{self, BoxStream, StreamExt};
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Tokens of one generation, in arrival order.
pub type TokenStream = BoxStream<'static, Result<String>>;

/// Anything that can turn a prompt into a stream of text tokens.
///
/// Retries, backoff and rate limiting are the implementor's business.
pub trait GenerationClient: Send + Sync {
    fn generate(&self, request: GenerationRequest) -> TokenStream;
}

// ─────────────────────────────────────────────────────────────────────────────
// Service
// ─────────────────────────────────────────────────────────────────────────────

/// Shared handle over a generation client.
///
/// Every `generate` call takes a new generation number; a stream only yields
/// tokens while its number is still the current one. Starting another
/// generation or calling `cancel` therefore ends any earlier stream at its
/// next token.
#[derive(Clone)]
pub struct AiService {
    client: Arc<dyn GenerationClient>,
    generation: Arc<AtomicU64>,
}

impl AiService {
    pub fn new(client: Arc<dyn GenerationClient>) -> Self {
        Self {
            client,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Start a generation, superseding any unfinished one.
    pub fn generate(&self, action: AiAction, input: &str, context: &str) -> TokenStream {
        self.start(action, input, context).1
    }

    /// Like [`AiService::generate`], also returning the generation number the
    /// stream belongs to. The stream is live while
    /// [`AiService::current_generation`] still equals it.
    pub fn start(&self, action: AiAction, input: &str, context: &str) -> (u64, TokenStream) {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Starting generation {} ({:?})", ticket, action);

        let generation = Arc::clone(&self.generation);
        let tokens = self
            .client
            .generate(action.request(input, context))
            .take_while(move |_| future::ready(generation.load(Ordering::SeqCst) == ticket))
            .boxed();
        (ticket, tokens)
    }

    /// Stop token delivery of the current generation. Safe to call repeatedly.
    pub fn cancel(&self) {
        let previous = self.generation.fetch_add(1, Ordering::SeqCst);
        debug!("Cancelled generation {}", previous);
    }

    /// Number of the most recent generation or cancellation.
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Scripted client
// ─────────────────────────────────────────────────────────────────────────────

/// A client that replays a fixed token sequence for every request.
///
/// Used by tests and by the offline command-line driver.
#[derive(Debug, Clone, Default)]
pub struct ScriptedClient {
    tokens: Vec<String>,
    failure: Option<String>,
}

impl ScriptedClient {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
            failure: None,
        }
    }

    /// Split `text` into tokens of at most `chunk_chars` characters.
    pub fn from_text(text: &str, chunk_chars: usize) -> Self {
        let chars: Vec<char> = text.chars().collect();
        Self::new(
            chars
                .chunks(chunk_chars.max(1))
                .map(|chunk| chunk.iter().collect::<String>()),
        )
    }

    /// After the scripted tokens, fail with `message` instead of ending.
    pub fn then_fail(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }
}

impl GenerationClient for ScriptedClient {
    fn generate(&self, _request: GenerationRequest) -> TokenStream {
        let tokens = stream::iter(self.tokens.clone().into_iter().map(Ok));
        match &self.failure {
            Some(message) => tokens
                .chain(stream::once(future::ready(Err(Error::Generation(
                    message.clone(),
                )))))
                .boxed(),
            None => tokens.boxed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(tokens: &[&str]) -> AiService {
        AiService::new(Arc::new(ScriptedClient::new(tokens.to_vec())))
    }

    #[tokio::test]
    async fn test_generate_yields_all_tokens() {
        let service = service(&["=SUM", "(A1:A3)", "\nAdds"]);
        let tokens: Vec<String> = service
            .generate(AiAction::GenerateFormula, "add", "")
            .map(|t| t.unwrap())
            .collect()
            .await;
        assert_eq!(tokens, vec!["=SUM", "(A1:A3)", "\nAdds"]);
    }

    #[tokio::test]
    async fn test_cancel_stops_delivery() {
        let service = service(&["a", "b", "c"]);
        let mut stream = service.generate(AiAction::Summarize, "text", "");

        assert_eq!(stream.next().await.unwrap().unwrap(), "a");
        service.cancel();
        service.cancel();
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_new_generation_supersedes_previous() {
        let service = service(&["x", "y"]);
        let mut first = service.generate(AiAction::ExplainFormula, "=A1", "");
        let mut second = service.generate(AiAction::ExplainFormula, "=A2", "");

        assert!(first.next().await.is_none());
        assert_eq!(second.next().await.unwrap().unwrap(), "x");
    }

    #[tokio::test]
    async fn test_start_reports_its_generation() {
        let service = service(&["a"]);
        let (first, _) = service.start(AiAction::Summarize, "t", "");
        let (second, mut tokens) = service.start(AiAction::Summarize, "t", "");
        assert_eq!(second, first + 1);
        assert_eq!(service.current_generation(), second);

        service.cancel();
        assert_ne!(service.current_generation(), second);
        assert!(tokens.next().await.is_none());
    }

    #[tokio::test]
    async fn test_each_call_restarts_the_sequence() {
        let service = service(&["one", "two"]);
        for _ in 0..2 {
            let tokens: Vec<_> = service
                .generate(AiAction::Summarize, "t", "")
                .collect()
                .await;
            assert_eq!(tokens.len(), 2);
        }
    }

    #[tokio::test]
    async fn test_scripted_failure_is_an_item() {
        let service = AiService::new(Arc::new(ScriptedClient::new(["ok"]).then_fail("quota")));
        let items: Vec<_> = service.generate(AiAction::Summarize, "t", "").collect().await;
        assert_eq!(items.len(), 2);
        assert!(matches!(&items[1], Err(Error::Generation(msg)) if msg == "quota"));
    }

    #[test]
    fn test_from_text_chunks_on_char_boundaries() {
        let client = ScriptedClient::from_text("=é+1", 2);
        assert_eq!(client.tokens, vec!["=é", "+1"]);
    }
}
