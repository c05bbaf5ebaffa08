mod search_service;

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;

use crate::{
    ai::{AiEndpoint, AiError, AiSearcher, AiSettings, CompletionTransport},
    bookmarks::Bookmark,
    search::SearchCache,
};

pub fn bookmark(id: &str, title: &str, url: &str, tags: &[&str]) -> Bookmark {
    Bookmark {
        id: id.to_string(),
        title: title.to_string(),
        url: url.to_string(),
        description: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        status: None,
    }
}

pub fn library() -> Vec<Bookmark> {
    vec![
        bookmark("1", "React hooks guide", "https://react.dev/hooks", &["react", "frontend"]),
        bookmark("2", "Rust async book", "https://rust-lang.github.io/async-book", &["rust"]),
        bookmark("3", "Vue composition api", "https://vuejs.org/guide", &["vue", "frontend"]),
        bookmark("4", "Cooking pasta", "https://recipes.example.com/pasta", &["food"]),
    ]
}

pub fn configured() -> AiSettings {
    AiSettings::from_parts(
        Some("https://api.example.com/v1/chat/completions"),
        Some("sk-test"),
        Some("test-model"),
    )
}

/// What a [`FakeTransport`] does when called.
#[derive(Clone)]
pub enum Reply {
    Content(String),
    Error(String),
    Hang,
}

/// In-process stand-in for the completion service. Counts calls.
pub struct FakeTransport {
    reply: Reply,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeTransport {
    pub fn new(reply: Reply) -> Arc<Self> {
        Self::delayed(reply, Duration::ZERO)
    }

    pub fn content(content: &str) -> Arc<Self> {
        Self::new(Reply::Content(content.to_string()))
    }

    pub fn delayed(reply: Reply, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            reply,
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionTransport for FakeTransport {
    async fn complete(&self, _endpoint: &AiEndpoint, _prompt: &str) -> Result<String, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.reply {
            Reply::Content(content) => Ok(content.clone()),
            Reply::Error(msg) => Err(AiError::Transport(msg.clone())),
            Reply::Hang => std::future::pending().await,
        }
    }
}

pub fn searcher(transport: Arc<FakeTransport>) -> AiSearcher {
    AiSearcher::new(transport, Arc::new(SearchCache::new()))
}
