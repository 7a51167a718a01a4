//! In-memory stand-ins for the research and completion services.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use glean_common::glean::{company_search_query, CompanySearch, GleanClientError, SearchHit};
use reqwest::StatusCode;

use crate::generator::CompletionService;
use crate::research::ResearchService;

fn unavailable() -> GleanClientError {
    GleanClientError::UpstreamBody {
        status: StatusCode::SERVICE_UNAVAILABLE,
        body: "service unavailable".to_string(),
    }
}

#[derive(Clone, Copy)]
enum Behavior {
    Answer,
    Fail,
    Stall,
}

pub struct MockResearch {
    search: Behavior,
    chat: Behavior,
    answer: String,
    hits: Vec<SearchHit>,
    search_calls: AtomicUsize,
    chat_calls: AtomicUsize,
}

impl MockResearch {
    fn new(search: Behavior, chat: Behavior, answer: &str, hits: Vec<SearchHit>) -> Self {
        Self {
            search,
            chat,
            answer: answer.to_string(),
            hits,
            search_calls: AtomicUsize::new(0),
            chat_calls: AtomicUsize::new(0),
        }
    }

    /// Succeeds with no hits and empty chat answers.
    pub fn empty() -> Self {
        Self::new(Behavior::Answer, Behavior::Answer, "", Vec::new())
    }

    /// Succeeds with one hit; every chat returns `answer`.
    pub fn answering(answer: &str) -> Self {
        let hit = SearchHit {
            title: Some("Company overview".to_string()),
            url: Some("https://wiki.example.com/company".to_string()),
            snippet: Some(answer.to_string()),
        };
        Self::new(Behavior::Answer, Behavior::Answer, answer, vec![hit])
    }

    /// Search fails; every chat returns `answer`.
    pub fn search_failing(answer: &str) -> Self {
        Self::new(Behavior::Fail, Behavior::Answer, answer, Vec::new())
    }

    pub fn failing() -> Self {
        Self::new(Behavior::Fail, Behavior::Fail, "", Vec::new())
    }

    /// Every call hangs forever.
    pub fn stalled() -> Self {
        Self::new(Behavior::Stall, Behavior::Stall, "", Vec::new())
    }

    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    pub fn chat_calls(&self) -> usize {
        self.chat_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResearchService for MockResearch {
    async fn search_company(&self, company_name: &str) -> Result<CompanySearch, GleanClientError> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        match self.search {
            Behavior::Answer => Ok(CompanySearch {
                query: company_search_query(company_name),
                hits: self.hits.clone(),
            }),
            Behavior::Fail => Err(unavailable()),
            Behavior::Stall => std::future::pending().await,
        }
    }

    async fn chat_query(&self, _message: &str, _context: &[String]) -> Result<String, GleanClientError> {
        self.chat_calls.fetch_add(1, Ordering::SeqCst);
        match self.chat {
            Behavior::Answer => Ok(self.answer.clone()),
            Behavior::Fail => Err(unavailable()),
            Behavior::Stall => std::future::pending().await,
        }
    }
}

pub struct MockCompletion {
    behavior: Behavior,
    output: String,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockCompletion {
    fn new(behavior: Behavior, output: &str) -> Self {
        Self {
            behavior,
            output: output.to_string(),
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn returning(output: &str) -> Self {
        Self::new(Behavior::Answer, output)
    }

    pub fn failing() -> Self {
        Self::new(Behavior::Fail, "")
    }

    pub fn stalled() -> Self {
        Self::new(Behavior::Stall, "")
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionService for MockCompletion {
    async fn complete(&self, prompt: &str) -> Result<String, GleanClientError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().unwrap() = Some(prompt.to_string());
        match self.behavior {
            Behavior::Answer => Ok(self.output.clone()),
            Behavior::Fail => Err(unavailable()),
            Behavior::Stall => std::future::pending().await,
        }
    }
}
