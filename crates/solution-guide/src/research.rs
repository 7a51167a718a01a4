/// Research stage: gathers company context from the research service.
///
/// Each call degrades on its own. A failed call is logged, recorded in the
/// bundle's `failures`, and leaves its field empty. The stage only fails as a
/// whole when every call failed.
use std::sync::Arc;

use async_trait::async_trait;
use glean_common::glean::{CompanySearch, GleanClient, GleanClientError};
use tracing::{debug, info, warn};

use crate::error::ResearchError;
use crate::model::ResearchBundle;
use crate::prompt;

const USE_CASE_KEYWORDS: &[&str] = &[
    "payment",
    "transaction",
    "bank",
    "financial",
    "integration",
    "api",
    "platform",
    "system",
    "application",
    "service",
];
const USE_CASE_SCAN_SENTENCES: usize = 20;
const USE_CASE_MAX_SENTENCES: usize = 3;
const DEFAULT_USE_CASE: &str = "financial technology integration";

/// Transcripts at or below this many characters skip transcript analysis.
const ANALYSIS_MIN_CHARS: usize = 500;
const EXCERPT_CHARS: usize = 1000;

/// Company search and conversational queries.
#[async_trait]
pub trait ResearchService: Send + Sync {
    async fn search_company(&self, company_name: &str) -> Result<CompanySearch, GleanClientError>;

    async fn chat_query(&self, message: &str, context: &[String]) -> Result<String, GleanClientError>;
}

#[async_trait]
impl ResearchService for GleanClient {
    async fn search_company(&self, company_name: &str) -> Result<CompanySearch, GleanClientError> {
        GleanClient::search_company(self, company_name).await
    }

    async fn chat_query(&self, message: &str, context: &[String]) -> Result<String, GleanClientError> {
        GleanClient::chat_query(self, message, context).await
    }
}

#[derive(Clone)]
pub struct Researcher {
    service: Arc<dyn ResearchService>,
}

impl Researcher {
    pub fn new(service: Arc<dyn ResearchService>) -> Self {
        Self { service }
    }

    pub async fn research(
        &self,
        company_name: &str,
        transcript: &str,
        additional_context: Option<&str>,
    ) -> Result<ResearchBundle, ResearchError> {
        let use_case = extract_use_case(transcript, additional_context);
        debug!(company = company_name, use_case = %use_case, "researching company");

        let mut bundle = ResearchBundle::empty(company_name);
        let mut attempts = 0usize;

        attempts += 1;
        match self.service.search_company(company_name).await {
            Ok(search) => {
                bundle.search_query = Some(search.query);
                bundle.search_results = search.hits;
            }
            Err(e) => record_failure(&mut bundle, "company search", &e),
        }

        attempts += 1;
        let question = business_question(company_name, &use_case);
        let overview = self.ask(&mut bundle, "business overview", &question).await;
        bundle.business_overview = overview;

        attempts += 1;
        let question = technical_question(company_name, &use_case);
        let technical = self.ask(&mut bundle, "technical context", &question).await;
        bundle.technical_context = technical;

        if transcript.chars().count() > ANALYSIS_MIN_CHARS {
            attempts += 1;
            let question = prompt::render_research(company_name, &transcript_excerpt(transcript));
            let analysis = self.ask(&mut bundle, "transcript analysis", &question).await;
            bundle.transcript_analysis = analysis;
        }

        if bundle.failures.len() == attempts {
            return Err(ResearchError::Unavailable {
                company: company_name.to_string(),
                first: bundle.failures.swap_remove(0),
            });
        }

        info!(
            company = company_name,
            search_hits = bundle.search_results.len(),
            failed_calls = bundle.failures.len(),
            "research complete"
        );
        Ok(bundle)
    }

    async fn ask(&self, bundle: &mut ResearchBundle, label: &str, question: &str) -> Option<String> {
        match self.service.chat_query(question, &[]).await {
            Ok(answer) => Some(answer).filter(|a| !a.trim().is_empty()),
            Err(e) => {
                record_failure(bundle, label, &e);
                None
            }
        }
    }
}

fn record_failure(bundle: &mut ResearchBundle, label: &str, err: &GleanClientError) {
    warn!(company = %bundle.company_name, call = label, error = %err, "research call failed");
    bundle.failures.push(format!("{label}: {err}"));
}

fn business_question(company_name: &str, use_case: &str) -> String {
    format!(
        "Tell me about {company_name} - what is their business model, what products/services \
do they offer, and what industry are they in? Focus on aspects relevant to {use_case}."
    )
}

fn technical_question(company_name: &str, use_case: &str) -> String {
    format!(
        "What technical challenges might {company_name} face when implementing {use_case}? \
What integration considerations should we be aware of?"
    )
}

/// Summarize what the customer is trying to build.
///
/// The additional context comes first, followed by up to three of the
/// leading transcript sentences that mention a use-case keyword.
pub fn extract_use_case(transcript: &str, additional_context: Option<&str>) -> String {
    let mut parts: Vec<&str> = Vec::new();

    if let Some(context) = additional_context.map(str::trim).filter(|c| !c.is_empty()) {
        parts.push(context);
    }

    parts.extend(
        transcript
            .split('.')
            .take(USE_CASE_SCAN_SENTENCES)
            .map(str::trim)
            .filter(|sentence| {
                let lower = sentence.to_lowercase();
                USE_CASE_KEYWORDS.iter().any(|k| lower.contains(k))
            })
            .take(USE_CASE_MAX_SENTENCES),
    );

    if parts.is_empty() {
        DEFAULT_USE_CASE.to_string()
    } else {
        parts.join(" ")
    }
}

fn transcript_excerpt(transcript: &str) -> String {
    match transcript.char_indices().nth(EXCERPT_CHARS) {
        Some((cut, _)) => format!("{}...", &transcript[..cut]),
        None => transcript.to_string(),
    }
}
