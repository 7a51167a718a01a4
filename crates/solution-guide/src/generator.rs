/// Guide orchestration: research, render, generate, post-process.
///
/// Steps run strictly in order. Research failures are absorbed and the guide
/// is built from whatever research survived; generation and output failures
/// abort the request.
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use glean_common::glean::{GleanClient, GleanClientError};
use regex::Regex;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{GuideError, ResearchError};
use crate::model::{GeneratedGuide, GuideRequest, ResearchBundle};
use crate::prompt;
use crate::research::{ResearchService, Researcher};

const EXPECTED_SECTIONS: &[&str] = &[
    "Solutions Guide",
    "What You're Building",
    "Integration",
    "Technical",
    "Getting Started",
];
const PROBE_MESSAGE: &str = "Hello, this is a test.";

static BLANK_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));
static LEADING_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#{1,6}\s+\S").expect("valid regex"));
static TIGHT_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{2,6})([^#\s])").expect("valid regex"));

/// Free-text completion for a rendered prompt.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, GleanClientError>;
}

#[async_trait]
impl CompletionService for GleanClient {
    async fn complete(&self, prompt: &str) -> Result<String, GleanClientError> {
        self.chat_query(prompt, &[]).await
    }
}

/// Deadlines applied by the orchestrator.
#[derive(Debug, Clone)]
pub struct GeneratorSettings {
    /// Research slower than this is abandoned and the degraded path taken.
    pub research_timeout: Duration,
    /// Generation slower than this fails the request.
    pub generation_timeout: Duration,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            research_timeout: Duration::from_secs(90),
            generation_timeout: Duration::from_secs(180),
        }
    }
}

/// Result of probing the research/generation service.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EnvironmentReport {
    pub configuration: bool,
    pub glean_client: bool,
    pub connectivity: bool,
}

impl EnvironmentReport {
    pub fn valid(&self) -> bool {
        self.configuration && self.glean_client && self.connectivity
    }
}

pub struct GuideGenerator {
    researcher: Researcher,
    completion: Arc<dyn CompletionService>,
    settings: GeneratorSettings,
}

impl GuideGenerator {
    pub fn new(
        research: Arc<dyn ResearchService>,
        completion: Arc<dyn CompletionService>,
        settings: GeneratorSettings,
    ) -> Self {
        Self {
            researcher: Researcher::new(research),
            completion,
            settings,
        }
    }

    /// Produce a solution guide for `request`.
    pub async fn generate(&self, request: &GuideRequest) -> Result<GeneratedGuide, GuideError> {
        request.validate()?;
        let company_name = request.company_name.as_str();
        info!(company = company_name, "starting guide generation");

        let research = self
            .research_for(company_name, &request.transcript, request.context())
            .await;

        let prompt = prompt::render(
            &request.transcript,
            company_name,
            &research,
            request.context(),
        );
        info!(
            company = company_name,
            prompt_chars = prompt.len(),
            research_degraded = research.degraded(),
            "generating solution guide"
        );

        let raw = match tokio::time::timeout(
            self.settings.generation_timeout,
            self.completion.complete(&prompt),
        )
        .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                error!(company = company_name, error = %e, "guide generation failed");
                return Err(GuideError::Generation(e));
            }
            Err(_) => {
                error!(
                    company = company_name,
                    timeout_secs = self.settings.generation_timeout.as_secs(),
                    "guide generation timed out"
                );
                return Err(GuideError::GenerationTimeout(self.settings.generation_timeout));
            }
        };

        let markdown = post_process(&raw, company_name)?;
        info!(company = company_name, guide_chars = markdown.len(), "guide generated");
        Ok(GeneratedGuide {
            markdown,
            research_degraded: research.degraded(),
        })
    }

    /// Research a company without generating a guide. Never fails; failures
    /// are reported through the bundle.
    pub async fn research(&self, company_name: &str) -> ResearchBundle {
        self.research_for(company_name, "", None).await
    }

    async fn research_for(
        &self,
        company_name: &str,
        transcript: &str,
        additional_context: Option<&str>,
    ) -> ResearchBundle {
        let outcome = tokio::time::timeout(
            self.settings.research_timeout,
            self.researcher
                .research(company_name, transcript, additional_context),
        )
        .await
        .unwrap_or(Err(ResearchError::TimedOut(self.settings.research_timeout)));

        match outcome {
            Ok(bundle) => bundle,
            Err(e) => {
                warn!(company = company_name, error = %e, "research unavailable, continuing without it");
                ResearchBundle::unavailable(company_name, e.to_string())
            }
        }
    }

    /// Check that the service answers a trivial chat.
    ///
    /// Configuration is always valid here: a generator cannot be built
    /// without credentials.
    pub async fn validate_environment(&self) -> EnvironmentReport {
        let reachable = match self.completion.complete(PROBE_MESSAGE).await {
            Ok(_) => true,
            Err(e) => {
                warn!(error = %e, "environment probe failed");
                false
            }
        };
        EnvironmentReport {
            configuration: true,
            glean_client: reachable,
            connectivity: reachable,
        }
    }
}

/// Clean up generated markdown.
///
/// Rejects blank output, collapses runs of blank lines, adds the missing space
/// in `##Heading`, and prepends a title unless the document already opens
/// with a heading.
pub fn post_process(raw: &str, company_name: &str) -> Result<String, GuideError> {
    let text = raw.replace("\r\n", "\n");
    let text = text.trim();
    if text.is_empty() {
        return Err(GuideError::MalformedOutput(
            "generated guide is empty".to_string(),
        ));
    }

    let text = BLANK_RUNS.replace_all(text, "\n\n");
    let text = normalize_headings(&text);

    let lower = text.to_lowercase();
    let missing: Vec<&str> = EXPECTED_SECTIONS
        .iter()
        .copied()
        .filter(|section| !lower.contains(&section.to_lowercase()))
        .collect();
    if !missing.is_empty() {
        warn!(company = company_name, ?missing, "generated guide missing sections");
    }

    if LEADING_HEADING.is_match(&text) {
        Ok(text)
    } else {
        Ok(format!(
            "# {company_name} + Plaid // Solutions Guide\n\n{text}"
        ))
    }
}

/// Insert the missing space in `##Heading` lines outside fenced code blocks.
///
/// Single `#` tokens such as `#1` or `#include` are left alone.
fn normalize_headings(text: &str) -> String {
    let mut fence: Option<&str> = None;
    text.lines()
        .map(|line| {
            let marker = fence_marker(line);
            match (fence, marker) {
                (None, Some(m)) => {
                    fence = Some(m);
                    line.to_string()
                }
                (Some(open), Some(m)) if open == m => {
                    fence = None;
                    line.to_string()
                }
                (Some(_), _) => line.to_string(),
                (None, None) => TIGHT_HEADING.replace(line, "${1} ${2}").into_owned(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn fence_marker(line: &str) -> Option<&'static str> {
    let line = line.trim_start();
    if line.starts_with("```") {
        Some("```")
    } else if line.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}
