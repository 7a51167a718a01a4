use glean_common::glean::SearchHit;
use serde::{Deserialize, Serialize};

use crate::error::GuideError;

/// A request to generate a solution guide from a call transcript.
///
/// Field values are kept verbatim; validation only rejects blank required
/// fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideRequest {
    /// Call transcript content.
    pub transcript: String,
    /// Target company name.
    pub company_name: String,
    /// Extra context about the use case.
    #[serde(default)]
    pub additional_context: Option<String>,
}

impl GuideRequest {
    pub fn new(
        transcript: impl Into<String>,
        company_name: impl Into<String>,
        additional_context: Option<String>,
    ) -> Self {
        Self {
            transcript: transcript.into(),
            company_name: company_name.into(),
            additional_context,
        }
    }

    pub fn validate(&self) -> Result<(), GuideError> {
        if self.transcript.trim().is_empty() {
            return Err(GuideError::Validation(
                "Transcript cannot be empty".to_string(),
            ));
        }
        if self.company_name.trim().is_empty() {
            return Err(GuideError::Validation(
                "Company name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Additional context, with blank values treated as absent.
    pub fn context(&self) -> Option<&str> {
        self.additional_context
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }
}

/// Everything the research stage learned about a company.
///
/// Every field is optional; a bundle with nothing but the company name is a
/// valid (empty) result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResearchBundle {
    pub company_name: String,
    /// Query text sent to search, when a search was attempted.
    pub search_query: Option<String>,
    /// Top search hits in service order.
    pub search_results: Vec<SearchHit>,
    pub business_overview: Option<String>,
    pub technical_context: Option<String>,
    /// Chat analysis of a transcript excerpt; only for substantial transcripts.
    pub transcript_analysis: Option<String>,
    /// Messages from research calls that failed.
    pub failures: Vec<String>,
}

impl ResearchBundle {
    pub fn empty(company_name: &str) -> Self {
        Self {
            company_name: company_name.to_string(),
            ..Self::default()
        }
    }

    /// An empty bundle recording why research produced nothing.
    pub fn unavailable(company_name: &str, reason: impl Into<String>) -> Self {
        Self {
            failures: vec![reason.into()],
            ..Self::empty(company_name)
        }
    }

    pub fn degraded(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Final markdown guide plus whether it was built from degraded research.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedGuide {
    pub markdown: String,
    pub research_degraded: bool,
}
