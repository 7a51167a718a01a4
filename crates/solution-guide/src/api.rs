use serde::{Deserialize, Serialize};

use crate::generator::EnvironmentReport;
use crate::model::ResearchBundle;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionGuideResponse {
    /// Generated solution guide in markdown format.
    pub guide: String,
    pub company_name: String,
    pub metadata: GuideMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuideMetadata {
    /// Transcript length in characters.
    pub transcript_length: usize,
    pub has_additional_context: bool,
    /// True when some or all company research failed and the guide was built
    /// without it.
    pub research_degraded: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResearchCompanyParams {
    pub company_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchCompanyResponse {
    pub company_name: String,
    pub research_results: ResearchBundle,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidateEnvironmentResponse {
    pub valid: bool,
    pub details: EnvironmentReport,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    /// Underlying cause; only populated for 5xx responses in debug mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub code: String,
}
