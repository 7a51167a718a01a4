/// HTTP surface for the solution guide generator.
///
/// Routes:
/// - `GET /`: embedded web form
/// - `GET /health`, `GET /api/v1/health`: liveness
/// - `POST /api/v1/generate-guide`: full pipeline
/// - `POST /api/v1/research-company?company_name=...`: research only
/// - `POST /api/v1/validate-environment`: probe the Glean connection
use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tracing::{error, info};

use crate::api::{
    ErrorResponse, GuideMetadata, HealthResponse, ResearchCompanyParams,
    ResearchCompanyResponse, SolutionGuideResponse, ValidateEnvironmentResponse,
};
use crate::error::GuideError;
use crate::generator::GuideGenerator;
use crate::model::GuideRequest;

const INDEX_HTML: &str = include_str!("../static/index.html");
const GENERIC_ERROR: &str = "Internal server error occurred";
const API_SERVICE_NAME: &str = "solution-guide-generator-api";
const LOCAL_ORIGIN: &str = "http://localhost:8000";

#[derive(Clone)]
pub struct AppState {
    generator: Arc<GuideGenerator>,
    debug: bool,
}

impl AppState {
    pub fn new(generator: Arc<GuideGenerator>, debug: bool) -> Self {
        Self { generator, debug }
    }
}

pub fn router(state: AppState) -> Router {
    let cors = cors_layer(state.debug);
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/api/v1/health", get(api_health))
        .route("/api/v1/generate-guide", post(generate_guide))
        .route("/api/v1/research-company", post(research_company))
        .route("/api/v1/validate-environment", post(validate_environment))
        .layer(cors)
        .with_state(state)
}

/// Any origin in debug mode, otherwise only the locally served form.
fn cors_layer(debug: bool) -> CorsLayer {
    if debug {
        CorsLayer::very_permissive()
    } else {
        CorsLayer::new()
            .allow_origin(HeaderValue::from_static(LOCAL_ORIGIN))
            .allow_credentials(true)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
    }
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// An error response with a JSON [`ErrorResponse`] body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: ErrorResponse {
                error: message.into(),
                detail: None,
                code: "validation_error".to_string(),
            },
        }
    }

    fn from_guide(err: &GuideError, debug: bool) -> Self {
        match err {
            GuideError::Validation(message) => Self::validation(message.as_str()),
            other => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: ErrorResponse {
                    error: GENERIC_ERROR.to_string(),
                    detail: debug.then(|| other.to_string()),
                    code: other.code().to_string(),
                },
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: None,
    })
}

async fn api_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: Some(API_SERVICE_NAME.to_string()),
    })
}

async fn generate_guide(
    State(state): State<AppState>,
    payload: Result<Json<GuideRequest>, JsonRejection>,
) -> Result<Json<SolutionGuideResponse>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    info!(company = %request.company_name, "received guide generation request");

    let guide = state.generator.generate(&request).await.map_err(|e| {
        error!(company = %request.company_name, error = %e, "guide generation request failed");
        ApiError::from_guide(&e, state.debug)
    })?;

    Ok(Json(SolutionGuideResponse {
        guide: guide.markdown,
        metadata: GuideMetadata {
            transcript_length: request.transcript.chars().count(),
            has_additional_context: request.context().is_some(),
            research_degraded: guide.research_degraded,
        },
        company_name: request.company_name,
    }))
}

async fn research_company(
    State(state): State<AppState>,
    params: Result<Query<ResearchCompanyParams>, QueryRejection>,
) -> Result<Json<ResearchCompanyResponse>, ApiError> {
    let Query(params) = params.map_err(|rejection| ApiError::validation(rejection.body_text()))?;
    let company_name = params.company_name.trim();
    if company_name.is_empty() {
        return Err(ApiError::validation("Company name cannot be empty"));
    }

    info!(company = company_name, "received company research request");
    let research = state.generator.research(company_name).await;
    let message = if research.degraded() {
        "Company research completed with errors"
    } else {
        "Company research completed successfully"
    };

    Ok(Json(ResearchCompanyResponse {
        company_name: company_name.to_string(),
        research_results: research,
        message: message.to_string(),
    }))
}

async fn validate_environment(State(state): State<AppState>) -> Json<ValidateEnvironmentResponse> {
    let details = state.generator.validate_environment().await;
    Json(ValidateEnvironmentResponse {
        valid: details.valid(),
        details,
        message: "Environment validation completed".to_string(),
    })
}
