use std::time::{Duration, SystemTime, UNIX_EPOCH};

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::CommonError;

const SEARCH_PAGE_SIZE: u32 = 10;
const COMPANY_SEARCH_HITS: usize = 5;
const AI_AUTHOR: &str = "GLEAN_AI";
const CONTENT_MESSAGE: &str = "CONTENT";

/// Connection settings for the Glean REST API.
///
/// `instance` is either a bare instance name (`acme`, resolved to
/// `https://acme-be.glean.com`) or a full base URL.
#[derive(Clone)]
pub struct GleanClientConfig {
    pub instance: String,
    pub api_token: String,
    pub base_url: String,
    pub default_timeout: Duration,
    pub chat_timeout_millis: u64,
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub max_error_body_bytes: usize,
}

impl std::fmt::Debug for GleanClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GleanClientConfig")
            .field("instance", &self.instance)
            .field("api_token", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("default_timeout", &self.default_timeout)
            .field("chat_timeout_millis", &self.chat_timeout_millis)
            .field("max_retries", &self.max_retries)
            .field("initial_backoff", &self.initial_backoff)
            .field("max_backoff", &self.max_backoff)
            .field("max_error_body_bytes", &self.max_error_body_bytes)
            .finish()
    }
}

impl GleanClientConfig {
    /// Build a config with default tuning for the given credentials.
    pub fn new(instance: &str, api_token: &str) -> Self {
        Self {
            instance: instance.trim().to_string(),
            api_token: api_token.trim().to_string(),
            base_url: base_url_for(instance),
            default_timeout: Duration::from_secs(60),
            chat_timeout_millis: 30_000,
            max_retries: 2,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_millis(5_000),
            max_error_body_bytes: 8 * 1024,
        }
    }

    pub fn from_env() -> Result<Self, CommonError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load the config through `lookup`, which maps a variable name to its value.
    ///
    /// Required:
    /// - `GLEAN_INSTANCE`: instance name or base URL
    /// - `GLEAN_API_TOKEN`: bearer token
    ///
    /// Optional tuning falls back to the defaults of [`GleanClientConfig::new`]
    /// when absent or unparsable.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CommonError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let instance = required(&lookup, "GLEAN_INSTANCE")?;
        let api_token = required(&lookup, "GLEAN_API_TOKEN")?;
        let defaults = Self::new(&instance, &api_token);

        let default_timeout = parsed::<u64, _>(&lookup, "GLEAN_TIMEOUT_SECS")
            .map(Duration::from_secs)
            .unwrap_or(defaults.default_timeout);

        let chat_timeout_millis = parsed::<u64, _>(&lookup, "GLEAN_CHAT_TIMEOUT_MS")
            .unwrap_or(defaults.chat_timeout_millis);

        let max_retries =
            parsed::<u32, _>(&lookup, "GLEAN_MAX_RETRIES").unwrap_or(defaults.max_retries);

        let initial_backoff = parsed::<u64, _>(&lookup, "GLEAN_RETRY_INITIAL_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.initial_backoff);

        let max_backoff = parsed::<u64, _>(&lookup, "GLEAN_RETRY_MAX_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.max_backoff);

        let max_error_body_bytes = parsed::<usize, _>(&lookup, "GLEAN_MAX_ERROR_BODY_BYTES")
            .unwrap_or(defaults.max_error_body_bytes);

        Ok(Self {
            default_timeout,
            chat_timeout_millis,
            max_retries,
            initial_backoff,
            max_backoff,
            max_error_body_bytes,
            ..defaults
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/rest/api/v1/{path}", self.base_url)
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, CommonError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(CommonError::MissingVar(name))
}

fn parsed<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(name).and_then(|s| s.trim().parse::<T>().ok())
}

fn base_url_for(instance: &str) -> String {
    let instance = instance.trim();
    if instance.starts_with("http://") || instance.starts_with("https://") {
        instance.trim_end_matches('/').to_string()
    } else {
        format!("https://{instance}-be.glean.com")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GleanClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("invalid response JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("upstream returned error: status={status} message={message}")]
    Upstream { status: StatusCode, message: String },

    #[error("upstream returned non-JSON error: status={status} body={body}")]
    UpstreamBody { status: StatusCode, body: String },

    #[error(transparent)]
    Config(#[from] CommonError),
}

#[derive(Clone)]
pub struct GleanClient {
    config: GleanClientConfig,
    http: reqwest::Client,
}

impl GleanClient {
    /// Build a client. Fails on a blank instance or token.
    pub fn new(config: GleanClientConfig) -> Result<Self, GleanClientError> {
        if config.instance.trim().is_empty() {
            return Err(CommonError::MissingVar("GLEAN_INSTANCE").into());
        }
        if config.api_token.trim().is_empty() {
            return Err(CommonError::MissingVar("GLEAN_API_TOKEN").into());
        }
        let http = reqwest::Client::builder()
            .user_agent("solution-guide-generator")
            .build()?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &GleanClientConfig {
        &self.config
    }

    /// Run a raw search (POST /rest/api/v1/search).
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, GleanClientError> {
        let url = self.config.endpoint("search");
        self.post_json(&url, request).await
    }

    /// Search for general company information and return the top hits in
    /// service order.
    pub async fn search_company(
        &self,
        company_name: &str,
    ) -> Result<CompanySearch, GleanClientError> {
        let query = company_search_query(company_name);
        let request = SearchRequest {
            query: query.clone(),
            page_size: SEARCH_PAGE_SIZE,
            request_options: Some(SearchRequestOptions {
                facet_bucket_size: SEARCH_PAGE_SIZE,
            }),
        };
        let response = self.search(&request).await?;
        let hits: Vec<SearchHit> = response
            .results
            .into_iter()
            .take(COMPANY_SEARCH_HITS)
            .map(SearchHit::from)
            .collect();
        debug!(company = company_name, hits = hits.len(), "company search complete");
        Ok(CompanySearch { query, hits })
    }

    /// Run a raw chat exchange (POST /rest/api/v1/chat).
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, GleanClientError> {
        let url = self.config.endpoint("chat");
        self.post_json(&url, request).await
    }

    /// Ask a single question, optionally preceded by context messages, and
    /// return the assistant's answer text. The text may be empty when the
    /// service answers without any content fragments.
    pub async fn chat_query(
        &self,
        question: &str,
        context: &[String],
    ) -> Result<String, GleanClientError> {
        // Glean expects the most recent message first.
        let messages = std::iter::once(question)
            .chain(context.iter().rev().map(String::as_str))
            .map(ChatMessage::user)
            .collect();
        let request = ChatRequest {
            messages,
            stream: false,
            timeout_millis: Some(self.config.chat_timeout_millis),
        };
        let response = self.chat(&request).await?;
        Ok(response.answer_text())
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, GleanClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request_with_retry(|| async move {
            let resp = self
                .http
                .post(url)
                .bearer_auth(&self.config.api_token)
                .timeout(self.config.default_timeout)
                .json(body)
                .send()
                .await?;
            Self::parse_json_response(resp, self.config.max_error_body_bytes).await
        })
        .await
    }

    async fn parse_json_response<T: DeserializeOwned>(
        resp: reqwest::Response,
        max_error_body_bytes: usize,
    ) -> Result<T, GleanClientError> {
        if resp.status().is_success() {
            let bytes = resp.bytes().await?;
            return Ok(serde_json::from_slice::<T>(&bytes)?);
        }
        Err(Self::to_upstream_error(resp, max_error_body_bytes).await)
    }

    async fn to_upstream_error(
        resp: reqwest::Response,
        max_error_body_bytes: usize,
    ) -> GleanClientError {
        let status = resp.status();
        let body = read_limited_text(resp, max_error_body_bytes).await;
        if let Ok(parsed) = serde_json::from_str::<GleanErrorEnvelope>(&body) {
            if let Some(message) = parsed.message() {
                return GleanClientError::Upstream { status, message };
            }
        }
        GleanClientError::UpstreamBody { status, body }
    }

    async fn request_with_retry<T, Fut, F>(&self, mut f: F) -> Result<T, GleanClientError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, GleanClientError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match f().await {
                Ok(v) => return Ok(v),
                Err(e) => {
                    if attempt > self.config.max_retries || !should_retry(&e) {
                        return Err(e);
                    }
                    let delay = backoff_delay(
                        self.config.initial_backoff,
                        self.config.max_backoff,
                        attempt - 1,
                    );
                    warn!(
                        attempt,
                        delay_ms = delay.as_millis(),
                        error = %e,
                        "glean request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

pub fn company_search_query(company_name: &str) -> String {
    format!("company information about {company_name} business model products services")
}

fn should_retry(err: &GleanClientError) -> bool {
    match err {
        GleanClientError::Request(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        GleanClientError::Upstream { status, .. }
        | GleanClientError::UpstreamBody { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
        }
        GleanClientError::InvalidJson(_) | GleanClientError::Config(_) => false,
    }
}

fn backoff_delay(initial: Duration, max: Duration, exponent: u32) -> Duration {
    let mult = 1u128.checked_shl(exponent).unwrap_or(u128::MAX);
    let base_ms = initial.as_millis().saturating_mul(mult);
    let capped_ms = std::cmp::min(base_ms, max.as_millis()) as u64;
    let jitter_cap = std::cmp::max(1, capped_ms / 4);
    Duration::from_millis(capped_ms.saturating_add(pseudo_jitter_ms(jitter_cap)))
}

fn pseudo_jitter_ms(max_inclusive: u64) -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| Duration::from_secs(0));
    u64::from(now.subsec_nanos()) % (max_inclusive + 1)
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            if b.len() > max_bytes {
                b.truncate(max_bytes);
            }
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to read upstream error body");
            "<failed to read error body>".to_string()
        }
    }
}

/// Glean reports errors either as `{"message": ...}` or `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
struct GleanErrorEnvelope {
    message: Option<String>,
    error: Option<GleanErrorObject>,
}

impl GleanErrorEnvelope {
    fn message(self) -> Option<String> {
        self.message
            .or_else(|| self.error.and_then(|e| e.message))
            .filter(|m| !m.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct GleanErrorObject {
    message: Option<String>,
}

// --- Search ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub page_size: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_options: Option<SearchRequestOptions>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequestOptions {
    pub facet_bucket_size: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub title: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub snippets: Vec<SearchSnippet>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchSnippet {
    pub text: Option<String>,
    pub snippet: Option<String>,
}

/// A search result reduced to the parts used for research.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: Option<String>,
    pub url: Option<String>,
    pub snippet: Option<String>,
}

impl From<SearchResult> for SearchHit {
    fn from(result: SearchResult) -> Self {
        let snippet = result
            .snippets
            .into_iter()
            .find_map(|s| s.text.or(s.snippet).filter(|t| !t.trim().is_empty()));
        Self {
            title: result.title,
            url: result.url,
            snippet,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompanySearch {
    pub query: String,
    pub hits: Vec<SearchHit>,
}

// --- Chat ---

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_millis: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_type: Option<String>,
    #[serde(default)]
    pub fragments: Vec<ChatFragment>,
}

impl ChatMessage {
    pub fn user(text: &str) -> Self {
        Self {
            author: Some("USER".to_string()),
            message_type: Some(CONTENT_MESSAGE.to_string()),
            fragments: vec![ChatFragment {
                text: Some(text.to_string()),
            }],
        }
    }

    fn text(&self) -> String {
        self.fragments
            .iter()
            .filter_map(|f| f.text.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatFragment {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub chat_id: Option<String>,
}

impl ChatResponse {
    /// Text of the last assistant content message, falling back to the last
    /// message of any kind.
    pub fn answer_text(&self) -> String {
        self.messages
            .iter()
            .rev()
            .find(|m| {
                m.author.as_deref() == Some(AI_AUTHOR)
                    && m.message_type.as_deref().map_or(true, |t| t == CONTENT_MESSAGE)
            })
            .or_else(|| self.messages.last())
            .map(ChatMessage::text)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> GleanClientConfig {
        GleanClientConfig {
            initial_backoff: Duration::from_millis(1),
            max_backoff: Duration::from_millis(2),
            ..GleanClientConfig::new(&server.uri(), "test-token")
        }
    }

    #[test]
    fn test_base_url_for_instance_name() {
        assert_eq!(base_url_for("acme"), "https://acme-be.glean.com");
        assert_eq!(base_url_for("  acme \n"), "https://acme-be.glean.com");
    }

    #[test]
    fn test_base_url_for_full_url() {
        assert_eq!(
            base_url_for("http://127.0.0.1:9000/"),
            "http://127.0.0.1:9000"
        );
        let config = GleanClientConfig::new("https://glean.example.com", "t");
        assert_eq!(
            config.endpoint("chat"),
            "https://glean.example.com/rest/api/v1/chat"
        );
    }

    #[test]
    fn test_from_lookup_requires_credentials() {
        let vars: HashMap<&str, &str> = HashMap::from([("GLEAN_INSTANCE", "acme")]);
        let err = GleanClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap_err();
        assert!(matches!(err, CommonError::MissingVar("GLEAN_API_TOKEN")));

        let vars: HashMap<&str, &str> =
            HashMap::from([("GLEAN_INSTANCE", "  "), ("GLEAN_API_TOKEN", "t")]);
        let err = GleanClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string()))
            .unwrap_err();
        assert!(matches!(err, CommonError::MissingVar("GLEAN_INSTANCE")));
    }

    #[test]
    fn test_from_lookup_reads_tuning() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("GLEAN_INSTANCE", "acme"),
            ("GLEAN_API_TOKEN", "secret"),
            ("GLEAN_TIMEOUT_SECS", "5"),
            ("GLEAN_MAX_RETRIES", "0"),
            ("GLEAN_RETRY_INITIAL_MS", "not-a-number"),
        ]);
        let config =
            GleanClientConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.base_url, "https://acme-be.glean.com");
        assert_eq!(config.api_token, "secret");
        assert_eq!(config.default_timeout, Duration::from_secs(5));
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.initial_backoff, Duration::from_millis(200));
        assert!(!format!("{config:?}").contains("secret"));
    }

    #[test]
    fn test_client_rejects_blank_credentials() {
        let err = GleanClient::new(GleanClientConfig::new("", "t")).err().unwrap();
        assert!(matches!(
            err,
            GleanClientError::Config(CommonError::MissingVar("GLEAN_INSTANCE"))
        ));

        let err = GleanClient::new(GleanClientConfig::new("acme", "  ")).err().unwrap();
        assert!(matches!(
            err,
            GleanClientError::Config(CommonError::MissingVar("GLEAN_API_TOKEN"))
        ));

        assert!(GleanClient::new(GleanClientConfig::new("acme", "t")).is_ok());
    }

    #[test]
    fn test_answer_text_prefers_ai_content() {
        let response: ChatResponse = serde_json::from_value(serde_json::json!({
            "chatId": "c1",
            "messages": [
                {"author": "GLEAN_AI", "messageType": "UPDATE", "fragments": [{"text": "Searching..."}]},
                {"author": "GLEAN_AI", "messageType": "CONTENT", "fragments": [{"text": "Acme "}, {"text": "sells anvils."}]},
                {"author": "GLEAN_AI", "messageType": "UPDATE", "fragments": [{"text": "Done"}]}
            ]
        }))
        .unwrap();
        assert_eq!(response.answer_text(), "Acme sells anvils.");
    }

    #[test]
    fn test_answer_text_empty_response() {
        let response: ChatResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(response.answer_text(), "");
    }

    #[tokio::test]
    async fn test_search_company_sends_auth_and_keeps_top_hits() {
        let server = MockServer::start().await;
        let results: Vec<serde_json::Value> = (0..7)
            .map(|i| {
                serde_json::json!({
                    "title": format!("Doc {i}"),
                    "url": format!("https://docs.example.com/{i}"),
                    "snippets": [{"text": ""}, {"snippet": format!("snippet {i}")}]
                })
            })
            .collect();

        Mock::given(method("POST"))
            .and(path("/rest/api/v1/search"))
            .and(header("authorization", "Bearer test-token"))
            .and(body_partial_json(serde_json::json!({
                "query": "company information about Acme business model products services",
                "pageSize": 10
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "results": results })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = GleanClient::new(test_config(&server)).unwrap();
        let search = client.search_company("Acme").await.unwrap();
        assert_eq!(search.query, company_search_query("Acme"));
        assert_eq!(search.hits.len(), 5);
        assert_eq!(search.hits[0].title.as_deref(), Some("Doc 0"));
        assert_eq!(search.hits[4].snippet.as_deref(), Some("snippet 4"));
    }

    #[tokio::test]
    async fn test_chat_query_orders_question_first() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/api/v1/chat"))
            .and(body_partial_json(serde_json::json!({
                "stream": false,
                "timeoutMillis": 30000,
                "messages": [
                    {"author": "USER", "fragments": [{"text": "What next?"}]},
                    {"author": "USER", "fragments": [{"text": "second"}]},
                    {"author": "USER", "fragments": [{"text": "first"}]}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messages": [{"author": "GLEAN_AI", "fragments": [{"text": "Ship it."}]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GleanClient::new(test_config(&server)).unwrap();
        let answer = client
            .chat_query("What next?", &["first".to_string(), "second".to_string()])
            .await
            .unwrap();
        assert_eq!(answer, "Ship it.");
    }

    #[tokio::test]
    async fn test_retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/api/v1/chat"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/api/v1/chat"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "messages": [{"author": "GLEAN_AI", "fragments": [{"text": "ok"}]}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GleanClient::new(test_config(&server)).unwrap();
        assert_eq!(client.chat_query("ping", &[]).await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_does_not_retry_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/api/v1/chat"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Not allowed"))
            .expect(1)
            .mount(&server)
            .await;

        let client = GleanClient::new(test_config(&server)).unwrap();
        let err = client.chat_query("ping", &[]).await.unwrap_err();
        match err {
            GleanClientError::UpstreamBody { status, body } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert_eq!(body, "Not allowed");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_parses_json_error_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/api/v1/search"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(serde_json::json!({"message": "bad query"})),
            )
            .mount(&server)
            .await;

        let client = GleanClient::new(test_config(&server)).unwrap();
        let err = client.search_company("Acme").await.unwrap_err();
        assert!(matches!(
            err,
            GleanClientError::Upstream { status, ref message }
                if status == StatusCode::BAD_REQUEST && message == "bad query"
        ));
    }
}
