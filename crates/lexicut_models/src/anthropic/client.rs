use crate::sse::decode_sse_stream;
use crate::{AnthropicRequest, AnthropicResponse};
use lexicut_error::{HttpError, LexicutResult, ModelsError, ModelsErrorKind, ModelsResult};
use lexicut_interface::{EventStream, ReasoningDriver, ReasoningRequest};
use reqwest::{Client, Response, StatusCode};
use tracing::{debug, error, instrument};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5";

/// Anthropic API client.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl AnthropicClient {
    /// Creates a new Anthropic client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Anthropic API key
    /// * `model` - Model identifier (e.g., "claude-sonnet-4-5")
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        debug!("Creating new Anthropic client");
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            endpoint: ANTHROPIC_API_URL.to_string(),
        }
    }

    /// Creates a client from `ANTHROPIC_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns `MissingApiKey` when the variable is unset or empty.
    pub fn from_env(model: impl Into<String>) -> ModelsResult<Self> {
        match std::env::var("ANTHROPIC_API_KEY") {
            Ok(key) if !key.trim().is_empty() => Ok(Self::new(key, model)),
            _ => Err(ModelsError::new(ModelsErrorKind::MissingApiKey)),
        }
    }

    /// Send requests to a different endpoint (proxies, test servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Build the wire request for a reasoning turn.
    pub fn build_request(
        &self,
        request: &ReasoningRequest,
        stream: bool,
    ) -> ModelsResult<AnthropicRequest> {
        let mut builder = AnthropicRequest::builder();
        builder
            .model(self.model.clone())
            .max_tokens(request.max_tokens)
            .messages(request.messages.clone())
            .tools(request.tools.clone())
            .stream(stream);
        if !request.system_prompt.is_empty() {
            builder.system(request.system_prompt.clone());
        }
        builder
            .build()
            .map_err(|e| ModelsError::new(ModelsErrorKind::Builder(e.to_string())))
    }

    #[instrument(skip(self, request), fields(model = %request.model(), stream = *request.stream()))]
    async fn send(&self, request: &AnthropicRequest) -> LexicutResult<Response> {
        debug!("Sending request to Anthropic API");

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, "Failed to send request to Anthropic API");
                HttpError::new(format!("Request to {} failed: {}", self.endpoint, e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Anthropic API returned error");
            let kind = if status == StatusCode::TOO_MANY_REQUESTS {
                ModelsErrorKind::RateLimited(body)
            } else {
                ModelsErrorKind::Api {
                    status: status.as_u16(),
                    message: body,
                }
            };
            return Err(ModelsError::new(kind).into());
        }

        Ok(response)
    }

    /// Sends a non-streamed request.
    ///
    /// # Errors
    ///
    /// Transport failures are `HttpError`s; error statuses and unparseable
    /// bodies are `ModelsError`s.
    pub async fn complete(&self, request: &AnthropicRequest) -> LexicutResult<AnthropicResponse> {
        let response = self.send(request).await?;

        let anthropic_response: AnthropicResponse = response.json().await.map_err(|e| {
            error!(error = ?e, "Failed to parse Anthropic response");
            ModelsError::new(ModelsErrorKind::Parse(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        debug!(
            response_id = %anthropic_response.id(),
            output_tokens = anthropic_response.usage().output_tokens(),
            "Received response from Anthropic"
        );
        Ok(anthropic_response)
    }
}

#[async_trait::async_trait]
impl ReasoningDriver for AnthropicClient {
    #[instrument(skip(self, request), fields(messages = request.messages.len()))]
    async fn stream(&self, request: &ReasoningRequest) -> LexicutResult<EventStream> {
        let wire = self.build_request(request, true)?;
        let response = self.send(&wire).await?;
        debug!("Streaming request accepted, decoding event stream");
        Ok(Box::pin(decode_sse_stream(response.bytes_stream())))
    }

    fn provider_name(&self) -> &'static str {
        "anthropic"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
