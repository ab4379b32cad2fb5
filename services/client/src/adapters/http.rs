//! services/client/src/adapters/http.rs
//!
//! This module contains the HTTP gateway to the language-learning backend.
//! It implements the `LearningBackend` port from the `core` crate on top of a
//! single `reqwest::Client` bound to one base URL.

use crate::adapters::protocol::{
    ChatRequest, ChatResponse, ErrorBody, FeedbackResponse, HealthResponse, LoginRequest,
    LoginResponse, RegisterRequest, StartSessionRequest, StartSessionResponse,
};
use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use lingua_core::domain::{BotReply, SessionOpening, SessionParams};
use lingua_core::ports::{LearningBackend, PortError, PortResult};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An HTTP client configured with a base URL and one mutable default
/// `Authorization` header slot.
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    bearer: ArcSwapOption<HeaderValue>,
}

impl HttpGateway {
    /// Creates a new `HttpGateway` for the given base URL, with no token installed.
    pub fn new(base_url: impl Into<String>) -> PortResult<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| PortError::Transport {
                status: None,
                message: Some(format!("failed to build HTTP client: {e}")),
                cause: Some(Box::new(e)),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer: ArcSwapOption::const_empty(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_bearer_token(&self) -> bool {
        self.bearer.load().is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POSTs `body` as JSON and parses the 2xx response body.
    pub async fn post_json<B, R>(&self, path: &str, body: &B) -> PortResult<R>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let request = self.client.post(self.url(path)).json(body);
        self.execute(path, request).await
    }

    /// GETs `path` with the given query parameters and parses the 2xx response body.
    pub async fn get_json<R>(&self, path: &str, query: &[(&str, &str)]) -> PortResult<R>
    where
        R: DeserializeOwned,
    {
        let request = self.client.get(self.url(path)).query(query);
        self.execute(path, request).await
    }

    async fn execute<R>(&self, path: &str, request: RequestBuilder) -> PortResult<R>
    where
        R: DeserializeOwned,
    {
        let request = match self.bearer.load_full() {
            Some(value) => request.header(AUTHORIZATION, value.as_ref().clone()),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            warn!(path, error = %e, "request failed before a response arrived");
            PortError::Transport {
                status: e.status().map(|s| s.as_u16()),
                message: None,
                cause: Some(Box::new(e)),
            }
        })?;

        let status = response.status();
        debug!(path, status = %status, "response received");

        if status.is_success() {
            let body = response.text().await.map_err(|e| PortError::Transport {
                status: Some(status.as_u16()),
                message: None,
                cause: Some(Box::new(e)),
            })?;
            let body = if body.trim().is_empty() { "null" } else { body.as_str() };
            return serde_json::from_str(body).map_err(|e| {
                PortError::Unexpected(format!("failed to parse response from {path}: {e}"))
            });
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message);
        warn!(path, status = %status, "backend returned an error status");
        Err(PortError::Transport {
            status: Some(status.as_u16()),
            message,
            cause: None,
        })
    }
}

//=========================================================================================
// `LearningBackend` Trait Implementation
//=========================================================================================

#[async_trait]
impl LearningBackend for HttpGateway {
    fn set_bearer_token(&self, token: Option<&str>) -> PortResult<()> {
        let value = match token {
            Some(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                    PortError::Unexpected(
                        "the issued token cannot be sent as a request header".to_string(),
                    )
                })?;
                value.set_sensitive(true);
                Some(Arc::new(value))
            }
            None => None,
        };
        self.bearer.store(value);
        Ok(())
    }

    async fn login(&self, username: &str, password: &str) -> PortResult<Option<String>> {
        let response: LoginResponse = self
            .post_json("/login", &LoginRequest { username, password })
            .await?;
        Ok(response.token.filter(|t| !t.is_empty()))
    }

    async fn register(&self, username: &str, email: &str, password: &str) -> PortResult<()> {
        let _: serde_json::Value = self
            .post_json(
                "/register",
                &RegisterRequest {
                    username,
                    email,
                    password,
                },
            )
            .await?;
        Ok(())
    }

    async fn verify_token(&self) -> PortResult<()> {
        let _: serde_json::Value = self.get_json("/api/verify_session", &[]).await?;
        Ok(())
    }

    async fn start_session(&self, params: &SessionParams) -> PortResult<SessionOpening> {
        let response: StartSessionResponse = self
            .post_json(
                "/api/start_session",
                &StartSessionRequest {
                    target_lang: &params.target_language,
                    source_lang: &params.native_language,
                    level: &params.level,
                },
            )
            .await?;
        Ok(SessionOpening {
            session_id: response.session_id,
            greeting: response.response,
            corrections: response.corrections,
        })
    }

    async fn send_message(&self, session_id: &str, text: &str) -> PortResult<BotReply> {
        let response: ChatResponse = self
            .post_json(
                "/api/chat",
                &ChatRequest {
                    user_input: text,
                    session_id,
                },
            )
            .await?;
        Ok(BotReply {
            response: response.response,
            corrections: response.corrections,
        })
    }

    async fn fetch_feedback(&self, session_id: &str) -> PortResult<String> {
        let response: FeedbackResponse = self
            .get_json("/api/feedback", &[("session_id", session_id)])
            .await?;
        Ok(response.feedback.unwrap_or_default())
    }

    async fn health(&self) -> PortResult<String> {
        let response: HealthResponse = self.get_json("/health", &[]).await?;
        Ok(response.status.unwrap_or_else(|| "unknown".to_string()))
    }
}
