use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use trivia_core::model::{QuestionDraft, SessionToken};

use crate::error::{FetchError, TokenError};
use crate::source::QuestionSource;

/// Upstream code for success; any other value is a failure even when the
/// HTTP layer reports 200.
const RESPONSE_OK: u8 = 0;

#[derive(Clone, Debug)]
pub struct TriviaApiConfig {
    pub base_url: String,
}

impl TriviaApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            env::var("TRIVIA_API_BASE_URL").unwrap_or_else(|_| "https://opentdb.com".into());
        Self { base_url }
    }
}

/// Question bank client speaking the Open Trivia DB wire protocol.
///
/// Stateless besides the connection pool; token caching belongs to the
/// controller, which owns the process-lifetime state.
pub struct TriviaApi {
    client: Client,
    config: TriviaApiConfig,
}

impl TriviaApi {
    #[must_use]
    pub fn new(config: TriviaApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(TriviaApiConfig::from_env())
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl QuestionSource for TriviaApi {
    #[instrument(level = "debug", skip(self))]
    async fn request_token(&self) -> Result<SessionToken, TokenError> {
        let response = self
            .client
            .get(self.endpoint("api_token.php"))
            .query(&[("command", "request")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TokenError::HttpStatus(response.status()));
        }

        let body: TokenResponse = response.json().await?;
        if body.response_code != RESPONSE_OK {
            warn!(code = body.response_code, "token endpoint reported failure");
            return Err(TokenError::ResponseCode(body.response_code));
        }

        debug!("acquired session token");
        Ok(SessionToken::new(body.token))
    }

    #[instrument(level = "debug", skip(self, filters, token))]
    async fn fetch_batch(
        &self,
        amount: u32,
        filters: &[(String, String)],
        token: Option<&SessionToken>,
    ) -> Result<Vec<QuestionDraft>, FetchError> {
        let mut request = self
            .client
            .get(self.endpoint("api.php"))
            .query(&[("amount", amount.to_string())])
            .query(filters);
        if let Some(token) = token {
            request = request.query(&[("token", token.value())]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(FetchError::HttpStatus(response.status()));
        }

        let body: BatchResponse = response.json().await?;
        if body.response_code != RESPONSE_OK {
            warn!(
                code = body.response_code,
                "question endpoint reported failure"
            );
            return Err(FetchError::ResponseCode(body.response_code));
        }

        debug!(results = body.results.len(), "fetched question batch");
        Ok(body
            .results
            .into_iter()
            .map(QuestionRecord::into_draft)
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    response_code: u8,
    #[serde(default)]
    token: String,
}

#[derive(Debug, Deserialize)]
struct BatchResponse {
    response_code: u8,
    #[serde(default)]
    results: Vec<QuestionRecord>,
}

#[derive(Debug, Deserialize)]
struct QuestionRecord {
    question: String,
    correct_answer: String,
    incorrect_answers: Vec<String>,
}

impl QuestionRecord {
    fn into_draft(self) -> QuestionDraft {
        QuestionDraft::new(self.question, self.correct_answer, self.incorrect_answers)
    }
}
