//! Blocking HTTP submission to the generation endpoint.

use crate::backoff::BackoffSchedule;
use crate::envelope::{GenerateRequest, GenerateResponse};
use crate::error::{ClientError, Result};
use std::time::Duration;
use taleweave_scenario::GenerateParams;
use taleweave_tokenizer::Encoder;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://api.example-generator.net";
const GENERATE_PATH: &str = "/ai/generate";
const TOKEN_ENV_VAR: &str = "TALEWEAVE_ACCESS_TOKEN";
const BACKEND_ENV_VAR: &str = "TALEWEAVE_BACKEND";

/// Bearer credentials for the generation service.
///
/// Deriving the token from a username/password is handled by an external
/// collaborator; this type only carries the result.
#[derive(Debug, Clone)]
pub struct AccessKeys {
    pub access_token: String,
    pub backend: String,
}

impl AccessKeys {
    /// Read credentials from the environment.
    pub fn from_env() -> Result<Self> {
        let access_token = std::env::var(TOKEN_ENV_VAR).map_err(|_| {
            ClientError::Auth(format!("{} is not set in the environment", TOKEN_ENV_VAR))
        })?;
        let backend = std::env::var(BACKEND_ENV_VAR)
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        Ok(Self {
            access_token,
            backend,
        })
    }
}

/// One completed generation round-trip.
#[derive(Debug, Clone)]
pub struct GenerateOutcome {
    /// The submitted input text.
    pub request_text: String,
    /// Base64 form of the submitted tokens.
    pub encoded_request: String,
    /// The decoded response text.
    pub response_text: String,
    /// Base64 form of the response tokens.
    pub encoded_response: String,
}

/// Blocking client for the generation endpoint.
pub struct GeneratorClient {
    keys: AccessKeys,
    http: reqwest::blocking::Client,
    backoff: BackoffSchedule,
}

impl GeneratorClient {
    /// Create a client with the default backoff schedule.
    pub fn new(keys: AccessKeys) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(120))
            .user_agent(concat!("taleweave/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self {
            keys,
            http,
            backoff: BackoffSchedule::default(),
        })
    }

    /// Override the backoff schedule.
    pub fn with_backoff(mut self, backoff: BackoffSchedule) -> Self {
        self.backoff = backoff;
        self
    }

    /// Encode, normalize, submit, and decode one generation.
    ///
    /// Parameters are normalized here, once, immediately before
    /// submission.
    pub fn generate(
        &self,
        encoder: &Encoder,
        text: &str,
        mut parameters: GenerateParams,
    ) -> Result<GenerateOutcome> {
        parameters.normalize();
        let tokens = encoder.encode(text);
        let request = GenerateRequest::new(&tokens, parameters);
        let encoded_request = request.input.clone();

        let response = self.submit(&request)?;
        let output_tokens = response
            .output_tokens()
            .map_err(|e| ClientError::Decode(e.to_string()))?;

        Ok(GenerateOutcome {
            request_text: text.to_string(),
            encoded_request,
            response_text: encoder.decode(&output_tokens),
            encoded_response: response.output,
        })
    }

    /// Submit a prepared request, retrying on transport failures and
    /// non-201 statuses until the backoff schedule is exhausted.
    pub fn submit(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
        let url = format!("{}{}", self.keys.backend, GENERATE_PATH);
        let mut last_failure = String::new();

        for attempt in 0..self.backoff.max_attempts {
            let delay = self.backoff.delay_for(attempt);
            if !delay.is_zero() {
                std::thread::sleep(delay);
            }

            let result = self
                .http
                .post(&url)
                .bearer_auth(&self.keys.access_token)
                .json(request)
                .send();

            match result {
                Ok(response) if response.status().as_u16() == 201 => {
                    let decoded: GenerateResponse = response
                        .json()
                        .map_err(|e| ClientError::Decode(e.to_string()))?;
                    if !decoded.error.is_empty() {
                        return Err(ClientError::Server {
                            status: decoded.status_code,
                            message: decoded.error,
                        });
                    }
                    debug!(attempt, "generation request succeeded");
                    return Ok(decoded);
                }
                Ok(response) => {
                    last_failure = format!("status {}", response.status());
                    warn!(attempt, status = %response.status(), "generation request rejected");
                }
                Err(e) => {
                    last_failure = e.to_string();
                    warn!(attempt, error = %last_failure, "generation request failed");
                }
            }
        }

        Err(ClientError::Transport(format!(
            "retries exhausted after {} attempts: {}",
            self.backoff.max_attempts, last_failure
        )))
    }
}
