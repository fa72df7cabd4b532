//! Request and response envelopes.
//!
//! The generator accepts key-sorted JSON with a base64-encoded binary
//! token payload, the model name, and normalized parameters. Responses
//! carry base64 tokens plus error metadata.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use taleweave_scenario::GenerateParams;
use taleweave_tokenizer::{tokens_from_bin, tokens_to_bin, TokenSequence};

/// The request envelope. Field order matches the generator's key-sorted
/// expectation.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    /// Base64 of the little-endian binary token payload.
    pub input: String,
    pub model: String,
    pub parameters: GenerateParams,
}

impl GenerateRequest {
    /// Build a request from already-normalized parameters.
    pub fn new(tokens: &TokenSequence, parameters: GenerateParams) -> Self {
        Self {
            input: BASE64.encode(tokens_to_bin(tokens)),
            model: parameters.model.clone(),
            parameters,
        }
    }
}

/// The response envelope.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerateResponse {
    /// Base64 of the generated binary tokens.
    pub output: String,
    pub error: String,
    pub status_code: i64,
    pub message: String,
    pub logprobs: Option<serde_json::Value>,
}

impl GenerateResponse {
    /// Decode the output payload to tokens.
    pub fn output_tokens(&self) -> Result<TokenSequence, base64::DecodeError> {
        Ok(tokens_from_bin(&BASE64.decode(&self.output)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let mut params = GenerateParams::defaults();
        params.ban_brackets = Some(false);
        params.normalize();
        let request = GenerateRequest::new(&vec![72, 105], params);

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "6B-v4");
        assert_eq!(json["input"], BASE64.encode([72u8, 0, 105, 0]));
        assert!(json["parameters"]["temperature"].is_number());
        // Nulled lists are absent, not empty arrays.
        assert!(json["parameters"].get("bad_words_ids").is_none());
    }

    #[test]
    fn test_response_roundtrip() {
        let tokens: TokenSequence = vec![1, 2, 515];
        let response = GenerateResponse {
            output: BASE64.encode(tokens_to_bin(&tokens)),
            ..GenerateResponse::default()
        };
        assert_eq!(response.output_tokens().unwrap(), tokens);
    }

    #[test]
    fn test_response_parses_server_fields() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"output": "", "error": "quota", "statusCode": 402, "message": "denied"}"#,
        )
        .unwrap();
        assert_eq!(response.status_code, 402);
        assert_eq!(response.error, "quota");
    }
}
