//! HTTP client for the external signal service.

use async_trait::async_trait;
use governor_core::error::SignalError;
use governor_core::traits::SignalSource;
use governor_core::types::{Candle, ProposedSignal};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Serialize)]
struct SignalRequest<'a> {
    candles: &'a [Candle],
}

/// Posts the candle window to a signal endpoint and parses the proposal
/// from the response body.
///
/// The service is free to wrap its JSON in a markdown code fence; the
/// parser strips one before deserializing.
pub struct HttpSignalSource {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpSignalSource {
    pub fn new(endpoint: String, api_key: Option<String>) -> Result<Self, SignalError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SignalError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl SignalSource for HttpSignalSource {
    async fn propose(&self, candles: &[Candle]) -> Result<ProposedSignal, SignalError> {
        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&SignalRequest { candles });
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SignalError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SignalError::Connection(format!(
                "signal service returned {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| SignalError::Connection(e.to_string()))?;
        let payload = strip_code_fence(&body);
        debug!(payload, "signal service response");

        serde_json::from_str(payload)
            .map_err(|e| SignalError::MalformedDecision(format!("{e}: {payload}")))
    }
}

/// Strip a surrounding markdown code fence, with or without a `json` tag.
fn strip_code_fence(body: &str) -> &str {
    let mut text = body.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("json") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use governor_core::types::SignalSide;

    #[test]
    fn test_strip_code_fence() {
        assert_eq!(strip_code_fence("{\"side\":\"flat\"}"), "{\"side\":\"flat\"}");
        assert_eq!(
            strip_code_fence("```json\n{\"side\":\"flat\"}\n```"),
            "{\"side\":\"flat\"}"
        );
        assert_eq!(
            strip_code_fence("```\n{\"side\":\"flat\"}\n```"),
            "{\"side\":\"flat\"}"
        );
        assert_eq!(strip_code_fence("json {\"side\":\"flat\"}"), "{\"side\":\"flat\"}");
    }

    #[test]
    fn test_fenced_payload_deserializes() {
        let body = "```json\n{\"side\":\"long\",\"position_fraction\":0.25,\"stop_loss_pct\":1.0,\"take_profit_pct\":2.5}\n```";
        let signal: ProposedSignal = serde_json::from_str(strip_code_fence(body)).unwrap();
        assert_eq!(signal.side, SignalSide::Long);
        assert!((signal.position_fraction - 0.25).abs() < 1e-9);
        assert_eq!(signal.stop_loss_pct, Some(1.0));
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let signal: ProposedSignal = serde_json::from_str("{\"side\":\"flat\"}").unwrap();
        assert_eq!(signal.side, SignalSide::Flat);
        assert_eq!(signal.position_fraction, 0.0);
        assert!(signal.take_profit_pct.is_none());
    }
}
