// [libs/infra/dispatch_client/src/client.rs]
//! Ticket-creation sink adapter. One call per dispatch job: the
//! Dispatch Worker decides what `DeliveryOutcome` means for the job's
//! state, this client only classifies the HTTP response.

use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tracing::{instrument, warn};

/// Outbound deadline for the dispatch call.
const DISPATCH_DEADLINE: Duration = Duration::from_secs(15);

/// How the sink responded, already bucketed the way the Dispatch
/// Worker needs it: 2xx delivers, 4xx is terminal, anything else is
/// worth retrying.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    RejectedTerminal { status: u16, body: String },
    Retryable { reason: String },
}

pub struct DispatchSinkClient {
    http: Client,
    endpoint: String,
}

impl DispatchSinkClient {
    pub fn new(endpoint: String, auth_token: String) -> Self {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Ok(value) = reqwest::header::HeaderValue::from_str(&format!("Bearer {auth_token}")) {
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(DISPATCH_DEADLINE)
            .build()
            .expect("dispatch sink client failed to initialise");

        Self { http, endpoint }
    }

    #[instrument(skip(self, payload))]
    pub async fn deliver(&self, payload: &Value) -> DeliveryOutcome {
        let call = self.http.post(&self.endpoint).json(payload).send();

        let response = match tokio::time::timeout(DISPATCH_DEADLINE, call).await {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => {
                warn!(error = %err, "🛰️ [DISPATCH]: transport error");
                return DeliveryOutcome::Retryable { reason: err.to_string() };
            }
            Err(_) => {
                warn!("🛰️ [DISPATCH]: call exceeded {DISPATCH_DEADLINE:?} deadline");
                return DeliveryOutcome::Retryable { reason: "timeout".into() };
            }
        };

        let status = response.status();
        if status.is_success() {
            return DeliveryOutcome::Delivered;
        }

        let body = response.text().await.unwrap_or_default();
        if status.is_client_error() {
            warn!(status = %status, "🛰️ [DISPATCH]: sink rejected job terminally");
            DeliveryOutcome::RejectedTerminal { status: status.as_u16(), body }
        } else {
            warn!(status = %status, "🛰️ [DISPATCH]: sink returned a retryable failure");
            DeliveryOutcome::Retryable { reason: format!("status {status}") }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_builds_with_bearer_header() {
        let _client = DispatchSinkClient::new("https://sink.example/tickets".into(), "secret".into());
    }
}
