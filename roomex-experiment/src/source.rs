use crate::error::SequencerError;
use async_trait::async_trait;
use reqwest::Client;
use roomex_core::TrialListSession;

/// Where trial batches come from
#[async_trait]
pub trait TrialSource: Send + Sync {
    async fn fetch_session(&self, trial_type: &str) -> Result<TrialListSession, SequencerError>;
}

/// Default path of the `make_or_get_trial` endpoint.
pub const DEFAULT_TRIAL_PATH: &str = "/api/make_or_get_trial";

/// `GET {base_url}{path}?trial_type=..` against the experiment server.
#[derive(Clone)]
pub struct HttpTrialSource {
    client: Client,
    base_url: String,
    path: String,
}

impl HttpTrialSource {
    pub fn new(base_url: &str, path: &str) -> Self {
        Self::with_client(Client::new(), base_url, path)
    }

    pub fn with_client(client: Client, base_url: &str, path: &str) -> Self {
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            path,
        }
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }
}

#[async_trait]
impl TrialSource for HttpTrialSource {
    async fn fetch_session(&self, trial_type: &str) -> Result<TrialListSession, SequencerError> {
        let url = self.endpoint();
        tracing::debug!(%url, trial_type, "requesting trial batch");

        let response = self
            .client
            .get(&url)
            .query(&[("trial_type", trial_type)])
            .send()
            .await
            .map_err(|e| SequencerError::FetchFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SequencerError::FetchFailed(format!("{status}: {body}")));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SequencerError::FetchFailed(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| SequencerError::MalformedPayload(e.to_string()))
    }
}
