//! Gateway over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use survey_core::{GatewayError, Submission, SurveyGateway, SurveyRecord};
use survey_settings::GatewaySettings;
use tracing::instrument;

use crate::response::{parse_record_list, parse_submit_reply};

const MAX_ERROR_BODY: usize = 512;

/// The spreadsheet web app reached over HTTP.
///
/// Submissions are posted as `application/x-www-form-urlencoded`; the record
/// list is fetched with a GET on the same URL. Redirects are followed, since
/// the web app answers from a content host behind a 302.
pub struct HttpGateway {
    client: Client,
    endpoint: String,
}

impl HttpGateway {
    /// Build a gateway from settings.
    pub fn new(settings: &GatewaySettings) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(settings.connect_timeout_ms))
            .user_agent(settings.user_agent.clone())
            .build()
            .map_err(|e| GatewayError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_client(client, settings.endpoint_url.trim()))
    }

    /// Build a gateway around an existing client.
    pub fn with_client(client: Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    /// The endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn read_body(response: reqwest::Response) -> Result<String, GatewayError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(format!("failed to read response: {e}")))?;
        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: truncate(body),
            });
        }
        Ok(body)
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push_str("...");
    }
    body
}

#[async_trait]
impl SurveyGateway for HttpGateway {
    #[instrument(skip(self, submission), fields(endpoint = %self.endpoint, fields = submission.len()))]
    async fn submit(&self, submission: &Submission) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(submission.pairs())
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let body = Self::read_body(response).await?;
        let outcome = parse_submit_reply(&body);
        match &outcome {
            Ok(()) => tracing::info!("submission accepted"),
            Err(e) => tracing::warn!(kind = e.error_kind(), error = %e, "submission failed"),
        }
        outcome
    }

    #[instrument(skip(self), fields(endpoint = %self.endpoint))]
    async fn fetch_all(&self) -> Result<Vec<SurveyRecord>, GatewayError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let body = Self::read_body(response).await?;
        let records = parse_record_list(&body)?;
        tracing::info!(count = records.len(), "records fetched");
        Ok(records)
    }
}
