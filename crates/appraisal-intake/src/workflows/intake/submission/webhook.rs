use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::channels::{ChannelError, NotificationChannel};
use crate::workflows::intake::domain::SubmissionRecord;

/// Posts the full record as JSON to a fixed webhook URL. Any non-2xx status
/// is reported as [`ChannelError::Status`].
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    http: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ChannelError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ChannelError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }
}

#[async_trait]
impl NotificationChannel for WebhookNotifier {
    async fn notify(&self, record: &SubmissionRecord) -> Result<(), ChannelError> {
        let body =
            serde_json::to_vec(record).map_err(|err| ChannelError::Serialization(err.to_string()))?;

        let response = self
            .http
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
            .body(body)
            .send()
            .await
            .map_err(|err| ChannelError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChannelError::Status {
                status: status.as_u16(),
            });
        }

        debug!(status = status.as_u16(), "webhook accepted submission");
        Ok(())
    }
}
