use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{build_prompt, AppraisalReport, ReportError, ReportGenerator};
use crate::workflows::intake::domain::SubmissionRecord;
use crate::workflows::intake::encoder::parse_inline_data;

pub const GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Client for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part<'a> {
    Text { text: String },
    Inline { inline_data: Blob<'a> },
}

#[derive(Debug, Serialize)]
struct Blob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl GenerateResponse {
    fn into_text(self) -> Option<String> {
        let text: String = self
            .candidates
            .into_iter()
            .next()?
            .content?
            .parts
            .into_iter()
            .filter_map(|part| part.text)
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

fn request_for(record: &SubmissionRecord) -> GenerateRequest<'_> {
    let mut parts = vec![Part::Text {
        text: build_prompt(record),
    }];
    parts.extend(
        record
            .filled_photos()
            .filter_map(|photo| parse_inline_data(photo))
            .filter(|inline| inline.media_type.starts_with("image/"))
            .map(|inline| Part::Inline {
                inline_data: Blob {
                    mime_type: inline.media_type,
                    data: inline.payload,
                },
            }),
    );
    GenerateRequest {
        contents: vec![Content { parts }],
    }
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ReportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ReportError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            endpoint: GEMINI_ENDPOINT.to_string(),
            model: model.into(),
            api_key: api_key.into(),
        })
    }

    /// Points the client at another API root, e.g. a local stand-in.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

#[async_trait]
impl ReportGenerator for GeminiClient {
    async fn generate(&self, record: &SubmissionRecord) -> Result<AppraisalReport, ReportError> {
        let request = request_for(record);
        debug!(
            model = %self.model,
            parts = request.contents[0].parts.len(),
            "requesting appraisal report"
        );

        let response = self
            .http
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| ReportError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| status.to_string());
            warn!(status = status.as_u16(), %message, "report service rejected request");
            return Err(ReportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|err| ReportError::Transport(err.to_string()))?;
        let markdown = body.into_text().ok_or(ReportError::EmptyResponse)?;
        Ok(AppraisalReport::from_markdown(markdown))
    }
}
