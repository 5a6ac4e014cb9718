//! Optional drafting of a market appraisal report (PTAM) from a record.

mod gemini;
mod prompt;
mod sections;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::SubmissionRecord;

pub use gemini::{GeminiClient, GEMINI_ENDPOINT};
pub use prompt::build_prompt;
pub use sections::{split_sections, ReportSection};

pub const REPORT_FAILURE_MESSAGE: &str =
    "Não foi possível gerar o parecer técnico. Tente novamente mais tarde.";

#[derive(Debug, Clone, Serialize)]
pub struct AppraisalReport {
    pub markdown: String,
    pub sections: Vec<ReportSection>,
    pub generated_at: DateTime<Utc>,
}

impl AppraisalReport {
    pub fn from_markdown(markdown: String) -> Self {
        let sections = split_sections(&markdown);
        Self {
            markdown,
            sections,
            generated_at: Utc::now(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report generation is not configured")]
    NotConfigured,
    #[error("report service transport failed: {0}")]
    Transport(String),
    #[error("report service returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("report service returned no text")]
    EmptyResponse,
}

impl ReportError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ReportError::NotConfigured => "A geração de parecer técnico não está habilitada.",
            _ => REPORT_FAILURE_MESSAGE,
        }
    }
}

/// Capability drafting a report for a record.
#[async_trait]
pub trait ReportGenerator: Send + Sync {
    async fn generate(&self, record: &SubmissionRecord) -> Result<AppraisalReport, ReportError>;
}
