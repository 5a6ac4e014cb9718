use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use super::persistence::EvaluationRow;
use crate::workflows::intake::domain::SubmissionRecord;

/// One independent outbound operation of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Persistence,
    Notification,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Persistence => f.write_str("persistence"),
            Channel::Notification => f.write_str("notification"),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ChannelError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unexpected status {status}")]
    Status { status: u16 },
    #[error("rejected: {0}")]
    Rejected(String),
    #[error("payload could not be encoded: {0}")]
    Serialization(String),
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl ChannelError {
    fn user_detail(&self) -> String {
        match self {
            ChannelError::Transport(message)
            | ChannelError::Rejected(message)
            | ChannelError::Serialization(message) => message.clone(),
            ChannelError::Status { status } => format!("Status {status}"),
            ChannelError::Unexpected(_) => "Erro desconhecido".to_string(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{channel} channel failed: {error}")]
pub struct ChannelFailure {
    pub channel: Channel,
    pub error: ChannelError,
}

impl ChannelFailure {
    pub fn user_message(&self) -> String {
        let detail = self.error.user_detail();
        match self.channel {
            Channel::Persistence => format!("Falha ao salvar no banco de dados: {detail}"),
            Channel::Notification => format!("Falha ao enviar para o webhook: {detail}"),
        }
    }
}

/// Durable store receiving one row per accepted submission.
#[async_trait]
pub trait PersistenceChannel: Send + Sync {
    async fn persist(&self, row: &EvaluationRow) -> Result<(), ChannelError>;
}

/// Push hook receiving the complete record.
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    async fn notify(&self, record: &SubmissionRecord) -> Result<(), ChannelError>;
}
