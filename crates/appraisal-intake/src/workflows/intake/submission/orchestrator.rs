use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use serde::Serialize;
use tracing::{error, info, warn};

use super::channels::{
    Channel, ChannelError, ChannelFailure, NotificationChannel, PersistenceChannel,
};
use super::persistence::EvaluationRow;
use super::validation::{precheck, ValidationError};
use crate::workflows::intake::domain::SubmissionRecord;
use crate::workflows::intake::state::FormState;

pub const SUCCESS_MESSAGE: &str = "Dados enviados com sucesso!";

/// Summary returned once both channels accepted a submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReceipt {
    pub submitted_at: DateTime<Utc>,
    pub photo_count: usize,
    pub document_count: usize,
    pub message: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("submission failed: {}", describe(.0))]
    Channels(Vec<ChannelFailure>),
}

impl SubmissionError {
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::Validation(err) => err.message.clone(),
            SubmissionError::Channels(failures) => {
                let details = failures
                    .iter()
                    .map(ChannelFailure::user_message)
                    .collect::<Vec<_>>()
                    .join("; ");
                format!("Ocorreu um erro ao enviar os dados: {details}")
            }
        }
    }

    pub fn failed_channels(&self) -> Vec<Channel> {
        match self {
            SubmissionError::Validation(_) => Vec::new(),
            SubmissionError::Channels(failures) => {
                failures.iter().map(|failure| failure.channel).collect()
            }
        }
    }
}

fn describe(failures: &[ChannelFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Validates the form and fans the submission out to the persistence and
/// notification channels.
pub struct SubmissionOrchestrator<P, N> {
    persistence: Arc<P>,
    notification: Arc<N>,
}

impl<P, N> Clone for SubmissionOrchestrator<P, N> {
    fn clone(&self) -> Self {
        Self {
            persistence: Arc::clone(&self.persistence),
            notification: Arc::clone(&self.notification),
        }
    }
}

impl<P, N> SubmissionOrchestrator<P, N>
where
    P: PersistenceChannel + 'static,
    N: NotificationChannel + 'static,
{
    pub fn new(persistence: Arc<P>, notification: Arc<N>) -> Self {
        Self {
            persistence,
            notification,
        }
    }

    /// Runs the pre-check, then both channels concurrently. Both must finish
    /// and both must succeed; only then is the form reset.
    pub async fn submit(
        &self,
        form: &mut FormState,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let receipt = self.dispatch(&form.snapshot()).await?;
        form.reset();
        Ok(receipt)
    }

    /// Pre-check and fan-out for one snapshot. Leaves resetting the form to
    /// the caller.
    pub async fn dispatch(
        &self,
        record: &SubmissionRecord,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        if let Err(err) = precheck(record) {
            info!(field = ?err.field, "submission blocked by pre-check");
            return Err(err.into());
        }

        let row = EvaluationRow::from_record(record);
        info!(
            photos = row.photos.len(),
            attachments = record.document_files.len(),
            "dispatching submission"
        );

        let (persisted, notified) = tokio::join!(
            contain(Channel::Persistence, self.persistence.persist(&row)),
            contain(Channel::Notification, self.notification.notify(record)),
        );

        let failures: Vec<ChannelFailure> = [
            (Channel::Persistence, persisted),
            (Channel::Notification, notified),
        ]
        .into_iter()
        .filter_map(|(channel, outcome)| outcome.err().map(|error| ChannelFailure { channel, error }))
        .collect();

        if !failures.is_empty() {
            for failure in &failures {
                warn!(channel = %failure.channel, error = %failure.error, "submission channel failed");
            }
            return Err(SubmissionError::Channels(failures));
        }

        let receipt = SubmissionReceipt {
            submitted_at: Utc::now(),
            photo_count: row.photos.len(),
            document_count: record.document_files.len(),
            message: SUCCESS_MESSAGE,
        };
        info!(photos = receipt.photo_count, "submission accepted by both channels");
        Ok(receipt)
    }
}

/// Reports a panicking channel as [`ChannelError::Unexpected`].
async fn contain<F>(channel: Channel, operation: F) -> Result<(), ChannelError>
where
    F: Future<Output = Result<(), ChannelError>>,
{
    match AssertUnwindSafe(operation).catch_unwind().await {
        Ok(outcome) => outcome,
        Err(_) => {
            error!(%channel, "submission channel panicked");
            Err(ChannelError::Unexpected(format!("{channel} channel panicked")))
        }
    }
}
