//! Validation and dual-channel dispatch of a completed intake form.
//!
//! A submission is accepted only when both the persistence store and the
//! notification hook succeed; on any failure the form keeps its values so
//! the requester can try again.

pub mod channels;
pub mod orchestrator;
pub mod persistence;
pub mod validation;
pub mod webhook;

#[cfg(test)]
mod tests;

pub use channels::{Channel, ChannelError, ChannelFailure, NotificationChannel, PersistenceChannel};
pub use orchestrator::{SubmissionError, SubmissionOrchestrator, SubmissionReceipt, SUCCESS_MESSAGE};
pub use persistence::{EvaluationRow, SupabaseStore};
pub use validation::{precheck, RequiredField, ValidationError};
pub use webhook::WebhookNotifier;
