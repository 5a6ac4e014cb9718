use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use super::address::{AddressAutofill, AddressLookup, PostalCodeOutcome};
use super::domain::SubmissionRecord;
use super::encoder::{attach_files, AttachmentTarget, EncodeError, FileInput};
use super::fields::{AddressUpdate, FieldError, FieldUpdate};
use super::normalize::format_phone;
use super::report::{AppraisalReport, ReportError, ReportGenerator};
use super::state::FormState;
use super::submission::{
    NotificationChannel, PersistenceChannel, SubmissionError, SubmissionOrchestrator,
    SubmissionReceipt,
};

/// Outcome of a single field edit.
#[derive(Debug, Clone, Serialize)]
pub struct FieldChange {
    pub field: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<&'static str>,
}

impl FieldChange {
    fn plain(field: &'static str) -> Self {
        Self {
            field,
            warning: None,
            focus: None,
        }
    }

    fn postal_code(outcome: &PostalCodeOutcome) -> Self {
        Self {
            field: "address.zip",
            warning: outcome.warning().map(str::to_string),
            focus: outcome.focus(),
        }
    }
}

/// One requester's intake form together with the collaborators that act on
/// it. Edits and attachment batches are serialized through the form lock.
pub struct IntakeSession<P, N, L> {
    form: Mutex<FormState>,
    orchestrator: SubmissionOrchestrator<P, N>,
    autofill: AddressAutofill<L>,
    reporter: Option<Arc<dyn ReportGenerator>>,
}

impl<P, N, L> IntakeSession<P, N, L>
where
    P: PersistenceChannel + 'static,
    N: NotificationChannel + 'static,
    L: AddressLookup + 'static,
{
    pub fn new(orchestrator: SubmissionOrchestrator<P, N>, autofill: AddressAutofill<L>) -> Self {
        Self {
            form: Mutex::new(FormState::new()),
            orchestrator,
            autofill,
            reporter: None,
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn ReportGenerator>) -> Self {
        self.reporter = Some(reporter);
        self
    }

    pub fn report_enabled(&self) -> bool {
        self.reporter.is_some()
    }

    pub async fn snapshot(&self) -> Arc<SubmissionRecord> {
        self.form.lock().await.snapshot()
    }

    pub async fn subscribe(&self) -> watch::Receiver<Arc<SubmissionRecord>> {
        self.form.lock().await.subscribe()
    }

    /// Applies an edit addressed by its wire path. Phone input is masked and
    /// postal-code input may fill the rest of the address.
    pub async fn apply_field(&self, path: &str, value: Value) -> Result<FieldChange, FieldError> {
        let update = FieldUpdate::from_path(path, value)?;
        let field = update.path();
        let mut form = self.form.lock().await;

        match update {
            FieldUpdate::Phone(raw) => {
                form.update(FieldUpdate::Phone(format_phone(&raw)));
            }
            FieldUpdate::Address(AddressUpdate::PostalCode(raw)) => {
                let outcome = self.autofill.apply(&mut form, &raw).await;
                return Ok(FieldChange::postal_code(&outcome));
            }
            other => form.update(other),
        }
        debug!(field, "form field updated");
        Ok(FieldChange::plain(field))
    }

    pub async fn attach(
        &self,
        target: AttachmentTarget,
        inputs: Vec<FileInput>,
    ) -> Result<usize, EncodeError> {
        let mut form = self.form.lock().await;
        attach_files(&mut form, target, inputs).await
    }

    /// Removes one attachment; `false` when `index` is out of range.
    pub async fn remove(&self, target: AttachmentTarget, index: usize) -> bool {
        let mut form = self.form.lock().await;
        match target {
            AttachmentTarget::Photos => form.remove_photo(index),
            AttachmentTarget::Documents => form.remove_document_file(index),
        }
    }

    pub async fn reset(&self) {
        self.form.lock().await.reset();
        info!("intake form reset");
    }

    /// Submits the current snapshot with the form lock released during
    /// dispatch. The form is reset afterwards only if nothing edited it in
    /// the meantime.
    pub async fn submit(&self) -> Result<SubmissionReceipt, SubmissionError> {
        let record = self.snapshot().await;
        let receipt = self.orchestrator.dispatch(&record).await?;

        let mut form = self.form.lock().await;
        if Arc::ptr_eq(&form.snapshot(), &record) {
            form.reset();
        } else {
            warn!("form edited during submission; keeping the newer edits");
        }
        Ok(receipt)
    }

    /// Drafts a report from the current snapshot. The form lock is released
    /// before the generator runs.
    pub async fn generate_report(&self) -> Result<AppraisalReport, ReportError> {
        let reporter = self.reporter.as_ref().ok_or(ReportError::NotConfigured)?;
        let record = self.snapshot().await;
        let report = reporter.generate(&record).await?;
        info!(sections = report.sections.len(), "appraisal report drafted");
        Ok(report)
    }
}
