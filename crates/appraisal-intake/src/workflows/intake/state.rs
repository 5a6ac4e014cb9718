use std::sync::Arc;

use tokio::sync::watch;

use super::domain::SubmissionRecord;
use super::fields::{AddressUpdate, FieldUpdate};

/// Owner of the session's single [`SubmissionRecord`].
///
/// Every mutation publishes a fresh `Arc` snapshot instead of editing the
/// current one in place, so holders of an older snapshot keep a stable view
/// and observers can compare pointers to detect change.
#[derive(Debug)]
pub struct FormState {
    snapshots: watch::Sender<Arc<SubmissionRecord>>,
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::with_record(SubmissionRecord::default())
    }

    pub fn with_record(record: SubmissionRecord) -> Self {
        let (snapshots, _) = watch::channel(Arc::new(record));
        Self { snapshots }
    }

    pub fn snapshot(&self) -> Arc<SubmissionRecord> {
        self.snapshots.borrow().clone()
    }

    /// Receiver notified with every new snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Arc<SubmissionRecord>> {
        self.snapshots.subscribe()
    }

    pub fn update(&mut self, update: FieldUpdate) {
        match update {
            FieldUpdate::Address(address) => self.update_address(address),
            other => self.publish(|record| other.apply(record)),
        }
    }

    pub fn update_address(&mut self, update: AddressUpdate) {
        self.publish(|record| update.apply(&mut record.address));
    }

    pub fn reset(&mut self) {
        self.snapshots
            .send_replace(Arc::new(SubmissionRecord::default()));
    }

    pub fn append_photos(&mut self, encoded: Vec<String>) {
        self.publish(|record| record.photos.extend(encoded));
    }

    pub fn append_document_files(&mut self, encoded: Vec<String>) {
        self.publish(|record| record.document_files.extend(encoded));
    }

    /// Removes the photo at `index`; returns `false` when out of range.
    pub fn remove_photo(&mut self, index: usize) -> bool {
        if index >= self.snapshots.borrow().photos.len() {
            return false;
        }
        self.publish(|record| {
            record.photos.remove(index);
        });
        true
    }

    pub fn remove_document_file(&mut self, index: usize) -> bool {
        if index >= self.snapshots.borrow().document_files.len() {
            return false;
        }
        self.publish(|record| {
            record.document_files.remove(index);
        });
        true
    }

    fn publish(&mut self, mutate: impl FnOnce(&mut SubmissionRecord)) {
        let mut next = SubmissionRecord::clone(&self.snapshot());
        mutate(&mut next);
        self.snapshots.send_replace(Arc::new(next));
    }
}
