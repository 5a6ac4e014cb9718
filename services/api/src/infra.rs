use appraisal_intake::workflows::intake::address::{
    AddressLookup, LookupAddress, LookupError, LookupOutcome,
};
use appraisal_intake::workflows::intake::domain::{StateCode, SubmissionRecord};
use appraisal_intake::workflows::intake::submission::{
    ChannelError, EvaluationRow, NotificationChannel, PersistenceChannel,
};
use async_trait::async_trait;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Persistence stand-in keeping rows in memory.
#[derive(Default, Clone)]
pub(crate) struct InMemoryEvaluationStore {
    rows: Arc<Mutex<Vec<EvaluationRow>>>,
}

#[async_trait]
impl PersistenceChannel for InMemoryEvaluationStore {
    async fn persist(&self, row: &EvaluationRow) -> Result<(), ChannelError> {
        let mut guard = self.rows.lock().expect("store mutex poisoned");
        guard.push(row.clone());
        Ok(())
    }
}

impl InMemoryEvaluationStore {
    pub(crate) fn rows(&self) -> Vec<EvaluationRow> {
        self.rows.lock().expect("store mutex poisoned").clone()
    }
}

/// Webhook stand-in; answers with `fail_status` when set.
#[derive(Default, Clone)]
pub(crate) struct InMemoryWebhook {
    deliveries: Arc<Mutex<Vec<SubmissionRecord>>>,
    fail_status: Option<u16>,
}

impl InMemoryWebhook {
    pub(crate) fn failing(status: u16) -> Self {
        Self {
            fail_status: Some(status),
            ..Self::default()
        }
    }

    pub(crate) fn deliveries(&self) -> Vec<SubmissionRecord> {
        self.deliveries.lock().expect("webhook mutex poisoned").clone()
    }
}

#[async_trait]
impl NotificationChannel for InMemoryWebhook {
    async fn notify(&self, record: &SubmissionRecord) -> Result<(), ChannelError> {
        if let Some(status) = self.fail_status {
            return Err(ChannelError::Status { status });
        }
        let mut guard = self.deliveries.lock().expect("webhook mutex poisoned");
        guard.push(record.clone());
        Ok(())
    }
}

/// Fixed postal-code table used by the demo.
#[derive(Clone)]
pub(crate) struct StaticAddressLookup {
    entries: Arc<HashMap<String, LookupAddress>>,
}

impl StaticAddressLookup {
    pub(crate) fn sample() -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            "01310100".to_string(),
            LookupAddress {
                street: "Avenida Paulista".to_string(),
                neighborhood: "Bela Vista".to_string(),
                city: "São Paulo".to_string(),
                state: Some(StateCode::Sp),
            },
        );
        entries.insert(
            "30160011".to_string(),
            LookupAddress {
                street: "Rua da Bahia".to_string(),
                neighborhood: "Centro".to_string(),
                city: "Belo Horizonte".to_string(),
                state: Some(StateCode::Mg),
            },
        );
        Self {
            entries: Arc::new(entries),
        }
    }
}

#[async_trait]
impl AddressLookup for StaticAddressLookup {
    async fn lookup(&self, postal_code: &str) -> Result<LookupOutcome, LookupError> {
        Ok(match self.entries.get(postal_code) {
            Some(address) => LookupOutcome::Found(address.clone()),
            None => LookupOutcome::NotFound,
        })
    }
}
