use std::collections::BTreeSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::workflows::intake::domain::{
    Address, Applicable, Applicant, DocumentKind, DocumentStatus, Documentation, Objective,
    Occupancy, PropertyDetails, PropertyType, RequesterRole, StateCode, SubmissionRecord,
};
use crate::workflows::intake::state::FormState;
use crate::workflows::intake::submission::{
    ChannelError, EvaluationRow, NotificationChannel, PersistenceChannel,
};

#[derive(Debug, Clone)]
pub(super) enum Behavior {
    Succeed,
    Fail(ChannelError),
    Panic,
}

pub(super) struct MemoryStore {
    behavior: Behavior,
    rows: Mutex<Vec<EvaluationRow>>,
}

impl MemoryStore {
    pub(super) fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            rows: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn rows(&self) -> Vec<EvaluationRow> {
        self.rows.lock().expect("rows mutex poisoned").clone()
    }
}

#[async_trait]
impl PersistenceChannel for MemoryStore {
    async fn persist(&self, row: &EvaluationRow) -> Result<(), ChannelError> {
        self.rows
            .lock()
            .expect("rows mutex poisoned")
            .push(row.clone());
        match &self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail(err) => Err(err.clone()),
            Behavior::Panic => panic!("store exploded"),
        }
    }
}

pub(super) struct MemoryHook {
    behavior: Behavior,
    payloads: Mutex<Vec<serde_json::Value>>,
}

impl MemoryHook {
    pub(super) fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            payloads: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn payloads(&self) -> Vec<serde_json::Value> {
        self.payloads.lock().expect("payload mutex poisoned").clone()
    }
}

#[async_trait]
impl NotificationChannel for MemoryHook {
    async fn notify(&self, record: &SubmissionRecord) -> Result<(), ChannelError> {
        let payload = serde_json::to_value(record).expect("record serializes");
        self.payloads
            .lock()
            .expect("payload mutex poisoned")
            .push(payload);
        match &self.behavior {
            Behavior::Succeed => Ok(()),
            Behavior::Fail(err) => Err(err.clone()),
            Behavior::Panic => panic!("hook exploded"),
        }
    }
}

pub(super) fn complete_record() -> SubmissionRecord {
    SubmissionRecord {
        applicant: Applicant {
            full_name: "João Pereira".to_string(),
            phone: "(31) 99123-4567".to_string(),
            role: RequesterRole::Owner,
        },
        address: Address {
            street: "Rua da Bahia".to_string(),
            number: "1148".to_string(),
            neighborhood: "Centro".to_string(),
            city: "Belo Horizonte".to_string(),
            state: Some(StateCode::Mg),
            postal_code: "30160-011".to_string(),
        },
        property: PropertyDetails {
            kind: PropertyType::Urban,
            land_area: Applicable::Value(360.0),
            built_area: Applicable::Value(210.5),
            construction_age: Applicable::Value(15),
            condition_description: "Pintura recente, telhado revisado.".to_string(),
        },
        documentation: Documentation {
            available: BTreeSet::from([
                DocumentKind::PropertyRegistration,
                DocumentKind::PropertyTaxBook,
            ]),
            status: Some(DocumentStatus::Regular),
            objective: Objective::Sale,
        },
        occupancy: Occupancy::Occupied,
        condominium: Applicable::NotApplicable,
        photos: vec![
            "data:image/jpeg;base64,/9j/4AAQ".to_string(),
            "data:image/png;base64,iVBORw0K".to_string(),
        ],
        document_files: vec!["data:application/pdf;base64,JVBERi0x".to_string()],
        additional_details: "Próximo ao metrô.".to_string(),
    }
}

pub(super) fn filled_form() -> FormState {
    FormState::with_record(complete_record())
}
