use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::channels::{ChannelError, PersistenceChannel};
use crate::workflows::intake::domain::{
    blank_as_none, Applicable, DocumentKind, DocumentStatus, Objective, Occupancy, PropertyType,
    RequesterRole, StateCode, SubmissionRecord,
};

/// Row layout of the `property_evaluations` table.
///
/// The address is flattened into `address_*` columns, attachments are left
/// out and blank photo entries are dropped. Numeric columns cannot carry the
/// not-applicable marker, so both unset and N/A are stored as `NULL`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRow {
    pub client_name: String,
    pub whatsapp: String,
    pub requester_role: RequesterRole,
    pub property_type: PropertyType,
    pub land_area_m2: Option<f64>,
    pub built_area_m2: Option<f64>,
    pub construction_age_years: Option<u32>,
    pub condition_description: String,
    pub documents: BTreeSet<DocumentKind>,
    #[serde(with = "blank_as_none")]
    pub document_status: Option<DocumentStatus>,
    pub objective: Objective,
    pub photos: Vec<String>,
    pub occupancy: Occupancy,
    pub condominium: Option<String>,
    pub additional_details: String,
    pub address_street: String,
    pub address_number: String,
    pub address_neighborhood: String,
    pub address_city: String,
    #[serde(with = "blank_as_none")]
    pub address_state: Option<StateCode>,
    pub address_zip: String,
}

impl EvaluationRow {
    pub fn from_record(record: &SubmissionRecord) -> Self {
        let condominium = match &record.condominium {
            Applicable::Value(name) if !name.trim().is_empty() => Some(name.clone()),
            _ => None,
        };

        Self {
            client_name: record.applicant.full_name.clone(),
            whatsapp: record.applicant.phone.clone(),
            requester_role: record.applicant.role,
            property_type: record.property.kind,
            land_area_m2: record.property.land_area.value().copied(),
            built_area_m2: record.property.built_area.value().copied(),
            construction_age_years: record.property.construction_age.value().copied(),
            condition_description: record.property.condition_description.clone(),
            documents: record.documentation.available.clone(),
            document_status: record.documentation.status,
            objective: record.documentation.objective,
            photos: record.filled_photos().cloned().collect(),
            occupancy: record.occupancy,
            condominium,
            additional_details: record.additional_details.clone(),
            address_street: record.address.street.clone(),
            address_number: record.address.number.clone(),
            address_neighborhood: record.address.neighborhood.clone(),
            address_city: record.address.city.clone(),
            address_state: record.address.state,
            address_zip: record.address.postal_code.clone(),
        }
    }
}

/// Inserts rows through the Supabase (PostgREST) REST interface.
#[derive(Debug, Clone)]
pub struct SupabaseStore {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
    message: Option<String>,
}

impl SupabaseStore {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        table: &str,
        timeout: Duration,
    ) -> Result<Self, ChannelError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| ChannelError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            endpoint: format!("{}/rest/v1/{}", base_url.trim_end_matches('/'), table),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl PersistenceChannel for SupabaseStore {
    async fn persist(&self, row: &EvaluationRow) -> Result<(), ChannelError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(&[row])
            .send()
            .await
            .map_err(|err| ChannelError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            debug!(status = status.as_u16(), "evaluation row stored");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<PostgrestError>(&body) {
            Ok(PostgrestError {
                message: Some(message),
            }) => Err(ChannelError::Rejected(message)),
            _ => Err(ChannelError::Status {
                status: status.as_u16(),
            }),
        }
    }
}
