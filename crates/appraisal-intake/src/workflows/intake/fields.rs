use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::domain::{
    Address, Applicable, DocumentKind, DocumentStatus, Objective, Occupancy, PropertyType,
    RequesterRole, StateCode, SubmissionRecord,
};

/// Replacement of one key inside the address group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressUpdate {
    Street(String),
    Number(String),
    Neighborhood(String),
    City(String),
    State(Option<StateCode>),
    PostalCode(String),
}

impl AddressUpdate {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Street(_) => "street",
            Self::Number(_) => "number",
            Self::Neighborhood(_) => "neighborhood",
            Self::City(_) => "city",
            Self::State(_) => "state",
            Self::PostalCode(_) => "zip",
        }
    }

    pub(crate) fn apply(self, address: &mut Address) {
        match self {
            Self::Street(value) => address.street = value,
            Self::Number(value) => address.number = value,
            Self::Neighborhood(value) => address.neighborhood = value,
            Self::City(value) => address.city = value,
            Self::State(value) => address.state = value,
            Self::PostalCode(value) => address.postal_code = value,
        }
    }

    fn from_key(key: &str, value: Value) -> Result<Self, FieldError> {
        let path = format!("address.{key}");
        let update = match key {
            "street" => Self::Street(decode(&path, value)?),
            "number" => Self::Number(decode(&path, value)?),
            "neighborhood" => Self::Neighborhood(decode(&path, value)?),
            "city" => Self::City(decode(&path, value)?),
            "state" => {
                let raw: String = decode(&path, value)?;
                if raw.trim().is_empty() {
                    Self::State(None)
                } else {
                    let state = StateCode::from_code(&raw).ok_or_else(|| {
                        FieldError::invalid(&path, format!("'{raw}' is not a state code"))
                    })?;
                    Self::State(Some(state))
                }
            }
            "zip" => Self::PostalCode(decode(&path, value)?),
            _ => return Err(FieldError::UnknownField(path)),
        };
        Ok(update)
    }
}

/// A single-field mutation of the submission record.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldUpdate {
    ClientName(String),
    Phone(String),
    RequesterRole(RequesterRole),
    Address(AddressUpdate),
    PropertyType(PropertyType),
    LandArea(Applicable<f64>),
    BuiltArea(Applicable<f64>),
    ConstructionAge(Applicable<u32>),
    ConditionDescription(String),
    Documents(BTreeSet<DocumentKind>),
    DocumentStatus(Option<DocumentStatus>),
    Objective(Objective),
    Occupancy(Occupancy),
    Condominium(Applicable<String>),
    Photos(Vec<String>),
    DocumentFiles(Vec<String>),
    AdditionalDetails(String),
}

impl FieldUpdate {
    /// Builds an update from a wire field path (`client_name`, `address.zip`, ...)
    /// and an untyped JSON value, rejecting anything that does not fit the record.
    pub fn from_path(path: &str, value: Value) -> Result<Self, FieldError> {
        if let Some(key) = path.strip_prefix("address.") {
            return AddressUpdate::from_key(key, value).map(Self::Address);
        }

        let update = match path {
            "client_name" => Self::ClientName(decode(path, value)?),
            "whatsapp" => Self::Phone(decode(path, value)?),
            "requester_role" => Self::RequesterRole(decode(path, value)?),
            "property_type" => Self::PropertyType(decode(path, value)?),
            "land_area_m2" => Self::LandArea(positive_area(path, value)?),
            "built_area_m2" => Self::BuiltArea(positive_area(path, value)?),
            "construction_age_years" => Self::ConstructionAge(decode(path, value)?),
            "condition_description" => Self::ConditionDescription(decode(path, value)?),
            "documents" => Self::Documents(decode(path, value)?),
            "document_status" => {
                let raw: String = decode(path, value)?;
                if raw.trim().is_empty() {
                    Self::DocumentStatus(None)
                } else {
                    Self::DocumentStatus(Some(decode(path, Value::String(raw))?))
                }
            }
            "objective" => Self::Objective(decode(path, value)?),
            "occupancy" => Self::Occupancy(decode(path, value)?),
            "condominium" => Self::Condominium(decode(path, value)?),
            "photos" => Self::Photos(decode(path, value)?),
            "document_files" => Self::DocumentFiles(decode(path, value)?),
            "additional_details" => Self::AdditionalDetails(decode(path, value)?),
            other => return Err(FieldError::UnknownField(other.to_string())),
        };
        Ok(update)
    }

    pub fn path(&self) -> &'static str {
        match self {
            Self::ClientName(_) => "client_name",
            Self::Phone(_) => "whatsapp",
            Self::RequesterRole(_) => "requester_role",
            Self::Address(update) => match update {
                AddressUpdate::Street(_) => "address.street",
                AddressUpdate::Number(_) => "address.number",
                AddressUpdate::Neighborhood(_) => "address.neighborhood",
                AddressUpdate::City(_) => "address.city",
                AddressUpdate::State(_) => "address.state",
                AddressUpdate::PostalCode(_) => "address.zip",
            },
            Self::PropertyType(_) => "property_type",
            Self::LandArea(_) => "land_area_m2",
            Self::BuiltArea(_) => "built_area_m2",
            Self::ConstructionAge(_) => "construction_age_years",
            Self::ConditionDescription(_) => "condition_description",
            Self::Documents(_) => "documents",
            Self::DocumentStatus(_) => "document_status",
            Self::Objective(_) => "objective",
            Self::Occupancy(_) => "occupancy",
            Self::Condominium(_) => "condominium",
            Self::Photos(_) => "photos",
            Self::DocumentFiles(_) => "document_files",
            Self::AdditionalDetails(_) => "additional_details",
        }
    }

    pub(crate) fn apply(self, record: &mut SubmissionRecord) {
        match self {
            Self::ClientName(value) => record.applicant.full_name = value,
            Self::Phone(value) => record.applicant.phone = value,
            Self::RequesterRole(value) => record.applicant.role = value,
            Self::Address(update) => update.apply(&mut record.address),
            Self::PropertyType(value) => record.property.kind = value,
            Self::LandArea(value) => record.property.land_area = value,
            Self::BuiltArea(value) => record.property.built_area = value,
            Self::ConstructionAge(value) => record.property.construction_age = value,
            Self::ConditionDescription(value) => record.property.condition_description = value,
            Self::Documents(value) => record.documentation.available = value,
            Self::DocumentStatus(value) => record.documentation.status = value,
            Self::Objective(value) => record.documentation.objective = value,
            Self::Occupancy(value) => record.occupancy = value,
            Self::Condominium(value) => record.condominium = value,
            Self::Photos(value) => record.photos = value,
            Self::DocumentFiles(value) => record.document_files = value,
            Self::AdditionalDetails(value) => record.additional_details = value,
        }
    }
}

/// Rejection of a field update at the input boundary.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("unknown form field '{0}'")]
    UnknownField(String),
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl FieldError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, FieldError> {
    serde_json::from_value(value).map_err(|err| FieldError::invalid(path, err.to_string()))
}

fn positive_area(path: &str, value: Value) -> Result<Applicable<f64>, FieldError> {
    let area: Applicable<f64> = decode(path, value)?;
    match area {
        Applicable::Value(amount) if !(amount.is_finite() && amount > 0.0) => {
            Err(FieldError::invalid(path, "area must be a positive number"))
        }
        other => Ok(other),
    }
}
