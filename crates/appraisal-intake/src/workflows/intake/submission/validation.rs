use serde::Serialize;

use crate::workflows::intake::domain::{Applicable, DocumentKind, SubmissionRecord};

/// Fields that must be filled before a submission is dispatched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredField {
    Documents,
    Photos,
    ClientName,
    Phone,
    PostalCode,
    Street,
    Number,
    Neighborhood,
    City,
    State,
    ConstructionAge,
    LandArea,
    BuiltArea,
    Condominium,
    ConditionDescription,
    DocumentStatus,
}

impl RequiredField {
    /// Input id that should receive focus.
    pub fn focus_target(self) -> &'static str {
        match self {
            Self::Documents => DocumentKind::PropertyRegistration.input_id(),
            Self::Photos => "photo-dropzone-photos",
            Self::ClientName => "client_name",
            Self::Phone => "whatsapp",
            Self::PostalCode => "zip",
            Self::Street => "street",
            Self::Number => "number",
            Self::Neighborhood => "neighborhood",
            Self::City => "city",
            Self::State => "state",
            Self::ConstructionAge => "construction_age_years",
            Self::LandArea => "land_area_m2",
            Self::BuiltArea => "built_area_m2",
            Self::Condominium => "condominium",
            Self::ConditionDescription => "condition_description",
            Self::DocumentStatus => "document_status",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Documents => "Documentos Disponíveis",
            Self::Photos => "Fotos do Imóvel",
            Self::ClientName => "Nome Completo do Solicitante",
            Self::Phone => "Whatsapp",
            Self::PostalCode => "CEP",
            Self::Street => "Logradouro (Rua, Av.)",
            Self::Number => "Número",
            Self::Neighborhood => "Bairro",
            Self::City => "Cidade",
            Self::State => "UF",
            Self::ConstructionAge => "Idade da Construção (anos)",
            Self::LandArea => "Área do Terreno (m²)",
            Self::BuiltArea => "Área Construída (m²)",
            Self::Condominium => "Nome do Condomínio",
            Self::ConditionDescription => "Estado Geral do Imóvel",
            Self::DocumentStatus => "Situação dos Documentos",
        }
    }

    fn message(self) -> String {
        match self {
            Self::Documents => format!(
                "O campo \"{}\" é obrigatório. Por favor, selecione ao menos uma opção.",
                self.label()
            ),
            Self::Photos => format!(
                "O campo \"{}\" é obrigatório. Por favor, adicione ao menos uma foto.",
                self.label()
            ),
            Self::ConstructionAge | Self::LandArea | Self::BuiltArea | Self::Condominium => {
                format!(
                    "Informe o campo \"{}\" ou marque \"Não se aplica\".",
                    self.label()
                )
            }
            _ => format!("O campo \"{}\" é obrigatório.", self.label()),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("required field missing: {field:?}")]
pub struct ValidationError {
    pub field: RequiredField,
    pub message: String,
}

impl From<RequiredField> for ValidationError {
    fn from(field: RequiredField) -> Self {
        Self {
            field,
            message: field.message(),
        }
    }
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn missing<T>(value: &Applicable<T>) -> bool {
    value.is_unset()
}

/// Local pre-dispatch check. Documents and photos are checked first, then
/// the remaining required inputs in the order they appear on the form.
pub fn precheck(record: &SubmissionRecord) -> Result<(), ValidationError> {
    let condominium_missing = match &record.condominium {
        Applicable::Value(name) => blank(name),
        Applicable::NotApplicable => false,
        Applicable::Unset => true,
    };

    let checks = [
        (
            RequiredField::Documents,
            record.documentation.available.is_empty(),
        ),
        (
            RequiredField::Photos,
            record.filled_photos().next().is_none(),
        ),
        (
            RequiredField::ClientName,
            blank(&record.applicant.full_name),
        ),
        (RequiredField::Phone, blank(&record.applicant.phone)),
        (
            RequiredField::PostalCode,
            blank(&record.address.postal_code),
        ),
        (RequiredField::Street, blank(&record.address.street)),
        (RequiredField::Number, blank(&record.address.number)),
        (
            RequiredField::Neighborhood,
            blank(&record.address.neighborhood),
        ),
        (RequiredField::City, blank(&record.address.city)),
        (RequiredField::State, record.address.state.is_none()),
        (
            RequiredField::ConstructionAge,
            missing(&record.property.construction_age),
        ),
        (RequiredField::LandArea, missing(&record.property.land_area)),
        (
            RequiredField::BuiltArea,
            missing(&record.property.built_area),
        ),
        (RequiredField::Condominium, condominium_missing),
        (
            RequiredField::ConditionDescription,
            blank(&record.property.condition_description),
        ),
        (
            RequiredField::DocumentStatus,
            record.documentation.status.is_none(),
        ),
    ];

    match checks.into_iter().find(|(_, failed)| *failed) {
        Some((field, _)) => Err(field.into()),
        None => Ok(()),
    }
}
