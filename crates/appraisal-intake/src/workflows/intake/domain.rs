use std::collections::BTreeSet;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire marker for a field the requester deliberately flagged as not applicable.
pub const NOT_APPLICABLE: &str = "N/A";

/// Tri-state value for optional form fields.
///
/// `Unset` means the requester has not filled the field yet, `NotApplicable`
/// means they ticked "Não se aplica". Serialized as `null`, `"N/A"` or the
/// plain value respectively.
#[derive(Debug, Clone, PartialEq)]
pub enum Applicable<T> {
    Unset,
    Value(T),
    NotApplicable,
}

impl<T> Default for Applicable<T> {
    fn default() -> Self {
        Self::Unset
    }
}

impl<T> Applicable<T> {
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NotApplicable)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }
}

impl<T: Serialize> Serialize for Applicable<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unset => serializer.serialize_none(),
            Self::Value(value) => value.serialize(serializer),
            Self::NotApplicable => serializer.serialize_str(NOT_APPLICABLE),
        }
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Applicable<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<serde_json::Value>::deserialize(deserializer)? {
            None | Some(serde_json::Value::Null) => Ok(Self::Unset),
            Some(serde_json::Value::String(marker)) if marker == NOT_APPLICABLE => {
                Ok(Self::NotApplicable)
            }
            Some(raw) => T::deserialize(raw).map(Self::Value).map_err(D::Error::custom),
        }
    }
}

/// (De)serializes `Option<T>` as an empty string when absent, matching the
/// select inputs of the form where "nothing chosen" is `""`.
pub(crate) mod blank_as_none {
    use serde::de::value::StringDeserializer;
    use serde::de::IntoDeserializer;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub(crate) fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }

    pub(crate) fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(value) if value.trim().is_empty() => Ok(None),
            Some(value) => {
                let inner: StringDeserializer<D::Error> = value.into_deserializer();
                T::deserialize(inner).map(Some)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RequesterRole {
    #[default]
    #[serde(rename = "proprietario")]
    Owner,
    #[serde(rename = "corretor_cnai")]
    LicensedBroker,
    #[serde(rename = "corretor_sem_cnai")]
    UnlicensedBroker,
    #[serde(rename = "advogado")]
    Lawyer,
}

impl RequesterRole {
    pub const ALL: [RequesterRole; 4] = [
        Self::Owner,
        Self::LicensedBroker,
        Self::UnlicensedBroker,
        Self::Lawyer,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Owner => "Proprietário",
            Self::LicensedBroker => "Corretor (com CNAI)",
            Self::UnlicensedBroker => "Corretor (sem CNAI)",
            Self::Lawyer => "Advogado",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PropertyType {
    #[default]
    #[serde(rename = "urbano")]
    Urban,
    #[serde(rename = "rural")]
    Rural,
    #[serde(rename = "comercial")]
    Commercial,
    #[serde(rename = "terreno")]
    Lot,
    #[serde(rename = "misto")]
    Mixed,
}

impl PropertyType {
    pub const ALL: [PropertyType; 5] = [
        Self::Urban,
        Self::Rural,
        Self::Commercial,
        Self::Lot,
        Self::Mixed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Urban => "Urbano",
            Self::Rural => "Rural",
            Self::Commercial => "Comercial",
            Self::Lot => "Terreno",
            Self::Mixed => "Misto",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Objective {
    #[default]
    #[serde(rename = "venda")]
    Sale,
    #[serde(rename = "partilha")]
    EstateDivision,
    #[serde(rename = "judicial")]
    JudicialProceeding,
    #[serde(rename = "outro")]
    Other,
}

impl Objective {
    pub const ALL: [Objective; 4] = [
        Self::Sale,
        Self::EstateDivision,
        Self::JudicialProceeding,
        Self::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Sale => "Venda",
            Self::EstateDivision => "Partilha de Bens",
            Self::JudicialProceeding => "Processo Judicial",
            Self::Other => "Outro",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Occupancy {
    #[serde(rename = "ocupado")]
    Occupied,
    #[default]
    #[serde(rename = "desocupado")]
    Vacant,
}

impl Occupancy {
    pub const ALL: [Occupancy; 2] = [Self::Occupied, Self::Vacant];

    pub fn label(self) -> &'static str {
        match self {
            Self::Occupied => "Ocupado",
            Self::Vacant => "Desocupado",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocumentStatus {
    #[serde(rename = "regular")]
    Regular,
    #[serde(rename = "com_pendencias")]
    PendingIssues,
    #[serde(rename = "irregular")]
    Irregular,
    #[serde(rename = "em_inventario")]
    InProbate,
}

impl DocumentStatus {
    pub const ALL: [DocumentStatus; 4] = [
        Self::Regular,
        Self::PendingIssues,
        Self::Irregular,
        Self::InProbate,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Regular => "Regular",
            Self::PendingIssues => "Com pendências",
            Self::Irregular => "Irregular",
            Self::InProbate => "Em inventário",
        }
    }
}

/// Documents the requester can declare as available. Serialized by their
/// display text, which is also what the hosted table stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DocumentKind {
    #[serde(rename = "Matrícula do Imóvel")]
    PropertyRegistration,
    #[serde(rename = "Carnê de IPTU")]
    PropertyTaxBook,
    #[serde(rename = "Certidão Negativa de Débitos")]
    DebtClearanceCertificate,
    #[serde(rename = "Habite-se")]
    OccupancyPermit,
    #[serde(rename = "Planta do Imóvel")]
    FloorPlan,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 5] = [
        Self::PropertyRegistration,
        Self::PropertyTaxBook,
        Self::DebtClearanceCertificate,
        Self::OccupancyPermit,
        Self::FloorPlan,
    ];

    /// Input id of the checkbox, used as a focus target.
    pub fn input_id(self) -> &'static str {
        match self {
            Self::PropertyRegistration => "matricula",
            Self::PropertyTaxBook => "iptu",
            Self::DebtClearanceCertificate => "cnd",
            Self::OccupancyPermit => "habitese",
            Self::FloorPlan => "planta",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::PropertyRegistration => "Matrícula do Imóvel",
            Self::PropertyTaxBook => "Carnê de IPTU",
            Self::DebtClearanceCertificate => "Certidão Negativa de Débitos",
            Self::OccupancyPermit => "Habite-se",
            Self::FloorPlan => "Planta do Imóvel",
        }
    }
}

/// Brazilian federative units accepted in the address `state` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StateCode {
    Ac,
    Al,
    Ap,
    Am,
    Ba,
    Ce,
    Df,
    Es,
    Go,
    Ma,
    Mt,
    Ms,
    Mg,
    Pa,
    Pb,
    Pr,
    Pe,
    Pi,
    Rj,
    Rn,
    Rs,
    Ro,
    Rr,
    Sc,
    Sp,
    Se,
    To,
}

impl StateCode {
    pub const ALL: [StateCode; 27] = [
        Self::Ac,
        Self::Al,
        Self::Ap,
        Self::Am,
        Self::Ba,
        Self::Ce,
        Self::Df,
        Self::Es,
        Self::Go,
        Self::Ma,
        Self::Mt,
        Self::Ms,
        Self::Mg,
        Self::Pa,
        Self::Pb,
        Self::Pr,
        Self::Pe,
        Self::Pi,
        Self::Rj,
        Self::Rn,
        Self::Rs,
        Self::Ro,
        Self::Rr,
        Self::Sc,
        Self::Sp,
        Self::Se,
        Self::To,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Self::Ac => "AC",
            Self::Al => "AL",
            Self::Ap => "AP",
            Self::Am => "AM",
            Self::Ba => "BA",
            Self::Ce => "CE",
            Self::Df => "DF",
            Self::Es => "ES",
            Self::Go => "GO",
            Self::Ma => "MA",
            Self::Mt => "MT",
            Self::Ms => "MS",
            Self::Mg => "MG",
            Self::Pa => "PA",
            Self::Pb => "PB",
            Self::Pr => "PR",
            Self::Pe => "PE",
            Self::Pi => "PI",
            Self::Rj => "RJ",
            Self::Rn => "RN",
            Self::Rs => "RS",
            Self::Ro => "RO",
            Self::Rr => "RR",
            Self::Sc => "SC",
            Self::Sp => "SP",
            Self::Se => "SE",
            Self::To => "TO",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Ac => "Acre",
            Self::Al => "Alagoas",
            Self::Ap => "Amapá",
            Self::Am => "Amazonas",
            Self::Ba => "Bahia",
            Self::Ce => "Ceará",
            Self::Df => "Distrito Federal",
            Self::Es => "Espírito Santo",
            Self::Go => "Goiás",
            Self::Ma => "Maranhão",
            Self::Mt => "Mato Grosso",
            Self::Ms => "Mato Grosso do Sul",
            Self::Mg => "Minas Gerais",
            Self::Pa => "Pará",
            Self::Pb => "Paraíba",
            Self::Pr => "Paraná",
            Self::Pe => "Pernambuco",
            Self::Pi => "Piauí",
            Self::Rj => "Rio de Janeiro",
            Self::Rn => "Rio Grande do Norte",
            Self::Rs => "Rio Grande do Sul",
            Self::Ro => "Rondônia",
            Self::Rr => "Roraima",
            Self::Sc => "Santa Catarina",
            Self::Sp => "São Paulo",
            Self::Se => "Sergipe",
            Self::To => "Tocantins",
        }
    }

    pub fn from_code(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        Self::ALL
            .into_iter()
            .find(|state| state.code().eq_ignore_ascii_case(trimmed))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Applicant {
    #[serde(rename = "client_name", default)]
    pub full_name: String,
    #[serde(rename = "whatsapp", default)]
    pub phone: String,
    #[serde(rename = "requester_role", default)]
    pub role: RequesterRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub city: String,
    #[serde(default, with = "blank_as_none")]
    pub state: Option<StateCode>,
    #[serde(rename = "zip", default)]
    pub postal_code: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertyDetails {
    #[serde(rename = "property_type", default)]
    pub kind: PropertyType,
    #[serde(rename = "land_area_m2", default)]
    pub land_area: Applicable<f64>,
    #[serde(rename = "built_area_m2", default)]
    pub built_area: Applicable<f64>,
    #[serde(rename = "construction_age_years", default)]
    pub construction_age: Applicable<u32>,
    #[serde(default)]
    pub condition_description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Documentation {
    #[serde(rename = "documents", default)]
    pub available: BTreeSet<DocumentKind>,
    #[serde(rename = "document_status", default, with = "blank_as_none")]
    pub status: Option<DocumentStatus>,
    #[serde(default)]
    pub objective: Objective,
}

/// The single record collected by one intake session.
///
/// Groups are flattened on the wire so the JSON matches the shape the
/// notification hook has always received.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubmissionRecord {
    #[serde(flatten)]
    pub applicant: Applicant,
    #[serde(default)]
    pub address: Address,
    #[serde(flatten)]
    pub property: PropertyDetails,
    #[serde(flatten)]
    pub documentation: Documentation,
    #[serde(default)]
    pub occupancy: Occupancy,
    #[serde(rename = "condominium", default)]
    pub condominium: Applicable<String>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(rename = "document_files", default)]
    pub document_files: Vec<String>,
    #[serde(default)]
    pub additional_details: String,
}

impl SubmissionRecord {
    /// Photos that carry an actual payload.
    pub fn filled_photos(&self) -> impl Iterator<Item = &String> {
        self.photos.iter().filter(|photo| !photo.trim().is_empty())
    }
}
