//! Postal-code driven address autofill.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::StateCode;
use super::fields::AddressUpdate;
use super::normalize::{format_postal_code, postal_code_digits, POSTAL_CODE_DIGITS};
use super::state::FormState;

pub const POSTAL_CODE_NOT_FOUND: &str =
    "CEP não encontrado. Por favor, verifique o número digitado.";
pub const POSTAL_CODE_UNAVAILABLE: &str =
    "Não foi possível buscar o endereço para este CEP. Por favor, preencha manualmente.";

/// Address fields a postal-code lookup can fill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupAddress {
    pub street: String,
    pub neighborhood: String,
    pub city: String,
    pub state: Option<StateCode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found(LookupAddress),
    NotFound,
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("address lookup transport failed: {0}")]
    Transport(String),
    #[error("address lookup returned status {0}")]
    Status(u16),
    #[error("address lookup response unreadable: {0}")]
    Parse(String),
}

/// Capability resolving an 8-digit postal code into an address.
#[async_trait]
pub trait AddressLookup: Send + Sync {
    async fn lookup(&self, postal_code: &str) -> Result<LookupOutcome, LookupError>;
}

/// ViaCEP (`{base}/{cep}/json/`) lookup client.
#[derive(Debug, Clone)]
pub struct ViaCepClient {
    http: reqwest::Client,
    base_url: String,
}

impl ViaCepClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| LookupError::Transport(err.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ViaCepResponse {
    #[serde(default)]
    logradouro: Option<String>,
    #[serde(default)]
    bairro: Option<String>,
    #[serde(default)]
    localidade: Option<String>,
    #[serde(default)]
    uf: Option<String>,
    #[serde(default)]
    erro: Option<serde_json::Value>,
}

impl ViaCepResponse {
    fn into_outcome(self) -> LookupOutcome {
        let not_found = match &self.erro {
            Some(serde_json::Value::Bool(flag)) => *flag,
            Some(serde_json::Value::String(flag)) => flag.eq_ignore_ascii_case("true"),
            _ => false,
        };
        if not_found {
            return LookupOutcome::NotFound;
        }

        LookupOutcome::Found(LookupAddress {
            street: self.logradouro.unwrap_or_default(),
            neighborhood: self.bairro.unwrap_or_default(),
            city: self.localidade.unwrap_or_default(),
            state: self.uf.as_deref().and_then(StateCode::from_code),
        })
    }
}

#[async_trait]
impl AddressLookup for ViaCepClient {
    async fn lookup(&self, postal_code: &str) -> Result<LookupOutcome, LookupError> {
        let url = format!("{}/{}/json/", self.base_url, postal_code);
        debug!(%url, "querying address lookup");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|err| LookupError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: ViaCepResponse = response
            .json()
            .await
            .map_err(|err| LookupError::Parse(err.to_string()))?;
        Ok(body.into_outcome())
    }
}

/// Result of feeding raw postal-code input into the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostalCodeOutcome {
    /// Fewer than eight digits; no lookup attempted.
    Incomplete,
    Filled(LookupAddress),
    NotFound { warning: String },
    Unavailable { warning: String },
}

impl PostalCodeOutcome {
    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::NotFound { warning } | Self::Unavailable { warning } => Some(warning),
            _ => None,
        }
    }

    /// Input that should receive focus next.
    pub fn focus(&self) -> Option<&'static str> {
        match self {
            Self::Filled(_) => Some("number"),
            _ => None,
        }
    }
}

/// Normalizes postal-code input and fills the address from a lookup once
/// the code is complete.
#[derive(Debug)]
pub struct AddressAutofill<L> {
    lookup: Arc<L>,
}

impl<L> Clone for AddressAutofill<L> {
    fn clone(&self) -> Self {
        Self {
            lookup: Arc::clone(&self.lookup),
        }
    }
}

impl<L: AddressLookup> AddressAutofill<L> {
    pub fn new(lookup: Arc<L>) -> Self {
        Self { lookup }
    }

    pub async fn apply(&self, form: &mut FormState, raw: &str) -> PostalCodeOutcome {
        form.update_address(AddressUpdate::PostalCode(format_postal_code(raw)));

        let digits = postal_code_digits(raw);
        if digits.len() != POSTAL_CODE_DIGITS {
            return PostalCodeOutcome::Incomplete;
        }

        match self.lookup.lookup(&digits).await {
            Ok(LookupOutcome::Found(address)) => {
                form.update_address(AddressUpdate::Street(address.street.clone()));
                form.update_address(AddressUpdate::Neighborhood(address.neighborhood.clone()));
                form.update_address(AddressUpdate::City(address.city.clone()));
                form.update_address(AddressUpdate::State(address.state));
                debug!(postal_code = %digits, city = %address.city, "address filled from lookup");
                PostalCodeOutcome::Filled(address)
            }
            Ok(LookupOutcome::NotFound) => {
                form.update_address(AddressUpdate::Street(String::new()));
                form.update_address(AddressUpdate::Neighborhood(String::new()));
                form.update_address(AddressUpdate::City(String::new()));
                form.update_address(AddressUpdate::State(None));
                warn!(postal_code = %digits, "postal code not found");
                PostalCodeOutcome::NotFound {
                    warning: POSTAL_CODE_NOT_FOUND.to_string(),
                }
            }
            Err(err) => {
                warn!(postal_code = %digits, error = %err, "address lookup unavailable");
                PostalCodeOutcome::Unavailable {
                    warning: POSTAL_CODE_UNAVAILABLE.to_string(),
                }
            }
        }
    }
}
