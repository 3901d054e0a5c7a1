use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Provider categories a document type can be required for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCategory {
    Nurse,
    Cna,
    HomeHealthcare,
}

impl ProviderCategory {
    pub const ALL: [ProviderCategory; 3] = [
        ProviderCategory::Nurse,
        ProviderCategory::Cna,
        ProviderCategory::HomeHealthcare,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderCategory::Nurse => "nurse",
            ProviderCategory::Cna => "cna",
            ProviderCategory::HomeHealthcare => "home_healthcare",
        }
    }
}

impl FromStr for ProviderCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "nurse" => Ok(ProviderCategory::Nurse),
            "cna" => Ok(ProviderCategory::Cna),
            "home_healthcare" => Ok(ProviderCategory::HomeHealthcare),
            other => Err(format!("unknown provider category '{}'", other)),
        }
    }
}

/// Agency-defined credential requirement.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentType {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub applies_to: Vec<ProviderCategory>,
    #[serde(default)]
    pub applies_to_all: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency_id: Option<String>,
}
