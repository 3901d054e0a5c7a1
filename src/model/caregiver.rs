use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;

use super::shift::Shift;

/// Review state of an uploaded credential. Only `pending` documents can be
/// reviewed; every other state is terminal on the client.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Returned,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Approved => "approved",
            DocumentStatus::Rejected => "rejected",
            DocumentStatus::Returned => "returned",
        }
    }

    pub fn can_transition_to(&self, next: DocumentStatus) -> bool {
        *self == DocumentStatus::Pending && next != DocumentStatus::Pending
    }

    /// Outcome of the approval checkbox.
    pub fn from_decision(approved: bool) -> Self {
        if approved {
            DocumentStatus::Approved
        } else {
            DocumentStatus::Rejected
        }
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentTypeRef {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// A credential file a caregiver uploaded for an agency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaregiverDocument {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub agency_id: String,
    #[serde(rename = "documentTypeId")]
    pub document_type: DocumentTypeRef,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default, alias = "comment", skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Caregiver {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub nurse_type: String,
    #[serde(default)]
    pub applied_agencies: Vec<String>,
    #[serde(default)]
    pub approved_status: bool,
    #[serde(default)]
    pub uploaded_documents: Vec<CaregiverDocument>,
    #[serde(default)]
    pub date_joined: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CaregiverProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

/// Flattened document row of the caregiver details endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DetailDocument {
    pub document_type_id: String,
    #[serde(default)]
    pub document_name: String,
    #[serde(default)]
    pub status: DocumentStatus,
    #[serde(default)]
    pub file_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CaregiverDetails {
    #[serde(default)]
    pub profile: CaregiverProfile,
    #[serde(default)]
    pub documents: Vec<DetailDocument>,
    #[serde(default, deserialize_with = "shifts_with_facility_info")]
    pub assigned_shifts: Vec<Shift>,
    #[serde(default, deserialize_with = "shifts_with_facility_info")]
    pub canceled_shifts: Vec<Shift>,
}

/// The details endpoint ships the populated facility under `facilityInfo`
/// while `facilityId` stays a bare id. Promote the populated one.
fn shifts_with_facility_info<'de, D>(deserializer: D) -> Result<Vec<Shift>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Value> = Vec::deserialize(deserializer)?;
    raw.into_iter()
        .map(|mut value| {
            if let Value::Object(map) = &mut value {
                if let Some(info) = map.remove("facilityInfo") {
                    if !info.is_null() {
                        map.insert("facilityId".to_string(), info);
                    }
                }
            }
            serde_json::from_value(value).map_err(serde::de::Error::custom)
        })
        .collect()
}

/// Body of `POST /users/notify/:id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotifyRequest {
    pub message: String,
}

/// Body of `PATCH /caregiverdocuments/status/:caregiverId/:documentTypeId`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct VerifyDocumentRequest {
    pub status: DocumentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

impl VerifyDocumentRequest {
    /// Blank comments are dropped rather than sent as empty strings.
    pub fn new(status: DocumentStatus, comment: Option<&str>) -> Self {
        let comments = comment
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        Self { status, comments }
    }
}
