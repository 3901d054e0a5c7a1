use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::facility::Facility;

/// Lifecycle of a shift: `open → active → completed`, with `open|active →
/// canceled` as a side exit. `completed` and `canceled` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ShiftStatus {
    Open,
    Active,
    Completed,
    Canceled,
}

impl ShiftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShiftStatus::Open => "open",
            ShiftStatus::Active => "active",
            ShiftStatus::Completed => "completed",
            ShiftStatus::Canceled => "canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ShiftStatus::Completed | ShiftStatus::Canceled)
    }

    /// Whether `self → next` is a lifecycle step. Staying put is not a step.
    pub fn can_transition_to(&self, next: ShiftStatus) -> bool {
        matches!(
            (self, next),
            (ShiftStatus::Open, ShiftStatus::Active)
                | (ShiftStatus::Active, ShiftStatus::Completed)
                | (ShiftStatus::Open, ShiftStatus::Canceled)
                | (ShiftStatus::Active, ShiftStatus::Canceled)
        )
    }
}

impl fmt::Display for ShiftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShiftStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(ShiftStatus::Open),
            "active" => Ok(ShiftStatus::Active),
            "completed" => Ok(ShiftStatus::Completed),
            "canceled" | "cancelled" => Ok(ShiftStatus::Canceled),
            other => Err(format!("unknown shift status '{}'", other)),
        }
    }
}

/// Recognized caregiver roles a shift can require.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NurseType {
    RN,
    CNA,
    LPN,
    HHA,
}

impl NurseType {
    pub const ALL: [NurseType; 4] = [NurseType::RN, NurseType::CNA, NurseType::LPN, NurseType::HHA];

    pub fn as_str(&self) -> &'static str {
        match self {
            NurseType::RN => "RN",
            NurseType::CNA => "CNA",
            NurseType::LPN => "LPN",
            NurseType::HHA => "HHA",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            NurseType::RN => "Registered Nurse",
            NurseType::CNA => "Certified Nursing Assistant",
            NurseType::LPN => "Licensed Practical Nurse",
            NurseType::HHA => "Home Healthcare Assistant",
        }
    }
}

impl fmt::Display for NurseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NurseType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "RN" => Ok(NurseType::RN),
            "CNA" => Ok(NurseType::CNA),
            "LPN" => Ok(NurseType::LPN),
            "HHA" => Ok(NurseType::HHA),
            other => Err(format!("unknown nurse type '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NursePayRate {
    pub nurse_type: NurseType,
    pub pay_rate: f64,
}

/// Facility reference on a shift: populated by the backend on most reads,
/// a bare id otherwise.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FacilityRef {
    Populated(Box<Facility>),
    Id(String),
}

impl FacilityRef {
    pub fn id(&self) -> Option<&str> {
        match self {
            FacilityRef::Populated(f) => f.id.as_deref(),
            FacilityRef::Id(id) => Some(id),
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            FacilityRef::Populated(f) => Some(&f.name),
            FacilityRef::Id(_) => None,
        }
    }

    pub fn facility(&self) -> Option<&Facility> {
        match self {
            FacilityRef::Populated(f) => Some(f),
            FacilityRef::Id(_) => None,
        }
    }
}

/// Caregiver entry in a shift's assigned/cancelled lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PersonRef {
    Populated {
        #[serde(rename = "_id")]
        id: String,
        #[serde(default)]
        name: String,
    },
    Id(String),
}

impl PersonRef {
    pub fn id(&self) -> &str {
        match self {
            PersonRef::Populated { id, .. } => id,
            PersonRef::Id(id) => id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PersonRef::Populated { name, id } if name.is_empty() => id,
            PersonRef::Populated { name, .. } => name,
            PersonRef::Id(id) => id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(rename = "facilityId", default)]
    pub facility: Option<FacilityRef>,
    pub date: DateTime<Utc>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ShiftStatus,
    #[serde(default)]
    pub base_price: f64,
    #[serde(default)]
    pub caregivers_needed: u32,
    #[serde(default)]
    pub assigned_caregivers: Vec<PersonRef>,
    #[serde(default)]
    pub cancelled_caregivers: Vec<PersonRef>,
    #[serde(default)]
    pub nurse_type: Vec<NurseType>,
    #[serde(default)]
    pub base_price_by_nurse_type: Vec<NursePayRate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Shift {
    pub fn facility_name(&self) -> &str {
        self.facility
            .as_ref()
            .and_then(FacilityRef::name)
            .unwrap_or("-")
    }
}

/// Body of `POST /shifts`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreateShiftRequest {
    pub title: String,
    pub facility_id: String,
    pub date: DateTime<Utc>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub base_price: f64,
    pub status: ShiftStatus,
    pub caregivers_needed: u32,
    pub nurse_type: Vec<NurseType>,
    pub base_price_by_nurse_type: Vec<NursePayRate>,
}

/// Body of `PATCH /shifts/:id`. Absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ShiftPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facility_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ShiftStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caregivers_needed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nurse_type: Option<Vec<NurseType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_price_by_nurse_type: Option<Vec<NursePayRate>>,
}

impl ShiftPatch {
    pub fn is_empty(&self) -> bool {
        *self == ShiftPatch::default()
    }
}
