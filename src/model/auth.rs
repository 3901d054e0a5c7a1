use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(rename = "access_token")]
    pub access_token: String,
    pub agency_id: String,
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("agency_id", &self.agency_id)
            .finish_non_exhaustive()
    }
}

/// First registration step, kept as the `personalInfo` draft until the agency
/// step is submitted.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersonalInfo {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

impl fmt::Debug for PersonalInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersonalInfo")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AgencyInfo {
    pub agency_name: String,
    pub agency_email: String,
    pub agency_phone: String,
    pub agency_address: String,
}

/// Body of `POST /auth/register/agency-admin`: both steps merged.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RegisterRequest {
    #[serde(flatten)]
    pub personal: PersonalInfo,
    #[serde(flatten)]
    pub agency: AgencyInfo,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub agency_id: String,
}
