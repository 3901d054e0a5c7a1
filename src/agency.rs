//! Agency profile, logo and the dashboard overview.

use std::path::Path;
use tracing::{info, instrument};

use crate::api::{AgencyService, CaregiverService, FilePart};
use crate::error::{ActionError, ApiError, ValidationError};
use crate::forms;
use crate::model::{AgencyAnalytics, AgencyProfile, Caregiver};
use crate::session::Session;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl ProfileForm {
    pub fn from_profile(profile: &AgencyProfile) -> Self {
        Self {
            name: profile.name.clone(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            address: profile.address.clone(),
        }
    }

    pub fn to_profile(&self) -> Result<AgencyProfile, ValidationError> {
        Ok(AgencyProfile {
            name: forms::required("name", &self.name)?.to_string(),
            email: forms::email("email", &self.email)?,
            phone: forms::phone("phone", &self.phone)?,
            address: forms::required("address", &self.address)?.to_string(),
            agency_logo: None,
        })
    }
}

pub async fn fetch_profile<A: AgencyService>(
    api: &A,
    session: &Session,
) -> Result<AgencyProfile, ApiError> {
    api.fetch_agency_profile(session, session.agency_id()?).await
}

#[instrument(skip_all)]
pub async fn update_profile<A: AgencyService>(
    api: &A,
    session: &Session,
    form: &ProfileForm,
) -> Result<AgencyProfile, ActionError> {
    let agency_id = session.agency_id()?;
    let profile = form.to_profile()?;
    let updated = api.update_profile(session, agency_id, &profile).await?;
    info!(%agency_id, "profile updated");
    Ok(updated)
}

/// Upload a new logo and return its URL. A missing file is rejected before
/// anything is read or sent.
#[instrument(skip(api, session))]
pub async fn update_logo<A: AgencyService>(
    api: &A,
    session: &Session,
    file: Option<&Path>,
) -> Result<String, ActionError> {
    let path = file.ok_or(ValidationError::MissingLogo)?;
    let agency_id = session.agency_id()?;
    let part = FilePart::from_path(path).await?;
    let res = api.update_logo(session, agency_id, part).await?;
    info!(%agency_id, logo = %res.agency_logo, "logo updated");
    Ok(res.agency_logo)
}

/// Overview cards plus the most recent applicants.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub analytics: AgencyAnalytics,
    pub recent_caregivers: Vec<Caregiver>,
}

pub const RECENT_CAREGIVERS: usize = 5;

/// Analytics and the applicant list are independent; fetch them together.
pub async fn load_overview<A>(api: &A, session: &Session) -> Result<Overview, ApiError>
where
    A: AgencyService + CaregiverService,
{
    let agency_id = session.agency_id()?;
    let (analytics, mut caregivers) = futures::try_join!(
        api.fetch_agency_analytics(session, agency_id),
        api.fetch_caregivers(session, agency_id),
    )?;
    caregivers.sort_by(|a, b| b.date_joined.cmp(&a.date_joined));
    caregivers.truncate(RECENT_CAREGIVERS);
    Ok(Overview {
        analytics,
        recent_caregivers: caregivers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_form_validates_contacts() {
        let form = ProfileForm {
            name: "Omni Care".into(),
            email: "ops@omni.example".into(),
            phone: "+1 555 010 0100".into(),
            address: "2 Side St".into(),
        };
        let profile = form.to_profile().unwrap();
        assert_eq!(profile.email, "ops@omni.example");
        assert!(profile.agency_logo.is_none());

        let mut bad = form.clone();
        bad.email = "ops".into();
        assert!(matches!(bad.to_profile(), Err(ValidationError::Invalid { field: "email", .. })));
    }
}
