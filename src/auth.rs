//! Login, two-step registration and logout.

use tracing::{info, instrument};

use crate::api::AuthService;
use crate::error::{ActionError, ValidationError};
use crate::forms;
use crate::model::{AgencyInfo, LoginRequest, PersonalInfo, RegisterRequest};
use crate::route::Route;
use crate::session::{Session, SessionStore};

pub const MIN_PASSWORD_LEN: usize = 6;

#[instrument(skip(api, store, password))]
pub async fn login<A: AuthService>(
    api: &A,
    store: &SessionStore,
    email: &str,
    password: &str,
) -> Result<(Session, Route), ActionError> {
    let req = LoginRequest {
        email: forms::email("email", email)?,
        password: forms::secret("password", password)?,
    };
    let res = api.login(&req).await?;
    let session = store.begin(&res).await?;
    Ok((session, Route::Dashboard))
}

fn validate_personal(info: &PersonalInfo) -> Result<PersonalInfo, ValidationError> {
    let password = forms::secret("password", &info.password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::Invalid {
            field: "password",
            value: format!("at least {} characters", MIN_PASSWORD_LEN),
        });
    }
    Ok(PersonalInfo {
        name: forms::required("name", &info.name)?.to_string(),
        email: forms::email("email", &info.email)?,
        phone: forms::phone("phone", &info.phone)?,
        password,
    })
}

fn validate_agency(info: &AgencyInfo) -> Result<AgencyInfo, ValidationError> {
    Ok(AgencyInfo {
        agency_name: forms::required("agencyName", &info.agency_name)?.to_string(),
        agency_email: forms::email("agencyEmail", &info.agency_email)?,
        agency_phone: forms::phone("agencyPhone", &info.agency_phone)?,
        agency_address: forms::required("agencyAddress", &info.agency_address)?.to_string(),
    })
}

/// Step one: keep the admin's details as a draft for the agency step.
#[instrument(skip_all)]
pub async fn register_personal(
    store: &SessionStore,
    info: &PersonalInfo,
) -> Result<Route, ActionError> {
    let info = validate_personal(info)?;
    store.save_draft(&info).await?;
    info!(email = %info.email, "registration draft saved");
    Ok(Route::RegisterAgency)
}

/// Step two: merge the draft with the agency details and register.
#[instrument(skip_all)]
pub async fn register_agency<A: AuthService>(
    api: &A,
    store: &SessionStore,
    agency: &AgencyInfo,
) -> Result<Route, ActionError> {
    let personal = store
        .load_draft()
        .await?
        .ok_or(ValidationError::Required("personalInfo"))?;
    let req = RegisterRequest {
        personal,
        agency: validate_agency(agency)?,
    };
    let res = api.register_agency_admin(&req).await?;
    store.remember_agency(&res.agency_id).await?;
    store.clear_draft().await?;
    info!(agency_id = %res.agency_id, "agency registered");
    Ok(Route::Login)
}

pub async fn logout(store: &SessionStore) -> Result<Route, ActionError> {
    store.end().await?;
    Ok(Route::Login)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn personal_step_validation() {
        let good = PersonalInfo {
            name: " Jo Doe ".into(),
            email: "jo@example.com".into(),
            password: "hunter22".into(),
            phone: "+1234567890".into(),
        };
        assert_eq!(validate_personal(&good).unwrap().name, "Jo Doe");

        let mut short = good.clone();
        short.password = "abc".into();
        assert!(matches!(
            validate_personal(&short),
            Err(ValidationError::Invalid { field: "password", .. })
        ));

        let mut spaced = good.clone();
        spaced.password = "  pass phrase  ".into();
        assert_eq!(validate_personal(&spaced).unwrap().password, "  pass phrase  ");

        let mut no_email = good;
        no_email.email = String::new();
        assert_eq!(validate_personal(&no_email), Err(ValidationError::Required("email")));
    }
}
