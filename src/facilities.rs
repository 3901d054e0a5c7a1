//! Facility screens: list, create/edit form and delete.

use serde_json::json;
use tracing::{info, instrument};

use crate::api::{FacilityService, FilePart, MultipartPayload};
use crate::error::{ActionError, ApiError, ValidationError};
use crate::model::{Facility, GeoPoint};
use crate::route::Route;
use crate::session::Session;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacilityForm {
    pub name: String,
    pub location: GeoPoint,
    pub text_location: String,
    pub telephone: String,
    pub email: String,
    pub building_name: String,
    pub floor: String,
    pub description: String,
}

impl FacilityForm {
    pub fn from_facility(facility: &Facility) -> Self {
        Self {
            name: facility.name.clone(),
            location: facility.location,
            text_location: facility.text_location.clone(),
            telephone: facility.phone.clone(),
            email: facility.email.clone(),
            building_name: facility.building_name.clone().unwrap_or_default(),
            floor: facility.floor.clone().unwrap_or_default(),
            description: facility.description.clone().unwrap_or_default(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let blank = [
            &self.name,
            &self.text_location,
            &self.telephone,
            &self.email,
            &self.description,
        ]
        .iter()
        .any(|v| v.trim().is_empty());
        if blank || !self.location.is_set() {
            return Err(ValidationError::IncompleteForm);
        }
        Ok(())
    }

    /// Multipart body of `POST /facilities`.
    pub fn create_payload(
        &self,
        agency_id: &str,
        image: Option<FilePart>,
    ) -> Result<MultipartPayload, ValidationError> {
        self.validate()?;
        let mut payload = MultipartPayload::new()
            .text("name", self.name.trim())
            .text("location[latitude]", self.location.latitude.to_string())
            .text("location[longitude]", self.location.longitude.to_string())
            .text("textLocation", self.text_location.trim())
            .text("phone", self.telephone.trim())
            .text("email", self.email.trim())
            .text("buildingName", self.building_name.trim())
            .text("floor", self.floor.trim())
            .text("description", self.description.trim())
            .text("agencyId", agency_id);
        if let Some(image) = image {
            payload = payload.file("image", image);
        }
        Ok(payload)
    }

    /// Multipart body of the full-record `PATCH /facilities/:id`.
    pub fn update_payload(&self, image: Option<FilePart>) -> Result<MultipartPayload, ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Required("name"));
        }
        let location = json!({
            "latitude": self.location.latitude,
            "longitude": self.location.longitude,
        });
        let mut payload = MultipartPayload::new()
            .text("name", self.name.trim())
            .text("location", location.to_string())
            .text("textLocation", self.text_location.trim())
            .text("telephone", self.telephone.trim())
            .text("email", self.email.trim())
            .text("floor", self.floor.trim())
            .text("buildingName", self.building_name.trim())
            .text("description", self.description.trim());
        if let Some(image) = image {
            payload = payload.file("image", image);
        }
        Ok(payload)
    }
}

#[instrument(skip_all, fields(name = %form.name))]
pub async fn create_facility<A: FacilityService>(
    api: &A,
    session: &Session,
    form: &FacilityForm,
    image: Option<FilePart>,
) -> Result<Route, ActionError> {
    session.token()?;
    let agency_id = session.agency_id()?;
    let payload = form.create_payload(agency_id, image)?;
    let created = api.create_facility(session, payload).await?;
    info!(facility_id = ?created.id, "facility created");
    Ok(Route::Facilities)
}

#[instrument(skip(api, session, form, image))]
pub async fn update_facility<A: FacilityService>(
    api: &A,
    session: &Session,
    id: &str,
    form: &FacilityForm,
    image: Option<FilePart>,
) -> Result<Route, ActionError> {
    session.token()?;
    let payload = form.update_payload(image)?;
    api.update_facility(session, id, payload).await?;
    info!(facility_id = %id, "facility updated");
    Ok(Route::Facilities)
}

/// Facilities table with refetch after delete.
pub struct FacilityList<'a, A> {
    api: &'a A,
    session: Session,
    facilities: Vec<Facility>,
}

impl<'a, A: FacilityService> FacilityList<'a, A> {
    pub async fn load(api: &'a A, session: Session) -> Result<FacilityList<'a, A>, ApiError> {
        let facilities = api.fetch_facilities(&session, session.agency_id()?).await?;
        Ok(Self {
            api,
            session,
            facilities,
        })
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    pub async fn reload(&mut self) -> Result<(), ApiError> {
        let agency_id = self.session.agency_id()?;
        self.facilities = self.api.fetch_facilities(&self.session, agency_id).await?;
        Ok(())
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), ApiError> {
        self.api.delete_facility(&self.session, id).await?;
        info!(facility_id = %id, "facility deleted");
        self.reload().await
    }
}
