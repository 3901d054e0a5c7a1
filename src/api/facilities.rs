use async_trait::async_trait;
use reqwest::Method;
use tracing::instrument;
use urlencoding::encode;

use super::{ApiClient, Host, MultipartPayload};
use crate::error::ApiError;
use crate::model::Facility;
use crate::session::Session;

#[async_trait]
pub trait FacilityService: Send + Sync {
    async fn create_facility(
        &self,
        session: &Session,
        payload: MultipartPayload,
    ) -> Result<Facility, ApiError>;

    async fn fetch_facilities(
        &self,
        session: &Session,
        agency_id: &str,
    ) -> Result<Vec<Facility>, ApiError>;

    async fn fetch_facility(&self, session: &Session, id: &str) -> Result<Facility, ApiError>;

    async fn update_facility(
        &self,
        session: &Session,
        id: &str,
        payload: MultipartPayload,
    ) -> Result<Facility, ApiError>;

    async fn delete_facility(&self, session: &Session, id: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl FacilityService for ApiClient {
    #[instrument(skip_all)]
    async fn create_facility(
        &self,
        session: &Session,
        payload: MultipartPayload,
    ) -> Result<Facility, ApiError> {
        let builder = self
            .request(Method::POST, Host::Api, "facilities", Some(session))?
            .multipart(payload.into_form()?);
        self.execute(builder, "Error creating facility").await
    }

    #[instrument(skip(self, session))]
    async fn fetch_facilities(
        &self,
        session: &Session,
        agency_id: &str,
    ) -> Result<Vec<Facility>, ApiError> {
        let path = format!("facilities/agency/{}", encode(agency_id));
        let builder = self.request(Method::GET, Host::Api, &path, Some(session))?;
        self.execute(builder, "Error fetching facilities").await
    }

    #[instrument(skip(self, session))]
    async fn fetch_facility(&self, session: &Session, id: &str) -> Result<Facility, ApiError> {
        let path = format!("facilities/{}", encode(id));
        let builder = self.request(Method::GET, Host::Api, &path, Some(session))?;
        self.execute(builder, "Error fetching facility").await
    }

    #[instrument(skip(self, session, payload))]
    async fn update_facility(
        &self,
        session: &Session,
        id: &str,
        payload: MultipartPayload,
    ) -> Result<Facility, ApiError> {
        let path = format!("facilities/{}", encode(id));
        let builder = self
            .request(Method::PATCH, Host::Api, &path, Some(session))?
            .multipart(payload.into_form()?);
        self.execute(builder, "Error updating facility").await
    }

    #[instrument(skip(self, session))]
    async fn delete_facility(&self, session: &Session, id: &str) -> Result<(), ApiError> {
        let path = format!("facilities/{}", encode(id));
        let builder = self.request(Method::DELETE, Host::Api, &path, Some(session))?;
        self.execute_unit(builder, "Error deleting facility").await
    }
}
