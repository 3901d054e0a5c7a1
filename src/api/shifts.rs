use async_trait::async_trait;
use reqwest::Method;
use tracing::instrument;
use urlencoding::encode;

use super::{ApiClient, Host};
use crate::error::ApiError;
use crate::model::{CreateShiftRequest, Shift, ShiftPatch};
use crate::session::Session;

#[async_trait]
pub trait ShiftService: Send + Sync {
    async fn create_shift(
        &self,
        session: &Session,
        req: &CreateShiftRequest,
    ) -> Result<Shift, ApiError>;

    async fn fetch_shifts(&self, session: &Session, agency_id: &str)
        -> Result<Vec<Shift>, ApiError>;

    async fn fetch_shifts_by_facility(
        &self,
        session: &Session,
        facility_id: &str,
    ) -> Result<Vec<Shift>, ApiError>;

    async fn fetch_shift(&self, session: &Session, id: &str) -> Result<Shift, ApiError>;

    async fn update_shift(
        &self,
        session: &Session,
        id: &str,
        patch: &ShiftPatch,
    ) -> Result<(), ApiError>;

    async fn delete_shift(&self, session: &Session, id: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl ShiftService for ApiClient {
    #[instrument(skip_all, fields(title = %req.title))]
    async fn create_shift(
        &self,
        session: &Session,
        req: &CreateShiftRequest,
    ) -> Result<Shift, ApiError> {
        let builder = self
            .request(Method::POST, Host::Api, "shifts", Some(session))?
            .json(req);
        self.execute(builder, "Error creating shift").await
    }

    #[instrument(skip(self, session))]
    async fn fetch_shifts(
        &self,
        session: &Session,
        agency_id: &str,
    ) -> Result<Vec<Shift>, ApiError> {
        let path = format!("shifts/agency/{}", encode(agency_id));
        let builder = self.request(Method::GET, Host::Api, &path, Some(session))?;
        self.execute(builder, "Error fetching shifts").await
    }

    #[instrument(skip(self, session))]
    async fn fetch_shifts_by_facility(
        &self,
        session: &Session,
        facility_id: &str,
    ) -> Result<Vec<Shift>, ApiError> {
        let path = format!("shifts/facility/{}", encode(facility_id));
        let builder = self.request(Method::GET, Host::Api, &path, Some(session))?;
        self.execute(builder, "Error fetching shifts").await
    }

    #[instrument(skip(self, session))]
    async fn fetch_shift(&self, session: &Session, id: &str) -> Result<Shift, ApiError> {
        let path = format!("shifts/{}", encode(id));
        let builder = self.request(Method::GET, Host::Api, &path, Some(session))?;
        self.execute(builder, "Error fetching shift").await
    }

    #[instrument(skip(self, session, patch))]
    async fn update_shift(
        &self,
        session: &Session,
        id: &str,
        patch: &ShiftPatch,
    ) -> Result<(), ApiError> {
        let path = format!("shifts/{}", encode(id));
        let builder = self
            .request(Method::PATCH, Host::Api, &path, Some(session))?
            .json(patch);
        self.execute_unit(builder, "Error updating shift").await
    }

    #[instrument(skip(self, session))]
    async fn delete_shift(&self, session: &Session, id: &str) -> Result<(), ApiError> {
        let path = format!("shifts/{}", encode(id));
        let builder = self.request(Method::DELETE, Host::Api, &path, Some(session))?;
        self.execute_unit(builder, "Error deleting shift").await
    }
}
