use async_trait::async_trait;
use reqwest::Method;
use tracing::instrument;
use urlencoding::encode;

use super::{ApiClient, Host};
use crate::error::ApiError;
use crate::model::{Caregiver, CaregiverDetails, NotifyRequest, VerifyDocumentRequest};
use crate::session::Session;

#[async_trait]
pub trait CaregiverService: Send + Sync {
    async fn fetch_caregivers(
        &self,
        session: &Session,
        agency_id: &str,
    ) -> Result<Vec<Caregiver>, ApiError>;

    async fn fetch_caregiver_details(
        &self,
        session: &Session,
        caregiver_id: &str,
        agency_id: &str,
    ) -> Result<CaregiverDetails, ApiError>;

    async fn notify_caregiver(
        &self,
        session: &Session,
        caregiver_id: &str,
        req: &NotifyRequest,
    ) -> Result<(), ApiError>;

    async fn verify_document(
        &self,
        session: &Session,
        caregiver_id: &str,
        document_type_id: &str,
        req: &VerifyDocumentRequest,
    ) -> Result<(), ApiError>;
}

#[async_trait]
impl CaregiverService for ApiClient {
    #[instrument(skip(self, session))]
    async fn fetch_caregivers(
        &self,
        session: &Session,
        agency_id: &str,
    ) -> Result<Vec<Caregiver>, ApiError> {
        let path = format!("agencies/{}/applied-caregivers", encode(agency_id));
        let builder = self.request(Method::GET, Host::Auth, &path, Some(session))?;
        self.execute(builder, "Error fetching caregivers").await
    }

    #[instrument(skip(self, session))]
    async fn fetch_caregiver_details(
        &self,
        session: &Session,
        caregiver_id: &str,
        agency_id: &str,
    ) -> Result<CaregiverDetails, ApiError> {
        let path = format!("caregivers/details/{}", encode(caregiver_id));
        let builder = self
            .request(Method::GET, Host::Api, &path, Some(session))?
            .query(&[("agencyId", agency_id)]);
        self.execute(builder, "Error fetching caregiver details").await
    }

    #[instrument(skip(self, session, req))]
    async fn notify_caregiver(
        &self,
        session: &Session,
        caregiver_id: &str,
        req: &NotifyRequest,
    ) -> Result<(), ApiError> {
        let path = format!("users/notify/{}", encode(caregiver_id));
        let builder = self
            .request(Method::POST, Host::Api, &path, Some(session))?
            .json(req);
        self.execute_unit(builder, "Error sending notification").await
    }

    #[instrument(skip(self, session, req), fields(status = %req.status))]
    async fn verify_document(
        &self,
        session: &Session,
        caregiver_id: &str,
        document_type_id: &str,
        req: &VerifyDocumentRequest,
    ) -> Result<(), ApiError> {
        let path = format!(
            "caregiverdocuments/status/{}/{}",
            encode(caregiver_id),
            encode(document_type_id)
        );
        let builder = self
            .request(Method::PATCH, Host::Api, &path, Some(session))?
            .json(req);
        self.execute_unit(builder, "Error updating document status").await
    }
}
