use async_trait::async_trait;
use reqwest::Method;
use tracing::instrument;
use urlencoding::encode;

use super::{ApiClient, FilePart, Host, MultipartPayload};
use crate::error::ApiError;
use crate::model::{AgencyAnalytics, AgencyProfile, LogoResponse};
use crate::session::Session;

#[async_trait]
pub trait AgencyService: Send + Sync {
    async fn fetch_agency_profile(
        &self,
        session: &Session,
        agency_id: &str,
    ) -> Result<AgencyProfile, ApiError>;

    async fn update_profile(
        &self,
        session: &Session,
        agency_id: &str,
        profile: &AgencyProfile,
    ) -> Result<AgencyProfile, ApiError>;

    async fn update_logo(
        &self,
        session: &Session,
        agency_id: &str,
        logo: FilePart,
    ) -> Result<LogoResponse, ApiError>;

    async fn fetch_agency_analytics(
        &self,
        session: &Session,
        agency_id: &str,
    ) -> Result<AgencyAnalytics, ApiError>;
}

#[async_trait]
impl AgencyService for ApiClient {
    #[instrument(skip(self, session))]
    async fn fetch_agency_profile(
        &self,
        session: &Session,
        agency_id: &str,
    ) -> Result<AgencyProfile, ApiError> {
        let path = format!("agencies/{}", encode(agency_id));
        let builder = self.request(Method::GET, Host::Api, &path, Some(session))?;
        self.execute(builder, "Error fetching profile").await
    }

    #[instrument(skip(self, session, profile))]
    async fn update_profile(
        &self,
        session: &Session,
        agency_id: &str,
        profile: &AgencyProfile,
    ) -> Result<AgencyProfile, ApiError> {
        let path = format!("agencies/{}", encode(agency_id));
        let builder = self
            .request(Method::PATCH, Host::Api, &path, Some(session))?
            .json(profile);
        self.execute(builder, "Error updating profile").await
    }

    #[instrument(skip(self, session, logo), fields(file = %logo.file_name))]
    async fn update_logo(
        &self,
        session: &Session,
        agency_id: &str,
        logo: FilePart,
    ) -> Result<LogoResponse, ApiError> {
        let path = format!("agencies/{}/logo", encode(agency_id));
        let form = MultipartPayload::new().file("logo", logo).into_form()?;
        let builder = self
            .request(Method::POST, Host::Api, &path, Some(session))?
            .multipart(form);
        self.execute(builder, "Failed to update logo").await
    }

    #[instrument(skip(self, session))]
    async fn fetch_agency_analytics(
        &self,
        session: &Session,
        agency_id: &str,
    ) -> Result<AgencyAnalytics, ApiError> {
        let path = format!("agencies/{}/analytics", encode(agency_id));
        let builder = self.request(Method::GET, Host::Api, &path, Some(session))?;
        self.execute(builder, "Error fetching analytics data").await
    }
}
