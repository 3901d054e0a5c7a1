use async_trait::async_trait;
use reqwest::Method;
use tracing::instrument;

use super::{ApiClient, Host};
use crate::error::ApiError;
use crate::model::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

#[async_trait]
pub trait AuthService: Send + Sync {
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError>;

    async fn register_agency_admin(&self, req: &RegisterRequest)
        -> Result<RegisterResponse, ApiError>;
}

#[async_trait]
impl AuthService for ApiClient {
    #[instrument(skip_all, fields(email = %req.email))]
    async fn login(&self, req: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let builder = self
            .request(Method::POST, Host::Api, "auth/login/agency-admin", None)?
            .json(req);
        self.execute(builder, "Login failed").await
    }

    #[instrument(skip_all, fields(agency = %req.agency.agency_name))]
    async fn register_agency_admin(
        &self,
        req: &RegisterRequest,
    ) -> Result<RegisterResponse, ApiError> {
        let builder = self
            .request(Method::POST, Host::Api, "auth/register/agency-admin", None)?
            .json(req);
        self.execute(builder, "Registration failed").await
    }
}
