use async_trait::async_trait;
use reqwest::Method;
use tracing::instrument;
use urlencoding::encode;

use super::{ApiClient, Host};
use crate::error::ApiError;
use crate::model::DocumentType;
use crate::session::Session;

#[async_trait]
pub trait DocumentService: Send + Sync {
    async fn create_document(
        &self,
        session: &Session,
        document: &DocumentType,
    ) -> Result<DocumentType, ApiError>;

    async fn get_documents(
        &self,
        session: &Session,
        agency_id: &str,
    ) -> Result<Vec<DocumentType>, ApiError>;

    async fn patch_document(
        &self,
        session: &Session,
        id: &str,
        document: &DocumentType,
    ) -> Result<DocumentType, ApiError>;
}

#[async_trait]
impl DocumentService for ApiClient {
    #[instrument(skip_all, fields(name = %document.name))]
    async fn create_document(
        &self,
        session: &Session,
        document: &DocumentType,
    ) -> Result<DocumentType, ApiError> {
        let builder = self
            .request(Method::POST, Host::Api, "documents", Some(session))?
            .json(document);
        self.execute(builder, "Error creating document").await
    }

    #[instrument(skip(self, session))]
    async fn get_documents(
        &self,
        session: &Session,
        agency_id: &str,
    ) -> Result<Vec<DocumentType>, ApiError> {
        let path = format!("documents/agency/{}", encode(agency_id));
        let builder = self.request(Method::GET, Host::Api, &path, Some(session))?;
        self.execute(builder, "Error fetching documents").await
    }

    #[instrument(skip(self, session, document))]
    async fn patch_document(
        &self,
        session: &Session,
        id: &str,
        document: &DocumentType,
    ) -> Result<DocumentType, ApiError> {
        let path = format!("documents/{}", encode(id));
        let builder = self
            .request(Method::PATCH, Host::Api, &path, Some(session))?
            .json(document);
        self.execute(builder, "Error updating document").await
    }
}
