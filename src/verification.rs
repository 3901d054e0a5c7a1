//! Document verification dialog for one caregiver.

use tracing::{info, warn};

use crate::api::CaregiverService;
use crate::error::{ActionError, ValidationError};
use crate::model::{Caregiver, CaregiverDocument, DocumentStatus, VerifyDocumentRequest};
use crate::session::Session;

pub const NO_DOCUMENTS: &str = "The candidate has not uploaded any documents.";

#[derive(Debug, Clone, PartialEq)]
pub struct VerificationDialog {
    caregiver_id: String,
    caregiver_name: String,
    documents: Vec<CaregiverDocument>,
    selected: Option<usize>,
    open: bool,
}

impl VerificationDialog {
    /// Open on a caregiver with the first document selected.
    pub fn open(caregiver: &Caregiver) -> Self {
        let documents = caregiver.uploaded_documents.clone();
        let selected = if documents.is_empty() { None } else { Some(0) };
        Self {
            caregiver_id: caregiver.id.clone(),
            caregiver_name: caregiver.name.clone(),
            documents,
            selected,
            open: true,
        }
    }

    pub fn caregiver_id(&self) -> &str {
        &self.caregiver_id
    }

    pub fn caregiver_name(&self) -> &str {
        &self.caregiver_name
    }

    pub fn documents(&self) -> &[CaregiverDocument] {
        &self.documents
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn selected(&self) -> Option<&CaregiverDocument> {
        self.selected.and_then(|i| self.documents.get(i))
    }

    pub fn select(&mut self, document_type_id: &str) -> Result<(), ValidationError> {
        let idx = self
            .documents
            .iter()
            .position(|d| d.document_type.id == document_type_id)
            .ok_or(ValidationError::NoDocumentSelected)?;
        self.selected = Some(idx);
        Ok(())
    }

    /// Build the request for the selected document. Reviewed documents are
    /// terminal and cannot be verified again.
    pub fn prepare(
        &self,
        approved: bool,
        comment: Option<&str>,
    ) -> Result<(String, VerifyDocumentRequest), ValidationError> {
        let doc = self.selected().ok_or(ValidationError::NoDocumentSelected)?;
        let next = DocumentStatus::from_decision(approved);
        if !doc.status.can_transition_to(next) {
            return Err(ValidationError::AlreadyReviewed(doc.status.to_string()));
        }
        Ok((
            doc.document_type.id.clone(),
            VerifyDocumentRequest::new(next, comment),
        ))
    }

    /// Send the decision. On success the local copy is marked optimistically
    /// and the dialog closes; [`reconcile`](Self::reconcile) later replaces it
    /// with what the backend holds.
    pub async fn submit<A: CaregiverService>(
        &mut self,
        api: &A,
        session: &Session,
        approved: bool,
        comment: Option<&str>,
    ) -> Result<DocumentStatus, ActionError> {
        let (document_type_id, req) = self.prepare(approved, comment)?;
        if let Err(err) = api
            .verify_document(session, &self.caregiver_id, &document_type_id, &req)
            .await
        {
            warn!(caregiver_id = %self.caregiver_id, %document_type_id, error = %err, "verification failed");
            return Err(err.into());
        }

        if let Some(doc) = self.selected.and_then(|i| self.documents.get_mut(i)) {
            doc.status = req.status;
            doc.comments = req.comments.clone();
        }
        self.open = false;
        info!(caregiver_id = %self.caregiver_id, %document_type_id, status = %req.status, "document verified");
        Ok(req.status)
    }

    /// Adopt the fetched copy, keeping the selection on the same document
    /// type when it still exists.
    pub fn reconcile(&mut self, fresh: &Caregiver) {
        if fresh.id != self.caregiver_id {
            return;
        }
        let selected_type = self.selected().map(|d| d.document_type.id.clone());
        self.documents = fresh.uploaded_documents.clone();
        self.selected = selected_type
            .and_then(|id| self.documents.iter().position(|d| d.document_type.id == id))
            .or(if self.documents.is_empty() { None } else { Some(0) });
    }
}
