//! Caregiver screens: the applicant tabs, details page, notifications and
//! document review.

use tracing::{info, instrument};

use crate::api::CaregiverService;
use crate::error::{ActionError, ApiError, ValidationError};
use crate::model::{Caregiver, CaregiverDetails, DocumentStatus, NotifyRequest};
use crate::session::Session;
use crate::verification::VerificationDialog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaregiverTab {
    VerifyDocuments,
    VerifiedCaregivers,
}

impl CaregiverTab {
    pub fn from_id(id: &str) -> Option<Self> {
        match id {
            "verify-documents" => Some(CaregiverTab::VerifyDocuments),
            "verified-caregivers" => Some(CaregiverTab::VerifiedCaregivers),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            CaregiverTab::VerifyDocuments => "verify-documents",
            CaregiverTab::VerifiedCaregivers => "verified-caregivers",
        }
    }

    pub fn matches(&self, caregiver: &Caregiver) -> bool {
        match self {
            CaregiverTab::VerifyDocuments => !caregiver.approved_status,
            CaregiverTab::VerifiedCaregivers => caregiver.approved_status,
        }
    }
}

pub fn filter_by_tab(caregivers: &[Caregiver], tab: CaregiverTab) -> Vec<&Caregiver> {
    caregivers.iter().filter(|c| tab.matches(c)).collect()
}

pub fn notify_request(message: &str) -> Result<NotifyRequest, ValidationError> {
    let message = message.trim();
    if message.is_empty() {
        return Err(ValidationError::Required("message"));
    }
    Ok(NotifyRequest {
        message: message.to_string(),
    })
}

#[instrument(skip(api, session, message))]
pub async fn notify<A: CaregiverService>(
    api: &A,
    session: &Session,
    caregiver_id: &str,
    message: &str,
) -> Result<(), ActionError> {
    let req = notify_request(message)?;
    api.notify_caregiver(session, caregiver_id, &req).await?;
    info!(%caregiver_id, "notification sent");
    Ok(())
}

pub async fn caregiver_details<A: CaregiverService>(
    api: &A,
    session: &Session,
    caregiver_id: &str,
) -> Result<CaregiverDetails, ApiError> {
    let agency_id = session.agency_id()?;
    api.fetch_caregiver_details(session, caregiver_id, agency_id)
        .await
}

pub struct CaregiverBoard<'a, A> {
    api: &'a A,
    session: Session,
    caregivers: Vec<Caregiver>,
    tab: CaregiverTab,
}

impl<'a, A: CaregiverService> CaregiverBoard<'a, A> {
    pub async fn load(api: &'a A, session: Session) -> Result<CaregiverBoard<'a, A>, ApiError> {
        let caregivers = api.fetch_caregivers(&session, session.agency_id()?).await?;
        Ok(Self {
            api,
            session,
            caregivers,
            tab: CaregiverTab::VerifyDocuments,
        })
    }

    pub fn caregivers(&self) -> &[Caregiver] {
        &self.caregivers
    }

    pub fn set_tab(&mut self, tab: CaregiverTab) {
        self.tab = tab;
    }

    pub fn tab(&self) -> CaregiverTab {
        self.tab
    }

    pub fn visible(&self) -> Vec<&Caregiver> {
        filter_by_tab(&self.caregivers, self.tab)
    }

    pub fn find(&self, id: &str) -> Option<&Caregiver> {
        self.caregivers.iter().find(|c| c.id == id)
    }

    pub async fn reload(&mut self) -> Result<(), ApiError> {
        let agency_id = self.session.agency_id()?;
        self.caregivers = self.api.fetch_caregivers(&self.session, agency_id).await?;
        Ok(())
    }

    /// Open the review dialog on a caregiver, focused on one document type
    /// when given.
    pub fn review(
        &self,
        caregiver_id: &str,
        document_type_id: Option<&str>,
    ) -> Result<VerificationDialog, ValidationError> {
        let caregiver = self
            .find(caregiver_id)
            .ok_or_else(|| ValidationError::Invalid {
                field: "caregiverId",
                value: caregiver_id.to_string(),
            })?;
        let mut dialog = VerificationDialog::open(caregiver);
        if let Some(type_id) = document_type_id {
            dialog.select(type_id)?;
        }
        Ok(dialog)
    }

    /// Submit a decision, then refetch and reconcile the dialog with the
    /// backend's copy.
    pub async fn verify(
        &mut self,
        dialog: &mut VerificationDialog,
        approved: bool,
        comment: Option<&str>,
    ) -> Result<DocumentStatus, ActionError> {
        let status = dialog
            .submit(self.api, &self.session, approved, comment)
            .await?;
        self.reload().await?;
        if let Some(fresh) = self.find(dialog.caregiver_id()) {
            dialog.reconcile(fresh);
        }
        Ok(status)
    }
}
