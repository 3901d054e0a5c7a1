//! Agency document-type requirements.

use std::collections::BTreeSet;
use tracing::info;

use crate::api::DocumentService;
use crate::error::{ActionError, ApiError, ValidationError};
use crate::model::{DocumentType, ProviderCategory};
use crate::session::Session;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentTypeForm {
    pub name: String,
    applies_to: BTreeSet<ProviderCategory>,
    applies_to_all: bool,
}

impl DocumentTypeForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn from_document(doc: &DocumentType) -> Self {
        let mut form = Self::new(doc.name.clone());
        if doc.applies_to_all {
            form.set_applies_to_all(true);
        } else {
            form.select(&doc.applies_to);
        }
        form
    }

    /// Checking "applies to all" selects every category; unchecking clears.
    pub fn set_applies_to_all(&mut self, all: bool) {
        self.applies_to_all = all;
        self.applies_to = if all {
            ProviderCategory::ALL.into_iter().collect()
        } else {
            BTreeSet::new()
        };
    }

    /// Picking categories by hand drops the "all" flag.
    pub fn select(&mut self, categories: &[ProviderCategory]) {
        self.applies_to = categories.iter().copied().collect();
        self.applies_to_all = false;
    }

    pub fn applies_to(&self) -> Vec<ProviderCategory> {
        self.applies_to.iter().copied().collect()
    }

    pub fn applies_to_all(&self) -> bool {
        self.applies_to_all
    }

    pub fn to_document(&self, agency_id: &str) -> Result<DocumentType, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required("name"));
        }
        if self.applies_to.is_empty() {
            return Err(ValidationError::Required("appliesTo"));
        }
        Ok(DocumentType {
            id: None,
            name: name.to_string(),
            applies_to: self.applies_to(),
            applies_to_all: self.applies_to_all,
            agency_id: Some(agency_id.to_string()),
        })
    }
}

pub struct DocumentTypeList<'a, A> {
    api: &'a A,
    session: Session,
    documents: Vec<DocumentType>,
}

impl<'a, A: DocumentService> DocumentTypeList<'a, A> {
    pub async fn load(api: &'a A, session: Session) -> Result<DocumentTypeList<'a, A>, ApiError> {
        let documents = api.get_documents(&session, session.agency_id()?).await?;
        Ok(Self {
            api,
            session,
            documents,
        })
    }

    pub fn documents(&self) -> &[DocumentType] {
        &self.documents
    }

    pub fn find(&self, id: &str) -> Option<&DocumentType> {
        self.documents.iter().find(|d| d.id.as_deref() == Some(id))
    }

    pub async fn reload(&mut self) -> Result<(), ApiError> {
        let agency_id = self.session.agency_id()?;
        self.documents = self.api.get_documents(&self.session, agency_id).await?;
        Ok(())
    }

    pub async fn create(&mut self, form: &DocumentTypeForm) -> Result<DocumentType, ActionError> {
        self.session.token()?;
        let doc = form.to_document(self.session.agency_id()?)?;
        let created = self.api.create_document(&self.session, &doc).await?;
        info!(name = %created.name, "document type created");
        self.reload().await?;
        Ok(created)
    }

    pub async fn update(
        &mut self,
        id: &str,
        form: &DocumentTypeForm,
    ) -> Result<DocumentType, ActionError> {
        let mut doc = form.to_document(self.session.agency_id()?)?;
        doc.id = Some(id.to_string());
        let updated = self.api.patch_document(&self.session, id, &doc).await?;
        info!(document_id = %id, "document type updated");
        self.reload().await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn applies_to_all_toggles_categories() {
        let mut form = DocumentTypeForm::new("CPR Card");
        form.set_applies_to_all(true);
        assert_eq!(form.applies_to(), ProviderCategory::ALL.to_vec());

        form.select(&[ProviderCategory::Cna]);
        assert!(!form.applies_to_all());
        assert_eq!(form.applies_to(), vec![ProviderCategory::Cna]);

        form.set_applies_to_all(true);
        form.set_applies_to_all(false);
        assert!(form.applies_to().is_empty());
    }

    #[test]
    fn document_body() {
        let mut form = DocumentTypeForm::new(" TB Test ");
        form.select(&[ProviderCategory::HomeHealthcare, ProviderCategory::Nurse]);
        let doc = form.to_document("a1").unwrap();
        assert_eq!(
            serde_json::to_value(&doc).unwrap(),
            json!({
                "name": "TB Test",
                "appliesTo": ["nurse", "home_healthcare"],
                "appliesToAll": false,
                "agencyId": "a1"
            })
        );

        assert_eq!(
            DocumentTypeForm::new("x").to_document("a1"),
            Err(ValidationError::Required("appliesTo"))
        );
    }
}
