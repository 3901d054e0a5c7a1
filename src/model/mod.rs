//! Wire DTOs for every backend entity.
//!
//! Response types are lenient where the backend is (populated vs. bare
//! references, numeric strings); request types serialize exactly the fields
//! the backend expects.

pub mod agency;
pub mod auth;
pub mod caregiver;
pub mod document;
pub mod facility;
pub mod shift;

pub use agency::{AgencyAnalytics, AgencyProfile, LogoResponse};
pub use auth::{AgencyInfo, LoginRequest, LoginResponse, PersonalInfo, RegisterRequest, RegisterResponse};
pub use caregiver::{
    Caregiver, CaregiverDetails, CaregiverDocument, CaregiverProfile, DetailDocument,
    DocumentStatus, DocumentTypeRef, NotifyRequest, VerifyDocumentRequest,
};
pub use document::{DocumentType, ProviderCategory};
pub use facility::{Facility, GeoPoint};
pub use shift::{
    CreateShiftRequest, FacilityRef, NursePayRate, NurseType, PersonRef, Shift, ShiftPatch,
    ShiftStatus,
};
