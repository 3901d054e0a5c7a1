//! Client for the staffing-agency admin backend: session handling, one typed
//! call per endpoint, and the view-models behind each dashboard screen.

pub mod agency;
pub mod api;
pub mod auth;
pub mod caregivers;
pub mod config;
pub mod document_types;
pub mod error;
pub mod facilities;
pub mod forms;
pub mod model;
pub mod render;
pub mod route;
pub mod session;
pub mod shifts;
pub mod storage;
pub mod verification;
