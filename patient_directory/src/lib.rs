// patient_directory/src/lib.rs

//! Client for the external beneficiary directory: fetches a short-lived
//! bearer token and forwards a paginated search.

pub mod directory_client;

pub use directory_client::{extract_token, HttpPatientDirectory, PatientDirectory, MIN_TOKEN_LEN};
