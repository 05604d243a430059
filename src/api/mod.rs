//! Client side of the remote print API.
//! This file declares the other files in this directory as sub-modules.

pub mod client;
pub mod models;

pub use client::{ApiError, HttpPrintApi, PrintApi};
pub use models::{CredentialQuery, JobLogRequest, JobLogResponse, UploadCredentials};
