//! print-drop: stage one PDF, choose print options and hand it to a remote
//! print queue through a pre-signed storage upload.

pub mod api;
pub mod config;
pub mod file_manager;
pub mod form;
pub mod pipeline;
pub mod print_job;
pub mod sim;

pub use api::{HttpPrintApi, PrintApi};
pub use config::{Config, FormVariant};
pub use file_manager::{FileManager, StagedFile};
pub use form::{FormView, UploadForm};
pub use print_job::{PrintOptions, Receipt, SubmissionPhase, SubmitError};
