//! Ordered submission pipeline: credentials, storage upload, job log.
//!
//! Each stage maps its failure onto its own [`SubmitError`] variant, and the
//! observer hears about a phase before the request for that phase is sent.

use crate::api::{ApiError, JobLogRequest, JobLogResponse, PrintApi};
use crate::config::FormVariant;
use crate::file_manager::StagedFile;
use crate::print_job::{PrintOptions, Receipt, SubmissionPhase, SubmitError};
use chrono::Utc;
use reqwest::Url;

pub struct Submission<'a, A: PrintApi + ?Sized> {
    api: &'a A,
    variant: FormVariant,
}

impl<'a, A: PrintApi + ?Sized> Submission<'a, A> {
    pub fn new(api: &'a A, variant: FormVariant) -> Self {
        Self { api, variant }
    }

    pub async fn run<F>(&self, file: &StagedFile, options: PrintOptions, mut observe: F) -> Result<Receipt, SubmitError>
    where
        F: FnMut(SubmissionPhase),
    {
        observe(SubmissionPhase::RequestingCredentials);
        let credentials = self
            .api
            .request_upload(&file.name, &file.media_type)
            .await
            .map_err(|e| stage_failed(SubmissionPhase::RequestingCredentials, e))?;
        tracing::info!("Got upload URL for {} (key {})", file.name, credentials.key);
        let file_url = object_url(&credentials.upload_url, &credentials.key)?;

        observe(SubmissionPhase::UploadingToStorage);
        self.api
            .upload_object(&credentials.upload_url, &file.media_type, &file.content)
            .await
            .map_err(|e| stage_failed(SubmissionPhase::UploadingToStorage, e))?;
        tracing::info!("Uploaded {} bytes of {}", file.size(), file.name);

        observe(SubmissionPhase::LoggingJob);
        let color = self.variant.color_option.then_some(options.color);
        let request = JobLogRequest {
            file_url: file_url.clone(),
            file_name: file.name.clone(),
            copies: options.copies(),
            is_color: color,
        };
        let body = self
            .api
            .log_job(&request)
            .await
            .map_err(|e| stage_failed(SubmissionPhase::LoggingJob, e))?;

        let job_id = if self.variant.expect_job_id {
            Some(parse_job_id(&body)?)
        } else {
            None
        };

        Ok(Receipt {
            file_url,
            file_name: file.name.clone(),
            copies: options.copies(),
            color,
            job_id,
            submitted_at: Utc::now(),
        })
    }
}

fn stage_failed(phase: SubmissionPhase, err: ApiError) -> SubmitError {
    tracing::warn!("{:?} failed: {}", phase, err);
    let reason = err.to_string();
    match phase {
        SubmissionPhase::RequestingCredentials => SubmitError::CredentialRequest(reason),
        SubmissionPhase::UploadingToStorage => SubmitError::StorageUpload(reason),
        _ => SubmitError::JobLog(reason),
    }
}

/// Public object URL: the upload URL's host plus the storage key, always
/// over https. Port, path and signature of the upload URL are dropped.
/// Checked before the upload so an unusable URL never receives the file.
pub fn object_url(upload_url: &str, key: &str) -> Result<String, SubmitError> {
    let url = Url::parse(upload_url)
        .map_err(|e| SubmitError::CredentialRequest(format!("invalid upload URL '{}': {}", upload_url, e)))?;
    let host = url
        .host_str()
        .ok_or_else(|| SubmitError::CredentialRequest(format!("upload URL '{}' has no host", upload_url)))?;
    Ok(format!("https://{}/{}", host, key.trim_start_matches('/')))
}

fn parse_job_id(body: &str) -> Result<String, SubmitError> {
    let response: JobLogResponse =
        serde_json::from_str(body).map_err(|e| SubmitError::JobLog(format!("malformed response: {}", e)))?;
    match response.job_id {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(SubmitError::MissingJobId),
    }
}
