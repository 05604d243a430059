// src/print_job.rs
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub const MIN_COPIES: u32 = 1;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubmitError {
    #[error("Please select a file to upload.")]
    NoFileSelected,
    #[error("A submission is already in progress")]
    AlreadyInFlight,
    #[error("Failed to get pre-signed URL from the server: {0}")]
    CredentialRequest(String),
    #[error("Secure storage upload failed: {0}")]
    StorageUpload(String),
    #[error("Failed to log print job: {0}")]
    JobLog(String),
    #[error("Print queue response did not include a job id")]
    MissingJobId,
}

impl SubmitError {
    /// Errors raised before any request leaves the client.
    pub fn is_local(&self) -> bool {
        matches!(self, SubmitError::NoFileSelected | SubmitError::AlreadyInFlight)
    }
}

/// Where a submission currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SubmissionPhase {
    Idle,
    RequestingCredentials,
    UploadingToStorage,
    LoggingJob,
    Succeeded,
    Failed,
}

impl SubmissionPhase {
    /// Status line shown while a network step is running.
    pub fn progress_message(&self) -> Option<&'static str> {
        match self {
            SubmissionPhase::RequestingCredentials => Some("Status: Requesting secure upload URL..."),
            SubmissionPhase::UploadingToStorage => Some("Status: Uploading file directly to storage..."),
            SubmissionPhase::LoggingJob => Some("Status: Logging print job..."),
            _ => None,
        }
    }
}

/// Copy count and color preference for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintOptions {
    copies: u32,
    pub color: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            copies: MIN_COPIES,
            color: false,
        }
    }
}

impl PrintOptions {
    pub fn new(copies: i64, color: bool) -> Self {
        Self {
            copies: clamp_copies(copies),
            color,
        }
    }

    pub fn copies(&self) -> u32 {
        self.copies
    }

    pub fn set_copies(&mut self, copies: i64) {
        self.copies = clamp_copies(copies);
    }

    /// Accept raw text from an input box. The leading integer is used
    /// (`"2.5"` is 2); text without one counts as the minimum.
    pub fn set_copies_from_input(&mut self, input: &str) {
        self.copies = parse_copies(input);
    }
}

pub fn clamp_copies(copies: i64) -> u32 {
    copies.clamp(MIN_COPIES as i64, u32::MAX as i64) as u32
}

pub fn parse_copies(input: &str) -> u32 {
    let text = input.trim_start();
    let (negative, rest) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let digits = &rest[..end];
    if digits.is_empty() || negative {
        return MIN_COPIES;
    }
    // Only overflow can fail here: the slice is all ASCII digits.
    match digits.parse::<u64>() {
        Ok(n) => clamp_copies(n.min(u32::MAX as u64) as i64),
        Err(_) => u32::MAX,
    }
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Receipt {
    pub file_url: String,
    pub file_name: String,
    pub copies: u32,
    pub color: Option<bool>,
    pub job_id: Option<String>,
    pub submitted_at: DateTime<Utc>,
}
