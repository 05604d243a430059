//! The upload form's view-model.
//!
//! `UploadForm` owns every piece of state the print screen shows and drives a
//! [`Submission`] when the user hits submit. A UI layer reads it back through
//! [`UploadForm::view`].

use crate::api::PrintApi;
use crate::config::FormVariant;
use crate::file_manager::{FileManagerError, StagedFile};
use crate::pipeline::Submission;
use crate::print_job::{PrintOptions, Receipt, SubmissionPhase, SubmitError};
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

const PREPARING_STATUS: &str = "Status: Getting upload permission...";

pub struct UploadForm {
    api: Arc<dyn PrintApi>,
    variant: FormVariant,
    staged: Option<StagedFile>,
    options: PrintOptions,
    phase: SubmissionPhase,
    in_flight: bool,
    status: String,
    status_tx: watch::Sender<String>,
    last_job_id: Option<String>,
}

/// Clears the in-flight flag when dropped, including when the `submit`
/// future itself is dropped mid-request.
struct InFlight<'a>(&'a mut bool);

impl<'a> InFlight<'a> {
    fn enter(flag: &'a mut bool) -> Self {
        *flag = true;
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

fn publish(status: &mut String, status_tx: &watch::Sender<String>, message: String) {
    status_tx.send_replace(message.clone());
    *status = message;
}

/// Snapshot of what the screen should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormView {
    pub file_name: Option<String>,
    pub copies: u32,
    /// `None` when the form has no color option.
    pub color: Option<bool>,
    pub submit_enabled: bool,
    pub busy: bool,
    /// Hidden while a job id is on display.
    pub status: Option<String>,
    pub job_id: Option<String>,
}

impl UploadForm {
    pub fn new(api: Arc<dyn PrintApi>, variant: FormVariant) -> Self {
        Self {
            api,
            variant,
            staged: None,
            options: PrintOptions::default(),
            phase: SubmissionPhase::Idle,
            in_flight: false,
            status: String::new(),
            status_tx: watch::Sender::new(String::new()),
            last_job_id: None,
        }
    }

    pub fn variant(&self) -> FormVariant {
        self.variant
    }

    pub fn staged_file(&self) -> Option<&StagedFile> {
        self.staged.as_ref()
    }

    pub fn options(&self) -> PrintOptions {
        self.options
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Follow status changes as they happen, e.g. to render progress while
    /// `submit` is running.
    pub fn watch_status(&self) -> watch::Receiver<String> {
        self.status_tx.subscribe()
    }

    pub fn last_job_id(&self) -> Option<&str> {
        self.last_job_id.as_deref()
    }

    pub fn can_submit(&self) -> bool {
        self.staged.is_some() && !self.in_flight
    }

    /// Stage `file`, replacing whatever was staged before.
    pub fn select_file(&mut self, file: StagedFile) -> Result<(), FileManagerError> {
        if !file.is_pdf() {
            tracing::warn!("Rejected {} ({})", file.name, file.media_type);
            return Err(FileManagerError::NotPdf(file.name));
        }
        if let Some(previous) = &self.staged {
            tracing::debug!("Replacing staged file {}", previous.name);
        }
        tracing::info!("Staged {} ({} bytes)", file.name, file.size());
        self.staged = Some(file);
        self.last_job_id = None;
        Ok(())
    }

    /// Drop the staged file if it is called `name`. Returns whether anything
    /// was removed.
    pub fn remove_file(&mut self, name: &str) -> bool {
        match &self.staged {
            Some(file) if file.name == name => {
                tracing::info!("Removed {}", name);
                self.staged = None;
                true
            }
            _ => false,
        }
    }

    pub fn set_copies(&mut self, input: &str) {
        self.options.set_copies_from_input(input);
    }

    pub fn set_copies_count(&mut self, copies: i64) {
        self.options.set_copies(copies);
    }

    pub fn set_color(&mut self, color: bool) {
        if !self.variant.color_option {
            tracing::debug!("Form has no color option; ignoring");
            return;
        }
        self.options.color = color;
    }

    /// Run the three-step submission for the staged file.
    ///
    /// On success the staged file is cleared; on failure it is kept so the
    /// user can retry. Either way the form is submittable again afterwards.
    pub async fn submit(&mut self) -> Result<Receipt, SubmitError> {
        let Some(file) = self.staged.clone() else {
            publish(&mut self.status, &self.status_tx, SubmitError::NoFileSelected.to_string());
            return Err(SubmitError::NoFileSelected);
        };
        if self.in_flight {
            return Err(SubmitError::AlreadyInFlight);
        }

        let _busy = InFlight::enter(&mut self.in_flight);
        publish(&mut self.status, &self.status_tx, PREPARING_STATUS.to_string());
        self.last_job_id = None;

        let result = {
            let status = &mut self.status;
            let status_tx = &self.status_tx;
            let phase = &mut self.phase;
            Submission::new(self.api.as_ref(), self.variant)
                .run(&file, self.options, |next| {
                    tracing::info!("{} -> {:?}", file.name, next);
                    *phase = next;
                    if let Some(message) = next.progress_message() {
                        publish(status, status_tx, message.to_string());
                    }
                })
                .await
        };

        match &result {
            Ok(receipt) => {
                self.phase = SubmissionPhase::Succeeded;
                let message = format!("Success! \"{}\" is now in the print queue.", file.name);
                publish(&mut self.status, &self.status_tx, message);
                self.last_job_id = receipt.job_id.clone();
                self.staged = None;
                tracing::info!("Queued {} as {}", file.name, receipt.job_id.as_deref().unwrap_or("-"));
            }
            Err(e) => {
                self.phase = SubmissionPhase::Failed;
                publish(&mut self.status, &self.status_tx, format!("Upload failed: {}", e));
                tracing::error!("Upload of {} failed: {}", file.name, e);
            }
        }
        result
    }

    pub fn view(&self) -> FormView {
        let status = if self.status.is_empty() || self.last_job_id.is_some() {
            None
        } else {
            Some(self.status.clone())
        };
        FormView {
            file_name: self.staged.as_ref().map(|f| f.name.clone()),
            copies: self.options.copies(),
            color: self.variant.color_option.then_some(self.options.color),
            submit_enabled: self.can_submit(),
            busy: self.in_flight,
            status,
            job_id: self.last_job_id.clone(),
        }
    }
}

impl fmt::Display for FormView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file_name {
            Some(name) => writeln!(f, "Selected file: {}", name)?,
            None => writeln!(f, "Selected file: (none)")?,
        }
        write!(f, "Copies: {}", self.copies)?;
        if let Some(color) = self.color {
            write!(f, "  Print in color: {}", if color { "yes" } else { "no" })?;
        }
        writeln!(f)?;
        if let Some(job_id) = &self.job_id {
            writeln!(f, "Your Job ID is: {}", job_id)?;
            writeln!(f, "Please save this ID to check your print status later.")?;
        }
        if let Some(status) = &self.status {
            writeln!(f, "{}", status)?;
        }
        Ok(())
    }
}
