//! Registration form session: validation plus the submission state machine
//!
//! ```text
//! Editing --submit(valid)--> Submitting --ok--> Submitted (terminal)
//!    ^                           |
//!    +-----------failed----------+
//! ```
//!
//! A draft that fails validation never leaves `Editing`. While a submission
//! is in flight further submit requests are rejected, not queued. Once
//! started, a submission runs to completion on its own task even if the
//! caller stops waiting, so the final state always matches what the backend
//! stored.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::registration::backend::RegistrationBackend;
use crate::registration::error::{BackendError, SubmitError};
use crate::registration::notify::{Notification, Notifier};
use crate::registration::submission::{NewRegistration, RegistrationDraft, RegistrationRecord, ValidRegistration};
use crate::registration::validation::{validate, FieldErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormState {
    Editing,
    Submitting,
    Submitted,
}

#[derive(Debug)]
pub enum SubmissionOutcome {
    /// Persisted; the form is now `Submitted`.
    Submitted(RegistrationRecord),
    /// Rejected by validation; nothing was sent.
    Invalid(FieldErrors),
    /// The backend call failed; the form is back in `Editing`.
    Failed(BackendError),
}

impl SubmissionOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmissionOutcome::Submitted(_))
    }
}

pub struct RegistrationForm {
    id: Uuid,
    state: Arc<watch::Sender<FormState>>,
    backend: Arc<dyn RegistrationBackend>,
    notifier: Arc<dyn Notifier>,
}

/// Owns the `Submitting` state; puts the form back into `Editing` if the
/// submission task dies before settling.
struct InFlight {
    state: Arc<watch::Sender<FormState>>,
    settled: bool,
}

impl InFlight {
    fn settle(mut self, state: FormState) {
        self.state.send_replace(state);
        self.settled = true;
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        if !self.settled {
            self.state.send_replace(FormState::Editing);
        }
    }
}

impl RegistrationForm {
    pub fn new(backend: Arc<dyn RegistrationBackend>, notifier: Arc<dyn Notifier>) -> Self {
        let (state, _) = watch::channel(FormState::Editing);
        Self {
            id: Uuid::new_v4(),
            state: Arc::new(state),
            backend,
            notifier,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> FormState {
        *self.state.borrow()
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        self.state() == FormState::Editing
    }

    /// Receives every state transition of this form.
    pub fn subscribe(&self) -> watch::Receiver<FormState> {
        self.state.subscribe()
    }

    /// Validates the draft and, when it passes, persists it.
    ///
    /// Returns `Err` only when the submit control is unavailable: a submission
    /// is already in flight or the form has been submitted.
    pub async fn submit(
        &self,
        draft: &RegistrationDraft,
    ) -> Result<SubmissionOutcome, SubmitError> {
        self.ensure_editing()?;

        match validate(draft) {
            Ok(registration) => self.submit_validated(registration).await,
            Err(errors) => {
                info!(
                    "Form {} rejected by validation ({} field(s))",
                    self.id,
                    errors.len()
                );
                Ok(SubmissionOutcome::Invalid(errors))
            }
        }
    }

    /// Persists a registration produced by [`validate`].
    pub async fn submit_validated(
        &self,
        registration: ValidRegistration,
    ) -> Result<SubmissionOutcome, SubmitError> {
        let guard = self.begin()?;
        info!("Form {} submitting '{}'", self.id, registration.full_name());

        let id = self.id;
        let backend = self.backend.clone();
        let notifier = self.notifier.clone();
        let task = tokio::spawn(async move {
            match persist(backend.as_ref(), &registration).await {
                Ok(record) => {
                    guard.settle(FormState::Submitted);
                    info!("Form {} submitted as record {}", id, record.id);
                    notifier.notify(Notification::registration_succeeded());
                    SubmissionOutcome::Submitted(record)
                }
                Err(e) => {
                    guard.settle(FormState::Editing);
                    warn!("Form {} submission failed: {}", id, e);
                    notifier.notify(Notification::registration_failed());
                    SubmissionOutcome::Failed(e)
                }
            }
        });

        match task.await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                error!("Form {} submission task ended abnormally: {}", self.id, e);
                self.notifier.notify(Notification::registration_failed());
                Ok(SubmissionOutcome::Failed(BackendError::Unavailable(e.to_string())))
            }
        }
    }

    fn ensure_editing(&self) -> Result<(), SubmitError> {
        match self.state() {
            FormState::Editing => Ok(()),
            FormState::Submitting => Err(SubmitError::InFlight),
            FormState::Submitted => Err(SubmitError::AlreadySubmitted),
        }
    }

    /// Atomically moves `Editing` to `Submitting`.
    fn begin(&self) -> Result<InFlight, SubmitError> {
        let mut rejected = None;
        self.state.send_if_modified(|state| match state {
            FormState::Editing => {
                *state = FormState::Submitting;
                true
            }
            FormState::Submitting => {
                rejected = Some(SubmitError::InFlight);
                false
            }
            FormState::Submitted => {
                rejected = Some(SubmitError::AlreadySubmitted);
                false
            }
        });

        match rejected {
            Some(e) => Err(e),
            None => Ok(InFlight {
                state: self.state.clone(),
                settled: false,
            }),
        }
    }
}

/// Uploads the photo, then inserts the row pointing at it.
async fn persist(
    backend: &dyn RegistrationBackend,
    registration: &ValidRegistration,
) -> Result<RegistrationRecord, BackendError> {
    let photo_url = backend.upload_photo(registration.photo()).await?;
    let row = NewRegistration::from_valid(registration, photo_url);
    backend.create_registration(row).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::backend::MemoryBackend;
    use crate::registration::notify::TracingNotifier;
    use crate::registration::PhotoUpload;
    use std::time::Duration;

    fn valid_registration() -> ValidRegistration {
        let draft = RegistrationDraft {
            full_name: "Jane Roe".into(),
            designation: "Engineer".into(),
            organization: "Acme".into(),
            email: "jane@example.com".into(),
            contact: "5551234567".into(),
            ..Default::default()
        }
        .with_photo(PhotoUpload::new("j.png", "image/png", vec![1]))
        .with_declarations(true);

        validate(&draft).unwrap()
    }

    #[tokio::test]
    async fn invalid_draft_stays_editing() {
        let backend = Arc::new(MemoryBackend::new());
        let form = RegistrationForm::new(backend.clone(), Arc::new(TracingNotifier));

        let outcome = form.submit(&RegistrationDraft::default()).await.unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Invalid(_)));
        assert_eq!(form.state(), FormState::Editing);
        assert_eq!(backend.photo_count().await, 0);
    }

    #[tokio::test]
    async fn abandoned_submission_still_completes() {
        let backend = Arc::new(MemoryBackend::new().with_latency(Duration::from_millis(50)));
        let form = RegistrationForm::new(backend.clone(), Arc::new(TracingNotifier));
        let mut states = form.subscribe();

        let pending = form.submit_validated(valid_registration());
        let timed_out = tokio::time::timeout(Duration::from_millis(5), pending).await;
        assert!(timed_out.is_err());
        assert_eq!(form.state(), FormState::Submitting);
        assert!(!form.can_submit());

        states
            .wait_for(|state| *state == FormState::Submitted)
            .await
            .unwrap();
        assert_eq!(backend.list_registrations().await.unwrap().len(), 1);
        assert_eq!(
            form.submit_validated(valid_registration()).await.unwrap_err(),
            SubmitError::AlreadySubmitted
        );
    }

    #[tokio::test]
    async fn abandoned_failing_submission_returns_to_editing() {
        let backend = Arc::new(MemoryBackend::new().with_latency(Duration::from_millis(50)));
        backend.set_failing(true);
        let form = RegistrationForm::new(backend.clone(), Arc::new(TracingNotifier));
        let mut states = form.subscribe();

        let pending = form.submit_validated(valid_registration());
        assert!(tokio::time::timeout(Duration::from_millis(5), pending).await.is_err());

        states
            .wait_for(|state| *state == FormState::Editing)
            .await
            .unwrap();
        assert!(form.can_submit());
        backend.set_failing(false);
        assert!(backend.list_registrations().await.unwrap().is_empty());
    }
}
