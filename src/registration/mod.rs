//! Member registration: form validation, submission and the directory

pub mod backend;
pub mod config;
pub mod directory;
pub mod error;
pub mod form;
pub mod hosted;
pub mod notify;
pub mod photo;
pub mod submission;
pub mod validation;

pub use backend::{MemoryBackend, RegistrationBackend};
pub use config::{BackendKind, HostedConfig, RegistrationConfig};
pub use directory::{Directory, DirectoryEntry, DirectoryListing};
pub use error::{BackendError, PhotoError, RegistrationError, SubmitError};
pub use form::{FormState, RegistrationForm, SubmissionOutcome};
pub use hosted::HostedBackend;
pub use notify::{Notification, Notifier, Severity, TracingNotifier};
pub use photo::{preview_photo, read_photo, PhotoUpload, ACCEPTED_IMAGE_TYPES, MAX_PHOTO_BYTES};
pub use submission::{MemberKind, NewRegistration, RegistrationDraft, RegistrationRecord, Specialty, ValidRegistration};
pub use validation::{validate, Field, FieldErrors, ValidationResult};

use std::sync::Arc;

/// Builds the backend selected by the configuration.
pub fn build_backend(
    config: &RegistrationConfig,
) -> Result<Arc<dyn RegistrationBackend>, RegistrationError> {
    match config.backend {
        BackendKind::Memory => Ok(Arc::new(
            MemoryBackend::new().with_latency(config.simulated_latency()),
        )),
        BackendKind::Hosted => Ok(Arc::new(HostedBackend::new(config.hosted.clone())?)),
    }
}
