//! Registration draft, validated registration and stored record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::registration::photo::PhotoUpload;

/// Raw form input, exactly as the user typed it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationDraft {
    pub full_name: String,
    pub designation: String,
    pub organization: String,
    pub email: String,
    pub contact: String,
    #[serde(skip)]
    pub photo: Option<PhotoUpload>,
    pub is_doctor: bool,
    pub hospital_name: Option<String>,
    pub specialty: Option<String>,
    pub confirm_accuracy: bool,
    pub consent_usage: bool,
    pub agree_terms: bool,
}

impl RegistrationDraft {
    pub fn with_photo(mut self, photo: PhotoUpload) -> Self {
        self.photo = Some(photo);
        self
    }

    pub fn as_doctor(
        mut self,
        hospital_name: impl Into<String>,
        specialty: impl Into<String>,
    ) -> Self {
        self.is_doctor = true;
        self.hospital_name = Some(hospital_name.into());
        self.specialty = Some(specialty.into());
        self
    }

    pub fn with_declarations(mut self, accepted: bool) -> Self {
        self.confirm_accuracy = accepted;
        self.consent_usage = accepted;
        self.agree_terms = accepted;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Specialty {
    Cardiology,
    Dermatology,
    Endocrinology,
    Gastroenterology,
    GeneralSurgery,
    InternalMedicine,
    Neurology,
    ObstetricsGynecology,
    Oncology,
    Ophthalmology,
    Orthopedics,
    Pediatrics,
    Psychiatry,
    Radiology,
    Urology,
    Other,
}

impl Specialty {
    pub const ALL: [Specialty; 16] = [
        Specialty::Cardiology,
        Specialty::Dermatology,
        Specialty::Endocrinology,
        Specialty::Gastroenterology,
        Specialty::GeneralSurgery,
        Specialty::InternalMedicine,
        Specialty::Neurology,
        Specialty::ObstetricsGynecology,
        Specialty::Oncology,
        Specialty::Ophthalmology,
        Specialty::Orthopedics,
        Specialty::Pediatrics,
        Specialty::Psychiatry,
        Specialty::Radiology,
        Specialty::Urology,
        Specialty::Other,
    ];

    /// Wire value, as stored in the backend.
    pub fn as_str(&self) -> &'static str {
        match self {
            Specialty::Cardiology => "cardiology",
            Specialty::Dermatology => "dermatology",
            Specialty::Endocrinology => "endocrinology",
            Specialty::Gastroenterology => "gastroenterology",
            Specialty::GeneralSurgery => "general-surgery",
            Specialty::InternalMedicine => "internal-medicine",
            Specialty::Neurology => "neurology",
            Specialty::ObstetricsGynecology => "obstetrics-gynecology",
            Specialty::Oncology => "oncology",
            Specialty::Ophthalmology => "ophthalmology",
            Specialty::Orthopedics => "orthopedics",
            Specialty::Pediatrics => "pediatrics",
            Specialty::Psychiatry => "psychiatry",
            Specialty::Radiology => "radiology",
            Specialty::Urology => "urology",
            Specialty::Other => "other",
        }
    }

    /// Human-readable label for the directory.
    pub fn label(&self) -> &'static str {
        match self {
            Specialty::Cardiology => "Cardiology",
            Specialty::Dermatology => "Dermatology",
            Specialty::Endocrinology => "Endocrinology",
            Specialty::Gastroenterology => "Gastroenterology",
            Specialty::GeneralSurgery => "General Surgery",
            Specialty::InternalMedicine => "Internal Medicine",
            Specialty::Neurology => "Neurology",
            Specialty::ObstetricsGynecology => "Obstetrics & Gynecology",
            Specialty::Oncology => "Oncology",
            Specialty::Ophthalmology => "Ophthalmology",
            Specialty::Orthopedics => "Orthopedics",
            Specialty::Pediatrics => "Pediatrics",
            Specialty::Psychiatry => "Psychiatry",
            Specialty::Radiology => "Radiology",
            Specialty::Urology => "Urology",
            Specialty::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSpecialty(pub String);

impl fmt::Display for UnknownSpecialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown specialty '{}'", self.0)
    }
}

impl std::error::Error for UnknownSpecialty {}

impl FromStr for Specialty {
    type Err = UnknownSpecialty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Specialty::ALL
            .iter()
            .copied()
            .find(|specialty| specialty.as_str() == s)
            .ok_or_else(|| UnknownSpecialty(s.to_string()))
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Member category of a validated registration. Doctor-only fields exist only
/// on the `Doctor` variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemberKind {
    Standard,
    Doctor {
        hospital_name: String,
        specialty: Specialty,
    },
}

impl MemberKind {
    pub fn is_doctor(&self) -> bool {
        matches!(self, MemberKind::Doctor { .. })
    }
}

/// A registration that passed every rule. Text fields are trimmed.
///
/// Only [`validate`](crate::registration::validation::validate) builds one:
///
/// ```compile_fail
/// use member_registry::registration::{MemberKind, PhotoUpload, ValidRegistration};
///
/// let unchecked = ValidRegistration {
///     full_name: String::new(),
///     designation: String::new(),
///     organization: String::new(),
///     email: String::new(),
///     contact: String::new(),
///     photo: PhotoUpload::new("x.gif", "image/gif", Vec::new()),
///     kind: MemberKind::Standard,
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ValidRegistration {
    pub(crate) full_name: String,
    pub(crate) designation: String,
    pub(crate) organization: String,
    pub(crate) email: String,
    pub(crate) contact: String,
    pub(crate) photo: PhotoUpload,
    pub(crate) kind: MemberKind,
}

impl ValidRegistration {
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn designation(&self) -> &str {
        &self.designation
    }

    pub fn organization(&self) -> &str {
        &self.organization
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn contact(&self) -> &str {
        &self.contact
    }

    pub fn photo(&self) -> &PhotoUpload {
        &self.photo
    }

    pub fn kind(&self) -> &MemberKind {
        &self.kind
    }
}

/// Row handed to the backend once the photo has been stored.
#[derive(Debug, Clone, Serialize)]
pub struct NewRegistration {
    pub full_name: String,
    pub designation: String,
    pub organization: String,
    pub email: String,
    pub contact: String,
    pub photo_url: String,
    pub is_doctor: bool,
    pub hospital_name: Option<String>,
    pub specialty: Option<Specialty>,
}

impl NewRegistration {
    pub fn from_valid(registration: &ValidRegistration, photo_url: impl Into<String>) -> Self {
        let (hospital_name, specialty) = match &registration.kind {
            MemberKind::Standard => (None, None),
            MemberKind::Doctor {
                hospital_name,
                specialty,
            } => (Some(hospital_name.clone()), Some(*specialty)),
        };

        Self {
            full_name: registration.full_name.clone(),
            designation: registration.designation.clone(),
            organization: registration.organization.clone(),
            email: registration.email.clone(),
            contact: registration.contact.clone(),
            photo_url: photo_url.into(),
            is_doctor: registration.kind.is_doctor(),
            hospital_name,
            specialty,
        }
    }
}

/// A persisted registration as returned by the backend. `specialty` is free
/// text in storage, so values outside [`Specialty`] are kept as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistrationRecord {
    pub id: String,
    pub full_name: String,
    pub designation: String,
    pub organization: String,
    pub email: String,
    pub contact: String,
    pub photo_url: String,
    pub is_doctor: bool,
    pub hospital_name: Option<String>,
    pub specialty: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl RegistrationRecord {
    pub fn new(registration: NewRegistration) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            full_name: registration.full_name,
            designation: registration.designation,
            organization: registration.organization,
            email: registration.email,
            contact: registration.contact,
            photo_url: registration.photo_url,
            is_doctor: registration.is_doctor,
            hospital_name: registration.hospital_name,
            specialty: registration.specialty.map(|s| s.as_str().to_string()),
            created_at: Utc::now(),
        }
    }

    pub fn known_specialty(&self) -> Option<Specialty> {
        self.specialty.as_deref()?.parse().ok()
    }

    /// Display label for the stored specialty; unknown values show verbatim,
    /// blank ones not at all.
    pub fn specialty_label(&self) -> Option<&str> {
        match self.known_specialty() {
            Some(specialty) => Some(specialty.label()),
            None => self
                .specialty
                .as_deref()
                .map(str::trim)
                .filter(|text| !text.is_empty()),
        }
    }
}
