//! Field rules for the registration form
//!
//! Every field is checked on its own and all failures are collected, one
//! message per field. The doctor rule runs afterwards and reports its failure
//! on `hospitalName`, including the case where only the specialty is missing.
//! A specialty value outside the known set is reported on `specialty`.

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

use crate::registration::photo::PhotoUpload;
use crate::registration::submission::{MemberKind, RegistrationDraft, Specialty, ValidRegistration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    FullName,
    Designation,
    Organization,
    Email,
    Contact,
    Photo,
    HospitalName,
    Specialty,
    ConfirmAccuracy,
    ConsentUsage,
    AgreeTerms,
}

impl Field {
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::FullName => "fullName",
            Field::Designation => "designation",
            Field::Organization => "organization",
            Field::Email => "email",
            Field::Contact => "contact",
            Field::Photo => "photo",
            Field::HospitalName => "hospitalName",
            Field::Specialty => "specialty",
            Field::ConfirmAccuracy => "confirmAccuracy",
            Field::ConsentUsage => "consentUsage",
            Field::AgreeTerms => "agreeTerms",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field name to message, at most one message per field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field` unless the field already failed.
    pub fn add(&mut self, field: Field, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed for {} field(s)", self.0.len())?;
        for (field, message) in &self.0 {
            write!(f, "; {}: {}", field, message)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

pub type ValidationResult = Result<ValidRegistration, FieldErrors>;

struct TextRule {
    field: Field,
    min: usize,
    max: usize,
    too_short: &'static str,
    too_long: &'static str,
}

const FULL_NAME: TextRule = TextRule {
    field: Field::FullName,
    min: 2,
    max: 100,
    too_short: "Full name must be at least 2 characters",
    too_long: "Full name must be less than 100 characters",
};

const DESIGNATION: TextRule = TextRule {
    field: Field::Designation,
    min: 2,
    max: 100,
    too_short: "Designation is required",
    too_long: "Designation must be less than 100 characters",
};

const ORGANIZATION: TextRule = TextRule {
    field: Field::Organization,
    min: 2,
    max: 150,
    too_short: "Organization name is required",
    too_long: "Organization name must be less than 150 characters",
};

const CONTACT: TextRule = TextRule {
    field: Field::Contact,
    min: 10,
    max: 20,
    too_short: "Contact number must be at least 10 digits",
    too_long: "Contact number must be less than 20 characters",
};

const EMAIL_MAX: usize = 255;
const HOSPITAL_MIN: usize = 2;
const HOSPITAL_MAX: usize = 150;

const DOCTOR_FIELDS_REQUIRED: &str = "Hospital name and specialty are required for doctors";

impl TextRule {
    fn check<'a>(&self, value: &'a str, errors: &mut FieldErrors) -> &'a str {
        let trimmed = value.trim();
        let len = trimmed.chars().count();
        if len < self.min {
            errors.add(self.field, self.too_short);
        } else if len > self.max {
            errors.add(self.field, self.too_long);
        }
        trimmed
    }
}

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[a-z0-9_'+\-.]*[a-z0-9_+\-]@([a-z0-9][a-z0-9\-]*\.)+[a-z]{2,}$")
        .expect("email regex should compile")
});

pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL_PATTERN.is_match(email)
}

fn check_email<'a>(value: &'a str, errors: &mut FieldErrors) -> &'a str {
    let trimmed = value.trim();
    if !is_valid_email(trimmed) {
        errors.add(Field::Email, "Invalid email address");
    } else if trimmed.chars().count() > EMAIL_MAX {
        errors.add(Field::Email, "Email must be less than 255 characters");
    }
    trimmed
}

/// Type is checked before size so a disallowed format always reports as such.
fn check_photo(photo: Option<&PhotoUpload>, errors: &mut FieldErrors) {
    match photo {
        None => errors.add(Field::Photo, "Photo is required"),
        Some(photo) if !photo.has_accepted_type() => errors.add(
            Field::Photo,
            "Only .jpg, .jpeg, .png and .webp formats are supported",
        ),
        Some(photo) if !photo.within_size_limit() => {
            errors.add(Field::Photo, "File size must be less than 5MB")
        }
        Some(_) => {}
    }
}

fn check_declarations(draft: &RegistrationDraft, errors: &mut FieldErrors) {
    if !draft.confirm_accuracy {
        errors.add(
            Field::ConfirmAccuracy,
            "You must confirm the accuracy of information",
        );
    }
    if !draft.consent_usage {
        errors.add(
            Field::ConsentUsage,
            "You must consent to the use of your content",
        );
    }
    if !draft.agree_terms {
        errors.add(Field::AgreeTerms, "You must agree to the Terms and Conditions");
    }
}

/// Doctor sub-fields. Returns the member kind when the rule holds.
fn check_doctor(draft: &RegistrationDraft, errors: &mut FieldErrors) -> Option<MemberKind> {
    if !draft.is_doctor {
        return Some(MemberKind::Standard);
    }

    let hospital = draft.hospital_name.as_deref().unwrap_or_default().trim();
    let hospital_len = hospital.chars().count();
    if hospital_len > HOSPITAL_MAX {
        errors.add(
            Field::HospitalName,
            "Hospital name must be less than 150 characters",
        );
    }

    let specialty_raw = draft.specialty.as_deref().unwrap_or_default().trim();
    let specialty = if specialty_raw.is_empty() {
        None
    } else {
        match specialty_raw.parse::<Specialty>() {
            Ok(specialty) => Some(specialty),
            Err(_) => {
                errors.add(Field::Specialty, "Select a valid specialty");
                None
            }
        }
    };

    match specialty {
        Some(specialty) if hospital_len >= HOSPITAL_MIN => {
            (hospital_len <= HOSPITAL_MAX).then(|| MemberKind::Doctor {
                hospital_name: hospital.to_string(),
                specialty,
            })
        }
        _ => {
            errors.add(Field::HospitalName, DOCTOR_FIELDS_REQUIRED);
            None
        }
    }
}

/// Validates a draft against every rule.
///
/// Pure: the same draft always yields the same result.
pub fn validate(draft: &RegistrationDraft) -> ValidationResult {
    let mut errors = FieldErrors::new();

    let full_name = FULL_NAME.check(&draft.full_name, &mut errors);
    let designation = DESIGNATION.check(&draft.designation, &mut errors);
    let organization = ORGANIZATION.check(&draft.organization, &mut errors);
    let email = check_email(&draft.email, &mut errors);
    let contact = CONTACT.check(&draft.contact, &mut errors);
    check_photo(draft.photo.as_ref(), &mut errors);
    check_declarations(draft, &mut errors);
    let kind = check_doctor(draft, &mut errors);

    match (kind, &draft.photo) {
        (Some(kind), Some(photo)) if errors.is_empty() => Ok(ValidRegistration {
            full_name: full_name.to_string(),
            designation: designation.to_string(),
            organization: organization.to_string(),
            email: email.to_string(),
            contact: contact.to_string(),
            photo: photo.clone(),
            kind,
        }),
        _ => Err(errors),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> RegistrationDraft {
        RegistrationDraft {
            full_name: "  Jane Roe ".into(),
            designation: "Senior Manager".into(),
            organization: "Acme Corporation".into(),
            email: "jane.roe@example.com".into(),
            contact: "+1 555 123 4567".into(),
            ..Default::default()
        }
        .with_photo(PhotoUpload::new("jane.jpg", "image/jpeg", vec![0xFF; 64]))
        .with_declarations(true)
    }

    #[test]
    fn accepts_standard_member_and_trims() {
        let valid = validate(&draft()).unwrap();
        assert_eq!(valid.full_name, "Jane Roe");
        assert_eq!(valid.kind, MemberKind::Standard);
    }

    #[test]
    fn email_syntax() {
        assert!(is_valid_email("a.b+c@sub.example.org"));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email(".lead@example.com"));
        assert!(!is_valid_email("double..dot@example.com"));
        assert!(!is_valid_email("trailing.@example.com"));
        assert!(!is_valid_email("user@example"));
    }

    #[test]
    fn email_too_long() {
        let mut d = draft();
        d.email = format!("{}@example.com", "a".repeat(250));
        let errors = validate(&d).unwrap_err();
        assert_eq!(
            errors.get(Field::Email),
            Some("Email must be less than 255 characters")
        );
    }

    #[test]
    fn length_bounds_count_characters_after_trim() {
        let mut d = draft();
        d.full_name = " J ".into();
        d.contact = "1".repeat(21);
        let errors = validate(&d).unwrap_err();
        assert_eq!(
            errors.get(Field::FullName),
            Some("Full name must be at least 2 characters")
        );
        assert_eq!(
            errors.get(Field::Contact),
            Some("Contact number must be less than 20 characters")
        );
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn unknown_specialty_is_reported_on_specialty() {
        let d = draft().as_doctor("City General Hospital", "podiatry");
        let errors = validate(&d).unwrap_err();
        assert_eq!(errors.get(Field::Specialty), Some("Select a valid specialty"));
        assert_eq!(errors.get(Field::HospitalName), Some(DOCTOR_FIELDS_REQUIRED));
    }

    #[test]
    fn overlong_hospital_name() {
        let d = draft().as_doctor("H".repeat(151), "oncology");
        let errors = validate(&d).unwrap_err();
        assert_eq!(
            errors.get(Field::HospitalName),
            Some("Hospital name must be less than 150 characters")
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn display_lists_fields() {
        let mut errors = FieldErrors::new();
        errors.add(Field::Email, "Invalid email address");
        errors.add(Field::Email, "ignored");
        assert_eq!(
            errors.to_string(),
            "Validation failed for 1 field(s); email: Invalid email address"
        );
    }
}
