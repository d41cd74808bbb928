use member_registry::registration::{
    validate, Field, MemberKind, PhotoUpload, RegistrationDraft, Specialty, MAX_PHOTO_BYTES,
};

fn valid_draft() -> RegistrationDraft {
    RegistrationDraft {
        full_name: "John Doe".into(),
        designation: "Senior Manager".into(),
        organization: "Acme Corporation".into(),
        email: "john.doe@example.com".into(),
        contact: "+1 (555) 123-4567".into(),
        ..Default::default()
    }
    .with_photo(PhotoUpload::new("john.jpg", "image/jpeg", vec![0xAB; 1024]))
    .with_declarations(true)
}

fn failed_fields(draft: &RegistrationDraft) -> Vec<Field> {
    match validate(draft) {
        Ok(_) => Vec::new(),
        Err(errors) => errors.fields().collect(),
    }
}

#[test]
fn valid_standard_member_passes() {
    let valid = validate(&valid_draft()).unwrap();
    assert_eq!(*valid.kind(), MemberKind::Standard);
    assert_eq!(valid.email(), "john.doe@example.com");
    assert_eq!(valid.photo().file_name, "john.jpg");
}

fn clear(field: Field, draft: &mut RegistrationDraft) {
    match field {
        Field::FullName => draft.full_name.clear(),
        Field::Designation => draft.designation = "   ".into(),
        Field::Organization => draft.organization.clear(),
        Field::Email => draft.email.clear(),
        Field::Contact => draft.contact.clear(),
        Field::Photo => draft.photo = None,
        Field::ConfirmAccuracy => draft.confirm_accuracy = false,
        Field::ConsentUsage => draft.consent_usage = false,
        Field::AgreeTerms => draft.agree_terms = false,
        Field::HospitalName | Field::Specialty => {}
    }
}

#[test]
fn each_missing_field_is_reported_alone() {
    for field in [
        Field::FullName,
        Field::Designation,
        Field::Organization,
        Field::Email,
        Field::Contact,
        Field::Photo,
        Field::ConfirmAccuracy,
        Field::ConsentUsage,
        Field::AgreeTerms,
    ] {
        let mut draft = valid_draft();
        clear(field, &mut draft);
        assert_eq!(failed_fields(&draft), vec![field], "clearing {}", field);
    }
}

#[test]
fn all_failures_are_collected() {
    let draft = RegistrationDraft::default();
    let errors = validate(&draft).unwrap_err();

    for field in [
        Field::FullName,
        Field::Designation,
        Field::Organization,
        Field::Email,
        Field::Contact,
        Field::Photo,
        Field::ConfirmAccuracy,
        Field::ConsentUsage,
        Field::AgreeTerms,
    ] {
        assert!(errors.contains(field), "missing error for {}", field);
    }
    assert!(!errors.contains(Field::HospitalName));
    assert_eq!(errors.get(Field::Email), Some("Invalid email address"));
}

#[test]
fn doctor_without_hospital_reports_on_hospital_name() {
    let with_specialty = valid_draft().as_doctor("", "cardiology");
    assert_eq!(failed_fields(&with_specialty), vec![Field::HospitalName]);

    let without_specialty = valid_draft().as_doctor("", "");
    assert_eq!(failed_fields(&without_specialty), vec![Field::HospitalName]);

    let errors = validate(&with_specialty).unwrap_err();
    assert_eq!(
        errors.get(Field::HospitalName),
        Some("Hospital name and specialty are required for doctors")
    );
}

#[test]
fn missing_specialty_surfaces_on_hospital_name() {
    let mut draft = valid_draft().as_doctor("City General Hospital", "");
    draft.specialty = None;
    assert_eq!(failed_fields(&draft), vec![Field::HospitalName]);
}

#[test]
fn one_character_hospital_name_is_too_short() {
    let draft = valid_draft().as_doctor(" X ", "oncology");
    assert_eq!(failed_fields(&draft), vec![Field::HospitalName]);
}

#[test]
fn valid_doctor_becomes_doctor_variant() {
    let draft = valid_draft().as_doctor("  City General Hospital ", "internal-medicine");
    let valid = validate(&draft).unwrap();
    assert_eq!(
        *valid.kind(),
        MemberKind::Doctor {
            hospital_name: "City General Hospital".into(),
            specialty: Specialty::InternalMedicine,
        }
    );
}

#[test]
fn doctor_fields_are_ignored_for_non_doctors() {
    let mut draft = valid_draft();
    draft.is_doctor = false;
    draft.hospital_name = Some("H".repeat(400));
    draft.specialty = Some("not-a-specialty".into());

    let valid = validate(&draft).unwrap();
    assert_eq!(*valid.kind(), MemberKind::Standard);
}

#[test]
fn validation_is_idempotent() {
    let broken = valid_draft().as_doctor("", "");
    assert_eq!(validate(&broken).unwrap_err(), validate(&broken).unwrap_err());

    let ok = valid_draft();
    assert_eq!(
        validate(&ok).unwrap().full_name(),
        validate(&ok).unwrap().full_name()
    );
}

#[test]
fn photo_size_boundary() {
    let exact = valid_draft().with_photo(PhotoUpload::new(
        "big.png",
        "image/png",
        vec![0; MAX_PHOTO_BYTES],
    ));
    assert!(validate(&exact).is_ok());

    let over = valid_draft().with_photo(PhotoUpload::new(
        "bigger.png",
        "image/png",
        vec![0; MAX_PHOTO_BYTES + 1],
    ));
    let errors = validate(&over).unwrap_err();
    assert_eq!(errors.get(Field::Photo), Some("File size must be less than 5MB"));
}

#[test]
fn gif_is_rejected_by_type_at_any_size() {
    for size in [10, MAX_PHOTO_BYTES + 1] {
        let draft = valid_draft().with_photo(PhotoUpload::new(
            "anim.gif",
            "image/gif",
            vec![0; size],
        ));
        let errors = validate(&draft).unwrap_err();
        assert_eq!(
            errors.get(Field::Photo),
            Some("Only .jpg, .jpeg, .png and .webp formats are supported")
        );
    }
}

#[test]
fn every_allowed_type_passes() {
    for content_type in ["image/jpeg", "image/jpg", "image/png", "image/webp"] {
        let draft = valid_draft().with_photo(PhotoUpload::new("p", content_type, vec![1]));
        assert!(validate(&draft).is_ok(), "{} should pass", content_type);
    }
}
