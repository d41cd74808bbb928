//! Read-only member directory: registrations split into doctors and members

use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::registration::backend::RegistrationBackend;
use crate::registration::error::BackendError;
use crate::registration::notify::{Notification, Notifier};
use crate::registration::submission::RegistrationRecord;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DirectoryEntry {
    #[serde(flatten)]
    pub record: RegistrationRecord,
    pub initials: String,
    pub affiliation: String,
}

impl DirectoryEntry {
    pub fn new(record: RegistrationRecord) -> Self {
        let initials = initials(&record.full_name);
        let affiliation = affiliation(&record);
        Self {
            record,
            initials,
            affiliation,
        }
    }
}

/// First letter of each name part, uppercased: "jane van roe" -> "JVR".
pub fn initials(full_name: &str) -> String {
    full_name
        .split_whitespace()
        .filter_map(|part| part.chars().next())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Hospital and specialty for doctors, organization for everyone else.
pub fn affiliation(record: &RegistrationRecord) -> String {
    if !record.is_doctor {
        return record.organization.clone();
    }
    let hospital = record.hospital_name.as_deref().unwrap_or_default();
    match record.specialty_label() {
        Some(label) => format!("{} · {}", hospital, label),
        None => hospital.to_string(),
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DirectoryListing {
    pub doctors: Vec<DirectoryEntry>,
    pub members: Vec<DirectoryEntry>,
}

impl DirectoryListing {
    /// Splits on `is_doctor`, keeping the order the backend returned.
    pub fn from_records(records: Vec<RegistrationRecord>) -> Self {
        let (doctors, members): (Vec<_>, Vec<_>) =
            records.into_iter().partition(|record| record.is_doctor);

        Self {
            doctors: doctors.into_iter().map(DirectoryEntry::new).collect(),
            members: members.into_iter().map(DirectoryEntry::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.doctors.len() + self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doctors.is_empty() && self.members.is_empty()
    }
}

pub struct Directory {
    backend: Arc<dyn RegistrationBackend>,
    notifier: Arc<dyn Notifier>,
}

impl Directory {
    pub fn new(backend: Arc<dyn RegistrationBackend>, notifier: Arc<dyn Notifier>) -> Self {
        Self { backend, notifier }
    }

    pub async fn load(&self) -> Result<DirectoryListing, BackendError> {
        match self.backend.list_registrations().await {
            Ok(records) => {
                let listing = DirectoryListing::from_records(records);
                info!(
                    "Loaded directory: {} doctor(s), {} member(s)",
                    listing.doctors.len(),
                    listing.members.len()
                );
                Ok(listing)
            }
            Err(e) => {
                error!("Error fetching registrations: {}", e);
                self.notifier.notify(Notification::directory_unavailable());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, doctor: bool) -> RegistrationRecord {
        RegistrationRecord {
            id: name.to_lowercase(),
            full_name: name.into(),
            designation: "Consultant".into(),
            organization: "Acme".into(),
            email: "x@example.com".into(),
            contact: "5551234567".into(),
            photo_url: "memory://photos/x.png".into(),
            is_doctor: doctor,
            hospital_name: doctor.then(|| "St Mary".to_string()),
            specialty: doctor.then(|| "neurology".to_string()),
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn partitions_in_backend_order() {
        let listing = DirectoryListing::from_records(vec![
            record("Amir", true),
            record("Bea", false),
            record("Carol", false),
            record("Zed", true),
        ]);

        let doctors: Vec<_> = listing.doctors.iter().map(|e| e.record.full_name.as_str()).collect();
        let members: Vec<_> = listing.members.iter().map(|e| e.record.full_name.as_str()).collect();
        assert_eq!(doctors, ["Amir", "Zed"]);
        assert_eq!(members, ["Bea", "Carol"]);
        assert_eq!(listing.len(), 4);
    }

    #[test]
    fn keeps_mixed_case_order_from_backend() {
        let listing = DirectoryListing::from_records(vec![
            record("alice", false),
            record("Bob", false),
            record("Émile", true),
            record("Zed", false),
        ]);

        let members: Vec<_> = listing.members.iter().map(|e| e.record.full_name.as_str()).collect();
        assert_eq!(members, ["alice", "Bob", "Zed"]);
        assert_eq!(listing.doctors[0].record.full_name, "Émile");
    }

    #[test]
    fn entry_presentation() {
        assert_eq!(initials("jane  van roe"), "JVR");
        assert_eq!(initials(""), "");

        let doctor = DirectoryEntry::new(record("Amir Khan", true));
        assert_eq!(doctor.initials, "AK");
        assert_eq!(doctor.affiliation, "St Mary · Neurology");

        let member = DirectoryEntry::new(record("Bea", false));
        assert_eq!(member.affiliation, "Acme");

        let mut blank = record("Old Row", true);
        blank.specialty = Some(String::new());
        assert_eq!(DirectoryEntry::new(blank).affiliation, "St Mary");
    }

    #[test]
    fn empty_directory() {
        assert!(DirectoryListing::from_records(Vec::new()).is_empty());
    }
}
