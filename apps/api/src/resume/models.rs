use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::upstream::Collection;

pub const UNNAMED_PROFILE: &str = "Unnamed profile";

// ────────────────────────────────────────────────────────────────────────────
// Row identity
// ────────────────────────────────────────────────────────────────────────────

/// Client-side identity of an editable row.
///
/// Rows that came from the service get a key derived from their upstream id, so
/// normalizing the same item twice yields the same key. Rows created locally get
/// a random key. Keys are never sent upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowKey(pub Uuid);

impl RowKey {
    pub fn for_upstream(id: &str) -> Self {
        RowKey(Uuid::new_v5(&Uuid::NAMESPACE_OID, id.as_bytes()))
    }
}

impl Default for RowKey {
    fn default() -> Self {
        RowKey(Uuid::new_v4())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Closed enumerations
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraduationStatus {
    #[default]
    Enrolled,
    Graduated,
    Completed,
    DroppedOut,
    OnLeave,
}

impl GraduationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GraduationStatus::Enrolled => "enrolled",
            GraduationStatus::Graduated => "graduated",
            GraduationStatus::Completed => "completed",
            GraduationStatus::DroppedOut => "dropped_out",
            GraduationStatus::OnLeave => "on_leave",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FamilyRelation {
    Father,
    Mother,
    Husband,
    Wife,
    OlderBrother,
    YoungerBrother,
    OlderSister,
    YoungerSister,
    Son,
    Daughter,
    #[default]
    Other,
}

impl FamilyRelation {
    pub fn as_str(&self) -> &'static str {
        match self {
            FamilyRelation::Father => "father",
            FamilyRelation::Mother => "mother",
            FamilyRelation::Husband => "husband",
            FamilyRelation::Wife => "wife",
            FamilyRelation::OlderBrother => "older_brother",
            FamilyRelation::YoungerBrother => "younger_brother",
            FamilyRelation::OlderSister => "older_sister",
            FamilyRelation::YoungerSister => "younger_sister",
            FamilyRelation::Son => "son",
            FamilyRelation::Daughter => "daughter",
            FamilyRelation::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegreeType {
    HighSchool,
    Associate,
    Bachelor,
    Master,
    Doctorate,
    #[default]
    Other,
}

impl DegreeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DegreeType::HighSchool => "high_school",
            DegreeType::Associate => "associate",
            DegreeType::Bachelor => "bachelor",
            DegreeType::Master => "master",
            DegreeType::Doctorate => "doctorate",
            DegreeType::Other => "other",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Profile and section entries
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeProfile {
    #[serde(default)]
    pub key: RowKey,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub korean_name: String,
    #[serde(default)]
    pub hanja_name: String,
    #[serde(default)]
    pub first_name_english: String,
    #[serde(default)]
    pub last_name_english: String,
    #[serde(default)]
    pub resident_number: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub nationality: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub extension_number: String,
    #[serde(default)]
    pub mobile_phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub blessing_date: String,
    #[serde(default)]
    pub appointment_date: String,
    #[serde(default)]
    pub affiliation: String,
    #[serde(default)]
    pub position_title: String,
    /// Local-only; the service has no column for it.
    #[serde(default)]
    pub rank_title: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub photo_url: String,
}

impl ResumeProfile {
    pub fn english_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name_english.trim(),
            self.last_name_english.trim()
        )
        .trim()
        .to_string()
    }

    /// Korean name, then English name, then the record name, then a placeholder.
    pub fn display_name(&self, record_name: Option<&str>) -> String {
        let korean = self.korean_name.trim();
        if !korean.is_empty() {
            return korean.to_string();
        }
        let english = self.english_name();
        if !english.is_empty() {
            return english;
        }
        match record_name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => UNNAMED_PROFILE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationHistoryEntry {
    #[serde(default)]
    pub key: RowKey,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub school_name: String,
    #[serde(default)]
    pub major: String,
    #[serde(default)]
    pub degree: DegreeType,
    #[serde(default)]
    pub graduation_status: GraduationStatus,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub location: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingHistoryEntry {
    #[serde(default)]
    pub key: RowKey,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub hours: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualificationEntry {
    #[serde(default)]
    pub key: RowKey,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub acquired_date: String,
    #[serde(default)]
    pub license_number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyInfoEntry {
    #[serde(default)]
    pub key: RowKey,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub relation: FamilyRelation,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub occupation: String,
    #[serde(default)]
    pub contact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkExperienceEntry {
    #[serde(default)]
    pub key: RowKey,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub final_position: String,
    #[serde(default)]
    pub start_date: String,
    /// Blank while the position is held.
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub responsibilities: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChurchAppointmentEntry {
    #[serde(default)]
    pub key: RowKey,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwardEntry {
    #[serde(default)]
    pub key: RowKey,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub award_type: String,
    #[serde(default)]
    pub award_date: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisciplineEntry {
    #[serde(default)]
    pub key: RowKey,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub discipline_type: String,
    #[serde(default)]
    pub discipline_date: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpecialRemarkEntry {
    #[serde(default)]
    pub key: RowKey,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub recorded_date: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Records
// ────────────────────────────────────────────────────────────────────────────

/// A full personnel record. Entry order is display order; index 0 is the most
/// recent entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub profile: ResumeProfile,
    pub education: Vec<EducationHistoryEntry>,
    pub training: Vec<TrainingHistoryEntry>,
    pub qualifications: Vec<QualificationEntry>,
    pub family: Vec<FamilyInfoEntry>,
    pub work_experience: Vec<WorkExperienceEntry>,
    pub church_appointments: Vec<ChurchAppointmentEntry>,
    pub awards: Vec<AwardEntry>,
    pub discipline: Vec<DisciplineEntry>,
    pub remarks: Vec<SpecialRemarkEntry>,
}

impl ResumeRecord {
    pub fn section(&self, key: SectionKey) -> SectionPayload {
        match key {
            SectionKey::Profile => SectionPayload::Profile(self.profile.clone()),
            SectionKey::Education => SectionPayload::Education(self.education.clone()),
            SectionKey::Training => SectionPayload::Training(self.training.clone()),
            SectionKey::Qualifications => {
                SectionPayload::Qualifications(self.qualifications.clone())
            }
            SectionKey::Family => SectionPayload::Family(self.family.clone()),
            SectionKey::WorkExperience => {
                SectionPayload::WorkExperience(self.work_experience.clone())
            }
            SectionKey::ChurchAppointments => {
                SectionPayload::ChurchAppointments(self.church_appointments.clone())
            }
            SectionKey::Awards => SectionPayload::Awards(self.awards.clone()),
            SectionKey::Discipline => SectionPayload::Discipline(self.discipline.clone()),
            SectionKey::Remarks => SectionPayload::Remarks(self.remarks.clone()),
        }
    }

    /// Swaps in one section, leaving the profile and every other section as is.
    pub fn replace_section(&mut self, payload: SectionPayload) {
        match payload {
            SectionPayload::Profile(profile) => self.profile = profile,
            SectionPayload::Education(entries) => self.education = entries,
            SectionPayload::Training(entries) => self.training = entries,
            SectionPayload::Qualifications(entries) => self.qualifications = entries,
            SectionPayload::Family(entries) => self.family = entries,
            SectionPayload::WorkExperience(entries) => self.work_experience = entries,
            SectionPayload::ChurchAppointments(entries) => self.church_appointments = entries,
            SectionPayload::Awards(entries) => self.awards = entries,
            SectionPayload::Discipline(entries) => self.discipline = entries,
            SectionPayload::Remarks(entries) => self.remarks = entries,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub display_name: String,
    pub status: String,
    pub version: String,
    pub language: String,
    pub purpose: String,
    pub notes: String,
    /// ISO-8601, or whatever string the service sent.
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeRecordWithId {
    pub id: String,
    #[serde(flatten)]
    pub record: ResumeRecord,
    pub metadata: RecordMetadata,
}

impl ResumeRecordWithId {
    pub fn display_name(&self) -> String {
        self.record
            .profile
            .display_name(Some(&self.metadata.display_name))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    Profile,
    Education,
    Training,
    Qualifications,
    Family,
    WorkExperience,
    ChurchAppointments,
    Awards,
    Discipline,
    Remarks,
}

impl SectionKey {
    pub const ALL: [SectionKey; 10] = [
        SectionKey::Profile,
        SectionKey::Education,
        SectionKey::Training,
        SectionKey::Qualifications,
        SectionKey::Family,
        SectionKey::WorkExperience,
        SectionKey::ChurchAppointments,
        SectionKey::Awards,
        SectionKey::Discipline,
        SectionKey::Remarks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::Profile => "profile",
            SectionKey::Education => "education",
            SectionKey::Training => "training",
            SectionKey::Qualifications => "qualifications",
            SectionKey::Family => "family",
            SectionKey::WorkExperience => "work_experience",
            SectionKey::ChurchAppointments => "church_appointments",
            SectionKey::Awards => "awards",
            SectionKey::Discipline => "discipline",
            SectionKey::Remarks => "remarks",
        }
    }

    pub fn collection(&self) -> Collection {
        match self {
            SectionKey::Profile => Collection::PersonalProfiles,
            SectionKey::Education => Collection::EducationHistory,
            SectionKey::Training => Collection::TrainingPrograms,
            SectionKey::Qualifications => Collection::Certifications,
            SectionKey::Family => Collection::FamilyMembers,
            SectionKey::WorkExperience => Collection::WorkExperience,
            SectionKey::ChurchAppointments => Collection::OrganizationalActivities,
            SectionKey::Awards => Collection::Awards,
            SectionKey::Discipline => Collection::DisciplineRecords,
            SectionKey::Remarks => Collection::AdditionalRemarks,
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        SectionKey::ALL
            .into_iter()
            .find(|key| key.as_str() == normalized)
            .ok_or_else(|| format!("Unknown section '{s}'"))
    }
}

/// One section's worth of data, as edited and persisted as a unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "section", content = "entries", rename_all = "snake_case")]
pub enum SectionPayload {
    Profile(ResumeProfile),
    Education(Vec<EducationHistoryEntry>),
    Training(Vec<TrainingHistoryEntry>),
    Qualifications(Vec<QualificationEntry>),
    Family(Vec<FamilyInfoEntry>),
    WorkExperience(Vec<WorkExperienceEntry>),
    ChurchAppointments(Vec<ChurchAppointmentEntry>),
    Awards(Vec<AwardEntry>),
    Discipline(Vec<DisciplineEntry>),
    Remarks(Vec<SpecialRemarkEntry>),
}

impl SectionPayload {
    /// Parses the body of a section save, where the section is known from the URL.
    pub fn from_json(key: SectionKey, entries: Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(json!({ "section": key.as_str(), "entries": entries }))
    }

    pub fn key(&self) -> SectionKey {
        match self {
            SectionPayload::Profile(_) => SectionKey::Profile,
            SectionPayload::Education(_) => SectionKey::Education,
            SectionPayload::Training(_) => SectionKey::Training,
            SectionPayload::Qualifications(_) => SectionKey::Qualifications,
            SectionPayload::Family(_) => SectionKey::Family,
            SectionPayload::WorkExperience(_) => SectionKey::WorkExperience,
            SectionPayload::ChurchAppointments(_) => SectionKey::ChurchAppointments,
            SectionPayload::Awards(_) => SectionKey::Awards,
            SectionPayload::Discipline(_) => SectionKey::Discipline,
            SectionPayload::Remarks(_) => SectionKey::Remarks,
        }
    }

    /// Number of rows; the profile counts as one.
    pub fn len(&self) -> usize {
        match self {
            SectionPayload::Profile(_) => 1,
            SectionPayload::Education(e) => e.len(),
            SectionPayload::Training(e) => e.len(),
            SectionPayload::Qualifications(e) => e.len(),
            SectionPayload::Family(e) => e.len(),
            SectionPayload::WorkExperience(e) => e.len(),
            SectionPayload::ChurchAppointments(e) => e.len(),
            SectionPayload::Awards(e) => e.len(),
            SectionPayload::Discipline(e) => e.len(),
            SectionPayload::Remarks(e) => e.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
