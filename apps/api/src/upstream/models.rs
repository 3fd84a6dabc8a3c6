//! Wire shapes of the personnel-record service.
//!
//! Every field is optional and every sub-collection may be absent: the service
//! omits empty collections and nulls out unset columns. Nothing here is shown to
//! the UI directly, `resume::normalize` is the only reader.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Per-section item collections exposed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    PersonalProfiles,
    EducationHistory,
    TrainingPrograms,
    Certifications,
    FamilyMembers,
    WorkExperience,
    OrganizationalActivities,
    Awards,
    DisciplineRecords,
    AdditionalRemarks,
}

impl Collection {
    pub const ALL: [Collection; 10] = [
        Collection::PersonalProfiles,
        Collection::EducationHistory,
        Collection::TrainingPrograms,
        Collection::Certifications,
        Collection::FamilyMembers,
        Collection::WorkExperience,
        Collection::OrganizationalActivities,
        Collection::Awards,
        Collection::DisciplineRecords,
        Collection::AdditionalRemarks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::PersonalProfiles => "personal_profiles",
            Collection::EducationHistory => "education_history",
            Collection::TrainingPrograms => "training_programs",
            Collection::Certifications => "certifications",
            Collection::FamilyMembers => "family_members",
            Collection::WorkExperience => "work_experience",
            Collection::OrganizationalActivities => "organizational_activities",
            Collection::Awards => "awards",
            Collection::DisciplineRecords => "discipline_records",
            Collection::AdditionalRemarks => "additional_remarks",
        }
    }
}

/// `updated_at` arrives either as an ISO string or as epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UpstreamTimestamp {
    Millis(i64),
    Text(String),
}

impl UpstreamTimestamp {
    pub fn now() -> Self {
        UpstreamTimestamp::Text(Utc::now().to_rfc3339())
    }

    /// Millisecond timestamps become RFC 3339; strings are passed through untouched.
    pub fn to_iso_string(&self) -> String {
        match self {
            UpstreamTimestamp::Millis(ms) => DateTime::<Utc>::from_timestamp_millis(*ms)
                .map(|dt| dt.to_rfc3339())
                .unwrap_or_default(),
            UpstreamTimestamp::Text(text) => text.clone(),
        }
    }
}

/// Numeric columns sometimes come back as strings (`"8"`, `"12.5"`).
/// Blank or unparsable text reads as absent.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Value(f64),
        Text(String),
    }

    Ok(match Option::<Number>::deserialize(deserializer)? {
        Some(Number::Value(value)) => Some(value),
        Some(Number::Text(text)) => text.trim().parse().ok(),
        None => None,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeSummary {
    pub id: String,
    pub name: Option<String>,
    pub status: Option<String>,
    pub version: Option<String>,
    pub language: Option<String>,
    pub purpose: Option<String>,
    pub notes: Option<String>,
    pub user_id: Option<String>,
    pub is_current: Option<bool>,
    pub updated_at: Option<UpstreamTimestamp>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResumeDetail {
    pub id: String,
    pub name: Option<String>,
    pub status: Option<String>,
    pub version: Option<String>,
    pub language: Option<String>,
    pub purpose: Option<String>,
    pub notes: Option<String>,
    pub user_id: Option<String>,
    pub is_current: Option<bool>,
    pub updated_at: Option<UpstreamTimestamp>,
    pub personal_profiles: Option<Vec<ProfileItem>>,
    pub education_history: Option<Vec<EducationItem>>,
    pub training_programs: Option<Vec<TrainingProgramItem>>,
    pub certifications: Option<Vec<CertificationItem>>,
    pub family_members: Option<Vec<FamilyMemberItem>>,
    pub work_experience: Option<Vec<WorkExperienceItem>>,
    pub organizational_activities: Option<Vec<OrganizationalActivityItem>>,
    pub awards: Option<Vec<AwardItem>>,
    pub discipline_records: Option<Vec<DisciplineRecordItem>>,
    pub additional_remarks: Option<Vec<AdditionalRemarkItem>>,
}

impl ResumeDetail {
    /// Upstream ids of the items currently stored for `collection`.
    pub fn item_ids(&self, collection: Collection) -> Vec<String> {
        fn ids<T>(items: &Option<Vec<T>>, id: impl Fn(&T) -> Option<&String>) -> Vec<String> {
            items
                .iter()
                .flatten()
                .filter_map(|item| id(item).cloned())
                .collect()
        }

        match collection {
            Collection::PersonalProfiles => ids(&self.personal_profiles, |i| i.id.as_ref()),
            Collection::EducationHistory => ids(&self.education_history, |i| i.id.as_ref()),
            Collection::TrainingPrograms => ids(&self.training_programs, |i| i.id.as_ref()),
            Collection::Certifications => ids(&self.certifications, |i| i.id.as_ref()),
            Collection::FamilyMembers => ids(&self.family_members, |i| i.id.as_ref()),
            Collection::WorkExperience => ids(&self.work_experience, |i| i.id.as_ref()),
            Collection::OrganizationalActivities => {
                ids(&self.organizational_activities, |i| i.id.as_ref())
            }
            Collection::Awards => ids(&self.awards, |i| i.id.as_ref()),
            Collection::DisciplineRecords => ids(&self.discipline_records, |i| i.id.as_ref()),
            Collection::AdditionalRemarks => ids(&self.additional_remarks, |i| i.id.as_ref()),
        }
    }
}

/// Body of the create-record call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewResume {
    pub name: String,
    pub language: String,
    pub purpose: String,
    pub user_id: String,
    pub status: String,
    pub is_current: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileItem {
    pub id: Option<String>,
    pub name_korean: Option<String>,
    pub name_hanja: Option<String>,
    pub name_english: Option<String>,
    pub resident_registration_number: Option<String>,
    pub birth_date: Option<String>,
    pub nationality: Option<String>,
    pub department: Option<String>,
    pub extension: Option<String>,
    pub mobile: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub blessing_date: Option<String>,
    pub appointment_date: Option<String>,
    pub organization: Option<String>,
    pub position: Option<String>,
    pub email: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationItem {
    pub id: Option<String>,
    pub institution: Option<String>,
    pub major: Option<String>,
    pub degree: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingProgramItem {
    pub id: Option<String>,
    pub program_name: Option<String>,
    pub category: Option<String>,
    pub organizing_institution: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub hours: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificationItem {
    pub id: Option<String>,
    pub certification_name: Option<String>,
    pub issuing_authority: Option<String>,
    pub acquisition_date: Option<String>,
    pub certificate_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FamilyMemberItem {
    pub id: Option<String>,
    pub member_name: Option<String>,
    pub relationship: Option<String>,
    pub birth_date: Option<String>,
    pub occupation: Option<String>,
    pub contact: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkExperienceItem {
    pub id: Option<String>,
    pub company_name: Option<String>,
    pub department: Option<String>,
    pub position: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrganizationalActivityItem {
    pub id: Option<String>,
    pub organization_name: Option<String>,
    pub role: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AwardItem {
    pub id: Option<String>,
    pub award_name: Option<String>,
    pub award_date: Option<String>,
    pub awarding_body: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisciplineRecordItem {
    pub id: Option<String>,
    pub action_type: Option<String>,
    pub action_date: Option<String>,
    pub issued_by: Option<String>,
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalRemarkItem {
    pub id: Option<String>,
    pub category: Option<String>,
    pub content: Option<String>,
    pub recorded_at: Option<String>,
}
