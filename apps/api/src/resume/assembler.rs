//! Record assembler: one upstream detail payload → one canonical record.

use crate::resume::models::{
    RecordMetadata, ResumeProfile, ResumeRecord, ResumeRecordWithId, RowKey,
};
use crate::resume::normalize::{
    normalize_awards, normalize_church_appointments, normalize_discipline, normalize_education,
    normalize_family, normalize_profile, normalize_qualifications, normalize_remarks,
    normalize_training, normalize_work_experience,
};
use crate::upstream::models::ResumeDetail;

/// Builds the canonical record. Never fails; absent sub-collections are empty.
///
/// The first personal profile is the profile source. Without one, the record
/// name stands in as the Korean name and every other profile field is blank.
pub fn assemble(detail: ResumeDetail) -> ResumeRecordWithId {
    let record_name = detail.name.as_deref().map(str::trim).unwrap_or_default();

    let profile = match detail.personal_profiles.as_deref().and_then(<[_]>::first) {
        Some(item) => normalize_profile(item),
        None => ResumeProfile {
            key: RowKey::for_upstream(&format!("{}/profile", detail.id)),
            korean_name: record_name.to_string(),
            ..Default::default()
        },
    };

    let record = ResumeRecord {
        profile,
        education: normalize_education(detail.education_history.as_deref()),
        training: normalize_training(detail.training_programs.as_deref()),
        qualifications: normalize_qualifications(detail.certifications.as_deref()),
        family: normalize_family(detail.family_members.as_deref()),
        work_experience: normalize_work_experience(detail.work_experience.as_deref()),
        church_appointments: normalize_church_appointments(
            detail.organizational_activities.as_deref(),
        ),
        awards: normalize_awards(detail.awards.as_deref()),
        discipline: normalize_discipline(detail.discipline_records.as_deref()),
        remarks: normalize_remarks(detail.additional_remarks.as_deref()),
    };

    let metadata = RecordMetadata {
        display_name: record_name.to_string(),
        status: detail.status.unwrap_or_default(),
        version: detail.version.unwrap_or_default(),
        language: detail.language.unwrap_or_default(),
        purpose: detail.purpose.unwrap_or_default(),
        notes: detail.notes.unwrap_or_default(),
        updated_at: detail
            .updated_at
            .as_ref()
            .map(|ts| ts.to_iso_string())
            .unwrap_or_default(),
    };

    ResumeRecordWithId {
        id: detail.id,
        record,
        metadata,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::models::{DegreeType, GraduationStatus};
    use crate::upstream::models::{EducationItem, ProfileItem, UpstreamTimestamp};

    fn detail() -> ResumeDetail {
        ResumeDetail {
            id: "r1".to_string(),
            name: Some("HR record".to_string()),
            status: Some("active".to_string()),
            version: Some("7".to_string()),
            language: Some("ko".to_string()),
            purpose: Some("promotion".to_string()),
            notes: Some("reviewed".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_assemble_without_profiles_uses_record_name() {
        let assembled = assemble(detail());
        assert_eq!(assembled.id, "r1");
        assert_eq!(assembled.record.profile.korean_name, "HR record");
        assert_eq!(assembled.record.profile.email, "");
        assert!(assembled.record.education.is_empty());
        assert!(assembled.record.remarks.is_empty());
        assert_eq!(assembled.metadata.display_name, "HR record");
        assert_eq!(assembled.metadata.version, "7");
        assert_eq!(assembled.metadata.purpose, "promotion");
        assert_eq!(assembled.metadata.updated_at, "");
    }

    #[test]
    fn test_assemble_takes_first_profile() {
        let mut detail = detail();
        detail.personal_profiles = Some(vec![
            ProfileItem {
                name_korean: Some("김철수".to_string()),
                ..Default::default()
            },
            ProfileItem {
                name_korean: Some("이영희".to_string()),
                ..Default::default()
            },
        ]);
        let assembled = assemble(detail);
        assert_eq!(assembled.record.profile.korean_name, "김철수");
        assert_eq!(assembled.display_name(), "김철수");
    }

    #[test]
    fn test_assemble_normalizes_sections() {
        let mut detail = detail();
        detail.education_history = Some(vec![EducationItem {
            id: Some("e1".to_string()),
            institution: Some("Seoul National University".to_string()),
            degree: Some("Bachelor of Arts".to_string()),
            status: Some("Graduated".to_string()),
            end_date: Some("2007-02-20T00:00:00Z".to_string()),
            ..Default::default()
        }]);
        let assembled = assemble(detail);
        let education = &assembled.record.education[0];
        assert_eq!(education.school_name, "Seoul National University");
        assert_eq!(education.degree, DegreeType::Bachelor);
        assert_eq!(education.graduation_status, GraduationStatus::Graduated);
        assert_eq!(education.end_date, "2007-02-20");
    }

    #[test]
    fn test_assemble_converts_millisecond_timestamp() {
        let mut detail = detail();
        detail.updated_at = Some(UpstreamTimestamp::Millis(0));
        assert_eq!(
            assemble(detail).metadata.updated_at,
            "1970-01-01T00:00:00+00:00"
        );
    }

    #[test]
    fn test_assemble_keeps_string_timestamp() {
        let mut detail = detail();
        detail.updated_at = Some(UpstreamTimestamp::Text("2024-05-01 10:00".to_string()));
        assert_eq!(assemble(detail).metadata.updated_at, "2024-05-01 10:00");
    }

    #[test]
    fn test_assemble_is_stable_for_same_payload() {
        let mut detail = detail();
        detail.education_history = Some(vec![EducationItem {
            id: Some("e1".to_string()),
            ..Default::default()
        }]);
        assert_eq!(assemble(detail.clone()), assemble(detail));
    }
}
