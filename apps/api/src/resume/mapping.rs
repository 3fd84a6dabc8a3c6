//! Field-mapping tables between upstream item shapes and canonical entries,
//! and the canonical → wire encoders used on writes.
//!
//! The tables are the reference for both directions. `normalize` reads exactly
//! the upstream names listed here and the encoders write exactly those names;
//! the tests below hold both sides to the tables.

use serde::Serialize;
use serde_json::Value;

use crate::resume::models::{
    AwardEntry, ChurchAppointmentEntry, DisciplineEntry, EducationHistoryEntry, FamilyInfoEntry,
    QualificationEntry, ResumeProfile, SectionKey, SectionPayload, SpecialRemarkEntry,
    TrainingHistoryEntry, WorkExperienceEntry,
};
use crate::upstream::models::{
    AdditionalRemarkItem, AwardItem, CertificationItem, Collection, DisciplineRecordItem,
    EducationItem, FamilyMemberItem, OrganizationalActivityItem, ProfileItem,
    TrainingProgramItem, WorkExperienceItem,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Canonical `YYYY-MM-DD`.
    Date,
    Hours,
    Degree,
    GraduationStatus,
    FamilyRelation,
    /// Combined upstream English name; first and last name halves.
    EnglishFirstName,
    EnglishLastName,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    pub upstream: &'static str,
    pub canonical: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Copy)]
pub struct SectionMapping {
    pub section: SectionKey,
    pub collection: Collection,
    pub fields: &'static [FieldMapping],
    /// Canonical fields with no upstream column.
    pub local_only: &'static [&'static str],
}

const fn field(upstream: &'static str, canonical: &'static str, kind: FieldKind) -> FieldMapping {
    FieldMapping {
        upstream,
        canonical,
        kind,
    }
}

pub const PROFILE_MAPPING: SectionMapping = SectionMapping {
    section: SectionKey::Profile,
    collection: Collection::PersonalProfiles,
    fields: &[
        field("name_korean", "korean_name", FieldKind::Text),
        field("name_hanja", "hanja_name", FieldKind::Text),
        field("name_english", "first_name_english", FieldKind::EnglishFirstName),
        field("name_english", "last_name_english", FieldKind::EnglishLastName),
        field("resident_registration_number", "resident_number", FieldKind::Text),
        field("birth_date", "date_of_birth", FieldKind::Date),
        field("nationality", "nationality", FieldKind::Text),
        field("department", "department", FieldKind::Text),
        field("extension", "extension_number", FieldKind::Text),
        field("mobile", "mobile_phone", FieldKind::Text),
        field("address", "address", FieldKind::Text),
        field("notes", "remarks", FieldKind::Text),
        field("blessing_date", "blessing_date", FieldKind::Date),
        field("appointment_date", "appointment_date", FieldKind::Date),
        field("organization", "affiliation", FieldKind::Text),
        field("position", "position_title", FieldKind::Text),
        field("email", "email", FieldKind::Text),
        field("photo_url", "photo_url", FieldKind::Text),
    ],
    local_only: &["rank_title"],
};

pub const EDUCATION_MAPPING: SectionMapping = SectionMapping {
    section: SectionKey::Education,
    collection: Collection::EducationHistory,
    fields: &[
        field("institution", "school_name", FieldKind::Text),
        field("major", "major", FieldKind::Text),
        field("degree", "degree", FieldKind::Degree),
        field("status", "graduation_status", FieldKind::GraduationStatus),
        field("start_date", "start_date", FieldKind::Date),
        field("end_date", "end_date", FieldKind::Date),
        field("location", "location", FieldKind::Text),
    ],
    local_only: &[],
};

pub const TRAINING_MAPPING: SectionMapping = SectionMapping {
    section: SectionKey::Training,
    collection: Collection::TrainingPrograms,
    fields: &[
        field("program_name", "course_name", FieldKind::Text),
        field("category", "category", FieldKind::Text),
        field("organizing_institution", "institution", FieldKind::Text),
        field("start_date", "start_date", FieldKind::Date),
        field("end_date", "end_date", FieldKind::Date),
        field("hours", "hours", FieldKind::Hours),
    ],
    local_only: &[],
};

pub const QUALIFICATION_MAPPING: SectionMapping = SectionMapping {
    section: SectionKey::Qualifications,
    collection: Collection::Certifications,
    fields: &[
        field("certification_name", "name", FieldKind::Text),
        field("issuing_authority", "issuer", FieldKind::Text),
        field("acquisition_date", "acquired_date", FieldKind::Date),
        field("certificate_number", "license_number", FieldKind::Text),
    ],
    local_only: &[],
};

pub const FAMILY_MAPPING: SectionMapping = SectionMapping {
    section: SectionKey::Family,
    collection: Collection::FamilyMembers,
    fields: &[
        field("member_name", "name", FieldKind::Text),
        field("relationship", "relation", FieldKind::FamilyRelation),
        field("birth_date", "birth_date", FieldKind::Date),
        field("occupation", "occupation", FieldKind::Text),
        field("contact", "contact", FieldKind::Text),
    ],
    local_only: &[],
};

pub const WORK_EXPERIENCE_MAPPING: SectionMapping = SectionMapping {
    section: SectionKey::WorkExperience,
    collection: Collection::WorkExperience,
    fields: &[
        field("company_name", "company", FieldKind::Text),
        field("department", "department", FieldKind::Text),
        field("position", "final_position", FieldKind::Text),
        field("start_date", "start_date", FieldKind::Date),
        field("end_date", "end_date", FieldKind::Date),
        field("description", "responsibilities", FieldKind::Text),
    ],
    local_only: &[],
};

pub const CHURCH_APPOINTMENT_MAPPING: SectionMapping = SectionMapping {
    section: SectionKey::ChurchAppointments,
    collection: Collection::OrganizationalActivities,
    fields: &[
        field("organization_name", "organization", FieldKind::Text),
        field("role", "position", FieldKind::Text),
        field("start_date", "start_date", FieldKind::Date),
        field("end_date", "end_date", FieldKind::Date),
        field("description", "notes", FieldKind::Text),
    ],
    local_only: &[],
};

pub const AWARD_MAPPING: SectionMapping = SectionMapping {
    section: SectionKey::Awards,
    collection: Collection::Awards,
    fields: &[
        field("award_name", "award_type", FieldKind::Text),
        field("award_date", "award_date", FieldKind::Date),
        field("awarding_body", "issuer", FieldKind::Text),
        field("description", "description", FieldKind::Text),
    ],
    local_only: &[],
};

pub const DISCIPLINE_MAPPING: SectionMapping = SectionMapping {
    section: SectionKey::Discipline,
    collection: Collection::DisciplineRecords,
    fields: &[
        field("action_type", "discipline_type", FieldKind::Text),
        field("action_date", "discipline_date", FieldKind::Date),
        field("issued_by", "issuer", FieldKind::Text),
        field("reason", "reason", FieldKind::Text),
    ],
    local_only: &[],
};

pub const REMARK_MAPPING: SectionMapping = SectionMapping {
    section: SectionKey::Remarks,
    collection: Collection::AdditionalRemarks,
    fields: &[
        field("category", "category", FieldKind::Text),
        field("content", "content", FieldKind::Text),
        field("recorded_at", "recorded_date", FieldKind::Date),
    ],
    local_only: &[],
};

pub const SECTION_MAPPINGS: [SectionMapping; 10] = [
    PROFILE_MAPPING,
    EDUCATION_MAPPING,
    TRAINING_MAPPING,
    QUALIFICATION_MAPPING,
    FAMILY_MAPPING,
    WORK_EXPERIENCE_MAPPING,
    CHURCH_APPOINTMENT_MAPPING,
    AWARD_MAPPING,
    DISCIPLINE_MAPPING,
    REMARK_MAPPING,
];

pub fn mapping_for(section: SectionKey) -> &'static SectionMapping {
    match section {
        SectionKey::Profile => &PROFILE_MAPPING,
        SectionKey::Education => &EDUCATION_MAPPING,
        SectionKey::Training => &TRAINING_MAPPING,
        SectionKey::Qualifications => &QUALIFICATION_MAPPING,
        SectionKey::Family => &FAMILY_MAPPING,
        SectionKey::WorkExperience => &WORK_EXPERIENCE_MAPPING,
        SectionKey::ChurchAppointments => &CHURCH_APPOINTMENT_MAPPING,
        SectionKey::Awards => &AWARD_MAPPING,
        SectionKey::Discipline => &DISCIPLINE_MAPPING,
        SectionKey::Remarks => &REMARK_MAPPING,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Canonical → wire
// ────────────────────────────────────────────────────────────────────────────

fn opt(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn encode_profile(profile: &ResumeProfile) -> ProfileItem {
    ProfileItem {
        id: profile.id.clone(),
        name_korean: opt(&profile.korean_name),
        name_hanja: opt(&profile.hanja_name),
        name_english: opt(&profile.english_name()),
        resident_registration_number: opt(&profile.resident_number),
        birth_date: opt(&profile.date_of_birth),
        nationality: opt(&profile.nationality),
        department: opt(&profile.department),
        extension: opt(&profile.extension_number),
        mobile: opt(&profile.mobile_phone),
        address: opt(&profile.address),
        notes: opt(&profile.remarks),
        blessing_date: opt(&profile.blessing_date),
        appointment_date: opt(&profile.appointment_date),
        organization: opt(&profile.affiliation),
        position: opt(&profile.position_title),
        email: opt(&profile.email),
        photo_url: opt(&profile.photo_url),
    }
}

pub fn encode_education(entry: &EducationHistoryEntry) -> EducationItem {
    EducationItem {
        id: entry.id.clone(),
        institution: opt(&entry.school_name),
        major: opt(&entry.major),
        degree: Some(entry.degree.as_str().to_string()),
        status: Some(entry.graduation_status.as_str().to_string()),
        start_date: opt(&entry.start_date),
        end_date: opt(&entry.end_date),
        location: opt(&entry.location),
    }
}

pub fn encode_training(entry: &TrainingHistoryEntry) -> TrainingProgramItem {
    TrainingProgramItem {
        id: entry.id.clone(),
        program_name: opt(&entry.course_name),
        category: opt(&entry.category),
        organizing_institution: opt(&entry.institution),
        start_date: opt(&entry.start_date),
        end_date: opt(&entry.end_date),
        hours: entry.hours,
    }
}

pub fn encode_qualification(entry: &QualificationEntry) -> CertificationItem {
    CertificationItem {
        id: entry.id.clone(),
        certification_name: opt(&entry.name),
        issuing_authority: opt(&entry.issuer),
        acquisition_date: opt(&entry.acquired_date),
        certificate_number: opt(&entry.license_number),
    }
}

pub fn encode_family(entry: &FamilyInfoEntry) -> FamilyMemberItem {
    FamilyMemberItem {
        id: entry.id.clone(),
        member_name: opt(&entry.name),
        relationship: Some(entry.relation.as_str().to_string()),
        birth_date: opt(&entry.birth_date),
        occupation: opt(&entry.occupation),
        contact: opt(&entry.contact),
    }
}

pub fn encode_work_experience(entry: &WorkExperienceEntry) -> WorkExperienceItem {
    WorkExperienceItem {
        id: entry.id.clone(),
        company_name: opt(&entry.company),
        department: opt(&entry.department),
        position: opt(&entry.final_position),
        start_date: opt(&entry.start_date),
        end_date: opt(&entry.end_date),
        description: opt(&entry.responsibilities),
    }
}

pub fn encode_church_appointment(entry: &ChurchAppointmentEntry) -> OrganizationalActivityItem {
    OrganizationalActivityItem {
        id: entry.id.clone(),
        organization_name: opt(&entry.organization),
        role: opt(&entry.position),
        start_date: opt(&entry.start_date),
        end_date: opt(&entry.end_date),
        description: opt(&entry.notes),
    }
}

pub fn encode_award(entry: &AwardEntry) -> AwardItem {
    AwardItem {
        id: entry.id.clone(),
        award_name: opt(&entry.award_type),
        award_date: opt(&entry.award_date),
        awarding_body: opt(&entry.issuer),
        description: opt(&entry.description),
    }
}

pub fn encode_discipline(entry: &DisciplineEntry) -> DisciplineRecordItem {
    DisciplineRecordItem {
        id: entry.id.clone(),
        action_type: opt(&entry.discipline_type),
        action_date: opt(&entry.discipline_date),
        issued_by: opt(&entry.issuer),
        reason: opt(&entry.reason),
    }
}

pub fn encode_remark(entry: &SpecialRemarkEntry) -> AdditionalRemarkItem {
    AdditionalRemarkItem {
        id: entry.id.clone(),
        category: opt(&entry.category),
        content: opt(&entry.content),
        recorded_at: opt(&entry.recorded_date),
    }
}

/// Create-call bodies for every row of a section, in order. Ids and null
/// fields are stripped: the service assigns ids and treats absent as null.
pub fn encode_section(payload: &SectionPayload) -> Result<Vec<Value>, serde_json::Error> {
    fn bodies<T, W: Serialize>(
        entries: &[T],
        encode: impl Fn(&T) -> W,
    ) -> Result<Vec<Value>, serde_json::Error> {
        entries
            .iter()
            .map(|entry| serde_json::to_value(encode(entry)).map(create_body))
            .collect()
    }

    match payload {
        SectionPayload::Profile(profile) => {
            Ok(vec![create_body(serde_json::to_value(encode_profile(profile))?)])
        }
        SectionPayload::Education(entries) => bodies(entries, encode_education),
        SectionPayload::Training(entries) => bodies(entries, encode_training),
        SectionPayload::Qualifications(entries) => bodies(entries, encode_qualification),
        SectionPayload::Family(entries) => bodies(entries, encode_family),
        SectionPayload::WorkExperience(entries) => bodies(entries, encode_work_experience),
        SectionPayload::ChurchAppointments(entries) => {
            bodies(entries, encode_church_appointment)
        }
        SectionPayload::Awards(entries) => bodies(entries, encode_award),
        SectionPayload::Discipline(entries) => bodies(entries, encode_discipline),
        SectionPayload::Remarks(entries) => bodies(entries, encode_remark),
    }
}

fn create_body(value: Value) -> Value {
    match value {
        Value::Object(mut map) => {
            map.remove("id");
            map.retain(|_, v| !v.is_null());
            Value::Object(map)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde_json::{json, Map};

    use super::*;
    use crate::resume::assembler::assemble;
    use crate::upstream::models::ResumeDetail;

    const ENGLISH_NAME: &str = "Mary Ann Lee";

    /// Sample wire value for a field, plus the canonical value it must produce.
    fn samples(mapping: &FieldMapping) -> (Value, Value) {
        match mapping.kind {
            FieldKind::Text => {
                let v = format!("{} sample", mapping.upstream);
                (json!(v), json!(v))
            }
            FieldKind::Date => (json!("2021-03-04"), json!("2021-03-04")),
            FieldKind::Hours => (json!(12.5), json!(12.5)),
            FieldKind::Degree => (json!("master"), json!("master")),
            FieldKind::GraduationStatus => (json!("on_leave"), json!("on_leave")),
            FieldKind::FamilyRelation => (json!("older_brother"), json!("older_brother")),
            FieldKind::EnglishFirstName => (json!(ENGLISH_NAME), json!("Mary Ann")),
            FieldKind::EnglishLastName => (json!(ENGLISH_NAME), json!("Lee")),
        }
    }

    fn wire_item(mapping: &SectionMapping) -> Map<String, Value> {
        let mut item = Map::new();
        item.insert("id".to_string(), json!(format!("{}-1", mapping.section)));
        for field in mapping.fields {
            item.insert(field.upstream.to_string(), samples(field).0);
        }
        item
    }

    fn keys(value: &Value) -> BTreeSet<String> {
        value
            .as_object()
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn default_wire_item(collection: Collection) -> Value {
        let value = match collection {
            Collection::PersonalProfiles => serde_json::to_value(ProfileItem::default()),
            Collection::EducationHistory => serde_json::to_value(EducationItem::default()),
            Collection::TrainingPrograms => serde_json::to_value(TrainingProgramItem::default()),
            Collection::Certifications => serde_json::to_value(CertificationItem::default()),
            Collection::FamilyMembers => serde_json::to_value(FamilyMemberItem::default()),
            Collection::WorkExperience => serde_json::to_value(WorkExperienceItem::default()),
            Collection::OrganizationalActivities => {
                serde_json::to_value(OrganizationalActivityItem::default())
            }
            Collection::Awards => serde_json::to_value(AwardItem::default()),
            Collection::DisciplineRecords => serde_json::to_value(DisciplineRecordItem::default()),
            Collection::AdditionalRemarks => serde_json::to_value(AdditionalRemarkItem::default()),
        };
        value.unwrap()
    }

    fn section_json(payload: &SectionPayload) -> Value {
        let value = serde_json::to_value(payload).unwrap();
        match payload {
            SectionPayload::Profile(_) => value["entries"].clone(),
            _ => value["entries"][0].clone(),
        }
    }

    #[test]
    fn test_every_section_has_one_mapping() {
        for key in SectionKey::ALL {
            let mapping = mapping_for(key);
            assert_eq!(mapping.section, key);
            assert_eq!(mapping.collection, key.collection());
        }
    }

    #[test]
    fn test_tables_cover_every_upstream_field() {
        for mapping in SECTION_MAPPINGS {
            let mut expected = keys(&default_wire_item(mapping.collection));
            expected.remove("id");
            let listed: BTreeSet<String> =
                mapping.fields.iter().map(|f| f.upstream.to_string()).collect();
            assert_eq!(listed, expected, "section {}", mapping.section);
        }
    }

    #[test]
    fn test_tables_cover_every_canonical_field() {
        let record = crate::resume::models::ResumeRecord {
            education: vec![Default::default()],
            training: vec![Default::default()],
            qualifications: vec![Default::default()],
            family: vec![Default::default()],
            work_experience: vec![Default::default()],
            church_appointments: vec![Default::default()],
            awards: vec![Default::default()],
            discipline: vec![Default::default()],
            remarks: vec![Default::default()],
            ..Default::default()
        };
        for mapping in SECTION_MAPPINGS {
            let mut expected = keys(&section_json(&record.section(mapping.section)));
            expected.remove("id");
            expected.remove("key");
            let mut listed: BTreeSet<String> =
                mapping.fields.iter().map(|f| f.canonical.to_string()).collect();
            listed.extend(mapping.local_only.iter().map(|f| f.to_string()));
            assert_eq!(listed, expected, "section {}", mapping.section);
        }
    }

    #[test]
    fn test_normalizers_follow_tables() {
        let mut detail = Map::new();
        detail.insert("id".to_string(), json!("r1"));
        for mapping in SECTION_MAPPINGS {
            detail.insert(
                mapping.collection.as_str().to_string(),
                Value::Array(vec![Value::Object(wire_item(&mapping))]),
            );
        }
        let detail: ResumeDetail = serde_json::from_value(Value::Object(detail)).unwrap();
        let assembled = assemble(detail);

        for mapping in SECTION_MAPPINGS {
            let canonical = section_json(&assembled.record.section(mapping.section));
            assert_eq!(
                canonical["id"],
                json!(format!("{}-1", mapping.section)),
                "section {}",
                mapping.section
            );
            for field in mapping.fields {
                assert_eq!(
                    canonical[field.canonical],
                    samples(field).1,
                    "section {} field {}",
                    mapping.section,
                    field.canonical
                );
            }
        }
    }

    #[test]
    fn test_encoders_follow_tables() {
        for mapping in SECTION_MAPPINGS {
            let mut canonical = Map::new();
            for field in mapping.fields {
                canonical.insert(field.canonical.to_string(), samples(field).1);
            }
            let entries = match mapping.section {
                SectionKey::Profile => Value::Object(canonical),
                _ => Value::Array(vec![Value::Object(canonical)]),
            };
            let payload = SectionPayload::from_json(mapping.section, entries).unwrap();
            let bodies = encode_section(&payload).unwrap();
            assert_eq!(bodies.len(), 1);

            let body = &bodies[0];
            for field in mapping.fields {
                assert_eq!(
                    body[field.upstream],
                    samples(field).0,
                    "section {} field {}",
                    mapping.section,
                    field.upstream
                );
            }
            assert!(body.get("id").is_none());
            assert!(body.get("rank_title").is_none());
        }
    }

    #[test]
    fn test_encode_strips_blank_fields_and_ids() {
        let payload = SectionPayload::Awards(vec![AwardEntry {
            id: Some("a1".to_string()),
            award_type: "Merit".to_string(),
            award_date: "2020-05-01".to_string(),
            issuer: "   ".to_string(),
            ..Default::default()
        }]);
        let bodies = encode_section(&payload).unwrap();
        assert_eq!(
            bodies,
            vec![json!({ "award_name": "Merit", "award_date": "2020-05-01" })]
        );
    }

    #[test]
    fn test_encode_empty_section_has_no_bodies() {
        let bodies = encode_section(&SectionPayload::Family(vec![])).unwrap();
        assert!(bodies.is_empty());
    }
}
