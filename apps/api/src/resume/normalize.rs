//! Field normalizers: upstream item shapes → canonical section entries.
//!
//! Every function here is total. Upstream data is messy (nulls, timestamps in
//! date columns, free-text enums), so bad values degrade to `""` or to the
//! field's default variant instead of failing the whole record.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::resume::models::{
    AwardEntry, ChurchAppointmentEntry, DegreeType, DisciplineEntry, EducationHistoryEntry,
    FamilyInfoEntry, FamilyRelation, GraduationStatus, QualificationEntry, ResumeProfile, RowKey,
    SpecialRemarkEntry, TrainingHistoryEntry, WorkExperienceEntry,
};
use crate::upstream::models::{
    AdditionalRemarkItem, AwardItem, CertificationItem, DisciplineRecordItem, EducationItem,
    FamilyMemberItem, OrganizationalActivityItem, ProfileItem, TrainingProgramItem,
    WorkExperienceItem,
};

const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

const DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"];

/// Ordered keyword table; the first keyword contained in the input wins.
const FAMILY_RELATION_KEYWORDS: &[(&str, FamilyRelation)] = &[
    ("mother", FamilyRelation::Mother),
    ("어머니", FamilyRelation::Mother),
    ("모친", FamilyRelation::Mother),
    ("father", FamilyRelation::Father),
    ("아버지", FamilyRelation::Father),
    ("부친", FamilyRelation::Father),
    ("husband", FamilyRelation::Husband),
    ("남편", FamilyRelation::Husband),
    ("spouse", FamilyRelation::Wife),
    ("wife", FamilyRelation::Wife),
    ("아내", FamilyRelation::Wife),
    ("배우자", FamilyRelation::Wife),
    ("older brother", FamilyRelation::OlderBrother),
    ("오빠", FamilyRelation::OlderBrother),
    ("younger brother", FamilyRelation::YoungerBrother),
    ("남동생", FamilyRelation::YoungerBrother),
    ("older sister", FamilyRelation::OlderSister),
    ("누나", FamilyRelation::OlderSister),
    ("언니", FamilyRelation::OlderSister),
    ("younger sister", FamilyRelation::YoungerSister),
    ("여동생", FamilyRelation::YoungerSister),
    ("son", FamilyRelation::Son),
    ("아들", FamilyRelation::Son),
    ("daughter", FamilyRelation::Daughter),
    ("딸", FamilyRelation::Daughter),
];

/// Associate must be tested before bachelor: "전문학사" contains "학사".
const DEGREE_KEYWORDS: &[(&str, DegreeType)] = &[
    ("high school", DegreeType::HighSchool),
    ("고등", DegreeType::HighSchool),
    ("associate", DegreeType::Associate),
    ("전문학사", DegreeType::Associate),
    ("doctor", DegreeType::Doctorate),
    ("phd", DegreeType::Doctorate),
    ("ph.d", DegreeType::Doctorate),
    ("박사", DegreeType::Doctorate),
    ("master", DegreeType::Master),
    ("석사", DegreeType::Master),
    ("bachelor", DegreeType::Bachelor),
    ("학사", DegreeType::Bachelor),
];

// ────────────────────────────────────────────────────────────────────────────
// Scalars
// ────────────────────────────────────────────────────────────────────────────

/// Converts an upstream date or timestamp into `YYYY-MM-DD`.
///
/// Timestamps keep their own calendar date (no timezone shift), so a
/// `2024-01-31T23:30:00+09:00` stays on the 31st. Null, blank or unparseable
/// input yields `""`.
pub fn to_canonical_date(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(parse_date)
        .map(|date| date.format(CANONICAL_DATE_FORMAT).to_string())
        .unwrap_or_default()
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for format in DATE_TIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    // Odd timestamp suffixes ("2024-01-02T03:04:05 KST"): trust the date prefix.
    match (raw.get(..10), raw.get(10..11)) {
        (Some(prefix), Some("T" | " ")) => NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok(),
        _ => None,
    }
}

/// Exact match after lowercasing and collapsing punctuation to `_`.
pub fn normalize_graduation_status(value: Option<&str>) -> GraduationStatus {
    let raw = value.unwrap_or_default().trim().to_lowercase();
    let normalized = raw
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    match normalized.as_str() {
        "graduated" | "졸업" => GraduationStatus::Graduated,
        "completed" | "수료" => GraduationStatus::Completed,
        "dropped_out" | "중퇴" => GraduationStatus::DroppedOut,
        "on_leave" | "휴학" => GraduationStatus::OnLeave,
        _ => GraduationStatus::Enrolled,
    }
}

pub fn normalize_family_relation(value: Option<&str>) -> FamilyRelation {
    classify(value, FAMILY_RELATION_KEYWORDS).unwrap_or_default()
}

pub fn normalize_degree(value: Option<&str>) -> DegreeType {
    classify(value, DEGREE_KEYWORDS).unwrap_or_default()
}

fn classify<T: Copy>(value: Option<&str>, table: &[(&str, T)]) -> Option<T> {
    let haystack = value?.trim().to_lowercase().replace(['_', '-'], " ");
    if haystack.is_empty() {
        return None;
    }
    table
        .iter()
        .find(|(keyword, _)| haystack.contains(*keyword))
        .map(|(_, variant)| *variant)
}

/// Splits a combined English name: the last token is the last name, everything
/// before it the first name. A single token is a first name.
pub fn split_english_name(full_name: &str) -> (String, String) {
    let tokens: Vec<&str> = full_name.split_whitespace().collect();
    match tokens.split_last() {
        None => (String::new(), String::new()),
        Some((only, [])) => (only.to_string(), String::new()),
        Some((last, rest)) => (rest.join(" "), last.to_string()),
    }
}

fn text(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn date(value: &Option<String>) -> String {
    to_canonical_date(value.as_deref())
}

fn row_key(id: &Option<String>) -> RowKey {
    id.as_deref()
        .map(RowKey::for_upstream)
        .unwrap_or_default()
}

fn map_items<T, U>(items: Option<&[T]>, normalize: impl Fn(&T) -> U) -> Vec<U> {
    items.unwrap_or_default().iter().map(normalize).collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

pub fn normalize_profile(item: &ProfileItem) -> ResumeProfile {
    let (first_name_english, last_name_english) =
        split_english_name(item.name_english.as_deref().unwrap_or_default());

    ResumeProfile {
        key: row_key(&item.id),
        id: item.id.clone(),
        korean_name: text(&item.name_korean),
        hanja_name: text(&item.name_hanja),
        first_name_english,
        last_name_english,
        resident_number: text(&item.resident_registration_number),
        date_of_birth: date(&item.birth_date),
        nationality: text(&item.nationality),
        department: text(&item.department),
        extension_number: text(&item.extension),
        mobile_phone: text(&item.mobile),
        address: text(&item.address),
        remarks: text(&item.notes),
        blessing_date: date(&item.blessing_date),
        appointment_date: date(&item.appointment_date),
        affiliation: text(&item.organization),
        position_title: text(&item.position),
        rank_title: String::new(),
        email: text(&item.email),
        photo_url: text(&item.photo_url),
    }
}

pub fn normalize_education(items: Option<&[EducationItem]>) -> Vec<EducationHistoryEntry> {
    map_items(items, |item| EducationHistoryEntry {
        key: row_key(&item.id),
        id: item.id.clone(),
        school_name: text(&item.institution),
        major: text(&item.major),
        degree: normalize_degree(item.degree.as_deref()),
        graduation_status: normalize_graduation_status(item.status.as_deref()),
        start_date: date(&item.start_date),
        end_date: date(&item.end_date),
        location: text(&item.location),
    })
}

pub fn normalize_training(items: Option<&[TrainingProgramItem]>) -> Vec<TrainingHistoryEntry> {
    map_items(items, |item| TrainingHistoryEntry {
        key: row_key(&item.id),
        id: item.id.clone(),
        course_name: text(&item.program_name),
        category: text(&item.category),
        institution: text(&item.organizing_institution),
        start_date: date(&item.start_date),
        end_date: date(&item.end_date),
        hours: item.hours.filter(|h| h.is_finite() && *h >= 0.0),
    })
}

pub fn normalize_qualifications(items: Option<&[CertificationItem]>) -> Vec<QualificationEntry> {
    map_items(items, |item| QualificationEntry {
        key: row_key(&item.id),
        id: item.id.clone(),
        name: text(&item.certification_name),
        issuer: text(&item.issuing_authority),
        acquired_date: date(&item.acquisition_date),
        license_number: text(&item.certificate_number),
    })
}

pub fn normalize_family(items: Option<&[FamilyMemberItem]>) -> Vec<FamilyInfoEntry> {
    map_items(items, |item| FamilyInfoEntry {
        key: row_key(&item.id),
        id: item.id.clone(),
        name: text(&item.member_name),
        relation: normalize_family_relation(item.relationship.as_deref()),
        birth_date: date(&item.birth_date),
        occupation: text(&item.occupation),
        contact: text(&item.contact),
    })
}

pub fn normalize_work_experience(
    items: Option<&[WorkExperienceItem]>,
) -> Vec<WorkExperienceEntry> {
    map_items(items, |item| WorkExperienceEntry {
        key: row_key(&item.id),
        id: item.id.clone(),
        company: text(&item.company_name),
        department: text(&item.department),
        final_position: text(&item.position),
        start_date: date(&item.start_date),
        end_date: date(&item.end_date),
        responsibilities: text(&item.description),
    })
}

pub fn normalize_church_appointments(
    items: Option<&[OrganizationalActivityItem]>,
) -> Vec<ChurchAppointmentEntry> {
    map_items(items, |item| ChurchAppointmentEntry {
        key: row_key(&item.id),
        id: item.id.clone(),
        organization: text(&item.organization_name),
        position: text(&item.role),
        start_date: date(&item.start_date),
        end_date: date(&item.end_date),
        notes: text(&item.description),
    })
}

pub fn normalize_awards(items: Option<&[AwardItem]>) -> Vec<AwardEntry> {
    map_items(items, |item| AwardEntry {
        key: row_key(&item.id),
        id: item.id.clone(),
        award_type: text(&item.award_name),
        award_date: date(&item.award_date),
        issuer: text(&item.awarding_body),
        description: text(&item.description),
    })
}

pub fn normalize_discipline(items: Option<&[DisciplineRecordItem]>) -> Vec<DisciplineEntry> {
    map_items(items, |item| DisciplineEntry {
        key: row_key(&item.id),
        id: item.id.clone(),
        discipline_type: text(&item.action_type),
        discipline_date: date(&item.action_date),
        issuer: text(&item.issued_by),
        reason: text(&item.reason),
    })
}

pub fn normalize_remarks(items: Option<&[AdditionalRemarkItem]>) -> Vec<SpecialRemarkEntry> {
    map_items(items, |item| SpecialRemarkEntry {
        key: row_key(&item.id),
        id: item.id.clone(),
        category: text(&item.category),
        content: text(&item.content),
        recorded_date: date(&item.recorded_at),
    })
}
