//! Checks a section payload before it is written upstream.
//!
//! Untouched blank rows (what the editor pads empty sections with) are
//! dropped. Any remaining row must carry its primary field, every
//! non-empty date must already be canonical `YYYY-MM-DD`, and a period may
//! not end before it starts.

use crate::errors::AppError;
use crate::resume::models::{
    AwardEntry, ChurchAppointmentEntry, DegreeType, DisciplineEntry, EducationHistoryEntry,
    FamilyInfoEntry, FamilyRelation, GraduationStatus, QualificationEntry, ResumeProfile,
    SectionKey, SectionPayload, SpecialRemarkEntry, TrainingHistoryEntry, WorkExperienceEntry,
};
use crate::resume::normalize::to_canonical_date;

trait SectionRow {
    /// Free-text and date fields; a row with all of them blank is untouched.
    fn fields(&self) -> Vec<&str>;
    /// Required fields as `(label, value)`.
    fn required(&self) -> Vec<(&'static str, &str)>;
    fn dates(&self) -> Vec<(&'static str, &str)>;
    /// True when a non-text field (enum or number) differs from its default.
    fn has_other_edits(&self) -> bool {
        false
    }
    /// `(start, end)` of rows that describe a period.
    fn period(&self) -> Option<(&str, &str)> {
        None
    }
    fn extra_check(&self) -> Option<String> {
        None
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn is_canonical_date(value: &str) -> bool {
    to_canonical_date(Some(value)) == value
}

fn check_row<T: SectionRow>(section: SectionKey, index: usize, row: &T) -> Result<(), AppError> {
    let fail = |problem: String| {
        AppError::Validation(format!("{section} row {}: {problem}", index + 1))
    };

    for (label, value) in row.required() {
        if is_blank(value) {
            return Err(fail(format!("{label} is required")));
        }
    }
    for (label, value) in row.dates() {
        if !is_blank(value) && !is_canonical_date(value) {
            return Err(fail(format!("{label} '{value}' is not a YYYY-MM-DD date")));
        }
    }
    if let Some((start, end)) = row.period() {
        // Both canonical at this point, so string order is date order.
        if !is_blank(start) && !is_blank(end) && end < start {
            return Err(fail(format!("end date {end} is before start date {start}")));
        }
    }
    if let Some(problem) = row.extra_check() {
        return Err(fail(problem));
    }
    Ok(())
}

fn clean_rows<T: SectionRow>(section: SectionKey, rows: Vec<T>) -> Result<Vec<T>, AppError> {
    let mut kept = Vec::with_capacity(rows.len());
    for (index, row) in rows.into_iter().enumerate() {
        let untouched = row.fields().into_iter().all(is_blank) && !row.has_other_edits();
        if untouched && row.extra_check().is_none() {
            continue;
        }
        check_row(section, index, &row)?;
        kept.push(row);
    }
    Ok(kept)
}

/// Returns the payload without untouched blank rows, or the first problem found.
pub fn validate_section(payload: SectionPayload) -> Result<SectionPayload, AppError> {
    let section = payload.key();
    Ok(match payload {
        SectionPayload::Profile(profile) => {
            check_row(section, 0, &profile)?;
            SectionPayload::Profile(profile)
        }
        SectionPayload::Education(rows) => SectionPayload::Education(clean_rows(section, rows)?),
        SectionPayload::Training(rows) => SectionPayload::Training(clean_rows(section, rows)?),
        SectionPayload::Qualifications(rows) => {
            SectionPayload::Qualifications(clean_rows(section, rows)?)
        }
        SectionPayload::Family(rows) => SectionPayload::Family(clean_rows(section, rows)?),
        SectionPayload::WorkExperience(rows) => {
            SectionPayload::WorkExperience(clean_rows(section, rows)?)
        }
        SectionPayload::ChurchAppointments(rows) => {
            SectionPayload::ChurchAppointments(clean_rows(section, rows)?)
        }
        SectionPayload::Awards(rows) => SectionPayload::Awards(clean_rows(section, rows)?),
        SectionPayload::Discipline(rows) => SectionPayload::Discipline(clean_rows(section, rows)?),
        SectionPayload::Remarks(rows) => SectionPayload::Remarks(clean_rows(section, rows)?),
    })
}

impl SectionRow for ResumeProfile {
    fn fields(&self) -> Vec<&str> {
        vec![self.korean_name.as_str()]
    }

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("Korean name", self.korean_name.as_str())]
    }

    fn dates(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("date of birth", self.date_of_birth.as_str()),
            ("blessing date", self.blessing_date.as_str()),
            ("appointment date", self.appointment_date.as_str()),
        ]
    }
}

impl SectionRow for EducationHistoryEntry {
    fn fields(&self) -> Vec<&str> {
        vec![
            self.school_name.as_str(),
            self.major.as_str(),
            self.start_date.as_str(),
            self.end_date.as_str(),
            self.location.as_str(),
        ]
    }

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("school name", self.school_name.as_str())]
    }

    fn has_other_edits(&self) -> bool {
        self.degree != DegreeType::default()
            || self.graduation_status != GraduationStatus::default()
    }

    fn dates(&self) -> Vec<(&'static str, &str)> {
        vec![("start date", self.start_date.as_str()), ("end date", self.end_date.as_str())]
    }

    fn period(&self) -> Option<(&str, &str)> {
        Some((self.start_date.as_str(), self.end_date.as_str()))
    }
}

impl SectionRow for TrainingHistoryEntry {
    fn fields(&self) -> Vec<&str> {
        vec![
            self.course_name.as_str(),
            self.category.as_str(),
            self.institution.as_str(),
            self.start_date.as_str(),
            self.end_date.as_str(),
        ]
    }

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("course name", self.course_name.as_str())]
    }

    fn has_other_edits(&self) -> bool {
        self.hours.is_some()
    }

    fn dates(&self) -> Vec<(&'static str, &str)> {
        vec![("start date", self.start_date.as_str()), ("end date", self.end_date.as_str())]
    }

    fn period(&self) -> Option<(&str, &str)> {
        Some((self.start_date.as_str(), self.end_date.as_str()))
    }

    fn extra_check(&self) -> Option<String> {
        match self.hours {
            Some(hours) if !hours.is_finite() || hours < 0.0 => {
                Some(format!("hours must be a non-negative number, got {hours}"))
            }
            _ => None,
        }
    }
}

impl SectionRow for QualificationEntry {
    fn fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.issuer.as_str(),
            self.acquired_date.as_str(),
            self.license_number.as_str(),
        ]
    }

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("qualification name", self.name.as_str())]
    }

    fn dates(&self) -> Vec<(&'static str, &str)> {
        vec![("acquired date", self.acquired_date.as_str())]
    }
}

impl SectionRow for FamilyInfoEntry {
    fn fields(&self) -> Vec<&str> {
        vec![
            self.name.as_str(),
            self.birth_date.as_str(),
            self.occupation.as_str(),
            self.contact.as_str(),
        ]
    }

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("name", self.name.as_str())]
    }

    fn dates(&self) -> Vec<(&'static str, &str)> {
        vec![("birth date", self.birth_date.as_str())]
    }

    fn has_other_edits(&self) -> bool {
        self.relation != FamilyRelation::default()
    }
}

impl SectionRow for WorkExperienceEntry {
    fn fields(&self) -> Vec<&str> {
        vec![
            self.company.as_str(),
            self.department.as_str(),
            self.final_position.as_str(),
            self.start_date.as_str(),
            self.end_date.as_str(),
            self.responsibilities.as_str(),
        ]
    }

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("company", self.company.as_str())]
    }

    fn dates(&self) -> Vec<(&'static str, &str)> {
        vec![("start date", self.start_date.as_str()), ("end date", self.end_date.as_str())]
    }

    fn period(&self) -> Option<(&str, &str)> {
        Some((self.start_date.as_str(), self.end_date.as_str()))
    }
}

impl SectionRow for ChurchAppointmentEntry {
    fn fields(&self) -> Vec<&str> {
        vec![
            self.organization.as_str(),
            self.position.as_str(),
            self.start_date.as_str(),
            self.end_date.as_str(),
            self.notes.as_str(),
        ]
    }

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("organization", self.organization.as_str())]
    }

    fn dates(&self) -> Vec<(&'static str, &str)> {
        vec![("start date", self.start_date.as_str()), ("end date", self.end_date.as_str())]
    }

    fn period(&self) -> Option<(&str, &str)> {
        Some((self.start_date.as_str(), self.end_date.as_str()))
    }
}

impl SectionRow for AwardEntry {
    fn fields(&self) -> Vec<&str> {
        vec![
            self.award_type.as_str(),
            self.award_date.as_str(),
            self.issuer.as_str(),
            self.description.as_str(),
        ]
    }

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("award type", self.award_type.as_str()), ("award date", self.award_date.as_str())]
    }

    fn dates(&self) -> Vec<(&'static str, &str)> {
        vec![("award date", self.award_date.as_str())]
    }
}

impl SectionRow for DisciplineEntry {
    fn fields(&self) -> Vec<&str> {
        vec![
            self.discipline_type.as_str(),
            self.discipline_date.as_str(),
            self.issuer.as_str(),
            self.reason.as_str(),
        ]
    }

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("discipline type", self.discipline_type.as_str()),
            ("discipline date", self.discipline_date.as_str()),
        ]
    }

    fn dates(&self) -> Vec<(&'static str, &str)> {
        vec![("discipline date", self.discipline_date.as_str())]
    }
}

impl SectionRow for SpecialRemarkEntry {
    fn fields(&self) -> Vec<&str> {
        vec![self.category.as_str(), self.content.as_str(), self.recorded_date.as_str()]
    }

    fn required(&self) -> Vec<(&'static str, &str)> {
        vec![("content", self.content.as_str())]
    }

    fn dates(&self) -> Vec<(&'static str, &str)> {
        vec![("recorded date", self.recorded_date.as_str())]
    }
}
