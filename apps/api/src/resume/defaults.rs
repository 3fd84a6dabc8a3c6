//! Blank-row factory for editing.
//!
//! Editors always get at least one row per section: a never-persisted record
//! starts with exactly one blank entry everywhere, and a section draft built
//! from an empty list is padded with one.

use crate::resume::models::{ResumeRecord, SectionKey, SectionPayload};

/// Pads `entries` with one blank row when empty.
pub fn with_placeholder<T: Default>(mut entries: Vec<T>) -> Vec<T> {
    if entries.is_empty() {
        entries.push(T::default());
    }
    entries
}

/// Editing draft of one section.
pub fn section_draft(payload: SectionPayload) -> SectionPayload {
    match payload {
        SectionPayload::Profile(profile) => SectionPayload::Profile(profile),
        SectionPayload::Education(e) => SectionPayload::Education(with_placeholder(e)),
        SectionPayload::Training(e) => SectionPayload::Training(with_placeholder(e)),
        SectionPayload::Qualifications(e) => SectionPayload::Qualifications(with_placeholder(e)),
        SectionPayload::Family(e) => SectionPayload::Family(with_placeholder(e)),
        SectionPayload::WorkExperience(e) => SectionPayload::WorkExperience(with_placeholder(e)),
        SectionPayload::ChurchAppointments(e) => {
            SectionPayload::ChurchAppointments(with_placeholder(e))
        }
        SectionPayload::Awards(e) => SectionPayload::Awards(with_placeholder(e)),
        SectionPayload::Discipline(e) => SectionPayload::Discipline(with_placeholder(e)),
        SectionPayload::Remarks(e) => SectionPayload::Remarks(with_placeholder(e)),
    }
}

impl ResumeRecord {
    /// A never-persisted record: blank profile, one blank row per section.
    pub fn blank() -> Self {
        let mut record = ResumeRecord::default();
        for key in SectionKey::ALL {
            let draft = section_draft(record.section(key));
            record.replace_section(draft);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::models::{AwardEntry, EducationHistoryEntry};

    #[test]
    fn test_blank_record_has_one_row_per_section() {
        let record = ResumeRecord::blank();
        for key in SectionKey::ALL {
            assert_eq!(record.section(key).len(), 1, "section {key}");
        }
        assert!(record.education[0].id.is_none());
        assert!(record.education[0].school_name.is_empty());
    }

    #[test]
    fn test_blank_rows_get_distinct_keys() {
        let a = ResumeRecord::blank();
        let b = ResumeRecord::blank();
        assert_ne!(a.awards[0].key, b.awards[0].key);
        assert_ne!(a.awards[0].key, a.education[0].key);
    }

    #[test]
    fn test_draft_of_empty_section_is_one_row() {
        let draft = section_draft(SectionPayload::Education(vec![]));
        assert_eq!(draft.len(), 1);
    }

    #[test]
    fn test_draft_keeps_existing_rows() {
        let rows = vec![
            AwardEntry {
                award_type: "Merit".to_string(),
                ..Default::default()
            },
            AwardEntry {
                award_type: "Service".to_string(),
                ..Default::default()
            },
        ];
        let draft = section_draft(SectionPayload::Awards(rows.clone()));
        assert_eq!(draft, SectionPayload::Awards(rows));
    }

    #[test]
    fn test_placeholder_only_pads_empty_lists() {
        assert_eq!(with_placeholder(Vec::<EducationHistoryEntry>::new()).len(), 1);
        assert_eq!(
            with_placeholder(vec![EducationHistoryEntry::default(); 3]).len(),
            3
        );
    }
}
