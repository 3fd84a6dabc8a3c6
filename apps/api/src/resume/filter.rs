//! Directory filter engine.
//!
//! A record survives when every active facet matches it. Unset facets match
//! everything. Text facets are case-insensitive substring checks except
//! department and degree, which are exact.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::resume::models::{ResumeProfile, ResumeRecord, ResumeRecordWithId};

const ALL_DEPARTMENTS: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimpleFilters {
    /// Quick search across profile fields and most sections.
    pub query: String,
    /// Exact department; blank or `"all"` means any.
    pub department: String,
    pub position: String,
    pub rank: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvancedFilters {
    pub school: String,
    /// Canonical degree name, e.g. `bachelor`.
    pub degree: String,
    pub company: String,
    pub work_role: String,
    pub training_category: String,
    pub church_role: String,
    pub qualification: String,
    pub award: String,
    pub with_photo: bool,
    pub currently_employed: bool,
}

impl AdvancedFilters {
    pub fn is_active(&self) -> bool {
        self.with_photo
            || self.currently_employed
            || [
                &self.school,
                &self.degree,
                &self.company,
                &self.work_role,
                &self.training_category,
                &self.church_role,
                &self.qualification,
                &self.award,
            ]
            .iter()
            .any(|value| !value.trim().is_empty())
    }
}

/// Lowercased, trimmed needle; `None` when the facet is unset.
fn needle(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

fn any_contains<'a>(fields: impl IntoIterator<Item = &'a str>, needle: &str) -> bool {
    fields.into_iter().any(|field| contains(field, needle))
}

/// Profile position title, or any work entry's final position or department.
fn matches_role(record: &ResumeRecord, needle: &str) -> bool {
    contains(&record.profile.position_title, needle)
        || record.work_experience.iter().any(|work| {
            contains(&work.final_position, needle) || contains(&work.department, needle)
        })
}

fn profile_text(profile: &ResumeProfile) -> [&str; 8] {
    [
        profile.korean_name.as_str(),
        profile.hanja_name.as_str(),
        profile.department.as_str(),
        profile.position_title.as_str(),
        profile.rank_title.as_str(),
        profile.affiliation.as_str(),
        profile.email.as_str(),
        profile.mobile_phone.as_str(),
    ]
}

fn matches_query(record: &ResumeRecord, needle: &str) -> bool {
    any_contains(profile_text(&record.profile), needle)
        || record
            .education
            .iter()
            .any(|e| any_contains([e.school_name.as_str(), e.major.as_str()], needle))
        || record
            .work_experience
            .iter()
            .any(|w| any_contains([w.company.as_str(), w.final_position.as_str()], needle))
        || record
            .training
            .iter()
            .any(|t| any_contains([t.course_name.as_str(), t.category.as_str()], needle))
        || record
            .church_appointments
            .iter()
            .any(|c| any_contains([c.organization.as_str(), c.position.as_str()], needle))
        || record
            .qualifications
            .iter()
            .any(|q| contains(&q.name, needle))
        || record
            .awards
            .iter()
            .any(|a| any_contains([a.award_type.as_str(), a.description.as_str()], needle))
}

fn matches_simple(record: &ResumeRecord, filters: &SimpleFilters) -> bool {
    if let Some(query) = needle(&filters.query) {
        if !matches_query(record, &query) {
            return false;
        }
    }

    let department = filters.department.trim();
    if !department.is_empty()
        && department != ALL_DEPARTMENTS
        && record.profile.department.trim() != department
    {
        return false;
    }

    if let Some(position) = needle(&filters.position) {
        if !matches_role(record, &position) {
            return false;
        }
    }

    if let Some(rank) = needle(&filters.rank) {
        if !contains(&record.profile.rank_title, &rank) {
            return false;
        }
    }

    true
}

fn matches_advanced(record: &ResumeRecord, filters: &AdvancedFilters) -> bool {
    if let Some(school) = needle(&filters.school) {
        if !record
            .education
            .iter()
            .any(|e| any_contains([e.school_name.as_str(), e.major.as_str()], &school))
        {
            return false;
        }
    }

    if let Some(degree) = needle(&filters.degree) {
        if !record.education.iter().any(|e| e.degree.as_str() == degree) {
            return false;
        }
    }

    if let Some(company) = needle(&filters.company) {
        if !record
            .work_experience
            .iter()
            .any(|w| contains(&w.company, &company))
        {
            return false;
        }
    }

    if let Some(role) = needle(&filters.work_role) {
        if !matches_role(record, &role) {
            return false;
        }
    }

    if let Some(category) = needle(&filters.training_category) {
        if !record
            .training
            .iter()
            .any(|t| any_contains([t.category.as_str(), t.course_name.as_str()], &category))
        {
            return false;
        }
    }

    if let Some(role) = needle(&filters.church_role) {
        if !record
            .church_appointments
            .iter()
            .any(|c| any_contains([c.position.as_str(), c.organization.as_str()], &role))
        {
            return false;
        }
    }

    if let Some(name) = needle(&filters.qualification) {
        if !record.qualifications.iter().any(|q| contains(&q.name, &name)) {
            return false;
        }
    }

    if let Some(award) = needle(&filters.award) {
        if !record
            .awards
            .iter()
            .any(|a| any_contains([a.award_type.as_str(), a.description.as_str()], &award))
        {
            return false;
        }
    }

    if filters.with_photo && record.profile.photo_url.trim().is_empty() {
        return false;
    }

    if filters.currently_employed
        && !record
            .work_experience
            .iter()
            .any(|w| w.end_date.trim().is_empty())
    {
        return false;
    }

    true
}

/// Records matching every active facet, in input order.
pub fn filter_records<'a>(
    records: &'a [ResumeRecordWithId],
    simple: &SimpleFilters,
    advanced: &AdvancedFilters,
) -> Vec<&'a ResumeRecordWithId> {
    records
        .iter()
        .filter(|r| matches_simple(&r.record, simple) && matches_advanced(&r.record, advanced))
        .collect()
}

/// Case-folded comparison, ties broken by code point so the order is total.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn sorted_distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut distinct: Vec<String> = values
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    distinct.sort_by(|a, b| locale_cmp(a, b));
    distinct
}

pub fn department_options(records: &[ResumeRecordWithId]) -> Vec<String> {
    sorted_distinct(records.iter().map(|r| r.record.profile.department.as_str()))
}

pub fn training_category_options(records: &[ResumeRecordWithId]) -> Vec<String> {
    sorted_distinct(
        records
            .iter()
            .flat_map(|r| r.record.training.iter())
            .map(|t| t.category.as_str()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::models::{
        DegreeType, EducationHistoryEntry, RecordMetadata, ResumeProfile, TrainingHistoryEntry,
        WorkExperienceEntry,
    };

    fn record(id: &str, build: impl FnOnce(&mut ResumeRecord)) -> ResumeRecordWithId {
        let mut record = ResumeRecord::default();
        build(&mut record);
        ResumeRecordWithId {
            id: id.to_string(),
            record,
            metadata: RecordMetadata::default(),
        }
    }

    fn work(company: &str, end_date: &str) -> WorkExperienceEntry {
        WorkExperienceEntry {
            company: company.to_string(),
            end_date: end_date.to_string(),
            ..Default::default()
        }
    }

    fn degree(degree: DegreeType) -> EducationHistoryEntry {
        EducationHistoryEntry {
            school_name: "Some University".to_string(),
            degree,
            ..Default::default()
        }
    }

    fn ids(records: Vec<&ResumeRecordWithId>) -> Vec<&str> {
        records.into_iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_quick_search_matches_work_company() {
        let records = vec![
            record("A", |r| r.profile.department = "Logistics".to_string()),
            record("B", |r| r.work_experience = vec![work("Acme Corp", "")]),
        ];
        let simple = SimpleFilters {
            query: "acme".to_string(),
            ..Default::default()
        };
        assert_eq!(
            ids(filter_records(&records, &simple, &AdvancedFilters::default())),
            vec!["B"]
        );
    }

    #[test]
    fn test_compound_advanced_filter() {
        let records = vec![
            record("A", |r| {
                r.education = vec![degree(DegreeType::Bachelor)];
                r.work_experience = vec![work("Acme", "")];
            }),
            record("B", |r| {
                r.education = vec![degree(DegreeType::Master)];
                r.work_experience = vec![work("Acme", "")];
            }),
        ];
        let advanced = AdvancedFilters {
            degree: "bachelor".to_string(),
            company: "acme".to_string(),
            ..Default::default()
        };
        assert_eq!(
            ids(filter_records(&records, &SimpleFilters::default(), &advanced)),
            vec!["A"]
        );
    }

    #[test]
    fn test_no_filters_keep_everything() {
        let records = vec![record("A", |_| {}), record("B", |_| {})];
        let kept = filter_records(
            &records,
            &SimpleFilters::default(),
            &AdvancedFilters::default(),
        );
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_adding_facets_never_grows_result() {
        let records = vec![
            record("A", |r| {
                r.profile.department = "Finance".to_string();
                r.profile.photo_url = "a.jpg".to_string();
                r.work_experience = vec![work("Acme", "")];
            }),
            record("B", |r| {
                r.profile.department = "Finance".to_string();
                r.work_experience = vec![work("Acme", "2020-01-01")];
            }),
            record("C", |r| {
                r.profile.department = "Logistics".to_string();
                r.work_experience = vec![work("Globex", "")];
            }),
        ];

        let simple_sets = [
            SimpleFilters::default(),
            SimpleFilters {
                department: "Finance".to_string(),
                ..Default::default()
            },
            SimpleFilters {
                department: "Finance".to_string(),
                query: "acme".to_string(),
                ..Default::default()
            },
        ];
        let advanced_sets = [
            AdvancedFilters::default(),
            AdvancedFilters {
                currently_employed: true,
                ..Default::default()
            },
            AdvancedFilters {
                currently_employed: true,
                with_photo: true,
                ..Default::default()
            },
        ];

        let mut previous = usize::MAX;
        for (simple, advanced) in simple_sets.iter().zip(advanced_sets.iter()) {
            let count = filter_records(&records, simple, advanced).len();
            assert!(count <= previous);
            previous = count;
        }
        assert_eq!(previous, 1);
    }

    #[test]
    fn test_department_all_is_unset() {
        let records = vec![
            record("A", |r| r.profile.department = "Finance".to_string()),
            record("B", |r| r.profile.department = "Logistics".to_string()),
        ];
        let simple = SimpleFilters {
            department: "all".to_string(),
            ..Default::default()
        };
        assert_eq!(
            filter_records(&records, &simple, &AdvancedFilters::default()).len(),
            2
        );
        let simple = SimpleFilters {
            department: "Fin".to_string(),
            ..Default::default()
        };
        assert!(filter_records(&records, &simple, &AdvancedFilters::default()).is_empty());
    }

    #[test]
    fn test_position_matches_profile_or_work_history() {
        let records = vec![
            record("A", |r| r.profile.position_title = "Senior Manager".to_string()),
            record("B", |r| {
                r.work_experience = vec![WorkExperienceEntry {
                    department: "Management Office".to_string(),
                    ..Default::default()
                }]
            }),
            record("C", |r| r.profile.rank_title = "Manager".to_string()),
        ];
        let simple = SimpleFilters {
            position: "manage".to_string(),
            ..Default::default()
        };
        assert_eq!(
            ids(filter_records(&records, &simple, &AdvancedFilters::default())),
            vec!["A", "B"]
        );

        let simple = SimpleFilters {
            rank: "MANAGER".to_string(),
            ..Default::default()
        };
        assert_eq!(
            ids(filter_records(&records, &simple, &AdvancedFilters::default())),
            vec!["C"]
        );
    }

    #[test]
    fn test_quick_search_covers_profile_fields() {
        let records = vec![
            record("A", |r| {
                r.profile = ResumeProfile {
                    hanja_name: "金哲洙".to_string(),
                    ..Default::default()
                }
            }),
            record("B", |r| r.profile.email = "Jane@Example.org".to_string()),
        ];
        let search = |q: &str| {
            let simple = SimpleFilters {
                query: q.to_string(),
                ..Default::default()
            };
            ids(filter_records(&records, &simple, &AdvancedFilters::default()))
        };
        assert_eq!(search("哲"), vec!["A"]);
        assert_eq!(search("jane@"), vec!["B"]);
        assert_eq!(search("   "), vec!["A", "B"]);
    }

    #[test]
    fn test_training_category_matches_course_too() {
        let records = vec![record("A", |r| {
            r.training = vec![TrainingHistoryEntry {
                course_name: "Advanced Leadership".to_string(),
                category: "Management".to_string(),
                ..Default::default()
            }]
        })];
        for term in ["leader", "manage"] {
            let advanced = AdvancedFilters {
                training_category: term.to_string(),
                ..Default::default()
            };
            assert_eq!(
                filter_records(&records, &SimpleFilters::default(), &advanced).len(),
                1
            );
        }
    }

    #[test]
    fn test_is_active() {
        assert!(!AdvancedFilters::default().is_active());
        assert!(!AdvancedFilters {
            school: "   ".to_string(),
            ..Default::default()
        }
        .is_active());
        assert!(AdvancedFilters {
            award: "merit".to_string(),
            ..Default::default()
        }
        .is_active());
        assert!(AdvancedFilters {
            with_photo: true,
            ..Default::default()
        }
        .is_active());
    }

    #[test]
    fn test_facet_options_are_sorted_and_distinct() {
        let records = vec![
            record("A", |r| {
                r.profile.department = " logistics ".to_string();
                r.training = vec![TrainingHistoryEntry {
                    category: "Safety".to_string(),
                    ..Default::default()
                }];
            }),
            record("B", |r| {
                r.profile.department = "Finance".to_string();
                r.training = vec![
                    TrainingHistoryEntry {
                        category: "leadership".to_string(),
                        ..Default::default()
                    },
                    TrainingHistoryEntry {
                        category: "Safety".to_string(),
                        ..Default::default()
                    },
                ];
            }),
            record("C", |r| r.profile.department = "".to_string()),
        ];
        assert_eq!(department_options(&records), vec!["Finance", "logistics"]);
        assert_eq!(
            training_category_options(&records),
            vec!["leadership", "Safety"]
        );
    }

    #[test]
    fn test_locale_cmp_folds_case_then_breaks_ties() {
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_cmp("Apple", "apple"), Ordering::Less);
        assert_eq!(locale_cmp("a", "a"), Ordering::Equal);
    }
}
