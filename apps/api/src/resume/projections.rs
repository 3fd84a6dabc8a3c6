//! Flat table rows and summary counts for the directory view.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::resume::filter::{filter_records, AdvancedFilters, SimpleFilters};
use crate::resume::models::ResumeRecordWithId;

const PLACEHOLDER: &str = "-";
const UNASSIGNED: &str = "Unassigned";
const FALLBACK_INITIALS: &str = "UP";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeTableRow {
    pub id: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    pub department: String,
    pub current_role: String,
    pub current_company: String,
    pub mobile_phone: String,
    pub email: String,
    pub extension: String,
    pub initials: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResumeStats {
    pub total: usize,
    pub with_photo: usize,
    pub with_email: usize,
    pub departments: usize,
}

/// Filtered rows plus counts, as served to the directory table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectoryView {
    pub rows: Vec<ResumeTableRow>,
    pub stats: ResumeStats,
    pub total: usize,
    pub matched: usize,
    pub has_active_advanced_filters: bool,
}

fn non_blank(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn or_placeholder(value: &str) -> String {
    non_blank(value).unwrap_or(PLACEHOLDER).to_string()
}

/// Korean phone grouping on the digits of `raw`. Numbers that fit no known
/// pattern are returned trimmed, blanks become `-`.
pub fn format_phone(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return PLACEHOLDER.to_string();
    }

    let digits: String = trimmed.chars().filter(char::is_ascii_digit).collect();
    let group = |sizes: &[usize]| {
        let mut parts = Vec::with_capacity(sizes.len());
        let mut start = 0;
        for size in sizes {
            parts.push(&digits[start..start + size]);
            start += size;
        }
        parts.join("-")
    };

    match digits.len() {
        9 if digits.starts_with("02") => group(&[2, 3, 4]),
        10 if digits.starts_with("02") => group(&[2, 4, 4]),
        10 => group(&[3, 3, 4]),
        11 => group(&[3, 4, 4]),
        _ => trimmed.to_string(),
    }
}

/// First letter of each word, uppercased, at most two.
pub fn initials(name: &str) -> String {
    let initials: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect();
    if initials.is_empty() {
        FALLBACK_INITIALS.to_string()
    } else {
        initials
    }
}

pub fn project_row(record: &ResumeRecordWithId) -> ResumeTableRow {
    let profile = &record.record.profile;
    let latest_work = record.record.work_experience.first();
    let display_name = record.display_name();

    let current_role = latest_work
        .and_then(|work| non_blank(&work.final_position))
        .or_else(|| non_blank(&profile.position_title))
        .unwrap_or(PLACEHOLDER)
        .to_string();
    let current_company = latest_work
        .and_then(|work| non_blank(&work.company))
        .or_else(|| non_blank(&profile.affiliation))
        .unwrap_or(PLACEHOLDER)
        .to_string();

    ResumeTableRow {
        id: record.id.clone(),
        initials: initials(&display_name),
        display_name,
        photo_url: non_blank(&profile.photo_url).map(str::to_string),
        department: non_blank(&profile.department)
            .unwrap_or(UNASSIGNED)
            .to_string(),
        current_role,
        current_company,
        mobile_phone: format_phone(&profile.mobile_phone),
        email: or_placeholder(&profile.email),
        extension: or_placeholder(&profile.extension_number),
        updated_at: record.metadata.updated_at.clone(),
    }
}

pub fn project_rows<'a>(
    records: impl IntoIterator<Item = &'a ResumeRecordWithId>,
) -> Vec<ResumeTableRow> {
    records.into_iter().map(project_row).collect()
}

pub fn compute_stats<'a>(records: impl IntoIterator<Item = &'a ResumeRecordWithId>) -> ResumeStats {
    let mut stats = ResumeStats::default();
    let mut departments = HashSet::new();
    for record in records {
        let profile = &record.record.profile;
        stats.total += 1;
        if non_blank(&profile.photo_url).is_some() {
            stats.with_photo += 1;
        }
        if non_blank(&profile.email).is_some() {
            stats.with_email += 1;
        }
        if let Some(department) = non_blank(&profile.department) {
            departments.insert(department);
        }
    }
    stats.departments = departments.len();
    stats
}

pub fn directory_view(
    records: &[ResumeRecordWithId],
    simple: &SimpleFilters,
    advanced: &AdvancedFilters,
) -> DirectoryView {
    let matched = filter_records(records, simple, advanced);
    DirectoryView {
        rows: project_rows(matched.iter().copied()),
        stats: compute_stats(matched.iter().copied()),
        total: records.len(),
        matched: matched.len(),
        has_active_advanced_filters: advanced.is_active(),
    }
}

struct CachedView {
    records: Arc<Vec<ResumeRecordWithId>>,
    simple: SimpleFilters,
    advanced: AdvancedFilters,
    view: Arc<DirectoryView>,
}

/// Remembers the last directory view. A hit requires the very same record
/// snapshot (pointer equality) and equal filters.
#[derive(Default)]
pub struct ProjectionCache {
    last: Mutex<Option<CachedView>>,
}

impl ProjectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(
        &self,
        records: &Arc<Vec<ResumeRecordWithId>>,
        simple: &SimpleFilters,
        advanced: &AdvancedFilters,
    ) -> Arc<DirectoryView> {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(cached) = last.as_ref() {
            if Arc::ptr_eq(&cached.records, records)
                && cached.simple == *simple
                && cached.advanced == *advanced
            {
                return cached.view.clone();
            }
        }

        let view = Arc::new(directory_view(records, simple, advanced));
        *last = Some(CachedView {
            records: records.clone(),
            simple: simple.clone(),
            advanced: advanced.clone(),
            view: view.clone(),
        });
        view
    }
}
