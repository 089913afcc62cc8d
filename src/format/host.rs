//! Collaborator contracts between the format core and its host.

use crate::error::FormatResult;
use crate::format::options::CourseDisplay;
use chrono::DateTime;
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Course {
    pub id: i64,
    /// Epoch seconds.
    pub start_date: i64,
    pub course_display: CourseDisplay,
    /// Highlighted section, 0 when none.
    pub marker: i64,
    pub format: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Section {
    pub course_id: i64,
    pub number: i64,
    pub name: Option<String>,
}

/// One stored `(course, format, name) -> value` row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionRow {
    pub id: i64,
    pub course_id: i64,
    pub name: String,
    pub value: String,
}

pub trait FormatOptionStore {
    fn options(&self, course_id: i64, format: &str) -> FormatResult<Vec<OptionRow>>;

    /// Every row stored for `format`, ordered by course then row id.
    fn all_options(&self, format: &str) -> FormatResult<Vec<OptionRow>>;

    fn upsert(
        &self,
        course_id: i64,
        format: &str,
        fields: &BTreeMap<String, String>,
    ) -> FormatResult<()>;

    fn max_section_number(&self, course_id: i64) -> FormatResult<Option<i64>>;

    fn delete_options(&self, course_id: i64, format: &str) -> FormatResult<usize>;

    /// Removes every user's toggle preference for the course.
    fn delete_user_preferences(&self, course_id: i64) -> FormatResult<usize>;
}

pub trait CourseAccessor {
    fn course(&self, course_id: i64) -> FormatResult<Option<Course>>;
    fn section(&self, course_id: i64, number: i64) -> FormatResult<Option<Section>>;
    fn sections(&self, course_id: i64) -> FormatResult<Vec<Section>>;
}

pub trait UserPreferenceStore {
    fn preference(&self, user_id: i64, name: &str) -> FormatResult<Option<String>>;
    fn set_preference(&self, user_id: i64, name: &str, value: &str) -> FormatResult<()>;
}

pub trait Localizer {
    fn translate(&self, key: &str, component: &str) -> String;
}

pub trait DateFormatter {
    fn short_date(&self, timestamp: i64) -> String;
}

/// Day of month and month name in UTC, e.g. `14 November`.
#[derive(Clone, Copy, Debug, Default)]
pub struct UtcShortDate;

impl DateFormatter for UtcShortDate {
    fn short_date(&self, timestamp: i64) -> String {
        match DateTime::from_timestamp(timestamp, 0) {
            Some(dt) => dt.format("%-d %B").to_string(),
            None => timestamp.to_string(),
        }
    }
}

/// The host's rule for formats that do not compute their own current section.
pub trait HostCurrentRule {
    fn is_current(&self, section: &Section, course: &Course) -> bool;
}

/// A section is current when the course marker points at it.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkerRule;

impl HostCurrentRule for MarkerRule {
    fn is_current(&self, section: &Section, course: &Course) -> bool {
        section.number != 0 && course.marker == section.number
    }
}

/// Capability: names a section for display.
pub trait SectionLabelProvider {
    fn section_name(&self, section: &Section) -> FormatResult<String>;
}

/// Capability: decides whether a section is the current one at `now`.
pub trait CurrentSectionPredicate {
    fn is_section_current(&self, section: &Section, now: i64) -> FormatResult<bool>;
}
