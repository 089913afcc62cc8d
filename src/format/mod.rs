//! The Collapsed Topics course format: section labels, current-section
//! rules and per-course layout options.

pub mod form;
pub mod host;
pub mod nav;
pub mod options;
pub mod reconciler;
pub mod resolver;
pub mod strings;
pub mod toggles;

use crate::config::FormatDefaults;
use crate::error::{FormatError, FormatResult};
use host::{
    Course, CourseAccessor, CurrentSectionPredicate, DateFormatter, FormatOptionStore,
    HostCurrentRule, Localizer, Section, SectionLabelProvider,
};
use options::CourseLayoutSettings;
use reconciler::{ChangeSet, SettingsReconciler};
use serde_json::{Map, Value};
use std::cell::OnceCell;

/// Everything a format instance borrows from its host.
#[derive(Clone, Copy)]
pub struct HostServices<'a> {
    pub strings: &'a dyn Localizer,
    pub dates: &'a dyn DateFormatter,
    pub current_rule: &'a dyn HostCurrentRule,
    pub defaults: &'a FormatDefaults,
}

/// The format bound to one course for the lifetime of one request. The
/// course's settings are resolved on first use and then reused.
pub struct CourseFormat<'a, S> {
    course_id: i64,
    store: &'a S,
    host: HostServices<'a>,
    settings: OnceCell<CourseLayoutSettings>,
}

impl<'a, S> CourseFormat<'a, S>
where
    S: FormatOptionStore + CourseAccessor,
{
    pub fn new(course_id: i64, store: &'a S, host: HostServices<'a>) -> Self {
        Self {
            course_id,
            store,
            host,
            settings: OnceCell::new(),
        }
    }

    fn reconciler(&self) -> SettingsReconciler<'a, S> {
        SettingsReconciler::new(self.store, self.host.defaults)
    }

    pub fn settings(&self) -> FormatResult<&CourseLayoutSettings> {
        if let Some(s) = self.settings.get() {
            return Ok(s);
        }
        let resolved = self.reconciler().effective(self.course_id)?;
        Ok(self.settings.get_or_init(|| resolved))
    }

    /// The course record with its display mode taken from the format options.
    pub fn course(&self) -> FormatResult<Course> {
        let mut course = self
            .store
            .course(self.course_id)?
            .ok_or(FormatError::CourseNotFound(self.course_id))?;
        course.course_display = self.settings()?.course_display;
        Ok(course)
    }

    pub fn section(&self, number: i64) -> FormatResult<Section> {
        self.store
            .section(self.course_id, number)?
            .ok_or(FormatError::SectionNotFound {
                course_id: self.course_id,
                section: number,
            })
    }

    pub fn section_dates(&self, section: &Section) -> FormatResult<String> {
        Ok(resolver::section_date_label(
            section,
            &self.course()?,
            self.settings()?,
            self.host.dates,
        ))
    }

    /// Labels of every section, keyed by section number. Sent back to the
    /// page after sections are reordered.
    pub fn section_titles(&self) -> FormatResult<Vec<(i64, String)>> {
        let course = self.course()?;
        let settings = self.settings()?;
        Ok(self
            .store
            .sections(self.course_id)?
            .into_iter()
            .map(|s| {
                let label = resolver::section_label(
                    &s,
                    &course,
                    settings,
                    self.host.strings,
                    self.host.dates,
                );
                (s.number, label)
            })
            .collect())
    }

    pub fn view_url(
        &self,
        section: Option<i64>,
        options: &nav::ViewUrlOptions,
    ) -> FormatResult<Option<String>> {
        let course = self.course()?;
        Ok(nav::view_url(
            course.id,
            course.course_display,
            section,
            options,
        ))
    }

    /// Applies an edit-form submission. The memoized settings are dropped so
    /// later reads see the stored result.
    pub fn update(
        &mut self,
        data: &Map<String, Value>,
        previous: Option<&Map<String, Value>>,
    ) -> FormatResult<ChangeSet> {
        let changes = self
            .reconciler()
            .apply_update(self.course_id, data, previous)?;
        self.settings.take();
        Ok(changes)
    }
}

impl<S> SectionLabelProvider for CourseFormat<'_, S>
where
    S: FormatOptionStore + CourseAccessor,
{
    fn section_name(&self, section: &Section) -> FormatResult<String> {
        Ok(resolver::section_label(
            section,
            &self.course()?,
            self.settings()?,
            self.host.strings,
            self.host.dates,
        ))
    }
}

impl<S> CurrentSectionPredicate for CourseFormat<'_, S>
where
    S: FormatOptionStore + CourseAccessor,
{
    fn is_section_current(&self, section: &Section, now: i64) -> FormatResult<bool> {
        Ok(resolver::is_section_current(
            section,
            &self.course()?,
            self.settings()?,
            now,
            self.host.current_rule,
        ))
    }
}

/// The word used for one section of this format.
pub fn definition(strings: &dyn Localizer) -> String {
    strings.translate("sectionname", strings::COMPONENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{self, SqliteStore};
    use host::{MarkerRule, UtcShortDate};
    use serde_json::json;
    use strings::StringTable;

    fn host(defaults: &FormatDefaults) -> HostServices<'_> {
        HostServices {
            strings: &StringTable,
            dates: &UtcShortDate,
            current_rule: &MarkerRule,
            defaults,
        }
    }

    fn seed(conn: &rusqlite::Connection) {
        conn.execute(
            "INSERT INTO courses(id, startdate, format, marker) VALUES(1, 1700000000, 'topcoll', 2)",
            [],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO course_sections(course, section, name) VALUES(1, 0, NULL), (1, 1, NULL), (1, 2, 'Fractions')",
            [],
        )
        .unwrap();
    }

    #[test]
    fn settings_are_memoized_until_update() {
        let conn = db::open_in_memory().unwrap();
        seed(&conn);
        let store = SqliteStore::new(&conn);
        let defaults = FormatDefaults::default();
        let mut format = CourseFormat::new(1, &store, host(&defaults));

        assert_eq!(format.settings().unwrap().layout_columns, 1);
        conn.execute(
            "INSERT INTO course_format_options(courseid, format, name, value) VALUES(1, 'topcoll', 'layoutcolumns', '3')",
            [],
        )
        .unwrap();
        // Still the first resolution.
        assert_eq!(format.settings().unwrap().layout_columns, 1);

        format
            .update(json!({ "layoutcolumns": 4 }).as_object().unwrap(), None)
            .unwrap();
        assert_eq!(format.settings().unwrap().layout_columns, 4);
    }

    #[test]
    fn section_titles_cover_every_section() {
        let conn = db::open_in_memory().unwrap();
        seed(&conn);
        let store = SqliteStore::new(&conn);
        let defaults = FormatDefaults::default();
        let format = CourseFormat::new(1, &store, host(&defaults));

        let titles = format.section_titles().unwrap();
        assert_eq!(
            titles,
            vec![
                (0, "General".to_string()),
                (1, "Topic 1 - Toggle".to_string()),
                (2, "Fractions - Toggle".to_string()),
            ]
        );
    }

    #[test]
    fn capability_traits_use_course_settings() {
        let conn = db::open_in_memory().unwrap();
        seed(&conn);
        let store = SqliteStore::new(&conn);
        let defaults = FormatDefaults::default();
        let format = CourseFormat::new(1, &store, host(&defaults));

        let labels: &dyn SectionLabelProvider = &format;
        let current: &dyn CurrentSectionPredicate = &format;
        let second = format.section(2).unwrap();
        assert_eq!(labels.section_name(&second).unwrap(), "Fractions - Toggle");
        assert!(current.is_section_current(&second, 0).unwrap());
        assert!(matches!(
            format.section(9),
            Err(FormatError::SectionNotFound { section: 9, .. })
        ));
    }

    #[test]
    fn missing_course_is_not_found() {
        let conn = db::open_in_memory().unwrap();
        let store = SqliteStore::new(&conn);
        let defaults = FormatDefaults::default();
        let format = CourseFormat::new(42, &store, host(&defaults));
        assert!(matches!(format.course(), Err(FormatError::CourseNotFound(42))));
    }
}
