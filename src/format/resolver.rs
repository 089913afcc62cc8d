//! Derived display values for a section: its label, its date span and whether
//! it is the current one.

use crate::format::host::{Course, DateFormatter, HostCurrentRule, Localizer, Section};
use crate::format::options::{CourseDisplay, CourseLayoutSettings, LayoutStructure};
use crate::format::strings::COMPONENT;

/// Added to the course start so a daylight saving change cannot roll a date
/// onto the previous calendar day.
pub const DST_GUARD_SECONDS: i64 = 7200;
pub const DAY_SECONDS: i64 = 86_400;
pub const WEEK_SECONDS: i64 = 604_800;

/// Half-open `[start, end)` span of a week-based section.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectionWeek {
    pub start: i64,
    pub end: i64,
}

pub fn section_week(section_number: i64, start_date: i64) -> SectionWeek {
    // Saturates for section numbers far past any real course.
    let start = start_date
        .saturating_add(DST_GUARD_SECONDS)
        .saturating_add(WEEK_SECONDS.saturating_mul(section_number.saturating_sub(1)));
    SectionWeek {
        start,
        end: start.saturating_add(WEEK_SECONDS),
    }
}

pub fn section_day(section_number: i64, start_date: i64) -> i64 {
    start_date
        .saturating_add(DST_GUARD_SECONDS)
        .saturating_add(DAY_SECONDS.saturating_mul(section_number.saturating_sub(1)))
}

pub fn section_label(
    section: &Section,
    course: &Course,
    settings: &CourseLayoutSettings,
    strings: &dyn Localizer,
    dates: &dyn DateFormatter,
) -> String {
    let mut label = match section.name.as_deref() {
        Some(name) if !name.is_empty() => name.to_string(),
        _ if section.number == 0 => strings.translate("section0name", COMPONENT),
        _ if settings.layout_structure.uses_topic_label() => format!(
            "{} {}",
            strings.translate("sectionname", COMPONENT),
            section.number
        ),
        _ => section_date_label(section, course, settings, dates),
    };

    if course.course_display == CourseDisplay::SinglePage
        && section.number != 0
        && settings.layout_element.shows_toggle_word()
    {
        label.push_str(" - ");
        label.push_str(&strings.translate("topcolltoggle", COMPONENT));
    }
    label
}

pub fn section_date_label(
    section: &Section,
    course: &Course,
    settings: &CourseLayoutSettings,
    dates: &dyn DateFormatter,
) -> String {
    if settings.layout_structure == LayoutStructure::Day {
        return dates.short_date(section_day(section.number, course.start_date));
    }
    let week = section_week(section.number, course.start_date);
    // The displayed range ends on the last day inside the week.
    let display_end = week.end.saturating_sub(DAY_SECONDS);
    format!(
        "{} - {}",
        dates.short_date(week.start),
        dates.short_date(display_end)
    )
}

pub fn is_section_current(
    section: &Section,
    course: &Course,
    settings: &CourseLayoutSettings,
    now: i64,
    host_rule: &dyn HostCurrentRule,
) -> bool {
    let structure = settings.layout_structure;
    if structure.is_week_based() {
        if section.number < 1 {
            return false;
        }
        let week = section_week(section.number, course.start_date);
        (week.start..week.end).contains(&now)
    } else if structure == LayoutStructure::Day {
        if section.number < 1 {
            return false;
        }
        let day = section_day(section.number, course.start_date);
        (day..day.saturating_add(DAY_SECONDS)).contains(&now)
    } else {
        host_rule.is_current(section, course)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::host::{MarkerRule, UtcShortDate};
    use crate::format::options::LayoutElement;
    use crate::format::strings::StringTable;

    const T: i64 = 1_700_000_000;

    fn course(display: CourseDisplay) -> Course {
        Course {
            id: 7,
            start_date: T,
            course_display: display,
            marker: 0,
            format: "topcoll".into(),
        }
    }

    fn section(number: i64) -> Section {
        Section {
            course_id: 7,
            number,
            name: None,
        }
    }

    fn settings(structure: LayoutStructure, element: i64) -> CourseLayoutSettings {
        CourseLayoutSettings {
            layout_structure: structure,
            layout_element: LayoutElement::from_code(element).expect("element"),
            ..CourseLayoutSettings::default()
        }
    }

    /// Formats timestamps verbatim so the arithmetic is visible in labels.
    struct RawDates;

    impl DateFormatter for RawDates {
        fn short_date(&self, timestamp: i64) -> String {
            timestamp.to_string()
        }
    }

    #[test]
    fn general_section_label_ignores_structure() {
        let c = course(CourseDisplay::SinglePage);
        for code in 1..=5 {
            let s = settings(LayoutStructure::from_code(code).unwrap(), 1);
            assert_eq!(
                section_label(&section(0), &c, &s, &StringTable, &RawDates),
                "General"
            );
        }
    }

    #[test]
    fn named_section_keeps_its_name() {
        let c = course(CourseDisplay::MultiPage);
        let s = settings(LayoutStructure::Week, 1);
        let named = Section {
            name: Some("Revision week".into()),
            ..section(4)
        };
        assert_eq!(
            section_label(&named, &c, &s, &StringTable, &RawDates),
            "Revision week"
        );
        let blank = Section {
            name: Some(String::new()),
            ..section(4)
        };
        assert_ne!(
            section_label(&blank, &c, &s, &StringTable, &RawDates),
            ""
        );
    }

    #[test]
    fn topic_label_gets_toggle_word_on_single_page_only() {
        let s = settings(LayoutStructure::Topic, 1);
        assert_eq!(
            section_label(
                &section(2),
                &course(CourseDisplay::SinglePage),
                &s,
                &StringTable,
                &RawDates
            ),
            "Topic 2 - Toggle"
        );
        assert_eq!(
            section_label(
                &section(2),
                &course(CourseDisplay::MultiPage),
                &s,
                &StringTable,
                &RawDates
            ),
            "Topic 2"
        );
        let quiet = settings(LayoutStructure::CurrentTopicFirst, 5);
        assert_eq!(
            section_label(
                &section(2),
                &course(CourseDisplay::SinglePage),
                &quiet,
                &StringTable,
                &RawDates
            ),
            "Topic 2"
        );
    }

    #[test]
    fn day_structure_offsets_by_dst_guard() {
        let c = course(CourseDisplay::MultiPage);
        let s = settings(LayoutStructure::Day, 1);
        assert_eq!(
            section_date_label(&section(1), &c, &s, &RawDates),
            (T + 7200).to_string()
        );
        assert_eq!(
            section_date_label(&section(2), &c, &s, &RawDates),
            (T + 7200 + 86_400).to_string()
        );
    }

    #[test]
    fn week_display_window_is_six_days_inclusive() {
        let c = course(CourseDisplay::MultiPage);
        let s = settings(LayoutStructure::Week, 1);
        assert_eq!(
            section_date_label(&section(1), &c, &s, &RawDates),
            format!("{} - {}", T + 7200, T + 7200 + 604_800 - 86_400)
        );
    }

    #[test]
    fn week_label_for_third_section() {
        let c = course(CourseDisplay::MultiPage);
        let s = settings(LayoutStructure::Week, 1);
        // Start 2023-11-14T22:13:20Z, +2h, +2 weeks = 2023-11-29.
        assert_eq!(
            section_label(&section(3), &c, &s, &StringTable, &UtcShortDate),
            "29 November - 5 December"
        );
    }

    #[test]
    fn week_current_is_half_open() {
        let c = course(CourseDisplay::SinglePage);
        let s = settings(LayoutStructure::LatestWeekFirst, 1);
        let week = section_week(2, T);
        let sec = section(2);
        assert!(!is_section_current(&sec, &c, &s, week.start - 1, &MarkerRule));
        assert!(is_section_current(&sec, &c, &s, week.start, &MarkerRule));
        assert!(is_section_current(&sec, &c, &s, week.end - 1, &MarkerRule));
        assert!(!is_section_current(&sec, &c, &s, week.end, &MarkerRule));
    }

    #[test]
    fn day_current_spans_one_day() {
        let c = course(CourseDisplay::SinglePage);
        let s = settings(LayoutStructure::Day, 1);
        let day = section_day(3, T);
        assert!(is_section_current(&section(3), &c, &s, day, &MarkerRule));
        assert!(!is_section_current(
            &section(3),
            &c,
            &s,
            day + DAY_SECONDS,
            &MarkerRule
        ));
        assert!(!is_section_current(&section(0), &c, &s, T, &MarkerRule));
    }

    #[test]
    fn huge_section_numbers_saturate() {
        let week = section_week(100_000_000_000_000, T);
        assert_eq!(week.start, i64::MAX);
        assert_eq!(week.end, i64::MAX);
        assert_eq!(section_day(i64::MAX, i64::MAX), i64::MAX);

        let c = course(CourseDisplay::MultiPage);
        let huge = section(100_000_000_000_000);
        let week_based = settings(LayoutStructure::Week, 1);
        assert_eq!(
            section_label(&huge, &c, &week_based, &StringTable, &RawDates),
            format!("{} - {}", i64::MAX, i64::MAX - DAY_SECONDS)
        );
        assert!(!is_section_current(&huge, &c, &week_based, T, &MarkerRule));
        let day_based = settings(LayoutStructure::Day, 1);
        assert!(!is_section_current(&huge, &c, &day_based, T, &MarkerRule));
    }

    #[test]
    fn topic_structures_defer_to_marker() {
        let c = Course {
            marker: 4,
            ..course(CourseDisplay::SinglePage)
        };
        let s = settings(LayoutStructure::CurrentTopicFirst, 1);
        assert!(is_section_current(&section(4), &c, &s, 0, &MarkerRule));
        assert!(!is_section_current(&section(3), &c, &s, 0, &MarkerRule));
    }
}
