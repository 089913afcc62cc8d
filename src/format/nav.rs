//! Navigation plumbing the host asks the format for.

use crate::format::options::CourseDisplay;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default)]
pub struct ViewUrlOptions {
    /// Section to return to from a multi-page view; `Some(0)` forces the
    /// single-page view.
    pub return_section: Option<i64>,
    /// Navigation links are suppressed for sections without their own page.
    pub navigation: bool,
}

/// URL of the course page, optionally pointing at one section. Returns
/// `None` for navigation requests to a section that has no page of its own.
pub fn view_url(
    course_id: i64,
    course_display: CourseDisplay,
    section: Option<i64>,
    options: &ViewUrlOptions,
) -> Option<String> {
    let base = format!("/course/view.php?id={}", course_id);
    let Some(mut section_no) = section else {
        return Some(base);
    };

    let display = match options.return_section {
        Some(sr) if sr != 0 => {
            section_no = sr;
            CourseDisplay::MultiPage
        }
        Some(_) => CourseDisplay::SinglePage,
        None => course_display,
    };

    if section_no != 0 && display == CourseDisplay::MultiPage {
        Some(format!("{}&section={}", base, section_no))
    } else if options.navigation {
        None
    } else {
        Some(format!("{}#section-{}", base, section_no))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DefaultBlocks {
    pub left: Vec<&'static str>,
    pub right: Vec<&'static str>,
}

/// Blocks added to a course created with this format.
pub fn default_blocks() -> DefaultBlocks {
    DefaultBlocks {
        left: Vec::new(),
        right: vec![
            "search_forums",
            "news_items",
            "calendar_upcoming",
            "recent_activity",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_page_links_to_anchor() {
        let url = view_url(5, CourseDisplay::SinglePage, Some(3), &ViewUrlOptions::default());
        assert_eq!(url.as_deref(), Some("/course/view.php?id=5#section-3"));
    }

    #[test]
    fn multi_page_links_to_section_page() {
        let url = view_url(5, CourseDisplay::MultiPage, Some(3), &ViewUrlOptions::default());
        assert_eq!(url.as_deref(), Some("/course/view.php?id=5&section=3"));
        let general = view_url(5, CourseDisplay::MultiPage, Some(0), &ViewUrlOptions::default());
        assert_eq!(general.as_deref(), Some("/course/view.php?id=5#section-0"));
    }

    #[test]
    fn return_section_overrides_course_display() {
        let back = ViewUrlOptions {
            return_section: Some(7),
            navigation: false,
        };
        assert_eq!(
            view_url(5, CourseDisplay::SinglePage, Some(2), &back).as_deref(),
            Some("/course/view.php?id=5&section=7")
        );
        let single = ViewUrlOptions {
            return_section: Some(0),
            navigation: true,
        };
        assert_eq!(view_url(5, CourseDisplay::MultiPage, Some(2), &single), None);
    }

    #[test]
    fn no_section_is_course_page() {
        assert_eq!(
            view_url(5, CourseDisplay::MultiPage, None, &ViewUrlOptions::default()).as_deref(),
            Some("/course/view.php?id=5")
        );
    }
}
