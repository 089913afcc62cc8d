use crate::format::host::Localizer;

pub const COMPONENT: &str = "format_topcoll";
pub const CORE_COMPONENT: &str = "moodle";

/// English strings for the format and the handful of core strings it borrows.
static STRINGS: &[(&str, &str, &str)] = &[
    (COMPONENT, "section0name", "General"),
    (COMPONENT, "sectionname", "Topic"),
    (COMPONENT, "topcolltoggle", "Toggle"),
    (COMPONENT, "numbersections", "Number of sections"),
    (COMPONENT, "setlayoutelements", "Set the elements"),
    (COMPONENT, "setlayout_default", "Default"),
    (COMPONENT, "setlayout_no_toggle_section_x", "No 'Topic x' / 'Week x' / 'Day x'"),
    (COMPONENT, "setlayout_no_section_no", "No section number"),
    (
        COMPONENT,
        "setlayout_no_toggle_section_x_section_no",
        "No 'Topic x' / 'Week x' / 'Day x' and no section number",
    ),
    (COMPONENT, "setlayout_no_toggle_word", "No 'Toggle' word"),
    (
        COMPONENT,
        "setlayout_no_toggle_word_toggle_section_x",
        "No 'Toggle' word and no 'Topic x' / 'Week x' / 'Day x'",
    ),
    (
        COMPONENT,
        "setlayout_no_toggle_word_toggle_section_x_section_no",
        "No 'Toggle' word, no 'Topic x' / 'Week x' / 'Day x' and no section number",
    ),
    (COMPONENT, "setlayoutstructure", "Set the structure"),
    (COMPONENT, "setlayoutstructuretopic", "Topic"),
    (COMPONENT, "setlayoutstructureweek", "Week"),
    (COMPONENT, "setlayoutstructurelatweekfirst", "Latest Week First"),
    (COMPONENT, "setlayoutstructurecurrenttopicfirst", "Current Topic First"),
    (COMPONENT, "setlayoutstructureday", "Day"),
    (COMPONENT, "setlayoutcolumns", "Set the columns"),
    (COMPONENT, "one", "One"),
    (COMPONENT, "two", "Two"),
    (COMPONENT, "three", "Three"),
    (COMPONENT, "four", "Four"),
    (COMPONENT, "setlayoutcolumnorientation", "Set the column orientation"),
    (COMPONENT, "columnvertical", "Vertical"),
    (COMPONENT, "columnhorizontal", "Horizontal"),
    (COMPONENT, "settogglealignment", "Set the toggle text alignment"),
    (COMPONENT, "left", "Left"),
    (COMPONENT, "center", "Centre"),
    (COMPONENT, "right", "Right"),
    (COMPONENT, "settoggleiconset", "Set the icon set"),
    (COMPONENT, "arrow", "Arrow"),
    (COMPONENT, "point", "Point"),
    (COMPONENT, "power", "Power"),
    (COMPONENT, "settoggleforegroundcolour", "Set the toggle foreground"),
    (COMPONENT, "settogglebackgroundcolour", "Set the toggle background"),
    (COMPONENT, "settogglebackgroundhovercolour", "Set the toggle background hover"),
    (COMPONENT, "ctreset", "Collapsed Topics reset options"),
    (COMPONENT, "resetlayout", "Layout"),
    (COMPONENT, "resetcolour", "Colour"),
    (COMPONENT, "resettogglealignment", "Toggle alignment"),
    (COMPONENT, "resettoggleiconset", "Toggle icon set"),
    (COMPONENT, "resetalllayout", "Layouts"),
    (COMPONENT, "resetallcolour", "Colours"),
    (COMPONENT, "resetalltogglealignment", "Toggle alignments"),
    (COMPONENT, "resetalltoggleiconset", "Toggle icon sets"),
    (CORE_COMPONENT, "hiddensections", "Hidden sections"),
    (CORE_COMPONENT, "hiddensectionscollapsed", "Hidden sections are shown in collapsed form"),
    (CORE_COMPONENT, "hiddensectionsinvisible", "Hidden sections are completely invisible"),
    (CORE_COMPONENT, "coursedisplay", "Course layout"),
    (CORE_COMPONENT, "coursedisplay_single", "Show all sections on one page"),
    (CORE_COMPONENT, "coursedisplay_multi", "Show one section per page"),
];

/// Built-in string table. Unknown keys render as `[[key]]`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StringTable;

impl Localizer for StringTable {
    fn translate(&self, key: &str, component: &str) -> String {
        STRINGS
            .iter()
            .find(|(c, k, _)| *c == component && *k == key)
            .map(|(_, _, text)| (*text).to_string())
            .unwrap_or_else(|| format!("[[{}]]", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_are_scoped_by_component() {
        assert_eq!(StringTable.translate("section0name", COMPONENT), "General");
        assert_eq!(
            StringTable.translate("section0name", CORE_COMPONENT),
            "[[section0name]]"
        );
    }
}
