//! Course edit form fields for the format's options, as data. Rendering is
//! the host's job.

use crate::config::FormatDefaults;
use crate::format::host::Localizer;
use crate::format::options::*;
use crate::format::strings::{COMPONENT, CORE_COMPONENT};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementType {
    Header,
    Select,
    ColourPopup,
    Checkbox,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub value: String,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub element: ElementType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help_component: Option<&'static str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub advanced: bool,
}

impl FormField {
    fn new(name: &str, label: String, element: ElementType) -> Self {
        Self {
            name: name.to_string(),
            label,
            element,
            help_component: None,
            choices: Vec::new(),
            default: None,
            advanced: false,
        }
    }

    fn help(mut self, component: &'static str) -> Self {
        self.help_component = Some(component);
        self
    }

    fn advanced(mut self) -> Self {
        self.advanced = true;
        self
    }
}

struct Fields<'a> {
    strings: &'a dyn Localizer,
    defaults: &'a FormatDefaults,
}

impl Fields<'_> {
    fn t(&self, key: &str) -> String {
        self.strings.translate(key, COMPONENT)
    }

    fn core(&self, key: &str) -> String {
        self.strings.translate(key, CORE_COMPONENT)
    }

    fn select(&self, name: &str, label: String, choices: Vec<(String, String)>) -> FormField {
        let mut f = FormField::new(name, label, ElementType::Select);
        f.choices = choices
            .into_iter()
            .map(|(value, label)| Choice { value, label })
            .collect();
        f.default = self.defaults.value(name);
        f
    }

    fn numbered(&self, keys: &[&str]) -> Vec<(String, String)> {
        keys.iter()
            .enumerate()
            .map(|(i, k)| ((i + 1).to_string(), self.t(k)))
            .collect()
    }

    fn colour(&self, name: &str, label_key: &str) -> FormField {
        let mut f = FormField::new(name, self.t(label_key), ElementType::ColourPopup).help(COMPONENT);
        f.default = self.defaults.value(name);
        f
    }
}

/// Fields for the course edit form. Reset checkboxes for every course are
/// only offered to site administrators.
pub fn edit_form_fields(
    strings: &dyn Localizer,
    defaults: &FormatDefaults,
    is_site_admin: bool,
) -> Vec<FormField> {
    let f = Fields { strings, defaults };
    let mut out = Vec::new();

    let sections = (0..=defaults.max_sections)
        .map(|i| (i.to_string(), i.to_string()))
        .collect();
    out.push(f.select(NUMSECTIONS, f.t("numbersections"), sections));
    out.push(
        f.select(
            HIDDENSECTIONS,
            f.core("hiddensections"),
            vec![
                ("0".into(), f.core("hiddensectionscollapsed")),
                ("1".into(), f.core("hiddensectionsinvisible")),
            ],
        )
        .help(CORE_COMPONENT),
    );
    out.push(
        f.select(
            COURSEDISPLAY,
            f.core("coursedisplay"),
            vec![
                ("0".into(), f.core("coursedisplay_single")),
                ("1".into(), f.core("coursedisplay_multi")),
            ],
        )
        .help(CORE_COMPONENT),
    );
    out.push(
        f.select(
            LAYOUTELEMENT,
            f.t("setlayoutelements"),
            f.numbered(&[
                "setlayout_default",
                "setlayout_no_toggle_section_x",
                "setlayout_no_section_no",
                "setlayout_no_toggle_section_x_section_no",
                "setlayout_no_toggle_word",
                "setlayout_no_toggle_word_toggle_section_x",
                "setlayout_no_toggle_word_toggle_section_x_section_no",
            ]),
        )
        .help(COMPONENT),
    );
    out.push(
        f.select(
            LAYOUTSTRUCTURE,
            f.t("setlayoutstructure"),
            f.numbered(&[
                "setlayoutstructuretopic",
                "setlayoutstructureweek",
                "setlayoutstructurelatweekfirst",
                "setlayoutstructurecurrenttopicfirst",
                "setlayoutstructureday",
            ]),
        )
        .help(COMPONENT),
    );
    out.push(
        f.select(
            LAYOUTCOLUMNS,
            f.t("setlayoutcolumns"),
            f.numbered(&["one", "two", "three", "four"]),
        )
        .help(COMPONENT),
    );
    out.push(
        f.select(
            LAYOUTCOLUMNORIENTATION,
            f.t("setlayoutcolumnorientation"),
            f.numbered(&["columnvertical", "columnhorizontal"]),
        )
        .help(COMPONENT),
    );
    out.push(
        f.select(
            TOGGLEALIGNMENT,
            f.t("settogglealignment"),
            f.numbered(&["left", "center", "right"]),
        )
        .help(COMPONENT),
    );
    out.push(
        f.select(
            TOGGLEICONSET,
            f.t("settoggleiconset"),
            ["arrow", "point", "power"]
                .iter()
                .map(|k| (k.to_string(), f.t(k)))
                .collect(),
        )
        .help(COMPONENT),
    );
    out.push(f.colour(TOGGLEFOREGROUNDCOLOUR, "settoggleforegroundcolour"));
    out.push(f.colour(TOGGLEBACKGROUNDCOLOUR, "settogglebackgroundcolour"));
    out.push(f.colour(TOGGLEBACKGROUNDHOVERCOLOUR, "settogglebackgroundhovercolour"));

    out.push(FormField::new("ctreset", f.t("ctreset"), ElementType::Header).help(COMPONENT));
    let mut resets = vec![
        "resetlayout",
        "resetcolour",
        "resettogglealignment",
        "resettoggleiconset",
    ];
    if is_site_admin {
        resets.extend([
            "resetalllayout",
            "resetallcolour",
            "resetalltogglealignment",
            "resetalltoggleiconset",
        ]);
    }
    for name in resets {
        out.push(
            FormField::new(name, f.t(name), ElementType::Checkbox)
                .help(COMPONENT)
                .advanced(),
        );
    }
    out
}
