//! The option schema for the Collapsed Topics format and the typed settings
//! record resolved from it.

use crate::error::{FormatError, FormatResult};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const FORMAT_NAME: &str = "topcoll";

pub const NUMSECTIONS: &str = "numsections";
pub const HIDDENSECTIONS: &str = "hiddensections";
pub const COURSEDISPLAY: &str = "coursedisplay";
pub const LAYOUTELEMENT: &str = "layoutelement";
pub const LAYOUTSTRUCTURE: &str = "layoutstructure";
pub const LAYOUTCOLUMNS: &str = "layoutcolumns";
pub const LAYOUTCOLUMNORIENTATION: &str = "layoutcolumnorientation";
pub const TOGGLEALIGNMENT: &str = "togglealignment";
pub const TOGGLEICONSET: &str = "toggleiconset";
pub const TOGGLEFOREGROUNDCOLOUR: &str = "toggleforegroundcolour";
pub const TOGGLEBACKGROUNDCOLOUR: &str = "togglebackgroundcolour";
pub const TOGGLEBACKGROUNDHOVERCOLOUR: &str = "togglebackgroundhovercolour";

/// How a submitted value is cleaned before it is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamType {
    Int,
    Alpha,
    AlphaNum,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ResetCategory {
    Layout,
    Colour,
    ToggleAlignment,
    ToggleIconSet,
}

impl ResetCategory {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "layout" => Some(Self::Layout),
            "colour" | "color" => Some(Self::Colour),
            "toggleAlignment" | "togglealignment" => Some(Self::ToggleAlignment),
            "toggleIconSet" | "toggleiconset" => Some(Self::ToggleIconSet),
            _ => None,
        }
    }

    /// Option keys overwritten when this category is reset.
    pub fn keys(self) -> impl Iterator<Item = &'static str> {
        OPTION_SCHEMA
            .iter()
            .filter(move |def| def.category == Some(self))
            .map(|def| def.key)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct OptionDef {
    pub key: &'static str,
    pub param: ParamType,
    pub category: Option<ResetCategory>,
}

const fn def(key: &'static str, param: ParamType, category: Option<ResetCategory>) -> OptionDef {
    OptionDef {
        key,
        param,
        category,
    }
}

/// Every option the format persists, in storage order.
pub static OPTION_SCHEMA: [OptionDef; 12] = [
    def(NUMSECTIONS, ParamType::Int, None),
    def(HIDDENSECTIONS, ParamType::Int, None),
    def(COURSEDISPLAY, ParamType::Int, Some(ResetCategory::Layout)),
    def(LAYOUTELEMENT, ParamType::Int, Some(ResetCategory::Layout)),
    def(LAYOUTSTRUCTURE, ParamType::Int, Some(ResetCategory::Layout)),
    def(LAYOUTCOLUMNS, ParamType::Int, Some(ResetCategory::Layout)),
    def(LAYOUTCOLUMNORIENTATION, ParamType::Int, Some(ResetCategory::Layout)),
    def(TOGGLEALIGNMENT, ParamType::Int, Some(ResetCategory::ToggleAlignment)),
    def(TOGGLEICONSET, ParamType::Alpha, Some(ResetCategory::ToggleIconSet)),
    def(TOGGLEFOREGROUNDCOLOUR, ParamType::AlphaNum, Some(ResetCategory::Colour)),
    def(TOGGLEBACKGROUNDCOLOUR, ParamType::AlphaNum, Some(ResetCategory::Colour)),
    def(TOGGLEBACKGROUNDHOVERCOLOUR, ParamType::AlphaNum, Some(ResetCategory::Colour)),
];

pub fn option_def(key: &str) -> Option<&'static OptionDef> {
    OPTION_SCHEMA.iter().find(|d| d.key == key)
}

/// Cleans a submitted value the way the host cleans form parameters.
///
/// Integers take the leading numeric prefix (`"12abc"` is 12, `"abc"` is 0),
/// alpha keeps ASCII letters and alphanumeric keeps ASCII letters and digits.
pub fn clean_value(def: &OptionDef, v: &Value) -> FormatResult<String> {
    let raw = match v {
        Value::Null => String::new(),
        Value::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
        Value::Number(n) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.as_f64().map(|f| (f.trunc() as i64).to_string()).unwrap_or_default(),
        },
        Value::String(s) => s.clone(),
        Value::Array(_) | Value::Object(_) => {
            return Err(FormatError::InvalidValue {
                key: def.key.to_string(),
                message: "must be a scalar".into(),
            })
        }
    };
    Ok(match def.param {
        ParamType::Int => leading_int(&raw).to_string(),
        ParamType::Alpha => raw.chars().filter(|c| c.is_ascii_alphabetic()).collect(),
        ParamType::AlphaNum => raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect(),
    })
}

fn leading_int(s: &str) -> i64 {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().map(|n| sign * n).unwrap_or(0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum CourseDisplay {
    SinglePage,
    MultiPage,
}

impl CourseDisplay {
    pub fn from_code(n: i64) -> Option<Self> {
        match n {
            0 => Some(Self::SinglePage),
            1 => Some(Self::MultiPage),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::SinglePage => 0,
            Self::MultiPage => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HiddenSections {
    Collapsed,
    Invisible,
}

impl HiddenSections {
    pub fn from_code(n: i64) -> Option<Self> {
        match n {
            0 => Some(Self::Collapsed),
            1 => Some(Self::Invisible),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Collapsed => 0,
            Self::Invisible => 1,
        }
    }
}

/// Which decorations appear on a section title, 1 through 7.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LayoutElement(u8);

impl LayoutElement {
    pub fn from_code(n: i64) -> Option<Self> {
        (1..=7).contains(&n).then_some(Self(n as u8))
    }

    pub fn code(self) -> i64 {
        i64::from(self.0)
    }

    /// Variants 5 to 7 drop the word "Toggle".
    pub fn shows_toggle_word(self) -> bool {
        self.0 <= 4
    }

    /// Whether the "Topic x" / "Week x" caption is drawn beside the toggle.
    pub fn shows_section_x(self) -> bool {
        !matches!(self.0, 2 | 4 | 6 | 7)
    }

    pub fn shows_section_number(self) -> bool {
        !matches!(self.0, 3 | 4 | 7)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LayoutStructure {
    Topic,
    Week,
    LatestWeekFirst,
    CurrentTopicFirst,
    Day,
}

impl LayoutStructure {
    pub fn from_code(n: i64) -> Option<Self> {
        match n {
            1 => Some(Self::Topic),
            2 => Some(Self::Week),
            3 => Some(Self::LatestWeekFirst),
            4 => Some(Self::CurrentTopicFirst),
            5 => Some(Self::Day),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Topic => 1,
            Self::Week => 2,
            Self::LatestWeekFirst => 3,
            Self::CurrentTopicFirst => 4,
            Self::Day => 5,
        }
    }

    /// Sections are labelled "Topic n" rather than by date.
    pub fn uses_topic_label(self) -> bool {
        matches!(self, Self::Topic | Self::CurrentTopicFirst)
    }

    /// Sections span calendar weeks counted from the course start.
    pub fn is_week_based(self) -> bool {
        matches!(self, Self::Week | Self::LatestWeekFirst)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnOrientation {
    Vertical,
    Horizontal,
}

impl ColumnOrientation {
    pub fn from_code(n: i64) -> Option<Self> {
        match n {
            1 => Some(Self::Vertical),
            2 => Some(Self::Horizontal),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Vertical => 1,
            Self::Horizontal => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ToggleAlignment {
    Left,
    Center,
    Right,
}

impl ToggleAlignment {
    pub fn from_code(n: i64) -> Option<Self> {
        match n {
            1 => Some(Self::Left),
            2 => Some(Self::Center),
            3 => Some(Self::Right),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Self::Left => 1,
            Self::Center => 2,
            Self::Right => 3,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToggleIconSet {
    Arrow,
    Point,
    Power,
}

impl ToggleIconSet {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "arrow" => Some(Self::Arrow),
            "point" => Some(Self::Point),
            "power" => Some(Self::Power),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Arrow => "arrow",
            Self::Point => "point",
            Self::Power => "power",
        }
    }
}

/// The fully resolved layout settings of one course. Every field is always
/// populated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseLayoutSettings {
    pub num_sections: i64,
    pub hidden_sections: HiddenSections,
    pub course_display: CourseDisplay,
    pub layout_element: LayoutElement,
    pub layout_structure: LayoutStructure,
    pub layout_columns: i64,
    pub layout_column_orientation: ColumnOrientation,
    pub toggle_alignment: ToggleAlignment,
    pub toggle_icon_set: ToggleIconSet,
    pub toggle_foreground_colour: String,
    pub toggle_background_colour: String,
    pub toggle_background_hover_colour: String,
}

impl Default for CourseLayoutSettings {
    fn default() -> Self {
        Self {
            num_sections: 10,
            hidden_sections: HiddenSections::Collapsed,
            course_display: CourseDisplay::SinglePage,
            layout_element: LayoutElement(1),
            layout_structure: LayoutStructure::Topic,
            layout_columns: 1,
            layout_column_orientation: ColumnOrientation::Horizontal,
            toggle_alignment: ToggleAlignment::Center,
            toggle_icon_set: ToggleIconSet::Arrow,
            toggle_foreground_colour: "000000".into(),
            toggle_background_colour: "e2e2f2".into(),
            toggle_background_hover_colour: "eeeeff".into(),
        }
    }
}

impl CourseLayoutSettings {
    /// Stored string form of one option.
    pub fn field_value(&self, key: &str) -> Option<String> {
        let v = match key {
            NUMSECTIONS => self.num_sections.to_string(),
            HIDDENSECTIONS => self.hidden_sections.code().to_string(),
            COURSEDISPLAY => self.course_display.code().to_string(),
            LAYOUTELEMENT => self.layout_element.code().to_string(),
            LAYOUTSTRUCTURE => self.layout_structure.code().to_string(),
            LAYOUTCOLUMNS => self.layout_columns.to_string(),
            LAYOUTCOLUMNORIENTATION => self.layout_column_orientation.code().to_string(),
            TOGGLEALIGNMENT => self.toggle_alignment.code().to_string(),
            TOGGLEICONSET => self.toggle_icon_set.name().to_string(),
            TOGGLEFOREGROUNDCOLOUR => self.toggle_foreground_colour.clone(),
            TOGGLEBACKGROUNDCOLOUR => self.toggle_background_colour.clone(),
            TOGGLEBACKGROUNDHOVERCOLOUR => self.toggle_background_hover_colour.clone(),
            _ => return None,
        };
        Some(v)
    }

    /// Applies one stored string value. Returns false and leaves the field
    /// untouched when the value is not valid for the key.
    pub fn apply_field(&mut self, key: &str, value: &str) -> bool {
        let int = value.trim().parse::<i64>().ok();
        match key {
            NUMSECTIONS => match int.filter(|n| *n >= 0) {
                Some(n) => self.num_sections = n,
                None => return false,
            },
            HIDDENSECTIONS => match int.and_then(HiddenSections::from_code) {
                Some(v) => self.hidden_sections = v,
                None => return false,
            },
            COURSEDISPLAY => match int.and_then(CourseDisplay::from_code) {
                Some(v) => self.course_display = v,
                None => return false,
            },
            LAYOUTELEMENT => match int.and_then(LayoutElement::from_code) {
                Some(v) => self.layout_element = v,
                None => return false,
            },
            LAYOUTSTRUCTURE => match int.and_then(LayoutStructure::from_code) {
                Some(v) => self.layout_structure = v,
                None => return false,
            },
            LAYOUTCOLUMNS => match int.filter(|n| (1..=4).contains(n)) {
                Some(n) => self.layout_columns = n,
                None => return false,
            },
            LAYOUTCOLUMNORIENTATION => match int.and_then(ColumnOrientation::from_code) {
                Some(v) => self.layout_column_orientation = v,
                None => return false,
            },
            TOGGLEALIGNMENT => match int.and_then(ToggleAlignment::from_code) {
                Some(v) => self.toggle_alignment = v,
                None => return false,
            },
            TOGGLEICONSET => match ToggleIconSet::parse(value) {
                Some(v) => self.toggle_icon_set = v,
                None => return false,
            },
            TOGGLEFOREGROUNDCOLOUR | TOGGLEBACKGROUNDCOLOUR | TOGGLEBACKGROUNDHOVERCOLOUR => {
                if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
                    return false;
                }
                let slot = match key {
                    TOGGLEFOREGROUNDCOLOUR => &mut self.toggle_foreground_colour,
                    TOGGLEBACKGROUNDCOLOUR => &mut self.toggle_background_colour,
                    _ => &mut self.toggle_background_hover_colour,
                };
                *slot = value.to_string();
            }
            _ => return false,
        }
        true
    }

    /// All options as stored strings, keyed by option name.
    pub fn to_fields(&self) -> BTreeMap<String, String> {
        OPTION_SCHEMA
            .iter()
            .filter_map(|d| self.field_value(d.key).map(|v| (d.key.to_string(), v)))
            .collect()
    }
}
