//! Reconciles stored per-course options with the schema: default
//! substitution, form updates, format migration and category resets.

use crate::config::FormatDefaults;
use crate::error::FormatResult;
use crate::format::host::{FormatOptionStore, OptionRow};
use crate::format::options::{
    clean_value, option_def, CourseLayoutSettings, ResetCategory, FORMAT_NAME, LAYOUTCOLUMNS,
    LAYOUTELEMENT, LAYOUTSTRUCTURE, NUMSECTIONS, OPTION_SCHEMA, TOGGLEBACKGROUNDCOLOUR,
    TOGGLEBACKGROUNDHOVERCOLOUR, TOGGLEFOREGROUNDCOLOUR,
};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResetScope {
    Course(i64),
    AllCourses,
}

/// Reset checkboxes submitted with the course edit form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResetDirectives {
    pub course: BTreeSet<ResetCategory>,
    pub all_courses: BTreeSet<ResetCategory>,
}

const RESET_FLAGS: [(&str, ResetCategory, bool); 8] = [
    ("resetlayout", ResetCategory::Layout, false),
    ("resetcolour", ResetCategory::Colour, false),
    ("resettogglealignment", ResetCategory::ToggleAlignment, false),
    ("resettoggleiconset", ResetCategory::ToggleIconSet, false),
    ("resetalllayout", ResetCategory::Layout, true),
    ("resetallcolour", ResetCategory::Colour, true),
    ("resetalltogglealignment", ResetCategory::ToggleAlignment, true),
    ("resetalltoggleiconset", ResetCategory::ToggleIconSet, true),
];

impl ResetDirectives {
    /// Removes every reset flag from `data`, returning the ones that were set.
    pub fn extract(data: &mut Map<String, Value>) -> Self {
        let mut out = Self::default();
        for (key, category, all) in RESET_FLAGS {
            let Some(v) = data.remove(key) else {
                continue;
            };
            if !is_truthy(&v) {
                continue;
            }
            if all {
                out.all_courses.insert(category);
            } else {
                out.course.insert(category);
            }
        }
        out
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    pub changed_keys: Vec<String>,
    pub reset: bool,
}

impl ChangeSet {
    /// Whether the caller should invalidate its course caches.
    pub fn changed(&self) -> bool {
        self.reset || !self.changed_keys.is_empty()
    }
}

/// Legacy per-course values applied when restoring an old course backup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestoredLayout {
    pub layout_element: i64,
    pub layout_structure: i64,
    pub layout_columns: i64,
    pub toggle_foreground_colour: String,
    pub toggle_background_colour: String,
    pub toggle_background_hover_colour: String,
}

pub struct SettingsReconciler<'a, S: FormatOptionStore> {
    store: &'a S,
    defaults: &'a FormatDefaults,
}

impl<'a, S: FormatOptionStore> SettingsReconciler<'a, S> {
    pub fn new(store: &'a S, defaults: &'a FormatDefaults) -> Self {
        Self { store, defaults }
    }

    /// Every recognized key populated: the stored value when it is valid,
    /// the default otherwise.
    pub fn resolve_effective(&self, stored: &BTreeMap<String, String>) -> CourseLayoutSettings {
        let mut settings = self.defaults.layout.clone();
        for def in OPTION_SCHEMA.iter() {
            if let Some(v) = stored.get(def.key) {
                if !settings.apply_field(def.key, v) {
                    tracing::debug!(key = def.key, value = %v, "stored option invalid, using default");
                }
            }
        }
        settings
    }

    pub fn stored_fields(&self, course_id: i64) -> FormatResult<BTreeMap<String, String>> {
        let rows = self.store.options(course_id, FORMAT_NAME)?;
        Ok(rows.into_iter().map(|r| (r.name, r.value)).collect())
    }

    pub fn effective(&self, course_id: i64) -> FormatResult<CourseLayoutSettings> {
        Ok(self.resolve_effective(&self.stored_fields(course_id)?))
    }

    /// Applies an edit-form submission to one course.
    ///
    /// `previous` carries the options of the course's prior format when the
    /// course is being switched to this one.
    pub fn apply_update(
        &self,
        course_id: i64,
        new_data: &Map<String, Value>,
        previous: Option<&Map<String, Value>>,
    ) -> FormatResult<ChangeSet> {
        let mut data = new_data.clone();
        let resets = ResetDirectives::extract(&mut data);

        if let Some(previous) = previous {
            for def in OPTION_SCHEMA.iter() {
                if data.contains_key(def.key) {
                    continue;
                }
                if let Some(v) = previous.get(def.key) {
                    data.insert(def.key.to_string(), v.clone());
                } else if def.key == NUMSECTIONS {
                    // Only sections beyond the general one count.
                    if let Some(max) = self.store.max_section_number(course_id)?.filter(|n| *n > 0)
                    {
                        data.insert(NUMSECTIONS.to_string(), Value::from(max));
                    }
                }
            }
        }

        let mut cleaned = BTreeMap::new();
        for (k, v) in &data {
            if let Some(def) = option_def(k) {
                cleaned.insert(k.clone(), clean_value(def, v)?);
            }
        }

        let mut changes = ChangeSet {
            changed_keys: self.update_options(course_id, &cleaned)?,
            reset: false,
        };

        if !resets.all_courses.is_empty() {
            self.reset(ResetScope::AllCourses, &resets.all_courses)?;
            changes.reset = true;
        } else if !resets.course.is_empty() {
            self.reset(ResetScope::Course(course_id), &resets.course)?;
            changes.reset = true;
        }

        tracing::debug!(
            course_id,
            changed = changes.changed(),
            keys = ?changes.changed_keys,
            "format options updated"
        );
        Ok(changes)
    }

    /// Writes `values` over the stored options of one course. Options with no
    /// stored row are materialized with the supplied value or the default.
    /// Returns the keys whose value changed; a supplied value for an option
    /// with no stored row always counts, even when it equals the default.
    fn update_options(
        &self,
        course_id: i64,
        values: &BTreeMap<String, String>,
    ) -> FormatResult<Vec<String>> {
        let stored = self.stored_fields(course_id)?;
        let mut writes = BTreeMap::new();
        let mut changed = Vec::new();

        for def in OPTION_SCHEMA.iter() {
            let default = self.defaults.value(def.key).unwrap_or_default();
            match (stored.get(def.key), values.get(def.key)) {
                (Some(old), Some(new)) => {
                    if old != new {
                        writes.insert(def.key.to_string(), new.clone());
                        changed.push(def.key.to_string());
                    }
                }
                (None, Some(new)) => {
                    changed.push(def.key.to_string());
                    writes.insert(def.key.to_string(), new.clone());
                }
                (None, None) => {
                    writes.insert(def.key.to_string(), default);
                }
                (Some(_), None) => {}
            }
        }

        if !writes.is_empty() {
            self.store.upsert(course_id, FORMAT_NAME, &writes)?;
        }
        Ok(changed)
    }

    /// Overwrites every option of the requested categories with its default.
    /// Returns the number of courses visited.
    pub fn reset(
        &self,
        scope: ResetScope,
        categories: &BTreeSet<ResetCategory>,
    ) -> FormatResult<usize> {
        if categories.is_empty() {
            return Ok(0);
        }

        let mut values = BTreeMap::new();
        for category in categories {
            for key in category.keys() {
                values.insert(key.to_string(), self.defaults.value(key).unwrap_or_default());
            }
        }

        let rows = match scope {
            ResetScope::AllCourses => self.store.all_options(FORMAT_NAME)?,
            ResetScope::Course(course_id) => self.store.options(course_id, FORMAT_NAME)?,
        };

        let mut visited = 0;
        for course_id in distinct_courses(&rows) {
            self.update_options(course_id, &values)?;
            visited += 1;
        }
        tracing::info!(?scope, ?categories, courses = visited, "format options reset");
        Ok(visited)
    }

    pub fn restore(&self, course_id: i64, layout: &RestoredLayout) -> FormatResult<ChangeSet> {
        let mut data = Map::new();
        data.insert(LAYOUTELEMENT.into(), Value::from(layout.layout_element));
        data.insert(LAYOUTSTRUCTURE.into(), Value::from(layout.layout_structure));
        data.insert(LAYOUTCOLUMNS.into(), Value::from(layout.layout_columns));
        data.insert(
            TOGGLEFOREGROUNDCOLOUR.into(),
            Value::from(layout.toggle_foreground_colour.clone()),
        );
        data.insert(
            TOGGLEBACKGROUNDCOLOUR.into(),
            Value::from(layout.toggle_background_colour.clone()),
        );
        data.insert(
            TOGGLEBACKGROUNDHOVERCOLOUR.into(),
            Value::from(layout.toggle_background_hover_colour.clone()),
        );
        self.apply_update(course_id, &data, None)
    }

    pub fn update_columns(&self, course_id: i64, layout_columns: i64) -> FormatResult<ChangeSet> {
        let mut data = Map::new();
        data.insert(LAYOUTCOLUMNS.into(), Value::from(layout_columns));
        self.apply_update(course_id, &data, None)
    }

    /// Drops the course's options and every user's toggle state for it.
    pub fn delete_course(&self, course_id: i64) -> FormatResult<()> {
        let options = self.store.delete_options(course_id, FORMAT_NAME)?;
        let preferences = self.store.delete_user_preferences(course_id)?;
        tracing::info!(course_id, options, preferences, "course format data deleted");
        Ok(())
    }
}

/// Course ids in row order, contiguous duplicates collapsed.
fn distinct_courses(rows: &[OptionRow]) -> Vec<i64> {
    let mut out: Vec<i64> = Vec::new();
    for row in rows {
        if out.last() != Some(&row.course_id) {
            out.push(row.course_id);
        }
    }
    out
}
