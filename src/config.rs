use crate::db;
use crate::format::options::{option_def, CourseLayoutSettings, NUMSECTIONS};
use rusqlite::Connection;
use serde_json::{json, Map, Value};

pub const DEFAULTS_KEY: &str = "format.defaults";
const MAX_SECTIONS_KEY: &str = "maxsections";

/// Site-wide defaults: the value every option takes when a course has not
/// stored its own. Loaded once when a workspace opens and never mutated after.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatDefaults {
    pub layout: CourseLayoutSettings,
    /// Upper bound of the "number of sections" menu.
    pub max_sections: i64,
}

impl Default for FormatDefaults {
    fn default() -> Self {
        Self {
            layout: CourseLayoutSettings::default(),
            max_sections: 52,
        }
    }
}

impl FormatDefaults {
    pub fn load(conn: &Connection) -> anyhow::Result<Self> {
        let mut defaults = Self::default();
        if let Some(saved) = db::settings_get_json(conn, DEFAULTS_KEY)? {
            if let Some(saved_obj) = saved.as_object() {
                // Best-effort: one bad historical value must not block the workspace.
                for (k, v) in saved_obj {
                    let mut single = Map::new();
                    single.insert(k.clone(), v.clone());
                    if let Err(msg) = defaults.merge_patch(&single) {
                        tracing::warn!(key = %k, "ignoring stored default: {}", msg);
                    }
                }
            }
        }
        Ok(defaults)
    }

    /// Stored string form of the default for `key`.
    pub fn value(&self, key: &str) -> Option<String> {
        self.layout.field_value(key)
    }

    /// Applies `patch` as a whole: on error `self` is left untouched.
    pub fn merge_patch(&mut self, patch: &Map<String, Value>) -> Result<(), String> {
        let mut next = self.clone();
        for (k, v) in patch {
            if k == MAX_SECTIONS_KEY {
                let n = v
                    .as_i64()
                    .ok_or_else(|| format!("{} must be integer", k))?;
                if !(1..=1000).contains(&n) {
                    return Err(format!("{} must be in 1..=1000", k));
                }
                next.max_sections = n;
                continue;
            }
            if option_def(k).is_none() {
                return Err(format!("unknown default: {}", k));
            }
            let raw = match v {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return Err(format!("{} must be a string or integer", k)),
            };
            if !next.layout.apply_field(k, &raw) {
                return Err(format!("invalid value for {}: {}", k, raw));
            }
        }
        if next.layout.num_sections > next.max_sections {
            return Err(format!("{} must be <= {}", NUMSECTIONS, next.max_sections));
        }
        *self = next;
        Ok(())
    }

    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        for (k, v) in self.layout.to_fields() {
            obj.insert(k, Value::String(v));
        }
        obj.insert(MAX_SECTIONS_KEY.into(), json!(self.max_sections));
        Value::Object(obj)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::options::{LayoutStructure, ToggleIconSet};

    fn memory_db() -> Connection {
        db::open_in_memory().expect("open in-memory db")
    }

    #[test]
    fn load_without_saved_defaults_uses_builtin_table() {
        let conn = memory_db();
        assert_eq!(FormatDefaults::load(&conn).unwrap(), FormatDefaults::default());
    }

    #[test]
    fn load_applies_valid_values_and_skips_bad_ones() {
        let conn = memory_db();
        db::settings_set_json(
            &conn,
            DEFAULTS_KEY,
            &json!({
                "layoutstructure": 2,
                "toggleiconset": "power",
                "layoutcolumns": 9,
                "bogus": true
            }),
        )
        .unwrap();
        let d = FormatDefaults::load(&conn).unwrap();
        assert_eq!(d.layout.layout_structure, LayoutStructure::Week);
        assert_eq!(d.layout.toggle_icon_set, ToggleIconSet::Power);
        assert_eq!(d.layout.layout_columns, 1);
    }

    #[test]
    fn merge_patch_is_strict() {
        let mut d = FormatDefaults::default();
        let patch = json!({ "maxsections": 5, "numsections": 8 });
        assert!(d.merge_patch(patch.as_object().unwrap()).is_err());
        let patch = json!({ "unknown": 1 });
        assert!(d.merge_patch(patch.as_object().unwrap()).is_err());
        let patch = json!({ "layoutcolumns": 3, "numsections": 60 });
        assert!(d.merge_patch(patch.as_object().unwrap()).is_err());
        assert_eq!(d, FormatDefaults::default());
    }

    #[test]
    fn load_drops_defaults_that_break_the_section_bound() {
        let conn = memory_db();
        db::settings_set_json(&conn, DEFAULTS_KEY, &json!({ "numsections": 60 })).unwrap();
        let d = FormatDefaults::load(&conn).unwrap();
        assert_eq!(d.layout.num_sections, 10);
        assert_eq!(d.max_sections, 52);

        db::settings_set_json(
            &conn,
            DEFAULTS_KEY,
            &json!({ "maxsections": 5, "layoutcolumns": 2 }),
        )
        .unwrap();
        let d = FormatDefaults::load(&conn).unwrap();
        assert_eq!(d.max_sections, 52);
        assert_eq!(d.layout.num_sections, 10);
        assert_eq!(d.layout.layout_columns, 2);
    }
}
