use crate::error::FormatResult;
use crate::format::host::{
    Course, CourseAccessor, FormatOptionStore, OptionRow, Section, UserPreferenceStore,
};
use crate::format::options::CourseDisplay;
use crate::format::toggles::toggle_preference_name;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;

pub const DB_FILE: &str = "topcoll.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE);
    let conn = Connection::open(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

#[cfg(test)]
pub fn open_in_memory() -> anyhow::Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> anyhow::Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS courses(
            id INTEGER PRIMARY KEY,
            startdate INTEGER NOT NULL,
            format TEXT NOT NULL DEFAULT 'topcoll',
            marker INTEGER NOT NULL DEFAULT 0
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS course_sections(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            course INTEGER NOT NULL,
            section INTEGER NOT NULL,
            name TEXT,
            UNIQUE(course, section)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_course_sections_course ON course_sections(course)",
        [],
    )?;

    // One row per (course, format, option). Rows for a course are not
    // necessarily contiguous by id.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS course_format_options(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            courseid INTEGER NOT NULL,
            format TEXT NOT NULL,
            sectionid INTEGER NOT NULL DEFAULT 0,
            name TEXT NOT NULL,
            value TEXT,
            UNIQUE(courseid, format, sectionid, name)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_course_format_options_format ON course_format_options(format, courseid)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS user_preferences(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            userid INTEGER NOT NULL,
            name TEXT NOT NULL,
            value TEXT NOT NULL,
            UNIQUE(userid, name)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_user_preferences_name ON user_preferences(name)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS settings(
            key TEXT PRIMARY KEY,
            value_json TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

pub fn settings_get_json(conn: &Connection, key: &str) -> anyhow::Result<Option<serde_json::Value>> {
    let raw: Option<String> = conn
        .query_row(
            "SELECT value_json FROM settings WHERE key = ?",
            [key],
            |r| r.get(0),
        )
        .optional()?;
    match raw {
        Some(s) => Ok(Some(serde_json::from_str(&s)?)),
        None => Ok(None),
    }
}

pub fn settings_set_json(
    conn: &Connection,
    key: &str,
    value: &serde_json::Value,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value_json) VALUES(?, ?)
         ON CONFLICT(key) DO UPDATE SET value_json = excluded.value_json",
        (key, serde_json::to_string(value)?),
    )?;
    Ok(())
}

/// The host storage collaborator backed by the workspace database.
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

fn option_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<OptionRow> {
    Ok(OptionRow {
        id: row.get(0)?,
        course_id: row.get(1)?,
        name: row.get(2)?,
        value: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
    })
}

impl FormatOptionStore for SqliteStore<'_> {
    fn options(&self, course_id: i64, format: &str) -> FormatResult<Vec<OptionRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, courseid, name, value
             FROM course_format_options
             WHERE courseid = ? AND format = ? AND sectionid = 0
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![course_id, format], option_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn all_options(&self, format: &str) -> FormatResult<Vec<OptionRow>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, courseid, name, value
             FROM course_format_options
             WHERE format = ? AND sectionid = 0
             ORDER BY courseid, id",
        )?;
        let rows = stmt
            .query_map([format], option_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn upsert(
        &self,
        course_id: i64,
        format: &str,
        fields: &BTreeMap<String, String>,
    ) -> FormatResult<()> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO course_format_options(courseid, format, sectionid, name, value)
             VALUES(?, ?, 0, ?, ?)
             ON CONFLICT(courseid, format, sectionid, name) DO UPDATE SET value = excluded.value",
        )?;
        for (name, value) in fields {
            stmt.execute(params![course_id, format, name, value])?;
        }
        Ok(())
    }

    fn max_section_number(&self, course_id: i64) -> FormatResult<Option<i64>> {
        let max: Option<i64> = self.conn.query_row(
            "SELECT MAX(section) FROM course_sections WHERE course = ?",
            [course_id],
            |r| r.get(0),
        )?;
        Ok(max)
    }

    fn delete_options(&self, course_id: i64, format: &str) -> FormatResult<usize> {
        Ok(self.conn.execute(
            "DELETE FROM course_format_options WHERE courseid = ? AND format = ?",
            params![course_id, format],
        )?)
    }

    fn delete_user_preferences(&self, course_id: i64) -> FormatResult<usize> {
        Ok(self.conn.execute(
            "DELETE FROM user_preferences WHERE name = ?",
            [toggle_preference_name(course_id)],
        )?)
    }
}

impl CourseAccessor for SqliteStore<'_> {
    /// The course display mode is a format option; callers holding the
    /// course's settings overlay it.
    fn course(&self, course_id: i64) -> FormatResult<Option<Course>> {
        let course = self
            .conn
            .query_row(
                "SELECT id, startdate, format, marker FROM courses WHERE id = ?",
                [course_id],
                |r| {
                    Ok(Course {
                        id: r.get(0)?,
                        start_date: r.get(1)?,
                        format: r.get(2)?,
                        marker: r.get(3)?,
                        course_display: CourseDisplay::SinglePage,
                    })
                },
            )
            .optional()?;
        Ok(course)
    }

    fn section(&self, course_id: i64, number: i64) -> FormatResult<Option<Section>> {
        let section = self
            .conn
            .query_row(
                "SELECT course, section, name FROM course_sections WHERE course = ? AND section = ?",
                params![course_id, number],
                |r| {
                    Ok(Section {
                        course_id: r.get(0)?,
                        number: r.get(1)?,
                        name: r.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(section)
    }

    fn sections(&self, course_id: i64) -> FormatResult<Vec<Section>> {
        let mut stmt = self.conn.prepare(
            "SELECT course, section, name FROM course_sections WHERE course = ? ORDER BY section",
        )?;
        let rows = stmt
            .query_map([course_id], |r| {
                Ok(Section {
                    course_id: r.get(0)?,
                    number: r.get(1)?,
                    name: r.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl UserPreferenceStore for SqliteStore<'_> {
    fn preference(&self, user_id: i64, name: &str) -> FormatResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM user_preferences WHERE userid = ? AND name = ?",
                params![user_id, name],
                |r| r.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_preference(&self, user_id: i64, name: &str, value: &str) -> FormatResult<()> {
        self.conn.execute(
            "INSERT INTO user_preferences(userid, name, value) VALUES(?, ?, ?)
             ON CONFLICT(userid, name) DO UPDATE SET value = excluded.value",
            params![user_id, name, value],
        )?;
        Ok(())
    }
}
