use crate::db::SqliteStore;
use crate::format::options::{FORMAT_NAME, NUMSECTIONS};
use crate::format::reconciler::SettingsReconciler;
use crate::ipc::error::{err, format_err, ok};
use crate::ipc::helpers::{optional_i64, required_i64};
use crate::ipc::types::{AppState, Request};
use rusqlite::OptionalExtension;
use serde_json::{json, Map, Value};

fn handle_courses_create(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let start_date = match required_i64(req, "startDate") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let requested_id = match optional_i64(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let marker = match optional_i64(req, "marker") {
        Ok(v) => v.unwrap_or(0),
        Err(resp) => return resp,
    };
    let num_sections = match optional_i64(req, "numSections") {
        Ok(v) => v.unwrap_or(state.defaults.layout.num_sections),
        Err(resp) => return resp,
    };
    if !(0..=state.defaults.max_sections).contains(&num_sections) {
        return err(
            &req.id,
            "bad_params",
            format!("numSections must be in 0..={}", state.defaults.max_sections),
            None,
        );
    }
    let format = req
        .params
        .get("format")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| FORMAT_NAME.to_string());

    let tx = match conn.unchecked_transaction() {
        Ok(t) => t,
        Err(e) => return err(&req.id, "db_tx_failed", e.to_string(), None),
    };

    if let Err(e) = tx.execute(
        "INSERT INTO courses(id, startdate, format, marker) VALUES(?, ?, ?, ?)",
        (requested_id, start_date, &format, marker),
    ) {
        let _ = tx.rollback();
        return err(
            &req.id,
            "db_insert_failed",
            e.to_string(),
            Some(json!({ "table": "courses" })),
        );
    }
    let course_id = tx.last_insert_rowid();

    for n in 0..=num_sections {
        if let Err(e) = tx.execute(
            "INSERT INTO course_sections(course, section, name) VALUES(?, ?, NULL)",
            (course_id, n),
        ) {
            let _ = tx.rollback();
            return err(
                &req.id,
                "db_insert_failed",
                e.to_string(),
                Some(json!({ "table": "course_sections" })),
            );
        }
    }

    // A course adopting this format starts with every option stored.
    if format == FORMAT_NAME {
        let mut data = Map::new();
        data.insert(NUMSECTIONS.into(), Value::from(num_sections));
        let result = {
            let store = SqliteStore::new(&tx);
            SettingsReconciler::new(&store, &state.defaults).apply_update(course_id, &data, None)
        };
        if let Err(e) = result {
            let _ = tx.rollback();
            return format_err(&req.id, &e);
        }
    }

    if let Err(e) = tx.commit() {
        return err(&req.id, "db_commit_failed", e.to_string(), None);
    }
    tracing::info!(course_id, %format, num_sections, "course created");
    ok(&req.id, json!({ "courseId": course_id, "format": format }))
}

fn handle_courses_delete(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let course_id = match required_i64(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let exists: Option<i64> = match conn
        .query_row("SELECT 1 FROM courses WHERE id = ?", [course_id], |r| r.get(0))
        .optional()
    {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if exists.is_none() {
        return err(&req.id, "not_found", "course not found", None);
    }

    let tx = match conn.unchecked_transaction() {
        Ok(t) => t,
        Err(e) => return err(&req.id, "db_tx_failed", e.to_string(), None),
    };

    let deleted = {
        let store = SqliteStore::new(&tx);
        SettingsReconciler::new(&store, &state.defaults).delete_course(course_id)
    };
    if let Err(e) = deleted {
        let _ = tx.rollback();
        return format_err(&req.id, &e);
    }

    for (table, sql) in [
        ("course_sections", "DELETE FROM course_sections WHERE course = ?"),
        ("courses", "DELETE FROM courses WHERE id = ?"),
    ] {
        if let Err(e) = tx.execute(sql, [course_id]) {
            let _ = tx.rollback();
            return err(
                &req.id,
                "db_delete_failed",
                e.to_string(),
                Some(json!({ "table": table })),
            );
        }
    }

    if let Err(e) = tx.commit() {
        return err(&req.id, "db_commit_failed", e.to_string(), None);
    }
    ok(&req.id, json!({ "ok": true }))
}

fn handle_courses_set_marker(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let course_id = match required_i64(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let marker = match required_i64(req, "marker") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match conn.execute(
        "UPDATE courses SET marker = ? WHERE id = ?",
        (marker, course_id),
    ) {
        Ok(0) => err(&req.id, "not_found", "course not found", None),
        Ok(_) => ok(&req.id, json!({ "ok": true })),
        Err(e) => err(&req.id, "db_update_failed", e.to_string(), None),
    }
}

fn handle_sections_upsert(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let course_id = match required_i64(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let section = match required_i64(req, "section") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if !(0..=state.defaults.max_sections).contains(&section) {
        return err(
            &req.id,
            "bad_params",
            format!("section must be in 0..={}", state.defaults.max_sections),
            None,
        );
    }
    let name = match req.params.get("name") {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => return err(&req.id, "bad_params", "name must be string or null", None),
    };
    if let Err(e) = conn.execute(
        "INSERT INTO course_sections(course, section, name) VALUES(?, ?, ?)
         ON CONFLICT(course, section) DO UPDATE SET name = excluded.name",
        (course_id, section, &name),
    ) {
        return err(&req.id, "db_update_failed", e.to_string(), None);
    }
    ok(&req.id, json!({ "ok": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "courses.create" => Some(handle_courses_create(state, req)),
        "courses.delete" => Some(handle_courses_delete(state, req)),
        "courses.setMarker" => Some(handle_courses_set_marker(state, req)),
        "sections.upsert" => Some(handle_sections_upsert(state, req)),
        _ => None,
    }
}
