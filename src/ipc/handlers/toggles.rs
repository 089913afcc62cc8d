use crate::db::SqliteStore;
use crate::format::toggles::{set_toggle_state, toggle_state};
use crate::ipc::error::{err, format_err, ok};
use crate::ipc::helpers::required_i64;
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_toggles_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let (course_id, user_id) = match (required_i64(req, "courseId"), required_i64(req, "userId")) {
        (Ok(c), Ok(u)) => (c, u),
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };
    match toggle_state(&SqliteStore::new(conn), course_id, user_id) {
        Ok(value) => ok(&req.id, json!({ "value": value })),
        Err(e) => format_err(&req.id, &e),
    }
}

fn handle_toggles_set(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let (course_id, user_id) = match (required_i64(req, "courseId"), required_i64(req, "userId")) {
        (Ok(c), Ok(u)) => (c, u),
        (Err(resp), _) | (_, Err(resp)) => return resp,
    };
    let Some(value) = req.params.get("value").and_then(|v| v.as_str()) else {
        return err(&req.id, "bad_params", "missing value", None);
    };
    match set_toggle_state(&SqliteStore::new(conn), course_id, user_id, value) {
        Ok(()) => ok(&req.id, json!({ "ok": true })),
        Err(e) => format_err(&req.id, &e),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "toggles.get" => Some(handle_toggles_get(state, req)),
        "toggles.set" => Some(handle_toggles_set(state, req)),
        _ => None,
    }
}
