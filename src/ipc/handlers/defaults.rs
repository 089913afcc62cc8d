use crate::config::{FormatDefaults, DEFAULTS_KEY};
use crate::db;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_defaults_get(state: &mut AppState, req: &Request) -> serde_json::Value {
    if state.db.is_none() {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    }
    ok(&req.id, json!({ "defaults": state.defaults.to_json() }))
}

/// Validates and stores new site defaults. The running session keeps the
/// defaults it was opened with; they apply from the next `workspace.select`.
fn handle_defaults_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let Some(patch) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object", None);
    };

    let mut next = match FormatDefaults::load(conn) {
        Ok(d) => d,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };
    if let Err(msg) = next.merge_patch(patch) {
        return err(&req.id, "bad_params", msg, None);
    }
    if let Err(e) = db::settings_set_json(conn, DEFAULTS_KEY, &next.to_json()) {
        return err(&req.id, "db_update_failed", e.to_string(), None);
    }
    tracing::info!(keys = ?patch.keys().collect::<Vec<_>>(), "site defaults updated");
    ok(&req.id, json!({ "defaults": next.to_json() }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "defaults.get" => Some(handle_defaults_get(state, req)),
        "defaults.update" => Some(handle_defaults_update(state, req)),
        _ => None,
    }
}
