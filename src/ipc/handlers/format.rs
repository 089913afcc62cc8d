use crate::db::SqliteStore;
use crate::error::FormatResult;
use crate::format::form::edit_form_fields;
use crate::format::host::{
    CurrentSectionPredicate, MarkerRule, SectionLabelProvider, UtcShortDate,
};
use crate::format::nav::{default_blocks, ViewUrlOptions};
use crate::format::options::ResetCategory;
use crate::format::reconciler::{ResetScope, RestoredLayout, SettingsReconciler};
use crate::format::strings::StringTable;
use crate::format::{definition, CourseFormat, HostServices};
use crate::ipc::error::{err, format_err, ok};
use crate::ipc::helpers::{flag, optional_i64, optional_object, required_i64};
use crate::ipc::types::{AppState, Request};
use serde_json::{json, Map, Value};
use std::collections::BTreeSet;

fn host_services(state: &AppState) -> HostServices<'_> {
    HostServices {
        strings: &StringTable,
        dates: &UtcShortDate,
        current_rule: &MarkerRule,
        defaults: &state.defaults,
    }
}

/// Runs a read-only operation against the format bound to `params.courseId`.
fn with_format<F>(state: &AppState, req: &Request, f: F) -> serde_json::Value
where
    F: FnOnce(&CourseFormat<'_, SqliteStore<'_>>) -> FormatResult<Value>,
{
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let course_id = match required_i64(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let store = SqliteStore::new(conn);
    let format = CourseFormat::new(course_id, &store, host_services(state));
    match f(&format) {
        Ok(v) => ok(&req.id, v),
        Err(e) => format_err(&req.id, &e),
    }
}

/// Runs a write operation inside one transaction; a failure rolls back
/// everything the operation wrote.
fn in_transaction<F>(state: &AppState, req: &Request, f: F) -> serde_json::Value
where
    F: FnOnce(&SqliteStore<'_>) -> FormatResult<Value>,
{
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let tx = match conn.unchecked_transaction() {
        Ok(t) => t,
        Err(e) => return err(&req.id, "db_tx_failed", e.to_string(), None),
    };
    let result = {
        let store = SqliteStore::new(&tx);
        f(&store)
    };
    match result {
        Ok(v) => match tx.commit() {
            Ok(()) => ok(&req.id, v),
            Err(e) => err(&req.id, "db_commit_failed", e.to_string(), None),
        },
        Err(e) => {
            let _ = tx.rollback();
            format_err(&req.id, &e)
        }
    }
}

fn handle_settings(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_format(state, req, |format| {
        let settings = format.settings()?;
        let element = settings.layout_element;
        Ok(json!({
            "settings": settings,
            "fields": settings.to_fields(),
            "decorations": {
                "toggleWord": element.shows_toggle_word(),
                "sectionX": element.shows_section_x(),
                "sectionNumber": element.shows_section_number(),
            },
        }))
    })
}

fn handle_section_name(state: &mut AppState, req: &Request) -> serde_json::Value {
    let number = match required_i64(req, "section") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    with_format(state, req, |format| {
        let section = format.section(number)?;
        Ok(json!({ "name": format.section_name(&section)? }))
    })
}

fn handle_section_dates(state: &mut AppState, req: &Request) -> serde_json::Value {
    let number = match required_i64(req, "section") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    with_format(state, req, |format| {
        let section = format.section(number)?;
        Ok(json!({ "dates": format.section_dates(&section)? }))
    })
}

fn handle_is_current(state: &mut AppState, req: &Request) -> serde_json::Value {
    let number = match required_i64(req, "section") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let now = match optional_i64(req, "now") {
        Ok(v) => v.unwrap_or_else(|| chrono::Utc::now().timestamp()),
        Err(resp) => return resp,
    };
    with_format(state, req, |format| {
        let section = format.section(number)?;
        Ok(json!({ "current": format.is_section_current(&section, now)? }))
    })
}

fn handle_section_titles(state: &mut AppState, req: &Request) -> serde_json::Value {
    with_format(state, req, |format| {
        let titles: Map<String, Value> = format
            .section_titles()?
            .into_iter()
            .map(|(n, title)| (n.to_string(), Value::String(title)))
            .collect();
        Ok(json!({ "sectionTitles": titles, "action": "move" }))
    })
}

fn handle_view_url(state: &mut AppState, req: &Request) -> serde_json::Value {
    let section = match optional_i64(req, "section") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let return_section = match optional_i64(req, "sr") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let options = ViewUrlOptions {
        return_section,
        navigation: flag(req, "navigation"),
    };
    with_format(state, req, |format| {
        Ok(json!({ "url": format.view_url(section, &options)? }))
    })
}

fn handle_default_blocks(_state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!(default_blocks()))
}

fn handle_definition(_state: &mut AppState, req: &Request) -> serde_json::Value {
    ok(&req.id, json!({ "definition": definition(&StringTable) }))
}

fn handle_form_fields(state: &mut AppState, req: &Request) -> serde_json::Value {
    let fields = edit_form_fields(&StringTable, &state.defaults, flag(req, "isSiteAdmin"));
    ok(&req.id, json!({ "fields": fields }))
}

fn handle_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let course_id = match required_i64(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let data = match optional_object(req, "data") {
        Ok(Some(d)) => d.clone(),
        Ok(None) => return err(&req.id, "bad_params", "data must be an object", None),
        Err(resp) => return resp,
    };
    let previous = match optional_object(req, "previous") {
        Ok(p) => p.cloned(),
        Err(resp) => return resp,
    };
    let host = host_services(state);
    in_transaction(state, req, |store| {
        let mut format = CourseFormat::new(course_id, store, host);
        let changes = format.update(&data, previous.as_ref())?;
        Ok(json!({
            "changed": changes.changed(),
            "changedKeys": changes.changed_keys,
            "reset": changes.reset,
        }))
    })
}

fn parse_categories(req: &Request) -> Result<BTreeSet<ResetCategory>, Value> {
    let Some(raw) = req.params.get("categories").and_then(|v| v.as_array()) else {
        return Err(err(&req.id, "bad_params", "categories must be an array", None));
    };
    let mut out = BTreeSet::new();
    for v in raw {
        let Some(category) = v.as_str().and_then(ResetCategory::parse) else {
            return Err(err(
                &req.id,
                "bad_params",
                format!("unknown category: {}", v),
                Some(json!({ "allowed": ["layout", "colour", "toggleAlignment", "toggleIconSet"] })),
            ));
        };
        out.insert(category);
    }
    Ok(out)
}

fn handle_reset(state: &mut AppState, req: &Request) -> serde_json::Value {
    let categories = match parse_categories(req) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let scope = if flag(req, "all") {
        ResetScope::AllCourses
    } else {
        match required_i64(req, "courseId") {
            Ok(id) => ResetScope::Course(id),
            Err(resp) => return resp,
        }
    };
    let defaults = &state.defaults;
    in_transaction(state, req, |store| {
        let courses = SettingsReconciler::new(store, defaults).reset(scope, &categories)?;
        Ok(json!({ "courses": courses }))
    })
}

fn handle_restore(state: &mut AppState, req: &Request) -> serde_json::Value {
    let course_id = match required_i64(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let mut ints = [0i64; 3];
    for (slot, key) in ints
        .iter_mut()
        .zip(["layoutElement", "layoutStructure", "layoutColumns"])
    {
        *slot = match required_i64(req, key) {
            Ok(v) => v,
            Err(resp) => return resp,
        };
    }
    let mut colours: [String; 3] = Default::default();
    for (slot, key) in colours.iter_mut().zip([
        "toggleForegroundColour",
        "toggleBackgroundColour",
        "toggleBackgroundHoverColour",
    ]) {
        let Some(v) = req.params.get(key).and_then(|v| v.as_str()) else {
            return err(&req.id, "bad_params", format!("missing {}", key), None);
        };
        *slot = v.to_string();
    }
    let [layout_element, layout_structure, layout_columns] = ints;
    let [toggle_foreground_colour, toggle_background_colour, toggle_background_hover_colour] =
        colours;
    let layout = RestoredLayout {
        layout_element,
        layout_structure,
        layout_columns,
        toggle_foreground_colour,
        toggle_background_colour,
        toggle_background_hover_colour,
    };

    let defaults = &state.defaults;
    in_transaction(state, req, |store| {
        let changes = SettingsReconciler::new(store, defaults).restore(course_id, &layout)?;
        Ok(json!({ "changed": changes.changed(), "changedKeys": changes.changed_keys }))
    })
}

fn handle_update_columns(state: &mut AppState, req: &Request) -> serde_json::Value {
    let course_id = match required_i64(req, "courseId") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let columns = match required_i64(req, "layoutColumns") {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    if !(1..=4).contains(&columns) {
        return err(&req.id, "bad_params", "layoutColumns must be in 1..=4", None);
    }
    let defaults = &state.defaults;
    in_transaction(state, req, |store| {
        let changes = SettingsReconciler::new(store, defaults).update_columns(course_id, columns)?;
        Ok(json!({ "changed": changes.changed() }))
    })
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "format.settings" => Some(handle_settings(state, req)),
        "format.update" => Some(handle_update(state, req)),
        "format.reset" => Some(handle_reset(state, req)),
        "format.restore" => Some(handle_restore(state, req)),
        "format.updateColumns" => Some(handle_update_columns(state, req)),
        "format.sectionName" => Some(handle_section_name(state, req)),
        "format.sectionDates" => Some(handle_section_dates(state, req)),
        "format.isCurrent" => Some(handle_is_current(state, req)),
        "format.sectionTitles" => Some(handle_section_titles(state, req)),
        "format.viewUrl" => Some(handle_view_url(state, req)),
        "format.defaultBlocks" => Some(handle_default_blocks(state, req)),
        "format.definition" => Some(handle_definition(state, req)),
        "format.formFields" => Some(handle_form_fields(state, req)),
        _ => None,
    }
}
