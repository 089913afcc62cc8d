mod test_support;

use serde_json::json;
use std::io::{BufRead, Write};
use test_support::{error_code, request, request_ok, spawn_sidecar, temp_dir};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("topcoll-router-smoke");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let health = request_ok(&mut stdin, &mut reader, "1", "health", json!({}));
    assert!(health.get("workspacePath").map(|v| v.is_null()).unwrap_or(false));

    let early = request(
        &mut stdin,
        &mut reader,
        "2",
        "format.settings",
        json!({ "courseId": 1 }),
    );
    assert_eq!(error_code(&early), Some("no_workspace"));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "courses.create",
        json!({ "courseId": 1, "startDate": 1_700_000_000, "numSections": 2 }),
    );

    let calls = [
        ("format.settings", json!({ "courseId": 1 })),
        ("format.update", json!({ "courseId": 1, "data": {} })),
        ("format.reset", json!({ "courseId": 1, "categories": ["colour"] })),
        ("format.updateColumns", json!({ "courseId": 1, "layoutColumns": 2 })),
        ("format.sectionName", json!({ "courseId": 1, "section": 1 })),
        ("format.sectionDates", json!({ "courseId": 1, "section": 1 })),
        ("format.isCurrent", json!({ "courseId": 1, "section": 1 })),
        ("format.sectionTitles", json!({ "courseId": 1 })),
        ("format.viewUrl", json!({ "courseId": 1 })),
        ("format.defaultBlocks", json!({})),
        ("format.definition", json!({})),
        ("format.formFields", json!({ "isSiteAdmin": true })),
        ("courses.setMarker", json!({ "courseId": 1, "marker": 1 })),
        ("sections.upsert", json!({ "courseId": 1, "section": 1, "name": null })),
        ("toggles.get", json!({ "courseId": 1, "userId": 1 })),
        ("defaults.get", json!({})),
    ];
    for (i, (method, params)) in calls.into_iter().enumerate() {
        let _ = request_ok(&mut stdin, &mut reader, &format!("c{}", i), method, params);
    }

    let blocks = request_ok(&mut stdin, &mut reader, "5", "format.defaultBlocks", json!({}));
    assert_eq!(
        blocks.pointer("/right/0").and_then(|v| v.as_str()),
        Some("search_forums")
    );
    let definition = request_ok(&mut stdin, &mut reader, "6", "format.definition", json!({}));
    assert_eq!(
        definition.get("definition").and_then(|v| v.as_str()),
        Some("Topic")
    );

    let unknown = request(&mut stdin, &mut reader, "7", "nope.method", json!({}));
    assert_eq!(error_code(&unknown), Some("not_implemented"));

    // A malformed line gets an error without an id and the loop continues.
    writeln!(stdin, "{{not json").expect("write garbage");
    stdin.flush().expect("flush");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read error line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse error json");
    assert_eq!(error_code(&value), Some("bad_json"));

    let _ = request_ok(&mut stdin, &mut reader, "8", "health", json!({}));
}
