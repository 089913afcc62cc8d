mod test_support;

use serde_json::json;
use test_support::{error_code, request, request_ok, spawn_sidecar, temp_dir};

#[test]
fn toggle_state_roundtrip_per_user() {
    let workspace = temp_dir("topcoll-toggles");
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );

    let empty = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "toggles.get",
        json!({ "courseId": 8, "userId": 1 }),
    );
    assert!(empty.get("value").map(|v| v.is_null()).unwrap_or(false));

    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "toggles.set",
        json!({ "courseId": 8, "userId": 1, "value": "0f3A" }),
    );
    let _ = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "toggles.set",
        json!({ "courseId": 8, "userId": 2, "value": "zz" }),
    );

    let mine = request_ok(
        &mut stdin,
        &mut reader,
        "5",
        "toggles.get",
        json!({ "courseId": 8, "userId": 1 }),
    );
    assert_eq!(mine.get("value").and_then(|v| v.as_str()), Some("0f3A"));

    let bad = request(
        &mut stdin,
        &mut reader,
        "6",
        "toggles.set",
        json!({ "courseId": 8, "userId": 1, "value": "1,2;drop" }),
    );
    assert_eq!(error_code(&bad), Some("bad_params"));

    let missing = request(
        &mut stdin,
        &mut reader,
        "7",
        "toggles.set",
        json!({ "courseId": 8, "value": "abc" }),
    );
    assert_eq!(error_code(&missing), Some("bad_params"));
}
