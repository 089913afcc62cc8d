use crate::ipc::error::err;
use crate::ipc::types::Request;
use serde_json::{Map, Value};

pub fn required_i64(req: &Request, key: &str) -> Result<i64, Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn optional_i64(req: &Request, key: &str) -> Result<Option<i64>, Value> {
    match req.params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_i64()
            .map(Some)
            .ok_or_else(|| err(&req.id, "bad_params", format!("{} must be integer", key), None)),
    }
}

pub fn optional_object<'r>(req: &'r Request, key: &str) -> Result<Option<&'r Map<String, Value>>, Value> {
    match req.params.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => v
            .as_object()
            .map(Some)
            .ok_or_else(|| err(&req.id, "bad_params", format!("{} must be an object", key), None)),
    }
}

pub fn flag(req: &Request, key: &str) -> bool {
    req.params.get(key).and_then(|v| v.as_bool()).unwrap_or(false)
}
