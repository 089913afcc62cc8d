use std::path::PathBuf;

use crate::config::FormatDefaults;
use rusqlite::Connection;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

pub struct AppState {
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    /// Loaded with the workspace; read-only until the next `workspace.select`.
    pub defaults: FormatDefaults,
}
