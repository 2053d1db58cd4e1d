use std::path::PathBuf;

use rusqlite::Connection;
use serde::Deserialize;

use crate::audit::Audit;
use crate::config::Config;
use crate::db;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    /// Authenticated caller, resolved by the front end before forwarding.
    #[serde(default)]
    pub actor: Option<ActorRef>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ActorRef {
    pub account_id: String,
}

pub struct AppState {
    pub config: Config,
    pub workspace: Option<PathBuf>,
    pub db: Option<Connection>,
    pub audit: Box<dyn Audit>,
}

impl AppState {
    pub fn new(config: Config, audit: Box<dyn Audit>) -> anyhow::Result<Self> {
        let mut state = Self {
            config,
            workspace: None,
            db: None,
            audit,
        };
        if let Some(path) = state.config.workspace.clone() {
            let conn = db::open_db(&path, &state.config)?;
            state.workspace = Some(path);
            state.db = Some(conn);
        }
        Ok(state)
    }
}
