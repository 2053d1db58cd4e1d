use rusqlite::Connection;
use uuid::Uuid;

use crate::authz::{resolve_actor, Actor};
use crate::error::DomainError;
use crate::ipc::types::Request;

pub fn str_param<'a>(params: &'a serde_json::Value, key: &str) -> Result<&'a str, DomainError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| DomainError::invalid(key, format!("missing {key}")))
}

fn parse_id(field: &str, raw: &str) -> Result<String, DomainError> {
    Uuid::parse_str(raw.trim())
        .map(|u| u.to_string())
        .map_err(|_| DomainError::invalid(field, "malformed identifier"))
}

/// Required identifier parameter; anything that is not a UUID is rejected.
pub fn id_param(params: &serde_json::Value, key: &str) -> Result<String, DomainError> {
    parse_id(key, str_param(params, key)?)
}

/// Optional string parameter; absent or null means `None`.
pub fn opt_str_param<'a>(
    params: &'a serde_json::Value,
    key: &str,
) -> Result<Option<&'a str>, DomainError> {
    match params.get(key) {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(v) => v
            .as_str()
            .map(Some)
            .ok_or_else(|| DomainError::invalid(key, "must be a string")),
    }
}

/// Optional list of identifiers, deduplicated; absent or null means `None`.
pub fn opt_id_list_param(
    params: &serde_json::Value,
    key: &str,
) -> Result<Option<Vec<String>>, DomainError> {
    let Some(v) = params.get(key) else {
        return Ok(None);
    };
    if v.is_null() {
        return Ok(None);
    }
    let Some(items) = v.as_array() else {
        return Err(DomainError::invalid(key, "must be an array of identifiers"));
    };
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let Some(raw) = item.as_str() else {
            return Err(DomainError::invalid(key, "must be an array of identifiers"));
        };
        let id = parse_id(key, raw)?;
        if !out.contains(&id) {
            out.push(id);
        }
    }
    Ok(Some(out))
}

/// Optional list of identifiers; absent means empty.
pub fn id_list_param(params: &serde_json::Value, key: &str) -> Result<Vec<String>, DomainError> {
    Ok(opt_id_list_param(params, key)?.unwrap_or_default())
}

pub fn require_actor(conn: &Connection, req: &Request) -> Result<Actor, DomainError> {
    let Some(actor) = req.actor.as_ref() else {
        return Err(DomainError::Unauthenticated);
    };
    let account_id = parse_id("actor.accountId", &actor.account_id)?;
    resolve_actor(conn, &account_id)
}
