use serde_json::json;

use crate::audit::Audit;
use crate::error::DomainError;

pub fn ok(id: &str, result: serde_json::Value) -> serde_json::Value {
    json!({
        "id": id,
        "ok": true,
        "result": result
    })
}

pub fn err(
    id: &str,
    code: &str,
    message: impl Into<String>,
    details: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut error = json!({
        "code": code,
        "message": message.into(),
    });
    if let Some(d) = details {
        error["details"] = d;
    }
    json!({
        "id": id,
        "ok": false,
        "error": error,
    })
}

pub fn domain_err(id: &str, e: &DomainError) -> serde_json::Value {
    err(id, e.code(), e.to_string(), e.details())
}

/// Turns a handler outcome into a response line. Storage failures are
/// reported on the error channel before being returned to the caller.
pub fn respond(
    id: &str,
    audit: &dyn Audit,
    result: Result<serde_json::Value, DomainError>,
) -> serde_json::Value {
    match result {
        Ok(v) => ok(id, v),
        Err(e) => {
            if e.is_storage() {
                audit.error(
                    "storage failure",
                    json!({ "requestId": id, "error": e.to_string() }),
                );
            }
            domain_err(id, &e)
        }
    }
}
