use crate::audit::Audit;
use crate::authz::{require_role, Role};
use crate::db::with_unit_of_work;
use crate::error::DomainError;
use crate::ipc::error::{err, respond};
use crate::ipc::helpers::{id_list_param, id_param, require_actor, str_param};
use crate::ipc::types::{AppState, Request};
use crate::registry;
use rusqlite::Connection;
use serde_json::json;

fn subjects_create(
    conn: &Connection,
    audit: &dyn Audit,
    req: &Request,
) -> Result<serde_json::Value, DomainError> {
    let actor = require_actor(conn, req)?;
    require_role(audit, &actor, &[Role::Admin], "create subjects")?;
    let name = str_param(&req.params, "name")?;
    let track = str_param(&req.params, "track")?;
    let teacher_ids = id_list_param(&req.params, "teacherIds")?;
    let subject = with_unit_of_work(conn, |tx| {
        registry::create_subject(tx, audit, name, track, &teacher_ids)
    })?;
    Ok(json!({ "subject": subject }))
}

fn subjects_update(
    conn: &Connection,
    audit: &dyn Audit,
    req: &Request,
) -> Result<serde_json::Value, DomainError> {
    let actor = require_actor(conn, req)?;
    require_role(audit, &actor, &[Role::Admin], "update subjects")?;
    let subject_id = id_param(&req.params, "subjectId")?;
    let name = str_param(&req.params, "name")?;
    let track = str_param(&req.params, "track")?;
    let teacher_ids = id_list_param(&req.params, "teacherIds")?;
    let subject = with_unit_of_work(conn, |tx| {
        registry::update_subject(tx, audit, &subject_id, name, track, &teacher_ids)
    })?;
    Ok(json!({ "subject": subject }))
}

fn subjects_delete(
    conn: &Connection,
    audit: &dyn Audit,
    req: &Request,
) -> Result<serde_json::Value, DomainError> {
    let actor = require_actor(conn, req)?;
    require_role(audit, &actor, &[Role::Admin], "delete subjects")?;
    let subject_id = id_param(&req.params, "subjectId")?;
    with_unit_of_work(conn, |tx| registry::delete_subject(tx, audit, &subject_id))?;
    Ok(json!({ "subjectId": subject_id, "deleted": true }))
}

fn subjects_list(conn: &Connection, req: &Request) -> Result<serde_json::Value, DomainError> {
    require_actor(conn, req)?;
    Ok(json!({ "subjects": registry::list_subjects(conn)? }))
}

fn subjects_tracks(conn: &Connection, req: &Request) -> Result<serde_json::Value, DomainError> {
    require_actor(conn, req)?;
    Ok(json!({ "tracks": registry::list_tracks(conn)? }))
}

fn subjects_for_teacher(conn: &Connection, req: &Request) -> Result<serde_json::Value, DomainError> {
    require_actor(conn, req)?;
    let teacher_id = id_param(&req.params, "teacherId")?;
    Ok(json!({ "subjects": registry::subjects_for_teacher(conn, &teacher_id)? }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "subjects.create"
        | "subjects.update"
        | "subjects.delete"
        | "subjects.list"
        | "subjects.tracks"
        | "subjects.forTeacher" => {}
        _ => return None,
    }
    let Some(conn) = state.db.as_ref() else {
        return Some(err(&req.id, "no_workspace", "select a workspace first", None));
    };
    let audit = state.audit.as_ref();
    let result = match req.method.as_str() {
        "subjects.create" => subjects_create(conn, audit, req),
        "subjects.update" => subjects_update(conn, audit, req),
        "subjects.delete" => subjects_delete(conn, audit, req),
        "subjects.list" => subjects_list(conn, req),
        "subjects.tracks" => subjects_tracks(conn, req),
        _ => subjects_for_teacher(conn, req),
    };
    Some(respond(&req.id, audit, result))
}
