use crate::audit::Audit;
use crate::authz::{require_role, Role};
use crate::db::with_unit_of_work;
use crate::error::DomainError;
use crate::ipc::error::{err, respond};
use crate::ipc::helpers::{id_param, require_actor, str_param};
use crate::ipc::types::{AppState, Request};
use crate::schedule::{self, ScheduleInput};
use rusqlite::Connection;
use serde_json::json;

fn schedule_list(conn: &Connection, req: &Request) -> Result<serde_json::Value, DomainError> {
    require_actor(conn, req)?;
    Ok(json!({ "entries": schedule::list_entries(conn)? }))
}

fn schedule_by_class(conn: &Connection, req: &Request) -> Result<serde_json::Value, DomainError> {
    require_actor(conn, req)?;
    let class_name = str_param(&req.params, "className")?.trim();
    if class_name.is_empty() {
        return Err(DomainError::invalid("className", "must not be empty"));
    }
    Ok(json!({
        "className": class_name,
        "entries": schedule::entries_for_class(conn, class_name)?,
    }))
}

fn schedule_by_teacher(
    conn: &Connection,
    req: &Request,
) -> Result<serde_json::Value, DomainError> {
    require_actor(conn, req)?;
    let teacher_id = id_param(&req.params, "teacherId")?;
    Ok(json!({
        "teacherId": teacher_id,
        "entries": schedule::entries_for_teacher(conn, &teacher_id)?,
    }))
}

/// Takes the already-parsed teacher and subject identifiers.
fn entry_input<'a>(
    params: &'a serde_json::Value,
    teacher_id: &'a str,
    subject_id: &'a str,
) -> Result<ScheduleInput<'a>, DomainError> {
    Ok(ScheduleInput {
        teacher_id,
        subject_id,
        class_name: str_param(params, "className")?,
        day_of_week: str_param(params, "dayOfWeek")?,
        start_time: str_param(params, "startTime")?,
        end_time: str_param(params, "endTime")?,
        room_number: str_param(params, "roomNumber")?,
    })
}

fn schedule_create(
    conn: &Connection,
    audit: &dyn Audit,
    req: &Request,
) -> Result<serde_json::Value, DomainError> {
    let actor = require_actor(conn, req)?;
    require_role(audit, &actor, &[Role::Admin], "create schedule entries")?;
    let teacher_id = id_param(&req.params, "teacherId")?;
    let subject_id = id_param(&req.params, "subjectId")?;
    let input = entry_input(&req.params, &teacher_id, &subject_id)?;
    let entry = with_unit_of_work(conn, |tx| schedule::create_entry(tx, audit, &input))?;
    Ok(json!({ "entry": entry }))
}

fn schedule_update(
    conn: &Connection,
    audit: &dyn Audit,
    req: &Request,
) -> Result<serde_json::Value, DomainError> {
    let actor = require_actor(conn, req)?;
    require_role(audit, &actor, &[Role::Admin], "update schedule entries")?;
    let entry_id = id_param(&req.params, "entryId")?;
    let teacher_id = id_param(&req.params, "teacherId")?;
    let subject_id = id_param(&req.params, "subjectId")?;
    let input = entry_input(&req.params, &teacher_id, &subject_id)?;
    let entry = with_unit_of_work(conn, |tx| {
        schedule::update_entry(tx, audit, &entry_id, &input)
    })?;
    Ok(json!({ "entry": entry }))
}

fn schedule_delete(
    conn: &Connection,
    audit: &dyn Audit,
    req: &Request,
) -> Result<serde_json::Value, DomainError> {
    let actor = require_actor(conn, req)?;
    require_role(audit, &actor, &[Role::Admin], "delete schedule entries")?;
    let entry_id = id_param(&req.params, "entryId")?;
    with_unit_of_work(conn, |tx| schedule::delete_entry(tx, audit, &entry_id))?;
    Ok(json!({ "entryId": entry_id, "deleted": true }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "schedule.list"
        | "schedule.byClass"
        | "schedule.byTeacher"
        | "schedule.create"
        | "schedule.update"
        | "schedule.delete" => {}
        _ => return None,
    }
    let Some(conn) = state.db.as_ref() else {
        return Some(err(&req.id, "no_workspace", "select a workspace first", None));
    };
    let audit = state.audit.as_ref();
    let result = match req.method.as_str() {
        "schedule.list" => schedule_list(conn, req),
        "schedule.byClass" => schedule_by_class(conn, req),
        "schedule.byTeacher" => schedule_by_teacher(conn, req),
        "schedule.create" => schedule_create(conn, audit, req),
        "schedule.update" => schedule_update(conn, audit, req),
        _ => schedule_delete(conn, audit, req),
    };
    Some(respond(&req.id, audit, result))
}
