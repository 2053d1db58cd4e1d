use crate::audit::Audit;
use crate::authz::{require_role, Role};
use crate::db::with_unit_of_work;
use crate::error::DomainError;
use crate::ipc::error::{err, respond};
use crate::ipc::helpers::{
    id_list_param, id_param, opt_id_list_param, opt_str_param, require_actor, str_param,
};
use crate::ipc::types::{AppState, Request};
use crate::registry::{self, NewTeacher, Registration, TeacherChanges};
use rusqlite::Connection;
use serde_json::json;

fn accounts_register(
    conn: &Connection,
    audit: &dyn Audit,
    req: &Request,
) -> Result<serde_json::Value, DomainError> {
    let reg: Registration = serde_json::from_value(req.params.clone())
        .map_err(|e| DomainError::invalid("params", e.to_string()))?;
    let account = with_unit_of_work(conn, |tx| registry::register_account(tx, audit, &reg))?;
    Ok(json!(account))
}

fn accounts_me(conn: &Connection, req: &Request) -> Result<serde_json::Value, DomainError> {
    let actor = require_actor(conn, req)?;
    Ok(json!(registry::account_profile(conn, &actor.account_id)?))
}

fn students_id_for_account(
    conn: &Connection,
    req: &Request,
) -> Result<serde_json::Value, DomainError> {
    require_actor(conn, req)?;
    let account_id = id_param(&req.params, "accountId")?;
    let student_id = registry::student_id_for_account(conn, &account_id)?;
    Ok(json!({ "studentId": student_id }))
}

fn teachers_list(conn: &Connection, req: &Request) -> Result<serde_json::Value, DomainError> {
    require_actor(conn, req)?;
    Ok(json!({ "teachers": registry::list_teachers(conn)? }))
}

fn teachers_create(
    conn: &Connection,
    audit: &dyn Audit,
    req: &Request,
) -> Result<serde_json::Value, DomainError> {
    let actor = require_actor(conn, req)?;
    require_role(audit, &actor, &[Role::Admin], "create teachers")?;
    let subject_ids = id_list_param(&req.params, "subjectIds")?;
    let new_teacher = NewTeacher {
        email: str_param(&req.params, "email")?,
        first_name: str_param(&req.params, "firstName")?,
        last_name: str_param(&req.params, "lastName")?,
        phone_number: opt_str_param(&req.params, "phoneNumber")?,
        subject_ids: &subject_ids,
    };
    let teacher =
        with_unit_of_work(conn, |tx| registry::create_teacher(tx, audit, &new_teacher))?;
    Ok(json!({ "teacher": teacher }))
}

fn teachers_update(
    conn: &Connection,
    audit: &dyn Audit,
    req: &Request,
) -> Result<serde_json::Value, DomainError> {
    let actor = require_actor(conn, req)?;
    require_role(audit, &actor, &[Role::Admin], "update teachers")?;
    let teacher_id = id_param(&req.params, "teacherId")?;
    let subject_ids = opt_id_list_param(&req.params, "subjectIds")?;
    let changes = TeacherChanges {
        first_name: opt_str_param(&req.params, "firstName")?,
        last_name: opt_str_param(&req.params, "lastName")?,
        phone_number: opt_str_param(&req.params, "phoneNumber")?,
        subject_ids: subject_ids.as_deref(),
    };
    let teacher = with_unit_of_work(conn, |tx| {
        registry::update_teacher(tx, audit, &teacher_id, &changes)
    })?;
    Ok(json!({ "teacher": teacher }))
}

fn teachers_delete(
    conn: &Connection,
    audit: &dyn Audit,
    req: &Request,
) -> Result<serde_json::Value, DomainError> {
    let actor = require_actor(conn, req)?;
    require_role(audit, &actor, &[Role::Admin], "delete teachers")?;
    let teacher_id = id_param(&req.params, "teacherId")?;
    let removed = with_unit_of_work(conn, |tx| registry::delete_teacher(tx, audit, &teacher_id))?;
    Ok(json!(removed))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "accounts.register"
        | "accounts.me"
        | "students.idForAccount"
        | "teachers.list"
        | "teachers.create"
        | "teachers.update"
        | "teachers.delete" => {}
        _ => return None,
    }
    let Some(conn) = state.db.as_ref() else {
        return Some(err(&req.id, "no_workspace", "select a workspace first", None));
    };
    let audit = state.audit.as_ref();
    let result = match req.method.as_str() {
        "accounts.register" => accounts_register(conn, audit, req),
        "accounts.me" => accounts_me(conn, req),
        "students.idForAccount" => students_id_for_account(conn, req),
        "teachers.list" => teachers_list(conn, req),
        "teachers.create" => teachers_create(conn, audit, req),
        "teachers.update" => teachers_update(conn, audit, req),
        _ => teachers_delete(conn, audit, req),
    };
    Some(respond(&req.id, audit, result))
}
