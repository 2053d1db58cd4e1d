use crate::access;
use crate::audit::Audit;
use crate::error::DomainError;
use crate::grading::ScoreComponents;
use crate::ipc::error::{err, respond};
use crate::ipc::helpers::{id_param, require_actor, str_param};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;
use serde_json::json;

fn students_by_track(
    conn: &Connection,
    audit: &dyn Audit,
    req: &Request,
) -> Result<serde_json::Value, DomainError> {
    let actor = require_actor(conn, req)?;
    let track = str_param(&req.params, "track")?.trim();
    if track.is_empty() {
        return Err(DomainError::invalid("track", "must not be empty"));
    }
    let students = access::students_for_track(conn, audit, &actor, track)?;
    Ok(json!({ "track": track, "students": students }))
}

fn results_save(
    conn: &Connection,
    audit: &dyn Audit,
    req: &Request,
) -> Result<serde_json::Value, DomainError> {
    let actor = require_actor(conn, req)?;
    let student_id = id_param(&req.params, "studentId")?;
    let subject_id = id_param(&req.params, "subjectId")?;
    let Some(raw) = req.params.get("results") else {
        return Err(DomainError::invalid("results", "missing results"));
    };
    let components: ScoreComponents = serde_json::from_value(raw.clone())
        .map_err(|e| DomainError::invalid("results", e.to_string()))?;

    let saved =
        access::record_exam_results(conn, audit, &actor, &student_id, &subject_id, components)?;
    Ok(json!(saved))
}

fn results_by_student(
    conn: &Connection,
    audit: &dyn Audit,
    req: &Request,
) -> Result<serde_json::Value, DomainError> {
    let actor = require_actor(conn, req)?;
    let student_id = id_param(&req.params, "studentId")?;
    let rows = access::results_for_student(conn, audit, &actor, &student_id)?;
    Ok(json!({ "studentId": student_id, "results": rows }))
}

fn results_by_subject(
    conn: &Connection,
    audit: &dyn Audit,
    req: &Request,
) -> Result<serde_json::Value, DomainError> {
    let actor = require_actor(conn, req)?;
    let subject_id = id_param(&req.params, "subjectId")?;
    let rows = access::results_for_subject(conn, audit, &actor, &subject_id)?;
    Ok(json!({ "subjectId": subject_id, "results": rows }))
}

fn results_calculate_final(
    conn: &Connection,
    audit: &dyn Audit,
    req: &Request,
) -> Result<serde_json::Value, DomainError> {
    let actor = require_actor(conn, req)?;
    let student_id = id_param(&req.params, "studentId")?;
    let fr = access::calculate_final_result(conn, audit, &actor, &student_id)?;
    Ok(json!({
        "studentId": fr.student_id,
        "generalAverage": fr.general_average,
        "decision": fr.decision,
        "totalCoefficient": fr.total_coefficient,
        "computedAt": fr.computed_at,
    }))
}

fn final_results_get(
    conn: &Connection,
    audit: &dyn Audit,
    req: &Request,
) -> Result<serde_json::Value, DomainError> {
    let actor = require_actor(conn, req)?;
    let student_id = id_param(&req.params, "studentId")?;
    access::final_result_for_student(conn, audit, &actor, &student_id)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.byTrack"
        | "results.save"
        | "results.byStudent"
        | "results.bySubject"
        | "results.calculateFinal"
        | "finalResults.get" => {}
        _ => return None,
    }
    let Some(conn) = state.db.as_ref() else {
        return Some(err(&req.id, "no_workspace", "select a workspace first", None));
    };
    let audit = state.audit.as_ref();
    let result = match req.method.as_str() {
        "students.byTrack" => students_by_track(conn, audit, req),
        "results.save" => results_save(conn, audit, req),
        "results.byStudent" => results_by_student(conn, audit, req),
        "results.bySubject" => results_by_subject(conn, audit, req),
        "results.calculateFinal" => results_calculate_final(conn, audit, req),
        _ => final_results_get(conn, audit, req),
    };
    Some(respond(&req.id, audit, result))
}
