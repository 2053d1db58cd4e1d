use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::audit::Audit;
use crate::db::now_timestamp;
use crate::error::DomainError;
use crate::grading::{
    compute_general_average, round_for_display, Decision, ScoreComponents, WeightedScore,
};

#[derive(Debug, Clone)]
pub struct ExamResultInput<'a> {
    pub student_id: &'a str,
    pub subject_id: &'a str,
    pub components: ScoreComponents,
    pub acting_account_id: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedExamResult {
    pub final_score: f64,
    pub outcome: UpsertOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalResult {
    pub student_id: String,
    pub general_average: f64,
    pub decision: Decision,
    pub total_coefficient: f64,
    pub computed_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentResultRow {
    pub id: String,
    pub subject_id: String,
    pub subject_name: String,
    pub track: String,
    pub coefficient: f64,
    pub tp_score: f64,
    pub continuous_assessment_score: f64,
    pub final_exam_score: f64,
    pub retake_score: f64,
    pub final_score: f64,
    pub display_score: f64,
    pub recorded_by: String,
    pub recorded_by_name: Option<String>,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResultRow {
    pub id: String,
    pub student_id: String,
    pub student_name: String,
    pub roll_number: String,
    pub coefficient: f64,
    pub tp_score: f64,
    pub continuous_assessment_score: f64,
    pub final_exam_score: f64,
    pub retake_score: f64,
    pub final_score: f64,
    pub display_score: f64,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackStudent {
    pub id: String,
    pub account_id: String,
    pub name: String,
    pub roll_number: String,
    pub track: String,
    pub email: String,
}

pub fn student_exists(conn: &Connection, student_id: &str) -> rusqlite::Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM students WHERE id = ?", [student_id], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

pub fn subject_exists(conn: &Connection, subject_id: &str) -> rusqlite::Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM subjects WHERE id = ?", [subject_id], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

/// Computes the subject's final score and writes it as the single exam
/// result row for (student, subject): updated in place when one exists,
/// inserted otherwise. Authorization is the caller's job, and so is the
/// transaction: `conn` is expected to be an open unit of work.
pub fn save_exam_results(
    conn: &Connection,
    audit: &dyn Audit,
    input: &ExamResultInput<'_>,
) -> Result<SavedExamResult, DomainError> {
    input.components.validate()?;
    if !student_exists(conn, input.student_id)? {
        return Err(DomainError::not_found("student", input.student_id));
    }
    if !subject_exists(conn, input.subject_id)? {
        return Err(DomainError::not_found("subject", input.subject_id));
    }

    let c = &input.components;
    let final_score = c.final_score();
    let now = now_timestamp();

    let existing: Option<String> = conn
        .query_row(
            "SELECT id FROM exam_results WHERE student_id = ? AND subject_id = ?",
            (input.student_id, input.subject_id),
            |r| r.get(0),
        )
        .optional()?;

    let outcome = match existing {
        Some(result_id) => {
            conn.execute(
                "UPDATE exam_results
                 SET coefficient = ?, tp_score = ?, continuous_assessment_score = ?,
                     final_exam_score = ?, retake_score = ?, final_score = ?,
                     created_by = ?, updated_at = ?
                 WHERE id = ?",
                (
                    c.coefficient,
                    c.tp_score,
                    c.continuous_assessment_score,
                    c.final_exam_score,
                    c.retake_score,
                    final_score,
                    input.acting_account_id,
                    &now,
                    &result_id,
                ),
            )?;
            UpsertOutcome::Updated
        }
        None => {
            let result_id = Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO exam_results(
                   id, student_id, subject_id, coefficient, tp_score,
                   continuous_assessment_score, final_exam_score, retake_score,
                   final_score, created_by, created_at, updated_at)
                 VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                (
                    &result_id,
                    input.student_id,
                    input.subject_id,
                    c.coefficient,
                    c.tp_score,
                    c.continuous_assessment_score,
                    c.final_exam_score,
                    c.retake_score,
                    final_score,
                    input.acting_account_id,
                    &now,
                    &now,
                ),
            )?;
            UpsertOutcome::Inserted
        }
    };

    conn.execute(
        "UPDATE students SET results_revision = results_revision + 1 WHERE id = ?",
        [input.student_id],
    )?;

    audit.info(
        "exam result saved",
        json!({
            "studentId": input.student_id,
            "subjectId": input.subject_id,
            "finalScore": final_score,
            "withRetake": c.has_retake(),
            "outcome": outcome,
        }),
    );

    Ok(SavedExamResult {
        final_score,
        outcome,
    })
}

/// Recomputes and stores a student's general average from every exam result
/// on record. Only runs when explicitly requested; saving an exam result
/// never triggers it.
pub fn compute_final_result(
    conn: &Connection,
    audit: &dyn Audit,
    student_id: &str,
) -> Result<FinalResult, DomainError> {
    let revision: Option<i64> = conn
        .query_row(
            "SELECT results_revision FROM students WHERE id = ?",
            [student_id],
            |r| r.get(0),
        )
        .optional()?;
    let Some(revision) = revision else {
        return Err(DomainError::not_found("student", student_id));
    };

    let mut stmt =
        conn.prepare("SELECT final_score, coefficient FROM exam_results WHERE student_id = ?")?;
    let scores = stmt
        .query_map([student_id], |r| {
            Ok(WeightedScore {
                final_score: r.get(0)?,
                coefficient: r.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let aggregate = match compute_general_average(&scores) {
        Ok(v) => v,
        Err(e) => {
            audit.warning(
                "no exam results to aggregate",
                json!({ "studentId": student_id }),
            );
            return Err(e);
        }
    };

    let computed_at = now_timestamp();
    conn.execute(
        "INSERT INTO final_results(
           student_id, general_average, decision, total_coefficient, source_revision, computed_at)
         VALUES(?, ?, ?, ?, ?, ?)
         ON CONFLICT(student_id) DO UPDATE SET
           general_average = excluded.general_average,
           decision = excluded.decision,
           total_coefficient = excluded.total_coefficient,
           source_revision = excluded.source_revision,
           computed_at = excluded.computed_at",
        (
            student_id,
            aggregate.average,
            aggregate.decision.as_str(),
            aggregate.total_coefficient,
            revision,
            &computed_at,
        ),
    )?;

    audit.info(
        "final result computed",
        json!({
            "studentId": student_id,
            "generalAverage": aggregate.average,
            "decision": aggregate.decision,
            "subjectCount": scores.len(),
        }),
    );

    Ok(FinalResult {
        student_id: student_id.to_string(),
        general_average: aggregate.average,
        decision: aggregate.decision,
        total_coefficient: aggregate.total_coefficient,
        computed_at,
    })
}

/// Stored final result plus whether any exam result of the student was
/// saved after it was computed. Every save bumps the student's results
/// revision, so the comparison does not depend on clock resolution.
pub fn get_final_result(
    conn: &Connection,
    student_id: &str,
) -> Result<Option<(FinalResult, bool)>, DomainError> {
    let row: Option<(f64, String, f64, String, i64, i64)> = conn
        .query_row(
            "SELECT fr.general_average, fr.decision, fr.total_coefficient, fr.computed_at,
                    fr.source_revision, st.results_revision
             FROM final_results fr
             JOIN students st ON st.id = fr.student_id
             WHERE fr.student_id = ?",
            [student_id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?, r.get(5)?)),
        )
        .optional()?;
    let Some((general_average, decision, total_coefficient, computed_at, source_revision, current)) =
        row
    else {
        return Ok(None);
    };
    let decision = Decision::parse(&decision).ok_or_else(|| {
        DomainError::Storage(rusqlite::Error::InvalidColumnType(
            1,
            "decision".to_string(),
            rusqlite::types::Type::Text,
        ))
    })?;

    Ok(Some((
        FinalResult {
            student_id: student_id.to_string(),
            general_average,
            decision,
            total_coefficient,
            computed_at,
        },
        current != source_revision,
    )))
}

pub fn list_student_results(
    conn: &Connection,
    student_id: &str,
) -> Result<Vec<StudentResultRow>, DomainError> {
    let mut stmt = conn.prepare(
        "SELECT er.id, er.subject_id, s.name, s.track, er.coefficient, er.tp_score,
                er.continuous_assessment_score, er.final_exam_score, er.retake_score,
                er.final_score, er.created_by, a.name, er.updated_at
         FROM exam_results er
         JOIN subjects s ON s.id = er.subject_id
         LEFT JOIN accounts a ON a.id = er.created_by
         WHERE er.student_id = ?
         ORDER BY s.name, s.id",
    )?;
    let rows = stmt
        .query_map([student_id], |r| {
            let final_score: f64 = r.get(9)?;
            Ok(StudentResultRow {
                id: r.get(0)?,
                subject_id: r.get(1)?,
                subject_name: r.get(2)?,
                track: r.get(3)?,
                coefficient: r.get(4)?,
                tp_score: r.get(5)?,
                continuous_assessment_score: r.get(6)?,
                final_exam_score: r.get(7)?,
                retake_score: r.get(8)?,
                final_score,
                display_score: round_for_display(final_score),
                recorded_by: r.get(10)?,
                recorded_by_name: r.get(11)?,
                updated_at: r.get(12)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_subject_results(
    conn: &Connection,
    subject_id: &str,
) -> Result<Vec<SubjectResultRow>, DomainError> {
    let mut stmt = conn.prepare(
        "SELECT er.id, er.student_id, COALESCE(a.name, st.first_name), st.roll_number,
                er.coefficient, er.tp_score, er.continuous_assessment_score,
                er.final_exam_score, er.retake_score, er.final_score, er.updated_at
         FROM exam_results er
         JOIN students st ON st.id = er.student_id
         LEFT JOIN accounts a ON a.id = st.account_id
         WHERE er.subject_id = ?
         ORDER BY COALESCE(a.name, st.first_name), st.roll_number",
    )?;
    let rows = stmt
        .query_map([subject_id], |r| {
            let final_score: f64 = r.get(9)?;
            Ok(SubjectResultRow {
                id: r.get(0)?,
                student_id: r.get(1)?,
                student_name: r.get(2)?,
                roll_number: r.get(3)?,
                coefficient: r.get(4)?,
                tp_score: r.get(5)?,
                continuous_assessment_score: r.get(6)?,
                final_exam_score: r.get(7)?,
                retake_score: r.get(8)?,
                final_score,
                display_score: round_for_display(final_score),
                updated_at: r.get(10)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn list_students_by_track(
    conn: &Connection,
    track: &str,
) -> Result<Vec<TrackStudent>, DomainError> {
    let mut stmt = conn.prepare(
        "SELECT st.id, st.account_id, COALESCE(a.name, st.first_name), st.roll_number,
                st.track, a.email
         FROM students st
         JOIN accounts a ON a.id = st.account_id
         WHERE st.track = ?
         ORDER BY COALESCE(a.name, st.first_name), st.roll_number",
    )?;
    let rows = stmt
        .query_map([track], |r| {
            Ok(TrackStudent {
                id: r.get(0)?,
                account_id: r.get(1)?,
                name: r.get(2)?,
                roll_number: r.get(3)?,
                track: r.get(4)?,
                email: r.get(5)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
