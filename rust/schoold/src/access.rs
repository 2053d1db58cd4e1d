//! Role-gated entry points: each one evaluates its authorization predicate
//! first and only then touches the result tables.

use rusqlite::Connection;
use serde_json::json;

use crate::audit::Audit;
use crate::authz::{
    can_teacher_access_subject, can_teacher_access_track, can_view_student_results, require_role,
    Actor, Role,
};
use crate::db::with_unit_of_work;
use crate::error::DomainError;
use crate::grading::ScoreComponents;
use crate::results::{self, ExamResultInput, FinalResult, SavedExamResult};

pub fn students_for_track(
    conn: &Connection,
    audit: &dyn Audit,
    actor: &Actor,
    track: &str,
) -> Result<Vec<results::TrackStudent>, DomainError> {
    require_role(audit, actor, &[Role::Teacher], "list students by track")?;
    if !can_teacher_access_track(conn, audit, &actor.account_id, track)? {
        return Err(DomainError::forbidden("no subject assigned in this track"));
    }
    results::list_students_by_track(conn, track)
}

fn ensure_subject_access(
    conn: &Connection,
    audit: &dyn Audit,
    actor: &Actor,
    subject_id: &str,
    action: &str,
) -> Result<(), DomainError> {
    match actor.role {
        Role::Admin => Ok(()),
        Role::Teacher => {
            if can_teacher_access_subject(conn, audit, &actor.account_id, subject_id)? {
                Ok(())
            } else {
                Err(DomainError::forbidden("not assigned to this subject"))
            }
        }
        Role::Student => require_role(audit, actor, &[Role::Admin, Role::Teacher], action),
    }
}

pub fn record_exam_results(
    conn: &Connection,
    audit: &dyn Audit,
    actor: &Actor,
    student_id: &str,
    subject_id: &str,
    components: ScoreComponents,
) -> Result<SavedExamResult, DomainError> {
    ensure_subject_access(conn, audit, actor, subject_id, "record exam results")?;
    let input = ExamResultInput {
        student_id,
        subject_id,
        components,
        acting_account_id: &actor.account_id,
    };
    with_unit_of_work(conn, |tx| results::save_exam_results(tx, audit, &input))
}

fn ensure_can_view_student(
    conn: &Connection,
    audit: &dyn Audit,
    actor: &Actor,
    student_id: &str,
) -> Result<(), DomainError> {
    if can_view_student_results(conn, audit, student_id, &actor.account_id, actor.role)? {
        Ok(())
    } else {
        Err(DomainError::forbidden("not allowed to view this student's results"))
    }
}

pub fn results_for_student(
    conn: &Connection,
    audit: &dyn Audit,
    actor: &Actor,
    student_id: &str,
) -> Result<Vec<results::StudentResultRow>, DomainError> {
    ensure_can_view_student(conn, audit, actor, student_id)?;
    if !results::student_exists(conn, student_id)? {
        return Err(DomainError::not_found("student", student_id));
    }
    results::list_student_results(conn, student_id)
}

pub fn results_for_subject(
    conn: &Connection,
    audit: &dyn Audit,
    actor: &Actor,
    subject_id: &str,
) -> Result<Vec<results::SubjectResultRow>, DomainError> {
    ensure_subject_access(conn, audit, actor, subject_id, "view subject results")?;
    if !results::subject_exists(conn, subject_id)? {
        return Err(DomainError::not_found("subject", subject_id));
    }
    results::list_subject_results(conn, subject_id)
}

pub fn calculate_final_result(
    conn: &Connection,
    audit: &dyn Audit,
    actor: &Actor,
    student_id: &str,
) -> Result<FinalResult, DomainError> {
    require_role(audit, actor, &[Role::Admin], "calculate final results")?;
    with_unit_of_work(conn, |tx| results::compute_final_result(tx, audit, student_id))
}

pub fn final_result_for_student(
    conn: &Connection,
    audit: &dyn Audit,
    actor: &Actor,
    student_id: &str,
) -> Result<serde_json::Value, DomainError> {
    ensure_can_view_student(conn, audit, actor, student_id)?;
    match results::get_final_result(conn, student_id)? {
        Some((final_result, stale)) => Ok(json!({
            "finalResult": final_result,
            "stale": stale,
        })),
        None => Err(DomainError::not_found("final result", student_id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::memory::MemoryAudit;
    use crate::audit::Channel;
    use crate::db::open_in_memory;

    fn seed(conn: &Connection) {
        conn.execute_batch(
            "INSERT INTO accounts(id, email, name, role, created_at) VALUES
               ('acc-admin', 'admin@school.test', 'Admin', 'admin', '2026-01-01T00:00:00Z'),
               ('acc-a', 'a@school.test', 'Teacher A', 'teacher', '2026-01-01T00:00:00Z'),
               ('acc-b', 'b@school.test', 'Student B', 'student', '2026-01-01T00:00:00Z');
             INSERT INTO teachers(id, account_id, first_name, last_name) VALUES
               ('teacher-a', 'acc-a', 'Teacher', 'A');
             INSERT INTO students(id, account_id, first_name, roll_number, track) VALUES
               ('student-b', 'acc-b', 'Student B', 'R100', 'T1');
             INSERT INTO subjects(id, name, track) VALUES
               ('subject-s', 'Subject S', 'T1'),
               ('subject-o', 'Other', 'T1');
             INSERT INTO teacher_subjects(teacher_id, subject_id) VALUES
               ('teacher-a', 'subject-s');",
        )
        .expect("seed");
    }

    fn actor(account_id: &str, role: Role) -> Actor {
        Actor {
            account_id: account_id.to_string(),
            role,
        }
    }

    fn scores() -> ScoreComponents {
        ScoreComponents {
            coefficient: 1.0,
            tp_score: 12.0,
            continuous_assessment_score: 12.0,
            final_exam_score: 12.0,
            retake_score: 0.0,
        }
    }

    #[test]
    fn teacher_gains_view_access_after_grading_shared_subject() {
        let conn = open_in_memory();
        seed(&conn);
        let audit = MemoryAudit::default();
        let teacher = actor("acc-a", Role::Teacher);

        let denied = results_for_student(&conn, &audit, &teacher, "student-b").expect_err("denied");
        assert_eq!(denied.code(), "forbidden");

        let saved = record_exam_results(&conn, &audit, &teacher, "student-b", "subject-s", scores())
            .expect("save");
        assert!((saved.final_score - 12.0).abs() < 1e-9);

        let rows = results_for_student(&conn, &audit, &teacher, "student-b").expect("granted");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn teacher_cannot_grade_unassigned_subject_and_student_cannot_grade_at_all() {
        let conn = open_in_memory();
        seed(&conn);
        let audit = MemoryAudit::default();

        let err = record_exam_results(
            &conn,
            &audit,
            &actor("acc-a", Role::Teacher),
            "student-b",
            "subject-o",
            scores(),
        )
        .expect_err("unassigned");
        assert_eq!(err.code(), "forbidden");

        let err = record_exam_results(
            &conn,
            &audit,
            &actor("acc-b", Role::Student),
            "student-b",
            "subject-s",
            scores(),
        )
        .expect_err("student");
        assert_eq!(err.code(), "forbidden");
        assert_eq!(audit.count(Channel::Security), 2);

        // Admin writes without an assignment.
        record_exam_results(
            &conn,
            &audit,
            &actor("acc-admin", Role::Admin),
            "student-b",
            "subject-o",
            scores(),
        )
        .expect("admin save");
    }

    #[test]
    fn track_listing_is_teacher_only() {
        let conn = open_in_memory();
        seed(&conn);
        let audit = MemoryAudit::default();

        let listed = students_for_track(&conn, &audit, &actor("acc-a", Role::Teacher), "T1")
            .expect("teacher");
        assert_eq!(listed.len(), 1);

        let err = students_for_track(&conn, &audit, &actor("acc-a", Role::Teacher), "T2")
            .expect_err("other track");
        assert_eq!(err.code(), "forbidden");

        let err = students_for_track(&conn, &audit, &actor("acc-admin", Role::Admin), "T1")
            .expect_err("admin");
        assert_eq!(err.code(), "forbidden");
        assert_eq!(audit.count(Channel::Security), 2);
    }

    #[test]
    fn subject_results_hidden_from_students() {
        let conn = open_in_memory();
        seed(&conn);
        let audit = MemoryAudit::default();

        let err = results_for_subject(&conn, &audit, &actor("acc-b", Role::Student), "subject-s")
            .expect_err("student");
        assert_eq!(err.code(), "forbidden");
        assert_eq!(audit.count(Channel::Security), 1);

        let rows = results_for_subject(&conn, &audit, &actor("acc-admin", Role::Admin), "subject-s")
            .expect("admin");
        assert!(rows.is_empty());

        let err = results_for_subject(&conn, &audit, &actor("acc-admin", Role::Admin), "subject-x")
            .expect_err("missing");
        assert_eq!(err.code(), "not_found");
    }

    #[test]
    fn final_results_are_admin_triggered() {
        let conn = open_in_memory();
        seed(&conn);
        let audit = MemoryAudit::default();
        let admin = actor("acc-admin", Role::Admin);

        let err = calculate_final_result(&conn, &audit, &actor("acc-a", Role::Teacher), "student-b")
            .expect_err("teacher");
        assert_eq!(err.code(), "forbidden");

        let err = calculate_final_result(&conn, &audit, &admin, "student-b").expect_err("empty");
        assert_eq!(err.code(), "no_results");

        record_exam_results(&conn, &audit, &admin, "student-b", "subject-s", scores()).expect("save");
        let fr = calculate_final_result(&conn, &audit, &admin, "student-b").expect("final");
        assert!((fr.general_average - 12.0).abs() < 1e-9);

        let own = final_result_for_student(&conn, &audit, &actor("acc-b", Role::Student), "student-b")
            .expect("own");
        assert_eq!(own["stale"], json!(false));
        assert_eq!(own["finalResult"]["decision"], json!("validated"));
    }
}
