use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use serde_json::json;

use crate::audit::Audit;
use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Teacher => "teacher",
            Role::Student => "student",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "admin" => Some(Role::Admin),
            "teacher" => Some(Role::Teacher),
            "student" => Some(Role::Student),
            _ => None,
        }
    }
}

/// Authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub account_id: String,
    pub role: Role,
}

pub fn resolve_actor(conn: &Connection, account_id: &str) -> Result<Actor, DomainError> {
    let role: Option<String> = conn
        .query_row(
            "SELECT role FROM accounts WHERE id = ?",
            [account_id],
            |r| r.get(0),
        )
        .optional()?;
    let Some(role) = role else {
        return Err(DomainError::Unauthenticated);
    };
    // The CHECK constraint on accounts.role keeps this exhaustive.
    let role = Role::parse(&role).ok_or(DomainError::Unauthenticated)?;
    Ok(Actor {
        account_id: account_id.to_string(),
        role,
    })
}

/// Fails with `Forbidden` (logged on the security channel) unless the actor
/// holds one of `allowed`.
pub fn require_role(
    audit: &dyn Audit,
    actor: &Actor,
    allowed: &[Role],
    action: &str,
) -> Result<(), DomainError> {
    if allowed.contains(&actor.role) {
        return Ok(());
    }
    audit.security(
        "role not allowed for action",
        json!({
            "accountId": actor.account_id,
            "role": actor.role.as_str(),
            "action": action,
        }),
    );
    Err(DomainError::forbidden(format!(
        "role {} may not {}",
        actor.role.as_str(),
        action
    )))
}

pub fn resolve_teacher_profile_id(
    conn: &Connection,
    account_id: &str,
) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT id FROM teachers WHERE account_id = ?",
        [account_id],
        |r| r.get(0),
    )
    .optional()
}

pub fn resolve_student_profile_id(
    conn: &Connection,
    account_id: &str,
) -> rusqlite::Result<Option<String>> {
    conn.query_row(
        "SELECT id FROM students WHERE account_id = ?",
        [account_id],
        |r| r.get(0),
    )
    .optional()
}

pub fn can_teacher_access_track(
    conn: &Connection,
    audit: &dyn Audit,
    account_id: &str,
    track: &str,
) -> Result<bool, DomainError> {
    let Some(teacher_id) = resolve_teacher_profile_id(conn, account_id)? else {
        audit.warning("teacher profile not found", json!({ "accountId": account_id }));
        return Ok(false);
    };

    let found: Option<i64> = conn
        .query_row(
            "SELECT 1
             FROM teacher_subjects ts
             JOIN subjects s ON s.id = ts.subject_id
             WHERE ts.teacher_id = ? AND s.track = ?
             LIMIT 1",
            (&teacher_id, track),
            |r| r.get(0),
        )
        .optional()?;

    let granted = found.is_some();
    if !granted {
        audit.security(
            "track access denied",
            json!({ "teacherId": teacher_id, "track": track }),
        );
    }
    Ok(granted)
}

pub fn can_teacher_access_subject(
    conn: &Connection,
    audit: &dyn Audit,
    account_id: &str,
    subject_id: &str,
) -> Result<bool, DomainError> {
    let Some(teacher_id) = resolve_teacher_profile_id(conn, account_id)? else {
        audit.warning("teacher profile not found", json!({ "accountId": account_id }));
        return Ok(false);
    };

    let found: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM teacher_subjects WHERE teacher_id = ? AND subject_id = ?",
            (&teacher_id, subject_id),
            |r| r.get(0),
        )
        .optional()?;

    let granted = found.is_some();
    if !granted {
        audit.security(
            "subject access denied",
            json!({ "teacherId": teacher_id, "subjectId": subject_id }),
        );
    }
    Ok(granted)
}

/// Who may read a student's results.
///
/// Teachers are result-scoped: they see a student only once an exam result
/// exists for that student in one of their assigned subjects. Students see
/// only their own profile.
pub fn can_view_student_results(
    conn: &Connection,
    audit: &dyn Audit,
    student_id: &str,
    requesting_account_id: &str,
    role: Role,
) -> Result<bool, DomainError> {
    match role {
        Role::Admin => Ok(true),
        Role::Teacher => {
            let Some(teacher_id) = resolve_teacher_profile_id(conn, requesting_account_id)? else {
                audit.warning(
                    "teacher profile not found",
                    json!({ "accountId": requesting_account_id }),
                );
                return Ok(false);
            };
            let shared: Option<i64> = conn
                .query_row(
                    "SELECT 1
                     FROM teacher_subjects ts
                     JOIN exam_results er ON er.subject_id = ts.subject_id
                     WHERE ts.teacher_id = ? AND er.student_id = ?
                     LIMIT 1",
                    (&teacher_id, student_id),
                    |r| r.get(0),
                )
                .optional()?;
            let granted = shared.is_some();
            if !granted {
                audit.security(
                    "teacher has no graded subject with student",
                    json!({ "teacherId": teacher_id, "studentId": student_id }),
                );
            }
            Ok(granted)
        }
        Role::Student => {
            let Some(own_id) = resolve_student_profile_id(conn, requesting_account_id)? else {
                audit.warning(
                    "student profile not found",
                    json!({ "accountId": requesting_account_id }),
                );
                return Ok(false);
            };
            let granted = own_id == student_id;
            if !granted {
                audit.security(
                    "attempt to read another student's results",
                    json!({
                        "requestingStudentId": own_id,
                        "requestedStudentId": student_id,
                    }),
                );
            }
            Ok(granted)
        }
    }
}
