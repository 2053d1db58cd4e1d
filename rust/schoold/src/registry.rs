//! Accounts, profiles and subject assignments: the records the grading core
//! reads its authorization facts from.

use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::audit::Audit;
use crate::authz::Role;
use crate::db::now_timestamp;
use crate::error::DomainError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub name: String,
    pub role: String,
    pub roll_number: Option<String>,
    pub track: Option<String>,
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredAccount {
    pub account_id: String,
    pub role: Role,
    pub teacher_id: Option<String>,
    pub student_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectSummary {
    pub id: String,
    pub name: String,
    pub track: String,
    pub teacher_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherSummary {
    pub id: String,
    pub account_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub subject_ids: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub id: String,
    pub first_name: String,
    pub roll_number: String,
    pub track: String,
    pub phone_number: Option<String>,
}

/// The caller's own account with the profile its role implies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountProfile {
    pub account_id: String,
    pub email: String,
    pub name: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub teacher: Option<TeacherSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentProfile>,
}

#[derive(Debug, Clone)]
pub struct NewTeacher<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone_number: Option<&'a str>,
    pub subject_ids: &'a [String],
}

/// Fields left as `None` keep their stored value. `subject_ids`, when
/// present, replaces the whole assignment set.
#[derive(Debug, Clone, Default)]
pub struct TeacherChanges<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<&'a str>,
    pub phone_number: Option<&'a str>,
    pub subject_ids: Option<&'a [String]>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemovedTeacher {
    pub teacher_id: String,
    pub account_id: String,
    pub removed_assignments: usize,
    pub removed_schedule_entries: usize,
}

fn required_text(field: &str, value: &str) -> Result<String, DomainError> {
    let v = value.trim();
    if v.is_empty() {
        return Err(DomainError::invalid(field, "must not be empty"));
    }
    Ok(v.to_string())
}

/// "Ada King Byron" => ("Ada", "King Byron").
fn split_full_name(name: &str) -> (String, String) {
    match name.split_once(' ') {
        Some((first, rest)) => (first.to_string(), rest.trim().to_string()),
        None => (name.to_string(), String::new()),
    }
}

fn ensure_email_free(conn: &Connection, email: &str) -> Result<(), DomainError> {
    let taken: Option<i64> = conn
        .query_row("SELECT 1 FROM accounts WHERE email = ?", [email], |r| {
            r.get(0)
        })
        .optional()?;
    if taken.is_some() {
        return Err(DomainError::conflict("account", json!({ "email": email })));
    }
    Ok(())
}

/// Creates an account and the profile its role implies. Expected to run
/// inside a unit of work so a failed profile insert leaves no orphan
/// account behind.
pub fn register_account(
    conn: &Connection,
    audit: &dyn Audit,
    reg: &Registration,
) -> Result<RegisteredAccount, DomainError> {
    let email = required_text("email", &reg.email)?.to_ascii_lowercase();
    let name = required_text("name", &reg.name)?;
    let role = Role::parse(reg.role.trim())
        .ok_or_else(|| DomainError::invalid("role", "must be one of: admin, teacher, student"))?;

    ensure_email_free(conn, &email)?;

    let account_id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO accounts(id, email, name, role, created_at) VALUES(?, ?, ?, ?, ?)",
        (&account_id, &email, &name, role.as_str(), now_timestamp()),
    )?;

    let mut teacher_id = None;
    let mut student_id = None;
    match role {
        Role::Admin => {}
        Role::Teacher => {
            let (first_name, last_name) = split_full_name(&name);
            let id = Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO teachers(id, account_id, first_name, last_name, phone_number)
                 VALUES(?, ?, ?, ?, ?)",
                (&id, &account_id, &first_name, &last_name, &reg.phone_number),
            )?;
            teacher_id = Some(id);
        }
        Role::Student => {
            let roll_number = required_text("rollNumber", reg.roll_number.as_deref().unwrap_or(""))?;
            let track = required_text("track", reg.track.as_deref().unwrap_or(""))?;
            let roll_taken: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM students WHERE roll_number = ?",
                    [&roll_number],
                    |r| r.get(0),
                )
                .optional()?;
            if roll_taken.is_some() {
                return Err(DomainError::conflict(
                    "student",
                    json!({ "rollNumber": roll_number }),
                ));
            }
            let id = Uuid::new_v4().to_string();
            conn.execute(
                "INSERT INTO students(id, account_id, first_name, roll_number, track, phone_number)
                 VALUES(?, ?, ?, ?, ?, ?)",
                (&id, &account_id, &name, &roll_number, &track, &reg.phone_number),
            )?;
            student_id = Some(id);
        }
    }

    audit.info(
        "account registered",
        json!({ "accountId": account_id, "role": role.as_str() }),
    );

    Ok(RegisteredAccount {
        account_id,
        role,
        teacher_id,
        student_id,
    })
}

pub fn student_id_for_account(conn: &Connection, account_id: &str) -> Result<String, DomainError> {
    crate::authz::resolve_student_profile_id(conn, account_id)?
        .ok_or_else(|| DomainError::not_found("student", account_id))
}

fn ensure_teachers_exist(conn: &Connection, teacher_ids: &[String]) -> Result<(), DomainError> {
    for teacher_id in teacher_ids {
        let found: Option<i64> = conn
            .query_row("SELECT 1 FROM teachers WHERE id = ?", [teacher_id], |r| {
                r.get(0)
            })
            .optional()?;
        if found.is_none() {
            return Err(DomainError::not_found("teacher", teacher_id.as_str()));
        }
    }
    Ok(())
}

fn replace_assignments(
    conn: &Connection,
    subject_id: &str,
    teacher_ids: &[String],
) -> Result<(), DomainError> {
    conn.execute(
        "DELETE FROM teacher_subjects WHERE subject_id = ?",
        [subject_id],
    )?;
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO teacher_subjects(teacher_id, subject_id) VALUES(?, ?)",
    )?;
    for teacher_id in teacher_ids {
        stmt.execute((teacher_id, subject_id))?;
    }
    Ok(())
}

fn subject_name_taken(
    conn: &Connection,
    name: &str,
    track: &str,
    except_id: Option<&str>,
) -> Result<bool, DomainError> {
    let other: Option<String> = conn
        .query_row(
            "SELECT id FROM subjects WHERE name = ? AND track = ?",
            (name, track),
            |r| r.get(0),
        )
        .optional()?;
    Ok(match (other, except_id) {
        (Some(id), Some(except)) => id != except,
        (Some(_), None) => true,
        (None, _) => false,
    })
}

/// Callers run this inside a unit of work.
pub fn create_subject(
    conn: &Connection,
    audit: &dyn Audit,
    name: &str,
    track: &str,
    teacher_ids: &[String],
) -> Result<SubjectSummary, DomainError> {
    let name = required_text("name", name)?;
    let track = required_text("track", track)?;
    if subject_name_taken(conn, &name, &track, None)? {
        return Err(DomainError::conflict(
            "subject",
            json!({ "name": name, "track": track }),
        ));
    }
    ensure_teachers_exist(conn, teacher_ids)?;

    let subject_id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO subjects(id, name, track) VALUES(?, ?, ?)",
        (&subject_id, &name, &track),
    )?;
    replace_assignments(conn, &subject_id, teacher_ids)?;

    audit.info(
        "subject created",
        json!({ "subjectId": subject_id, "track": track, "teacherCount": teacher_ids.len() }),
    );
    get_subject(conn, &subject_id)
}

/// Replaces name, track and the whole teacher assignment set. Callers run
/// this inside a unit of work.
pub fn update_subject(
    conn: &Connection,
    audit: &dyn Audit,
    subject_id: &str,
    name: &str,
    track: &str,
    teacher_ids: &[String],
) -> Result<SubjectSummary, DomainError> {
    let name = required_text("name", name)?;
    let track = required_text("track", track)?;
    if !crate::results::subject_exists(conn, subject_id)? {
        return Err(DomainError::not_found("subject", subject_id));
    }
    if subject_name_taken(conn, &name, &track, Some(subject_id))? {
        return Err(DomainError::conflict(
            "subject",
            json!({ "name": name, "track": track }),
        ));
    }
    ensure_teachers_exist(conn, teacher_ids)?;

    conn.execute(
        "UPDATE subjects SET name = ?, track = ? WHERE id = ?",
        (&name, &track, subject_id),
    )?;
    replace_assignments(conn, subject_id, teacher_ids)?;

    audit.info(
        "subject updated",
        json!({ "subjectId": subject_id, "teacherCount": teacher_ids.len() }),
    );
    get_subject(conn, subject_id)
}

fn get_subject(conn: &Connection, subject_id: &str) -> Result<SubjectSummary, DomainError> {
    let row: Option<(String, String)> = conn
        .query_row(
            "SELECT name, track FROM subjects WHERE id = ?",
            [subject_id],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .optional()?;
    let Some((name, track)) = row else {
        return Err(DomainError::not_found("subject", subject_id));
    };
    let mut stmt = conn.prepare(
        "SELECT teacher_id FROM teacher_subjects WHERE subject_id = ? ORDER BY teacher_id",
    )?;
    let teacher_ids = stmt
        .query_map([subject_id], |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(SubjectSummary {
        id: subject_id.to_string(),
        name,
        track,
        teacher_ids,
    })
}

fn assignments_by_subject(conn: &Connection) -> Result<BTreeMap<String, Vec<String>>, DomainError> {
    let mut stmt = conn.prepare(
        "SELECT subject_id, teacher_id FROM teacher_subjects ORDER BY subject_id, teacher_id",
    )?;
    let pairs = stmt
        .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    let mut map: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (subject_id, teacher_id) in pairs {
        map.entry(subject_id).or_default().push(teacher_id);
    }
    Ok(map)
}

pub fn list_subjects(conn: &Connection) -> Result<Vec<SubjectSummary>, DomainError> {
    let mut assignments = assignments_by_subject(conn)?;
    let mut stmt = conn.prepare("SELECT id, name, track FROM subjects ORDER BY track, name")?;
    let rows = stmt
        .query_map([], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows
        .into_iter()
        .map(|(id, name, track)| SubjectSummary {
            teacher_ids: assignments.remove(&id).unwrap_or_default(),
            id,
            name,
            track,
        })
        .collect())
}

pub fn list_tracks(conn: &Connection) -> Result<Vec<String>, DomainError> {
    let mut stmt = conn.prepare("SELECT DISTINCT track FROM subjects ORDER BY track")?;
    let tracks = stmt
        .query_map([], |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tracks)
}

pub fn subjects_for_teacher(
    conn: &Connection,
    teacher_id: &str,
) -> Result<Vec<SubjectSummary>, DomainError> {
    let mut assignments = assignments_by_subject(conn)?;
    let mut stmt = conn.prepare(
        "SELECT s.id, s.name, s.track
         FROM subjects s
         JOIN teacher_subjects ts ON ts.subject_id = s.id
         WHERE ts.teacher_id = ?
         ORDER BY s.track, s.name",
    )?;
    let rows = stmt
        .query_map([teacher_id], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, String>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows
        .into_iter()
        .map(|(id, name, track)| SubjectSummary {
            teacher_ids: assignments.remove(&id).unwrap_or_default(),
            id,
            name,
            track,
        })
        .collect())
}

pub fn list_teachers(conn: &Connection) -> Result<Vec<TeacherSummary>, DomainError> {
    let mut stmt = conn.prepare(
        "SELECT teacher_id, subject_id FROM teacher_subjects ORDER BY teacher_id, subject_id",
    )?;
    let pairs = stmt
        .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    let mut subjects_by_teacher: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (teacher_id, subject_id) in pairs {
        subjects_by_teacher.entry(teacher_id).or_default().push(subject_id);
    }

    let mut stmt = conn.prepare(
        "SELECT t.id, t.account_id, t.first_name, t.last_name, a.email, t.phone_number
         FROM teachers t
         JOIN accounts a ON a.id = t.account_id
         ORDER BY t.last_name, t.first_name, t.id",
    )?;
    let rows = stmt
        .query_map([], map_teacher)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows
        .into_iter()
        .map(|mut teacher| {
            teacher.subject_ids = subjects_by_teacher.remove(&teacher.id).unwrap_or_default();
            teacher
        })
        .collect())
}

fn map_teacher(r: &rusqlite::Row<'_>) -> rusqlite::Result<TeacherSummary> {
    Ok(TeacherSummary {
        id: r.get(0)?,
        account_id: r.get(1)?,
        first_name: r.get(2)?,
        last_name: r.get(3)?,
        email: r.get(4)?,
        phone_number: r.get(5)?,
        subject_ids: Vec::new(),
    })
}

fn get_teacher(conn: &Connection, teacher_id: &str) -> Result<TeacherSummary, DomainError> {
    let teacher = conn
        .query_row(
            "SELECT t.id, t.account_id, t.first_name, t.last_name, a.email, t.phone_number
             FROM teachers t
             JOIN accounts a ON a.id = t.account_id
             WHERE t.id = ?",
            [teacher_id],
            map_teacher,
        )
        .optional()?;
    let Some(mut teacher) = teacher else {
        return Err(DomainError::not_found("teacher", teacher_id));
    };
    let mut stmt = conn.prepare(
        "SELECT subject_id FROM teacher_subjects WHERE teacher_id = ? ORDER BY subject_id",
    )?;
    teacher.subject_ids = stmt
        .query_map([teacher_id], |r| r.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(teacher)
}

fn ensure_subjects_exist(conn: &Connection, subject_ids: &[String]) -> Result<(), DomainError> {
    for subject_id in subject_ids {
        if !crate::results::subject_exists(conn, subject_id)? {
            return Err(DomainError::not_found("subject", subject_id.as_str()));
        }
    }
    Ok(())
}

fn replace_teacher_assignments(
    conn: &Connection,
    teacher_id: &str,
    subject_ids: &[String],
) -> Result<(), DomainError> {
    conn.execute(
        "DELETE FROM teacher_subjects WHERE teacher_id = ?",
        [teacher_id],
    )?;
    let mut stmt = conn.prepare(
        "INSERT OR IGNORE INTO teacher_subjects(teacher_id, subject_id) VALUES(?, ?)",
    )?;
    for subject_id in subject_ids {
        stmt.execute((teacher_id, subject_id))?;
    }
    Ok(())
}

/// Provisions a teacher account together with its profile and subject
/// assignments. Callers run this inside a unit of work.
pub fn create_teacher(
    conn: &Connection,
    audit: &dyn Audit,
    teacher: &NewTeacher<'_>,
) -> Result<TeacherSummary, DomainError> {
    let email = required_text("email", teacher.email)?.to_ascii_lowercase();
    let first_name = required_text("firstName", teacher.first_name)?;
    let last_name = required_text("lastName", teacher.last_name)?;
    ensure_email_free(conn, &email)?;
    ensure_subjects_exist(conn, teacher.subject_ids)?;

    let account_id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO accounts(id, email, name, role, created_at) VALUES(?, ?, ?, ?, ?)",
        (
            &account_id,
            &email,
            format!("{first_name} {last_name}"),
            Role::Teacher.as_str(),
            now_timestamp(),
        ),
    )?;
    let teacher_id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO teachers(id, account_id, first_name, last_name, phone_number)
         VALUES(?, ?, ?, ?, ?)",
        (&teacher_id, &account_id, &first_name, &last_name, teacher.phone_number),
    )?;
    replace_teacher_assignments(conn, &teacher_id, teacher.subject_ids)?;

    audit.info(
        "teacher created",
        json!({
            "teacherId": teacher_id,
            "accountId": account_id,
            "subjectCount": teacher.subject_ids.len(),
        }),
    );
    get_teacher(conn, &teacher_id)
}

/// Callers run this inside a unit of work.
pub fn update_teacher(
    conn: &Connection,
    audit: &dyn Audit,
    teacher_id: &str,
    changes: &TeacherChanges<'_>,
) -> Result<TeacherSummary, DomainError> {
    if changes.first_name.is_none()
        && changes.last_name.is_none()
        && changes.phone_number.is_none()
        && changes.subject_ids.is_none()
    {
        return Err(DomainError::invalid("params", "nothing to update"));
    }
    let current = get_teacher(conn, teacher_id)?;
    let first_name = match changes.first_name {
        Some(v) => required_text("firstName", v)?,
        None => current.first_name,
    };
    let last_name = match changes.last_name {
        Some(v) => required_text("lastName", v)?,
        None => current.last_name,
    };
    let phone_number = changes
        .phone_number
        .map(str::to_string)
        .or(current.phone_number);
    if let Some(subject_ids) = changes.subject_ids {
        ensure_subjects_exist(conn, subject_ids)?;
    }

    conn.execute(
        "UPDATE teachers SET first_name = ?, last_name = ?, phone_number = ? WHERE id = ?",
        (&first_name, &last_name, &phone_number, teacher_id),
    )?;
    conn.execute(
        "UPDATE accounts SET name = ? WHERE id = ?",
        (format!("{first_name} {last_name}"), &current.account_id),
    )?;
    if let Some(subject_ids) = changes.subject_ids {
        replace_teacher_assignments(conn, teacher_id, subject_ids)?;
    }

    audit.info(
        "teacher updated",
        json!({
            "teacherId": teacher_id,
            "assignmentsReplaced": changes.subject_ids.is_some(),
        }),
    );
    get_teacher(conn, teacher_id)
}

/// Removes the teacher's assignments, timetable entries, profile and
/// account. Recorded exam results keep their provenance. Callers run this
/// inside a unit of work.
pub fn delete_teacher(
    conn: &Connection,
    audit: &dyn Audit,
    teacher_id: &str,
) -> Result<RemovedTeacher, DomainError> {
    let account_id: Option<String> = conn
        .query_row(
            "SELECT account_id FROM teachers WHERE id = ?",
            [teacher_id],
            |r| r.get(0),
        )
        .optional()?;
    let Some(account_id) = account_id else {
        return Err(DomainError::not_found("teacher", teacher_id));
    };

    let removed_assignments = conn.execute(
        "DELETE FROM teacher_subjects WHERE teacher_id = ?",
        [teacher_id],
    )?;
    let removed_schedule_entries =
        conn.execute("DELETE FROM schedule WHERE teacher_id = ?", [teacher_id])?;
    conn.execute("DELETE FROM teachers WHERE id = ?", [teacher_id])?;
    conn.execute("DELETE FROM accounts WHERE id = ?", [&account_id])?;

    audit.info(
        "teacher deleted",
        json!({
            "teacherId": teacher_id,
            "accountId": account_id,
            "removedAssignments": removed_assignments,
            "removedScheduleEntries": removed_schedule_entries,
        }),
    );
    Ok(RemovedTeacher {
        teacher_id: teacher_id.to_string(),
        account_id,
        removed_assignments,
        removed_schedule_entries,
    })
}

/// Refuses while the subject is still on the timetable or has recorded
/// exam results. Callers run this inside a unit of work.
pub fn delete_subject(
    conn: &Connection,
    audit: &dyn Audit,
    subject_id: &str,
) -> Result<(), DomainError> {
    if !crate::results::subject_exists(conn, subject_id)? {
        return Err(DomainError::not_found("subject", subject_id));
    }
    let (schedule_entries, exam_results): (i64, i64) = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM schedule WHERE subject_id = ?1),
                (SELECT COUNT(*) FROM exam_results WHERE subject_id = ?1)",
        [subject_id],
        |r| Ok((r.get(0)?, r.get(1)?)),
    )?;
    if schedule_entries > 0 || exam_results > 0 {
        return Err(DomainError::conflict(
            "subject usage",
            json!({
                "subjectId": subject_id,
                "scheduleEntries": schedule_entries,
                "examResults": exam_results,
            }),
        ));
    }

    let removed_assignments = conn.execute(
        "DELETE FROM teacher_subjects WHERE subject_id = ?",
        [subject_id],
    )?;
    conn.execute("DELETE FROM subjects WHERE id = ?", [subject_id])?;
    audit.info(
        "subject deleted",
        json!({ "subjectId": subject_id, "removedAssignments": removed_assignments }),
    );
    Ok(())
}

pub fn account_profile(conn: &Connection, account_id: &str) -> Result<AccountProfile, DomainError> {
    let row: Option<(String, String, String)> = conn
        .query_row(
            "SELECT email, name, role FROM accounts WHERE id = ?",
            [account_id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;
    let Some((email, name, role)) = row else {
        return Err(DomainError::not_found("account", account_id));
    };
    let role = Role::parse(&role).ok_or_else(|| {
        DomainError::Storage(rusqlite::Error::InvalidColumnType(
            2,
            "role".to_string(),
            rusqlite::types::Type::Text,
        ))
    })?;

    let mut profile = AccountProfile {
        account_id: account_id.to_string(),
        email,
        name,
        role,
        teacher: None,
        student: None,
    };
    match role {
        Role::Admin => {}
        Role::Teacher => {
            if let Some(teacher_id) = crate::authz::resolve_teacher_profile_id(conn, account_id)? {
                profile.teacher = Some(get_teacher(conn, &teacher_id)?);
            }
        }
        Role::Student => {
            profile.student = conn
                .query_row(
                    "SELECT id, first_name, roll_number, track, phone_number
                     FROM students WHERE account_id = ?",
                    [account_id],
                    |r| {
                        Ok(StudentProfile {
                            id: r.get(0)?,
                            first_name: r.get(1)?,
                            roll_number: r.get(2)?,
                            track: r.get(3)?,
                            phone_number: r.get(4)?,
                        })
                    },
                )
                .optional()?;
        }
    }
    Ok(profile)
}
