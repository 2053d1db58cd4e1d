use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_schoold");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn schoold");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn call(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
    actor: Option<&str>,
) -> serde_json::Value {
    let mut payload = json!({
        "id": id,
        "method": method,
        "params": params,
    });
    if let Some(account_id) = actor {
        payload["actor"] = json!({ "accountId": account_id });
    }
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");

    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    assert!(!line.trim().is_empty(), "empty response for {}", method);
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    value
}

fn call_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
    actor: Option<&str>,
) -> serde_json::Value {
    let value = call(stdin, reader, id, method, params, actor);
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn call_err(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
    actor: Option<&str>,
) -> String {
    let value = call(stdin, reader, id, method, params, actor);
    assert_eq!(
        value.get("ok").and_then(|v| v.as_bool()),
        Some(false),
        "{} unexpectedly succeeded: {}",
        method,
        value
    );
    value
        .get("error")
        .and_then(|e| e.get("code"))
        .and_then(|c| c.as_str())
        .expect("error code")
        .to_string()
}

fn str_field(value: &serde_json::Value, key: &str) -> String {
    value
        .get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| panic!("missing {} in {}", key, value))
        .to_string()
}

struct School {
    admin_account: String,
    teacher_account: String,
    student_account: String,
    student_id: String,
    other_student_account: String,
    other_student_id: String,
    subject_id: String,
}

fn setup_school(i: &mut ChildStdin, r: &mut BufReader<ChildStdout>, workspace: &std::path::Path) -> School {
    call_ok(i, r, "s1", "workspace.select", json!({ "path": workspace.to_string_lossy() }), None);
    let admin = call_ok(
        i,
        r,
        "s2",
        "accounts.register",
        json!({ "email": "admin@school.test", "name": "Admin", "role": "admin" }),
        None,
    );
    let teacher = call_ok(
        i,
        r,
        "s3",
        "accounts.register",
        json!({ "email": "teacher.a@school.test", "name": "Teacher A", "role": "teacher" }),
        None,
    );
    let student = call_ok(
        i,
        r,
        "s4",
        "accounts.register",
        json!({
            "email": "student.b@school.test",
            "name": "Student B",
            "role": "student",
            "rollNumber": "R100",
            "track": "T1"
        }),
        None,
    );
    let other = call_ok(
        i,
        r,
        "s5",
        "accounts.register",
        json!({
            "email": "student.c@school.test",
            "name": "Student C",
            "role": "student",
            "rollNumber": "R200",
            "track": "T1"
        }),
        None,
    );
    let admin_account = str_field(&admin, "accountId");
    let subject = call_ok(
        i,
        r,
        "s6",
        "subjects.create",
        json!({ "name": "Subject S", "track": "T1", "teacherIds": [str_field(&teacher, "teacherId")] }),
        Some(&admin_account),
    );

    School {
        admin_account,
        teacher_account: str_field(&teacher, "accountId"),
        student_account: str_field(&student, "accountId"),
        student_id: str_field(&student, "studentId"),
        other_student_account: str_field(&other, "accountId"),
        other_student_id: str_field(&other, "studentId"),
        subject_id: str_field(&subject["subject"], "id"),
    }
}

fn scores() -> serde_json::Value {
    json!({
        "coefficient": 1,
        "tpScore": 11,
        "continuousAssessmentScore": 12,
        "finalExamScore": 13
    })
}

#[test]
fn teacher_sees_student_only_after_grading_them_in_a_shared_subject() {
    let workspace = temp_dir("schoold-access-e2e");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let (i, r) = (&mut stdin, &mut reader);
    let school = setup_school(i, r, &workspace);

    // Track access comes from the subject assignment alone.
    let track = call_ok(
        i,
        r,
        "1",
        "students.byTrack",
        json!({ "track": "T1" }),
        Some(&school.teacher_account),
    );
    let names: Vec<&str> = track["students"]
        .as_array()
        .expect("students")
        .iter()
        .filter_map(|s| s.get("name").and_then(|v| v.as_str()))
        .collect();
    assert_eq!(names, vec!["Student B", "Student C"]);

    // No exam result yet: result-scoped access is denied.
    let denied = call_err(
        i,
        r,
        "2",
        "results.byStudent",
        json!({ "studentId": school.student_id }),
        Some(&school.teacher_account),
    );
    assert_eq!(denied, "forbidden");

    call_ok(
        i,
        r,
        "3",
        "results.save",
        json!({ "studentId": school.student_id, "subjectId": school.subject_id, "results": scores() }),
        Some(&school.teacher_account),
    );

    let granted = call_ok(
        i,
        r,
        "4",
        "results.byStudent",
        json!({ "studentId": school.student_id }),
        Some(&school.teacher_account),
    );
    let rows = granted["results"].as_array().expect("results");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["subjectName"], json!("Subject S"));
    assert_eq!(rows[0]["recordedByName"], json!("Teacher A"));

    // The other student was never graded by this teacher.
    let still_denied = call_err(
        i,
        r,
        "5",
        "results.byStudent",
        json!({ "studentId": school.other_student_id }),
        Some(&school.teacher_account),
    );
    assert_eq!(still_denied, "forbidden");

    let other_track = call_err(
        i,
        r,
        "6",
        "students.byTrack",
        json!({ "track": "T2" }),
        Some(&school.teacher_account),
    );
    assert_eq!(other_track, "forbidden");
}

#[test]
fn students_read_only_their_own_results() {
    let workspace = temp_dir("schoold-access-student");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let (i, r) = (&mut stdin, &mut reader);
    let school = setup_school(i, r, &workspace);

    call_ok(
        i,
        r,
        "1",
        "results.save",
        json!({ "studentId": school.student_id, "subjectId": school.subject_id, "results": scores() }),
        Some(&school.admin_account),
    );

    let own = call_ok(
        i,
        r,
        "2",
        "results.byStudent",
        json!({ "studentId": school.student_id }),
        Some(&school.student_account),
    );
    assert_eq!(own["results"].as_array().expect("results").len(), 1);

    let cross = call_err(
        i,
        r,
        "3",
        "results.byStudent",
        json!({ "studentId": school.student_id }),
        Some(&school.other_student_account),
    );
    assert_eq!(cross, "forbidden");

    let by_subject = call_err(
        i,
        r,
        "4",
        "results.bySubject",
        json!({ "subjectId": school.subject_id }),
        Some(&school.student_account),
    );
    assert_eq!(by_subject, "forbidden");

    let write = call_err(
        i,
        r,
        "5",
        "results.save",
        json!({ "studentId": school.student_id, "subjectId": school.subject_id, "results": scores() }),
        Some(&school.student_account),
    );
    assert_eq!(write, "forbidden");

    let track = call_err(
        i,
        r,
        "6",
        "students.byTrack",
        json!({ "track": "T1" }),
        Some(&school.student_account),
    );
    assert_eq!(track, "forbidden");

    let lookup = call_ok(
        i,
        r,
        "7",
        "students.idForAccount",
        json!({ "accountId": school.student_account }),
        Some(&school.student_account),
    );
    assert_eq!(str_field(&lookup, "studentId"), school.student_id);
}

#[test]
fn subject_writes_are_admin_only_and_assignment_changes_move_access() {
    let workspace = temp_dir("schoold-access-subjects");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let (i, r) = (&mut stdin, &mut reader);
    let school = setup_school(i, r, &workspace);

    let by_teacher = call_err(
        i,
        r,
        "1",
        "subjects.create",
        json!({ "name": "Physics", "track": "T1" }),
        Some(&school.teacher_account),
    );
    assert_eq!(by_teacher, "forbidden");

    let duplicate = call_err(
        i,
        r,
        "2",
        "subjects.create",
        json!({ "name": "Subject S", "track": "T1" }),
        Some(&school.admin_account),
    );
    assert_eq!(duplicate, "conflict");

    // Unassign the teacher: subject results become unreachable for them.
    call_ok(
        i,
        r,
        "3",
        "subjects.update",
        json!({ "subjectId": school.subject_id, "name": "Subject S", "track": "T1", "teacherIds": [] }),
        Some(&school.admin_account),
    );
    let denied = call_err(
        i,
        r,
        "4",
        "results.bySubject",
        json!({ "subjectId": school.subject_id }),
        Some(&school.teacher_account),
    );
    assert_eq!(denied, "forbidden");

    let tracks = call_ok(i, r, "5", "subjects.tracks", json!({}), Some(&school.teacher_account));
    assert_eq!(tracks["tracks"], json!(["T1"]));

    let teachers = call_ok(i, r, "6", "teachers.list", json!({}), Some(&school.admin_account));
    let list = teachers["teachers"].as_array().expect("teachers");
    assert_eq!(list.len(), 1);
    assert!(list[0]["subjectIds"].as_array().expect("subjectIds").is_empty());
}
