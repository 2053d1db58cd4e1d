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


fn scores() -> serde_json::Value {
    json!({
        "coefficient": 1,
        "tpScore": 12,
        "continuousAssessmentScore": 12,
        "finalExamScore": 12
    })
}

#[test]
fn admin_manages_teachers_and_assignment_changes_revoke_grading() {
    let workspace = temp_dir("schoold-staff");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let (i, r) = (&mut stdin, &mut reader);

    call_ok(i, r, "1", "workspace.select", json!({ "path": workspace.to_string_lossy() }), None);
    let admin = str_field(
        &call_ok(
            i,
            r,
            "2",
            "accounts.register",
            json!({ "email": "admin@school.test", "name": "Admin", "role": "admin" }),
            None,
        ),
        "accountId",
    );
    let student = call_ok(
        i,
        r,
        "3",
        "accounts.register",
        json!({
            "email": "s@school.test",
            "name": "Sam",
            "role": "student",
            "rollNumber": "R1",
            "track": "T1"
        }),
        None,
    );
    let student_id = str_field(&student, "studentId");
    let maths_id = str_field(
        &call_ok(i, r, "4", "subjects.create", json!({ "name": "Maths", "track": "T1" }), Some(&admin))["subject"],
        "id",
    );
    let art_id = str_field(
        &call_ok(i, r, "5", "subjects.create", json!({ "name": "Art", "track": "T1" }), Some(&admin))["subject"],
        "id",
    );

    let created = call_ok(
        i,
        r,
        "6",
        "teachers.create",
        json!({
            "email": "grace@school.test",
            "firstName": "Grace",
            "lastName": "Hopper",
            "subjectIds": [maths_id, art_id]
        }),
        Some(&admin),
    );
    let teacher_id = str_field(&created["teacher"], "id");
    let teacher_account = str_field(&created["teacher"], "accountId");

    let code = call_err(
        i,
        r,
        "7",
        "teachers.create",
        json!({ "email": "x@school.test", "firstName": "X", "lastName": "Y" }),
        Some(&teacher_account),
    );
    assert_eq!(code, "forbidden");

    let me = call_ok(i, r, "8", "accounts.me", json!({}), Some(&teacher_account));
    assert_eq!(me["role"], json!("teacher"));
    assert_eq!(me["name"], json!("Grace Hopper"));
    assert_eq!(me["teacher"]["subjectIds"].as_array().map(Vec::len), Some(2));
    assert!(me.get("student").is_none());

    call_ok(
        i,
        r,
        "9",
        "results.save",
        json!({ "studentId": student_id, "subjectId": maths_id, "results": scores() }),
        Some(&teacher_account),
    );

    let code = call_err(i, r, "10", "teachers.update", json!({ "teacherId": teacher_id }), Some(&admin));
    assert_eq!(code, "bad_params");

    // Dropping Maths from the assignment set revokes grading rights there.
    let updated = call_ok(
        i,
        r,
        "11",
        "teachers.update",
        json!({ "teacherId": teacher_id, "phoneNumber": "555-0100", "subjectIds": [art_id] }),
        Some(&admin),
    );
    assert_eq!(updated["teacher"]["subjectIds"], json!([art_id]));
    assert_eq!(updated["teacher"]["phoneNumber"], json!("555-0100"));
    assert_eq!(updated["teacher"]["firstName"], json!("Grace"));
    let code = call_err(
        i,
        r,
        "12",
        "results.save",
        json!({ "studentId": student_id, "subjectId": maths_id, "results": scores() }),
        Some(&teacher_account),
    );
    assert_eq!(code, "forbidden");

    // A graded subject stays; an ungraded one goes and takes its assignments along.
    let code = call_err(i, r, "13", "subjects.delete", json!({ "subjectId": maths_id }), Some(&admin));
    assert_eq!(code, "conflict");
    let code = call_err(i, r, "14", "subjects.delete", json!({ "subjectId": art_id }), Some(&teacher_account));
    assert_eq!(code, "forbidden");
    call_ok(i, r, "15", "subjects.delete", json!({ "subjectId": art_id }), Some(&admin));
    let me = call_ok(i, r, "16", "accounts.me", json!({}), Some(&teacher_account));
    assert_eq!(me["teacher"]["subjectIds"], json!([]));
    let code = call_err(
        i,
        r,
        "17",
        "results.save",
        json!({ "studentId": student_id, "subjectId": art_id, "results": scores() }),
        Some(&teacher_account),
    );
    assert_eq!(code, "forbidden");

    // Deleting the teacher removes the account; recorded grades keep their provenance.
    call_ok(i, r, "18", "teachers.delete", json!({ "teacherId": teacher_id }), Some(&admin));
    let code = call_err(i, r, "19", "accounts.me", json!({}), Some(&teacher_account));
    assert_eq!(code, "unauthenticated");
    let teachers = call_ok(i, r, "20", "teachers.list", json!({}), Some(&admin));
    assert!(teachers["teachers"].as_array().expect("teachers").is_empty());

    let results = call_ok(
        i,
        r,
        "21",
        "results.byStudent",
        json!({ "studentId": student_id }),
        Some(&admin),
    );
    let rows = results["results"].as_array().expect("results");
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["recordedBy"], json!(teacher_account));
    assert!(rows[0]["recordedByName"].is_null());

    let code = call_err(i, r, "22", "teachers.delete", json!({ "teacherId": teacher_id }), Some(&admin));
    assert_eq!(code, "not_found");
}
