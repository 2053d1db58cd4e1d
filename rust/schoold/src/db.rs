use rusqlite::{Connection, Transaction};
use std::path::Path;

use crate::config::Config;

pub fn open_db(workspace: &Path, config: &Config) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(&config.db_file);
    let conn = Connection::open(db_path)?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS accounts(
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            role TEXT NOT NULL CHECK(role IN ('admin', 'teacher', 'student')),
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS teachers(
            id TEXT PRIMARY KEY,
            account_id TEXT NOT NULL UNIQUE,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            phone_number TEXT,
            FOREIGN KEY(account_id) REFERENCES accounts(id)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            id TEXT PRIMARY KEY,
            account_id TEXT NOT NULL UNIQUE,
            first_name TEXT NOT NULL,
            roll_number TEXT NOT NULL UNIQUE,
            track TEXT NOT NULL,
            phone_number TEXT,
            results_revision INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(account_id) REFERENCES accounts(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_track ON students(track)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS subjects(
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            track TEXT NOT NULL,
            UNIQUE(name, track)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_subjects_track ON subjects(track)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS teacher_subjects(
            teacher_id TEXT NOT NULL,
            subject_id TEXT NOT NULL,
            PRIMARY KEY(teacher_id, subject_id),
            FOREIGN KEY(teacher_id) REFERENCES teachers(id),
            FOREIGN KEY(subject_id) REFERENCES subjects(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_teacher_subjects_subject ON teacher_subjects(subject_id)",
        [],
    )?;

    // One row per (student, subject); writes go through an upsert.
    // created_by is provenance only and outlives the account it names.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS exam_results(
            id TEXT PRIMARY KEY,
            student_id TEXT NOT NULL,
            subject_id TEXT NOT NULL,
            coefficient REAL NOT NULL,
            tp_score REAL NOT NULL,
            continuous_assessment_score REAL NOT NULL,
            final_exam_score REAL NOT NULL,
            retake_score REAL NOT NULL DEFAULT 0,
            final_score REAL NOT NULL,
            created_by TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            FOREIGN KEY(student_id) REFERENCES students(id),
            FOREIGN KEY(subject_id) REFERENCES subjects(id),
            UNIQUE(student_id, subject_id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_exam_results_subject ON exam_results(subject_id)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS final_results(
            student_id TEXT PRIMARY KEY,
            general_average REAL NOT NULL,
            decision TEXT NOT NULL CHECK(decision IN ('validated', 'not_validated')),
            total_coefficient REAL NOT NULL,
            source_revision INTEGER NOT NULL,
            computed_at TEXT NOT NULL,
            FOREIGN KEY(student_id) REFERENCES students(id)
        )",
        [],
    )?;

    // Times are zero-padded "HH:MM", so string comparison orders them.
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schedule(
            id TEXT PRIMARY KEY,
            teacher_id TEXT NOT NULL,
            subject_id TEXT NOT NULL,
            class_name TEXT NOT NULL,
            day_of_week INTEGER NOT NULL CHECK(day_of_week BETWEEN 1 AND 7),
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            room_number TEXT NOT NULL,
            FOREIGN KEY(teacher_id) REFERENCES teachers(id),
            FOREIGN KEY(subject_id) REFERENCES subjects(id)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_schedule_day ON schedule(day_of_week, start_time)",
        [],
    )?;

    Ok(())
}

/// Runs `f` inside a transaction that is committed when `f` succeeds and
/// rolled back otherwise. Dropping the transaction during a panic also
/// rolls back, so no exit path leaves it open.
pub fn with_unit_of_work<T, E, F>(conn: &Connection, f: F) -> Result<T, E>
where
    F: FnOnce(&Transaction<'_>) -> Result<T, E>,
    E: From<rusqlite::Error>,
{
    let tx = conn.unchecked_transaction()?;
    match f(&tx) {
        Ok(value) => {
            tx.commit()?;
            Ok(value)
        }
        Err(e) => {
            // The closure's error wins over a failed rollback.
            if let Err(rollback_err) = tx.rollback() {
                tracing::warn!(error = %rollback_err, "unit of work rollback failed");
            }
            Err(e)
        }
    }
}

pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Micros, true)
}

#[cfg(test)]
pub(crate) fn open_in_memory() -> Connection {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    init_schema(&conn).expect("init schema");
    conn
}
