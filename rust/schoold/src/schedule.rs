//! Weekly timetable. A teacher or a room can only be booked once at any
//! moment of a given day.

use chrono::{NaiveTime, Weekday};
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use serde_json::json;
use uuid::Uuid;

use crate::audit::Audit;
use crate::error::DomainError;
use crate::results::subject_exists;

const DAY_NAMES: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

#[derive(Debug, Clone)]
pub struct ScheduleInput<'a> {
    pub teacher_id: &'a str,
    pub subject_id: &'a str,
    pub class_name: &'a str,
    pub day_of_week: &'a str,
    pub start_time: &'a str,
    pub end_time: &'a str,
    pub room_number: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleEntry {
    pub id: String,
    pub teacher_id: String,
    pub teacher_name: String,
    pub subject_id: String,
    pub subject_name: String,
    pub class_name: String,
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    pub room_number: String,
}

/// Validated form of a `ScheduleInput`.
#[derive(Debug)]
struct Slot {
    class_name: String,
    day: i64,
    start: String,
    end: String,
    room: String,
}

fn parse_day(raw: &str) -> Result<i64, DomainError> {
    raw.trim()
        .parse::<Weekday>()
        .map(|d| i64::from(d.number_from_monday()))
        .map_err(|_| DomainError::invalid("dayOfWeek", "must be a weekday name"))
}

/// Accepts "HH:MM" or "HH:MM:SS" and keeps minute precision.
fn parse_time(field: &str, raw: &str) -> Result<String, DomainError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map(|t| t.format("%H:%M").to_string())
        .map_err(|_| DomainError::invalid(field, "must be a time of day (HH:MM)"))
}

fn validate(input: &ScheduleInput<'_>) -> Result<Slot, DomainError> {
    let class_name = input.class_name.trim();
    if class_name.is_empty() {
        return Err(DomainError::invalid("className", "must not be empty"));
    }
    let room = input.room_number.trim();
    if room.is_empty() {
        return Err(DomainError::invalid("roomNumber", "must not be empty"));
    }
    let day = parse_day(input.day_of_week)?;
    let start = parse_time("startTime", input.start_time)?;
    let end = parse_time("endTime", input.end_time)?;
    if end <= start {
        return Err(DomainError::invalid("endTime", "must be after startTime"));
    }
    Ok(Slot {
        class_name: class_name.to_string(),
        day,
        start,
        end,
        room: room.to_string(),
    })
}

fn teacher_exists(conn: &Connection, teacher_id: &str) -> rusqlite::Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM teachers WHERE id = ?", [teacher_id], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

fn entry_exists(conn: &Connection, entry_id: &str) -> rusqlite::Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM schedule WHERE id = ?", [entry_id], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

/// Entries on the same day that book the same teacher or room for an
/// overlapping interval. Back-to-back slots do not overlap.
fn find_conflicts(
    conn: &Connection,
    teacher_id: &str,
    slot: &Slot,
    except_id: Option<&str>,
) -> rusqlite::Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT id FROM schedule
         WHERE day_of_week = ?1
           AND (teacher_id = ?2 OR room_number = ?3)
           AND start_time < ?5 AND end_time > ?4
           AND id != ?6
         ORDER BY start_time, id",
    )?;
    let ids = stmt
        .query_map(
            (
                slot.day,
                teacher_id,
                &slot.room,
                &slot.start,
                &slot.end,
                except_id.unwrap_or(""),
            ),
            |r| r.get::<_, String>(0),
        )?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}

fn check_slot(
    conn: &Connection,
    audit: &dyn Audit,
    input: &ScheduleInput<'_>,
    except_id: Option<&str>,
) -> Result<Slot, DomainError> {
    let slot = validate(input)?;
    if !teacher_exists(conn, input.teacher_id)? {
        return Err(DomainError::not_found("teacher", input.teacher_id));
    }
    if !subject_exists(conn, input.subject_id)? {
        return Err(DomainError::not_found("subject", input.subject_id));
    }
    let conflicts = find_conflicts(conn, input.teacher_id, &slot, except_id)?;
    if !conflicts.is_empty() {
        audit.warning(
            "schedule conflict",
            json!({
                "teacherId": input.teacher_id,
                "roomNumber": slot.room,
                "conflictingIds": conflicts,
            }),
        );
        return Err(DomainError::conflict(
            "schedule entry",
            json!({ "conflictingIds": conflicts }),
        ));
    }
    Ok(slot)
}

/// Callers run this inside a unit of work.
pub fn create_entry(
    conn: &Connection,
    audit: &dyn Audit,
    input: &ScheduleInput<'_>,
) -> Result<ScheduleEntry, DomainError> {
    let slot = check_slot(conn, audit, input, None)?;
    let entry_id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO schedule(
           id, teacher_id, subject_id, class_name, day_of_week, start_time, end_time, room_number)
         VALUES(?, ?, ?, ?, ?, ?, ?, ?)",
        (
            &entry_id,
            input.teacher_id,
            input.subject_id,
            &slot.class_name,
            slot.day,
            &slot.start,
            &slot.end,
            &slot.room,
        ),
    )?;
    audit.info(
        "schedule entry created",
        json!({ "entryId": entry_id, "className": slot.class_name }),
    );
    get_entry(conn, &entry_id)
}

/// Replaces every field of an entry. Callers run this inside a unit of work.
pub fn update_entry(
    conn: &Connection,
    audit: &dyn Audit,
    entry_id: &str,
    input: &ScheduleInput<'_>,
) -> Result<ScheduleEntry, DomainError> {
    if !entry_exists(conn, entry_id)? {
        return Err(DomainError::not_found("schedule entry", entry_id));
    }
    let slot = check_slot(conn, audit, input, Some(entry_id))?;
    conn.execute(
        "UPDATE schedule
         SET teacher_id = ?, subject_id = ?, class_name = ?, day_of_week = ?,
             start_time = ?, end_time = ?, room_number = ?
         WHERE id = ?",
        (
            input.teacher_id,
            input.subject_id,
            &slot.class_name,
            slot.day,
            &slot.start,
            &slot.end,
            &slot.room,
            entry_id,
        ),
    )?;
    audit.info("schedule entry updated", json!({ "entryId": entry_id }));
    get_entry(conn, entry_id)
}

pub fn delete_entry(
    conn: &Connection,
    audit: &dyn Audit,
    entry_id: &str,
) -> Result<(), DomainError> {
    let removed = conn.execute("DELETE FROM schedule WHERE id = ?", [entry_id])?;
    if removed == 0 {
        return Err(DomainError::not_found("schedule entry", entry_id));
    }
    audit.info("schedule entry deleted", json!({ "entryId": entry_id }));
    Ok(())
}

const ENTRY_SELECT: &str = "SELECT e.id, e.teacher_id, TRIM(t.first_name || ' ' || t.last_name),
        e.subject_id, s.name, e.class_name, e.day_of_week, e.start_time, e.end_time,
        e.room_number
 FROM schedule e
 JOIN teachers t ON t.id = e.teacher_id
 JOIN subjects s ON s.id = e.subject_id";

const ENTRY_ORDER: &str = "ORDER BY e.day_of_week, e.start_time, e.class_name, e.id";

fn map_entry(r: &rusqlite::Row<'_>) -> rusqlite::Result<ScheduleEntry> {
    let day: i64 = r.get(6)?;
    let day_of_week = usize::try_from(day - 1)
        .ok()
        .and_then(|i| DAY_NAMES.get(i))
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(6, day))?;
    Ok(ScheduleEntry {
        id: r.get(0)?,
        teacher_id: r.get(1)?,
        teacher_name: r.get(2)?,
        subject_id: r.get(3)?,
        subject_name: r.get(4)?,
        class_name: r.get(5)?,
        day_of_week: day_of_week.to_string(),
        start_time: r.get(7)?,
        end_time: r.get(8)?,
        room_number: r.get(9)?,
    })
}

fn get_entry(conn: &Connection, entry_id: &str) -> Result<ScheduleEntry, DomainError> {
    let sql = format!("{ENTRY_SELECT} WHERE e.id = ?");
    conn.query_row(&sql, [entry_id], map_entry)
        .optional()?
        .ok_or_else(|| DomainError::not_found("schedule entry", entry_id))
}

pub fn list_entries(conn: &Connection) -> Result<Vec<ScheduleEntry>, DomainError> {
    let sql = format!("{ENTRY_SELECT} {ENTRY_ORDER}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([], map_entry)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn entries_for_class(
    conn: &Connection,
    class_name: &str,
) -> Result<Vec<ScheduleEntry>, DomainError> {
    let sql = format!("{ENTRY_SELECT} WHERE e.class_name = ? {ENTRY_ORDER}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([class_name.trim()], map_entry)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn entries_for_teacher(
    conn: &Connection,
    teacher_id: &str,
) -> Result<Vec<ScheduleEntry>, DomainError> {
    if !teacher_exists(conn, teacher_id)? {
        return Err(DomainError::not_found("teacher", teacher_id));
    }
    let sql = format!("{ENTRY_SELECT} WHERE e.teacher_id = ? {ENTRY_ORDER}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map([teacher_id], map_entry)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}
