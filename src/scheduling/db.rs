//! Database queries for events, invitees and responses
use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{OptionalExtension, Row};
use serde::Serialize;
use tokio_rusqlite::{Connection, params};

use super::models::{
    Event, EventStatus, INSTANT_FORMAT, Invitee, InviteeStatus, Response, format_instant,
};
use crate::core::PlannerError;

fn instant_at(row: &Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, INSTANT_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn optional_instant_at(row: &Row, idx: usize) -> rusqlite::Result<Option<NaiveDateTime>> {
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| {
        NaiveDateTime::parse_from_str(&raw, INSTANT_FORMAT)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn parsed_at<T: std::str::FromStr>(row: &Row, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("Unexpected value in column {}: {}", idx, raw).into(),
        )
    })
}

const EVENT_COLUMNS: &str =
    "id, organizer_id, title, start_datetime, end_datetime, status, created_at";

fn event_from_row(row: &Row) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        organizer_id: row.get(1)?,
        title: row.get(2)?,
        start: instant_at(row, 3)?,
        end: instant_at(row, 4)?,
        status: parsed_at::<EventStatus>(row, 5)?,
        created_at: instant_at(row, 6)?,
    })
}

const INVITEE_COLUMNS: &str = "id, event_id, email, token, status, responded_at";

fn invitee_from_row(row: &Row) -> rusqlite::Result<Invitee> {
    Ok(Invitee {
        id: row.get(0)?,
        event_id: row.get(1)?,
        email: row.get(2)?,
        token: row.get(3)?,
        status: parsed_at::<InviteeStatus>(row, 4)?,
        responded_at: optional_instant_at(row, 5)?,
    })
}

pub async fn find_event(db: &Connection, event_id: i64) -> Result<Option<Event>, PlannerError> {
    let event = db
        .call(move |conn| {
            let sql = format!("SELECT {} FROM events WHERE id = ?1", EVENT_COLUMNS);
            let event = conn
                .query_row(&sql, [event_id], event_from_row)
                .optional()?;
            Ok(event)
        })
        .await?;
    Ok(event)
}

pub async fn find_invitee_by_token(
    db: &Connection,
    token: String,
) -> Result<Option<Invitee>, PlannerError> {
    let invitee = db
        .call(move |conn| {
            let sql = format!("SELECT {} FROM invitees WHERE token = ?1", INVITEE_COLUMNS);
            let invitee = conn
                .query_row(&sql, [token], invitee_from_row)
                .optional()?;
            Ok(invitee)
        })
        .await?;
    Ok(invitee)
}

pub async fn list_invitees(db: &Connection, event_id: i64) -> Result<Vec<Invitee>, PlannerError> {
    let invitees = db
        .call(move |conn| {
            let sql = format!(
                "SELECT {} FROM invitees WHERE event_id = ?1 ORDER BY id",
                INVITEE_COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([event_id], invitee_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await?;
    Ok(invitees)
}

pub async fn count_invitees(db: &Connection, event_id: i64) -> Result<usize, PlannerError> {
    let count: i64 = db
        .call(move |conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM invitees WHERE event_id = ?1",
                [event_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
        .await?;
    Ok(count as usize)
}

/// Every slot held by an invitee whose status is `attending`
pub async fn attending_slots(
    db: &Connection,
    event_id: i64,
) -> Result<Vec<NaiveDateTime>, PlannerError> {
    let slots = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r"
                SELECT r.available_slot
                  FROM responses r
                  JOIN invitees i ON r.invitee_id = i.id
                 WHERE i.event_id = ?1 AND i.status = 'attending'
                 ORDER BY r.available_slot
                ",
            )?;
            let rows = stmt
                .query_map([event_id], |row| instant_at(row, 0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await?;
    Ok(slots)
}

pub async fn list_responses(
    db: &Connection,
    invitee_id: i64,
) -> Result<Vec<Response>, PlannerError> {
    let responses = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, invitee_id, available_slot FROM responses WHERE invitee_id = ?1 ORDER BY available_slot",
            )?;
            let rows = stmt
                .query_map([invitee_id], |row| {
                    Ok(Response {
                        id: row.get(0)?,
                        invitee_id: row.get(1)?,
                        available_slot: instant_at(row, 2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await?;
    Ok(responses)
}

pub async fn attending_emails(db: &Connection, event_id: i64) -> Result<Vec<String>, PlannerError> {
    let emails = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT email FROM invitees WHERE event_id = ?1 AND status = 'attending' ORDER BY id",
            )?;
            let rows = stmt
                .query_map([event_id], |row| row.get(0))?
                .collect::<Result<Vec<String>, _>>()?;
            Ok(rows)
        })
        .await?;
    Ok(emails)
}

pub struct NewEvent {
    pub organizer_id: i64,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

/// Insert the event and all of its invitees in one transaction. Each
/// entry of `invitees` is an `(email, token)` pair.
pub async fn insert_event_with_invitees(
    db: &Connection,
    event: NewEvent,
    invitees: Vec<(String, String)>,
) -> Result<(Event, Vec<Invitee>), PlannerError> {
    let created = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO events(organizer_id, title, start_datetime, end_datetime, status, created_at) VALUES (?1, ?2, ?3, ?4, 'pending', ?5)",
                params![
                    event.organizer_id,
                    event.title,
                    format_instant(&event.start),
                    format_instant(&event.end),
                    format_instant(&event.created_at),
                ],
            )?;
            let event_id = tx.last_insert_rowid();

            let mut rows = Vec::with_capacity(invitees.len());
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO invitees(event_id, email, token, status) VALUES (?1, ?2, ?3, 'pending')",
                )?;
                for (email, token) in invitees {
                    stmt.execute(params![event_id, email, token])?;
                    rows.push(Invitee {
                        id: tx.last_insert_rowid(),
                        event_id,
                        email,
                        token,
                        status: InviteeStatus::Pending,
                        responded_at: None,
                    });
                }
            }
            tx.commit()?;

            Ok((
                Event {
                    id: event_id,
                    organizer_id: event.organizer_id,
                    title: event.title,
                    start: event.start,
                    end: event.end,
                    status: EventStatus::Pending,
                    created_at: event.created_at,
                },
                rows,
            ))
        })
        .await?;
    Ok(created)
}

/// Mark the invitee attending and replace every stored response with
/// `slots`. Declined invitees are left untouched; returns whether the
/// invitee was updated. Runs as one transaction so a failure part way
/// through leaves the previous selection intact.
pub async fn replace_responses(
    db: &Connection,
    invitee_id: i64,
    slots: Vec<NaiveDateTime>,
    responded_at: NaiveDateTime,
) -> Result<bool, PlannerError> {
    let replaced = db
        .call(move |conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                r"
                UPDATE invitees
                   SET status = 'attending', responded_at = ?1
                 WHERE id = ?2 AND status IN ('pending', 'attending')
                ",
                params![format_instant(&responded_at), invitee_id],
            )?;
            if changed == 0 {
                return Ok(false);
            }

            tx.execute("DELETE FROM responses WHERE invitee_id = ?1", [invitee_id])?;
            {
                let mut stmt = tx
                    .prepare("INSERT INTO responses(invitee_id, available_slot) VALUES (?1, ?2)")?;
                for slot in &slots {
                    stmt.execute(params![invitee_id, format_instant(slot)])?;
                }
            }
            tx.commit()?;
            Ok(true)
        })
        .await?;
    Ok(replaced)
}

/// Mark a pending invitee declined. Returns whether the invitee was
/// updated.
pub async fn decline_invitee(
    db: &Connection,
    invitee_id: i64,
    responded_at: NaiveDateTime,
) -> Result<bool, PlannerError> {
    let changed = db
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE invitees SET status = 'declined', responded_at = ?1 WHERE id = ?2 AND status = 'pending'",
                params![format_instant(&responded_at), invitee_id],
            )?;
            Ok(changed)
        })
        .await?;
    Ok(changed == 1)
}

/// Rewrite the event to the chosen slot and mark it confirmed. Only a
/// pending event is updated; returns whether a row changed.
pub async fn confirm_event(
    db: &Connection,
    event_id: i64,
    title: String,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Result<bool, PlannerError> {
    let changed = db
        .call(move |conn| {
            let changed = conn.execute(
                r"
                UPDATE events
                   SET title = ?1, start_datetime = ?2, end_datetime = ?3, status = 'confirmed'
                 WHERE id = ?4 AND status = 'pending'
                ",
                params![title, format_instant(&start), format_instant(&end), event_id],
            )?;
            Ok(changed)
        })
        .await?;
    Ok(changed == 1)
}

#[derive(Debug, Clone, Serialize)]
pub struct EventSummary {
    pub id: i64,
    pub title: String,
    pub status: EventStatus,
    pub created_at: NaiveDateTime,
    pub total: i64,
    pub attending: i64,
    pub pending: i64,
    pub declined: i64,
}

pub async fn list_event_summaries(
    db: &Connection,
    organizer_id: i64,
    status: Option<EventStatus>,
) -> Result<Vec<EventSummary>, PlannerError> {
    let status = status.map(|s| s.to_string());
    let summaries = db
        .call(move |conn| {
            let mut stmt = conn.prepare(
                r"
                SELECT e.id, e.title, e.status, e.created_at,
                       (SELECT COUNT(*) FROM invitees WHERE event_id = e.id),
                       (SELECT COUNT(*) FROM invitees WHERE event_id = e.id AND status = 'attending'),
                       (SELECT COUNT(*) FROM invitees WHERE event_id = e.id AND status = 'pending'),
                       (SELECT COUNT(*) FROM invitees WHERE event_id = e.id AND status = 'declined')
                  FROM events e
                 WHERE e.organizer_id = ?1 AND (?2 IS NULL OR e.status = ?2)
                 ORDER BY e.created_at DESC, e.id DESC
                ",
            )?;
            let rows = stmt
                .query_map(params![organizer_id, status], |row| {
                    Ok(EventSummary {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        status: parsed_at::<EventStatus>(row, 2)?,
                        created_at: instant_at(row, 3)?,
                        total: row.get(4)?,
                        attending: row.get(5)?,
                        pending: row.get(6)?,
                        declined: row.get(7)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
        .await?;
    Ok(summaries)
}
