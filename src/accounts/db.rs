//! Database queries for organizer accounts
use chrono::NaiveDateTime;
use rusqlite::OptionalExtension;
use rusqlite::types::Type;
use tokio_rusqlite::{Connection, params};

use super::User;
use crate::core::PlannerError;
use crate::scheduling::models::{INSTANT_FORMAT, format_instant};

pub async fn find_user_by_id(db: &Connection, id: i64) -> Result<Option<User>, PlannerError> {
    let user = db
        .call(move |conn| {
            let user = conn
                .query_row(
                    "SELECT id, email, is_confirmed, one_time_code, otp_expiry FROM users WHERE id = ?1",
                    [id],
                    user_from_row,
                )
                .optional()?;
            Ok(user)
        })
        .await?;
    Ok(user)
}

pub async fn find_user_by_email(
    db: &Connection,
    email: String,
) -> Result<Option<User>, PlannerError> {
    let user = db
        .call(move |conn| {
            let user = conn
                .query_row(
                    "SELECT id, email, is_confirmed, one_time_code, otp_expiry FROM users WHERE email = ?1",
                    [email],
                    user_from_row,
                )
                .optional()?;
            Ok(user)
        })
        .await?;
    Ok(user)
}

fn user_from_row(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let otp_expiry: Option<String> = row.get(4)?;
    let otp_expiry = otp_expiry
        .map(|raw| {
            NaiveDateTime::parse_from_str(&raw, INSTANT_FORMAT)
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))
        })
        .transpose()?;
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        is_confirmed: row.get(2)?,
        one_time_code: row.get(3)?,
        otp_expiry,
    })
}

/// Insert the user or refresh the pending code of an existing one.
/// Returns the user id.
pub async fn upsert_pending_user(
    db: &Connection,
    email: String,
    code: String,
    expiry: NaiveDateTime,
) -> Result<i64, PlannerError> {
    let id = db
        .call(move |conn| {
            let id = conn.query_row(
                r"
                INSERT INTO users(email, is_confirmed, one_time_code, otp_expiry)
                VALUES (?1, 0, ?2, ?3)
                ON CONFLICT(email) DO UPDATE SET one_time_code = excluded.one_time_code,
                                                 otp_expiry = excluded.otp_expiry
                RETURNING id
                ",
                params![email, code, format_instant(&expiry)],
                |row| row.get(0),
            )?;
            Ok(id)
        })
        .await?;
    Ok(id)
}

pub async fn mark_confirmed(db: &Connection, id: i64) -> Result<(), PlannerError> {
    db.call(move |conn| {
        conn.execute(
            "UPDATE users SET is_confirmed = 1, one_time_code = NULL, otp_expiry = NULL WHERE id = ?1",
            [id],
        )?;
        Ok(())
    })
    .await?;
    Ok(())
}
