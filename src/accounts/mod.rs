//! Organizer accounts confirmed by an emailed one-time code. Session
//! handling lives upstream; requests identify the organizer by id.

pub mod db;

use std::sync::{Arc, LazyLock};

use chrono::{Duration, NaiveDateTime, Utc};
use rand::Rng;
use regex::Regex;
use serde::Serialize;
use serde_json::json;
use tokio_rusqlite::Connection;

use crate::core::{MailConfig, PlannerError};
use crate::notify::{EmailTemplate, Notifier, templates};

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Invalid email regex"));

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub is_confirmed: bool,
    #[serde(skip_serializing)]
    pub one_time_code: Option<String>,
    #[serde(skip_serializing)]
    pub otp_expiry: Option<NaiveDateTime>,
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

pub fn generate_one_time_code() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

/// Start (or restart) registration for `email` and mail a fresh
/// one-time code. An address that is already confirmed is rejected.
pub async fn register(
    db: &Connection,
    notifier: Arc<dyn Notifier>,
    mail: &MailConfig,
    email: &str,
) -> Result<i64, PlannerError> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(PlannerError::validation(format!("Invalid email address: {}", email)));
    }
    if let Some(user) = db::find_user_by_email(db, email.clone()).await? {
        if user.is_confirmed {
            return Err(PlannerError::validation("This email address is already registered"));
        }
    }

    let code = generate_one_time_code();
    let expiry = Utc::now().naive_utc() + Duration::minutes(mail.otp_expiry_minutes);
    let user_id = db::upsert_pending_user(db, email.clone(), code.clone(), expiry).await?;

    let body = templates().render(
        &EmailTemplate::OneTimeCode.to_string(),
        &json!({ "code": code, "expiry_minutes": mail.otp_expiry_minutes }),
    )?;
    let subject = format!("Your confirmation code {}", code);
    if !notifier.send(&email, &subject, &body).await {
        tracing::warn!("Failed to deliver confirmation code to {}", email);
    }

    tracing::info!("Registration started for user {}", user_id);
    Ok(user_id)
}

/// Check `code` against the pending code for `email` and confirm the
/// account.
pub async fn confirm(db: &Connection, email: &str, code: &str) -> Result<User, PlannerError> {
    let email = email.trim().to_lowercase();
    let Some(user) = db::find_user_by_email(db, email).await? else {
        return Err(PlannerError::validation("Verification failed"));
    };
    if user.is_confirmed {
        return Ok(user);
    }
    if user.one_time_code.as_deref() != Some(code.trim()) {
        return Err(PlannerError::validation("Verification failed"));
    }
    let expired = user
        .otp_expiry
        .is_none_or(|expiry| expiry < Utc::now().naive_utc());
    if expired {
        return Err(PlannerError::validation("The confirmation code has expired"));
    }

    db::mark_confirmed(db, user.id).await?;
    tracing::info!("User {} confirmed", user.id);
    Ok(User {
        is_confirmed: true,
        one_time_code: None,
        otp_expiry: None,
        ..user
    })
}

/// Resolve the requesting organizer. Only confirmed users may organize
/// events.
pub async fn require_organizer(db: &Connection, organizer_id: i64) -> Result<User, PlannerError> {
    match db::find_user_by_id(db, organizer_id).await? {
        Some(user) if user.is_confirmed => Ok(user),
        Some(_) => Err(PlannerError::unauthorized("Account is not confirmed")),
        None => Err(PlannerError::unauthorized("Unknown organizer")),
    }
}
