//! Session model
//!
//! Server-side login sessions keyed by an opaque cookie token.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::{DbError, DbResult};

/// A login session
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub created_at: String,
    pub expires_at: String,
}

/// Fixed-width UTC timestamps so they compare correctly as text
fn stamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl Session {
    /// Start a session for `user_id` lasting `ttl` from `now`
    pub fn create(conn: &Connection, user_id: i64, now: DateTime<Utc>, ttl: Duration) -> DbResult<Self> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(DbError::TimestampOutOfRange)?;

        let session = Self {
            token: uuid::Uuid::new_v4().simple().to_string(),
            user_id,
            created_at: stamp(now),
            expires_at: stamp(expires_at),
        };

        conn.execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![session.token, session.user_id, session.created_at, session.expires_at],
        )?;

        Ok(session)
    }

    /// Resolve a token to its user. An expired session is removed and
    /// treated as absent.
    pub fn find_user(conn: &Connection, token: &str, now: DateTime<Utc>) -> DbResult<Option<i64>> {
        let row: Option<(i64, String)> = conn
            .query_row(
                "SELECT user_id, expires_at FROM sessions WHERE token = ?1",
                [token],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        match row {
            Some((user_id, expires_at)) if expires_at > stamp(now) => Ok(Some(user_id)),
            Some(_) => {
                Self::delete(conn, token)?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    /// Remove a session; returns whether one existed
    pub fn delete(conn: &Connection, token: &str) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM sessions WHERE token = ?1", [token])?;
        Ok(rows > 0)
    }

    /// Remove every session that expired at or before `now`
    pub fn purge_expired(conn: &Connection, now: DateTime<Utc>) -> DbResult<usize> {
        let rows = conn.execute("DELETE FROM sessions WHERE expires_at <= ?1", [stamp(now)])?;
        Ok(rows)
    }
}
