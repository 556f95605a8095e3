//! User model
//!
//! Account records. Password hashing happens in the accounts service; this
//! layer only stores the hash.

use rusqlite::{params, Connection, Row};
use serde::Serialize;

use crate::db::{DbError, DbResult};

/// A registered user
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    pub created_at: String,
}

impl User {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            username: row.get("username")?,
            password_hash: row.get("password_hash")?,
            created_at: row.get("created_at")?,
        })
    }

    /// Insert a new user. A taken username surfaces as a unique-constraint
    /// error (see [`DbError::is_unique_violation`]).
    pub fn create(conn: &Connection, username: &str, password_hash: &str) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
            params![username, password_hash],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or(DbError::MissingRow { table: "users", id })
    }

    /// Get a user by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get a user by exact username
    pub fn get_by_username(conn: &Connection, username: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM users WHERE username = ?1")?;

        match stmt.query_row([username], Self::from_row) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Count registered users
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    #[test]
    fn test_duplicate_username_is_unique_violation() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let alice = User::create(&conn, "alice", "h1").unwrap();
        assert_eq!(alice.username, "alice");

        let err = User::create(&conn, "alice", "h2").unwrap_err();
        assert!(err.is_unique_violation());
        assert_eq!(User::count(&conn).unwrap(), 1);

        let found = User::get_by_username(&conn, "alice").unwrap().unwrap();
        assert_eq!(found.id, alice.id);
        assert_eq!(found.password_hash, "h1");
        assert!(User::get_by_username(&conn, "ALICE").unwrap().is_none());
    }
}
