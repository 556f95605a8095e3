//! Account and session operations
//!
//! Registration, login and logout. Everything else only sees the user id
//! that [`authenticate`] returns.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::db::Database;
use crate::models::{Session, User};

use super::{ServiceError, ServiceResult};

/// Shortest password accepted at registration
pub const MIN_PASSWORD_LEN: usize = 4;

/// Username/password pair from register and login requests
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Public view of an account
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountSummary {
    pub id: i64,
    pub username: String,
}

impl From<&User> for AccountSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Run a bcrypt call on the blocking pool
async fn run_bcrypt<F, T>(f: F) -> ServiceResult<T>
where
    F: FnOnce() -> Result<T, bcrypt::BcryptError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ServiceError::Internal(format!("Password task failed: {}", e)))?
        .map_err(|e| ServiceError::Internal(format!("Password hashing failed: {}", e)))
}

/// Create an account. Fails with `Conflict` if the username is taken.
pub async fn register(db: &Database, credentials: Credentials, bcrypt_cost: u32) -> ServiceResult<AccountSummary> {
    let username = credentials.username.trim().to_string();
    if username.is_empty() {
        return Err(ServiceError::Validation("Username cannot be empty".to_string()));
    }
    if credentials.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ServiceError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let taken = db.with_conn(|conn| User::get_by_username(conn, &username))?;
    if taken.is_some() {
        return Err(username_taken(&username));
    }

    let password = credentials.password;
    let hash = run_bcrypt(move || bcrypt::hash(password, bcrypt_cost)).await?;

    // A concurrent registration can still win between the check and the insert
    let user = db
        .with_conn(|conn| User::create(conn, &username, &hash))
        .map_err(|e| {
            if e.is_unique_violation() {
                username_taken(&username)
            } else {
                ServiceError::Database(e)
            }
        })?;

    info!(user_id = user.id, username = %user.username, "Registered user");
    Ok(AccountSummary::from(&user))
}

fn username_taken(username: &str) -> ServiceError {
    ServiceError::Conflict(format!("Username {:?} is already taken", username))
}

/// Check credentials and open a session lasting `ttl`
pub async fn login(
    db: &Database,
    credentials: Credentials,
    ttl: Duration,
) -> ServiceResult<(AccountSummary, Session)> {
    let username = credentials.username.trim().to_string();
    let user = db.with_conn(|conn| User::get_by_username(conn, &username))?;

    let Some(user) = user else {
        warn!(username = %username, "Login for unknown user");
        return Err(invalid_credentials());
    };

    let password = credentials.password;
    let hash = user.password_hash.clone();
    let valid = run_bcrypt(move || bcrypt::verify(password, &hash)).await?;
    if !valid {
        warn!(user_id = user.id, "Login with wrong password");
        return Err(invalid_credentials());
    }

    let now = Utc::now();
    let session = db.with_conn(|conn| {
        Session::purge_expired(conn, now)?;
        Session::create(conn, user.id, now, ttl)
    })?;

    info!(user_id = user.id, "User logged in");
    Ok((AccountSummary::from(&user), session))
}

fn invalid_credentials() -> ServiceError {
    ServiceError::Unauthorized("Invalid username or password".to_string())
}

/// End a session. Unknown tokens are ignored.
pub fn logout(db: &Database, token: &str) -> ServiceResult<()> {
    if db.with_conn(|conn| Session::delete(conn, token))? {
        info!("Session closed");
    }
    Ok(())
}

/// Resolve a session token to the user id it belongs to
pub fn authenticate(db: &Database, token: &str) -> ServiceResult<i64> {
    db.with_conn(|conn| Session::find_user(conn, token, Utc::now()))?
        .ok_or_else(|| ServiceError::Unauthorized("Login required".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::temp_db;

    // Lowest cost bcrypt accepts, to keep the tests fast
    const COST: u32 = 4;

    fn creds(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_login_logout() {
        let (_dir, db) = temp_db();

        let account = register(&db, creds(" alice ", "secret"), COST).await.unwrap();
        assert_eq!(account.username, "alice");

        let (who, session) = login(&db, creds("alice", "secret"), Duration::hours(1)).await.unwrap();
        assert_eq!(who, account);
        assert_eq!(authenticate(&db, &session.token).unwrap(), account.id);

        logout(&db, &session.token).unwrap();
        assert!(matches!(
            authenticate(&db, &session.token),
            Err(ServiceError::Unauthorized(_))
        ));
        logout(&db, &session.token).unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let (_dir, db) = temp_db();
        register(&db, creds("alice", "secret"), COST).await.unwrap();

        let err = register(&db, creds("alice", "other"), COST).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let users = db.with_conn(User::count).unwrap();
        assert_eq!(users, 1);
    }

    #[tokio::test]
    async fn test_register_validation() {
        let (_dir, db) = temp_db();
        assert!(matches!(
            register(&db, creds("  ", "secret"), COST).await,
            Err(ServiceError::Validation(_))
        ));
        assert!(matches!(
            register(&db, creds("bob", "abc"), COST).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let (_dir, db) = temp_db();
        register(&db, creds("alice", "secret"), COST).await.unwrap();

        let wrong = login(&db, creds("alice", "guess"), Duration::hours(1)).await;
        assert!(matches!(wrong, Err(ServiceError::Unauthorized(_))));

        let unknown = login(&db, creds("mallory", "secret"), Duration::hours(1)).await;
        assert!(matches!(unknown, Err(ServiceError::Unauthorized(_))));

        assert!(matches!(authenticate(&db, "nope"), Err(ServiceError::Unauthorized(_))));
    }

    #[tokio::test]
    async fn test_expired_session_rejected() {
        let (_dir, db) = temp_db();
        register(&db, creds("alice", "secret"), COST).await.unwrap();

        let (_, session) = login(&db, creds("alice", "secret"), Duration::seconds(-1)).await.unwrap();
        assert!(matches!(
            authenticate(&db, &session.token),
            Err(ServiceError::Unauthorized(_))
        ));
    }
}
