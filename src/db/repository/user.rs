use chrono::Local;
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::config;
use crate::db::DatabaseError;
use crate::models::User;

fn map_user(row: &Row) -> rusqlite::Result<(String, String, String, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
}

fn build_user(raw: (String, String, String, String)) -> Result<User, DatabaseError> {
    Ok(User {
        id: Uuid::parse_str(&raw.0).unwrap_or_default(),
        name: raw.1,
        email: raw.2,
        created_at: super::parse_timestamp(&raw.3, "users.created_at")?,
    })
}

pub fn insert_user(conn: &Connection, user: &User) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO users (id, name, email, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            user.id.to_string(),
            user.name,
            user.email,
            user.created_at.to_string(),
        ],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            DatabaseError::ConstraintViolation(format!(
                "email '{}' is already registered",
                user.email
            ))
        }
        other => DatabaseError::from(other),
    })?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &Uuid) -> Result<Option<User>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT id, name, email, created_at FROM users WHERE id = ?1")?;
    match stmt.query_row(params![id.to_string()], map_user) {
        Ok(raw) => Ok(Some(build_user(raw)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn find_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, DatabaseError> {
    let mut stmt =
        conn.prepare("SELECT id, name, email, created_at FROM users WHERE email = ?1")?;
    match stmt.query_row(params![email], map_user) {
        Ok(raw) => Ok(Some(build_user(raw)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Find or create the seeded default user. All requests without an explicit
/// `user_id` act as this user.
pub fn ensure_default_user(conn: &Connection) -> Result<User, DatabaseError> {
    if let Some(user) = find_user_by_email(conn, config::DEFAULT_USER_EMAIL)? {
        return Ok(user);
    }
    let user = User {
        id: Uuid::new_v4(),
        name: config::DEFAULT_USER_NAME.to_string(),
        email: config::DEFAULT_USER_EMAIL.to_string(),
        created_at: Local::now().naive_local(),
    };
    insert_user(conn, &user)?;
    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    #[test]
    fn insert_and_fetch_round_trip() {
        let conn = open_memory_database().unwrap();
        let user = User {
            id: Uuid::new_v4(),
            name: "Alice".into(),
            email: "alice@example.com".into(),
            created_at: Local::now().naive_local(),
        };
        insert_user(&conn, &user).unwrap();

        let fetched = get_user(&conn, &user.id).unwrap().unwrap();
        assert_eq!(fetched.email, "alice@example.com");
        assert_eq!(find_user_by_email(&conn, "alice@example.com").unwrap().unwrap().id, user.id);
        assert!(get_user(&conn, &Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn duplicate_email_is_constraint_violation() {
        let conn = open_memory_database().unwrap();
        let mk = |id| User {
            id,
            name: "Alice".into(),
            email: "alice@example.com".into(),
            created_at: Local::now().naive_local(),
        };
        insert_user(&conn, &mk(Uuid::new_v4())).unwrap();
        let err = insert_user(&conn, &mk(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, DatabaseError::ConstraintViolation(_)));
    }

    #[test]
    fn ensure_default_user_is_idempotent() {
        let conn = open_memory_database().unwrap();
        let first = ensure_default_user(&conn).unwrap();
        let second = ensure_default_user(&conn).unwrap();
        assert_eq!(first.id, second.id);
    }
}
