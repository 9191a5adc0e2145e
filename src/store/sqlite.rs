use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use super::Store;
use super::schema::SCHEMA;
use crate::cert::next_certificate_number;
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(d) => Some(d),
        Err(e) => {
            tracing::error!("Invalid date in database: '{}' - {}", s, e);
            None
        }
    }
}

fn format_date(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: parse_datetime(&row.get::<_, String>(3)?),
        updated_at: parse_datetime(&row.get::<_, String>(4)?),
    })
}

fn row_to_specification(row: &rusqlite::Row<'_>) -> rusqlite::Result<Specification> {
    Ok(Specification {
        id: row.get(0)?,
        name: row.get(1)?,
        last_certificate_number: row.get(2)?,
        created_at: parse_datetime(&row.get::<_, String>(3)?),
    })
}

fn row_to_client(row: &rusqlite::Row<'_>) -> rusqlite::Result<Client> {
    Ok(Client {
        id: row.get(0)?,
        company_name: row.get(1)?,
        email: row.get(2)?,
        specification_id: row.get(3)?,
        certificate_number: row.get(4)?,
        grant_date: row
            .get::<_, Option<String>>(5)?
            .as_deref()
            .and_then(parse_date),
        created_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

const USER_COLUMNS: &str = "id, username, password_hash, created_at, updated_at";
const SPEC_COLUMNS: &str = "id, name, last_certificate_number, created_at";
const CLIENT_COLUMNS: &str =
    "id, company_name, email, specification_id, certificate_number, grant_date, created_at";

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &User) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO users (id, username, password_hash, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id,
                user.username,
                user.password_hash,
                format_datetime(&user.created_at),
                format_datetime(&user.updated_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::AlreadyExists)
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            row_to_user,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            params![username],
            row_to_user,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY username"))?;

        let rows = stmt.query_map([], row_to_user)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_user_password(&self, id: &str, password_hash: &str) -> Result<()> {
        let rows = self.conn().execute(
            "UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3",
            params![password_hash, format_datetime(&Utc::now()), id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }
        Ok(())
    }

    fn count_users(&self) -> Result<i64> {
        let conn = self.conn();
        conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .map_err(Error::from)
    }

    // Specification operations

    fn create_specification(&self, spec: &Specification) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO specifications (id, name, last_certificate_number, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                spec.id,
                spec.name,
                spec.last_certificate_number,
                format_datetime(&spec.created_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::AlreadyExists)
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_specification(&self, id: &str) -> Result<Option<Specification>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {SPEC_COLUMNS} FROM specifications WHERE id = ?1"),
            params![id],
            row_to_specification,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_specification_by_name(&self, name: &str) -> Result<Option<Specification>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {SPEC_COLUMNS} FROM specifications WHERE name = ?1"),
            params![name],
            row_to_specification,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_specifications(&self) -> Result<Vec<Specification>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {SPEC_COLUMNS} FROM specifications ORDER BY name"
        ))?;

        let rows = stmt.query_map([], row_to_specification)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Client operations

    fn create_client(&self, new: &NewClient) -> Result<Client> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;

        // Counter read, counter advance, and insert commit together;
        // a failure at any step rolls all of it back.
        let last: i64 = tx
            .query_row(
                "SELECT last_certificate_number FROM specifications WHERE id = ?1",
                params![new.specification_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(Error::NotFound)?;

        let number = next_certificate_number(last);

        tx.execute(
            "UPDATE specifications SET last_certificate_number = ?1 WHERE id = ?2",
            params![number, new.specification_id],
        )?;

        let client = Client {
            id: Uuid::new_v4().to_string(),
            company_name: new.company_name.clone(),
            email: new.email.clone(),
            specification_id: new.specification_id.clone(),
            certificate_number: number,
            grant_date: new.grant_date,
            created_at: Utc::now(),
        };

        tx.execute(
            "INSERT INTO clients (id, company_name, email, specification_id, certificate_number, grant_date, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                client.id,
                client.company_name,
                client.email,
                client.specification_id,
                client.certificate_number,
                client.grant_date.as_ref().map(format_date),
                format_datetime(&client.created_at),
            ],
        )?;

        tx.commit()?;
        Ok(client)
    }

    fn get_client(&self, id: &str) -> Result<Option<Client>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1"),
            params![id],
            row_to_client,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_clients(&self) -> Result<Vec<Client>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY company_name"
        ))?;

        let rows = stmt.query_map([], row_to_client)?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_clients_with_specifications(&self) -> Result<Vec<ClientDetails>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT c.id, c.company_name, c.email, c.specification_id, c.certificate_number,
                    c.grant_date, c.created_at, s.name
             FROM clients c
             JOIN specifications s ON s.id = c.specification_id
             ORDER BY c.company_name",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(ClientDetails {
                client: row_to_client(row)?,
                specification_name: row.get(7)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn count_clients(&self) -> Result<i64> {
        let conn = self.conn();
        conn.query_row("SELECT COUNT(*) FROM clients", [], |row| row.get(0))
            .map_err(Error::from)
    }

    // Session operations

    fn create_session(&self, session: &Session) -> Result<()> {
        let result = self.conn().execute(
            "INSERT INTO sessions (id, token_hash, token_lookup, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session.id,
                session.token_hash,
                session.token_lookup,
                session.user_id,
                format_datetime(&session.created_at),
                format_datetime(&session.expires_at),
            ],
        );

        match result {
            Ok(_) => Ok(()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(Error::AlreadyExists)
            }
            Err(e) => Err(Error::from(e)),
        }
    }

    fn get_session_by_lookup(&self, lookup: &str) -> Result<Option<Session>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, token_hash, token_lookup, user_id, created_at, expires_at, last_used_at
             FROM sessions WHERE token_lookup = ?1",
            params![lookup],
            |row| {
                Ok(Session {
                    id: row.get(0)?,
                    token_hash: row.get(1)?,
                    token_lookup: row.get(2)?,
                    user_id: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                    expires_at: parse_datetime(&row.get::<_, String>(5)?),
                    last_used_at: row.get::<_, Option<String>>(6)?.map(|s| parse_datetime(&s)),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_session(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn delete_expired_sessions(&self) -> Result<usize> {
        let rows = self.conn().execute(
            "DELETE FROM sessions WHERE expires_at < ?1",
            params![format_datetime(&Utc::now())],
        )?;
        Ok(rows)
    }

    fn update_session_last_used(&self, id: &str) -> Result<()> {
        self.conn().execute(
            "UPDATE sessions SET last_used_at = ?1 WHERE id = ?2",
            params![format_datetime(&Utc::now()), id],
        )?;
        Ok(())
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
