use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Professional;

const COLUMNS: &str = "id, name, specialty, address, phone, email, created_at";

fn map_professional(row: &Row) -> rusqlite::Result<ProfessionalRow> {
    Ok(ProfessionalRow {
        id: row.get(0)?,
        name: row.get(1)?,
        specialty: row.get(2)?,
        address: row.get(3)?,
        phone: row.get(4)?,
        email: row.get(5)?,
        created_at: row.get(6)?,
    })
}

struct ProfessionalRow {
    id: String,
    name: String,
    specialty: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    created_at: String,
}

fn build_professional(raw: ProfessionalRow) -> Result<Professional, DatabaseError> {
    Ok(Professional {
        id: Uuid::parse_str(&raw.id).unwrap_or_default(),
        name: raw.name,
        specialty: raw.specialty,
        address: raw.address,
        phone: raw.phone,
        email: raw.email,
        created_at: super::parse_timestamp(&raw.created_at, "professionals.created_at")?,
    })
}

pub fn insert_professional(conn: &Connection, prof: &Professional) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO professionals (id, name, specialty, address, phone, email, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            prof.id.to_string(),
            prof.name,
            prof.specialty,
            prof.address,
            prof.phone,
            prof.email,
            prof.created_at.to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_professional(conn: &Connection, id: &Uuid) -> Result<Option<Professional>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {COLUMNS} FROM professionals WHERE id = ?1"))?;
    match stmt.query_row(params![id.to_string()], map_professional) {
        Ok(raw) => Ok(Some(build_professional(raw)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn list_professionals(conn: &Connection) -> Result<Vec<Professional>, DatabaseError> {
    let mut stmt =
        conn.prepare(&format!("SELECT {COLUMNS} FROM professionals ORDER BY name ASC"))?;
    let rows = stmt.query_map([], map_professional)?;
    rows.map(|r| build_professional(r?)).collect()
}

pub fn update_professional(conn: &Connection, prof: &Professional) -> Result<(), DatabaseError> {
    let changed = conn.execute(
        "UPDATE professionals
         SET name = ?2, specialty = ?3, address = ?4, phone = ?5, email = ?6
         WHERE id = ?1",
        params![
            prof.id.to_string(),
            prof.name,
            prof.specialty,
            prof.address,
            prof.phone,
            prof.email,
        ],
    )?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Professional".into(),
            id: prof.id.to_string(),
        });
    }
    Ok(())
}

/// Delete a professional. Fails with a constraint violation while any
/// event still references them.
pub fn delete_professional(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let changed = conn
        .execute("DELETE FROM professionals WHERE id = ?1", params![id.to_string()])
        .map_err(|e| match e {
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                DatabaseError::ConstraintViolation(
                    "professional is referenced by existing events".into(),
                )
            }
            other => DatabaseError::from(other),
        })?;
    if changed == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "Professional".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

/// Test fixture shared by the repository tests.
#[cfg(test)]
pub(crate) fn sample_professional(name: &str) -> Professional {
    Professional {
        id: Uuid::new_v4(),
        name: name.into(),
        specialty: Some("Cardiologist".into()),
        address: Some("12 Harbor St".into()),
        phone: Some("+1 555 0100".into()),
        email: None,
        created_at: chrono::Local::now().naive_local(),
    }
}
