//! Property listings for the stead backend.
//!
//! Implements the property model and its CRUD operations over a plain
//! `rusqlite::Connection`. Every property row is owned by exactly one user;
//! reads join the owner so responses can carry the owner sub-object without
//! a second query.
//!
//! `rooms_details` is an ordered list of free-form room descriptors stored
//! as serialized JSON text. Malformed stored text degrades to an empty list
//! on read rather than failing the whole row.

mod payload;

pub use payload::{extract_fields, PayloadError, PropertyFields};

use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during listing operations.
#[derive(Debug, Error)]
pub enum ListingError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("property not found")]
    NotFound,
    #[error("owner user not found")]
    OwnerMissing,
}

/// The owning user, embedded in every property representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PropertyOwner {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// A property listing joined with its owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    /// Internal database ID.
    pub id: i64,
    pub name: String,
    pub description: String,
    pub property_type: String,
    pub city: String,
    pub rooms_count: i64,
    /// Ordered free-form room descriptors.
    pub rooms_details: Vec<serde_json::Value>,
    /// Creation timestamp (ISO 8601).
    pub created_at: String,
    /// Last mutation timestamp (ISO 8601).
    pub updated_at: String,
    pub owner: PropertyOwner,
}

/// Columns selected for every property read, owner joined in.
const JOINED_SELECT: &str = "SELECT
        p.id, p.name, p.description, p.property_type, p.city,
        p.rooms_count, p.rooms_details, p.created_at, p.updated_at,
        p.owner_id, u.first_name, u.last_name
    FROM properties p
    JOIN users u ON p.owner_id = u.id";

/// Retrieves a property by id, owner included.
pub fn get_property(conn: &Connection, property_id: i64) -> Result<Property, ListingError> {
    conn.query_row(
        &format!("{JOINED_SELECT} WHERE p.id = ?1"),
        [property_id],
        map_row_to_property,
    )
    .optional()?
    .ok_or(ListingError::NotFound)
}

/// Lists properties in a city, newest first.
///
/// The match is a case-insensitive exact comparison. `limit` and `offset`
/// come pre-clamped from the HTTP layer. Rows created in the same second
/// fall back to id order so the page sequence stays stable.
pub fn list_properties_in_city(
    conn: &Connection,
    city: &str,
    limit: i64,
    offset: i64,
) -> Result<Vec<Property>, ListingError> {
    let mut stmt = conn.prepare(&format!(
        "{JOINED_SELECT}
         WHERE LOWER(p.city) = LOWER(?1)
         ORDER BY p.created_at DESC, p.id DESC
         LIMIT ?2 OFFSET ?3"
    ))?;

    let rows = stmt.query_map(params![city, limit, offset], map_row_to_property)?;
    let mut properties = Vec::new();
    for row in rows {
        properties.push(row?);
    }
    Ok(properties)
}

/// Inserts a new property owned by `owner_id` and returns its generated id.
///
/// The owner existence lookup and the insert run in one transaction,
/// committed only after both succeed. The lookup is advisory: the foreign
/// key on `owner_id` is what actually guarantees the owner exists at commit.
pub fn create_property(
    conn: &Connection,
    owner_id: i64,
    fields: &PropertyFields,
) -> Result<i64, ListingError> {
    let tx = conn.unchecked_transaction()?;

    let owner_exists: bool = tx.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = ?1)",
        [owner_id],
        |row| row.get(0),
    )?;
    if !owner_exists {
        return Err(ListingError::OwnerMissing);
    }

    tx.execute(
        "INSERT INTO properties (
            owner_id, name, description, property_type, city,
            rooms_count, rooms_details
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            owner_id,
            fields.name,
            fields.description,
            fields.property_type,
            fields.city,
            fields.rooms_count,
            fields.rooms_details,
        ],
    )?;
    let id = tx.last_insert_rowid();

    tx.commit()?;
    Ok(id)
}

/// Updates a property using a single UPDATE statement.
///
/// Only fields that are `Some` are written; `updated_at` is always forced to
/// the current time. An all-`None` mapping just verifies the row exists.
pub fn update_property(
    conn: &Connection,
    property_id: i64,
    fields: &PropertyFields,
) -> Result<(), ListingError> {
    if fields.is_empty() {
        let _ = get_property(conn, property_id)?;
        return Ok(());
    }

    let mut set_parts: Vec<String> = Vec::new();
    let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    let mut idx = 1usize;

    if let Some(name) = &fields.name {
        set_parts.push(format!("name = ?{}", idx));
        values.push(Box::new(name.clone()));
        idx += 1;
    }
    if let Some(description) = &fields.description {
        set_parts.push(format!("description = ?{}", idx));
        values.push(Box::new(description.clone()));
        idx += 1;
    }
    if let Some(property_type) = &fields.property_type {
        set_parts.push(format!("property_type = ?{}", idx));
        values.push(Box::new(property_type.clone()));
        idx += 1;
    }
    if let Some(city) = &fields.city {
        set_parts.push(format!("city = ?{}", idx));
        values.push(Box::new(city.clone()));
        idx += 1;
    }
    if let Some(rooms_count) = &fields.rooms_count {
        set_parts.push(format!("rooms_count = ?{}", idx));
        values.push(Box::new(*rooms_count));
        idx += 1;
    }
    if let Some(rooms_details) = &fields.rooms_details {
        set_parts.push(format!("rooms_details = ?{}", idx));
        values.push(Box::new(rooms_details.clone()));
        idx += 1;
    }
    set_parts.push("updated_at = datetime('now')".to_string());

    let sql = format!(
        "UPDATE properties SET {} WHERE id = ?{}",
        set_parts.join(", "),
        idx
    );
    values.push(Box::new(property_id));

    let params: Vec<&dyn rusqlite::types::ToSql> = values.iter().map(|v| v.as_ref()).collect();
    let count = conn.execute(&sql, params.as_slice())?;
    if count == 0 {
        return Err(ListingError::NotFound);
    }
    Ok(())
}

/// Deletes a property.
pub fn delete_property(conn: &Connection, property_id: i64) -> Result<(), ListingError> {
    let count = conn.execute("DELETE FROM properties WHERE id = ?1", [property_id])?;
    if count == 0 {
        return Err(ListingError::NotFound);
    }
    Ok(())
}

fn map_row_to_property(row: &Row) -> rusqlite::Result<Property> {
    let details_text: String = row.get(6)?;
    // Malformed or non-list stored text degrades to an empty list.
    let rooms_details: Vec<serde_json::Value> =
        serde_json::from_str(&details_text).unwrap_or_default();

    Ok(Property {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        property_type: row.get(3)?,
        city: row.get(4)?,
        rooms_count: row.get(5)?,
        rooms_details,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        owner: PropertyOwner {
            id: row.get(9)?,
            first_name: row.get(10)?,
            last_name: row.get(11)?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use serde_json::json;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .expect("should enable foreign keys");
        stead_db::reset_schema(&conn).expect("schema reset should succeed");
        conn
    }

    fn seed_user(conn: &Connection, first: &str, last: &str) -> i64 {
        conn.execute(
            "INSERT INTO users (first_name, last_name, date_of_birth)
             VALUES (?1, ?2, '1990-01-01')",
            params![first, last],
        )
        .expect("should insert user");
        conn.last_insert_rowid()
    }

    fn sample_fields(city: &str) -> PropertyFields {
        PropertyFields {
            name: Some("Cozy Apartment".to_string()),
            description: Some("Two bedrooms near the river".to_string()),
            property_type: Some("apartment".to_string()),
            city: Some(city.to_string()),
            rooms_count: Some(2),
            rooms_details: Some(
                json!([{"type": "bedroom", "size": 15}, {"type": "living_room", "size": 25}])
                    .to_string(),
            ),
        }
    }

    #[test]
    fn create_then_get_round_trips_rooms_details() {
        let conn = setup();
        let owner = seed_user(&conn, "Alice", "Owner");

        let id = create_property(&conn, owner, &sample_fields("Paris"))
            .expect("create should succeed");
        let property = get_property(&conn, id).expect("get should succeed");

        assert_eq!(property.name, "Cozy Apartment");
        assert_eq!(property.rooms_count, 2);
        assert_eq!(
            property.rooms_details,
            vec![
                json!({"type": "bedroom", "size": 15}),
                json!({"type": "living_room", "size": 25}),
            ]
        );
        assert_eq!(property.owner.id, owner);
        assert_eq!(property.owner.first_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn create_with_missing_owner_fails() {
        let conn = setup();

        let err = create_property(&conn, 99, &sample_fields("Paris"))
            .expect_err("unknown owner should fail");
        assert!(matches!(err, ListingError::OwnerMissing));

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM properties", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0, "rejected create must not write");
    }

    #[test]
    fn city_match_is_case_insensitive() {
        let conn = setup();
        let owner = seed_user(&conn, "Alice", "Owner");
        create_property(&conn, owner, &sample_fields("Paris")).unwrap();

        let found = list_properties_in_city(&conn, "paris", 20, 0).expect("list should succeed");
        assert_eq!(found.len(), 1);

        let missed = list_properties_in_city(&conn, "Lyon", 20, 0).expect("list should succeed");
        assert!(missed.is_empty());
    }

    #[test]
    fn listing_orders_newest_first_and_paginates() {
        let conn = setup();
        let owner = seed_user(&conn, "Alice", "Owner");

        let mut ids = Vec::new();
        for i in 0..3 {
            let mut fields = sample_fields("Paris");
            fields.name = Some(format!("Listing {i}"));
            ids.push(create_property(&conn, owner, &fields).unwrap());
        }

        let page = list_properties_in_city(&conn, "Paris", 2, 0).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].id, ids[2], "newest row comes first");
        assert_eq!(page[1].id, ids[1]);

        let rest = list_properties_in_city(&conn, "Paris", 2, 2).unwrap();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].id, ids[0]);
    }

    #[test]
    fn update_writes_only_supplied_columns() {
        let conn = setup();
        let owner = seed_user(&conn, "Alice", "Owner");
        let id = create_property(&conn, owner, &sample_fields("Paris")).unwrap();

        let changes = PropertyFields {
            city: Some("Lyon".to_string()),
            ..PropertyFields::default()
        };
        update_property(&conn, id, &changes).expect("update should succeed");

        let property = get_property(&conn, id).unwrap();
        assert_eq!(property.city, "Lyon");
        assert_eq!(property.name, "Cozy Apartment");
        assert_eq!(property.rooms_count, 2);
    }

    #[test]
    fn update_missing_property_is_not_found() {
        let conn = setup();
        let changes = PropertyFields {
            city: Some("Lyon".to_string()),
            ..PropertyFields::default()
        };
        let err = update_property(&conn, 5, &changes).expect_err("missing id should fail");
        assert!(matches!(err, ListingError::NotFound));
    }

    #[test]
    fn delete_removes_the_row() {
        let conn = setup();
        let owner = seed_user(&conn, "Alice", "Owner");
        let id = create_property(&conn, owner, &sample_fields("Paris")).unwrap();

        delete_property(&conn, id).expect("delete should succeed");
        assert!(matches!(
            get_property(&conn, id),
            Err(ListingError::NotFound)
        ));

        let err = delete_property(&conn, id).expect_err("second delete should fail");
        assert!(matches!(err, ListingError::NotFound));
    }

    #[test]
    fn malformed_stored_details_degrade_to_empty_list() {
        let conn = setup();
        let owner = seed_user(&conn, "Alice", "Owner");
        let id = create_property(&conn, owner, &sample_fields("Paris")).unwrap();

        conn.execute(
            "UPDATE properties SET rooms_details = 'not json' WHERE id = ?1",
            [id],
        )
        .unwrap();

        let property = get_property(&conn, id).expect("get should still succeed");
        assert!(property.rooms_details.is_empty());
    }
}
