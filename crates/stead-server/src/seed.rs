//! Sample data for development environments.

use rusqlite::Connection;
use serde_json::json;
use stead_accounts::{create_user, AccountError, NewUser};
use stead_listings::{create_property, ListingError, PropertyFields};
use thiserror::Error;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("account error: {0}")]
    Account(#[from] AccountError),
    #[error("listing error: {0}")]
    Listing(#[from] ListingError),
}

/// Inserts two sample users, each owning one property.
///
/// Does nothing when `users` already has rows, so the command can be re-run
/// safely. Returns whether anything was inserted.
pub fn seed_sample_data(conn: &Connection) -> Result<bool, SeedError> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    if existing > 0 {
        return Ok(false);
    }

    let alice = create_user(
        conn,
        &NewUser {
            first_name: "Alice".to_string(),
            last_name: "Owner".to_string(),
            date_of_birth: "1990-01-01".to_string(),
        },
    )?;
    let bob = create_user(
        conn,
        &NewUser {
            first_name: "Bob".to_string(),
            last_name: "Landlord".to_string(),
            date_of_birth: "1985-05-15".to_string(),
        },
    )?;

    create_property(
        conn,
        alice,
        &PropertyFields {
            name: Some("Cozy Apartment".to_string()),
            description: Some("A beautiful 2-bedroom apartment in the city center".to_string()),
            property_type: Some("apartment".to_string()),
            city: Some("Paris".to_string()),
            rooms_count: Some(2),
            rooms_details: Some(
                json!([
                    {"type": "bedroom", "size": 15},
                    {"type": "living_room", "size": 25},
                ])
                .to_string(),
            ),
        },
    )?;
    create_property(
        conn,
        bob,
        &PropertyFields {
            name: Some("Modern House".to_string()),
            description: Some("Spacious house with garden".to_string()),
            property_type: Some("house".to_string()),
            city: Some("Lyon".to_string()),
            rooms_count: Some(3),
            rooms_details: Some(
                json!([
                    {"type": "bedroom", "size": 20},
                    {"type": "living_room", "size": 35},
                    {"type": "kitchen", "size": 15},
                ])
                .to_string(),
            ),
        },
    )?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().expect("should open in-memory db");
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .expect("should enable foreign keys");
        stead_db::reset_schema(&conn).expect("schema reset should succeed");
        conn
    }

    #[test]
    fn seeds_users_and_properties_once() {
        let conn = setup();

        assert!(seed_sample_data(&conn).expect("first seed should succeed"));

        let users: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        let properties: i64 = conn
            .query_row("SELECT COUNT(*) FROM properties", [], |row| row.get(0))
            .unwrap();
        assert_eq!(users, 2);
        assert_eq!(properties, 2);

        // Second run is a no-op.
        assert!(!seed_sample_data(&conn).expect("second seed should succeed"));
        let users_after: i64 = conn
            .query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
            .unwrap();
        assert_eq!(users_after, 2);
    }
}
