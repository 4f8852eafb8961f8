//! Contains the user specific database structs and queries
use crate::schema::users;
use database::{DbConnection, Result};
use diesel::prelude::*;

/// Diesel user struct
///
/// Is used as a result in various queries. Represents a user row
#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = users, primary_key(email))]
pub struct User {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub make: String,
    pub model: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius_m: Option<f64>,
    pub city: Option<String>,
}

impl User {
    /// Saved location of the user, `None` until the first location update
    pub fn saved_location(&self) -> Option<SavedLocation> {
        match (self.latitude, self.longitude, self.radius_m) {
            (Some(latitude), Some(longitude), Some(radius_m)) => Some(SavedLocation {
                latitude,
                longitude,
                radius_m,
            }),
            _ => None,
        }
    }

    #[tracing::instrument(err, skip_all)]
    pub fn get(conn: &mut DbConnection, email: &str) -> Result<User> {
        let user = users::table.filter(users::email.eq(email)).first(conn)?;

        Ok(user)
    }

    #[tracing::instrument(err, skip_all)]
    pub fn get_opt(conn: &mut DbConnection, email: &str) -> Result<Option<User>> {
        let user = users::table
            .filter(users::email.eq(email))
            .first(conn)
            .optional()?;

        Ok(user)
    }
}

/// A user's saved location, all three fields set together
#[derive(Debug, Clone, Copy)]
pub struct SavedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
}

/// Diesel insertable user struct
///
/// Represents fields that have to be provided on user insertion.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub make: String,
    pub model: String,
}

impl NewUser {
    /// Tries to insert the new user into the database
    ///
    /// When yielding a unique key violation (email already registered),
    /// None is returned.
    #[tracing::instrument(err, skip_all)]
    pub fn try_insert(self, conn: &mut DbConnection) -> Result<Option<User>> {
        let query = self.insert_into(users::table);

        let result = query.get_result(conn);

        match result {
            Ok(user) => Ok(Some(user)),
            Err(diesel::result::Error::DatabaseError(
                diesel::result::DatabaseErrorKind::UniqueViolation,
                ..,
            )) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Diesel user struct for location updates
#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
pub struct UpdateUserLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_m: f64,
    pub city: String,
}

impl UpdateUserLocation {
    #[tracing::instrument(err, skip_all)]
    pub fn apply(self, conn: &mut DbConnection, email: &str) -> Result<User> {
        let query = diesel::update(users::table)
            .filter(users::email.eq(email))
            .set(self)
            .returning(users::all_columns);

        let user = query.get_result(conn)?;

        Ok(user)
    }
}
