//! Database models, queries and migrations of the rideout controller
//!
//! Each table has its own module containing the query-result struct, the
//! insertable struct and the queries operating on it. The geospatial helper
//! used by the nearby-event listing lives in [`geo`].

#[macro_use]
extern crate diesel;

pub mod events;
pub mod geo;
pub mod ids;
pub mod migrations;
pub mod rsvps;
mod schema;
pub mod users;
