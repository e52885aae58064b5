//! Router construction.

mod routes;

pub use self::routes::{app, routes};
