//! Database access layer for alumni-api
//!
//! Pool initialization and schema live in `alumni-common`; these
//! modules hold the service's queries.

pub mod alumni;
pub mod departments;
pub mod users;
