//! HTTP handlers

pub mod alumni;
pub mod auth;
pub mod health;
pub mod import;
pub mod middleware;
pub mod users;
