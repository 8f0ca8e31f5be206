//! API handlers for the student portal.

pub mod auth;
pub mod dashboard;
pub mod health;
pub mod results;
pub mod root;
