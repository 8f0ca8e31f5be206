//! # AutoGrader student portal
//!
//! `autograder` lets students sign up, log in, and read the results and
//! feedback an external grading pipeline wrote for them. It is a thin layer
//! over two Postgres tables: `student_metadata` (identities) and
//! `student_scores` (graded tests).
//!
//! ## Identifiers
//!
//! A student's PRN is trimmed and uppercased before every lookup and insert.
//! Result rows are matched case-insensitively because the grading pipeline may
//! write any case. Uniqueness is enforced by a unique index on `UPPER(prn)`.
//!
//! ## Sessions
//!
//! Login issues a random token kept only as a SHA-256 hash in a process-local
//! registry. Sessions expire after a configurable TTL and do not survive a
//! restart. Results and feedback are served only to an authenticated session.
//!
//! ## Errors
//!
//! Login failures are undifferentiated (`Invalid PRN or Password.`), so the API
//! never reveals whether a PRN is registered.

pub mod api;
pub mod auth;
pub mod cli;
pub mod dashboard;
pub mod results;
pub mod session;
pub mod store;
