//! Auth handlers: signup, login, logout, and session introspection.
//!
//! Login issues an opaque session token, stored only as a SHA-256 hash in the
//! [`crate::session::SessionRegistry`] and returned as the
//! `autograder_session` cookie. Every other endpoint resolves the caller's
//! session from that cookie or from an `Authorization: Bearer` header.

pub(crate) mod login;
pub(crate) mod session;
pub(crate) mod signup;
pub(crate) mod types;
