//! Per-user session state.
//!
//! A [`Session`] is an explicit value handed to every auth and view operation;
//! there is no process-wide "current user". The HTTP layer keeps one session
//! per cookie token in a [`SessionRegistry`].

mod registry;

pub use registry::SessionRegistry;

use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Session {
    authenticated: bool,
    identifier: String,
    display_name: String,
}

impl Session {
    /// An empty, unauthenticated session.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A session already logged in as `identifier`.
    #[must_use]
    pub fn authenticated(identifier: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            authenticated: true,
            identifier: identifier.into(),
            display_name: display_name.into(),
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub(crate) fn authenticate(&mut self, identifier: String, display_name: String) {
        self.authenticated = true;
        self.identifier = identifier;
        self.display_name = display_name;
    }

    /// Back to the initial unauthenticated state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
