//! Shared portal state handed to every handler as an `Extension`.

use crate::{
    auth::{AuthService, SecretHasher},
    dashboard::Dashboard,
    results::ResultViewer,
    session::SessionRegistry,
    store::Store,
};
use std::{fmt, sync::Arc, time::Duration};

const DEFAULT_SESSION_TTL_SECONDS: u64 = 12 * 60 * 60;

#[derive(Clone, Debug)]
pub struct PortalConfig {
    session_ttl_seconds: u64,
    cookie_secure: bool,
    hasher: SecretHasher,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            cookie_secure: false,
            hasher: SecretHasher::default(),
        }
    }
}

impl PortalConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: u64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cookie_secure(mut self, secure: bool) -> Self {
        self.cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: SecretHasher) -> Self {
        self.hasher = hasher;
        self
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> u64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }
}

pub struct PortalState {
    config: PortalConfig,
    store: Arc<dyn Store>,
    auth: AuthService,
    viewer: ResultViewer,
    dashboard: Dashboard,
    sessions: SessionRegistry,
}

impl fmt::Debug for PortalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalState")
            .field("config", &self.config)
            .field("backend", &self.store.backend_tag())
            .finish_non_exhaustive()
    }
}

impl PortalState {
    /// Wire the auth service, viewer, and session registry over one store.
    #[must_use]
    pub fn new<S: Store + 'static>(store: Arc<S>, config: PortalConfig) -> Self {
        let auth = AuthService::new(store.clone(), config.hasher.clone());
        let viewer = ResultViewer::new(store.clone());
        let dashboard = Dashboard::new(viewer.clone());
        let sessions =
            SessionRegistry::new(Duration::from_secs(config.session_ttl_seconds));
        Self {
            config,
            store,
            auth,
            viewer,
            dashboard,
            sessions,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    #[must_use]
    pub fn viewer(&self) -> &ResultViewer {
        &self.viewer
    }

    #[must_use]
    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn config_defaults_match_cli_defaults() {
        let config = PortalConfig::new();
        assert_eq!(config.session_ttl_seconds(), 43_200);
        assert!(!config.cookie_secure());
    }

    #[test]
    fn state_uses_configured_session_ttl() {
        let config = PortalConfig::new().with_session_ttl_seconds(90);
        let state = PortalState::new(Arc::new(MemoryStore::new()), config);
        assert_eq!(state.sessions().ttl(), Duration::from_secs(90));
        assert_eq!(state.store().backend_tag(), "memory");
    }
}
