//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::WebConfig;
use crate::db::{MenuStore, SharedStore};
use crate::services::auth::TokenSigner;
use crate::services::menu::MenuService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the store, the menu cache and the token signer.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: WebConfig,
    menu: MenuService,
    tokens: TokenSigner,
}

impl AppState {
    /// Create a new application state around an opened store.
    #[must_use]
    pub fn new(config: WebConfig, store: SharedStore) -> Self {
        let menu = MenuService::new(store, config.cache_capacity);
        let tokens = TokenSigner::new(config.token_secret.clone(), config.token_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                menu,
                tokens,
            }),
        }
    }

    /// Get a reference to the configuration.
    #[must_use]
    pub fn config(&self) -> &WebConfig {
        &self.inner.config
    }

    /// Get a reference to the cached menu service.
    #[must_use]
    pub fn menu(&self) -> &MenuService {
        &self.inner.menu
    }

    /// Get a reference to the store, bypassing the cache.
    #[must_use]
    pub fn store(&self) -> &dyn MenuStore {
        self.inner.menu.store()
    }

    /// Get a reference to the admin token signer.
    #[must_use]
    pub fn tokens(&self) -> &TokenSigner {
        &self.inner.tokens
    }
}
