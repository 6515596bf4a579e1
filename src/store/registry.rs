//! Token-keyed registry of live stores.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use super::Store;
use crate::backend::Backend;
use crate::errors::AppError;

/// A store shared between concurrent requests of one session.
pub type SharedStore = Arc<Mutex<Store>>;

pub struct SessionRegistry {
    backend: Arc<dyn Backend>,
    stores: RwLock<HashMap<String, SharedStore>>,
}

impl SessionRegistry {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self {
            backend,
            stores: RwLock::new(HashMap::new()),
        }
    }

    /// A signed-out store bound to this registry's backend.
    pub fn new_store(&self) -> Store {
        Store::new(self.backend.clone())
    }

    /// Register a signed-in store under its session token.
    pub async fn insert(&self, store: Store) -> Result<SharedStore, AppError> {
        let token = store
            .token()
            .ok_or_else(|| AppError::Internal("Cannot register a signed-out store".to_string()))?
            .to_string();

        let shared = Arc::new(Mutex::new(store));
        let mut stores = self.stores.write().await;
        Self::retain_live(&mut stores);
        stores.insert(token, shared.clone());
        Ok(shared)
    }

    /// Drop every cached store whose session has expired.
    ///
    /// Stores locked by an in-flight request are left for a later pass.
    pub async fn sweep_expired(&self) -> usize {
        let mut stores = self.stores.write().await;
        Self::retain_live(&mut stores)
    }

    fn retain_live(stores: &mut HashMap<String, SharedStore>) -> usize {
        let before = stores.len();
        stores.retain(|_, shared| match shared.try_lock() {
            Ok(store) => !store.is_expired(),
            Err(_) => true,
        });
        let swept = before - stores.len();
        if swept > 0 {
            tracing::debug!("Swept {} expired sessions", swept);
        }
        swept
    }

    pub async fn remove(&self, token: &str) -> Option<SharedStore> {
        self.stores.write().await.remove(token)
    }

    pub async fn len(&self) -> usize {
        self.stores.read().await.len()
    }

    /// Find the store for `token`, restoring it from the backend on a miss.
    ///
    /// Expired sessions are evicted and rejected.
    pub async fn resolve(&self, token: &str) -> Result<SharedStore, AppError> {
        let cached = self.stores.read().await.get(token).cloned();

        if let Some(shared) = cached {
            if !shared.lock().await.is_expired() {
                return Ok(shared);
            }
            tracing::debug!("Evicting expired session");
            self.remove(token).await;
            return Err(AppError::Unauthorized("Session expired".to_string()));
        }

        let mut store = Store::with_token(self.backend.clone(), token);
        store.initialize().await?;
        if store.user().is_none() || store.is_expired() {
            return Err(AppError::Unauthorized(
                "Invalid or expired session".to_string(),
            ));
        }

        tracing::debug!("Restored session for {:?}", store.user().map(|u| u.id().to_string()));
        let shared = Arc::new(Mutex::new(store));
        let mut stores = self.stores.write().await;
        Ok(stores.entry(token.to_string()).or_insert(shared).clone())
    }
}
