//! Concurrent generation cache.
//!
//! The cache maps [`GenerationKey`] to generated classes. Lookup takes a
//! short lock on the key map to obtain a per-key slot, then generation runs
//! under that slot's own lock: concurrent requests for an identical key
//! block on one generation instead of racing duplicate synthesis, while
//! requests for distinct keys proceed independently. Published classes are
//! immutable and safe for unlimited concurrent reads; entries are never
//! invalidated except by dropping the whole cache.

use std::sync::{Arc, Mutex, OnceLock};

use log::debug;
use rustc_hash::FxHashMap;

use proxyforge_core::GenerationError;
use proxyforge_core::runtime::ProxyClass;

use crate::GenerationKey;

type Slot = Arc<Mutex<Option<Arc<ProxyClass>>>>;

/// Shared mapping from generation keys to generated classes.
#[derive(Default)]
pub struct GenerationCache {
    slots: Mutex<FxHashMap<GenerationKey, Slot>>,
}

impl GenerationCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide default cache.
    pub fn global() -> &'static GenerationCache {
        static GLOBAL: OnceLock<GenerationCache> = OnceLock::new();
        GLOBAL.get_or_init(GenerationCache::new)
    }

    /// Return the class for `key`, generating it with `generate` if absent.
    ///
    /// At most one generation runs per key; losers of the race receive the
    /// winner's class. A failed generation leaves no entry behind.
    pub fn get_or_generate<F>(
        &self,
        key: GenerationKey,
        generate: F,
    ) -> Result<Arc<ProxyClass>, GenerationError>
    where
        F: FnOnce() -> Result<Arc<ProxyClass>, GenerationError>,
    {
        let slot = {
            let mut map = match self.slots.lock() {
                Ok(g) => g,
                Err(poisoned) => poisoned.into_inner(),
            };
            Arc::clone(map.entry(key.clone()).or_default())
        };

        let mut entry = match slot.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(class) = entry.as_ref() {
            debug!("generation cache hit for {key:?}");
            return Ok(Arc::clone(class));
        }
        debug!("generation cache miss for {key:?}");
        let class = generate()?;
        *entry = Some(Arc::clone(&class));
        Ok(class)
    }

    /// Number of keys holding a published class.
    pub fn len(&self) -> usize {
        let map = match self.slots.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        map.values()
            .filter(|slot| slot.lock().map(|e| e.is_some()).unwrap_or(false))
            .count()
    }

    /// Whether no class has been published yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for GenerationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationCache")
            .field("entries", &self.len())
            .finish()
    }
}
