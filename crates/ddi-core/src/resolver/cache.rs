//! Memoizing resolver wrapper.

use std::collections::HashMap;
use std::sync::Mutex;

use tracing::debug;

use super::{CompoundResolver, ResolverResult};
use crate::models::normalize_drug_name;

/// Caches resolution outcomes keyed by normalized name.
///
/// Both "found" and "not found" are cached; errors are not.
pub struct CachingResolver<R> {
    inner: R,
    cache: Mutex<HashMap<String, Option<String>>>,
}

impl<R: CompoundResolver> CachingResolver<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of cached names.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Get the wrapped resolver.
    pub fn inner(&self) -> &R {
        &self.inner
    }
}

impl<R: CompoundResolver> CompoundResolver for CachingResolver<R> {
    fn resolve_identifier(&self, name: &str) -> ResolverResult<Option<String>> {
        let key = normalize_drug_name(name);

        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&key) {
                debug!(name = %key, "resolver cache hit");
                return Ok(hit.clone());
            }
        }

        let resolved = self.inner.resolve_identifier(name)?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, resolved.clone());
        }
        Ok(resolved)
    }
}
