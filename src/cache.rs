use crate::analyzer::ProfiledDataset;
use crate::error::Result;
use crate::fingerprint::Fingerprint;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Caller-owned store of profiled datasets keyed by content fingerprint.
///
/// Two files that share a name but differ in content never collide, and the
/// same bytes uploaded under different names share one entry. Entries are
/// only valid for the decode and profile options they were built with; use
/// one cache per option set.
#[derive(Debug, Default)]
pub struct ProfileCache {
    entries: HashMap<Fingerprint, Arc<ProfiledDataset>>,
}

impl ProfileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fingerprint: &Fingerprint) -> Option<Arc<ProfiledDataset>> {
        self.entries.get(fingerprint).cloned()
    }

    pub fn insert(&mut self, dataset: ProfiledDataset) -> Arc<ProfiledDataset> {
        let dataset = Arc::new(dataset);
        self.entries
            .insert(dataset.fingerprint.clone(), Arc::clone(&dataset));
        dataset
    }

    /// Return the cached profile for `data`, building it with `build` on a miss.
    /// A failed build leaves the cache unchanged.
    pub fn get_or_profile<F>(&mut self, data: &[u8], build: F) -> Result<Arc<ProfiledDataset>>
    where
        F: FnOnce(&[u8]) -> Result<ProfiledDataset>,
    {
        let fingerprint = Fingerprint::of(data);
        if let Some(hit) = self.get(&fingerprint) {
            debug!(%fingerprint, "profile cache hit");
            return Ok(hit);
        }

        debug!(%fingerprint, "profile cache miss");
        let dataset = build(data)?;
        Ok(self.insert(dataset))
    }

    pub fn invalidate(&mut self, fingerprint: &Fingerprint) -> bool {
        self.entries.remove(fingerprint).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::DecodeOptions;
    use crate::error::ProfilerError;
    use crate::profile::ProfileOptions;
    use crate::types::DecodeErrorType;
    use std::cell::Cell as Counter;

    fn build(data: &[u8]) -> Result<ProfiledDataset> {
        ProfiledDataset::from_bytes(data, &DecodeOptions::default(), &ProfileOptions::default())
    }

    #[test]
    fn test_hit_reuses_entry() {
        let mut cache = ProfileCache::new();
        let calls = Counter::new(0);
        let counting = |data: &[u8]| {
            calls.set(calls.get() + 1);
            build(data)
        };

        let first = cache.get_or_profile(b"a,b\n1,2\n", counting).unwrap();
        let second = cache.get_or_profile(b"a,b\n1,2\n", counting).unwrap();
        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_different_content_different_entries() {
        let mut cache = ProfileCache::new();
        let a = cache.get_or_profile(b"x\n1\n", build).unwrap();
        let b = cache.get_or_profile(b"x\nfoo\n", build).unwrap();
        assert_ne!(a.fingerprint, b.fingerprint);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_failed_build_not_cached() {
        let mut cache = ProfileCache::new();
        let result =
            cache.get_or_profile(b"", |_| Err(ProfilerError::Decode(DecodeErrorType::Sample)));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalidate() {
        let mut cache = ProfileCache::new();
        let entry = cache.get_or_profile(b"x\n1\n", build).unwrap();
        assert!(cache.invalidate(&entry.fingerprint));
        assert!(!cache.invalidate(&entry.fingerprint));
        assert!(cache.get(&entry.fingerprint).is_none());

        cache.get_or_profile(b"x\n1\n", build).unwrap();
        assert_eq!(cache.len(), 1);
    }
}
