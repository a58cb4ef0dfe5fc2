use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

use nalgebra::ComplexField;

use crate::error::{CoreError, Result};
use crate::runner::Runner;

/// One registered job: the [`Runner`] driving it, plus the URL its
/// configuration document was loaded from.
pub struct JobEntry<T: ComplexField<RealField = f64> + Copy + Send + Sync> {
    pub runner: Runner<T>,
    pub origin_url: String,
}

/// Process-wide map from an opaque job key to its [`JobEntry`], guarded by a
/// single mutex that protects only map mutation -- per-job operations take
/// the lock just long enough to look up or remove an entry, never while
/// stepping a `Runner`.
///
/// Grounded on `original_source/src/yamss/server/handler.hpp`'s
/// `m_jobs: unordered_map<string, pair<runner_pointer, string>>`.
pub struct JobRegistry<T: ComplexField<RealField = f64> + Copy + Send + Sync> {
    jobs: Mutex<HashMap<String, JobEntry<T>>>,
    counter: AtomicU64,
}

impl<T: ComplexField<RealField = f64> + Copy + Send + Sync> JobRegistry<T> {
    pub fn new() -> Self {
        JobRegistry {
            jobs: Mutex::new(HashMap::new()),
            counter: AtomicU64::new(0),
        }
    }

    fn fresh_key(&self) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);
        let ordinal = self.counter.fetch_add(1, Ordering::Relaxed);
        let mut hasher = DefaultHasher::new();
        nanos.hash(&mut hasher);
        ordinal.hash(&mut hasher);
        std::thread::current().id().hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }

    /// Registers `runner` under a freshly generated key and returns it.
    pub fn create(&self, runner: Runner<T>, origin_url: String) -> String {
        let key = self.fresh_key();
        self.jobs
            .lock()
            .unwrap()
            .insert(key.clone(), JobEntry { runner, origin_url });
        key
    }

    pub fn release(&self, key: &str) -> Result<()> {
        self.jobs
            .lock()
            .unwrap()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| CoreError::UnknownKey(hash_key(key)))
    }

    /// Runs `f` against the job's [`Runner`], holding the registry lock only
    /// for the duration of the lookup and the call -- callers that need to
    /// run a long simulation should do so with the lock held for that one
    /// job, not for the whole registry's lifetime.
    pub fn with_runner<R>(&self, key: &str, f: impl FnOnce(&mut Runner<T>) -> R) -> Result<R> {
        let mut jobs = self.jobs.lock().unwrap();
        let entry = jobs
            .get_mut(key)
            .ok_or_else(|| CoreError::UnknownKey(hash_key(key)))?;
        Ok(f(&mut entry.runner))
    }

    pub fn origin_url(&self, key: &str) -> Result<String> {
        self.jobs
            .lock()
            .unwrap()
            .get(key)
            .map(|entry| entry.origin_url.clone())
            .ok_or_else(|| CoreError::UnknownKey(hash_key(key)))
    }
}

impl<T: ComplexField<RealField = f64> + Copy + Send + Sync> Default for JobRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn hash_key(key: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}
