//=========================================================================
// Asset Cache
//=========================================================================
//
// Reference-counted cache of loaded assets keyed by logical path.
//
// Loads are single-flight: concurrent requests for one path join the
// same provider load. Each joined request is a waiter; when the load
// completes, the entry is created with one reference per waiter still
// alive. Waiters dropped before completion are subtracted, and when the
// last one goes the provider future is dropped, cancelling it.
//
// Entries whose count reaches zero stay resident until a purge pass
// finds the cache over capacity and evicts them in LRU order.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use log::{debug, error, warn};

//=== Internal Dependencies ===============================================

use super::{Asset, AssetProvider};
use crate::error::UiError;

//=== Internal Types ======================================================

type SharedLoad = Shared<LocalBoxFuture<'static, Result<Asset, UiError>>>;

struct Entry {
    asset: Asset,
    refs: usize,
    last_access: u64,
    load_id: u64,
}

struct InFlight {
    id: u64,
    future: SharedLoad,
    waiters: usize,
}

struct CacheState {
    entries: HashMap<String, Entry>,
    loading: HashMap<String, InFlight>,
    capacity: usize,
    clock: u64,
    next_load_id: u64,
}

impl CacheState {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn acquire(&mut self, path: &str) -> Option<Asset> {
        let now = self.tick();
        let entry = self.entries.get_mut(path)?;
        entry.refs += 1;
        entry.last_access = now;
        Some(entry.asset.clone())
    }
}

//=== AssetCache ==========================================================

/// Reference-counted, single-flight asset cache.
///
/// A cheap handle: clones share the same cache. Every method runs on the
/// main timeline and never holds its internal borrow across a suspension
/// point.
#[derive(Clone)]
pub struct AssetCache {
    state: Rc<RefCell<CacheState>>,
    provider: Rc<dyn AssetProvider>,
}

impl AssetCache {
    //--- Construction -----------------------------------------------------

    /// Creates an empty cache that keeps at most `capacity` entries
    /// resident after a purge pass.
    pub fn new(provider: Rc<dyn AssetProvider>, capacity: usize) -> Self {
        Self {
            state: Rc::new(RefCell::new(CacheState {
                entries: HashMap::new(),
                loading: HashMap::new(),
                capacity,
                clock: 0,
                next_load_id: 0,
            })),
            provider,
        }
    }

    //--- Loading ----------------------------------------------------------

    /// Loads `path`, taking one reference on success.
    ///
    /// Joins an in-flight load for the same path instead of starting a
    /// second one. Dropping the returned future before it resolves gives
    /// the pending reference back.
    pub fn load(&self, path: &str) -> LocalBoxFuture<'static, Result<Asset, UiError>> {
        let cache = self.clone();
        let path = path.to_string();

        async move {
            let (future, id) = {
                let mut state = cache.state.borrow_mut();

                if let Some(asset) = state.acquire(&path) {
                    debug!("Asset cache hit for '{}'", path);
                    return Ok(asset);
                }

                match state.loading.get_mut(&path) {
                    Some(in_flight) => {
                        debug!("Joining in-flight load of '{}'", path);
                        in_flight.waiters += 1;
                        (in_flight.future.clone(), in_flight.id)
                    }
                    None => {
                        let id = state.next_load_id;
                        state.next_load_id += 1;

                        debug!("Starting load of '{}'", path);
                        let future = cache.start_load(&path, id);
                        state.loading.insert(
                            path.clone(),
                            InFlight {
                                id,
                                future: future.clone(),
                                waiters: 1,
                            },
                        );
                        (future, id)
                    }
                }
            };

            let mut waiter = Waiter {
                cache: Rc::downgrade(&cache.state),
                path,
                id,
                settled: false,
            };

            let result = future.await;
            waiter.settled = true;
            result
        }
        .boxed_local()
    }

    /// Loads `path` and drops the reference again, leaving a resident
    /// zero-count entry for later requests.
    pub async fn preload(&self, path: &str) -> Result<(), UiError> {
        let asset = self.load(path).await?;
        self.release(&asset);
        Ok(())
    }

    fn start_load(&self, path: &str, id: u64) -> SharedLoad {
        let state = Rc::downgrade(&self.state);
        let provider = Rc::clone(&self.provider);
        let load = self.provider.load(path);
        let path = path.to_string();

        async move {
            let result = load.await;

            let Some(state) = state.upgrade() else {
                if let Ok(asset) = &result {
                    provider.release(asset);
                }
                return Err(UiError::Cancelled);
            };

            let mut state = state.borrow_mut();
            let owned = state.loading.get(&path).is_some_and(|f| f.id == id);
            let waiters = if owned {
                state.loading.remove(&path).map_or(0, |f| f.waiters)
            } else {
                0
            };

            match result {
                Ok(asset) if waiters > 0 => {
                    let now = state.tick();
                    if let Some(entry) = state.entries.get_mut(&path) {
                        warn!("Asset '{}' loaded twice, keeping the resident copy", path);
                        entry.refs += waiters;
                        entry.last_access = now;
                        let resident = entry.asset.clone();
                        drop(state);
                        provider.release(&asset);
                        return Ok(resident);
                    }

                    debug!("Loaded '{}' for {} waiter(s)", path, waiters);
                    state.entries.insert(
                        path,
                        Entry {
                            asset: asset.clone(),
                            refs: waiters,
                            last_access: now,
                            load_id: id,
                        },
                    );
                    Ok(asset)
                }
                Ok(asset) => {
                    // Nobody is waiting any more (cache cleared mid-load).
                    drop(state);
                    debug!("Discarding orphaned load of '{}'", path);
                    provider.release(&asset);
                    Err(UiError::Cancelled)
                }
                Err(err) => {
                    error!("Failed to load asset '{}': {}", path, err);
                    Err(UiError::load_failure(&path, err.0))
                }
            }
        }
        .boxed_local()
        .shared()
    }

    //--- Reference Counting -----------------------------------------------

    /// Drops one reference to `asset`. The entry stays resident until a
    /// purge pass evicts it.
    pub fn release(&self, asset: &Asset) {
        let mut state = self.state.borrow_mut();

        let Some(entry) = state.entries.get_mut(asset.path()) else {
            warn!("Release of '{}' which is not cached", asset.path());
            return;
        };

        if !entry.asset.same_as(asset) {
            warn!("Release of a stale handle for '{}', ignored", asset.path());
            return;
        }

        if entry.refs == 0 {
            warn!("Over-release of '{}', count stays at 0", asset.path());
            return;
        }

        entry.refs -= 1;
    }

    /// Frees `path` regardless of its reference count.
    ///
    /// Returns false when nothing was cached under `path`.
    pub fn force_release(&self, path: &str) -> bool {
        let removed = self.state.borrow_mut().entries.remove(path);

        match removed {
            Some(entry) => {
                if entry.refs > 0 {
                    warn!(
                        "Force release of '{}' with {} live reference(s)",
                        path, entry.refs
                    );
                }
                self.provider.release(&entry.asset);
                true
            }
            None => false,
        }
    }

    //--- Eviction ---------------------------------------------------------

    /// Evicts least recently used unreferenced entries until the cache is
    /// back within capacity. Returns the number of evicted entries.
    pub fn purge(&self) -> usize {
        let evicted = {
            let mut state = self.state.borrow_mut();
            if state.entries.len() <= state.capacity {
                return 0;
            }

            let mut idle: Vec<(u64, String)> = state
                .entries
                .iter()
                .filter(|(_, entry)| entry.refs == 0)
                .map(|(path, entry)| (entry.last_access, path.clone()))
                .collect();
            idle.sort();

            let excess = state.entries.len() - state.capacity;
            let mut evicted = Vec::with_capacity(excess.min(idle.len()));
            for (_, path) in idle.into_iter().take(excess) {
                if let Some(entry) = state.entries.remove(&path) {
                    debug!("Evicting '{}'", path);
                    evicted.push(entry.asset);
                }
            }
            evicted
        };

        for asset in &evicted {
            self.provider.release(asset);
        }
        evicted.len()
    }

    /// Releases every entry and abandons every in-flight load.
    pub fn clear(&self) {
        let (entries, loading) = {
            let mut state = self.state.borrow_mut();
            (
                std::mem::take(&mut state.entries),
                std::mem::take(&mut state.loading),
            )
        };

        for (path, entry) in entries {
            if entry.refs > 0 {
                debug!("Clearing '{}' with {} live reference(s)", path, entry.refs);
            }
            self.provider.release(&entry.asset);
        }
        drop(loading);
    }

    //--- Query API --------------------------------------------------------

    /// Reference count of a resident entry.
    pub fn ref_count(&self, path: &str) -> Option<usize> {
        self.state.borrow().entries.get(path).map(|entry| entry.refs)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.state.borrow().entries.contains_key(path)
    }

    pub fn is_loading(&self, path: &str) -> bool {
        self.state.borrow().loading.contains_key(path)
    }

    /// Number of resident entries.
    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.state.borrow().capacity
    }
}

//=== Waiter ==============================================================

/// One caller's stake in an in-flight load. Rolls its reference back if
/// the caller goes away before observing the result.
struct Waiter {
    cache: Weak<RefCell<CacheState>>,
    path: String,
    id: u64,
    settled: bool,
}

impl Drop for Waiter {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let Some(state) = self.cache.upgrade() else {
            return;
        };
        let Ok(mut guard) = state.try_borrow_mut() else {
            warn!("Asset cache busy while dropping a waiter for '{}'", self.path);
            return;
        };
        let state = &mut *guard;

        let abandoned = match state.loading.get_mut(&self.path) {
            Some(in_flight) if in_flight.id == self.id => {
                in_flight.waiters = in_flight.waiters.saturating_sub(1);
                if in_flight.waiters == 0 {
                    debug!("Cancelling load of '{}', no waiters left", self.path);
                    state.loading.remove(&self.path)
                } else {
                    None
                }
            }
            _ => {
                // The load finished and counted this waiter; give it back.
                if let Some(entry) = state.entries.get_mut(&self.path) {
                    if entry.load_id == self.id {
                        entry.refs = entry.refs.saturating_sub(1);
                    }
                }
                None
            }
        };

        drop(guard);
        drop(abandoned);
    }
}

//=== Tests ===============================================================
