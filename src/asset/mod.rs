//=========================================================================
// Asset System
//=========================================================================
//
// Reference-counted access to renderable resources.
//
// Architecture:
//   AssetCache
//     ├─ entries: HashMap<path, Entry { asset, refs, last_access }>
//     ├─ loading: HashMap<path, InFlight { Shared<load>, waiters }>
//     └─ provider: Rc<dyn AssetProvider>
//
// Flow:
//   load(path) → hit? refs += 1
//              → in flight? join
//              → provider.load(path) → entry { refs = waiters }
//
//=========================================================================

//=== Module Declarations =================================================

mod cache;
mod threaded;

//=== External Dependencies ===============================================

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use futures::future::LocalBoxFuture;
use thiserror::Error;

//=== Public API ==========================================================

pub use cache::AssetCache;
pub use threaded::{BlockingLoader, ThreadedProvider, ThreadedProviderBuilder};

//=== Asset ===============================================================

/// Opaque handle to a loaded resource.
///
/// Cloning is cheap and does not touch reference counts; counts are kept
/// by [`AssetCache`], not by the handle.
#[derive(Clone)]
pub struct Asset {
    path: Arc<str>,
    payload: Arc<dyn Any + Send + Sync>,
}

impl Asset {
    pub fn new<T: Any + Send + Sync>(path: &str, payload: T) -> Self {
        Self {
            path: Arc::from(path),
            payload: Arc::new(payload),
        }
    }

    pub(crate) fn from_shared(path: &str, payload: Arc<dyn Any + Send + Sync>) -> Self {
        Self {
            path: Arc::from(path),
            payload,
        }
    }

    /// Logical path the asset was loaded from.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Typed view of the payload.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.payload.downcast_ref::<T>()
    }

    /// True when both handles refer to the same loaded payload.
    pub fn same_as(&self, other: &Asset) -> bool {
        Arc::ptr_eq(&self.payload, &other.payload)
    }
}

impl fmt::Debug for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Asset").field("path", &self.path).finish_non_exhaustive()
    }
}

//=== AssetProvider =======================================================

/// Provider-side load failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ProviderError(pub String);

/// External resource provider the cache sits on.
///
/// `load` may suspend; dropping the returned future before it completes
/// is the cancellation signal. `release` is called exactly once for every
/// asset the cache evicts or force-releases.
pub trait AssetProvider {
    fn load(&self, path: &str) -> LocalBoxFuture<'static, Result<Asset, ProviderError>>;

    fn release(&self, asset: &Asset);
}
