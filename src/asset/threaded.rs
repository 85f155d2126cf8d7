//=========================================================================
// Threaded Provider
//=========================================================================
//
// Runs a blocking loader on a pool of worker threads.
//
// Architecture:
// ```text
//  Main Timeline:                    Worker Threads:
//  ┌──────────────────────────┐     ┌───────────────────────┐
//  │  load(path)              │     │  recv() job           │
//  │   ├─ oneshot::channel    │     │   ├─ reply dropped?   │
//  │   └─ try_send(Job) ──────┼────>│   │    → skip          │
//  │                          │     │   └─ load_blocking()   │
//  │  await reply  <──────────┼─────┼──── reply.send()       │
//  └──────────────────────────┘     └───────────────────────┘
// ```
//
// Workers never touch cache or window state. Results are handed back
// through the oneshot, so they are observed on the main timeline only.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::any::Any;
use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use futures::channel::oneshot;
use futures::future::{FutureExt, LocalBoxFuture};
use log::{debug, info, warn};

//=== Internal Dependencies ===============================================

use super::{Asset, AssetProvider, ProviderError};

//=== BlockingLoader ======================================================

/// Synchronous loader executed on worker threads.
pub trait BlockingLoader: Send + Sync + 'static {
    /// Reads the resource at `path`. Runs off the main timeline.
    fn load_blocking(&self, path: &str) -> Result<Arc<dyn Any + Send + Sync>, String>;

    /// Frees a previously loaded resource. Runs on the main timeline.
    fn unload(&self, _asset: &Asset) {}
}

//=== Job =================================================================

struct Job {
    path: String,
    reply: oneshot::Sender<Result<Asset, ProviderError>>,
}

//=== ThreadedProviderBuilder =============================================

/// Builder for [`ThreadedProvider`].
///
/// # Default Values
///
/// - **Workers**: 2
/// - **Channel capacity**: 128 pending requests
pub struct ThreadedProviderBuilder<L: BlockingLoader> {
    loader: L,
    workers: usize,
    channel_capacity: usize,
}

impl<L: BlockingLoader> ThreadedProviderBuilder<L> {
    /// Sets the number of worker threads. Clamped to at least one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Sets how many requests may wait for a worker before `load` fails
    /// fast instead of queueing.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }

    /// Spawns the workers.
    pub fn build(self) -> io::Result<ThreadedProvider<L>> {
        let loader = Arc::new(self.loader);
        let (jobs, receiver) = bounded::<Job>(self.channel_capacity);

        let mut workers = Vec::with_capacity(self.workers);
        for index in 0..self.workers {
            workers.push(spawn_worker(index, Arc::clone(&loader), receiver.clone())?);
        }

        Ok(ThreadedProvider {
            loader,
            jobs: Some(jobs),
            workers,
        })
    }
}

//=== ThreadedProvider ====================================================

/// [`AssetProvider`] backed by worker threads running a [`BlockingLoader`].
pub struct ThreadedProvider<L: BlockingLoader> {
    loader: Arc<L>,
    jobs: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl<L: BlockingLoader> ThreadedProvider<L> {
    /// Starts configuring a provider around `loader`.
    pub fn builder(loader: L) -> ThreadedProviderBuilder<L> {
        ThreadedProviderBuilder {
            loader,
            workers: 2,
            channel_capacity: 128,
        }
    }

    /// Number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

impl<L: BlockingLoader> AssetProvider for ThreadedProvider<L> {
    fn load(&self, path: &str) -> LocalBoxFuture<'static, Result<Asset, ProviderError>> {
        let (reply, result) = oneshot::channel();
        let job = Job {
            path: path.to_string(),
            reply,
        };

        let queued = match &self.jobs {
            Some(jobs) => jobs.try_send(job).map_err(|err| match err {
                TrySendError::Full(_) => ProviderError("asset request queue is full".into()),
                TrySendError::Disconnected(_) => {
                    ProviderError("asset workers have stopped".into())
                }
            }),
            None => Err(ProviderError("asset workers have stopped".into())),
        };

        async move {
            queued?;
            match result.await {
                Ok(result) => result,
                Err(oneshot::Canceled) => {
                    Err(ProviderError("asset worker dropped the request".into()))
                }
            }
        }
        .boxed_local()
    }

    fn release(&self, asset: &Asset) {
        self.loader.unload(asset);
    }
}

impl<L: BlockingLoader> Drop for ThreadedProvider<L> {
    fn drop(&mut self) {
        // Closing the sender ends every worker's recv loop.
        self.jobs = None;

        for worker in self.workers.drain(..) {
            if worker.join().is_err() {
                warn!("Asset worker panicked during shutdown");
            }
        }
    }
}

//=== Worker ==============================================================

fn spawn_worker<L: BlockingLoader>(
    index: usize,
    loader: Arc<L>,
    jobs: Receiver<Job>,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("asset-worker-{}", index))
        .spawn(move || {
            info!("Asset worker {} started", index);

            while let Ok(job) = jobs.recv() {
                if job.reply.is_canceled() {
                    debug!("Skipping cancelled load of '{}'", job.path);
                    continue;
                }

                let result = loader
                    .load_blocking(&job.path)
                    .map(|payload| Asset::from_shared(&job.path, payload))
                    .map_err(ProviderError);

                // Requester went away while we were loading.
                if let Err(Ok(asset)) = job.reply.send(result) {
                    debug!("Discarding unclaimed load of '{}'", job.path);
                    loader.unload(&asset);
                }
            }

            info!("Asset worker {} exiting", index);
        })
}

//=== Tests ===============================================================

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct LengthLoader {
        unloaded: Arc<AtomicUsize>,
    }

    impl BlockingLoader for LengthLoader {
        fn load_blocking(&self, path: &str) -> Result<Arc<dyn Any + Send + Sync>, String> {
            if path.starts_with("missing/") {
                return Err(format!("no such asset: {}", path));
            }
            Ok(Arc::new(path.len()))
        }

        fn unload(&self, _asset: &Asset) {
            self.unloaded.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn provider() -> (ThreadedProvider<LengthLoader>, Arc<AtomicUsize>) {
        let unloaded = Arc::new(AtomicUsize::new(0));
        let provider = ThreadedProvider::builder(LengthLoader {
            unloaded: unloaded.clone(),
        })
        .with_workers(2)
        .build()
        .unwrap();
        (provider, unloaded)
    }

    #[test]
    fn builder_clamps_worker_count() {
        let provider = ThreadedProvider::builder(LengthLoader {
            unloaded: Arc::new(AtomicUsize::new(0)),
        })
        .with_workers(0)
        .build()
        .unwrap();

        assert_eq!(provider.worker_count(), 1);
    }

    #[test]
    fn load_runs_on_worker_and_returns_payload() {
        let (provider, _) = provider();

        let asset = block_on(provider.load("ui/main")).unwrap();

        assert_eq!(asset.path(), "ui/main");
        assert_eq!(asset.downcast_ref::<usize>(), Some(&7));
    }

    #[test]
    fn loader_errors_become_provider_errors() {
        let (provider, _) = provider();

        let err = block_on(provider.load("missing/panel")).unwrap_err();

        assert_eq!(err.0, "no such asset: missing/panel");
    }

    #[test]
    fn release_unloads_through_loader() {
        let (provider, unloaded) = provider();

        let asset = block_on(provider.load("ui/main")).unwrap();
        provider.release(&asset);

        assert_eq!(unloaded.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_joins_workers() {
        let (provider, _) = provider();
        block_on(provider.load("ui/a")).unwrap();

        // Must not hang.
        drop(provider);
    }
}
