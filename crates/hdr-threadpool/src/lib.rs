//! Thread pool abstraction used by the tone pipeline and the resamplers.
//!
//! Work is partitioned with [`ThreadPool::split_range`], which depends only on the range and the
//! number of threads of the pool, so callers get a deterministic partition regardless of how the
//! workers are scheduled.
use std::ops::Range;

#[derive(Debug, Clone)]
pub struct ThreadPool(ThreadPoolImpl);

#[derive(Debug, Clone)]
enum ThreadPoolImpl {
    #[cfg(feature = "rayon")]
    Rayon(std::sync::Arc<rayon_core::ThreadPool>),
    None,
}

#[derive(Debug, Copy, Clone)]
pub struct Scope<'r, 'scope>(ScopeInner<'r, 'scope>);

#[derive(Debug, Copy, Clone)]
enum ScopeInner<'r, 'scope> {
    #[cfg(feature = "rayon")]
    Rayon(&'r rayon_core::Scope<'scope>),
    None(std::marker::PhantomData<&'r &'scope ()>),
}

#[cfg(feature = "rayon")]
impl Default for ThreadPool {
    fn default() -> Self {
        let num_threads = std::thread::available_parallelism();
        let num_threads = match num_threads {
            Ok(num_threads) => num_threads.into(),
            Err(e) => {
                tracing::warn!(%e, "Failed to query available parallelism; falling back to single-threaded");
                return Self::none();
            }
        };

        Self::with_num_threads(num_threads)
    }
}

#[cfg(not(feature = "rayon"))]
impl Default for ThreadPool {
    fn default() -> Self {
        tracing::debug!("Not built with multithread support");
        Self::none()
    }
}

impl ThreadPool {
    /// Creates a "pool" which runs every job on the calling thread.
    pub const fn none() -> Self {
        Self(ThreadPoolImpl::None)
    }

    /// Creates a Rayon thread pool with the given number of workers.
    ///
    /// Falls back to single-threaded operation if the pool cannot be built.
    #[cfg(feature = "rayon")]
    pub fn with_num_threads(num_threads: usize) -> Self {
        let inner = rayon_core::ThreadPoolBuilder::new()
            .num_threads(num_threads.max(1))
            .build()
            .map(|pool| ThreadPoolImpl::Rayon(std::sync::Arc::new(pool)));

        match inner {
            Ok(inner) => {
                tracing::debug!(num_threads, "Initialized Rayon thread pool");
                Self(inner)
            }
            Err(e) => {
                tracing::warn!(%e, "Failed to initialize thread pool; falling back to single-threaded");
                Self::none()
            }
        }
    }

    #[cfg(feature = "rayon")]
    pub fn rayon(pool: std::sync::Arc<rayon_core::ThreadPool>) -> Self {
        Self(ThreadPoolImpl::Rayon(pool))
    }

    pub fn is_multithreaded(&self) -> bool {
        match self.0 {
            #[cfg(feature = "rayon")]
            ThreadPoolImpl::Rayon(_) => true,
            ThreadPoolImpl::None => false,
        }
    }

    /// Number of workers, which is also the number of chunks [`split_range`](Self::split_range)
    /// produces. Always at least one.
    pub fn num_threads(&self) -> usize {
        match &self.0 {
            #[cfg(feature = "rayon")]
            ThreadPoolImpl::Rayon(pool) => pool.current_num_threads().max(1),
            ThreadPoolImpl::None => 1,
        }
    }
}

impl ThreadPool {
    pub fn scope<'scope, R: Send>(
        &'scope self,
        op: impl for<'r> FnOnce(Scope<'r, 'scope>) -> R + Send,
    ) -> R {
        match &self.0 {
            #[cfg(feature = "rayon")]
            ThreadPoolImpl::Rayon(pool) => pool.scope(|scope| {
                let scope = Scope(ScopeInner::Rayon(scope));
                op(scope)
            }),
            ThreadPoolImpl::None => op(Scope(ScopeInner::None(Default::default()))),
        }
    }

    /// Partitions `from..to` into at most `num_threads()` contiguous chunks of equal length
    /// (the last one may be shorter). Empty chunks are omitted.
    pub fn split_range(&self, from: usize, to: usize) -> Vec<Range<usize>> {
        split_range(from, to, self.num_threads())
    }

    /// Runs `body` for every index in `from..to`.
    ///
    /// The range is split with [`split_range`](Self::split_range), one job is spawned per chunk,
    /// and indices inside a chunk are visited in ascending order. Returns after every job has
    /// finished.
    pub fn parallel(&self, from: usize, to: usize, body: impl Fn(usize) + Sync) {
        let chunks = self.split_range(from, to);
        if chunks.len() <= 1 {
            for idx in from..to {
                body(idx);
            }
            return;
        }

        let body = &body;
        self.scope(|scope| {
            for chunk in chunks {
                scope.spawn(move |_| {
                    for idx in chunk {
                        body(idx);
                    }
                });
            }
        });
    }

    /// Runs `f` on every item, one job per item, and waits for all of them.
    pub fn for_each_mut_slice<T: Send>(&self, items: &mut [T], f: impl Fn(&mut T) + Sync) {
        if items.len() <= 1 || !self.is_multithreaded() {
            items.iter_mut().for_each(f);
            return;
        }

        let f = &f;
        self.scope(|scope| {
            for item in items {
                scope.spawn(move |_| f(item));
            }
        });
    }
}

impl<'scope> Scope<'_, 'scope> {
    pub fn spawn(&self, op: impl for<'r> FnOnce(Scope<'r, 'scope>) + Send + 'scope) {
        match self.0 {
            #[cfg(feature = "rayon")]
            ScopeInner::Rayon(scope) => scope.spawn(|scope| {
                let scope = Scope(ScopeInner::Rayon(scope));
                op(scope)
            }),
            ScopeInner::None(_) => op(Scope(ScopeInner::None(Default::default()))),
        }
    }
}

fn split_range(from: usize, to: usize, num_chunks: usize) -> Vec<Range<usize>> {
    if from >= to {
        return Vec::new();
    }

    let len = to - from;
    let chunk_len = len.div_ceil(num_chunks.max(1));
    (from..to)
        .step_by(chunk_len)
        .map(|start| start..(start + chunk_len).min(to))
        .collect()
}
