//! Single-flight memoizing cache.
//!
//! Deduplicates concurrent identical computations: the first caller for a
//! key starts the work, every concurrent caller for the same key awaits
//! that one execution, and the resolved value is retained (bounded by LRU)
//! for later hits. Failures are delivered verbatim to every waiter of the
//! flight and are never cached.
//!
//! The map lock is held only for lookup and slot surgery, never across an
//! await. Computations run in their own spawned task, so a waiter that is
//! cancelled mid-flight detaches without stalling the flight or depriving
//! the remaining waiters of the result.

pub mod key;

use crate::error::{BridgeError, CacheError};
use futures::future::Shared;
use futures::FutureExt as _;
use lru::LruCache;
use parking_lot::Mutex;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::num::NonZeroUsize;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

/// Future shared by every waiter of one in-flight computation.
type FlightFuture<V, E> =
    Shared<Pin<Box<dyn Future<Output = Result<V, CacheError<E>>> + Send>>>;

/// One cache slot.
enum Slot<V, E> {
    /// Computation in flight, or finished but not yet promoted. The
    /// generation ties promotion and removal to this exact flight, so a
    /// slot re-created after invalidation is never torn down by a stale
    /// completion.
    InFlight {
        generation: u64,
        flight: FlightFuture<V, E>,
    },
    /// Resolved value.
    Ready(V),
}

/// What the locked lookup phase found.
enum Lookup<V, E> {
    /// Ready value available now.
    Ready(V),
    /// A finished flight whose waiters were all cancelled before any of
    /// them could settle the slot.
    Abandoned(Result<V, CacheError<E>>),
    /// Live flight to join.
    InFlight {
        generation: u64,
        flight: FlightFuture<V, E>,
    },
    /// No usable entry.
    Absent,
}

/// How a call proceeds once the lock is released.
enum Course<V, E> {
    Resolved(Result<V, CacheError<E>>),
    Join {
        generation: u64,
        flight: FlightFuture<V, E>,
    },
}

/// Statistics snapshot for a [`SingleFlightCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Calls served from an existing entry (ready or in flight).
    pub hits: u64,
    /// Calls that started a computation.
    pub misses: u64,
    /// Entries currently held, in flight included.
    pub entries: usize,
    /// Entries still computing.
    pub in_flight: usize,
    /// Configured capacity.
    pub capacity: usize,
}

/// Concurrency-deduplicating, LRU-bounded memoization map.
///
/// `K` is any hashable key ([`key::CacheKey`] is the ready-made choice for
/// argument tuples). `V` and `E` are the computation's value and error
/// types; both must be `Clone` because one execution fans out to every
/// concurrent waiter.
///
/// Construct instances explicitly and share them behind an `Arc`; separate
/// instances are fully independent.
pub struct SingleFlightCache<K, V, E> {
    entries: Mutex<LruCache<K, Slot<V, E>>>,
    next_generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V, E> SingleFlightCache<K, V, E>
where
    K: Hash + Eq + Clone + fmt::Debug + Send,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Creates a cache holding at most `capacity` entries.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            next_generation: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Returns the cached value for `key`, or runs `compute` to produce it.
    ///
    /// Concurrent calls for the same key share a single execution of
    /// `compute`; its result (value or error) is delivered to all of them.
    /// Successful values are cached until evicted or invalidated. Errors
    /// are returned to the waiters of that flight and nothing is cached, so
    /// the next call recomputes.
    ///
    /// Cancelling a caller (dropping the returned future) detaches only
    /// that caller; the computation runs to completion for everyone else.
    pub async fn get_or_compute<F, Fut>(&self, key: K, compute: F) -> Result<V, CacheError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let course = {
            let mut entries = self.entries.lock();

            // The borrow from get_mut must end before any slot surgery, so
            // the lookup produces owned data only. get_mut also marks the
            // entry most recently used, in-flight hits included.
            let lookup = match entries.get_mut(&key) {
                Some(Slot::Ready(value)) => Lookup::Ready(value.clone()),
                // The spawned task finishes even when every waiter left,
                // but the shared handle reports completion only once it is
                // polled there. Polling a clone settles a finished flight
                // on the spot; a live one stays pending and is joined below.
                Some(Slot::InFlight { generation, flight }) => {
                    match flight.clone().now_or_never() {
                        Some(result) => Lookup::Abandoned(result),
                        None => Lookup::InFlight {
                            generation: *generation,
                            flight: flight.clone(),
                        },
                    }
                }
                None => Lookup::Absent,
            };

            match lookup {
                Lookup::Ready(value) => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    Course::Resolved(Ok(value))
                }
                Lookup::Abandoned(Ok(value)) => {
                    // Settle what the departed waiters left behind, then
                    // serve it like any other hit.
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    entries.put(key.clone(), Slot::Ready(value.clone()));
                    Course::Resolved(Ok(value))
                }
                Lookup::Abandoned(Err(_)) => {
                    // A failed flight nobody cleaned up. Evict it and
                    // recompute rather than serving the stale failure.
                    entries.pop(&key);
                    self.start_flight(&mut entries, key.clone(), compute)
                }
                Lookup::InFlight { generation, flight } => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    Course::Join { generation, flight }
                }
                Lookup::Absent => self.start_flight(&mut entries, key.clone(), compute),
            }
        };

        match course {
            Course::Resolved(result) => result,
            Course::Join { generation, flight } => {
                self.join_flight(&key, generation, flight).await
            }
        }
    }

    /// Spawns a computation and installs its in-flight slot.
    ///
    /// Runs under the map lock: the check-then-insert must be atomic or two
    /// racing misses would both spawn. Everything here is synchronous;
    /// `compute()` only constructs the future, the work itself starts on the
    /// spawned task.
    fn start_flight<F, Fut>(
        &self,
        entries: &mut LruCache<K, Slot<V, E>>,
        key: K,
        compute: F,
    ) -> Course<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        self.misses.fetch_add(1, Ordering::Relaxed);
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        let handle = tokio::spawn(compute());
        let resolution: Pin<Box<dyn Future<Output = Result<V, CacheError<E>>> + Send>> =
            Box::pin(async move {
                match handle.await {
                    Ok(Ok(value)) => Ok(value),
                    Ok(Err(e)) => Err(CacheError::Computation(e)),
                    Err(join_err) => Err(CacheError::Bridge(BridgeError::from_join(join_err))),
                }
            });
        let flight = resolution.shared();

        let slot = Slot::InFlight {
            generation,
            flight: flight.clone(),
        };
        if let Some((evicted_key, _)) = entries.push(key, slot) {
            log::debug!("cache at capacity, evicted entry for {:?}", evicted_key);
        }

        Course::Join { generation, flight }
    }

    /// Awaits a flight and settles its slot.
    ///
    /// Promotion and removal are generation-checked: if the slot was
    /// invalidated, evicted, or replaced by a successor flight while this
    /// waiter was suspended, the map is left alone.
    async fn join_flight(
        &self,
        key: &K,
        generation: u64,
        flight: FlightFuture<V, E>,
    ) -> Result<V, CacheError<E>> {
        match flight.await {
            Ok(value) => {
                let mut entries = self.entries.lock();
                if let Some(slot) = entries.peek_mut(key) {
                    let same_flight = matches!(
                        slot,
                        Slot::InFlight { generation: g, .. } if *g == generation
                    );
                    if same_flight {
                        *slot = Slot::Ready(value.clone());
                    }
                }
                Ok(value)
            }
            Err(error) => {
                let mut entries = self.entries.lock();
                let same_flight = matches!(
                    entries.peek(key),
                    Some(Slot::InFlight { generation: g, .. }) if *g == generation
                );
                if same_flight {
                    entries.pop(key);
                }
                Err(error)
            }
        }
    }

    /// Removes an entry immediately. Returns true when one was present.
    ///
    /// Removing an in-flight entry does not cancel the computation: current
    /// waiters still receive their result, but it will not be cached, and
    /// the next lookup recomputes.
    pub fn invalidate(&self, key: &K) -> bool {
        self.entries.lock().pop(key).is_some()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Number of entries currently held, in flight included.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Configured capacity.
    pub fn capacity(&self) -> usize {
        self.entries.lock().cap().get()
    }

    /// Point-in-time counters and occupancy.
    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.lock();
        let in_flight = entries
            .iter()
            .filter(|(_, slot)| matches!(slot, Slot::InFlight { .. }))
            .count();
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: entries.len(),
            in_flight,
            capacity: entries.cap().get(),
        }
    }
}
