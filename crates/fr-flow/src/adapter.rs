//! Per-run flow cache in front of a [`FlowOracle`].
//!
//! # Lifetime
//!
//! One `FlowAdapter` serves exactly one planning run and is dropped with it.
//! Flow is time-varying, so estimates are never carried across runs.
//!
//! # Concurrency
//!
//! The cache is a `RwLock<FxHashMap>`.  Lookups take the read lock; misses
//! query the oracle *without* holding any lock and then insert.  Two threads
//! missing on the same key may both ask the oracle; the last insert wins,
//! which is harmless because estimates for a fixed key are deterministic.
//!
//! # Timeouts
//!
//! The configured timeout bounds one sensor query.  Each oracle call runs on
//! a helper thread, and a batch of `n` sensors is given `n × timeout` since
//! the default [`FlowOracle::estimate_batch`] asks for them one at a time.
//! A call that does not finish in time fails with [`FlowError::Timeout`]
//! carrying the deadline that was applied.  The helper thread is detached
//! and its late answer is discarded.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use rustc_hash::FxHashMap;

use fr_core::{SensorId, TimePoint};

use crate::{FlowError, FlowOracle, FlowResult};

/// Caching, validating, optionally time-bounded view of a [`FlowOracle`].
pub struct FlowAdapter {
    oracle:  Arc<dyn FlowOracle>,
    timeout: Option<Duration>,
    cache:   RwLock<FxHashMap<(SensorId, TimePoint), f64>>,
    /// `(sensor, time)` pairs sent to the oracle so far.
    queried: AtomicUsize,
}

impl FlowAdapter {
    /// Wrap `oracle` with an empty cache and no timeout.
    pub fn new(oracle: Arc<dyn FlowOracle>) -> Self {
        Self {
            oracle,
            timeout: None,
            cache:   RwLock::new(FxHashMap::default()),
            queried: AtomicUsize::new(0),
        }
    }

    /// Bound each sensor query by `timeout` (`None` waits indefinitely).
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    // ── Lookups ───────────────────────────────────────────────────────────

    /// Flow at `sensor` at `time`, from cache or the oracle.
    ///
    /// Fails with `InvalidFlow` if the oracle answers with a negative or
    /// non-finite value, and passes any oracle error through unchanged.
    pub fn estimate(&self, sensor: SensorId, time: TimePoint) -> FlowResult<f64> {
        if let Some(v) = self.cached(sensor, time) {
            return Ok(v);
        }
        let values = self.query(&[sensor], time)?;
        let v = values[0];
        self.store(&[sensor], &values, time);
        Ok(v)
    }

    /// Fill the cache for every sensor in `sensors` at `time`.
    ///
    /// Only cache misses are sent to the oracle, deduplicated and in
    /// chunks of at most `batch_size` (a zero batch size is treated as 1).
    /// Returns the number of sensors that were queried.
    pub fn prefetch(&self, sensors: &[SensorId], time: TimePoint, batch_size: usize) -> FlowResult<usize> {
        let mut missing: Vec<SensorId> = {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            sensors
                .iter()
                .copied()
                .filter(|&s| !cache.contains_key(&(s, time)))
                .collect()
        };
        missing.sort_unstable();
        missing.dedup();

        for chunk in missing.chunks(batch_size.max(1)) {
            let values = self.query(chunk, time)?;
            self.store(chunk, &values, time);
            log::debug!("prefetched {} flow estimates at {time}", chunk.len());
        }
        Ok(missing.len())
    }

    /// The cached value for `(sensor, time)`, if any.
    pub fn cached(&self, sensor: SensorId, time: TimePoint) -> Option<f64> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(sensor, time))
            .copied()
    }

    // ── Counters ──────────────────────────────────────────────────────────

    /// Total `(sensor, time)` pairs sent to the oracle by this adapter.
    pub fn oracle_queries(&self) -> usize {
        self.queried.load(Ordering::Relaxed)
    }

    /// Number of cached estimates.
    pub fn cached_len(&self) -> usize {
        self.cache.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    // ── Internals ─────────────────────────────────────────────────────────

    fn store(&self, sensors: &[SensorId], values: &[f64], time: TimePoint) {
        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        for (&s, &v) in sensors.iter().zip(values) {
            cache.insert((s, time), v);
        }
    }

    /// Ask the oracle for `sensors` and validate the answer.
    fn query(&self, sensors: &[SensorId], time: TimePoint) -> FlowResult<Vec<f64>> {
        self.queried.fetch_add(sensors.len(), Ordering::Relaxed);

        let values = match self.timeout {
            None => self.oracle.estimate_batch(sensors, time)?,
            Some(timeout) => {
                let deadline = batch_deadline(timeout, sensors.len());
                call_with_timeout(Arc::clone(&self.oracle), sensors.to_vec(), time, deadline)?
            }
        };

        if values.len() != sensors.len() {
            return Err(FlowError::BatchSizeMismatch { expected: sensors.len(), got: values.len() });
        }
        for (&sensor, &value) in sensors.iter().zip(&values) {
            if !value.is_finite() || value < 0.0 {
                log::warn!("rejecting flow {value} for sensor {sensor} at {time}");
                return Err(FlowError::InvalidFlow { sensor, time, value });
            }
        }
        Ok(values)
    }
}

/// Deadline for a batch of `len` sensors, each allowed `per_query`.
fn batch_deadline(per_query: Duration, len: usize) -> Duration {
    let n = u32::try_from(len.max(1)).unwrap_or(u32::MAX);
    per_query.saturating_mul(n)
}

/// Run one batch query on a helper thread and wait at most `timeout`.
fn call_with_timeout(
    oracle:  Arc<dyn FlowOracle>,
    sensors: Vec<SensorId>,
    time:    TimePoint,
    timeout: Duration,
) -> FlowResult<Vec<f64>> {
    let (tx, rx) = mpsc::channel();
    std::thread::Builder::new()
        .name("flow-oracle".into())
        .spawn(move || {
            // The receiver is gone if the caller already timed out.
            let _ = tx.send(oracle.estimate_batch(&sensors, time));
        })?;

    match rx.recv_timeout(timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            log::warn!("flow oracle timed out after {timeout:?} at {time}");
            Err(FlowError::Timeout { time, timeout })
        }
        Err(RecvTimeoutError::Disconnected) => Err(FlowError::WorkerLost { time }),
    }
}
