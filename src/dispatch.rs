//! Spawning workers under resource pressure.
//!
//! When the OS refuses a new thread the loop first reclaims finished workers
//! without blocking and retries. If nothing could be reclaimed it backs off
//! exponentially, and once `max_attempts` spawns have failed in a row it
//! blocks on the oldest outstanding worker, which always makes progress. With
//! no outstanding workers at all there is nothing left to wait for, so the
//! spawn error is returned.

use std::io;
use std::thread;
use std::time::Duration;

use log::{debug, warn};

use crate::error::{BlurError, Result};
use crate::pool::{WorkerHandle, WorkerId, WorkerPool};

/// How hard to retry a failed spawn before escalating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnPolicy {
    /// Consecutive failed spawns tolerated before blocking on the oldest worker.
    pub max_attempts: u32,
    /// First sleep after a failed spawn that reclaimed nothing.
    pub initial_backoff: Duration,
    /// Upper bound for the doubling backoff.
    pub max_backoff: Duration,
    /// Cap on live workers; `None` lets the pool grow freely.
    pub max_in_flight: Option<usize>,
}

impl Default for SpawnPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 64,
            initial_backoff: Duration::from_micros(50),
            max_backoff: Duration::from_millis(20),
            max_in_flight: None,
        }
    }
}

impl SpawnPolicy {
    pub fn with_max_in_flight(mut self, limit: usize) -> Self {
        self.max_in_flight = (limit > 0).then_some(limit);
        self
    }
}

/// What the spawn loop had to do across one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    /// Spawn attempts the OS refused.
    pub failures: usize,
    /// Workers released by non-blocking reclamation.
    pub reclaimed: usize,
    /// Times the loop blocked on the oldest worker.
    pub forced_joins: usize,
}

/// Spawns one worker through `try_spawn` and tracks it in `pool`.
///
/// `try_spawn` is called again on every retry, so it must rebuild the job
/// each time.
pub fn spawn_with_retry<H, F>(
    pool: &mut WorkerPool<H>,
    policy: &SpawnPolicy,
    report: &mut SpawnReport,
    mut try_spawn: F,
) -> Result<WorkerId>
where
    H: WorkerHandle,
    F: FnMut() -> io::Result<H>,
{
    if let Some(limit) = policy.max_in_flight {
        while pool.len() >= limit.max(1) {
            let reclaimed = pool.try_reclaim()?;
            report.reclaimed += reclaimed;
            if reclaimed == 0 {
                pool.join_oldest()?;
                report.forced_joins += 1;
            }
        }
    }

    let max_attempts = policy.max_attempts.max(1);
    let mut attempts = 0;
    let mut backoff = policy.initial_backoff;

    loop {
        let err = match try_spawn() {
            Ok(handle) => return Ok(pool.append(handle)),
            Err(err) => err,
        };
        attempts += 1;
        report.failures += 1;
        debug!("spawn failed ({err}), attempt {attempts}, {} workers live", pool.len());

        let reclaimed = pool.try_reclaim()?;
        report.reclaimed += reclaimed;
        if reclaimed > 0 {
            continue;
        }

        if attempts >= max_attempts {
            if pool.is_empty() {
                return Err(BlurError::Spawn {
                    attempts,
                    source: err,
                });
            }
            warn!(
                "spawn failed {attempts} times with nothing reclaimable, waiting on oldest of {} workers",
                pool.len()
            );
            pool.join_oldest()?;
            report.forced_joins += 1;
            attempts = 0;
            backoff = policy.initial_backoff;
            continue;
        }

        thread::sleep(backoff);
        backoff = (backoff * 2).min(policy.max_backoff);
    }
}
