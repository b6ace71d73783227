//! Blur passes: one entry point per partitioning strategy.
//!
//! A parallel pass freezes the caller's picture as a read-only snapshot,
//! copies the border ring into a [`SharedCanvas`], and spawns one scoped
//! worker per work unit. Workers read only the snapshot and write only their
//! own region of the canvas. The picture is replaced only after every worker
//! has been drained; on any failure it is left untouched.

use std::io;
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::{Duration, Instant};

use log::debug;

use crate::canvas::SharedCanvas;
use crate::dispatch::{spawn_with_retry, SpawnPolicy, SpawnReport};
use crate::error::{BlurError, Result};
use crate::kernel::blur_pixel;
use crate::picture::Picture;
use crate::pool::WorkerPool;
use crate::region::Region;
use crate::strategy::Strategy;

/// Summary of one completed pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassStats {
    pub strategy: Strategy,
    /// Work units issued.
    pub units: usize,
    pub spawn: SpawnReport,
    pub elapsed: Duration,
}

/// Blurs `picture` in place with `strategy`.
///
/// Every strategy produces the same pixels; they differ only in how the work
/// is spread over threads.
pub fn blur(picture: &mut Picture, strategy: Strategy, policy: &SpawnPolicy) -> Result<PassStats> {
    let started = Instant::now();
    let (width, height) = picture.dimensions();
    debug!("{strategy} blur of {width}x{height} picture starting");

    let (units, spawn) = match strategy {
        Strategy::Sequential => (sequential_pass(picture), SpawnReport::default()),
        _ => parallel_pass(picture, strategy, policy)?,
    };

    let stats = PassStats {
        strategy,
        units,
        spawn,
        elapsed: started.elapsed(),
    };
    debug!(
        "{strategy} blur finished: {units} units, {} spawn failures, {} reclaimed, {:?}",
        spawn.failures, spawn.reclaimed, stats.elapsed
    );
    Ok(stats)
}

/// Blurs in a single thread.
pub fn sequential_blur(picture: &mut Picture) {
    sequential_pass(picture);
}

/// Blurs with one worker per interior pixel.
pub fn pixel_blur(picture: &mut Picture) -> Result<PassStats> {
    blur(picture, Strategy::Pixel, &SpawnPolicy::default())
}

/// Blurs with one worker per interior row.
pub fn row_blur(picture: &mut Picture) -> Result<PassStats> {
    blur(picture, Strategy::Row, &SpawnPolicy::default())
}

/// Blurs with one worker per interior column.
pub fn column_blur(picture: &mut Picture) -> Result<PassStats> {
    blur(picture, Strategy::Column, &SpawnPolicy::default())
}

/// Blurs with one worker per quadrant.
pub fn quadrant_blur(picture: &mut Picture) -> Result<PassStats> {
    blur(picture, Strategy::Quadrant, &SpawnPolicy::default())
}

fn sequential_pass(picture: &mut Picture) -> usize {
    let (width, height) = picture.dimensions();
    let source = &*picture;
    let blurred = Picture::from_fn(width, height, |x, y| {
        if source.is_border(x, y) {
            source.get_pixel(x, y)
        } else {
            blur_pixel(source, x, y)
        }
    });
    *picture = blurred;
    Strategy::Sequential.regions(width, height).count()
}

/// Starts one worker inside the scope of a pass.
trait Spawner {
    fn spawn<'scope, 'env, F>(
        &mut self,
        scope: &'scope Scope<'scope, 'env>,
        builder: thread::Builder,
        job: F,
    ) -> io::Result<ScopedJoinHandle<'scope, ()>>
    where
        F: FnOnce() + Send + 'scope;
}

/// Plain OS threads.
struct OsThreads;

impl Spawner for OsThreads {
    fn spawn<'scope, 'env, F>(
        &mut self,
        scope: &'scope Scope<'scope, 'env>,
        builder: thread::Builder,
        job: F,
    ) -> io::Result<ScopedJoinHandle<'scope, ()>>
    where
        F: FnOnce() + Send + 'scope,
    {
        builder.spawn_scoped(scope, job)
    }
}

fn parallel_pass(
    picture: &mut Picture,
    strategy: Strategy,
    policy: &SpawnPolicy,
) -> Result<(usize, SpawnReport)> {
    parallel_pass_with(picture, strategy, policy, &mut OsThreads)
}

fn parallel_pass_with(
    picture: &mut Picture,
    strategy: Strategy,
    policy: &SpawnPolicy,
    spawner: &mut impl Spawner,
) -> Result<(usize, SpawnReport)> {
    let snapshot = picture.clone();
    let canvas = SharedCanvas::from_borders(&snapshot);
    let mut report = SpawnReport::default();

    let units = thread::scope(|scope| {
        let mut pool = WorkerPool::new();
        let dispatched = dispatch(
            scope,
            &mut pool,
            spawner,
            strategy,
            (&snapshot, &canvas),
            policy,
            &mut report,
        );
        // Drain even when dispatch failed, so no worker outlives the pass.
        let drained = pool.drain_all();
        let units = dispatched?;
        drained?;
        Ok::<_, BlurError>(units)
    })?;

    *picture = canvas.into_picture();
    Ok((units, report))
}

fn dispatch<'scope, 'env>(
    scope: &'scope Scope<'scope, 'env>,
    pool: &mut WorkerPool<ScopedJoinHandle<'scope, ()>>,
    spawner: &mut impl Spawner,
    strategy: Strategy,
    (snapshot, canvas): (&'env Picture, &'env SharedCanvas),
    policy: &SpawnPolicy,
    report: &mut SpawnReport,
) -> Result<usize> {
    let (width, height) = snapshot.dimensions();
    let mut units = 0;

    for region in strategy.regions(width, height) {
        let name = format!("blur-{strategy}-{units}");
        spawn_with_retry(pool, policy, report, || {
            let builder = thread::Builder::new().name(name.clone());
            spawner.spawn(scope, builder, move || blur_region(snapshot, canvas, region))
        })?;
        units += 1;
    }
    Ok(units)
}

fn blur_region(snapshot: &Picture, canvas: &SharedCanvas, region: Region) {
    for (x, y) in region.coords() {
        canvas.write(x, y, blur_pixel(snapshot, x, y));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::picture::Pixel;

    fn gradient(width: usize, height: usize) -> Picture {
        Picture::from_fn(width, height, |x, y| {
            Pixel::new(
                ((x * 37 + y * 11) % 256) as u8,
                ((x * y * 7) % 256) as u8,
                ((255 - x * 5 - y * 3) % 256) as u8,
            )
        })
    }

    #[test]
    fn test_strategies_agree() {
        let source = gradient(23, 17);
        let mut expected = source.clone();
        sequential_blur(&mut expected);

        for strategy in Strategy::ALL {
            let mut pic = source.clone();
            blur(&mut pic, strategy, &SpawnPolicy::default()).unwrap();
            assert_eq!(pic, expected, "{strategy}");
        }
    }

    #[test]
    fn test_stats_count_units() {
        let mut pic = gradient(6, 5);
        let stats = blur(&mut pic, Strategy::Row, &SpawnPolicy::default()).unwrap();
        assert_eq!(stats.strategy, Strategy::Row);
        assert_eq!(stats.units, 3);

        let stats = pixel_blur(&mut pic).unwrap();
        assert_eq!(stats.units, 4 * 3);

        assert_eq!(column_blur(&mut pic).unwrap().units, 4);
        assert_eq!(quadrant_blur(&mut pic).unwrap().units, 4);
        assert_eq!(row_blur(&mut pic).unwrap().units, 3);
    }

    #[test]
    fn test_sequential_matches_hand_computed() {
        let mut pic = Picture::from_fn(3, 3, |x, y| Pixel::gray((y * 3 + x) as u8 * 10));
        sequential_blur(&mut pic);
        // (0 + 10 + ... + 80) / 9 = 40
        assert_eq!(pic.get_pixel(1, 1), Pixel::gray(40));
        assert_eq!(pic.get_pixel(0, 0), Pixel::gray(0));
        assert_eq!(pic.get_pixel(2, 2), Pixel::gray(80));
    }

    #[test]
    fn test_tiny_pictures_are_unchanged() {
        for (w, h) in [(0, 0), (1, 1), (2, 2), (2, 5), (7, 1)] {
            let source = gradient(w, h);
            for strategy in Strategy::ALL {
                let mut pic = source.clone();
                let stats = blur(&mut pic, strategy, &SpawnPolicy::default()).unwrap();
                assert_eq!(pic, source, "{strategy} {w}x{h}");
                assert_eq!(stats.units, 0);
            }
        }
    }

    #[test]
    fn test_capped_in_flight_gives_same_result() {
        let source = gradient(12, 12);
        let mut expected = source.clone();
        sequential_blur(&mut expected);

        let policy = SpawnPolicy::default().with_max_in_flight(2);
        let mut pic = source.clone();
        blur(&mut pic, Strategy::Pixel, &policy).unwrap();
        assert_eq!(pic, expected);
    }

    #[test]
    fn test_workers_are_named() {
        let snapshot = gradient(5, 5);
        let canvas = SharedCanvas::from_borders(&snapshot);
        let mut report = SpawnReport::default();

        let names = thread::scope(|scope| {
            let mut pool = WorkerPool::new();
            dispatch(
                scope,
                &mut pool,
                &mut OsThreads,
                Strategy::Row,
                (&snapshot, &canvas),
                &SpawnPolicy::default(),
                &mut report,
            )
            .unwrap();
            let mut names = Vec::new();
            while let Some(handle) = pool.pop_oldest() {
                names.push(handle.thread().name().unwrap().to_string());
                handle.join().unwrap();
            }
            names
        });

        assert_eq!(names, vec!["blur-row-0", "blur-row-1", "blur-row-2"]);
    }

    /// Starts `remaining` workers, then reports the thread limit forever.
    struct FailAfter(usize);

    impl Spawner for FailAfter {
        fn spawn<'scope, 'env, F>(
            &mut self,
            scope: &'scope Scope<'scope, 'env>,
            builder: thread::Builder,
            job: F,
        ) -> io::Result<ScopedJoinHandle<'scope, ()>>
        where
            F: FnOnce() + Send + 'scope,
        {
            if self.0 == 0 {
                return Err(io::Error::new(io::ErrorKind::WouldBlock, "thread limit reached"));
            }
            self.0 -= 1;
            builder.spawn_scoped(scope, job)
        }
    }

    /// Replaces the job of the `n`th worker with a panic.
    struct PanicAt {
        n: usize,
        spawned: usize,
    }

    impl Spawner for PanicAt {
        fn spawn<'scope, 'env, F>(
            &mut self,
            scope: &'scope Scope<'scope, 'env>,
            builder: thread::Builder,
            job: F,
        ) -> io::Result<ScopedJoinHandle<'scope, ()>>
        where
            F: FnOnce() + Send + 'scope,
        {
            let doomed = self.spawned == self.n;
            self.spawned += 1;
            if doomed {
                builder.spawn_scoped(scope, || panic!("region job failed"))
            } else {
                builder.spawn_scoped(scope, job)
            }
        }
    }

    fn impatient() -> SpawnPolicy {
        SpawnPolicy {
            max_attempts: 1,
            initial_backoff: Duration::from_micros(1),
            max_backoff: Duration::from_micros(1),
            max_in_flight: None,
        }
    }

    #[test]
    fn test_spawn_exhaustion_leaves_picture_untouched() {
        let original = gradient(9, 8);
        let mut pic = original.clone();

        let err = parallel_pass_with(&mut pic, Strategy::Row, &impatient(), &mut FailAfter(3))
            .unwrap_err();

        assert!(matches!(err, BlurError::Spawn { .. }), "{err}");
        assert_eq!(pic, original);
    }

    #[test]
    fn test_spawn_exhaustion_before_any_worker() {
        let original = gradient(6, 6);
        let mut pic = original.clone();

        let err = parallel_pass_with(&mut pic, Strategy::Pixel, &impatient(), &mut FailAfter(0))
            .unwrap_err();

        assert!(matches!(err, BlurError::Spawn { attempts: 1, .. }), "{err}");
        assert_eq!(pic, original);
    }

    #[test]
    fn test_worker_panic_fails_pass_and_keeps_picture() {
        let original = gradient(9, 8);
        let mut pic = original.clone();
        let mut spawner = PanicAt { n: 2, spawned: 0 };

        let err = parallel_pass_with(&mut pic, Strategy::Column, &SpawnPolicy::default(), &mut spawner)
            .unwrap_err();

        match err {
            BlurError::WorkerPanicked { name } => assert_eq!(name, "blur-column-2"),
            other => panic!("unexpected error: {other}"),
        }
        // every unit was still dispatched and joined
        assert_eq!(spawner.spawned, 7);
        assert_eq!(pic, original);
    }
}
