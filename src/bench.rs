//! Timing driver: repeats blur passes per strategy and reports wall time.

use std::time::Duration;

use log::{info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::blur::{blur, PassStats};
use crate::dispatch::SpawnPolicy;
use crate::error::Result;
use crate::picture::{Picture, Pixel};
use crate::strategy::Strategy;

/// Wall-time summary for one strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timing {
    pub strategy: Strategy,
    pub runs: usize,
    pub mean: Duration,
    pub min: Duration,
    pub max: Duration,
    /// Stats of the final run.
    pub last: PassStats,
}

impl Timing {
    pub fn mean_millis(&self) -> f64 {
        self.mean.as_secs_f64() * 1000.0
    }
}

/// Outcome of a full benchmark.
#[derive(Debug, Clone)]
pub struct BenchReport {
    pub timings: Vec<Timing>,
    /// Output of the last strategy run.
    pub output: Option<Picture>,
    /// False if any strategy produced different pixels from the first one.
    pub consistent: bool,
}

/// Blurs a fresh copy of `source` `runs` times (at least once) and returns
/// the timing together with the last blurred picture.
pub fn time_strategy(
    source: &Picture,
    strategy: Strategy,
    policy: &SpawnPolicy,
    runs: usize,
) -> Result<(Timing, Picture)> {
    let runs = runs.max(1);
    let mut picture = source.clone();
    let mut last = blur(&mut picture, strategy, policy)?;
    let (mut total, mut min, mut max) = (last.elapsed, last.elapsed, last.elapsed);

    for _ in 1..runs {
        picture = source.clone();
        last = blur(&mut picture, strategy, policy)?;
        total += last.elapsed;
        min = min.min(last.elapsed);
        max = max.max(last.elapsed);
    }

    let timing = Timing {
        strategy,
        runs,
        mean: mean(total, runs),
        min,
        max,
        last,
    };
    Ok((timing, picture))
}

fn mean(total: Duration, runs: usize) -> Duration {
    let nanos = total.as_nanos() / runs.max(1) as u128;
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Times every strategy in order and checks they all agree on the output.
pub fn run(
    source: &Picture,
    strategies: &[Strategy],
    policy: &SpawnPolicy,
    runs: usize,
) -> Result<BenchReport> {
    let mut timings = Vec::with_capacity(strategies.len());
    let mut reference: Option<Picture> = None;
    let mut output = None;
    let mut consistent = true;

    for &strategy in strategies {
        let (timing, picture) = time_strategy(source, strategy, policy, runs)?;
        info!(
            "{strategy}: {:.3} ms mean over {} runs ({} units)",
            timing.mean_millis(),
            timing.runs,
            timing.last.units
        );

        if let Some(expected) = &reference {
            if *expected != picture {
                warn!("{strategy} output differs from {}", strategies[0]);
                consistent = false;
            }
        } else {
            reference = Some(picture.clone());
        }
        output = Some(picture);
        timings.push(timing);
    }

    Ok(BenchReport {
        timings,
        output,
        consistent,
    })
}

/// Deterministic noise picture for benchmarking without an input file.
pub fn synthetic_picture(width: usize, height: usize, seed: u64) -> Picture {
    let mut rng = StdRng::seed_from_u64(seed);
    Picture::from_fn(width, height, |_, _| Pixel::new(rng.gen(), rng.gen(), rng.gen()))
}
