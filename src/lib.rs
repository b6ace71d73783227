//! # Blur Partition
//!
//! Compares ways of splitting a 3x3 box blur across threads.
//!
//! ## Strategies
//!
//! 1. **Sequential** - one thread, row-major, the reference output
//! 2. **Pixel** - one worker per interior pixel
//! 3. **Column** - one worker per interior column
//! 4. **Row** - one worker per interior row
//! 5. **Quadrant** - one worker per quarter of the interior
//!
//! Every strategy reads a frozen snapshot of the picture and writes a disjoint
//! region of the destination, so all five produce identical pixels. Workers
//! are tracked in a [`WorkerPool`] that can reclaim finished threads without
//! blocking, which keeps the per-pixel strategy going when the OS runs out of
//! threads.
//!
//! ```
//! use blur_partition::{blur, Picture, Pixel, SpawnPolicy, Strategy};
//!
//! let mut picture = Picture::filled(5, 5, Pixel::gray(100));
//! let stats = blur(&mut picture, Strategy::Row, &SpawnPolicy::default()).unwrap();
//!
//! assert_eq!(stats.units, 3);
//! assert_eq!(picture.get_pixel(2, 2), Pixel::gray(100));
//! ```
//!
//! ## Running the Benchmark
//!
//! ```bash
//! cargo run --release --bin blur_bench -- bench --input images/frank.png --runs 100
//! cargo run --release --bin blur_bench -- bench --width 512 --height 512 -s row -s quadrant
//! cargo run --release --bin blur_bench -- apply in.png out.png -o blur:pixel -o flip:H
//! ```

pub mod bench;
pub mod blur;
pub mod canvas;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod kernel;
pub mod logging;
pub mod picture;
pub mod pool;
pub mod region;
pub mod strategy;
pub mod transform;

pub use blur::{
    blur, column_blur, pixel_blur, quadrant_blur, row_blur, sequential_blur, PassStats,
};
pub use dispatch::{spawn_with_retry, SpawnPolicy, SpawnReport};
pub use error::{BlurError, Result};
pub use kernel::{blur_pixel, BLUR_REGION_SIZE};
pub use picture::{Picture, Pixel};
pub use pool::{WorkerHandle, WorkerId, WorkerPool};
pub use region::Region;
pub use strategy::Strategy;
pub use transform::Operation;
