//! The 3x3 box-blur kernel.

use crate::picture::{Picture, Pixel};

/// Number of pixels averaged per output pixel.
pub const BLUR_REGION_SIZE: u32 = 9;

/// Averages the 3x3 neighbourhood of the interior pixel `(x, y)` in `snapshot`.
///
/// Each channel is summed independently and divided by [`BLUR_REGION_SIZE`]
/// with truncation. The caller must not pass border coordinates.
pub fn blur_pixel(snapshot: &Picture, x: usize, y: usize) -> Pixel {
    debug_assert!(
        x > 0 && y > 0 && x + 1 < snapshot.width() && y + 1 < snapshot.height(),
        "({x}, {y}) is not an interior pixel"
    );

    let (mut red, mut green, mut blue) = (0u32, 0u32, 0u32);
    for ny in y - 1..=y + 1 {
        for nx in x - 1..=x + 1 {
            let p = snapshot.get_pixel(nx, ny);
            red += u32::from(p.red);
            green += u32::from(p.green);
            blue += u32::from(p.blue);
        }
    }

    // 9 * 255 / 9 fits in u8, so the casts never truncate.
    Pixel::new(
        (red / BLUR_REGION_SIZE) as u8,
        (green / BLUR_REGION_SIZE) as u8,
        (blue / BLUR_REGION_SIZE) as u8,
    )
}
