//! Destination buffer shared by the workers of one blur pass.
//!
//! Every pixel is an `AtomicU32` holding packed RGB, so workers write through
//! a shared reference. Which worker writes which pixel is decided by the
//! disjoint regions handed out, never by locking. Stores are `Relaxed`; joining
//! the workers is what makes them visible to [`SharedCanvas::into_picture`].

use std::sync::atomic::{AtomicU32, Ordering};

use crate::picture::{Picture, Pixel};

#[derive(Debug)]
pub struct SharedCanvas {
    cells: Vec<AtomicU32>,
    width: usize,
    height: usize,
}

impl SharedCanvas {
    /// Blank canvas.
    pub fn new(width: usize, height: usize) -> Self {
        let cells = (0..width * height).map(|_| AtomicU32::new(0)).collect();
        Self { cells, width, height }
    }

    /// Canvas sized like `source` with its border ring already copied in.
    pub fn from_borders(source: &Picture) -> Self {
        let (width, height) = source.dimensions();
        let canvas = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                if source.is_border(x, y) {
                    canvas.write(x, y, source.get_pixel(x, y));
                }
            }
        }
        canvas
    }

    pub fn write(&self, x: usize, y: usize, pixel: Pixel) {
        self.cells[self.index(x, y)].store(pack(pixel), Ordering::Relaxed);
    }

    #[cfg(test)]
    fn read(&self, x: usize, y: usize) -> Pixel {
        unpack(self.cells[self.index(x, y)].load(Ordering::Relaxed))
    }

    /// Publishes the canvas as a picture. Consuming `self` guarantees no
    /// worker still holds a reference.
    pub fn into_picture(self) -> Picture {
        let width = self.width;
        let cells = self.cells;
        Picture::from_fn(width, self.height, |x, y| {
            unpack(cells[y * width + x].load(Ordering::Relaxed))
        })
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} canvas",
            self.width,
            self.height
        );
        y * self.width + x
    }
}

fn pack(p: Pixel) -> u32 {
    u32::from(p.red) << 16 | u32::from(p.green) << 8 | u32::from(p.blue)
}

fn unpack(v: u32) -> Pixel {
    Pixel::new((v >> 16) as u8, (v >> 8) as u8, v as u8)
}
