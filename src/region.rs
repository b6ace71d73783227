//! Work units: rectangular regions of the picture interior.
//!
//! Rows are `y` and columns are `x`. Bounds are half-open, so
//! `row_start..row_end` and `col_start..col_end` are the covered ranges.
//! Every enumeration here yields pairwise disjoint, non-empty regions whose
//! union is exactly [`Region::interior`].

/// A half-open rectangle of pixels assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub row_start: usize,
    pub col_start: usize,
    pub row_end: usize,
    pub col_end: usize,
}

impl Region {
    pub const fn new(row_start: usize, col_start: usize, row_end: usize, col_end: usize) -> Self {
        Self {
            row_start,
            col_start,
            row_end,
            col_end,
        }
    }

    /// The single pixel `(x, y)`.
    pub const fn pixel(x: usize, y: usize) -> Self {
        Self::new(y, x, y + 1, x + 1)
    }

    /// Everything but the outermost border ring. Empty below 3x3.
    pub fn interior(width: usize, height: usize) -> Self {
        Self::new(
            1,
            1,
            height.saturating_sub(1).max(1),
            width.saturating_sub(1).max(1),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.row_start >= self.row_end || self.col_start >= self.col_end
    }

    /// Number of pixels covered.
    pub fn area(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.row_end - self.row_start) * (self.col_end - self.col_start)
        }
    }

    /// Covered `(x, y)` coordinates in row-major order.
    pub fn coords(self) -> impl Iterator<Item = (usize, usize)> {
        let (cols, rows) = (self.col_start..self.col_end, self.row_start..self.row_end);
        rows.flat_map(move |y| cols.clone().map(move |x| (x, y)))
    }
}

/// One region per interior pixel, row-major.
pub fn pixels(width: usize, height: usize) -> impl Iterator<Item = Region> {
    Region::interior(width, height)
        .coords()
        .map(|(x, y)| Region::pixel(x, y))
}

/// One region per interior row.
pub fn rows(width: usize, height: usize) -> impl Iterator<Item = Region> {
    let interior = Region::interior(width, height);
    let ys = if interior.is_empty() {
        0..0
    } else {
        interior.row_start..interior.row_end
    };
    ys.map(move |y| Region::new(y, interior.col_start, y + 1, interior.col_end))
}

/// One region per interior column.
pub fn columns(width: usize, height: usize) -> impl Iterator<Item = Region> {
    let interior = Region::interior(width, height);
    let xs = if interior.is_empty() {
        0..0
    } else {
        interior.col_start..interior.col_end
    };
    xs.map(move |x| Region::new(interior.row_start, x, interior.row_end, x + 1))
}

/// The interior split at `width / 2` and `height / 2` into top-left,
/// top-right, bottom-left and bottom-right. The seam column and row belong to
/// the right and bottom quadrants. Quadrants that come out empty on narrow
/// pictures are skipped.
pub fn quadrants(width: usize, height: usize) -> impl Iterator<Item = Region> {
    let interior = Region::interior(width, height);
    let (mid_w, mid_h) = (width / 2, height / 2);

    let all = if interior.is_empty() {
        Vec::new()
    } else {
        vec![
            Region::new(interior.row_start, interior.col_start, mid_h, mid_w),
            Region::new(interior.row_start, mid_w, mid_h, interior.col_end),
            Region::new(mid_h, interior.col_start, interior.row_end, mid_w),
            Region::new(mid_h, mid_w, interior.row_end, interior.col_end),
        ]
    };
    all.into_iter().filter(|r| !r.is_empty())
}
