use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BlurError;
use crate::region::{self, Region};

/// How a blur pass splits the picture interior between workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Single thread, row-major, no workers.
    Sequential,
    /// One worker per interior pixel.
    Pixel,
    /// One worker per interior row.
    Row,
    /// One worker per interior column.
    Column,
    /// One worker per quadrant of the interior.
    Quadrant,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Sequential,
        Strategy::Pixel,
        Strategy::Column,
        Strategy::Row,
        Strategy::Quadrant,
    ];

    /// Work units this strategy issues for a `width` x `height` picture.
    ///
    /// `Sequential` yields the whole interior as one unit.
    pub fn regions(self, width: usize, height: usize) -> Box<dyn Iterator<Item = Region> + Send> {
        match self {
            Strategy::Sequential => {
                let interior = Region::interior(width, height);
                Box::new((!interior.is_empty()).then_some(interior).into_iter())
            }
            Strategy::Pixel => Box::new(region::pixels(width, height)),
            Strategy::Row => Box::new(region::rows(width, height)),
            Strategy::Column => Box::new(region::columns(width, height)),
            Strategy::Quadrant => Box::new(region::quadrants(width, height)),
        }
    }

    pub fn is_parallel(self) -> bool {
        self != Strategy::Sequential
    }

    pub fn name(self) -> &'static str {
        match self {
            Strategy::Sequential => "sequential",
            Strategy::Pixel => "pixel",
            Strategy::Row => "row",
            Strategy::Column => "column",
            Strategy::Quadrant => "quadrant",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = BlurError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" => Ok(Strategy::Sequential),
            "pixel" | "per-pixel" | "parallel" => Ok(Strategy::Pixel),
            "row" | "per-row" => Ok(Strategy::Row),
            "column" | "col" | "per-column" => Ok(Strategy::Column),
            "quadrant" | "quarter" | "per-quadrant" => Ok(Strategy::Quadrant),
            _ => Err(BlurError::UnknownStrategy(s.to_string())),
        }
    }
}
