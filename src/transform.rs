//! Single-pass pixel transforms that need no concurrency, plus the
//! [`Operation`] parser the command line uses to pick one.

use std::fmt;
use std::str::FromStr;

use crate::blur::blur;
use crate::dispatch::SpawnPolicy;
use crate::error::{BlurError, Result};
use crate::picture::{Picture, Pixel, MAX_PIXEL_INTENSITY};
use crate::strategy::Strategy;

/// Clockwise rotation by a multiple of 90 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    Quarter,
    Half,
    ThreeQuarter,
}

impl TryFrom<i32> for Rotation {
    type Error = BlurError;

    fn try_from(angle: i32) -> Result<Self> {
        match angle {
            90 => Ok(Rotation::Quarter),
            180 => Ok(Rotation::Half),
            270 => Ok(Rotation::ThreeQuarter),
            other => Err(BlurError::InvalidRotation(other)),
        }
    }
}

/// Mirror axis: `Horizontal` swaps left and right, `Vertical` swaps top and
/// bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlipPlane {
    Horizontal,
    Vertical,
}

impl TryFrom<char> for FlipPlane {
    type Error = BlurError;

    fn try_from(plane: char) -> Result<Self> {
        match plane {
            'H' | 'h' => Ok(FlipPlane::Horizontal),
            'V' | 'v' => Ok(FlipPlane::Vertical),
            other => Err(BlurError::InvalidFlipPlane(other)),
        }
    }
}

pub fn invert(picture: &mut Picture) {
    map_pixels(picture, |p| {
        Pixel::new(
            MAX_PIXEL_INTENSITY - p.red,
            MAX_PIXEL_INTENSITY - p.green,
            MAX_PIXEL_INTENSITY - p.blue,
        )
    });
}

/// Replaces each pixel with the truncated mean of its three channels.
pub fn grayscale(picture: &mut Picture) {
    map_pixels(picture, |p| {
        let avg = (u16::from(p.red) + u16::from(p.green) + u16::from(p.blue)) / 3;
        Pixel::gray(avg as u8)
    });
}

/// Rotates clockwise by `angle` degrees, which must be 90, 180 or 270.
pub fn rotate(picture: &mut Picture, angle: i32) -> Result<()> {
    let rotation = Rotation::try_from(angle)?;
    let (width, height) = picture.dimensions();
    let source = &*picture;

    let rotated = match rotation {
        Rotation::Quarter => Picture::from_fn(height, width, |x, y| {
            source.get_pixel(y, height - 1 - x)
        }),
        Rotation::Half => Picture::from_fn(width, height, |x, y| {
            source.get_pixel(width - 1 - x, height - 1 - y)
        }),
        Rotation::ThreeQuarter => Picture::from_fn(height, width, |x, y| {
            source.get_pixel(width - 1 - y, x)
        }),
    };
    *picture = rotated;
    Ok(())
}

/// Mirrors the picture; `plane` is `'H'` or `'V'`.
pub fn flip(picture: &mut Picture, plane: char) -> Result<()> {
    let plane = FlipPlane::try_from(plane)?;
    let (width, height) = picture.dimensions();
    let source = &*picture;

    let flipped = Picture::from_fn(width, height, |x, y| match plane {
        FlipPlane::Horizontal => source.get_pixel(width - 1 - x, y),
        FlipPlane::Vertical => source.get_pixel(x, height - 1 - y),
    });
    *picture = flipped;
    Ok(())
}

fn map_pixels(picture: &mut Picture, f: impl Fn(Pixel) -> Pixel) {
    let (width, height) = picture.dimensions();
    for y in 0..height {
        for x in 0..width {
            let p = picture.get_pixel(x, y);
            picture.set_pixel(x, y, f(p));
        }
    }
}

/// One step the command line can apply to a picture.
///
/// Parsed from `invert`, `grayscale`, `rotate:<angle>`, `flip:<H|V>` or
/// `blur:<strategy>` (plain `blur` means sequential).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Invert,
    Grayscale,
    Rotate(i32),
    Flip(char),
    Blur(Strategy),
}

impl Operation {
    /// Applies the operation in place. Blurs use `policy` for their workers.
    pub fn apply(self, picture: &mut Picture, policy: &SpawnPolicy) -> Result<()> {
        match self {
            Operation::Invert => invert(picture),
            Operation::Grayscale => grayscale(picture),
            Operation::Rotate(angle) => rotate(picture, angle)?,
            Operation::Flip(plane) => flip(picture, plane)?,
            Operation::Blur(strategy) => {
                blur(picture, strategy, policy)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Invert => f.write_str("invert"),
            Operation::Grayscale => f.write_str("grayscale"),
            Operation::Rotate(angle) => write!(f, "rotate:{angle}"),
            Operation::Flip(plane) => write!(f, "flip:{plane}"),
            Operation::Blur(strategy) => write!(f, "blur:{strategy}"),
        }
    }
}

impl FromStr for Operation {
    type Err = BlurError;

    fn from_str(s: &str) -> Result<Self> {
        let unknown = || BlurError::UnknownOperation(s.to_string());
        let (name, arg) = match s.split_once(':') {
            Some((name, arg)) => (name, Some(arg)),
            None => (s, None),
        };

        match (name.trim().to_ascii_lowercase().as_str(), arg) {
            ("invert", None) => Ok(Operation::Invert),
            ("grayscale" | "greyscale", None) => Ok(Operation::Grayscale),
            ("rotate", Some(angle)) => {
                let angle = angle.trim().parse().map_err(|_| unknown())?;
                Ok(Operation::Rotate(angle))
            }
            ("flip", Some(plane)) => {
                let mut chars = plane.trim().chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Operation::Flip(c)),
                    _ => Err(unknown()),
                }
            }
            ("blur", None) => Ok(Operation::Blur(Strategy::Sequential)),
            ("blur", Some(strategy)) => Ok(Operation::Blur(strategy.parse()?)),
            _ => Err(unknown()),
        }
    }
}
