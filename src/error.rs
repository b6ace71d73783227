use std::io;

/// Errors raised by picture handling, blur passes, and the benchmark driver.
#[derive(Debug, thiserror::Error)]
pub enum BlurError {
    #[error("pixel buffer holds {got} bytes, expected {expected}")]
    BufferSizeMismatch { expected: usize, got: usize },

    #[error("{width}x{height} picture exceeds the image codec limit of u32::MAX per side")]
    TooLarge { width: usize, height: usize },

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("could not spawn a worker after {attempts} attempts: {source}")]
    Spawn {
        attempts: u32,
        #[source]
        source: io::Error,
    },

    #[error("worker '{name}' panicked")]
    WorkerPanicked { name: String },

    #[error("rotate is undefined for angle {0} (must be 90, 180 or 270)")]
    InvalidRotation(i32),

    #[error("flip is undefined for plane '{0}' (must be 'H' or 'V')")]
    InvalidFlipPlane(char),

    #[error("unknown strategy '{0}'")]
    UnknownStrategy(String),

    #[error("unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, BlurError>;
