//! Transform parameters
//!
//! The operation and resample kernel are parsed from their URL names once,
//! at request-parse time, and travel through the pipeline as enums.

use std::fmt;
use std::str::FromStr;

use fast_image_resize::{FilterType, ResizeAlg};

use super::error::ResizeError;

/// Transform operation selected by the first path segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Center-crop to the target aspect ratio, then resize to the exact size
    Fit,
    /// Resize to the exact size, ignoring aspect ratio
    Scale,
    /// Shrink to fit inside the size, preserving aspect ratio, never enlarging
    Thumbnail,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Fit, Operation::Scale, Operation::Thumbnail];

    /// Name used in the URL path
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fit => "fit",
            Self::Scale => "scale",
            Self::Thumbnail => "tn",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = ResizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fit" => Ok(Operation::Fit),
            "scale" => Ok(Operation::Scale),
            "tn" => Ok(Operation::Thumbnail),
            _ => Err(ResizeError::UnsupportedOperation(s.to_string())),
        }
    }
}

/// Interpolation kernel used when resizing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResampleMethod {
    Nearest,
    Bilinear,
    Bicubic,
    /// High-quality downsampling filter (Lanczos3)
    #[default]
    Antialias,
}

impl ResampleMethod {
    pub const ALL: [ResampleMethod; 4] = [
        ResampleMethod::Nearest,
        ResampleMethod::Bilinear,
        ResampleMethod::Bicubic,
        ResampleMethod::Antialias,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nearest => "nearest",
            Self::Bilinear => "bilinear",
            Self::Bicubic => "bicubic",
            Self::Antialias => "antialias",
        }
    }

    /// The fast_image_resize algorithm implementing this kernel
    pub fn resize_alg(&self) -> ResizeAlg {
        match self {
            Self::Nearest => ResizeAlg::Nearest,
            Self::Bilinear => ResizeAlg::Convolution(FilterType::Bilinear),
            Self::Bicubic => ResizeAlg::Convolution(FilterType::CatmullRom),
            Self::Antialias => ResizeAlg::Convolution(FilterType::Lanczos3),
        }
    }
}

impl fmt::Display for ResampleMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResampleMethod {
    type Err = ResizeError;

    /// Names are matched exactly; `Antialias` and `NEAREST` are rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| ResizeError::UnknownResample(s.to_string()))
    }
}

/// Target size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Both dimensions are non-zero
    pub fn is_positive(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Total pixels; cannot overflow for any pair of `u32` dimensions
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}
