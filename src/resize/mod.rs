//! Image resizing module
//!
//! Decodes a fetched source image, applies one of three operations and
//! re-encodes the result in the format it arrived in:
//!
//! - `fit` - center-crop to the target aspect ratio, then resize exactly
//! - `scale` - resize exactly, ignoring aspect ratio
//! - `tn` - shrink to fit inside the target box, never enlarging
//!
//! Resizing uses `fast_image_resize`; decoding and encoding use `image`.

pub mod encoder;
pub mod error;
pub mod format;
pub mod params;
pub mod processor;

// Re-export commonly used types
pub use encoder::{EncodedImage, EncoderFactory, ImageEncoder};
pub use error::ResizeError;
pub use format::SourceFormat;
pub use params::{Operation, ResampleMethod, Size};
pub use processor::{
    decode_image, fit_crop_box, thumbnail_size, transform, CropBox, DecodedImage,
    TransformedImage,
};
