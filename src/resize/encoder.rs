//! Format-preserving image encoders
//!
//! One encoder per source format. The factory is keyed by the format
//! detected at decode time, so a response is always encoded the way its
//! source was.

use std::io::Cursor;

use image::{ColorType, DynamicImage, ImageEncoder as _};

use super::error::ResizeError;
use super::format::SourceFormat;

/// JPEG quality used when re-encoding
pub const JPEG_QUALITY: u8 = 75;

/// Result of encoding an image
#[derive(Debug)]
pub struct EncodedImage {
    /// The encoded image data
    pub data: Vec<u8>,
    /// The output format
    pub format: SourceFormat,
}

impl EncodedImage {
    pub fn new(data: Vec<u8>, format: SourceFormat) -> Self {
        Self { data, format }
    }
}

/// Trait for image encoders
///
/// The trait is object-safe so the factory can hand back a boxed encoder.
pub trait ImageEncoder: Send + Sync {
    /// The format this encoder produces
    fn format(&self) -> SourceFormat;

    /// Encode a decoded raster
    fn encode(&self, image: &DynamicImage) -> Result<EncodedImage, ResizeError>;
}

/// JPEG encoder using the image crate
pub struct JpegEncoder {
    pub quality: u8,
}

impl Default for JpegEncoder {
    fn default() -> Self {
        Self {
            quality: JPEG_QUALITY,
        }
    }
}

impl ImageEncoder for JpegEncoder {
    fn format(&self) -> SourceFormat {
        SourceFormat::Jpeg
    }

    fn encode(&self, image: &DynamicImage) -> Result<EncodedImage, ResizeError> {
        use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;

        let mut output = Cursor::new(Vec::new());
        let encoder = ImageJpegEncoder::new_with_quality(&mut output, self.quality);

        // JPEG has no alpha channel; grayscale stays single-channel
        let result = match image {
            DynamicImage::ImageLuma8(gray) => {
                encoder.write_image(gray.as_raw(), gray.width(), gray.height(), ColorType::L8)
            }
            other => {
                let rgb = other.to_rgb8();
                encoder.write_image(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
            }
        };
        result.map_err(|e| ResizeError::encode_failed("jpeg", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), SourceFormat::Jpeg))
    }
}

/// PNG encoder using the image crate
pub struct PngEncoder;

impl ImageEncoder for PngEncoder {
    fn format(&self) -> SourceFormat {
        SourceFormat::Png
    }

    fn encode(&self, image: &DynamicImage) -> Result<EncodedImage, ResizeError> {
        use image::codecs::png::PngEncoder as ImagePngEncoder;

        let mut output = Cursor::new(Vec::new());
        let encoder = ImagePngEncoder::new(&mut output);

        let (data, color) = rgb_or_rgba(image);
        encoder
            .write_image(&data, image.width(), image.height(), color)
            .map_err(|e| ResizeError::encode_failed("png", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), SourceFormat::Png))
    }
}

/// GIF encoder using the image crate
///
/// Only the first frame of an animated source survives decoding, so the
/// output is always a single-frame GIF.
pub struct GifEncoder;

impl ImageEncoder for GifEncoder {
    fn format(&self) -> SourceFormat {
        SourceFormat::Gif
    }

    fn encode(&self, image: &DynamicImage) -> Result<EncodedImage, ResizeError> {
        use image::codecs::gif::GifEncoder as ImageGifEncoder;

        let mut output = Vec::new();
        {
            let mut encoder = ImageGifEncoder::new(&mut output);
            let rgba = image.to_rgba8();
            encoder
                .encode(rgba.as_raw(), rgba.width(), rgba.height(), ColorType::Rgba8)
                .map_err(|e| ResizeError::encode_failed("gif", e.to_string()))?;
        }

        Ok(EncodedImage::new(output, SourceFormat::Gif))
    }
}

/// WebP encoder using the image crate
///
/// Note: The `image` crate only supports lossless WebP encoding.
pub struct WebPEncoder;

impl ImageEncoder for WebPEncoder {
    fn format(&self) -> SourceFormat {
        SourceFormat::WebP
    }

    fn encode(&self, image: &DynamicImage) -> Result<EncodedImage, ResizeError> {
        use image::codecs::webp::WebPEncoder as ImageWebPEncoder;

        let mut output = Cursor::new(Vec::new());
        let encoder = ImageWebPEncoder::new_lossless(&mut output);

        let (data, color) = rgb_or_rgba(image);
        encoder
            .write_image(&data, image.width(), image.height(), color)
            .map_err(|e| ResizeError::encode_failed("webp", e.to_string()))?;

        Ok(EncodedImage::new(output.into_inner(), SourceFormat::WebP))
    }
}

/// Factory for creating encoders based on the source format
pub struct EncoderFactory;

impl EncoderFactory {
    pub fn create(format: SourceFormat) -> Box<dyn ImageEncoder> {
        match format {
            SourceFormat::Jpeg => Box::new(JpegEncoder::default()),
            SourceFormat::Png => Box::new(PngEncoder),
            SourceFormat::Gif => Box::new(GifEncoder),
            SourceFormat::WebP => Box::new(WebPEncoder),
        }
    }
}

/// 8-bit RGB or RGBA pixels, keeping alpha only when the image has it
fn rgb_or_rgba(image: &DynamicImage) -> (Vec<u8>, ColorType) {
    if image.color().has_alpha() {
        (image.to_rgba8().into_raw(), ColorType::Rgba8)
    } else {
        (image.to_rgb8().into_raw(), ColorType::Rgb8)
    }
}
