//! Image processing implementation
//!
//! Handles the actual image transformation: decode → crop/resize → encode.
//! The format detected while decoding is carried through to the encoder.

use fast_image_resize::{Image, MulDiv, PixelType, ResizeAlg, Resizer};
use image::io::Reader as ImageReader;
use image::DynamicImage;
use std::io::Cursor;
use std::num::NonZeroU32;

use crate::constants::MAX_OUTPUT_PIXELS;

use super::encoder::EncoderFactory;
use super::error::ResizeError;
use super::format::SourceFormat;
use super::params::{Operation, ResampleMethod, Size};

/// A decoded raster and the format it was decoded from
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: SourceFormat,
}

impl DecodedImage {
    pub fn size(&self) -> Size {
        Size::new(self.image.width(), self.image.height())
    }
}

/// Result of a transform
#[derive(Debug)]
pub struct TransformedImage {
    /// The re-encoded image data
    pub data: Vec<u8>,
    /// Source format, and therefore output format
    pub format: SourceFormat,
    /// Source dimensions
    pub source_size: Size,
    /// Output dimensions
    pub output_size: Size,
}

impl TransformedImage {
    pub fn content_type(&self) -> &'static str {
        self.format.content_type()
    }
}

/// Rectangle cut out of the source before resizing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Decode, transform and re-encode an image
///
/// # Arguments
/// * `data` - Raw image data bytes fetched from the origin
/// * `op` - Which transform to apply
/// * `size` - Target size (exact for fit/scale, a bounding box for thumbnail)
/// * `resample` - Interpolation kernel
pub fn transform(
    data: &[u8],
    op: Operation,
    size: Size,
    resample: ResampleMethod,
) -> Result<TransformedImage, ResizeError> {
    if !size.is_positive() {
        return Err(ResizeError::resize_failed(format!(
            "Target size {} has a zero dimension",
            size
        )));
    }
    if size.pixel_count() > MAX_OUTPUT_PIXELS {
        return Err(ResizeError::resize_failed(format!(
            "Target size {} exceeds {} pixels",
            size, MAX_OUTPUT_PIXELS
        )));
    }

    let decoded = decode_image(data)?;
    let source_size = decoded.size();
    let alg = resample.resize_alg();

    let output = match op {
        Operation::Fit => {
            let crop = fit_crop_box(source_size, size);
            let cropped = if crop.width == source_size.width && crop.height == source_size.height
            {
                decoded.image
            } else {
                decoded
                    .image
                    .crop_imm(crop.x, crop.y, crop.width, crop.height)
            };
            resize_image(&cropped, size, alg)?
        }
        Operation::Scale => resize_image(&decoded.image, size, alg)?,
        Operation::Thumbnail => {
            let bounded = thumbnail_size(source_size, size);
            if bounded == source_size {
                decoded.image
            } else {
                resize_image(&decoded.image, bounded, alg)?
            }
        }
    };

    let output_size = Size::new(output.width(), output.height());
    let encoded = EncoderFactory::create(decoded.format).encode(&output)?;

    Ok(TransformedImage {
        data: encoded.data,
        format: decoded.format,
        source_size,
        output_size,
    })
}

/// Decode image data, remembering the detected format
pub fn decode_image(data: &[u8]) -> Result<DecodedImage, ResizeError> {
    let reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| ResizeError::decode_failed(e.to_string()))?;

    let detected = reader
        .format()
        .ok_or_else(|| ResizeError::decode_failed("unrecognised image data"))?;
    let format = SourceFormat::from_image_format(detected)?;

    let image = reader
        .decode()
        .map_err(|e| ResizeError::decode_failed(e.to_string()))?;

    Ok(DecodedImage { image, format })
}

/// Largest centered box of the source with the target's aspect ratio
///
/// The cropped-away excess is split evenly, with any odd pixel going to the
/// right/bottom edge. Box dimensions are rounded to the nearest pixel.
pub fn fit_crop_box(source: Size, target: Size) -> CropBox {
    let (sw, sh) = (source.width as u64, source.height as u64);
    let (tw, th) = (target.width as u64, target.height as u64);

    // Compare sw/sh with tw/th without floating point
    if sw * th > sh * tw {
        // Source is wider than the target: trim left and right
        let width = ((sh * tw + th / 2) / th).clamp(1, sw) as u32;
        CropBox {
            x: (source.width - width) / 2,
            y: 0,
            width,
            height: source.height,
        }
    } else if sw * th < sh * tw {
        // Source is taller than the target: trim top and bottom
        let height = ((sw * th + tw / 2) / tw).clamp(1, sh) as u32;
        CropBox {
            x: 0,
            y: (source.height - height) / 2,
            width: source.width,
            height,
        }
    } else {
        CropBox {
            x: 0,
            y: 0,
            width: source.width,
            height: source.height,
        }
    }
}

/// Size that fits the source inside `bound`, preserving aspect ratio
///
/// Never enlarges: a source already inside the box keeps its size. Each
/// axis is rounded to the nearest pixel and clamped to `1..=bound`.
pub fn thumbnail_size(source: Size, bound: Size) -> Size {
    if source.width <= bound.width && source.height <= bound.height {
        return source;
    }

    let scale_w = bound.width as f64 / source.width as f64;
    let scale_h = bound.height as f64 / source.height as f64;
    let scale = scale_w.min(scale_h);

    let width = ((source.width as f64 * scale).round() as u32).clamp(1, bound.width);
    let height = ((source.height as f64 * scale).round() as u32).clamp(1, bound.height);
    Size::new(width, height)
}

/// Resize using fast_image_resize with the given algorithm
///
/// Images with alpha are resized premultiplied so transparent pixels do
/// not bleed colour into their neighbours.
fn resize_image(
    img: &DynamicImage,
    target: Size,
    alg: ResizeAlg,
) -> Result<DynamicImage, ResizeError> {
    let src_width = NonZeroU32::new(img.width())
        .ok_or_else(|| ResizeError::resize_failed("Source width is 0"))?;
    let src_height = NonZeroU32::new(img.height())
        .ok_or_else(|| ResizeError::resize_failed("Source height is 0"))?;
    let dst_width = NonZeroU32::new(target.width)
        .ok_or_else(|| ResizeError::resize_failed("Target width is 0"))?;
    let dst_height = NonZeroU32::new(target.height)
        .ok_or_else(|| ResizeError::resize_failed("Target height is 0"))?;

    let has_alpha = img.color().has_alpha();
    let (buffer, pixel_type) = if has_alpha {
        (img.to_rgba8().into_raw(), PixelType::U8x4)
    } else {
        (img.to_rgb8().into_raw(), PixelType::U8x3)
    };

    let mut src_image = Image::from_vec_u8(src_width, src_height, buffer, pixel_type)
        .map_err(|e| ResizeError::resize_failed(format!("Failed to create source image: {:?}", e)))?;
    let mut dst_image = Image::new(dst_width, dst_height, pixel_type);

    let alpha_mul_div = MulDiv::default();
    if has_alpha {
        alpha_mul_div
            .multiply_alpha_inplace(&mut src_image.view_mut())
            .map_err(|e| ResizeError::resize_failed(format!("Failed to premultiply alpha: {:?}", e)))?;
    }

    let mut resizer = Resizer::new(alg);
    resizer
        .resize(&src_image.view(), &mut dst_image.view_mut())
        .map_err(|e| ResizeError::resize_failed(format!("Resize operation failed: {:?}", e)))?;

    if has_alpha {
        alpha_mul_div
            .divide_alpha_inplace(&mut dst_image.view_mut())
            .map_err(|e| ResizeError::resize_failed(format!("Failed to restore alpha: {:?}", e)))?;
    }

    let result_buf = dst_image.into_vec();
    let output = if has_alpha {
        image::RgbaImage::from_raw(target.width, target.height, result_buf)
            .map(DynamicImage::ImageRgba8)
    } else {
        image::RgbImage::from_raw(target.width, target.height, result_buf)
            .map(DynamicImage::ImageRgb8)
    };

    output.ok_or_else(|| ResizeError::resize_failed("Failed to create output image buffer"))
}
