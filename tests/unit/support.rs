// Shared fixtures for unit tests: in-memory images and a recording origin

use async_trait::async_trait;
use http::{HeaderMap, HeaderValue};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use parking_lot::Mutex;
use std::io::Cursor;
use std::sync::Arc;

use shukusho::metrics::Metrics;
use shukusho::origin::{OriginError, OriginFetcher, OriginResponse};
use shukusho::policy::PolicyConfig;
use shukusho::proxy::ResizeHandler;
use shukusho::resize::{EncoderFactory, SourceFormat};

/// Gradient image so resized output is not trivially uniform
pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    }))
}

pub fn encode(img: &DynamicImage, format: SourceFormat) -> Vec<u8> {
    match format {
        // The crate's own encoder covers WebP, which `write_to` may not
        SourceFormat::WebP => EncoderFactory::create(format).encode(img).unwrap().data,
        _ => {
            let mut out = Cursor::new(Vec::new());
            img.write_to(&mut out, ImageFormat::from(format)).unwrap();
            out.into_inner()
        }
    }
}

pub fn jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), SourceFormat::Jpeg)
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), SourceFormat::Png)
}

/// PNG whose left half is opaque red and right half fully transparent
pub fn half_transparent_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, _| {
        if x < width / 2 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    encode(&DynamicImage::ImageRgba8(img), SourceFormat::Png)
}

/// Three vertical bands: red, green, blue
pub fn banded_png(band_width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_fn(band_width * 3, height, |x, _| match x / band_width {
        0 => Rgb([255, 0, 0]),
        1 => Rgb([0, 255, 0]),
        _ => Rgb([0, 0, 255]),
    });
    encode(&DynamicImage::ImageRgb8(img), SourceFormat::Png)
}

/// Origin stub that records every URL it is asked for
pub struct RecordingFetcher {
    result: Result<OriginResponse, OriginError>,
    urls: Mutex<Vec<String>>,
}

impl RecordingFetcher {
    pub fn serving(bytes: Vec<u8>) -> Self {
        Self::serving_with_headers(bytes, HeaderMap::new())
    }

    pub fn serving_with_headers(bytes: Vec<u8>, headers: HeaderMap) -> Self {
        Self {
            result: Ok(OriginResponse::new(bytes, headers)),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(err: OriginError) -> Self {
        Self {
            result: Err(err),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.urls.lock().len()
    }
}

#[async_trait]
impl OriginFetcher for RecordingFetcher {
    async fn fetch(&self, url: &str) -> Result<OriginResponse, OriginError> {
        self.urls.lock().push(url.to_string());
        self.result.clone()
    }
}

pub fn handler_with(policy: PolicyConfig, fetcher: Arc<RecordingFetcher>) -> ResizeHandler {
    ResizeHandler::new(Arc::new(policy), fetcher, Arc::new(Metrics::new()))
}

pub fn cache_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("Cache-Control", HeaderValue::from_static("public, max-age=3600"));
    headers.insert(
        "Last-Modified",
        HeaderValue::from_static("Tue, 13 Oct 2026 10:00:00 GMT"),
    );
    headers.insert("Set-Cookie", HeaderValue::from_static("tracking=1"));
    headers.insert("X-Origin-Secret", HeaderValue::from_static("s3cr3t"));
    headers
}
