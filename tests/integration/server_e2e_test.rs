// End-to-end: the shukusho binary serving requests over TCP

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use std::collections::HashMap;
use std::io::Cursor;

use super::test_harness::{client, OriginRoute, OriginServer, ProxyTestHarness};

const ALLOW_LOCAL_150X100: [&str; 4] = [
    "--origin-regexp",
    r"127\.0\.0\.1:\d+/.*",
    "--size",
    "150,100",
];

fn png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_pixel(width, height, Rgba([10, 200, 30, 255]));
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

async fn origin() -> OriginServer {
    let mut routes = HashMap::new();
    routes.insert(
        "/logo.png",
        OriginRoute::ok("image/png", png(300, 200)).with_header("Cache-Control", "max-age=60"),
    );
    OriginServer::start(routes).await
}

#[tokio::test]
async fn test_binary_serves_resized_images() {
    let origin = origin().await;
    let proxy = ProxyTestHarness::start(&ALLOW_LOCAL_150X100)
        .await
        .expect("proxy should start");
    let client = client();

    let response = client
        .get(proxy.url(&format!("/fit/150x100/{}/logo.png", origin.host())))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.headers().get("content-type").unwrap(), "image/png");
    assert_eq!(response.headers().get("cache-control").unwrap(), "max-age=60");
    let body = response.bytes().await.unwrap();
    let img = image::load_from_memory(&body).unwrap();
    assert_eq!((img.width(), img.height()), (150, 100));
}

#[tokio::test]
async fn test_binary_enforces_policy() {
    let origin = origin().await;
    let proxy = ProxyTestHarness::start(&ALLOW_LOCAL_150X100)
        .await
        .expect("proxy should start");
    let client = client();

    let response = client
        .get(proxy.url(&format!("/fit/10x10/{}/logo.png", origin.host())))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
    assert_eq!(response.text().await.unwrap(), "Size Not Allowed");

    let response = client
        .get(proxy.url("/fit/150x100/example.com/logo.png"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
    assert_eq!(response.text().await.unwrap(), "Origin Not Allowed");

    let response = client.get(proxy.url("/nothing/here")).send().await.unwrap();
    assert_eq!(response.status(), 404);

    assert_eq!(origin.hits(), 0);
}

#[tokio::test]
async fn test_binary_exposes_metrics() {
    let proxy = ProxyTestHarness::start(&[]).await.expect("proxy should start");
    let client = client();

    let response = client.get(proxy.url("/metrics")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("# TYPE shukusho_requests_total counter"));
}

#[test]
fn test_invalid_configuration_exits_with_error() {
    let status = std::process::Command::new(env!("CARGO_BIN_EXE_shukusho"))
        .args(["--size", "100x100", "--test"])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(1));
}

#[test]
fn test_valid_configuration_test_mode_exits_cleanly() {
    let status = std::process::Command::new(env!("CARGO_BIN_EXE_shukusho"))
        .args(["--size", "100,100", "--resample", "bicubic", "--test"])
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .unwrap();
    assert!(status.success());
}
