// Transform behaviour across formats and kernels

use rstest::rstest;

use shukusho::resize::{
    decode_image, fit_crop_box, thumbnail_size, transform, CropBox, Operation, ResampleMethod,
    ResizeError, Size, SourceFormat,
};

use super::support::{encode, gradient, half_transparent_png, jpeg, png};

#[rstest]
#[case::jpeg(SourceFormat::Jpeg)]
#[case::png(SourceFormat::Png)]
#[case::gif(SourceFormat::Gif)]
#[case::webp(SourceFormat::WebP)]
fn test_output_format_matches_source(#[case] format: SourceFormat) {
    let data = encode(&gradient(50, 30), format);

    let out = transform(&data, Operation::Scale, Size::new(25, 15), ResampleMethod::default())
        .unwrap();

    assert_eq!(out.format, format);
    assert_eq!(out.source_size, Size::new(50, 30));
    assert_eq!(out.output_size, Size::new(25, 15));
    assert_eq!(decode_image(&out.data).unwrap().format, format);
}

#[rstest]
fn test_every_operation_and_kernel_combination(
    #[values(Operation::Fit, Operation::Scale, Operation::Thumbnail)] op: Operation,
    #[values(
        ResampleMethod::Nearest,
        ResampleMethod::Bilinear,
        ResampleMethod::Bicubic,
        ResampleMethod::Antialias
    )]
    resample: ResampleMethod,
) {
    let data = jpeg(90, 60);
    let out = transform(&data, op, Size::new(30, 30), resample).unwrap();

    let expected = match op {
        Operation::Thumbnail => Size::new(30, 20),
        _ => Size::new(30, 30),
    };
    assert_eq!(out.output_size, expected);
}

#[test]
fn test_transparent_pixels_do_not_darken_opaque_ones() {
    let data = half_transparent_png(64, 8);

    let out = transform(
        &data,
        Operation::Scale,
        Size::new(16, 2),
        ResampleMethod::Antialias,
    )
    .unwrap();

    let img = image::load_from_memory(&out.data).unwrap().to_rgba8();
    // Any pixel that kept some opacity keeps its pure red colour
    for pixel in img.pixels().filter(|p| p.0[3] > 0) {
        assert!(pixel.0[0] >= 250, "red channel bled: {:?}", pixel.0);
        assert!(pixel.0[1] <= 5 && pixel.0[2] <= 5);
    }
    // Far left stays opaque, far right stays transparent
    assert_eq!(img.get_pixel(0, 0).0[3], 255);
    assert_eq!(img.get_pixel(15, 0).0[3], 0);
}

#[test]
fn test_recognised_but_unsupported_format() {
    let mut bmp = b"BM".to_vec();
    bmp.extend_from_slice(&[0u8; 64]);

    let err = transform(&bmp, Operation::Fit, Size::new(1, 1), ResampleMethod::Nearest)
        .unwrap_err();
    assert_eq!(err, ResizeError::UnsupportedFormat("bmp".to_string()));
    assert!(err.is_invalid_source());
}

#[test]
fn test_oversized_target_is_rejected_without_allocating() {
    let err = transform(
        &png(4, 4),
        Operation::Scale,
        Size::new(60000, 60000),
        ResampleMethod::Nearest,
    )
    .unwrap_err();
    assert!(matches!(err, ResizeError::ResizeFailed(_)));
    assert!(!err.is_invalid_source());
}

#[test]
fn test_empty_body_is_invalid_source() {
    let err = transform(&[], Operation::Scale, Size::new(1, 1), ResampleMethod::Nearest)
        .unwrap_err();
    assert!(matches!(
        err,
        ResizeError::DecodeFailed(_) | ResizeError::UnsupportedFormat(_)
    ));
}

#[rstest]
#[case::wide((300, 100), (1, 1), CropBox { x: 100, y: 0, width: 100, height: 100 })]
#[case::tall((100, 300), (1, 1), CropBox { x: 0, y: 100, width: 100, height: 100 })]
#[case::odd_excess((101, 100), (1, 1), CropBox { x: 0, y: 0, width: 100, height: 100 })]
#[case::matching((640, 480), (4, 3), CropBox { x: 0, y: 0, width: 640, height: 480 })]
fn test_fit_crop_box_cases(
    #[case] source: (u32, u32),
    #[case] target: (u32, u32),
    #[case] expected: CropBox,
) {
    assert_eq!(fit_crop_box(source.into(), target.into()), expected);
}

#[rstest]
#[case::already_inside((50, 40), (100, 100), (50, 40))]
#[case::width_bound((400, 200), (100, 100), (100, 50))]
#[case::height_bound((200, 400), (100, 100), (50, 100))]
#[case::exact_box((100, 100), (100, 100), (100, 100))]
#[case::sliver((10000, 1), (100, 100), (100, 1))]
fn test_thumbnail_size_cases(
    #[case] source: (u32, u32),
    #[case] bound: (u32, u32),
    #[case] expected: (u32, u32),
) {
    assert_eq!(
        thumbnail_size(source.into(), bound.into()),
        Size::from(expected)
    );
}
