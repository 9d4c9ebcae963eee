//! Overlay stages driven through the public API with a font-free rasterizer.

use imgvis::codec;
use imgvis::ir::{
    ClassificationInstance, Image, ImageFormat, IndexMatrix, LocatedObject, ObjectDetectionInstance,
    SegmentationAnnotation, SegmentationInstance, SegmentationLayers, Rect,
};
use imgvis::stages::{
    OverlayIc, OverlayIcOptions, OverlayIs, OverlayIsOptions, OverlayOd, OverlayOdOptions,
    Processor,
};
use image::Rgb;

mod common;
use common::{png_bytes, SolidFonts, SOLID_GLYPH};

fn png(width: u32, height: u32, color: [u8; 3]) -> Image {
    Image::new("frame.png", png_bytes(width, height, color), ImageFormat::Png, width, height)
}

fn pixel(image: &Image, x: u32, y: u32) -> Rgb<u8> {
    *codec::decode(image).expect("decode").to_rgb8().get_pixel(x, y)
}

#[test]
fn detection_overlay_draws_only_allowed_labels() {
    let mut stage = OverlayOd::new(
        OverlayOdOptions {
            labels: vec!["cat".into()],
            outline_thickness: 1,
            ..Default::default()
        },
        &SolidFonts,
    )
    .expect("create stage");
    let element = ObjectDetectionInstance {
        image: png(60, 60, [0, 0, 0]),
        annotations: vec![
            LocatedObject::new(Rect::new(5, 20, 25, 40)).with_meta("type", "cat"),
            LocatedObject::new(Rect::new(35, 20, 55, 40)).with_meta("type", "dog"),
        ],
    };

    let output = stage.process(element.clone()).expect("process");

    assert!(stage.registry().contains("cat"));
    assert!(!stage.registry().contains("dog"));
    assert_eq!(stage.registry().len(), 1);
    // Outline of the cat box, below the label text.
    assert_ne!(pixel(&output.image, 5, 35), Rgb([0, 0, 0]));
    // Far corner of the label background, just past the "cat" text.
    let (w, h) = (3 * SOLID_GLYPH.0, SOLID_GLYPH.1);
    assert_ne!(pixel(&output.image, 5 + w, 20 + h), Rgb([0, 0, 0]));
    // The dog box is untouched.
    assert_eq!(pixel(&output.image, 35, 35), Rgb([0, 0, 0]));
    assert_eq!(pixel(&output.image, 36, 21), Rgb([0, 0, 0]));
    // Input image is unchanged and annotations travel along.
    assert_eq!(output.annotations, element.annotations);
    assert_eq!(output.image.format, ImageFormat::Png);
    assert_eq!(output.image.size(), (60, 60));
}

#[test]
fn detection_overlay_fill_blends_with_image() {
    let mut stage = OverlayOd::new(
        OverlayOdOptions {
            text_format: String::new(),
            colors: "200,0,0".into(),
            fill: true,
            fill_alpha: 128,
            outline_thickness: 0,
            ..Default::default()
        },
        &SolidFonts,
    )
    .expect("create stage");
    let element = ObjectDetectionInstance {
        image: png(20, 20, [0, 0, 200]),
        annotations: vec![LocatedObject::new(Rect::new(2, 2, 17, 17)).with_meta("type", "cat")],
    };

    let output = stage.process(element).expect("process");
    assert_eq!(pixel(&output.image, 10, 10), Rgb([100, 0, 100]));
    assert_eq!(pixel(&output.image, 0, 0), Rgb([0, 0, 200]));
}

#[test]
fn segmentation_overlay_paints_masks() {
    let mut stage = OverlayIs::new(OverlayIsOptions {
        alpha: 255,
        colors: "0,255,0".into(),
        ..Default::default()
    })
    .expect("create stage");
    let matrix = IndexMatrix::from_rows(&[vec![1, 1, 0, 0], vec![0, 1, 0, 0]]).expect("matrix");
    let element = SegmentationInstance {
        image: png(4, 2, [0, 0, 0]),
        annotations: SegmentationAnnotation {
            labels: vec!["grass".into()],
            layers: SegmentationLayers::Indexed(matrix),
        },
    };

    let output = stage.process(element).expect("process");
    assert_eq!(pixel(&output.image, 0, 0), Rgb([0, 255, 0]));
    assert_eq!(pixel(&output.image, 1, 1), Rgb([0, 255, 0]));
    assert_eq!(pixel(&output.image, 0, 1), Rgb([0, 0, 0]));
    assert_eq!(pixel(&output.image, 3, 0), Rgb([0, 0, 0]));
}

#[test]
fn classification_overlay_writes_label() {
    let mut stage = OverlayIc::new(
        OverlayIcOptions {
            position: "2,3".into(),
            font_color: "255,0,0".into(),
            ..Default::default()
        },
        &SolidFonts,
    )
    .expect("create stage");
    let element = ClassificationInstance {
        image: png(30, 20, [0, 0, 0]),
        label: "dog".into(),
    };

    let output = stage.process(element).expect("process");
    assert_eq!(output.label, "dog");
    assert_eq!(pixel(&output.image, 2, 3), Rgb([255, 0, 0]));
    let (w, h) = (3 * SOLID_GLYPH.0, SOLID_GLYPH.1);
    assert_eq!(pixel(&output.image, 2 + w - 1, 3 + h - 1), Rgb([255, 0, 0]));
    assert_eq!(pixel(&output.image, 2 + w, 3), Rgb([0, 0, 0]));
}
