//! End-to-end generation against an in-process rasterizer.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use iconbadge::{
    generate, BadgeError, Concurrency, DrawOp, GenerateOptions, IconSetManifest, MaskConfig,
    MaskOverrides, Progress, Rasterizer, RenderRequest, Result, MANIFEST_FILENAME,
};
use image::{ImageBuffer, Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use tempfile::{tempdir, TempDir};

/// Decodes the source with `image`, fills the mask's bottom-left pixel and
/// re-encodes to the destination. Records every request it sees.
#[derive(Default)]
struct ImageRasterizer {
    requests: Mutex<Vec<RenderRequest>>,
    fail_on: Option<String>,
}

impl Rasterizer for ImageRasterizer {
    fn rasterize(&self, request: &RenderRequest) -> Result<()> {
        self.requests.lock().unwrap().push(request.clone());

        if self.fail_on.as_deref() == Some(request.filename.as_str()) {
            return Err(BadgeError::Render {
                filename: request.filename.clone(),
                reason: "exit status: 1".to_string(),
            });
        }

        let mut img = image::open(&request.source)
            .map_err(|e| BadgeError::Render {
                filename: request.filename.clone(),
                reason: e.to_string(),
            })?
            .to_rgba8();
        let h = img.height();
        img.put_pixel(0, h - 1, Rgba([245, 166, 35, 255]));
        img.save(&request.destination).map_err(|e| BadgeError::Render {
            filename: request.filename.clone(),
            reason: e.to_string(),
        })?;
        Ok(())
    }
}

fn write_png(path: &Path, size: u32) {
    let img: RgbaImage = ImageBuffer::from_pixel(size, size, Rgba([30, 30, 30, 255]));
    img.save(path).unwrap();
}

/// Creates `AppIcon.appiconset` with a PNG per descriptor.
fn iconset(descriptors: &[(&str, &str, &str, u32)]) -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let set = dir.path().join("AppIcon.appiconset");
    fs::create_dir_all(&set).unwrap();

    let mut images = Vec::new();
    for &(size, scale, filename, px) in descriptors {
        write_png(&set.join(filename), px);
        images.push(format!(
            r#"{{ "size": "{}", "idiom": "iphone", "filename": "{}", "scale": "{}" }}"#,
            size, filename, scale
        ));
    }
    let manifest = format!(
        r#"{{ "images": [ {} ], "info": {{ "version": 1, "author": "xcode" }} }}"#,
        images.join(", ")
    );
    fs::write(set.join(MANIFEST_FILENAME), manifest).unwrap();

    (dir, set)
}

#[test]
fn single_icon_with_defaults() {
    let (_dir, set) = iconset(&[("60x60", "2x", "icon.png", 120)]);
    let rasterizer = ImageRasterizer::default();
    let options = GenerateOptions::new(&set, MaskConfig::default());

    let output = generate(&options, &rasterizer, |_| {}).unwrap();

    assert_eq!(output, set.with_file_name("AppIcon-Beta.appiconset"));
    assert!(output.join("icon-Beta.png").is_file());

    let manifest = IconSetManifest::load(&output).unwrap();
    assert_eq!(manifest.len(), 1);
    assert_eq!(manifest.images[0].filename.as_deref(), Some("icon-Beta.png"));
    assert_eq!(manifest.images[0].size, "60x60");
    assert_eq!(manifest.images[0].scale, "2x");
    assert_eq!(manifest.images[0].extra["idiom"], "iphone");
    assert!(manifest.extra.contains_key("info"));

    // W = H = 60 * 2, so the hypotenuse meets the bottom edge at (64.8, 120).
    let requests = rasterizer.requests.lock().unwrap();
    let DrawOp::Polygon(points) = &requests[0].ops[2] else {
        panic!("expected polygon, got {:?}", requests[0].ops[2]);
    };
    assert!((points[2].x - 64.8).abs() < 1e-9);
    assert_eq!(points[2].y, 120.0);

    let rendered = image::open(output.join("icon-Beta.png")).unwrap().to_rgba8();
    assert_eq!(rendered.dimensions(), (120, 120));
}

#[test]
fn full_set_in_parallel_matches_sequential() {
    let descriptors = [
        ("20x20", "2x", "icon-20@2x.png", 40),
        ("20x20", "3x", "icon-20@3x.png", 60),
        ("29x29", "2x", "icon-29@2x.png", 58),
        ("40x40", "2x", "icon-40@2x.png", 80),
        ("60x60", "3x", "icon-60@3x.png", 180),
        ("83.5x83.5", "2x", "icon-83.5@2x.png", 167),
    ];

    let (_a, seq_set) = iconset(&descriptors);
    let (_b, par_set) = iconset(&descriptors);

    let mut sequential = GenerateOptions::new(&seq_set, MaskConfig::default());
    sequential.concurrency = Concurrency::Sequential;
    let mut parallel = GenerateOptions::new(&par_set, MaskConfig::default());
    parallel.concurrency = Concurrency::from(Some(4));

    let seq_out = generate(&sequential, &ImageRasterizer::default(), |_| {}).unwrap();
    let par_out = generate(&parallel, &ImageRasterizer::default(), |_| {}).unwrap();

    let seq_json = fs::read(seq_out.join(MANIFEST_FILENAME)).unwrap();
    let par_json = fs::read(par_out.join(MANIFEST_FILENAME)).unwrap();
    assert_eq!(seq_json, par_json);

    let manifest = IconSetManifest::load(&par_out).unwrap();
    let names: Vec<_> = manifest
        .images
        .iter()
        .map(|d| d.filename.clone().unwrap())
        .collect();
    assert_eq!(
        names,
        vec![
            "icon-20@2x-Beta.png",
            "icon-20@3x-Beta.png",
            "icon-29@2x-Beta.png",
            "icon-40@2x-Beta.png",
            "icon-60@3x-Beta.png",
            "icon-83.5@2x-Beta.png",
        ]
    );
}

#[test]
fn progress_starts_with_total() {
    let (_dir, set) = iconset(&[
        ("20x20", "1x", "a.png", 20),
        ("20x20", "2x", "b.png", 40),
        ("20x20", "3x", "c.png", 60),
    ]);
    let mut reports: Vec<Progress> = Vec::new();

    generate(
        &GenerateOptions::new(&set, MaskConfig::default()),
        &ImageRasterizer::default(),
        |p| reports.push(p),
    )
    .unwrap();

    assert_eq!(reports[0].current, None);
    assert_eq!(reports.len(), 4);
    let mut indices: Vec<_> = reports[1..].iter().filter_map(|p| p.current).collect();
    indices.sort_unstable();
    assert_eq!(indices, vec![0, 1, 2]);
}

#[test]
fn custom_suffix_and_output_dir() {
    let (dir, set) = iconset(&[("60x60", "2x", "icon.png", 120)]);
    let overrides = MaskOverrides {
        suffix: Some("RC".to_string()),
        shape: Some("square".to_string()),
        stroke_width_offset: Some(0.0),
        ..Default::default()
    };
    let mut options = GenerateOptions::new(&set, MaskConfig::build(&overrides).unwrap());
    let out_dir = dir.path().join("build").join("Badged.appiconset");
    options.output = Some(out_dir.clone());

    let rasterizer = ImageRasterizer::default();
    let output = generate(&options, &rasterizer, |_| {}).unwrap();

    assert_eq!(output, out_dir);
    assert!(out_dir.join("icon-RC.png").is_file());
    let requests = rasterizer.requests.lock().unwrap();
    assert!(matches!(requests[0].ops[2], DrawOp::Rectangle { .. }));
}

#[test]
fn existing_output_dir_is_reused() {
    let (_dir, set) = iconset(&[("60x60", "2x", "icon.png", 120)]);
    let options = GenerateOptions::new(&set, MaskConfig::default());

    generate(&options, &ImageRasterizer::default(), |_| {}).unwrap();
    let output = generate(&options, &ImageRasterizer::default(), |_| {}).unwrap();

    assert!(output.join(MANIFEST_FILENAME).is_file());
}

#[test]
fn missing_manifest_fails_before_any_work() {
    let dir = tempdir().unwrap();
    let set = dir.path().join("Empty.appiconset");
    fs::create_dir_all(&set).unwrap();

    let err = generate(
        &GenerateOptions::new(&set, MaskConfig::default()),
        &ImageRasterizer::default(),
        |_| panic!("no progress expected"),
    )
    .unwrap_err();

    assert!(matches!(err, BadgeError::Precondition { .. }));
    assert!(!dir.path().join("Empty-Beta.appiconset").exists());
}

#[test]
fn failed_image_means_no_manifest() {
    let (_dir, set) = iconset(&[
        ("20x20", "2x", "a.png", 40),
        ("20x20", "3x", "b.png", 60),
    ]);
    let rasterizer = ImageRasterizer {
        fail_on: Some("b-Beta.png".to_string()),
        ..Default::default()
    };

    let err = generate(
        &GenerateOptions::new(&set, MaskConfig::default()),
        &rasterizer,
        |_| {},
    )
    .unwrap_err();

    let BadgeError::BatchFailed { failures } = err else {
        panic!("expected batch failure, got {:?}", err);
    };
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].filename, "b.png");

    let output = set.with_file_name("AppIcon-Beta.appiconset");
    assert!(output.join("a-Beta.png").is_file());
    assert!(!output.join(MANIFEST_FILENAME).exists());
}

#[test]
fn malformed_manifest_aborts_run() {
    let (_dir, set) = iconset(&[("60x60", "2x", "icon.png", 120)]);
    fs::write(
        set.join(MANIFEST_FILENAME),
        r#"{ "images": [ { "size": "sixty", "scale": "2x", "filename": "icon.png" } ] }"#,
    )
    .unwrap();

    let err = generate(
        &GenerateOptions::new(&set, MaskConfig::default()),
        &ImageRasterizer::default(),
        |_| {},
    )
    .unwrap_err();

    assert!(matches!(err, BadgeError::ManifestParse { .. }));
    let output = set.with_file_name("AppIcon-Beta.appiconset");
    assert!(!output.join(MANIFEST_FILENAME).exists());
}
