//! Pipeline regression test
//!
//! Folder of images in, CSV tables and overlay frames out.

use fovstat::export::{csv_path, write_csv_tables};
use fovstat::frames::FrameWriter;
use fovstat::input::{ImageConfigs, collect_images, image_files};
use fovstat::io::{read_image, write_image};
use fovstat::sampling::{BatchRunner, ImageConfig, SamplingConfig};
use fovstat::ImageFormat;
use fovstat_test::{RegParams, block_mask, gray_block, regout_dir};
use std::fs;
use std::path::PathBuf;

#[test]
fn pipeline_reg() {
    let mut rp = RegParams::new("pipeline");

    let root = PathBuf::from(regout_dir()).join("pipeline");
    let _ = fs::remove_dir_all(&root);
    let input = root.join("input");
    fs::create_dir_all(input.join("nested")).expect("create input");

    // Binary mask, dark-on-white gray image in a subfolder, and a stray file.
    let mask = block_mask(300, 200, 100, 100, 150, 150);
    write_image(&mask, input.join("block.png"), ImageFormat::Png).expect("write block");
    let dark = gray_block(600, 400, (200, 200, 300, 300), 0, 255);
    write_image(&dark, input.join("nested").join("dark.tif"), ImageFormat::Tiff).expect("write dark");
    fs::write(input.join("notes.txt"), "not an image").expect("write notes");

    // --- Discovery ---
    let paths = collect_images(&input).expect("collect");
    rp.compare_values(2.0, paths.len() as f64, 0.0);

    let mut configs = ImageConfigs::new(ImageConfig::default());
    configs.set_scale("dark", 2.0);
    configs.set_invert("dark");
    let sources = image_files(&paths, &configs);

    // --- Sampling with overlays ---
    let frames = FrameWriter::new(root.join("frames"));
    let runner = BatchRunner::new(SamplingConfig {
        run_count: 4,
        seed: Some(8),
        ..SamplingConfig::default()
    });
    let report = runner.run_batch(&sources, &frames);
    rp.check(report.is_success(), "all images processed");
    rp.compare_values(2.0, report.results.len() as f64, 0.0);

    for id in ["block", "dark"] {
        let table = report.results.get(id);
        rp.compare_values(4.0, table.map(|t| t.len()).unwrap_or(0) as f64, 0.0);
        for i in 1..=4 {
            rp.check(frames.frame_path(id, i).is_file(), "frame written");
        }
    }

    // --- Export ---
    let out = root.join("tables");
    let written = write_csv_tables(&report.results, &out).expect("export");
    rp.compare_values(2.0, written.len() as f64, 0.0);
    let csv = fs::read_to_string(csv_path(&out, "block")).expect("read csv");
    rp.compare_values(5.0, csv.lines().count() as f64, 0.0);
    rp.compare_strings(b"Number,Area fraction", csv.lines().next().unwrap_or("").as_bytes());

    // --- Repeated file names keep the first image's frames ---
    let twins = root.join("twins");
    fs::create_dir_all(twins.join("a")).expect("create twins/a");
    fs::create_dir_all(twins.join("b")).expect("create twins/b");
    write_image(&block_mask(300, 200, 100, 100, 150, 150), twins.join("a").join("img.png"), ImageFormat::Png)
        .expect("write a/img");
    write_image(&block_mask(500, 400, 100, 100, 150, 150), twins.join("b").join("img.png"), ImageFormat::Png)
        .expect("write b/img");
    let paths = collect_images(&twins).expect("collect twins");
    let sources = image_files(&paths, &ImageConfigs::new(ImageConfig::default()));
    let twin_frames = FrameWriter::new(root.join("twin_frames"));
    let report = runner.run_batch(&sources, &twin_frames);
    rp.compare_values(1.0, report.results.len() as f64, 0.0);
    rp.compare_values(1.0, report.failures.len() as f64, 0.0);
    for i in 1..=4 {
        let frame = read_image(twin_frames.frame_path("img", i));
        rp.check(frame.is_ok_and(|f| f.width() == 300 && f.height() == 200), "first image frame kept");
    }
    rp.check(!twin_frames.frame_path("img", 5).exists(), "no extra frames");

    assert!(rp.cleanup(), "pipeline regression test failed");
}
