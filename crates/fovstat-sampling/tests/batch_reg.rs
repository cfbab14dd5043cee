//! Batch regression test
//!
//! A 300x200 mask with one 50x50 block, sampled with 90x60 windows:
//! windows that hold the whole block see one component of area 2500,
//! windows that miss it see nothing. Fixed windows pin down both cases;
//! the seeded run checks every random window against its block coverage.

use fovstat_core::fill_convex_polygon;
use fovstat_sampling::{
    BatchRunner, ImageConfig, InMemoryImage, NoopObserver, SamplingConfig, SamplingError, WindowObserver,
};
use fovstat_sampling::{Domain, Extraction, FeatureExtractor, SampleRecord, Window, WindowStatistics};
use fovstat_test::{RegParams, block_mask, gray_block};
use std::sync::Mutex;

/// Records how much of the block each window covers.
struct BlockCoverage {
    block: fovstat_core::Pix,
    seen: Mutex<Vec<(u64, SampleRecord)>>,
}

impl WindowObserver for BlockCoverage {
    fn on_window(&self, _: &str, _: usize, window: &Window, _: &Extraction, record: &SampleRecord) {
        let (w, h) = (self.block.width(), self.block.height());
        let covered = fill_convex_polygon(w, h, &window.to_pta())
            .and_then(|region| region.and(&self.block))
            .and_then(|both| both.count_foreground());
        if let (Ok(covered), Ok(mut seen)) = (covered, self.seen.lock()) {
            seen.push((covered, *record));
        }
    }
}

#[test]
fn batch_reg() {
    let mut rp = RegParams::new("batch");

    // --- Block scenario ---
    let block = block_mask(300, 200, 100, 100, 150, 150);
    let block_pixels = 51 * 51;
    let observer = BlockCoverage {
        block: block.clone(),
        seen: Mutex::new(Vec::new()),
    };
    let runner = BatchRunner::new(SamplingConfig {
        run_count: 10,
        seed: Some(314),
        ..SamplingConfig::default()
    });
    let sources = vec![InMemoryImage::new("block", block, ImageConfig::default())];
    let report = runner.run_batch(&sources, &observer);
    rp.check(report.is_success(), "block image processed");
    let rows = report.results.get("block").map(|t| t.len()).unwrap_or(0);
    rp.compare_values(10.0, rows as f64, 0.0);

    let seen = observer.seen.into_inner().expect("observer lock");
    rp.compare_values(10.0, seen.len() as f64, 0.0);
    for (covered, record) in &seen {
        if *covered == block_pixels {
            rp.compare_values(1.0, record.number as f64, 0.0);
            rp.compare_values(2500.0 / 5400.0, record.area_fraction, 1e-9);
        } else if *covered == 0 {
            rp.compare_values(0.0, record.number as f64, 0.0);
            rp.compare_values(0.0, record.area_fraction, 0.0);
        } else {
            rp.check(record.area_fraction < 2500.0 / 5400.0 + 1e-9, "partial block fraction bounded");
        }
    }

    // --- Fixed windows over the same mask ---
    let block = block_mask(300, 200, 100, 100, 150, 150);
    let domain = Domain::for_image(300, 200);
    let extractor = FeatureExtractor::default();
    let stats = WindowStatistics::new(90, 60).expect("window statistics");
    // Base point and angle of windows that hold the whole block
    let holding = [((70.0, 95.0), 0), ((155.0, 80.0), 90), ((85.89, 87.64), 10)];
    // and of windows that miss it.
    let missing = [((5.0, 5.0), 0), ((200.0, 10.0), 0), ((290.0, 100.0), 90)];
    for (base, angle) in holding {
        let window = Window::place(90, 60, base, angle, domain);
        rp.check(window.contains_check(), "holding window inside image");
        let record = extractor
            .extract(&block, &window)
            .map(|ext| stats.measure(&ext.areas()));
        rp.check(
            record.is_ok_and(|r| r.number == 1 && (r.area_fraction - 2500.0 / 5400.0).abs() < 1e-9),
            "window holding block sees one component of area 2500",
        );
    }
    for (base, angle) in missing {
        let window = Window::place(90, 60, base, angle, domain);
        rp.check(window.contains_check(), "missing window inside image");
        let record = extractor
            .extract(&block, &window)
            .map(|ext| stats.measure(&ext.areas()));
        rp.check(
            record.is_ok_and(|r| r.number == 0 && r.area_fraction == 0.0 && r.area_fraction.is_sign_positive()),
            "window missing block sees nothing",
        );
    }

    // --- Gray input with inversion gives the same tables ---
    let plain = vec![InMemoryImage::new(
        "gray",
        gray_block(300, 200, (100, 100, 150, 150), 255, 0),
        ImageConfig::default(),
    )];
    let inverted = vec![InMemoryImage::new(
        "gray",
        gray_block(300, 200, (100, 100, 150, 150), 0, 255),
        ImageConfig {
            invert: true,
            scale: 1.0,
        },
    )];
    let a = runner.run_batch(&plain, &NoopObserver);
    let b = runner.run_batch(&inverted, &NoopObserver);
    rp.check(a.results == b.results, "inverted input matches");

    // --- Parallel runs match sequential runs ---
    let many: Vec<InMemoryImage> = (0..6)
        .map(|i| {
            InMemoryImage::new(
                format!("img{}", i),
                block_mask(300, 200, 20 * i, 30, 20 * i + 60, 90),
                ImageConfig::default(),
            )
        })
        .collect();
    let seq = runner.run_batch(&many, &NoopObserver);
    let par = runner.run_batch_parallel(&many, &NoopObserver);
    rp.compare_values(6.0, par.results.len() as f64, 0.0);
    rp.check(seq.results == par.results, "parallel matches sequential");

    // --- Oversized window fails only its own image ---
    let mixed = vec![
        InMemoryImage::new("small-scale", block_mask(300, 200, 0, 0, 10, 10), ImageConfig::default()),
        InMemoryImage::new(
            "large-scale",
            block_mask(300, 200, 0, 0, 10, 10),
            ImageConfig {
                invert: false,
                scale: 4.0,
            },
        ),
    ];
    let report = runner.run_batch(&mixed, &NoopObserver);
    rp.compare_values(1.0, report.results.len() as f64, 0.0);
    rp.compare_values(1.0, report.failures.len() as f64, 0.0);
    let failure = report.failures.first();
    rp.check(
        failure.is_some_and(|f| f.id == "large-scale" && matches!(f.error, SamplingError::Configuration(_))),
        "large-scale reported as configuration error",
    );

    // --- CSV export ---
    let table = seq.results.get("img0").expect("img0 table");
    let csv = table.to_csv_string();
    let lines: Vec<&str> = csv.lines().collect();
    rp.compare_values(7.0, lines.len() as f64, 0.0);
    rp.compare_strings(b"Number,Area fraction", lines[0].as_bytes());

    assert!(rp.cleanup(), "batch regression test failed");
}
