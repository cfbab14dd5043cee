//! Feature extraction regression test
//!
//! Full and empty masks give the expected statistics for any window, and
//! measuring the same window twice gives the same answer.

use fovstat_core::ImageFormat;
use fovstat_sampling::{
    AcceptanceSampler, DEFAULT_MAX_ATTEMPTS, Domain, FeatureExtractor, RandomWindowGenerator, WindowStatistics,
};
use fovstat_test::{RegParams, block_mask, empty_mask, filled_mask};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn extract_reg() {
    let mut rp = RegParams::new("extract");

    let (w, h) = (400, 300);
    let generator = RandomWindowGenerator::new(90, 60, Domain::for_image(w, h)).expect("generator");
    let sampler = AcceptanceSampler::new(generator, DEFAULT_MAX_ATTEMPTS).expect("sampler");
    let windows = sampler.sample(&mut StdRng::seed_from_u64(17), 30).expect("sample");
    let extractor = FeatureExtractor::default();
    let stats = WindowStatistics::new(90, 60).expect("stats");

    // --- Fully foreground mask ---
    let full = filled_mask(w, h);
    for window in &windows {
        let ext = extractor.extract(&full, window).expect("extract");
        let rec = stats.measure(&ext.areas());
        eprintln!(
            "  angle {:2}: number {}, area fraction {:.4}",
            window.angle_degrees(),
            rec.number,
            rec.area_fraction
        );
        rp.compare_values(1.0, rec.number as f64, 0.0);
        rp.compare_values(1.0, rec.area_fraction, 0.02);
    }

    // --- Fully background mask ---
    let empty = empty_mask(w, h);
    for window in &windows {
        let rec = stats.measure(&extractor.extract(&empty, window).expect("extract").areas());
        rp.compare_values(0.0, rec.number as f64, 0.0);
        rp.compare_values(0.0, rec.area_fraction, 0.0);
    }

    // --- Repeated extraction is deterministic ---
    let mask = block_mask(w, h, 150, 100, 260, 180);
    for window in windows.iter().take(10) {
        let a = stats.measure(&extractor.extract(&mask, window).expect("extract").areas());
        let b = stats.measure(&extractor.extract(&mask, window).expect("extract").areas());
        rp.compare_values(a.number as f64, b.number as f64, 0.0);
        rp.compare_values(a.area_fraction, b.area_fraction, 0.0);
    }

    // --- Overlay of one window ---
    let overlay = extractor
        .extract(&mask, &windows[0])
        .expect("extract")
        .overlay()
        .expect("overlay");
    rp.write_pix_and_check(&overlay, ImageFormat::Tiff).expect("write overlay");

    assert!(rp.cleanup(), "extract regression test failed");
}
