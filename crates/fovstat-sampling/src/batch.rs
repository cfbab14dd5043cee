//! Batch processing
//!
//! [`BatchRunner`] turns one feature mask into a [`ResultTable`] by
//! sampling windows, extracting each one and measuring it, then repeats
//! that over a collection of images to build a [`ResultSet`].
//!
//! Images are independent. Each gets its own `StdRng`, seeded with the
//! batch seed plus the image's position, so [`BatchRunner::run_batch`]
//! and [`BatchRunner::run_batch_parallel`] give identical results for the
//! same seed. A failing image is reported in [`BatchReport::failures`] and
//! never leaves a partial table behind. An image whose identifier repeats
//! an earlier one fails before it is loaded, so observers never see it.

use crate::acceptance::{AcceptanceSampler, DEFAULT_MAX_ATTEMPTS, DEFAULT_RUN_COUNT};
use crate::error::{SamplingError, SamplingResult};
use crate::extract::{Extraction, FeatureExtractor};
use crate::stats::WindowStatistics;
use crate::table::{ResultSet, ResultTable, SampleRecord};
use crate::window::{Domain, RandomWindowGenerator, Window};
use fovstat_core::{Pix, PixelDepth};
use fovstat_region::ContourRetrieval;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// Length of the field of view in physical units.
pub const PMT_LENGTH: f64 = 90.0;

/// Breadth of the field of view in physical units.
pub const PMT_BREADTH: f64 = 60.0;

/// Batch-wide sampling parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingConfig {
    /// Accepted windows per image
    pub run_count: usize,
    /// Generated windows per image before giving up
    pub max_attempts: u64,
    /// Minimum distance of base points from the image edges
    pub safety_margin: f64,
    /// Which traced borders count as components
    pub retrieval: ContourRetrieval,
    /// Batch seed; a random one is drawn when `None`
    pub seed: Option<u64>,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            run_count: DEFAULT_RUN_COUNT,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            safety_margin: 0.0,
            retrieval: ContourRetrieval::Tree,
            seed: None,
        }
    }
}

/// Per-image parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageConfig {
    /// Complement gray values before binarizing
    pub invert: bool,
    /// Pixels per physical unit
    pub scale: f64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            invert: false,
            scale: 1.0,
        }
    }
}

impl ImageConfig {
    /// Window size in pixels: the field of view times the scale, rounded.
    ///
    /// # Errors
    ///
    /// Returns [`SamplingError::Configuration`] for a non-finite or
    /// non-positive scale, or one so small the window vanishes.
    pub fn window_dimensions(&self) -> SamplingResult<(u32, u32)> {
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(SamplingError::Configuration(format!(
                "scale must be positive and finite, got {}",
                self.scale
            )));
        }
        let length = (self.scale * PMT_LENGTH).round();
        let breadth = (self.scale * PMT_BREADTH).round();
        if length < 1.0 || breadth < 1.0 {
            return Err(SamplingError::Configuration(format!(
                "scale {} gives a window of zero area",
                self.scale
            )));
        }
        if length > f64::from(u32::MAX) || breadth > f64::from(u32::MAX) {
            return Err(SamplingError::Configuration(format!(
                "scale {} gives an oversized window",
                self.scale
            )));
        }
        Ok((length as u32, breadth as u32))
    }
}

/// Supplies one image to the batch
pub trait MaskSource {
    /// Identifier used as the key in the result set
    fn id(&self) -> &str;

    /// Inversion flag and scale for this image
    fn config(&self) -> ImageConfig;

    /// Load the image. Any depth is accepted; the runner binarizes it.
    fn load_image(&self) -> SamplingResult<Pix>;
}

/// An image already in memory
#[derive(Debug, Clone)]
pub struct InMemoryImage {
    pub id: String,
    pub image: Pix,
    pub config: ImageConfig,
}

impl InMemoryImage {
    pub fn new(id: impl Into<String>, image: Pix, config: ImageConfig) -> Self {
        Self {
            id: id.into(),
            image,
            config,
        }
    }
}

impl MaskSource for InMemoryImage {
    fn id(&self) -> &str {
        &self.id
    }

    fn config(&self) -> ImageConfig {
        self.config
    }

    fn load_image(&self) -> SamplingResult<Pix> {
        Ok(self.image.clone())
    }
}

/// Notified after each accepted window has been measured
///
/// Observers run on the worker that processes the image, so they must be
/// `Sync` for parallel batches.
pub trait WindowObserver: Sync {
    /// Called once per accepted window; `index` starts at 1.
    fn on_window(
        &self,
        _image_id: &str,
        _index: usize,
        _window: &Window,
        _extraction: &Extraction,
        _record: &SampleRecord,
    ) {
    }
}

/// Observer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl WindowObserver for NoopObserver {}

/// An image that could not be processed
#[derive(Debug)]
pub struct ImageFailure {
    pub id: String,
    pub error: SamplingError,
}

/// Outcome of a batch
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Tables of the images that succeeded, in input order
    pub results: ResultSet,
    /// Images that failed, in input order
    pub failures: Vec<ImageFailure>,
    /// Seed the batch ran with
    pub seed: u64,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Binarize an image into a feature mask: every nonzero gray value, after
/// optional inversion, is foreground.
pub fn prepare_mask(image: &Pix, invert: bool) -> SamplingResult<Pix> {
    if image.depth() == PixelDepth::Bit1 && !invert {
        return Ok(image.clone());
    }
    Ok(image.binarize_nonzero(invert)?)
}

/// Runs the sampling pipeline over images
#[derive(Debug, Clone, Default)]
pub struct BatchRunner {
    config: SamplingConfig,
}

impl BatchRunner {
    pub fn new(config: SamplingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    /// Sample `run_count` windows of `length` x `breadth` pixels over
    /// `mask` and measure each one.
    ///
    /// # Errors
    ///
    /// Returns [`SamplingError::Configuration`] when the window cannot be
    /// placed or the run count is zero, and [`SamplingError::Input`] for
    /// a mask that is not 1 bpp.
    pub fn run_mask<R: Rng + ?Sized>(
        &self,
        image_id: &str,
        mask: &Pix,
        (length, breadth): (u32, u32),
        rng: &mut R,
        observer: &dyn WindowObserver,
    ) -> SamplingResult<ResultTable> {
        if self.config.run_count == 0 {
            return Err(SamplingError::Configuration(
                "run count must be positive".to_string(),
            ));
        }
        if mask.depth() != PixelDepth::Bit1 {
            return Err(SamplingError::Input(format!(
                "feature mask must be 1 bpp, got {} bpp",
                mask.depth().bits()
            )));
        }

        let domain = Domain::for_image(mask.width(), mask.height());
        let generator =
            RandomWindowGenerator::with_safety_margin(length, breadth, domain, self.config.safety_margin)?;
        let sampler = AcceptanceSampler::new(generator, self.config.max_attempts)?;
        let extractor = FeatureExtractor::new(self.config.retrieval);
        let stats = WindowStatistics::new(length, breadth)?;

        let mut table = ResultTable::with_capacity(self.config.run_count);
        sampler.sample_each(rng, self.config.run_count, |index, window| {
            let extraction = extractor.extract(mask, &window)?;
            let record = stats.measure(&extraction.areas());
            debug!(
                image = image_id,
                index,
                angle = window.angle_degrees(),
                number = record.number,
                area_fraction = record.area_fraction,
                discarded = extraction.discarded(),
                "window measured"
            );
            observer.on_window(image_id, index, &window, &extraction, &record);
            table.push(record);
            Ok(())
        })?;
        Ok(table)
    }

    /// Load, binarize and sample one image.
    pub fn run_image<S, R>(&self, source: &S, rng: &mut R, observer: &dyn WindowObserver) -> SamplingResult<ResultTable>
    where
        S: MaskSource + ?Sized,
        R: Rng + ?Sized,
    {
        let config = source.config();
        let dims = config.window_dimensions()?;
        let image = source.load_image()?;
        let mask = prepare_mask(&image, config.invert)?;
        info!(
            image = source.id(),
            width = mask.width(),
            height = mask.height(),
            window_length = dims.0,
            window_breadth = dims.1,
            "sampling image"
        );
        self.run_mask(source.id(), &mask, dims, rng, observer)
    }

    /// Process every source in order on the current thread.
    pub fn run_batch<S: MaskSource>(&self, sources: &[S], observer: &dyn WindowObserver) -> BatchReport {
        let seed = self.batch_seed();
        let repeated = repeated_ids(sources);
        let outcomes = sources
            .iter()
            .enumerate()
            .map(|(i, source)| self.run_seeded(source, seed, i, repeated[i], observer))
            .collect();
        assemble(sources, outcomes, seed)
    }

    /// Process the sources on the rayon thread pool.
    ///
    /// Results are identical to [`BatchRunner::run_batch`] for the same
    /// seed.
    pub fn run_batch_parallel<S: MaskSource + Sync>(
        &self,
        sources: &[S],
        observer: &dyn WindowObserver,
    ) -> BatchReport {
        let seed = self.batch_seed();
        let repeated = repeated_ids(sources);
        let outcomes = sources
            .par_iter()
            .enumerate()
            .map(|(i, source)| self.run_seeded(source, seed, i, repeated[i], observer))
            .collect();
        assemble(sources, outcomes, seed)
    }

    fn batch_seed(&self) -> u64 {
        self.config.seed.unwrap_or_else(rand::random)
    }

    fn run_seeded<S: MaskSource>(
        &self,
        source: &S,
        seed: u64,
        position: usize,
        repeated: bool,
        observer: &dyn WindowObserver,
    ) -> SamplingResult<ResultTable> {
        if repeated {
            return Err(SamplingError::Configuration(format!(
                "duplicate image identifier '{}'",
                source.id()
            )));
        }
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(position as u64));
        self.run_image(source, &mut rng, observer)
    }
}

/// Flag every source whose identifier already appeared earlier.
fn repeated_ids<S: MaskSource>(sources: &[S]) -> Vec<bool> {
    let mut seen = HashSet::new();
    sources.iter().map(|s| !seen.insert(s.id())).collect()
}

fn assemble<S: MaskSource>(sources: &[S], outcomes: Vec<SamplingResult<ResultTable>>, seed: u64) -> BatchReport {
    let mut report = BatchReport {
        seed,
        ..BatchReport::default()
    };
    for (source, outcome) in sources.iter().zip(outcomes) {
        let id = source.id();
        let inserted = outcome.and_then(|table| {
            let rows = table.len();
            report.results.insert(id, table).map(|()| rows)
        });
        match inserted {
            Ok(rows) => info!(image = id, rows, "image processed"),
            Err(error) => {
                warn!(image = id, %error, "image failed");
                report.failures.push(ImageFailure {
                    id: id.to_string(),
                    error,
                });
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn block_image(w: u32, h: u32) -> Pix {
        let mut pm = Pix::new(w, h, PixelDepth::Bit8).unwrap().to_mut();
        for y in 100..=150 {
            for x in 100..=150 {
                pm.set_pixel_unchecked(x, y, 255);
            }
        }
        pm.into()
    }

    fn seeded(run_count: usize, seed: u64) -> BatchRunner {
        BatchRunner::new(SamplingConfig {
            run_count,
            seed: Some(seed),
            ..SamplingConfig::default()
        })
    }

    #[test]
    fn test_window_dimensions() {
        let dims = |scale| ImageConfig { invert: false, scale }.window_dimensions();
        assert_eq!(dims(1.0).unwrap(), (90, 60));
        assert_eq!(dims(2.5).unwrap(), (225, 150));
        assert_eq!(dims(0.333).unwrap(), (30, 20));
        assert!(dims(0.0).is_err());
        assert!(dims(-1.0).is_err());
        assert!(dims(f64::NAN).is_err());
        assert!(dims(0.001).is_err());
    }

    #[test]
    fn test_prepare_mask() {
        let image = block_image(300, 200);
        let mask = prepare_mask(&image, false).unwrap();
        assert_eq!(mask.count_foreground().unwrap(), 51 * 51);
        let inverted = prepare_mask(&image, true).unwrap();
        assert_eq!(inverted.count_foreground().unwrap(), 300 * 200 - 51 * 51);
    }

    #[test]
    fn test_run_image_rows() {
        let source = InMemoryImage::new("block", block_image(300, 200), ImageConfig::default());
        let mut rng = StdRng::seed_from_u64(11);
        let table = seeded(10, 0).run_image(&source, &mut rng, &NoopObserver).unwrap();
        assert_eq!(table.len(), 10);
        for r in &table {
            assert!((0.0..=2500.0 / 5400.0 + 1e-12).contains(&r.area_fraction));
        }
    }

    #[test]
    fn test_zero_run_count() {
        let source = InMemoryImage::new("block", block_image(300, 200), ImageConfig::default());
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            seeded(0, 0).run_image(&source, &mut rng, &NoopObserver),
            Err(SamplingError::Configuration(_))
        ));
    }

    #[test]
    fn test_failure_isolation() {
        let sources = vec![
            InMemoryImage::new("ok", block_image(300, 200), ImageConfig::default()),
            InMemoryImage::new("too-small", block_image(300, 200), ImageConfig { invert: false, scale: 4.0 }),
            InMemoryImage::new("ok", block_image(300, 200), ImageConfig::default()),
            InMemoryImage::new("also-ok", block_image(300, 200), ImageConfig::default()),
        ];
        let report = seeded(5, 3).run_batch(&sources, &NoopObserver);
        assert_eq!(report.results.ids().collect::<Vec<_>>(), vec!["ok", "also-ok"]);
        let failed: Vec<&str> = report.failures.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(failed, vec!["too-small", "ok"]);
        assert!(report.failures.iter().all(|f| matches!(f.error, SamplingError::Configuration(_))));
        assert!(!report.is_success());
        assert_eq!(report.seed, 3);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sources: Vec<InMemoryImage> = (0..4)
            .map(|i| InMemoryImage::new(format!("img{}", i), block_image(300, 200), ImageConfig::default()))
            .collect();
        let runner = seeded(6, 99);
        let seq = runner.run_batch(&sources, &NoopObserver);
        let par = runner.run_batch_parallel(&sources, &NoopObserver);
        assert_eq!(seq.results, par.results);
        assert_eq!(seq.results.len(), 4);
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, usize)>>,
    }

    impl WindowObserver for Recorder {
        fn on_window(&self, image_id: &str, index: usize, window: &Window, _: &Extraction, _: &SampleRecord) {
            assert!(window.contains_check());
            if let Ok(mut seen) = self.seen.lock() {
                seen.push((image_id.to_string(), index));
            }
        }
    }

    #[test]
    fn test_observer_sees_every_window() {
        let sources = vec![InMemoryImage::new("a", block_image(300, 200), ImageConfig::default())];
        let recorder = Recorder::default();
        let report = seeded(4, 5).run_batch(&sources, &recorder);
        assert!(report.is_success());
        let seen = recorder.seen.into_inner().unwrap();
        let expected: Vec<(String, usize)> = (1..=4).map(|i| ("a".to_string(), i)).collect();
        assert_eq!(seen, expected);
    }

    #[test]
    fn test_duplicate_id_never_sampled() {
        let sources = vec![
            InMemoryImage::new("a", block_image(300, 200), ImageConfig::default()),
            InMemoryImage::new("a", block_image(500, 400), ImageConfig::default()),
        ];
        for parallel in [false, true] {
            let recorder = Recorder::default();
            let runner = seeded(3, 21);
            let report = if parallel {
                runner.run_batch_parallel(&sources, &recorder)
            } else {
                runner.run_batch(&sources, &recorder)
            };
            assert_eq!(report.results.len(), 1);
            assert_eq!(report.failures.len(), 1);
            assert_eq!(report.failures[0].id, "a");
            assert!(matches!(report.failures[0].error, SamplingError::Configuration(_)));
            assert_eq!(recorder.seen.into_inner().unwrap().len(), 3);
        }
    }
}
