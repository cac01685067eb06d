//! End-to-end conversion of one page image into a searchable PDF.

use std::path::Path;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::correction::{Corrector, FrequencyDictionary, NoCorrection};
use crate::error::{CanvasError, Result, ScanlayerError};
use crate::models::config::{CorrectionConfig, ScanlayerConfig};
use crate::ocr::{ImagePreprocessor, Recognizer};
use crate::overlay::{Document, PageAssembler};
use crate::pdf::{FontResource, PageCanvas, PdfCanvas};

/// Build the corrector described by the configuration.
pub fn load_corrector(config: &CorrectionConfig) -> Result<Box<dyn Corrector>> {
    if !config.enabled {
        debug!("Spelling correction disabled");
        return Ok(Box::new(NoCorrection));
    }

    let dictionary = match &config.dictionary {
        Some(path) => FrequencyDictionary::from_file(path)?,
        None => FrequencyDictionary::english()?,
    };
    Ok(Box::new(dictionary.with_max_distance(config.max_distance)))
}

/// Preprocess, recognize and assemble a single page.
pub struct SearchablePdfPipeline<R, K> {
    recognizer: R,
    assembler: PageAssembler<K>,
    config: ScanlayerConfig,
}

impl<R: Recognizer, K: Corrector> SearchablePdfPipeline<R, K> {
    /// Create a pipeline from a recognizer, a corrector and configuration.
    pub fn new(recognizer: R, corrector: K, config: ScanlayerConfig) -> Self {
        let assembler = PageAssembler::from_config(corrector, &config.overlay);
        Self {
            recognizer,
            assembler,
            config,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ScanlayerConfig {
        &self.config
    }

    /// Load an image file and convert it.
    pub fn process_file(&self, path: &Path) -> Result<Document> {
        if !path.is_file() {
            return Err(ScanlayerError::MissingInput(format!(
                "image not found: {}",
                path.display()
            )));
        }
        let image = image::open(path)?;
        debug!("Loaded {} ({}x{})", path.display(), image.width(), image.height());
        self.process(&image)
    }

    /// Convert a decoded image.
    ///
    /// With preprocessing enabled the preprocessed raster is both recognized
    /// and embedded as the page image.
    pub fn process(&self, image: &DynamicImage) -> Result<Document> {
        let start = Instant::now();

        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(ScanlayerError::MissingInput(format!(
                "image has no pixels ({}x{})",
                width, height
            )));
        }

        let preprocessed;
        let page = if self.config.preprocessing.enabled {
            preprocessed =
                ImagePreprocessor::from_config(&self.config.preprocessing).process(image)?;
            &preprocessed
        } else {
            image
        };

        let regions = self.recognizer.recognize(page)?;
        debug!("Recognized {} regions", regions.len());

        let mut canvas = self.canvas()?;
        let document = self.assembler.assemble(
            &mut canvas,
            page,
            regions,
            self.config.overlay.min_confidence,
        )?;

        info!(
            "Converted {}x{} image in {}ms",
            width,
            height,
            start.elapsed().as_millis()
        );
        Ok(document)
    }

    /// A fresh canvas with the configured font registered.
    fn canvas(&self) -> Result<PdfCanvas> {
        let overlay = &self.config.overlay;
        let font = FontResource::resolve(&overlay.font_resource, overlay.font_file.as_deref())
            .map_err(|e| match e {
                CanvasError::FontNotRegistered(name) => ScanlayerError::FontNotRegistered(name),
                other => ScanlayerError::Canvas(other),
            })?;

        let mut canvas = PdfCanvas::new();
        canvas.register_font(&overlay.font_resource, font)?;
        Ok(canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ocr::{FixtureRecognizer, Region};
    use crate::pdf::TextRenderMode;
    use image::{GrayImage, Luma};
    use lopdf::content::Content;

    fn scan() -> DynamicImage {
        // Dark text-like block on a light page
        let mut gray = GrayImage::from_pixel(200, 100, Luma([230]));
        for y in 20..40 {
            for x in 20..120 {
                gray.put_pixel(x, y, Luma([20]));
            }
        }
        DynamicImage::ImageRgb8(DynamicImage::ImageLuma8(gray).to_rgb8())
    }

    fn recognizer() -> FixtureRecognizer {
        FixtureRecognizer::new(vec![
            Region::from_corners((20.0, 20.0), (120.0, 40.0), "helo", 0.9),
            Region::from_corners((20.0, 60.0), (80.0, 70.0), "noise", 0.2),
        ])
    }

    fn image_color_space(data: &[u8]) -> Vec<u8> {
        let doc = lopdf::Document::load_mem(data).unwrap();
        doc.objects
            .values()
            .filter_map(|obj| obj.as_stream().ok())
            .find(|stream| {
                stream
                    .dict
                    .get(b"Subtype")
                    .and_then(|s| s.as_name())
                    .map(|n| n == b"Image")
                    .unwrap_or(false)
            })
            .map(|stream| stream.dict.get(b"ColorSpace").unwrap().as_name().unwrap().to_vec())
            .unwrap()
    }

    #[test]
    fn test_process_draws_accepted_regions() {
        let dictionary = FrequencyDictionary::parse("hello 10").unwrap();
        let pipeline =
            SearchablePdfPipeline::new(recognizer(), dictionary, ScanlayerConfig::default());

        let document = pipeline.process(&scan()).unwrap();

        assert_eq!(document.page_size(), (200, 100));
        assert_eq!(document.report().regions_seen, 2);
        assert_eq!(document.report().drawn, 1);
        assert_eq!(document.report().corrected, 1);

        let pdf = lopdf::Document::load_mem(document.data()).unwrap();
        let page_id = *pdf.get_pages().get(&1).unwrap();
        let content = Content::decode(&pdf.get_page_content(page_id).unwrap()).unwrap();
        let shown: Vec<Vec<u8>> = content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .map(|op| op.operands[0].as_str().unwrap().to_vec())
            .collect();
        assert_eq!(shown, vec![b"hello".to_vec()]);
    }

    #[test]
    fn test_preprocessed_image_is_embedded() {
        let pipeline =
            SearchablePdfPipeline::new(recognizer(), NoCorrection, ScanlayerConfig::default());
        let document = pipeline.process(&scan()).unwrap();
        assert_eq!(image_color_space(document.data()), b"DeviceGray");
    }

    #[test]
    fn test_preprocessing_disabled_keeps_original() {
        let mut config = ScanlayerConfig::default();
        config.preprocessing.enabled = false;
        let pipeline = SearchablePdfPipeline::new(recognizer(), NoCorrection, config);

        let document = pipeline.process(&scan()).unwrap();
        assert_eq!(image_color_space(document.data()), b"DeviceRGB");
    }

    #[test]
    fn test_invisible_mode_from_config() {
        let mut config = ScanlayerConfig::default();
        config.overlay.render_mode = TextRenderMode::Invisible;
        let pipeline = SearchablePdfPipeline::new(recognizer(), NoCorrection, config);

        let document = pipeline.process(&scan()).unwrap();
        let pdf = lopdf::Document::load_mem(document.data()).unwrap();
        let page_id = *pdf.get_pages().get(&1).unwrap();
        let content = Content::decode(&pdf.get_page_content(page_id).unwrap()).unwrap();
        let tr = content
            .operations
            .iter()
            .find(|op| op.operator == "Tr")
            .unwrap();
        assert_eq!(tr.operands[0].as_i64().unwrap(), 3);
    }

    #[test]
    fn test_unknown_font_is_fatal() {
        let mut config = ScanlayerConfig::default();
        config.overlay.font_resource = "Arial".to_string();
        let pipeline = SearchablePdfPipeline::new(recognizer(), NoCorrection, config);

        let result = pipeline.process(&scan());
        assert!(matches!(result, Err(ScanlayerError::FontNotRegistered(name)) if name == "Arial"));
    }

    #[test]
    fn test_missing_image_file() {
        let pipeline = SearchablePdfPipeline::new(
            FixtureRecognizer::default(),
            NoCorrection,
            ScanlayerConfig::default(),
        );
        let dir = tempfile::tempdir().unwrap();

        let result = pipeline.process_file(&dir.path().join("absent.png"));
        assert!(matches!(result, Err(ScanlayerError::MissingInput(_))));
    }

    #[test]
    fn test_process_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.png");
        scan().save(&path).unwrap();

        let pipeline = SearchablePdfPipeline::new(
            recognizer(),
            NoCorrection,
            ScanlayerConfig::default(),
        );
        let document = pipeline.process_file(&path).unwrap();
        assert_eq!(document.page_size(), (200, 100));
        assert_eq!(document.report().drawn, 1);
    }

    #[test]
    fn test_load_corrector() {
        let disabled = CorrectionConfig {
            enabled: false,
            ..CorrectionConfig::default()
        };
        assert_eq!(load_corrector(&disabled).unwrap().correct("helo"), None);

        let english = load_corrector(&CorrectionConfig::default()).unwrap();
        assert_eq!(english.correct("documnet").as_deref(), Some("document"));
    }

    #[test]
    fn test_load_corrector_missing_dictionary() {
        let config = CorrectionConfig {
            dictionary: Some("/nonexistent/words.txt".into()),
            ..CorrectionConfig::default()
        };
        assert!(matches!(load_corrector(&config), Err(ScanlayerError::Io(_))));
    }

    #[test]
    fn test_load_corrector_rejects_malformed_dictionary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("words.txt");
        std::fs::write(&path, "hello many\n").unwrap();

        let config = CorrectionConfig {
            dictionary: Some(path),
            ..CorrectionConfig::default()
        };
        assert!(matches!(load_corrector(&config), Err(ScanlayerError::Config(_))));
    }

    #[test]
    fn test_embedded_font_carries_typographic_text() {
        let mut config = ScanlayerConfig::default();
        config.overlay.font_resource = "Mono".to_string();
        config.overlay.font_file = Some(
            Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/data/DejaVuSansMono.ttf"),
        );
        let recognizer = FixtureRecognizer::new(vec![Region::from_corners(
            (20.0, 20.0),
            (120.0, 40.0),
            "don\u{2019}t \u{2014} \u{20AC}5",
            0.9,
        )]);
        let pipeline = SearchablePdfPipeline::new(recognizer, NoCorrection, config);

        let document = pipeline.process(&scan()).unwrap();

        let pdf = lopdf::Document::load_mem(document.data()).unwrap();
        let page_id = *pdf.get_pages().get(&1).unwrap();
        let content = Content::decode(&pdf.get_page_content(page_id).unwrap()).unwrap();
        let tj = content
            .operations
            .iter()
            .find(|op| op.operator == "Tj")
            .unwrap();
        assert_eq!(tj.operands[0].as_str().unwrap(), b"don\x92t \x97 \x805");
    }
}
