//! Pure Rust OCR engine wrapper using `pure-onnx-ocr`.

use std::time::Instant;

use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use crate::error::OcrError;
use crate::models::config::RecognitionConfig;

use super::{Point, Recognizer, Region};

/// Recognizer backed by `pure-onnx-ocr` (pure Rust, no external ONNX Runtime).
pub struct PureOcrRecognizer {
    engine: pure_onnx_ocr::engine::OcrEngine,
    keep_unk: bool,
}

impl PureOcrRecognizer {
    /// Load the detection and recognition models named in the configuration.
    pub fn from_config(config: &RecognitionConfig) -> Result<Self, OcrError> {
        let det_path = config.model_path(&config.detection_model);
        let rec_path = config.model_path(&config.recognition_model);
        let dict_path = config.model_path(&config.dictionary);

        let engine = pure_onnx_ocr::engine::OcrEngineBuilder::new()
            .det_model_path(&det_path)
            .rec_model_path(&rec_path)
            .dictionary_path(&dict_path)
            .build()
            .map_err(|e| OcrError::ModelLoad(format!("pure-onnx-ocr: {}", e)))?;

        info!("Loaded pure-onnx-ocr engine from {}", config.model_dir.display());

        Ok(Self {
            engine,
            keep_unk: config.keep_unk,
        })
    }
}

impl Recognizer for PureOcrRecognizer {
    fn recognize(&self, image: &DynamicImage) -> Result<Vec<Region>, OcrError> {
        let start = Instant::now();
        let (width, height) = image.dimensions();

        let results = self
            .engine
            .run_from_image(image)
            .map_err(|e| OcrError::Recognition(format!("pure-onnx-ocr: {}", e)))?;

        // Engine order is kept: the overlay is drawn in detection order.
        let regions: Vec<Region> = results
            .iter()
            .map(|r| {
                let text = if self.keep_unk {
                    r.text.clone()
                } else {
                    r.text.replace("[UNK]", " ")
                };
                Region::new(polygon_to_bbox(&r.bounding_box), text, r.confidence)
            })
            .collect();

        debug!(
            "pure-onnx-ocr found {} regions in {}x{} image in {}ms",
            regions.len(),
            width,
            height,
            start.elapsed().as_millis()
        );

        Ok(regions)
    }
}

/// Take the first four exterior points of the detection polygon.
fn polygon_to_bbox(polygon: &pure_onnx_ocr::Polygon<f64>) -> [Point; 4] {
    let mut bbox = [Point::new(0.0, 0.0); 4];
    for (corner, coord) in bbox.iter_mut().zip(polygon.exterior().coords().take(4)) {
        *corner = Point::new(coord.x as f32, coord.y as f32);
    }
    bbox
}
