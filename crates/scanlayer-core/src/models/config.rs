//! Configuration structures for the searchable PDF pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::pdf::TextRenderMode;

/// Main configuration for the scanlayer pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanlayerConfig {
    /// Text overlay configuration.
    pub overlay: OverlayConfig,

    /// Spelling correction configuration.
    pub correction: CorrectionConfig,

    /// Image preprocessing configuration.
    pub preprocessing: PreprocessingConfig,

    /// OCR model configuration.
    pub recognition: RecognitionConfig,
}

/// Invisible text layer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Regions at or below this confidence are dropped (0.0 - 1.0).
    pub min_confidence: f32,

    /// Opacity of the text layer (0.0 = transparent, 1.0 = opaque).
    pub fill_alpha: f32,

    /// How the text layer is painted.
    pub render_mode: TextRenderMode,

    /// Name of the registered font used for every text draw.
    pub font_resource: String,

    /// TrueType file registered under `font_resource`. When unset the name
    /// must be one of the standard PDF base fonts.
    pub font_file: Option<PathBuf>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            fill_alpha: 0.5,
            render_mode: TextRenderMode::Fill,
            font_resource: "Helvetica".to_string(),
            font_file: None,
        }
    }
}

/// Spelling correction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    /// Apply dictionary correction to recognized text.
    pub enabled: bool,

    /// Word frequency list (`word count` per line). Uses the built-in
    /// English list when unset.
    pub dictionary: Option<PathBuf>,

    /// Maximum edit distance for a suggestion.
    pub max_distance: usize,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dictionary: None,
            max_distance: 2,
        }
    }
}

/// Image preprocessing applied before recognition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Run preprocessing at all.
    pub enabled: bool,

    /// Gaussian blur sigma (1.1 matches a 5x5 kernel).
    pub blur_sigma: f32,

    /// Apply Otsu binarization after blurring.
    pub binarize: bool,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            blur_sigma: 1.1,
            binarize: true,
        }
    }
}

/// OCR model file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Directory containing model files.
    pub model_dir: PathBuf,

    /// Text detection model file name.
    pub detection_model: String,

    /// Text recognition model file name.
    pub recognition_model: String,

    /// Character dictionary file name.
    pub dictionary: String,

    /// Keep `[UNK]` placeholders in recognized text.
    pub keep_unk: bool,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            detection_model: "det.onnx".to_string(),
            recognition_model: "latin_rec.onnx".to_string(),
            dictionary: "latin_dict.txt".to_string(),
            keep_unk: false,
        }
    }
}

impl RecognitionConfig {
    /// Get full path to a model file.
    pub fn model_path(&self, file_name: &str) -> PathBuf {
        self.model_dir.join(file_name)
    }

    /// Check whether the detection and recognition models exist on disk.
    pub fn models_present(&self) -> bool {
        self.model_path(&self.detection_model).exists()
            && self.model_path(&self.recognition_model).exists()
    }
}

impl ScanlayerConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> crate::Result<()> {
        let overlay = &self.overlay;
        if !(0.0..=1.0).contains(&overlay.min_confidence) {
            return Err(crate::ScanlayerError::Config(format!(
                "overlay.min_confidence must be within 0..=1, got {}",
                overlay.min_confidence
            )));
        }
        if !(0.0..=1.0).contains(&overlay.fill_alpha) {
            return Err(crate::ScanlayerError::Config(format!(
                "overlay.fill_alpha must be within 0..=1, got {}",
                overlay.fill_alpha
            )));
        }
        if overlay.font_resource.trim().is_empty() {
            return Err(crate::ScanlayerError::Config(
                "overlay.font_resource must not be empty".to_string(),
            ));
        }
        if self.preprocessing.enabled && !(self.preprocessing.blur_sigma >= 0.0) {
            return Err(crate::ScanlayerError::Config(format!(
                "preprocessing.blur_sigma must be non-negative, got {}",
                self.preprocessing.blur_sigma
            )));
        }
        Ok(())
    }
}
