//! Image cleanup before recognition: Gaussian blur and Otsu binarization.

use std::time::Instant;

use image::{DynamicImage, GrayImage, Luma};
use tracing::debug;

use crate::error::OcrError;
use crate::models::config::PreprocessingConfig;

/// Image preprocessor for the OCR pipeline.
pub struct ImagePreprocessor {
    blur_sigma: f32,
    binarize: bool,
}

impl ImagePreprocessor {
    /// Create a preprocessor with default settings.
    pub fn new() -> Self {
        Self::from_config(&PreprocessingConfig::default())
    }

    /// Create a preprocessor from configuration.
    pub fn from_config(config: &PreprocessingConfig) -> Self {
        Self {
            blur_sigma: config.blur_sigma,
            binarize: config.binarize,
        }
    }

    /// Set the blur sigma. Zero disables blurring.
    pub fn with_blur_sigma(mut self, sigma: f32) -> Self {
        self.blur_sigma = sigma;
        self
    }

    /// Enable or disable binarization.
    pub fn with_binarize(mut self, binarize: bool) -> Self {
        self.binarize = binarize;
        self
    }

    /// Blur, then binarize. The output keeps the input's dimensions.
    pub fn process(&self, image: &DynamicImage) -> Result<DynamicImage, OcrError> {
        if image.width() == 0 || image.height() == 0 {
            return Err(OcrError::Preprocessing("image has no pixels".to_string()));
        }
        if !self.blur_sigma.is_finite() || self.blur_sigma < 0.0 {
            return Err(OcrError::Preprocessing(format!(
                "invalid blur sigma {}",
                self.blur_sigma
            )));
        }

        let start = Instant::now();

        let blurred = if self.blur_sigma > 0.0 {
            image.blur(self.blur_sigma)
        } else {
            image.clone()
        };

        let output = if self.binarize {
            let gray = blurred.to_luma8();
            let threshold = otsu_threshold(&gray);
            debug!("Otsu threshold: {}", threshold);
            DynamicImage::ImageLuma8(apply_threshold(&gray, threshold))
        } else {
            blurred
        };

        debug!(
            "Preprocessed {}x{} image in {}ms (sigma={}, binarize={})",
            image.width(),
            image.height(),
            start.elapsed().as_millis(),
            self.blur_sigma,
            self.binarize
        );

        Ok(output)
    }
}

impl Default for ImagePreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the threshold that maximizes between-class variance of the
/// grayscale histogram. Pixels strictly above it become white.
pub fn otsu_threshold(gray: &GrayImage) -> u8 {
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    let total: u64 = histogram.iter().sum();
    if total == 0 {
        return 0;
    }

    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut background_weight = 0u64;
    let mut background_sum = 0.0f64;
    let mut best_threshold = 0u8;
    let mut best_variance = -1.0f64;

    for (level, &count) in histogram.iter().enumerate() {
        background_weight += count;
        if background_weight == 0 {
            continue;
        }
        let foreground_weight = total - background_weight;
        if foreground_weight == 0 {
            break;
        }

        background_sum += level as f64 * count as f64;
        let background_mean = background_sum / background_weight as f64;
        let foreground_mean = (weighted_total - background_sum) / foreground_weight as f64;
        let diff = background_mean - foreground_mean;
        let variance = background_weight as f64 * foreground_weight as f64 * diff * diff;

        if variance > best_variance {
            best_variance = variance;
            best_threshold = level as u8;
        }
    }

    best_threshold
}

fn apply_threshold(gray: &GrayImage, threshold: u8) -> GrayImage {
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] > threshold {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_tone(width: u32, height: u32, dark: u8, light: u8) -> GrayImage {
        GrayImage::from_fn(width, height, |x, _| {
            if x < width / 2 { Luma([dark]) } else { Luma([light]) }
        })
    }

    #[test]
    fn test_otsu_separates_two_tones() {
        let gray = two_tone(20, 10, 40, 200);
        let threshold = otsu_threshold(&gray);
        assert!((40..200).contains(&threshold));
    }

    #[test]
    fn test_otsu_uniform_image() {
        let gray = GrayImage::from_pixel(8, 8, Luma([128]));
        // Single class: nothing to separate
        assert_eq!(otsu_threshold(&gray), 0);
    }

    #[test]
    fn test_process_binarizes_and_keeps_size() {
        let image = DynamicImage::ImageLuma8(two_tone(40, 30, 30, 220));
        let output = ImagePreprocessor::new().with_blur_sigma(0.0).process(&image).unwrap();

        assert_eq!((output.width(), output.height()), (40, 30));
        let gray = output.to_luma8();
        assert!(gray.pixels().all(|p| p[0] == 0 || p[0] == 255));
        assert_eq!(gray.get_pixel(0, 0)[0], 0);
        assert_eq!(gray.get_pixel(39, 0)[0], 255);
    }

    #[test]
    fn test_blur_only() {
        let image = DynamicImage::new_rgb8(16, 16);
        let output = ImagePreprocessor::new().with_binarize(false).process(&image).unwrap();
        assert_eq!((output.width(), output.height()), (16, 16));
    }

    #[test]
    fn test_empty_image_rejected() {
        let image = DynamicImage::new_rgb8(0, 0);
        assert!(ImagePreprocessor::new().process(&image).is_err());
    }
}
