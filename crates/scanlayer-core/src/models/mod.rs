//! Data models for the pipeline.

pub mod config;

pub use config::{
    CorrectionConfig, OverlayConfig, PreprocessingConfig, RecognitionConfig, ScanlayerConfig,
};
