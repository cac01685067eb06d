//! Convert command - build a searchable PDF from a single page image.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use scanlayer_core::models::config::ScanlayerConfig;
use scanlayer_core::{
    load_corrector, AssemblyReport, FixtureRecognizer, PureOcrRecognizer, Recognizer,
    SearchablePdfPipeline, TextRenderMode,
};

use super::config::load_config;

/// Arguments for the convert command.
#[derive(Args)]
pub struct ConvertArgs {
    /// Input page image (PNG, JPEG, TIFF, BMP)
    #[arg(required = true)]
    input: PathBuf,

    /// Output PDF (default: output_<timestamp>.pdf)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON file with precomputed OCR regions instead of running the OCR models
    #[arg(short, long)]
    regions: Option<PathBuf>,

    /// Model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Drop regions at or below this confidence
    #[arg(long)]
    min_confidence: Option<f32>,

    /// Text layer opacity
    #[arg(long)]
    alpha: Option<f32>,

    /// Write the text layer in invisible render mode
    #[arg(long)]
    invisible: bool,

    /// Font resource name (a standard PDF font unless --font-file is given)
    #[arg(long)]
    font: Option<String>,

    /// TrueType font file to embed
    #[arg(long)]
    font_file: Option<PathBuf>,

    /// Word frequency list used for spelling correction
    #[arg(long)]
    dictionary: Option<PathBuf>,

    /// Keep recognized text as-is
    #[arg(long)]
    no_spellcheck: bool,

    /// Skip blur and binarization
    #[arg(long)]
    no_preprocess: bool,

    /// Print the assembly report as JSON
    #[arg(long)]
    json: bool,
}

impl ConvertArgs {
    /// Apply command-line overrides on top of file configuration.
    fn apply(&self, config: &mut ScanlayerConfig) {
        if let Some(min_confidence) = self.min_confidence {
            config.overlay.min_confidence = min_confidence;
        }
        if let Some(alpha) = self.alpha {
            config.overlay.fill_alpha = alpha;
        }
        if self.invisible {
            config.overlay.render_mode = TextRenderMode::Invisible;
        }
        if let Some(font) = &self.font {
            config.overlay.font_resource = font.clone();
        }
        if let Some(font_file) = &self.font_file {
            config.overlay.font_file = Some(font_file.clone());
        }
        if let Some(dictionary) = &self.dictionary {
            config.correction.dictionary = Some(dictionary.clone());
        }
        if self.no_spellcheck {
            config.correction.enabled = false;
        }
        if self.no_preprocess {
            config.preprocessing.enabled = false;
        }
        if let Some(model_dir) = &self.model_dir {
            config.recognition.model_dir = model_dir.clone();
        }
    }
}

pub fn run(args: ConvertArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    args.apply(&mut config);
    config.validate()?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Converting file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));

    pb.set_message("Loading recognizer...");
    let recognizer = load_recognizer(&args, &config)?;

    pb.set_message("Loading dictionary...");
    let corrector = load_corrector(&config.correction)?;

    pb.set_message("Building searchable PDF...");
    let pipeline = SearchablePdfPipeline::new(recognizer, corrector, config);
    let document = pipeline.process_file(&args.input)?;

    pb.set_message("Writing output...");
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(default_output_name(Local::now().naive_local())));
    write_atomically(&output_path, document.data())?;

    pb.finish_and_clear();

    let (width, height) = document.page_size();
    let status = format!(
        "{} Wrote {}x{} page to {}",
        style("✓").green(),
        width,
        height,
        output_path.display()
    );

    // stdout carries only the report document in JSON mode
    if args.json {
        println!("{}", serde_json::to_string_pretty(document.report())?);
        eprintln!("{}", status);
    } else {
        print_report(document.report());
        println!("{}", status);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn load_recognizer(args: &ConvertArgs, config: &ScanlayerConfig) -> anyhow::Result<Box<dyn Recognizer>> {
    if let Some(regions) = &args.regions {
        if !regions.exists() {
            anyhow::bail!("Regions file not found: {}", regions.display());
        }
        return Ok(Box::new(FixtureRecognizer::from_file(regions)?));
    }

    let recognition = &config.recognition;
    if !recognition.models_present() {
        anyhow::bail!(
            "OCR models not found at {}.\n\n\
             Pass --model-dir with {} and {}, or --regions with a precomputed OCR result.",
            recognition.model_dir.display(),
            recognition.detection_model,
            recognition.recognition_model
        );
    }

    Ok(Box::new(PureOcrRecognizer::from_config(recognition)?))
}

/// Timestamped output name in the working directory.
fn default_output_name(now: NaiveDateTime) -> String {
    now.format("output_%Y%m%d_%H%M%S.pdf").to_string()
}

/// Write through a temp file in the target directory so a failed run never
/// leaves a partial PDF behind.
fn write_atomically(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(data)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

fn print_report(report: &AssemblyReport) {
    println!(
        "{} {} of {} regions drawn",
        style("ℹ").blue(),
        report.drawn,
        report.regions_seen
    );
    if report.corrected > 0 {
        println!("  {} corrected", report.corrected);
    }
    if report.correction_unavailable > 0 {
        println!("  {} kept without correction", report.correction_unavailable);
    }
    if report.malformed > 0 {
        println!(
            "  {} {} skipped with invalid geometry",
            style("!").yellow(),
            report.malformed
        );
    }
}
