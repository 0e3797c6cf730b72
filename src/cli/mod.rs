// src/cli/mod.rs
//
// Command-line interface module

mod args;
mod output;

pub use args::Args;
pub use output::{format_json, format_result, format_summary, FileReport, RunReport, Summary};

use anyhow::{Context, Result};
use chrono::Utc;
use colorful::Colorful;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use log::info;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;
use walkdir::WalkDir;

use crate::core::{ExtractorConfig, FeatureExtractor, FeatureSchema};
use crate::detection::{ModelClassifier, VoiceDetector};
use crate::error::DetectionError;
use crate::testgen::TestFileGenerator;

const AUDIO_EXTENSIONS: [&str; 7] = ["flac", "wav", "mp3", "ogg", "m4a", "aac", "opus"];

fn has_audio_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Expand files and directories into a sorted list of audio files
pub fn collect_audio_files(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for path in inputs {
        if path.is_file() {
            if has_audio_extension(path) {
                files.push(path.clone());
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                if entry.file_type().is_file() && has_audio_extension(entry.path()) {
                    files.push(entry.path().to_path_buf());
                }
            }
        }
    }

    files.sort();
    files.dedup();
    files
}

fn build_detector(args: &Args) -> Result<(VoiceDetector, String)> {
    let policy = args.calibration_policy().context("Invalid calibration policy")?;
    let extractor = FeatureExtractor::new(ExtractorConfig::for_schema(args.schema_version()))
        .context("Invalid extractor configuration")?;

    let model_path = args.model_path().ok_or_else(|| {
        DetectionError::ModelUnavailable("no --model given and no config directory".to_string())
    })?;
    let classifier = ModelClassifier::load(&model_path, extractor.schema())
        .with_context(|| format!("Failed to load model {}", model_path.display()))?;
    let model_name = classifier.artifact().model.kind_name().to_string();

    let detector = VoiceDetector::new(extractor, Arc::new(classifier), policy)?
        .include_features(args.dump_features);
    Ok((detector, model_name))
}

fn print_schema(schema: &FeatureSchema) {
    println!(
        "{} schema: {} features, fingerprint {}\n",
        schema.version(),
        schema.len(),
        schema.fingerprint()
    );
    for (i, name) in schema.names().iter().enumerate() {
        println!("  {:>3}  {}", i, name);
    }
}

/// Run the CLI. Per-file failures are reported in the output; only
/// configuration problems return an error.
pub fn run(args: &Args) -> Result<Summary> {
    if let Some(dir) = &args.generate {
        let generator = TestFileGenerator::new(dir)?;
        let manifest = generator.generate_suite(3.0)?;
        println!(
            "Wrote {} test signals to {}",
            manifest.cases.len(),
            generator.output_dir().display()
        );
        return Ok(Summary::default());
    }

    if args.list_features {
        print_schema(&FeatureSchema::new(args.schema_version()));
        return Ok(Summary::default());
    }

    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .context("Failed to configure worker threads")?;
    }

    let (detector, model_name) = build_detector(args)?;
    let files = collect_audio_files(&args.inputs);

    if files.is_empty() {
        if !args.json {
            println!("{}", "No audio files found!".red());
        }
        return Ok(Summary::default());
    }
    info!(
        "analyzing {} file(s) with {} model, {} policy",
        files.len(),
        model_name,
        detector.policy().preset
    );

    let progress = if args.json {
        ProgressBar::hidden()
    } else {
        let bar = ProgressBar::new(files.len() as u64);
        if let Ok(style) = ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:40} {pos}/{len}") {
            bar.set_style(style);
        }
        bar
    };

    let reports: Vec<FileReport> = files
        .par_iter()
        .progress_with(progress.clone())
        .map(|path| FileReport::from_outcome(path.display().to_string(), detector.analyze_file(path)))
        .collect();
    progress.finish_and_clear();

    let summary = Summary::from_reports(&reports);

    if args.json {
        let report = RunReport {
            request_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            model: model_name,
            policy: detector.policy().name.clone(),
            threshold: detector.policy().threshold,
            schema: detector.extractor().schema().version().to_string(),
            files: reports,
        };
        println!("{}", format_json(&report)?);
    } else {
        let schema = detector.extractor().schema();
        for report in &reports {
            println!("{}", format_result(report, schema, args.verbose > 0));
        }
        if reports.len() > 1 {
            print!("{}", format_summary(&summary));
        }
    }

    Ok(summary)
}
