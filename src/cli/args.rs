//! CLI argument parsing with policy support

use clap::Parser;
use std::path::PathBuf;

use crate::config::{CalibrationPolicy, PolicyBuilder, PolicyPreset};
use crate::core::SchemaVersion;
use crate::error::Result;

fn parse_policy(name: &str) -> std::result::Result<PolicyPreset, String> {
    PolicyPreset::from_name(name).ok_or_else(|| format!("unknown policy '{}' (expected answer or raw)", name))
}

fn parse_schema(name: &str) -> std::result::Result<SchemaVersion, String> {
    SchemaVersion::from_name(name)
        .ok_or_else(|| format!("unknown schema '{}' (expected basic or extended)", name))
}

#[derive(Parser, Debug)]
#[command(name = "voicecheckr")]
#[command(version, about = "Detect AI-generated speech in audio files")]
pub struct Args {
    /// Input files or directories
    #[arg(required_unless_present_any = ["generate", "list_features"])]
    pub inputs: Vec<PathBuf>,

    /// Trained model artifact (JSON)
    #[arg(short, long, env = "VOICECHECKR_MODEL")]
    pub model: Option<PathBuf>,

    /// Decision threshold on the raw AI probability [default: 0.6]
    #[arg(short, long, env = "VOICECHECKR_THRESHOLD")]
    pub threshold: Option<f64>,

    /// Calibration policy: answer (label confidence, [0.50, 0.98] with boost)
    /// or raw (AI score clamped to [0.02, 0.98])
    #[arg(short, long, value_parser = parse_policy, default_value = "answer")]
    pub policy: PolicyPreset,

    /// Load the calibration policy from a JSON file instead of a preset
    #[arg(long, conflicts_with = "policy")]
    pub policy_file: Option<PathBuf>,

    /// Feature schema the model was trained on: basic (39) or extended (92)
    #[arg(short, long, value_parser = parse_schema, default_value = "basic")]
    pub schema: SchemaVersion,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Include the extracted feature vector in the output
    #[arg(long)]
    pub dump_features: bool,

    /// Number of worker threads (default: all cores)
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Write synthetic test signals to this directory and exit
    #[arg(long, value_name = "DIR")]
    pub generate: Option<PathBuf>,

    /// Print the feature schema layout and exit
    #[arg(long)]
    pub list_features: bool,

    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn schema_version(&self) -> SchemaVersion {
        self.schema
    }

    /// Explicit `--model`, else `<config dir>/voicecheckr/model.json`
    pub fn model_path(&self) -> Option<PathBuf> {
        self.model
            .clone()
            .or_else(|| dirs::config_dir().map(|d| d.join("voicecheckr").join("model.json")))
    }

    /// Policy from `--policy-file` or the preset, with `--threshold` applied
    pub fn calibration_policy(&self) -> Result<CalibrationPolicy> {
        let mut policy = match &self.policy_file {
            Some(path) => CalibrationPolicy::load(path)?,
            None => PolicyBuilder::from_preset(self.policy).build()?,
        };
        if let Some(threshold) = self.threshold {
            policy.threshold = threshold;
            policy.validate()?;
        }
        Ok(policy)
    }

    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}
