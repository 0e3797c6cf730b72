//! Output formatting for CLI results

use chrono::{DateTime, Utc};
use colorful::{Color, Colorful};
use serde::Serialize;
use uuid::Uuid;

use crate::core::FeatureSchema;
use crate::detection::{ClassificationResult, Label};
use crate::error::DetectionError;

/// Outcome of analyzing one file
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ClassificationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorReport>,
}

#[derive(Debug, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub message: String,
}

impl FileReport {
    pub fn from_outcome(file: String, outcome: Result<ClassificationResult, DetectionError>) -> Self {
        match outcome {
            Ok(result) => Self {
                file,
                result: Some(result),
                error: None,
            },
            Err(e) => Self {
                file,
                result: None,
                error: Some(ErrorReport {
                    kind: e.kind().as_str(),
                    message: e.to_string(),
                }),
            },
        }
    }
}

/// Everything produced by one invocation
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub request_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub model: String,
    pub policy: String,
    pub threshold: f64,
    pub schema: String,
    pub files: Vec<FileReport>,
}

/// Format one file's verdict for the terminal
pub fn format_result(report: &FileReport, schema: &FeatureSchema, verbose: bool) -> String {
    let mut output = String::new();

    match (&report.result, &report.error) {
        (Some(result), _) => {
            let color = match result.label {
                Label::AiGenerated => Color::Red,
                Label::Human => Color::Green,
            };
            output.push_str(&format!(
                "{} {}\n",
                result.label.symbol().color(color),
                report.file.clone().bold()
            ));
            output.push_str(&format!(
                "  {} (confidence: {:.1}%)\n",
                result.label.description().color(color),
                result.confidence * 100.0
            ));
            output.push_str(&format!("  {}\n", result.explanation));

            if verbose {
                output.push_str(&format!(
                    "  {}\n",
                    format!("Raw AI probability: {:.4}", result.raw_probability).dim()
                ));
            }

            if let Some(features) = &result.features {
                output.push_str("\n  Features:\n");
                for (name, value) in features.named(schema) {
                    output.push_str(&format!("    {:<28} {:>14.6}\n", name, value));
                }
            }
        }
        (None, Some(error)) => {
            output.push_str(&format!("{} {}\n", "!".yellow(), report.file.clone().bold()));
            output.push_str(&format!("  {}\n", error.message.clone().yellow()));
        }
        (None, None) => {}
    }

    output
}

/// Format the whole run as pretty JSON
pub fn format_json(report: &RunReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Counts per outcome
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub ai_generated: usize,
    pub human: usize,
    pub rejected: usize,
    pub failed: usize,
}

impl Summary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut summary = Self::default();
        for report in reports {
            match (&report.result, &report.error) {
                (Some(r), _) if r.label == Label::AiGenerated => summary.ai_generated += 1,
                (Some(_), _) => summary.human += 1,
                (None, Some(e)) if e.kind == "client_input" => summary.rejected += 1,
                _ => summary.failed += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.ai_generated + self.human + self.rejected + self.failed
    }
}

/// Format a summary for multiple files
pub fn format_summary(summary: &Summary) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{}\n", "Summary:".bold()));
    output.push_str(&format!("  {} files analyzed\n", summary.total()));

    if summary.human > 0 {
        output.push_str(&format!("  {}\n", format!("✓ {} human", summary.human).green()));
    }
    if summary.ai_generated > 0 {
        output.push_str(&format!("  {}\n", format!("✗ {} AI-generated", summary.ai_generated).red()));
    }
    if summary.rejected > 0 {
        output.push_str(&format!("  {}\n", format!("! {} rejected", summary.rejected).yellow()));
    }
    if summary.failed > 0 {
        output.push_str(&format!("  {}\n", format!("? {} failed", summary.failed).dim()));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SchemaVersion;

    fn result(label: Label) -> ClassificationResult {
        ClassificationResult {
            label,
            raw_probability: 0.82,
            confidence: 0.85,
            explanation: "Classified as AI-generated speech. Robotic pitch consistency detected."
                .to_string(),
            features: None,
        }
    }

    #[test]
    fn test_format_result() {
        let schema = FeatureSchema::new(SchemaVersion::Basic);
        let report = FileReport::from_outcome("clip.wav".into(), Ok(result(Label::AiGenerated)));
        let text = format_result(&report, &schema, true);
        assert!(text.contains("clip.wav"));
        assert!(text.contains("85.0%"));
        assert!(text.contains("Robotic pitch consistency"));
        assert!(text.contains("0.8200"));
    }

    #[test]
    fn test_error_report_kind() {
        let report = FileReport::from_outcome("short.wav".into(), Err(DetectionError::EmptyAudio));
        let error = report.error.as_ref().unwrap();
        assert_eq!(error.kind, "client_input");
        assert_eq!(error.message, "audio is empty");
    }

    #[test]
    fn test_summary_counts() {
        let reports = vec![
            FileReport::from_outcome("a".into(), Ok(result(Label::AiGenerated))),
            FileReport::from_outcome("b".into(), Ok(result(Label::Human))),
            FileReport::from_outcome("c".into(), Err(DetectionError::EmptyAudio)),
            FileReport::from_outcome("d".into(), Err(DetectionError::PredictionFailed("x".into()))),
        ];
        let summary = Summary::from_reports(&reports);
        assert_eq!(
            summary,
            Summary { ai_generated: 1, human: 1, rejected: 1, failed: 1 }
        );
        assert!(format_summary(&summary).contains("4 files analyzed"));
    }

    #[test]
    fn test_json_report() {
        let report = RunReport {
            request_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            model: "voice".into(),
            policy: "answer-confidence".into(),
            threshold: 0.6,
            schema: "basic".into(),
            files: vec![FileReport::from_outcome("a.wav".into(), Ok(result(Label::AiGenerated)))],
        };
        let json = format_json(&report).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["files"][0]["result"]["label"], "AI_GENERATED");
        assert!(value["files"][0].get("error").is_none());
    }
}
