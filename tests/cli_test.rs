// tests/cli_test.rs
//
// Runs the voicecheckr binary against generated files

mod test_utils;

use test_utils::*;
use voicecheckr::testgen::{write_wav as write_waveform, TestFileGenerator};
use voicecheckr::{FeatureSchema, FeatureSlot, SchemaVersion};

#[test]
fn test_list_features() {
    let output = run_voicecheckr("--list-features")
        .args(["--schema", "extended"])
        .output()
        .expect("Failed to execute voicecheckr");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("92 features"));
    assert!(stdout.contains("pitch_std"));
}

#[test]
fn test_json_run_over_directory() {
    let dir = tempfile::tempdir().unwrap();
    let audio_dir = dir.path().join("audio");
    TestFileGenerator::new(&audio_dir).unwrap().generate_suite(1.0).unwrap();
    write_waveform(&audio_dir.join("blip.wav"), &sine(300.0, 0.2, 0.5)).unwrap();

    let schema = FeatureSchema::new(SchemaVersion::Basic);
    let model_path = dir.path().join("model.json");
    let silence_pos = schema.position(FeatureSlot::SilenceRatio).unwrap();
    single_weight_model(&schema, silence_pos, -40.0, 2.0)
        .save(&model_path)
        .unwrap();

    let output = run_voicecheckr(&audio_dir)
        .arg("--json")
        .arg("--model")
        .arg(&model_path)
        .output()
        .expect("Failed to execute voicecheckr");
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(report["request_id"].is_string());
    assert_eq!(report["schema"], "basic");

    let files = report["files"].as_array().unwrap();
    assert_eq!(files.len(), 6);

    let by_name = |name: &str| {
        files
            .iter()
            .find(|f| f["file"].as_str().map(|p| p.ends_with(name)).unwrap_or(false))
            .unwrap()
            .clone()
    };
    assert_eq!(by_name("blip.wav")["error"]["kind"], "client_input");
    assert_eq!(by_name("steady_tone.wav")["result"]["label"], "AI_GENERATED");
    assert_eq!(by_name("human_like.wav")["result"]["label"], "HUMAN");
}

#[test]
fn test_missing_model_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let clip = dir.path().join("clip.wav");
    write_waveform(&clip, &sine(200.0, 1.0, 0.5)).unwrap();

    let output = run_voicecheckr(&clip)
        .arg("--model")
        .arg(dir.path().join("missing.json"))
        .output()
        .expect("Failed to execute voicecheckr");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("model"));
}

#[test]
fn test_invalid_threshold_aborts() {
    let output = run_voicecheckr("clip.wav")
        .args(["--threshold", "1.2"])
        .output()
        .expect("Failed to execute voicecheckr");
    assert!(!output.status.success());
}
