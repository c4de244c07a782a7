use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

struct TestEnv {
    _tmp: TempDir,
    root: std::path::PathBuf,
}

impl TestEnv {
    fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let root = tmp.path().to_path_buf();
        fs::create_dir_all(root.join("data")).expect("create data dir");
        Self { _tmp: tmp, root }
    }

    fn models(&self) -> std::path::PathBuf {
        self.root.join("models")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("cropcast").expect("binary built");
        cmd.current_dir(&self.root)
            .env_remove("CROPCAST_MODEL_DIR")
            .env_remove("CROPCAST_DATA_DIR")
            .env_remove("RUST_LOG")
            .arg("--model-dir")
            .arg(self.models())
            .arg("--data-dir")
            .arg(self.root.join("data"));
        cmd
    }

    fn write_sensor_data(&self) {
        write_sensor_csv(&self.root.join("data").join("sensor_data.csv"));
    }

    fn train(&self) {
        self.write_sensor_data();
        self.cmd()
            .args(["train"])
            .assert()
            .success()
            .stderr(predicate::str::contains("Crop classifier accuracy"));
    }
}

fn write_sensor_csv(path: &Path) {
    let mut csv = String::from("temperature,humidity,soil,ph,npk,crop_type,water_need\n");
    for i in 0..40 {
        let jitter = (i % 7) as f64 * 0.4;
        let line = match i % 3 {
            0 => format!("{},50,4,6.0,30,wheat,{:.2}\n", 16.0 + jitter, 2.0 + jitter / 4.0),
            1 => format!("{},70,6,6.5,40,maize,{:.2}\n", 24.0 + jitter, 5.0 + jitter / 4.0),
            _ => format!("{},88,8,7.0,50,rice,{:.2}\n", 32.0 + jitter, 8.0 + jitter / 4.0),
        };
        csv.push_str(&line);
    }
    fs::write(path, csv).expect("write dataset");
}

fn stdout_json(output: &[u8]) -> Value {
    serde_json::from_slice(output).expect("stdout is one JSON object")
}

#[test]
fn train_writes_both_artifacts() {
    let env = TestEnv::new();
    env.train();

    assert!(env.models().join("crop_model.bin").is_file());
    assert!(env.models().join("water_model.bin").is_file());
}

#[test]
fn train_without_dataset_fails() {
    let env = TestEnv::new();
    env.cmd()
        .arg("train")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No suitable dataset found"));
}

#[test]
fn predict_sensor_record_succeeds() {
    let env = TestEnv::new();
    env.train();

    let out = env
        .cmd()
        .args(["predict", r#"{"temperature": 25, "humidity": 80, "soil": 6, "ph": 6.5, "npk": 40}"#])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = stdout_json(&out);
    assert_eq!(json["status"], "success");
    assert!(!json["predicted_crop"].as_str().unwrap_or_default().is_empty());
    let water = json["predicted_water_need"].as_f64().expect("numeric water need");
    assert!((0.0..=10.0).contains(&water));
    assert_eq!((water * 100.0).round() / 100.0, water);
}

#[test]
fn predict_reads_json_file_argument() {
    let env = TestEnv::new();
    env.train();
    let input = env.root.join("input.json");
    fs::write(&input, r#"{"Temperature": "33", "HUMIDITY": 88, "NPK": 50}"#).unwrap();

    let out = env
        .cmd()
        .arg("predict")
        .arg(&input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(stdout_json(&out)["predicted_crop"], "rice");
}

#[test]
fn predict_reads_stdin() {
    let env = TestEnv::new();
    env.train();

    let out = env
        .cmd()
        .arg("predict")
        .write_stdin(r#"{"temperature": 16, "humidity": 50}"#)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(stdout_json(&out)["status"], "success");
}

#[test]
fn predict_empty_stdin_fails() {
    let env = TestEnv::new();

    let out = env
        .cmd()
        .arg("predict")
        .write_stdin("")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("No input provided"))
        .get_output()
        .stdout
        .clone();

    let json = stdout_json(&out);
    assert_eq!(json["status"], "failed");
    assert_eq!(json["kind"], "input");
    assert!(json.get("predicted_crop").is_none());
}

#[test]
fn predict_record_without_known_features_succeeds() {
    let env = TestEnv::new();
    env.train();

    let out = env
        .cmd()
        .args(["predict", r#"{"location": "field 4", "sensor_id": 12}"#])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    assert_eq!(stdout_json(&out)["status"], "success");
}

#[test]
fn predict_without_artifacts_reports_artifact_failure() {
    let env = TestEnv::new();

    let out = env
        .cmd()
        .args(["predict", r#"{"ph": 6.5}"#])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("cropcast train"))
        .get_output()
        .stdout
        .clone();
    assert_eq!(stdout_json(&out)["kind"], "artifact");
}

#[test]
fn predict_malformed_json_fails() {
    let env = TestEnv::new();
    env.cmd()
        .args(["predict", "{temperature: 25"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"status\":\"failed\""));
}

#[test]
fn evaluate_reports_accuracy_and_mae() {
    let env = TestEnv::new();
    env.train();

    env.cmd()
        .arg("evaluate")
        .assert()
        .success()
        .stdout(predicate::str::contains("Crop type accuracy:"))
        .stdout(predicate::str::contains("Water need mean absolute error:"));
}

#[test]
fn evaluate_without_artifacts_fails() {
    let env = TestEnv::new();
    env.write_sensor_data();
    env.cmd()
        .arg("evaluate")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("run `cropcast train` first"));
}

#[test]
fn model_dir_from_environment() {
    let env = TestEnv::new();
    env.write_sensor_data();
    let models = env.root.join("env-models");

    let mut cmd = Command::cargo_bin("cropcast").unwrap();
    cmd.current_dir(&env.root)
        .env("CROPCAST_MODEL_DIR", &models)
        .env("CROPCAST_DATA_DIR", env.root.join("data"))
        .arg("train")
        .assert()
        .success();

    assert!(models.join("crop_model.bin").is_file());
}
