use std::path::PathBuf;

use instrument_locator::{Error, cli::ConfigCommand};

fn write(dir: &tempfile::TempDir, name: &str, body: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, body).unwrap();
    path
}

fn run(cmd: ConfigCommand, config_path: Option<PathBuf>) -> (Result<(), Error>, String) {
    let mut out = Vec::new();
    let result = cmd.run(config_path, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn validate_named_file_ignores_broken_global_config() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write(&dir, "broken.toml", "[image]\ntimeout_ms = 0\n");
    let good = write(&dir, "good.toml", "[image]\ntimeout_ms = 800\n");

    let (result, out) = run(ConfigCommand::Validate { file: Some(good) }, Some(broken));

    assert!(result.is_ok());
    assert!(out.contains("good.toml"));
    assert!(out.contains("Configuration is valid."));
}

#[test]
fn validate_failure_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write(&dir, "broken.toml", "[session]\nevent_capacity = 0\n");

    let (result, out) = run(ConfigCommand::Validate { file: None }, Some(broken));

    assert!(matches!(result, Err(Error::ConfigValidation { .. })));
    assert!(!out.contains("Configuration is valid."));
}

#[test]
fn path_honors_global_flag_without_loading() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write(&dir, "broken.toml", "this is not toml [");

    let (result, out) = run(ConfigCommand::Path, Some(broken.clone()));

    assert!(result.is_ok());
    assert_eq!(out.trim(), broken.display().to_string());
}

#[test]
fn show_json_hides_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(&dir, "config.toml", "[image]\napi_key = \"s3cr3t-key\"\n");

    let (result, out) = run(ConfigCommand::Show { json: true }, Some(path.clone()));
    assert!(result.is_ok());
    assert!(out.contains("timeout_ms"));
    assert!(!out.contains("s3cr3t-key"));

    let (result, out) = run(ConfigCommand::Show { json: false }, Some(path));
    assert!(result.is_ok());
    assert!(out.contains("API key set:        true"));
    assert!(!out.contains("s3cr3t-key"));
}

#[test]
fn show_reports_broken_config() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write(&dir, "broken.toml", "this is not toml [");

    let (result, _) = run(ConfigCommand::Show { json: false }, Some(broken));

    assert!(matches!(result, Err(Error::ConfigLoad(_))));
}
