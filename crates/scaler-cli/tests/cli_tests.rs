use std::io::Write;
use std::process::Command;
use std::process::Output;
use std::process::Stdio;

use serde_json::json;
use serde_json::Value;
use similar_asserts::assert_eq;

fn uhd_request(fps: i32, job_count: Option<i32>) -> String {
    let uhd = json!({ "width": 3840, "height": 2160, "frame-rate": { "num": fps, "den": 1 } });
    let mut parameters = json!({
        "resources": [{
            "function": "SCALER",
            "format": "yuv420p",
            "resolution": { "input": uhd.clone(), "output": [uhd] },
        }],
    });
    if let Some(job_count) = job_count {
        parameters["job-count"] = json!(job_count);
    }
    json!({ "request": { "parameters": parameters } }).to_string()
}

fn scaler_load(args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_scaler-load"))
        .args(args)
        .env_remove("SCALER_LOAD_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn scaler-load");
    {
        let mut child_stdin = child.stdin.take().expect("stdin");
        if let Some(input) = stdin {
            child_stdin.write_all(input.as_bytes()).expect("write stdin");
        }
    }
    child.wait_with_output().expect("wait for scaler-load")
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn calc_reads_request_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("request.json");
    std::fs::write(&path, uhd_request(60, None)).unwrap();

    let output = scaler_load(&["calc", "--request", path.to_str().unwrap()], None);

    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "500000 1\n");
}

#[test]
fn calc_reads_stdin() {
    let output = scaler_load(&["calc"], Some(&uhd_request(12, Some(4))));

    assert!(output.status.success());
    assert_eq!(stdout_of(&output), "250000 1\n");
}

#[test]
fn calc_json_reports_source_and_sessions() {
    let output = scaler_load(&["calc", "--json"], Some(&uhd_request(12, Some(4))));

    assert!(output.status.success());
    let result: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["reported_load"], json!(250000));
    assert_eq!(result["session_count"], json!(1));
    assert_eq!(result["source"], json!("job-count"));
    assert_eq!(result["sessions"][0]["load"], json!(100000));
}

#[test]
fn calc_breakdown_ends_with_result() {
    let output = scaler_load(&["calc", "--breakdown"], Some(&uhd_request(60, None)));

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("497664000"), "{stdout}");
    assert!(stdout.ends_with("500000 1\n"), "{stdout}");
}

#[test]
fn calc_fails_on_malformed_request() {
    let output = scaler_load(&["calc"], Some("{\"request\": {}}"));

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("request.parameters"), "{stderr}");
}

#[test]
fn calc_fails_on_missing_file() {
    let output = scaler_load(&["calc", "--request", "/nonexistent/request.json"], None);
    assert!(!output.status.success());
}

#[test]
fn parse_prints_model() {
    let output = scaler_load(&["parse"], Some(&uhd_request(60, None)));

    assert!(output.status.success());
    let model: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(model["parameters"]["job_count"], json!(-1));
    assert_eq!(model["resources"][0]["function"], json!("SCALER"));
    assert_eq!(model["resources"][0]["outputs"][0]["width"], json!(3840));
}

#[test]
fn info_prints_identifiers() {
    let output = scaler_load(&["info"], None);

    assert!(output.status.success());
    let stdout = stdout_of(&output);
    assert!(stdout.contains("plugin id:   3"), "{stdout}");
    assert!(stdout.contains("api version: 1"), "{stdout}");
}
