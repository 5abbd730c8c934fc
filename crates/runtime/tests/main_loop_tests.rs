use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};
use std::thread;
use std::time::Duration;

fn manifest_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn run_main(args: &[&str]) -> Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_ragdoll_main"))
        .args(args)
        .current_dir(manifest_dir())
        .env("RUST_LOG", "info")
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn ragdoll_main process");

    // Drain both pipes on their own threads so a chatty child cannot block.
    let mut stdout = child.stdout.take().expect("Failed to capture stdout");
    let mut stderr = child.stderr.take().expect("Failed to capture stderr");
    let stdout_handle = thread::spawn(move || {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).map(|_| buf)
    });
    let stderr_handle = thread::spawn(move || {
        let mut buf = Vec::new();
        stderr.read_to_end(&mut buf).map(|_| buf)
    });

    let timeout = Duration::from_secs(60);
    let status = match child.wait_timeout_secs(timeout) {
        Ok(Some(status)) => status,
        Ok(None) => {
            child.kill().expect("Failed to kill timed-out process");
            panic!("ragdoll_main process timed out after {timeout:?}");
        }
        Err(e) => panic!("Failed to wait for ragdoll_main process: {e}"),
    };

    let output = Output {
        status,
        stdout: stdout_handle.join().unwrap().unwrap(),
        stderr: stderr_handle.join().unwrap().unwrap(),
    };
    eprintln!("--- ragdoll_main STDOUT ---\n{}", String::from_utf8_lossy(&output.stdout));
    eprintln!("--- ragdoll_main STDERR ---\n{}", String::from_utf8_lossy(&output.stderr));
    output
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("ragdoll_main_{}_{name}", std::process::id()))
}

#[test]
fn default_scene_runs_and_reports() {
    let output = run_main(&["--steps", "100"]);
    assert!(output.status.success(), "exited with {:?}", output.status.code());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("built-in ragdoll"));
    assert_eq!(stdout.matches("Simulation step").count(), 2);
    assert!(stdout.contains("Simulation loop finished after 100 steps."));
}

#[test]
fn scene_file_and_saved_state() {
    let scene = manifest_dir().join("../phenotype/tests/data/standing.json");
    let state = temp_path("state.json");
    let output = run_main(&[
        "--scene",
        scene.to_str().unwrap(),
        "--steps",
        "60",
        "--save-state",
        state.to_str().unwrap(),
    ]);
    assert!(output.status.success());

    let json = std::fs::read_to_string(&state).unwrap();
    std::fs::remove_file(&state).ok();
    let saved: serde_json::Value = serde_json::from_str(&json).unwrap();
    let kinds: Vec<_> = saved
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["kind"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(kinds, ["balance", "upright", "upright", "upright"]);
    assert_eq!(saved[2]["enabled"], false);
}

#[test]
fn kinematic_switch_disables_controllers() {
    let state = temp_path("kinematic.json");
    let output = run_main(&[
        "--steps",
        "20",
        "--kinematic-after",
        "10",
        "--save-state",
        state.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("kinematic mode"));

    let json = std::fs::read_to_string(&state).unwrap();
    std::fs::remove_file(&state).ok();
    let saved: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert!(saved.as_array().unwrap().iter().all(|s| s["enabled"] == false));
}

#[test]
fn invalid_time_step_fails() {
    let output = run_main(&["--steps", "5", "--dt", "0"]);
    assert!(!output.status.success());
}

#[test]
fn missing_scene_fails() {
    let output = run_main(&["--scene", "does/not/exist.json", "--steps", "5"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("exist.json"));
}

// A helper trait and impl to use wait_timeout_secs (not in std Command on all Rust versions)
trait ChildExt {
    fn wait_timeout_secs(&mut self, duration: Duration) -> std::io::Result<Option<std::process::ExitStatus>>;
}

impl ChildExt for std::process::Child {
    fn wait_timeout_secs(&mut self, duration: Duration) -> std::io::Result<Option<std::process::ExitStatus>> {
        let start_time = std::time::Instant::now();
        loop {
            match self.try_wait()? {
                Some(status) => return Ok(Some(status)),
                None => {
                    if start_time.elapsed() > duration {
                        return Ok(None);
                    }
                    thread::sleep(Duration::from_millis(50));
                }
            }
        }
    }
}
