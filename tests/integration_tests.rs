//! Command-line tests: unsafe input must be rejected before any external
//! tool is looked up, so none of these need ffmpeg installed.

use assert_cmd::Command;
use tempfile::TempDir;

fn transcoder(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("transcoder").unwrap();
    cmd.current_dir(dir.path())
        .env_remove("RUST_LOG")
        .env_remove("TRANSCODER_CONFIG")
        .env("TRANSCODER_FFMPEG_PATH", "/nonexistent/ffmpeg")
        .env("TRANSCODER_FFPROBE_PATH", "/nonexistent/ffprobe");
    cmd
}

fn stderr_of(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn test_help_lists_commands() {
    let dir = TempDir::new().unwrap();
    let output = transcoder(&dir).arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["convert", "extract", "info"] {
        assert!(stdout.contains(command), "missing {} in help", command);
    }
}

#[test]
fn test_injected_codec_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = transcoder(&dir)
        .args(["convert", "in.mp4", "out.mp4", "--video-codec", "libx264;rm -rf /"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let stderr = stderr_of(&output);
    assert!(stderr.contains("video codec"), "stderr: {}", stderr);
    assert!(!stderr.contains("/nonexistent/ffmpeg"));
}

#[test]
fn test_traversal_path_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = transcoder(&dir)
        .args(["convert", "../../etc/passwd", "out.mp4"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("directory traversal"));
}

#[test]
fn test_out_of_range_resolution_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = transcoder(&dir)
        .args(["convert", "in.mp4", "out.mkv", "--resolution", "99999x1080"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("resolution"));
}

#[test]
fn test_extract_to_video_container_is_rejected() {
    let dir = TempDir::new().unwrap();
    let output = transcoder(&dir)
        .args(["extract", "in.mp4", "out.mkv"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("unsupported output format"));
}

#[test]
fn test_extract_rejects_unknown_sample_rate() {
    let dir = TempDir::new().unwrap();
    let output = transcoder(&dir)
        .args(["extract", "in.mp4", "out.mp3", "--sample-rate", "12345"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("sample rate"));
}

#[test]
fn test_valid_request_needs_the_encoder() {
    let dir = TempDir::new().unwrap();
    let output = transcoder(&dir)
        .args(["convert", "in.mp4", "out.mp4"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("not found or not working"));
}

#[test]
fn test_info_on_missing_file() {
    let dir = TempDir::new().unwrap();
    let output = transcoder(&dir)
        .args(["info", "missing.mp4"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("file does not exist"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = transcoder(&dir)
        .args(["--config", "absent.toml", "info", "movie.mkv"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("config file does not exist"));
}

#[test]
fn test_config_file_is_picked_up_from_working_directory() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("transcoder.toml"),
        "[transcoder]\nmax_path_length = 8\n",
    )
    .unwrap();

    let output = transcoder(&dir)
        .args(["info", "a-rather-long-name.mkv"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr_of(&output).contains("too long"));
}

#[test]
fn test_existing_report_is_kept_without_force() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("report.txt"), "previous report").unwrap();

    let output = transcoder(&dir)
        .args(["info", "movie.mkv", "--output", "report.txt"])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr_of(&output).contains("already exists"));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("report.txt")).unwrap(),
        "previous report"
    );
}
