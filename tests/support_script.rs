use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

/// Run the `looper` binary from `dir` and capture output.
///
/// # Errors
///
/// Returns an error if the binary cannot be executed.
pub fn run_looper<I, S>(dir: &Path, args: I) -> Result<Output, String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let bin = looper_bin()?;
    Command::new(bin)
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "error")
        .env_remove("LOOPER_LOG")
        .env_remove("LOOPER_STORE")
        .output()
        .map_err(|err| format!("run looper failed: {}", err))
}

/// Fails with both output streams unless the run succeeded.
///
/// # Errors
///
/// Returns an error describing the failed run.
pub fn expect_success(output: &Output) -> Result<String, String> {
    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    if !output.status.success() {
        return Err(format!(
            "stdout: {}\nstderr: {}",
            stdout,
            String::from_utf8_lossy(&output.stderr)
        ));
    }
    Ok(stdout)
}

/// Parses one JSON snapshot per stdout line.
///
/// # Errors
///
/// Returns an error if a line is not valid JSON.
pub fn parse_snapshots(stdout: &str) -> Result<Vec<Value>, String> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line).map_err(|err| format!("bad snapshot '{}': {}", line, err))
        })
        .collect()
}

/// Label of video `name` in the last snapshot.
///
/// # Errors
///
/// Returns an error if there is no snapshot or no such video.
pub fn final_label(snapshots: &[Value], name: &str) -> Result<Option<String>, String> {
    let last = snapshots
        .last()
        .ok_or_else(|| "no snapshots printed".to_owned())?;
    let videos = last
        .get("videos")
        .and_then(Value::as_array)
        .ok_or_else(|| format!("snapshot without videos: {}", last))?;
    let video = videos
        .iter()
        .find(|video| video.get("name").and_then(Value::as_str) == Some(name))
        .ok_or_else(|| format!("{} missing from {}", name, last))?;
    Ok(video
        .get("label")
        .and_then(Value::as_str)
        .map(str::to_owned))
}

fn looper_bin() -> Result<String, String> {
    option_env!("CARGO_BIN_EXE_looper").map_or_else(
        || Err("CARGO_BIN_EXE_looper missing at compile time.".to_owned()),
        |path| Ok(path.to_owned()),
    )
}
