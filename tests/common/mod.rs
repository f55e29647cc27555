//! Shared helpers for bigdiff integration tests.
//!
//! Every test works in its own temp directory. Inputs are written the way
//! the production snapshots are: gzip, newline-joined, no trailing newline.

#![allow(dead_code, clippy::unwrap_used)]

use std::collections::BTreeSet;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use bigdiff::codec::LineReader;
use flate2::Compression;
use flate2::write::GzEncoder;
use tempfile::TempDir;

pub const LEFT_NAME: &str = "file-1.gz";
pub const RIGHT_NAME: &str = "file-2.gz";

/// Write `lines` joined by `\n` as a gzip file.
pub fn write_gz_lines(path: &Path, lines: &[&str]) {
    let file = std::fs::File::create(path).expect("create input file");
    let mut gz = GzEncoder::new(file, Compression::default());
    gz.write_all(lines.join("\n").as_bytes()).expect("write input file");
    gz.finish().expect("finish input file");
}

/// A fresh input directory holding `file-1.gz` and `file-2.gz`.
pub fn setup_inputs(left: &[&str], right: &[&str]) -> TempDir {
    let dir = TempDir::new().expect("failed to create temp dir");
    write_gz_lines(&dir.path().join(LEFT_NAME), left);
    write_gz_lines(&dir.path().join(RIGHT_NAME), right);
    dir
}

/// All lines of a (possibly gzip) file as a set of raw byte strings.
pub fn read_byte_set(path: &Path) -> BTreeSet<Vec<u8>> {
    LineReader::open(path)
        .unwrap_or_else(|e| panic!("open {}: {e}", path.display()))
        .collect::<Result<_, _>>()
        .unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

/// All lines of a (possibly gzip) UTF-8 file as a set.
pub fn read_line_set(path: &Path) -> BTreeSet<String> {
    read_byte_set(path)
        .into_iter()
        .map(|l| String::from_utf8(l).expect("diff line is UTF-8"))
        .collect()
}

/// The `(diff-left, diff-right)` sets of a finished run.
pub fn read_diffs(output_dir: &Path) -> (BTreeSet<String>, BTreeSet<String>) {
    (
        read_line_set(&output_dir.join("diff-left.gz")),
        read_line_set(&output_dir.join("diff-right.gz")),
    )
}

pub fn set(lines: &[&str]) -> BTreeSet<String> {
    lines.iter().map(|&l| l.to_owned()).collect()
}

/// Sorted entry names of `dir`.
pub fn entries(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = std::fs::read_dir(dir)
        .unwrap_or_else(|e| panic!("read_dir {}: {e}", dir.display()))
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn diff_dir(input_dir: &Path) -> PathBuf {
    input_dir.join("diff")
}

pub fn temp_dir(input_dir: &Path) -> PathBuf {
    input_dir.join("temp")
}

/// Run the bigdiff binary with the given args in the given directory.
pub fn bigdiff_in(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_bigdiff"))
        .args(args)
        .current_dir(dir)
        .env("RUST_LOG", "info")
        .env_remove("BIGDIFF_LOG_FORMAT")
        .output()
        .expect("failed to execute bigdiff")
}

/// Run bigdiff and assert it succeeds. Returns stdout as string.
pub fn bigdiff_ok(dir: &Path, args: &[&str]) -> String {
    let out = bigdiff_in(dir, args);
    let stderr = String::from_utf8_lossy(&out.stderr);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        out.status.success(),
        "bigdiff {} failed:\nstdout: {stdout}\nstderr: {stderr}",
        args.join(" "),
    );
    stdout.to_string()
}

/// Run bigdiff and assert it fails. Returns stderr as string.
pub fn bigdiff_fails(dir: &Path, args: &[&str]) -> String {
    let out = bigdiff_in(dir, args);
    assert!(
        !out.status.success(),
        "Expected bigdiff {} to fail, but it succeeded.\nstdout: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
    );
    String::from_utf8_lossy(&out.stderr).to_string()
}
