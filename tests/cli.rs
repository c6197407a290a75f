use assert_fs::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;

fn headermax() -> assert_cmd::Command {
    assert_cmd::cargo::cargo_bin_cmd!("headermax")
}

#[test]
fn reports_max_across_headers() {
    let dir = assert_fs::TempDir::new().unwrap();
    let fasta = dir.child("reads.fa");
    fasta.write_str(">seq1 zzz\nACGT\n>seq2 ÀÁ\n").unwrap();

    headermax()
        .arg(fasta.path())
        .assert()
        .success()
        .stdout("Max ASCII value across all lines: 193\n");
}

#[test]
fn no_header_lines() {
    let dir = assert_fs::TempDir::new().unwrap();
    let fasta = dir.child("body.fa");
    fasta.write_str("ACGT\n").unwrap();

    headermax()
        .arg(fasta.path())
        .assert()
        .success()
        .stdout("No valid lines found.\n");
}

#[test]
fn missing_file_is_not_a_crash() {
    let dir = assert_fs::TempDir::new().unwrap();

    headermax()
        .arg(dir.child("absent.fa").path())
        .assert()
        .success()
        .stdout("Error: File not found.\n");
}

#[test]
fn wrong_argument_count_prints_usage() {
    headermax()
        .assert()
        .success()
        .stdout("Usage: headermax <filename>\n");

    // neither path exists; usage must win before any open is attempted
    headermax()
        .args(["missing-a.fa", "missing-b.fa"])
        .assert()
        .success()
        .stdout("Usage: headermax <filename>\n");
}

#[test]
fn invalid_utf8_is_generic_error() {
    let dir = assert_fs::TempDir::new().unwrap();
    let fasta = dir.child("bad.fa");
    fasta.write_binary(b">ok\n>\xff\n").unwrap();

    headermax()
        .arg(fasta.path())
        .assert()
        .success()
        .stdout(contains("An error occurred: ").and(contains("line 2")));
}

#[test]
fn custom_marker_flag() {
    let dir = assert_fs::TempDir::new().unwrap();
    let fastq = dir.child("reads.fq");
    fastq.write_str("@r1 a\nACGT\n+\nIIII\n").unwrap();

    headermax()
        .args(["--marker", "@"])
        .arg(fastq.path())
        .assert()
        .success()
        .stdout("Max ASCII value across all lines: 114\n");
}

#[test]
fn bad_config_exits_nonzero() {
    let dir = assert_fs::TempDir::new().unwrap();
    let fasta = dir.child("reads.fa");
    fasta.write_str(">a\n").unwrap();
    let cfg = dir.child("headermax.json");
    cfg.write_str("{ not json").unwrap();

    headermax()
        .arg("--config")
        .arg(cfg.path())
        .arg(fasta.path())
        .assert()
        .failure()
        .stdout("")
        .stderr(contains("Invalid configuration"));
}

#[test]
fn log_file_receives_scan_summary() {
    let dir = assert_fs::TempDir::new().unwrap();
    let fasta = dir.child("reads.fa");
    fasta.write_str(">a\nACGT\n>b\n").unwrap();
    let log = dir.child("scan.log");

    headermax()
        .args(["--log-enabled", "true", "--log-level", "debug", "--log-file"])
        .arg(log.path())
        .arg(fasta.path())
        .assert()
        .success()
        .stdout("Max ASCII value across all lines: 98\n");

    log.assert(contains("Read 3 lines, 2 headers"));
}

#[test]
fn broken_env_config_is_skipped() {
    let dir = assert_fs::TempDir::new().unwrap();
    let fasta = dir.child("reads.fa");
    fasta.write_str(">abc\n").unwrap();
    let cfg = dir.child("broken.json");
    cfg.write_str("{ not json").unwrap();

    headermax()
        .env("HEADERMAX_CONFIG", cfg.path())
        .arg(fasta.path())
        .assert()
        .success()
        .stdout("Max ASCII value across all lines: 99\n")
        .stderr(contains("warning: ignoring config"));
}

#[test]
fn broken_config_in_working_dir_is_skipped() {
    let dir = assert_fs::TempDir::new().unwrap();
    dir.child("reads.fa").write_str("ACGT\r>zzz\n").unwrap();
    dir.child("headermax.json").write_str("[1, 2").unwrap();

    headermax()
        .current_dir(dir.path())
        .env_remove("HEADERMAX_CONFIG")
        .arg("reads.fa")
        .assert()
        .success()
        .stdout("Max ASCII value across all lines: 122\n");
}
