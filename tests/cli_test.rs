use assert_cmd::cargo_bin;
use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::io::Write;
use std::process::Command;

#[test]
fn test_batch_run_prints_final_balances() {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "type, account, to, amount").unwrap();
    writeln!(csv, "open, alice, , 100.0").unwrap();
    writeln!(csv, "open, bob, , 0.0").unwrap();
    writeln!(csv, "transfer, alice, bob, 25.0").unwrap();

    let mut cmd = Command::new(cargo_bin!("microledger"));
    cmd.arg(csv.path());

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("alice,75.0"))
        .stdout(predicate::str::contains("bob,25.0"));
}

#[test]
fn test_failed_commands_reported_and_skipped() {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "type, account, to, amount").unwrap();
    writeln!(csv, "open, alice, , 50.0").unwrap();
    writeln!(csv, "open, bob, , 0.0").unwrap();
    // Overdraw, missing destination, malformed row; then a valid transfer.
    writeln!(csv, "transfer, alice, bob, 500.0").unwrap();
    writeln!(csv, "transfer, alice, ghost, 10.0").unwrap();
    writeln!(csv, "frobnicate, alice, , 1.0").unwrap();
    writeln!(csv, "transfer, alice, bob, 20.0").unwrap();

    let mut cmd = Command::new(cargo_bin!("microledger"));
    cmd.arg(csv.path());

    cmd.assert()
        .success()
        .stderr(predicate::str::contains("insufficient funds"))
        .stderr(predicate::str::contains("destination account not found"))
        .stderr(predicate::str::contains("Error reading command"))
        .stdout(predicate::str::contains("alice,30.0"))
        .stdout(predicate::str::contains("bob,20.0"));
}

#[test]
fn test_json_output() {
    let mut csv = tempfile::NamedTempFile::new().unwrap();
    writeln!(csv, "type, account, to, amount").unwrap();
    writeln!(csv, "open, alice, , 10.0").unwrap();

    let mut cmd = Command::new(cargo_bin!("microledger"));
    cmd.arg(csv.path()).arg("--json");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"alice\""));
}
