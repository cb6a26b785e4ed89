use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const INVOICE: &str = "NOVA Conseil SAS
SIRET: 123 456 789 00012
TVA Intracom: FR12 123456789
FACTURE N°: NR-2025-00127
Date: 29/12/2025
Abonnement 29,00 €
Sous-total HT : 143,00 €
TVA (20%): 28,60 €
Total TTC: 171,60 €
IBAN : FR76 3000 6000 0112 3456 7890 189
";

/// Command isolated from the user's own configuration directory.
fn recu(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("recu").unwrap();
    cmd.env("XDG_CONFIG_HOME", home.path())
        .env("HOME", home.path())
        .env_remove("RUST_LOG");
    cmd
}

fn write(dir: &Path, name: &str, content: &str) -> String {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path.to_string_lossy().into_owned()
}

#[test]
fn extract_prints_json() {
    let home = TempDir::new().unwrap();
    let input = write(home.path(), "invoice.txt", INVOICE);

    recu(&home)
        .args(["extract", &input])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"amount\": \"171.60\""))
        .stdout(predicate::str::contains("\"vat\": \"28.60\""))
        .stdout(predicate::str::contains("\"status\": \"success\""));
}

#[test]
fn extract_reads_stdin() {
    let home = TempDir::new().unwrap();

    recu(&home)
        .args(["extract", "-", "-f", "text"])
        .write_stdin("Pizza Napoli\nTOTAL 11,00 €\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Total:    11.00 EUR"))
        .stdout(predicate::str::contains("VAT:      -"))
        .stdout(predicate::str::contains("Category: restaurant"))
        .stderr(predicate::str::contains("needs review"));
}

#[test]
fn extract_csv_to_file() {
    let home = TempDir::new().unwrap();
    let input = write(home.path(), "invoice.txt", INVOICE);
    let output = home.path().join("out.csv");

    recu(&home)
        .args(["extract", &input, "-f", "csv", "-o"])
        .arg(&output)
        .assert()
        .success();

    let csv = fs::read_to_string(&output).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("merchant,date,amount,vat,net_amount,currency,category,status")
    );
    assert_eq!(
        lines.next(),
        Some("NOVA Conseil SAS,2025-12-29,171.60,28.60,143.00,EUR,other,success")
    );
}

#[test]
fn extract_debug_lists_candidates() {
    let home = TempDir::new().unwrap();
    let input = write(home.path(), "invoice.txt", INVOICE);

    recu(&home)
        .args(["extract", &input, "--debug"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Total candidates:"))
        .stderr(predicate::str::contains("total ttc: 171,60 €"));
}

#[test]
fn extract_missing_file_fails() {
    let home = TempDir::new().unwrap();

    recu(&home)
        .args(["extract", "does-not-exist.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn extract_uses_configured_currency() {
    let home = TempDir::new().unwrap();
    let input = write(home.path(), "ticket.txt", "Total 20,00\n");
    let config = write(
        home.path(),
        "config.json",
        r#"{ "extraction": { "default_currency": "CHF" }, "output": { "format": "text" } }"#,
    );

    recu(&home)
        .args(["--config", &config, "extract", &input])
        .assert()
        .success()
        .stdout(predicate::str::contains("Total:    20.00 CHF"));
}

#[test]
fn extract_rejects_invalid_config() {
    let home = TempDir::new().unwrap();
    let input = write(home.path(), "ticket.txt", "Total 20,00\n");
    let config = write(
        home.path(),
        "config.json",
        r#"{ "extraction": { "total": { "year_min": 2040, "year_max": 2030 } } }"#,
    );

    recu(&home)
        .args(["--config", &config, "extract", &input])
        .assert()
        .failure()
        .stderr(predicate::str::contains("total.year_min"));
}

#[test]
fn batch_writes_outputs_and_summary() {
    let home = TempDir::new().unwrap();
    let scans = home.path().join("scans");
    fs::create_dir(&scans).unwrap();
    write(&scans, "a.txt", INVOICE);
    write(&scans, "b.txt", "Pizza Napoli\nTOTAL 11,00 €\n");
    write(&scans, "c.txt", "@@@\n###\n");
    write(&scans, "ignored.log", "Total 99,00\n");

    let out = home.path().join("out");
    let pattern = format!("{}/*", scans.display());

    recu(&home)
        .args(["batch", &pattern, "--summary", "-j", "2", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Found 3 files"));

    assert!(out.join("a.json").exists());
    assert!(out.join("b.json").exists());
    assert!(!out.join("ignored.json").exists());

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    let rows: Vec<&str> = summary.lines().collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[1].starts_with("a.txt,success,NOVA Conseil SAS,2025-12-29,171.60,28.60,EUR"));
    assert!(rows[2].starts_with("b.txt,partial,Pizza Napoli,,11.00,,EUR,restaurant"));
    assert!(rows[3].starts_with("c.txt,failed,"));
}

#[test]
fn batch_stops_on_error_unless_asked_to_continue() {
    let home = TempDir::new().unwrap();
    let scans = home.path().join("scans");
    fs::create_dir(&scans).unwrap();
    write(&scans, "good.txt", "Total 12,00\n");
    fs::write(scans.join("bad.txt"), [0xff, 0xfe, 0x00]).unwrap();

    let pattern = format!("{}/*.txt", scans.display());

    recu(&home)
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad.txt"));

    let out = home.path().join("out");
    recu(&home)
        .args(["batch", &pattern, "--continue-on-error", "--summary", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Failed files:"));

    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.contains("bad.txt,error,"));
    assert!(out.join("good.json").exists());
}

#[test]
fn batch_without_matches_fails() {
    let home = TempDir::new().unwrap();
    let pattern = format!("{}/*.txt", home.path().display());

    recu(&home)
        .args(["batch", &pattern])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No matching files"));
}

#[test]
fn config_init_get_set() {
    let home = TempDir::new().unwrap();
    let config = home.path().join("recu.json");
    let config = config.to_str().unwrap();

    recu(&home)
        .args(["--config", config, "config", "init"])
        .assert()
        .success();

    recu(&home)
        .args(["--config", config, "config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    recu(&home)
        .args(["--config", config, "config", "set", "extraction.default_currency", "USD"])
        .assert()
        .success();

    recu(&home)
        .args(["--config", config, "config", "get", "extraction.default_currency"])
        .assert()
        .success()
        .stdout(predicate::str::diff("\"USD\"\n"));

    recu(&home)
        .args(["--config", config, "config", "set", "extraction.nope", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));

    recu(&home)
        .args(["--config", config, "config", "set", "extraction.total.year_min", "2100"])
        .assert()
        .failure();
}

#[test]
fn config_path_uses_default_location() {
    let home = TempDir::new().unwrap();

    recu(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("recu"))
        .stdout(predicate::str::contains("not created"));
}
