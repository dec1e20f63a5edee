use std::fs;
use std::process::Command;

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_raid-squads")
}

#[test]
fn cli_writes_text_and_csv_exports() {
    let dir = tempfile::tempdir().expect("temp dir");
    let roster = dir.path().join("signups.txt");
    fs::write(&roster, "Alice (EK) P\nBob (ED) P\nCarol (MS) P\nDave (RP) P\n").expect("write roster");

    let output = Command::new(bin())
        .arg(&roster)
        .arg("P1")
        .env("RAID_SQUADS_OUTPUT_DIR", dir.path())
        .output()
        .expect("cli should run");

    assert_eq!(output.status.code(), Some(0));
    let text = fs::read_to_string(dir.path().join("squads.txt")).expect("text export");
    assert!(text.starts_with("**Pale — Team 1 (4/10)**"));
    let csv = fs::read_to_string(dir.path().join("squads.csv")).expect("csv export");
    assert_eq!(csv.lines().count(), 5);
}

#[test]
fn cli_fails_on_empty_roster() {
    let dir = tempfile::tempdir().expect("temp dir");
    let roster = dir.path().join("empty.txt");
    fs::write(&roster, "# nobody yet\n").expect("write roster");

    let output = Command::new(bin())
        .arg(&roster)
        .arg("P1")
        .env("RAID_SQUADS_OUTPUT_DIR", dir.path())
        .output()
        .expect("cli should run");

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("no valid sign-ups"));
}

#[test]
fn cli_prints_usage_without_arguments() {
    let output = Command::new(bin()).output().expect("cli should run");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage: raid-squads"));
}
